//! Plugin-Lader – Validierung und Ressourcen-Entdeckung
//!
//! Ein [`Plugin`] wird mit seinem Verzeichnispfad konstruiert und genau
//! einmal ueber [`Plugin::laden`] validiert. Danach ist es ein lesender
//! Datensatz: entweder `Gueltig` mit den vier Ressourcen-Tabellen oder
//! `Ungueltig` mit einem menschenlesbaren Ablehnungsgrund. `Ungueltig`
//! ist absorbierend – es gibt keinen Weg zurueck.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use semver::Version;
use tracing::error;

use stammtisch_core::KonfigurationsSchicht;

use crate::error::{PluginError, Result};
use crate::i18n::uebersetzungen_entdecken;
use crate::manifest::{ManifestErgebnis, PluginManifest};
use crate::registry::ModulRegistry;
use crate::types::{ExportTabelle, ModulArt, PluginInfo, PluginRessourcen, UebersetzungsTabelle};

/// Umgebung in der ein Plugin geladen wird
#[derive(Clone)]
pub struct LadeKontext {
    /// Version der einbettenden Host-Anwendung – linke Seite der
    /// Kompatibilitaetspruefung
    pub host_version: Version,
    /// Registry mit den Fabriken und Haken aller bekannten Plugins
    pub registry: Arc<ModulRegistry>,
}

/// Zustand eines Plugins nach (oder vor) dem Laden
enum PluginZustand {
    /// `laden()` wurde noch nicht durchlaufen
    Ungeladen,
    /// Manifest validiert, Ressourcen materialisiert
    Gueltig {
        manifest: PluginManifest,
        ressourcen: PluginRessourcen,
        geladen_am: DateTime<Utc>,
    },
    /// Validierung fehlgeschlagen
    Ungueltig { grund: String },
}

/// Ein verzeichnisbasiertes Plugin-Paket
pub struct Plugin {
    pfad: PathBuf,
    zustand: PluginZustand,
}

impl Plugin {
    /// Erstellt ein ungeladenes Plugin fuer ein Verzeichnis
    pub fn neu(pfad: impl Into<PathBuf>) -> Self {
        Self {
            pfad: pfad.into(),
            zustand: PluginZustand::Ungeladen,
        }
    }

    /// Validiert das Manifest und materialisiert die Ressourcen
    ///
    /// Validierungsfehler werden lokal behandelt: sie hinterlassen den
    /// Zustand `Ungueltig` samt Diagnose im Log und sind kein `Err`.
    /// Unerwartete Fehler (IO, kaputtes JSON, nicht registrierte Module)
    /// werden an den Aufrufer weitergereicht. Ein zweiter Aufruf ist ein
    /// No-Op.
    pub async fn laden(&mut self, kontext: &LadeKontext) -> Result<()> {
        if !matches!(self.zustand, PluginZustand::Ungeladen) {
            return Ok(());
        }

        let manifest_pfad = self.pfad.join("plugin.json");
        if !tokio::fs::try_exists(&manifest_pfad).await? {
            self.abbrechen("plugin.json nicht gefunden");
            return Ok(());
        }

        let inhalt = tokio::fs::read_to_string(&manifest_pfad).await?;
        let manifest = match PluginManifest::pruefen(&inhalt, &kontext.host_version)? {
            ManifestErgebnis::Gueltig(manifest) => manifest,
            ManifestErgebnis::Ungueltig(grund) => {
                self.abbrechen(&grund);
                return Ok(());
            }
        };

        let ressourcen = self.ressourcen_entdecken(&kontext.registry).await?;

        self.zustand = PluginZustand::Gueltig {
            manifest,
            ressourcen,
            geladen_am: Utc::now(),
        };
        Ok(())
    }

    /// Haelt das Laden an und merkt sich den Ablehnungsgrund
    fn abbrechen(&mut self, grund: &str) {
        error!(plugin = %self.pfad.display(), grund, "Plugin ist nicht gueltig");
        self.zustand = PluginZustand::Ungueltig {
            grund: grund.to_string(),
        };
    }

    /// Entdeckt die vier Ressourcen-Tabellen
    ///
    /// Jeder Schritt ist unabhaengig und tolerant gegenueber fehlenden
    /// Verzeichnissen: nur Manifest-Probleme machen ein Plugin ungueltig.
    async fn ressourcen_entdecken(&self, registry: &ModulRegistry) -> Result<PluginRessourcen> {
        Ok(PluginRessourcen {
            entitaeten: self
                .exporte_falls_vorhanden(registry, "entities", ModulArt::Entitaeten)
                .await?,
            controller: self
                .exporte_falls_vorhanden(registry, "api/controllers", ModulArt::Controller)
                .await?,
            dienste: self
                .exporte_falls_vorhanden(registry, "services", ModulArt::Dienste)
                .await?,
            uebersetzungen: uebersetzungen_entdecken(&self.pfad).await?,
        })
    }

    /// Exporte eines Moduls, falls dessen Unterverzeichnis existiert
    async fn exporte_falls_vorhanden(
        &self,
        registry: &ModulRegistry,
        unterverzeichnis: &str,
        art: ModulArt,
    ) -> Result<ExportTabelle> {
        if !tokio::fs::try_exists(self.pfad.join(unterverzeichnis)).await? {
            return Ok(ExportTabelle::new());
        }
        registry.exporte(&self.registry_schluessel(), art)
    }

    /// Logischer Registry-Schluessel: der Verzeichnisname des Plugins
    fn registry_schluessel(&self) -> String {
        self.pfad
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| self.pfad.display().to_string())
    }

    /// Liest `.env` als Konfigurationsschicht ein
    ///
    /// Nur wenn `services/` existiert; eine fehlende `.env` ergibt eine
    /// leere Schicht. Mutiert keinen prozessweiten Zustand – der Host
    /// fuehrt die Schichten selbst in definierter Reihenfolge zusammen.
    pub async fn umgebung_laden(&self) -> Result<KonfigurationsSchicht> {
        if !tokio::fs::try_exists(self.pfad.join("services")).await? {
            return Ok(KonfigurationsSchicht::leer());
        }
        let inhalt = match tokio::fs::read_to_string(self.pfad.join(".env")).await {
            Ok(inhalt) => inhalt,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(KonfigurationsSchicht::leer())
            }
            Err(e) => return Err(e.into()),
        };
        Ok(KonfigurationsSchicht::aus_env_text(&inhalt)?)
    }

    /// Fuehrt das Hauptmodul aus, falls `main.rs` existiert
    ///
    /// Ein vorhandenes Hauptmodul ohne registrierten Haken ist ein harter
    /// Fehler; ein fehlendes ist ein No-Op.
    pub async fn haupt_ausfuehren(&self, registry: &ModulRegistry) -> Result<()> {
        if !tokio::fs::try_exists(self.pfad.join("main.rs")).await? {
            return Ok(());
        }
        let schluessel = self.registry_schluessel();
        if !registry.hat_haken(&schluessel, ModulArt::Haupt) {
            return Err(PluginError::ModulNichtRegistriert {
                plugin: schluessel,
                art: ModulArt::Haupt,
            });
        }
        registry.haken_ausfuehren(&schluessel, ModulArt::Haupt)?;
        Ok(())
    }

    /// Fuehrt alle registrierten Befehls-Module aus (einmal pro Pfad)
    pub async fn befehle_importieren(&self, registry: &ModulRegistry) -> Result<()> {
        registry.haken_ausfuehren(&self.registry_schluessel(), ModulArt::Befehle)?;
        Ok(())
    }

    /// Fuehrt alle registrierten Ereignis-Module aus (einmal pro Pfad)
    pub async fn ereignisse_importieren(&self, registry: &ModulRegistry) -> Result<()> {
        registry.haken_ausfuehren(&self.registry_schluessel(), ModulArt::Ereignisse)?;
        Ok(())
    }

    /// Gibt true zurueck wenn das Plugin erfolgreich validiert wurde
    pub fn ist_gueltig(&self) -> bool {
        matches!(self.zustand, PluginZustand::Gueltig { .. })
    }

    /// Verzeichnispfad des Plugins
    pub fn pfad(&self) -> &Path {
        &self.pfad
    }

    /// Plugin-Name, sobald das Manifest validiert wurde
    pub fn name(&self) -> Option<&str> {
        match &self.zustand {
            PluginZustand::Gueltig { manifest, .. } => Some(manifest.name.as_str()),
            _ => None,
        }
    }

    /// Plugin-Version, sobald das Manifest validiert wurde
    pub fn version(&self) -> Option<&Version> {
        match &self.zustand {
            PluginZustand::Gueltig { manifest, .. } => Some(&manifest.version),
            _ => None,
        }
    }

    /// Ablehnungsgrund eines ungueltigen Plugins
    pub fn ablehnungsgrund(&self) -> Option<&str> {
        match &self.zustand {
            PluginZustand::Ungueltig { grund } => Some(grund.as_str()),
            _ => None,
        }
    }

    /// Die vier Ressourcen-Tabellen eines gueltigen Plugins
    pub fn ressourcen(&self) -> Option<&PluginRessourcen> {
        match &self.zustand {
            PluginZustand::Gueltig { ressourcen, .. } => Some(ressourcen),
            _ => None,
        }
    }

    /// Entitaets-Exporte
    pub fn entitaeten(&self) -> Option<&ExportTabelle> {
        self.ressourcen().map(|r| &r.entitaeten)
    }

    /// Controller-Exporte
    pub fn controller(&self) -> Option<&ExportTabelle> {
        self.ressourcen().map(|r| &r.controller)
    }

    /// Dienst-Exporte
    pub fn dienste(&self) -> Option<&ExportTabelle> {
        self.ressourcen().map(|r| &r.dienste)
    }

    /// Uebersetzungs-Tabellen nach Locale
    pub fn uebersetzungen(&self) -> Option<&BTreeMap<String, UebersetzungsTabelle>> {
        self.ressourcen().map(|r| &r.uebersetzungen)
    }

    /// Oeffentliche Informationen fuer UI und Diagnose
    pub fn info(&self) -> PluginInfo {
        match &self.zustand {
            PluginZustand::Gueltig {
                manifest,
                geladen_am,
                ..
            } => PluginInfo {
                name: Some(manifest.name.clone()),
                version: Some(manifest.version.to_string()),
                pfad: self.pfad.clone(),
                gueltig: true,
                ablehnungsgrund: None,
                geladen_am: Some(*geladen_am),
            },
            PluginZustand::Ungueltig { grund } => PluginInfo {
                name: None,
                version: None,
                pfad: self.pfad.clone(),
                gueltig: false,
                ablehnungsgrund: Some(grund.clone()),
                geladen_am: None,
            },
            PluginZustand::Ungeladen => PluginInfo {
                name: None,
                version: None,
                pfad: self.pfad.clone(),
                gueltig: false,
                ablehnungsgrund: None,
                geladen_am: None,
            },
        }
    }
}
