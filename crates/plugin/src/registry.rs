//! Modul-Registry – bildet logische Plugin-Pfade auf Fabriken und Haken ab
//!
//! Rust kennt kein `import()` beliebiger Pfade zur Laufzeit. Der Host
//! registriert deshalb pro Plugin-Verzeichnisname und Modul-Art eine
//! Fabrik (fuer Export-Tabellen) bzw. Haken (fuer Module die nur wegen
//! ihrer Seiteneffekte geladen werden). Der Lader konsultiert die
//! Registry erst nachdem das zugehoerige Unterverzeichnis auf der Platte
//! gefunden wurde; ein fehlendes Verzeichnis bleibt ein leeres Ergebnis.

use dashmap::{DashMap, DashSet};

use crate::error::{PluginError, Result};
use crate::types::{ExportTabelle, ModulArt, ModulFabrik, SeiteneffektHaken};

/// Logischer Pfad eines Moduls: Plugin-Verzeichnisname + Modul-Art
type LogischerPfad = (String, ModulArt);

/// Thread-sichere Registry fuer Plugin-Module
#[derive(Default)]
pub struct ModulRegistry {
    fabriken: DashMap<LogischerPfad, ModulFabrik>,
    haken: DashMap<LogischerPfad, Vec<SeiteneffektHaken>>,
    /// Logische Pfade deren Haken bereits gelaufen sind
    ausgefuehrt: DashSet<LogischerPfad>,
}

impl ModulRegistry {
    /// Erstellt eine neue leere Registry
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert die Fabrik eines Export-Moduls
    pub fn fabrik_registrieren(
        &self,
        plugin: impl Into<String>,
        art: ModulArt,
        fabrik: ModulFabrik,
    ) {
        self.fabriken.insert((plugin.into(), art), fabrik);
    }

    /// Haengt einen Seiteneffekt-Haken an einen logischen Pfad an
    pub fn haken_registrieren(
        &self,
        plugin: impl Into<String>,
        art: ModulArt,
        haken: SeiteneffektHaken,
    ) {
        self.haken
            .entry((plugin.into(), art))
            .or_default()
            .push(haken);
    }

    /// Prueft ob fuer den logischen Pfad eine Fabrik registriert ist
    pub fn hat_fabrik(&self, plugin: &str, art: ModulArt) -> bool {
        self.fabriken.contains_key(&(plugin.to_string(), art))
    }

    /// Prueft ob fuer den logischen Pfad Haken registriert sind
    pub fn hat_haken(&self, plugin: &str, art: ModulArt) -> bool {
        self.haken.contains_key(&(plugin.to_string(), art))
    }

    /// Materialisiert die Exporte eines Moduls
    ///
    /// Der Aufrufer hat die Existenz des Unterverzeichnisses bereits
    /// geprueft; eine fehlende Fabrik entspricht daher einem kaputten
    /// Modul und ist ein harter Fehler.
    pub fn exporte(&self, plugin: &str, art: ModulArt) -> Result<ExportTabelle> {
        let fabrik = match self.fabriken.get(&(plugin.to_string(), art)) {
            Some(eintrag) => eintrag.value().clone(),
            None => {
                return Err(PluginError::ModulNichtRegistriert {
                    plugin: plugin.to_string(),
                    art,
                })
            }
        };
        fabrik().map_err(|quelle| PluginError::Modul {
            plugin: plugin.to_string(),
            art,
            quelle,
        })
    }

    /// Fuehrt alle Haken eines logischen Pfads aus – einmal pro Pfad
    ///
    /// Wiederholte Aufrufe sind No-Ops, wie wiederholte Importe desselben
    /// Modulpfads. Ohne registrierte Haken ist der Aufruf ein natuerliches
    /// No-Op (leere Glob-Treffermenge). Gibt die Anzahl der in diesem
    /// Aufruf gelaufenen Haken zurueck.
    pub fn haken_ausfuehren(&self, plugin: &str, art: ModulArt) -> Result<usize> {
        let pfad = (plugin.to_string(), art);
        if !self.ausgefuehrt.insert(pfad.clone()) {
            return Ok(0);
        }

        let haken = match self.haken.get(&pfad) {
            Some(eintrag) => eintrag.value().clone(),
            None => return Ok(0),
        };
        for h in &haken {
            h().map_err(|quelle| PluginError::Modul {
                plugin: plugin.to_string(),
                art,
                quelle,
            })?;
        }
        Ok(haken.len())
    }

    /// Anzahl registrierter Fabriken
    pub fn anzahl_fabriken(&self) -> usize {
        self.fabriken.len()
    }

    /// Anzahl logischer Pfade mit registrierten Haken
    pub fn anzahl_haken_pfade(&self) -> usize {
        self.haken.len()
    }
}
