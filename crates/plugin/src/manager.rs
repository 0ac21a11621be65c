//! PluginManager – Entdeckung, Laden und Aggregation aller Plugins
//!
//! Der Host besitzt die Plugin-Sammlung: der Manager durchsucht das
//! Plugin-Verzeichnis, laedt jedes Plugin genau einmal und stellt die
//! aggregierten Sichten bereit (Uebersetzungen, Konfigurationsschichten,
//! Import-Aktionen). Kein Plugin sieht oder veraendert den Zustand eines
//! anderen.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use semver::Version;
use tracing::{error, info, warn};

use stammtisch_core::KonfigurationsSchicht;

use crate::error::Result;
use crate::loader::{LadeKontext, Plugin};
use crate::registry::ModulRegistry;
use crate::types::{PluginInfo, UebersetzungsTabelle};

/// Konfiguration fuer den PluginManager
#[derive(Debug, Clone)]
pub struct ManagerKonfiguration {
    /// Verzeichnis in dem Plugins gesucht werden
    pub plugin_verzeichnis: PathBuf,
    /// Version der Host-Anwendung – linke Seite der Kompatibilitaetspruefung
    pub host_version: Version,
}

/// Verwaltet alle entdeckten Plugins
pub struct PluginManager {
    kontext: LadeKontext,
    konfiguration: ManagerKonfiguration,
    plugins: Vec<Plugin>,
}

impl PluginManager {
    /// Erstellt einen neuen PluginManager
    pub fn neu(konfiguration: ManagerKonfiguration, registry: Arc<ModulRegistry>) -> Self {
        Self {
            kontext: LadeKontext {
                host_version: konfiguration.host_version.clone(),
                registry,
            },
            konfiguration,
            plugins: Vec::new(),
        }
    }

    /// Durchsucht das Plugin-Verzeichnis und laedt jedes Plugin einmal
    ///
    /// Unterverzeichnisse werden in sortierter Reihenfolge geladen, damit
    /// die Praezedenz spaeterer Aggregationen deterministisch ist. Ein
    /// unerwarteter Fehler schliesst nur das betroffene Plugin aus.
    pub async fn plugins_laden(&mut self) -> Result<()> {
        let verzeichnis = &self.konfiguration.plugin_verzeichnis;
        let mut leser = match tokio::fs::read_dir(verzeichnis).await {
            Ok(leser) => leser,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    verzeichnis = %verzeichnis.display(),
                    "Plugin-Verzeichnis nicht gefunden"
                );
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let mut pfade = Vec::new();
        while let Some(eintrag) = leser.next_entry().await? {
            if eintrag.file_type().await?.is_dir() {
                pfade.push(eintrag.path());
            }
        }
        pfade.sort();

        for pfad in pfade {
            let mut plugin = Plugin::neu(&pfad);
            match plugin.laden(&self.kontext).await {
                Ok(()) => {
                    if let (Some(name), Some(version)) = (plugin.name(), plugin.version()) {
                        info!(plugin = name, version = %version, "Plugin geladen");
                    }
                }
                Err(e) => {
                    error!(
                        plugin = %pfad.display(),
                        fehler = %e,
                        "Plugin konnte nicht geladen werden"
                    );
                }
            }
            self.plugins.push(plugin);
        }
        Ok(())
    }

    /// Alle erfolgreich validierten Plugins in Ladereihenfolge
    pub fn gueltige(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.iter().filter(|p| p.ist_gueltig())
    }

    /// Anzahl aller entdeckten Plugins (gueltig oder nicht)
    pub fn anzahl_plugins(&self) -> usize {
        self.plugins.len()
    }

    /// Oeffentliche Infos ueber alle entdeckten Plugins
    pub fn plugins_auflisten(&self) -> Vec<PluginInfo> {
        self.plugins.iter().map(Plugin::info).collect()
    }

    /// Fuehrt die Uebersetzungen aller gueltigen Plugins pro Locale zusammen
    ///
    /// Spaetere Plugins ueberschreiben gleichnamige Schluessel frueherer.
    pub fn uebersetzungen_zusammenfuehren(&self) -> BTreeMap<String, UebersetzungsTabelle> {
        let mut gesamt: BTreeMap<String, UebersetzungsTabelle> = BTreeMap::new();
        for plugin in self.gueltige() {
            let Some(uebersetzungen) = plugin.uebersetzungen() else {
                continue;
            };
            for (locale, tabelle) in uebersetzungen {
                let ziel = gesamt.entry(locale.clone()).or_default();
                for (schluessel, wert) in tabelle {
                    ziel.insert(schluessel.clone(), wert.clone());
                }
            }
        }
        gesamt
    }

    /// Setzt die Umgebungs-Konfiguration aus Basis- und Plugin-Schichten zusammen
    ///
    /// Die Basis-Schicht gewinnt gegen alle Plugins; unter den Plugins
    /// gewinnt das frueher geladene. Die Zusammenfuehrung laeuft seriell,
    /// damit die Praezedenz deterministisch bleibt.
    pub async fn umgebung_zusammenstellen(
        &self,
        basis: KonfigurationsSchicht,
    ) -> Result<KonfigurationsSchicht> {
        let mut gesamt = basis;
        for plugin in self.gueltige() {
            let schicht = plugin.umgebung_laden().await?;
            gesamt.uebernehmen(&schicht);
        }
        Ok(gesamt)
    }

    /// Fuehrt die Befehls-Module aller gueltigen Plugins aus
    pub async fn befehle_importieren(&self) -> Result<()> {
        for plugin in self.gueltige() {
            plugin.befehle_importieren(&self.kontext.registry).await?;
        }
        Ok(())
    }

    /// Fuehrt die Ereignis-Module aller gueltigen Plugins aus
    pub async fn ereignisse_importieren(&self) -> Result<()> {
        for plugin in self.gueltige() {
            plugin.ereignisse_importieren(&self.kontext.registry).await?;
        }
        Ok(())
    }

    /// Fuehrt die Hauptmodule aller gueltigen Plugins aus
    pub async fn hauptmodule_ausfuehren(&self) -> Result<()> {
        for plugin in self.gueltige() {
            plugin.haupt_ausfuehren(&self.kontext.registry).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn manifest_json(name: &str, version: &str, spanne: &str) -> String {
        format!(
            r#"{{"name":"{name}","version":"{version}","hostRequiredVersion":"{spanne}"}}"#
        )
    }

    /// Hilfsfunktion: Erstellt ein Plugin-Verzeichnis unterhalb des Suchpfads
    fn erstelle_test_plugin(wurzel: &Path, name: &str, manifest: &str) -> PathBuf {
        let plugin_dir = wurzel.join(name);
        fs::create_dir_all(&plugin_dir).unwrap();
        fs::write(plugin_dir.join("plugin.json"), manifest).unwrap();
        plugin_dir
    }

    fn test_manager(wurzel: &Path) -> PluginManager {
        PluginManager::neu(
            ManagerKonfiguration {
                plugin_verzeichnis: wurzel.to_path_buf(),
                host_version: Version::parse("1.0.0").unwrap(),
            },
            Arc::new(ModulRegistry::neu()),
        )
    }

    #[tokio::test]
    async fn laden_und_auflisten() {
        let dir = TempDir::new().unwrap();
        erstelle_test_plugin(dir.path(), "alpha", &manifest_json("alpha", "1.0.0", "^1.0.0"));
        erstelle_test_plugin(dir.path(), "beta", &manifest_json("beta", "2.0.0", "^1.0.0"));

        let mut manager = test_manager(dir.path());
        manager.plugins_laden().await.unwrap();

        assert_eq!(manager.anzahl_plugins(), 2);
        assert_eq!(manager.gueltige().count(), 2);

        let liste = manager.plugins_auflisten();
        assert_eq!(liste[0].name.as_deref(), Some("alpha"));
        assert_eq!(liste[1].name.as_deref(), Some("beta"));
    }

    #[tokio::test]
    async fn ungueltige_plugins_bleiben_in_der_liste() {
        let dir = TempDir::new().unwrap();
        erstelle_test_plugin(dir.path(), "gut", &manifest_json("gut", "1.0.0", "*"));
        erstelle_test_plugin(dir.path(), "schlecht", &manifest_json("schlecht", "1.0.0", "^9.0.0"));

        let mut manager = test_manager(dir.path());
        manager.plugins_laden().await.unwrap();

        assert_eq!(manager.anzahl_plugins(), 2);
        assert_eq!(manager.gueltige().count(), 1);

        let liste = manager.plugins_auflisten();
        let schlecht = liste.iter().find(|i| i.pfad.ends_with("schlecht")).unwrap();
        assert!(!schlecht.gueltig);
        assert!(schlecht.ablehnungsgrund.is_some());
    }

    #[tokio::test]
    async fn harter_fehler_schliesst_nur_ein_plugin_aus() {
        let dir = TempDir::new().unwrap();
        erstelle_test_plugin(dir.path(), "gut", &manifest_json("gut", "1.0.0", "*"));
        erstelle_test_plugin(dir.path(), "kaputt", "{ kein json");

        let mut manager = test_manager(dir.path());
        manager.plugins_laden().await.unwrap();

        assert_eq!(manager.anzahl_plugins(), 2);
        assert_eq!(manager.gueltige().count(), 1);
    }

    #[tokio::test]
    async fn fehlendes_verzeichnis_ergibt_keine_plugins() {
        let dir = TempDir::new().unwrap();
        let mut manager = test_manager(&dir.path().join("gibt-es-nicht"));
        manager.plugins_laden().await.unwrap();
        assert_eq!(manager.anzahl_plugins(), 0);
    }

    #[tokio::test]
    async fn lose_dateien_werden_ignoriert() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README.txt"), "kein Plugin").unwrap();
        erstelle_test_plugin(dir.path(), "echt", &manifest_json("echt", "1.0.0", "*"));

        let mut manager = test_manager(dir.path());
        manager.plugins_laden().await.unwrap();
        assert_eq!(manager.anzahl_plugins(), 1);
    }

    #[tokio::test]
    async fn uebersetzungen_zusammenfuehren_letzter_gewinnt() {
        let dir = TempDir::new().unwrap();
        let a = erstelle_test_plugin(dir.path(), "a", &manifest_json("a", "1.0.0", "*"));
        let b = erstelle_test_plugin(dir.path(), "b", &manifest_json("b", "1.0.0", "*"));

        fs::create_dir_all(a.join("i18n")).unwrap();
        fs::write(
            a.join("i18n/de.json"),
            r#"{"gruss":"Hallo von a","nur_a":"a"}"#,
        )
        .unwrap();
        fs::create_dir_all(b.join("i18n")).unwrap();
        fs::write(b.join("i18n/de.json"), r#"{"gruss":"Hallo von b"}"#).unwrap();

        let mut manager = test_manager(dir.path());
        manager.plugins_laden().await.unwrap();

        let gesamt = manager.uebersetzungen_zusammenfuehren();
        let de = &gesamt["de"];
        assert_eq!(de.get("gruss").and_then(|v| v.as_str()), Some("Hallo von b"));
        assert_eq!(de.get("nur_a").and_then(|v| v.as_str()), Some("a"));
    }

    #[tokio::test]
    async fn umgebung_basis_und_fruehere_plugins_gewinnen() {
        let dir = TempDir::new().unwrap();
        let a = erstelle_test_plugin(dir.path(), "a", &manifest_json("a", "1.0.0", "*"));
        let b = erstelle_test_plugin(dir.path(), "b", &manifest_json("b", "1.0.0", "*"));

        fs::create_dir_all(a.join("services")).unwrap();
        fs::write(a.join(".env"), "FARBE=rot\nA_WERT=1\n").unwrap();
        fs::create_dir_all(b.join("services")).unwrap();
        fs::write(b.join(".env"), "FARBE=blau\nPORT=9000\nB_WERT=2\n").unwrap();

        let mut manager = test_manager(dir.path());
        manager.plugins_laden().await.unwrap();

        let mut basis = KonfigurationsSchicht::leer();
        basis.setzen("PORT", "8080");

        let gesamt = manager.umgebung_zusammenstellen(basis).await.unwrap();
        assert_eq!(gesamt.wert("PORT"), Some("8080"));
        assert_eq!(gesamt.wert("FARBE"), Some("rot"));
        assert_eq!(gesamt.wert("A_WERT"), Some("1"));
        assert_eq!(gesamt.wert("B_WERT"), Some("2"));
    }

    #[tokio::test]
    async fn befehle_importieren_nur_fuer_gueltige() {
        let dir = TempDir::new().unwrap();
        erstelle_test_plugin(dir.path(), "gut", &manifest_json("gut", "1.0.0", "*"));
        erstelle_test_plugin(dir.path(), "schlecht", &manifest_json("schlecht", "1.0.0", "^9.0.0"));

        let registry = Arc::new(ModulRegistry::neu());
        let zaehler = Arc::new(AtomicUsize::new(0));
        for plugin in ["gut", "schlecht"] {
            let z = zaehler.clone();
            registry.haken_registrieren(
                plugin,
                crate::types::ModulArt::Befehle,
                Arc::new(move || {
                    z.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            );
        }

        let mut manager = PluginManager::neu(
            ManagerKonfiguration {
                plugin_verzeichnis: dir.path().to_path_buf(),
                host_version: Version::parse("1.0.0").unwrap(),
            },
            registry,
        );
        manager.plugins_laden().await.unwrap();
        manager.befehle_importieren().await.unwrap();

        // Nur das gueltige Plugin hat seine Befehls-Module ausgefuehrt
        assert_eq!(zaehler.load(Ordering::SeqCst), 1);
    }
}
