//! Grundlegende Typen fuer das Plugin-System

use std::any::Any;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Art eines Plugin-Moduls – bestimmt den zustaendigen Registry-Abschnitt
/// und das Unterverzeichnis, dessen Existenz das Modul freischaltet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModulArt {
    /// Entitaets-Definitionen unter `entities/`
    Entitaeten,
    /// API-Controller unter `api/controllers/`
    Controller,
    /// Dienste unter `services/`
    Dienste,
    /// Das Hauptmodul `main.rs`
    Haupt,
    /// Befehls-Module unter `commands/`
    Befehle,
    /// Ereignis-Module unter `events/`
    Ereignisse,
}

impl std::fmt::Display for ModulArt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModulArt::Entitaeten => "entities",
            ModulArt::Controller => "api/controllers",
            ModulArt::Dienste => "services",
            ModulArt::Haupt => "main",
            ModulArt::Befehle => "commands",
            ModulArt::Ereignisse => "events",
        };
        write!(f, "{name}")
    }
}

/// Undurchsichtiger Export-Traeger – der Host kennt den konkreten Typ
/// und downcastet selbst
pub type ExportRef = Arc<dyn Any + Send + Sync>;

/// Export-Name -> Export, wie ein importiertes Modul sie liefern wuerde
pub type ExportTabelle = BTreeMap<String, ExportRef>;

/// Lokalisierte Zeichenketten-Tabelle einer einzelnen Sprache
pub type UebersetzungsTabelle = serde_json::Map<String, serde_json::Value>;

/// Fabrik die beim Laden eines Plugins die Exporte eines Moduls materialisiert
pub type ModulFabrik = Arc<dyn Fn() -> anyhow::Result<ExportTabelle> + Send + Sync>;

/// Haken fuer Module die nur wegen ihrer Seiteneffekte geladen werden
/// (Befehle, Ereignisse, Hauptmodul)
pub type SeiteneffektHaken = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// Die vier memoisierten Ressourcen-Tabellen eines gueltigen Plugins
#[derive(Clone, Default)]
pub struct PluginRessourcen {
    pub entitaeten: ExportTabelle,
    pub controller: ExportTabelle,
    pub dienste: ExportTabelle,
    pub uebersetzungen: BTreeMap<String, UebersetzungsTabelle>,
}

/// Oeffentliche Informationen ueber ein Plugin (fuer UI und Diagnose)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: Option<String>,
    pub version: Option<String>,
    pub pfad: PathBuf,
    pub gueltig: bool,
    pub ablehnungsgrund: Option<String>,
    pub geladen_am: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modul_art_anzeige() {
        assert_eq!(ModulArt::Entitaeten.to_string(), "entities");
        assert_eq!(ModulArt::Controller.to_string(), "api/controllers");
        assert_eq!(ModulArt::Dienste.to_string(), "services");
        assert_eq!(ModulArt::Haupt.to_string(), "main");
        assert_eq!(ModulArt::Befehle.to_string(), "commands");
        assert_eq!(ModulArt::Ereignisse.to_string(), "events");
    }

    #[test]
    fn export_ref_downcast() {
        struct Testexport {
            wert: u32,
        }

        let mut tabelle = ExportTabelle::new();
        tabelle.insert("Test".into(), Arc::new(Testexport { wert: 7 }) as ExportRef);

        let export = tabelle.get("Test").unwrap().clone();
        let konkret = export.downcast::<Testexport>().ok().unwrap();
        assert_eq!(konkret.wert, 7);
    }

    #[test]
    fn plugin_info_serde() {
        let info = PluginInfo {
            name: Some("wetter".into()),
            version: Some("1.0.0".into()),
            pfad: PathBuf::from("/plugins/wetter"),
            gueltig: true,
            ablehnungsgrund: None,
            geladen_am: Some(Utc::now()),
        };
        let json = serde_json::to_string(&info).unwrap();
        let info2: PluginInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info2.name.as_deref(), Some("wetter"));
        assert!(info2.gueltig);
    }

    #[test]
    fn ressourcen_standard_ist_leer() {
        let r = PluginRessourcen::default();
        assert!(r.entitaeten.is_empty());
        assert!(r.controller.is_empty());
        assert!(r.dienste.is_empty());
        assert!(r.uebersetzungen.is_empty());
    }
}
