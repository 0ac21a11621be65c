//! stammtisch-plugin – Verzeichnisbasiertes Plugin-System
//!
//! Dieses Crate implementiert das Plugin-System fuer die Stammtisch
//! Host-Anwendung. Ein Plugin ist ein Verzeichnis mit einer `plugin.json`,
//! optionalen Ressourcen-Unterverzeichnissen (`entities/`,
//! `api/controllers/`, `services/`, `i18n/`) und in der
//! [`registry::ModulRegistry`] hinterlegten Modulen.
//!
//! # Architektur
//! - [`manager::PluginManager`] – Entdeckung, Laden, Aggregation
//! - [`loader::Plugin`] – Validierung und Ressourcen eines Plugins
//! - [`manifest::PluginManifest`] – plugin.json und Host-Kompatibilitaet
//! - [`registry::ModulRegistry`] – Fabriken und Seiteneffekt-Haken
//! - [`i18n`] – Lokalisierte Zeichenketten-Tabellen

pub mod error;
pub mod i18n;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod registry;
pub mod types;

// Bequeme Re-Exporte
pub use error::{PluginError, Result};
pub use loader::{LadeKontext, Plugin};
pub use manager::{ManagerKonfiguration, PluginManager};
pub use manifest::{ManifestErgebnis, PluginManifest};
pub use registry::ModulRegistry;
pub use types::{
    ExportRef, ExportTabelle, ModulArt, ModulFabrik, PluginInfo, PluginRessourcen,
    SeiteneffektHaken, UebersetzungsTabelle,
};
