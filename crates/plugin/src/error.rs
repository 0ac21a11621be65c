//! Fehlertypen fuer das Plugin-System
//!
//! Nur unerwartete Fehler landen hier: Validierungsfehler eines Manifests
//! werden lokal behandelt und hinterlassen den Zustand `Ungueltig` statt
//! eines `Err`.

use thiserror::Error;

use crate::types::ModulArt;

/// Alle unerwarteten Fehler im Plugin-System
#[derive(Debug, Error)]
pub enum PluginError {
    // --- Manifest ---
    #[error("Manifest nicht lesbar: {0}")]
    ManifestSyntax(String),

    // --- Module & Registry ---
    #[error("Modul '{art}' von Plugin '{plugin}' ist nicht registriert")]
    ModulNichtRegistriert { plugin: String, art: ModulArt },

    #[error("Modul '{art}' von Plugin '{plugin}' fehlgeschlagen: {quelle}")]
    Modul {
        plugin: String,
        art: ModulArt,
        quelle: anyhow::Error,
    },

    // --- Uebersetzungen ---
    #[error("Uebersetzungsdatei '{pfad}' nicht lesbar: {grund}")]
    Uebersetzung { pfad: String, grund: String },

    // --- IO ---
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    // --- Kern ---
    #[error(transparent)]
    Kern(#[from] stammtisch_core::StammtischError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Result-Alias fuer das Plugin-System
pub type Result<T> = std::result::Result<T, PluginError>;
