//! Fehlertypen fuer Stammtisch
//!
//! Zentraler Fehler-Enum der die gemeinsamen Fehlerzustaende abdeckt.
//! Untermodule koennen eigene Fehler definieren und via `#[from]` konvertieren.

use thiserror::Error;

/// Globaler Result-Alias fuer Stammtisch
pub type Result<T> = std::result::Result<T, StammtischError>;

/// Gemeinsame Fehler im Stammtisch-System
#[derive(Debug, Error)]
pub enum StammtischError {
    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl StammtischError {
    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige_konfiguration() {
        let e = StammtischError::Konfiguration("Zeile 3: '=' fehlt".into());
        assert_eq!(e.to_string(), "Konfigurationsfehler: Zeile 3: '=' fehlt");
    }

    #[test]
    fn intern_hilfsfunktion() {
        let e = StammtischError::intern("kaputt");
        assert_eq!(e.to_string(), "Interner Fehler: kaputt");
    }

    #[test]
    fn anyhow_konvertierung() {
        let e: StammtischError = anyhow::anyhow!("von anyhow").into();
        assert!(e.to_string().contains("von anyhow"));
    }
}
