//! Konfigurationsschichten fuer Stammtisch
//!
//! Ersetzt prozessweite Umgebungs-Mutation durch explizite Schichten:
//! jede Quelle (Host-Umgebung, `.env`-Dateien einzelner Plugins) wird zu
//! einer [`KonfigurationsSchicht`], die der Host in definierter
//! Reihenfolge zusammenfuehrt. Bereits gesetzte Schluessel werden beim
//! Zusammenfuehren nie ueberschrieben.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StammtischError};

/// Eine Menge von Konfigurationswerten (Schluessel -> Wert)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KonfigurationsSchicht {
    werte: BTreeMap<String, String>,
}

impl KonfigurationsSchicht {
    /// Erstellt eine leere Schicht
    pub fn leer() -> Self {
        Self::default()
    }

    /// Parst eine Schicht aus dotenv-artigem Text
    ///
    /// Unterstuetzt `SCHLUESSEL=WERT`-Zeilen, `#`-Kommentare, Leerzeilen,
    /// ein optionales `export `-Praefix sowie passende Anfuehrungszeichen
    /// um den Wert.
    pub fn aus_env_text(text: &str) -> Result<Self> {
        let mut werte = BTreeMap::new();

        for (nr, zeile) in text.lines().enumerate() {
            let zeile = zeile.trim();
            if zeile.is_empty() || zeile.starts_with('#') {
                continue;
            }
            let zeile = zeile.strip_prefix("export ").unwrap_or(zeile);

            let Some((schluessel, wert)) = zeile.split_once('=') else {
                return Err(StammtischError::Konfiguration(format!(
                    "Zeile {}: '=' fehlt",
                    nr + 1
                )));
            };
            let schluessel = schluessel.trim();
            if schluessel.is_empty() {
                return Err(StammtischError::Konfiguration(format!(
                    "Zeile {}: leerer Schluessel",
                    nr + 1
                )));
            }

            werte.insert(
                schluessel.to_string(),
                wert_entquoten(wert.trim()).to_string(),
            );
        }

        Ok(Self { werte })
    }

    /// Gibt den Wert zu einem Schluessel zurueck
    pub fn wert(&self, schluessel: &str) -> Option<&str> {
        self.werte.get(schluessel).map(String::as_str)
    }

    /// Setzt einen Wert (ueberschreibt einen bestehenden)
    pub fn setzen(&mut self, schluessel: impl Into<String>, wert: impl Into<String>) {
        self.werte.insert(schluessel.into(), wert.into());
    }

    /// Fuehrt eine andere Schicht ein, ohne bestehende Schluessel zu ueberschreiben
    pub fn uebernehmen(&mut self, andere: &KonfigurationsSchicht) {
        for (schluessel, wert) in &andere.werte {
            self.werte
                .entry(schluessel.clone())
                .or_insert_with(|| wert.clone());
        }
    }

    /// Anzahl der Eintraege
    pub fn anzahl(&self) -> usize {
        self.werte.len()
    }

    /// Gibt true zurueck wenn die Schicht keine Eintraege hat
    pub fn ist_leer(&self) -> bool {
        self.werte.is_empty()
    }

    /// Iteriert ueber alle Eintraege in Schluessel-Reihenfolge
    pub fn eintraege(&self) -> impl Iterator<Item = (&str, &str)> {
        self.werte.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Entfernt passende Anfuehrungszeichen um einen Wert
fn wert_entquoten(wert: &str) -> &str {
    let bytes = wert.as_bytes();
    if bytes.len() >= 2 {
        let erster = bytes[0];
        let letzter = bytes[bytes.len() - 1];
        if erster == letzter && (erster == b'"' || erster == b'\'') {
            return &wert[1..wert.len() - 1];
        }
    }
    wert
}
