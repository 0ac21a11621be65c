//! Plugin-Manifest Parsing (plugin.json)
//!
//! Jedes Plugin liefert eine plugin.json die Name, Version und die vom
//! Plugin erwartete Host-Versionsspanne beschreibt. Inhaltliche Probleme
//! sind Validierungsfehler und landen als [`ManifestErgebnis::Ungueltig`]
//! im Ergebnis; Syntax- und Typfehler im JSON sind harte Fehler.

use semver::{Version, VersionReq};
use serde::Deserialize;

use crate::error::{PluginError, Result};

/// Rohdaten wie sie in plugin.json stehen – alle Felder optional, damit
/// die Pflichtfeld-Pruefung geordnete Diagnosen liefern kann
#[derive(Debug, Deserialize)]
struct RohManifest {
    name: Option<String>,
    version: Option<String>,
    #[serde(rename = "hostRequiredVersion")]
    host_required_version: Option<String>,
}

/// Validiertes Plugin-Manifest
#[derive(Debug, Clone)]
pub struct PluginManifest {
    pub name: String,
    pub version: Version,
    pub host_required_version: VersionReq,
}

/// Ergebnis der Manifest-Pruefung
#[derive(Debug, Clone)]
pub enum ManifestErgebnis {
    /// Manifest ist vollstaendig und mit der Host-Version kompatibel
    Gueltig(PluginManifest),
    /// Manifest wurde abgelehnt – menschenlesbarer Grund
    Ungueltig(String),
}

impl PluginManifest {
    /// Parst und prueft ein Manifest gegen die Host-Version
    ///
    /// Die Pruefreihenfolge ist fest: Pflichtfelder, Namensmuster,
    /// Versions-Syntax, Kompatibilitaet. Die erste Verletzung gewinnt.
    pub fn pruefen(inhalt: &str, host_version: &Version) -> Result<ManifestErgebnis> {
        let roh: RohManifest = serde_json::from_str(inhalt)
            .map_err(|e| PluginError::ManifestSyntax(e.to_string()))?;

        let Some(name) = feld(roh.name) else {
            return abgelehnt("Name fehlt in plugin.json");
        };
        let Some(version) = feld(roh.version) else {
            return abgelehnt("Version fehlt in plugin.json");
        };
        let Some(spanne) = feld(roh.host_required_version) else {
            return abgelehnt("hostRequiredVersion fehlt in plugin.json");
        };

        if !name_gueltig(&name) {
            return abgelehnt("Ungueltiger Name in plugin.json");
        }
        let Ok(version) = Version::parse(&version) else {
            return abgelehnt("Ungueltige Version in plugin.json");
        };

        // Unparsbare Spannen zaehlen als nicht erfuellt
        let host_required_version = match VersionReq::parse(&spanne) {
            Ok(req) if req.matches(host_version) => req,
            _ => {
                return abgelehnt(format!(
                    "Nicht kompatibel mit der aktuellen Host-Version v{host_version}"
                ))
            }
        };

        Ok(ManifestErgebnis::Gueltig(PluginManifest {
            name,
            version,
            host_required_version,
        }))
    }
}

/// Behandelt leere Strings wie fehlende Felder
fn feld(wert: Option<String>) -> Option<String> {
    wert.filter(|w| !w.is_empty())
}

fn abgelehnt(grund: impl Into<String>) -> Result<ManifestErgebnis> {
    Ok(ManifestErgebnis::Ungueltig(grund.into()))
}

/// Prueft das Namensmuster `[a-zA-Z0-9-_]+`
fn name_gueltig(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
