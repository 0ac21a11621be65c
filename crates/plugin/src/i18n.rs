//! Entdeckung lokalisierter Zeichenketten-Tabellen unter `i18n/`
//!
//! Jede Datei `i18n/<locale>.json` wird als JSON-Objekt gelesen und unter
//! ihrem Locale-Kennzeichen abgelegt: dem Dateinamen-Text bis zum ersten
//! Punkt. Dateinamen ohne ableitbares Kennzeichen landen unter dem
//! woertlichen Schluessel `"unknown"`.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{PluginError, Result};
use crate::types::UebersetzungsTabelle;

/// Ersatz-Schluessel fuer Dateinamen ohne Locale-Kennzeichen
const UNBEKANNTES_LOCALE: &str = "unknown";

/// Sammelt alle Uebersetzungs-Tabellen eines Plugin-Verzeichnisses ein
///
/// Ein fehlendes `i18n/`-Verzeichnis ergibt eine leere Tabelle (leere
/// Glob-Treffermenge). Nicht parsbares JSON ist ein harter Fehler.
pub async fn uebersetzungen_entdecken(
    plugin_pfad: &Path,
) -> Result<BTreeMap<String, UebersetzungsTabelle>> {
    let verzeichnis = plugin_pfad.join("i18n");
    let mut tabellen = BTreeMap::new();

    let mut leser = match tokio::fs::read_dir(&verzeichnis).await {
        Ok(leser) => leser,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(tabellen),
        Err(e) => return Err(e.into()),
    };

    let mut dateien = Vec::new();
    while let Some(eintrag) = leser.next_entry().await? {
        let pfad = eintrag.path();
        if eintrag.file_type().await?.is_file()
            && pfad.extension().and_then(|e| e.to_str()) == Some("json")
        {
            dateien.push(pfad);
        }
    }
    // Sortierte Reihenfolge, damit doppelte Locale-Schluessel deterministisch
    // aufgeloest werden (letzter gewinnt)
    dateien.sort();

    for datei in dateien {
        let locale = locale_aus_dateiname(&datei);
        let inhalt = tokio::fs::read_to_string(&datei).await?;
        let tabelle: UebersetzungsTabelle =
            serde_json::from_str(&inhalt).map_err(|e| PluginError::Uebersetzung {
                pfad: datei.display().to_string(),
                grund: e.to_string(),
            })?;
        tabellen.insert(locale, tabelle);
    }

    Ok(tabellen)
}

/// Leitet das Locale-Kennzeichen aus dem Dateinamen ab: Text bis zum ersten Punkt
fn locale_aus_dateiname(pfad: &Path) -> String {
    let name = pfad.file_name().and_then(|n| n.to_str()).unwrap_or("");
    match name.split('.').next() {
        Some(locale) if !locale.is_empty() => locale.to_string(),
        _ => UNBEKANNTES_LOCALE.to_string(),
    }
}
