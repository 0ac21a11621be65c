//! stammtisch-core – Gemeinsame Fehlertypen und Konfigurationsschichten
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von den
//! anderen Stammtisch-Crates gemeinsam genutzt werden: den zentralen
//! Fehler-Enum sowie die Konfigurationsschichten, mit denen der Host
//! Umgebungswerte aus mehreren Quellen zusammenfuehrt.

pub mod config;
pub mod error;

// Re-Exporte fuer bequemen Zugriff
pub use config::KonfigurationsSchicht;
pub use error::{Result, StammtischError};
