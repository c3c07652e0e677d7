//! Classmap ingest: reading declaration exports and configuration

pub mod config;
pub mod discovery;
pub mod error;
pub mod loader;

#[cfg(test)]
pub mod tests;

pub use config::{Config, CONFIG_FILE};
pub use discovery::find_export_files;
pub use error::{ConfigError, IngestError, Result};
pub use loader::{load_declarations, read_export, ExportFile, ExportSources};
