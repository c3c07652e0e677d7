//! JSON export loading
//!
//! An export file holds any of `namespaces`, `classes` and `listings`. The
//! declaration pass only reads the first two; listings are read again per
//! file by [`ExportSources`] during usage detection.

use std::path::{Path, PathBuf};

use classmap_core::{AnalysisError, ClassDecl, Declarations, SourceListing, SourceProvider};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Full contents of one export file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportFile {
    pub namespaces: Vec<String>,
    pub classes: Vec<ClassDecl>,
    pub listings: Vec<SourceListing>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeclarationPart {
    namespaces: Vec<String>,
    classes: Vec<ClassDecl>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListingPart {
    listings: Vec<SourceListing>,
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T: DeserializeOwned>(path: &Path, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|source| IngestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_export(path: &Path) -> Result<ExportFile> {
    parse(path, &read(path)?)
}

/// Namespaces and classes from every file, in file order.
pub fn load_declarations(files: &[PathBuf]) -> Result<Declarations> {
    let mut declarations = Declarations::default();
    for path in files {
        let part: DeclarationPart = parse(path, &read(path)?)?;
        tracing::debug!(
            "{}: {} namespaces, {} classes",
            path.display(),
            part.namespaces.len(),
            part.classes.len()
        );
        declarations.extend(Declarations {
            namespaces: part.namespaces,
            classes: part.classes,
        });
    }
    tracing::info!(
        "Loaded {} namespaces and {} classes from {} files",
        declarations.namespaces.len(),
        declarations.classes.len(),
        files.len()
    );
    Ok(declarations)
}

/// Source listings read lazily from export files, one unit per file.
#[derive(Debug, Clone)]
pub struct ExportSources {
    files: Vec<PathBuf>,
}

impl ExportSources {
    pub fn new(files: Vec<PathBuf>) -> Self {
        ExportSources { files }
    }

    fn unit_name(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }
}

impl SourceProvider for ExportSources {
    fn units(&self) -> Vec<String> {
        self.files.iter().map(|p| Self::unit_name(p)).collect()
    }

    fn load(&self, unit: &str) -> classmap_core::Result<Vec<SourceListing>> {
        let path = Path::new(unit);
        let text = std::fs::read_to_string(path).map_err(|source| AnalysisError::SourceRead {
            unit: unit.to_string(),
            source,
        })?;
        let part: ListingPart = serde_json::from_str(&text).map_err(|e| AnalysisError::SourceFormat {
            unit: unit.to_string(),
            message: e.to_string(),
        })?;
        Ok(part.listings)
    }
}
