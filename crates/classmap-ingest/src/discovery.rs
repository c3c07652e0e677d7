//! Discovery of declaration export files

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{IngestError, Result};

/// Export files under `root` with the given extension, sorted by path.
///
/// `.gitignore` rules are honoured; hidden files are not skipped unless an
/// ignore file says so. A `root` that is itself a file is returned as is.
pub fn find_export_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        return Err(IngestError::NotFound(root.to_path_buf()));
    }

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .require_git(false)
        .follow_links(false)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| IngestError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    tracing::info!("Found {} export files in {}", files.len(), root.display());
    Ok(files)
}
