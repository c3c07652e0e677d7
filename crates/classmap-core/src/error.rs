//! Error type for the analysis pipeline

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to read source unit {unit}: {source}")]
    SourceRead {
        unit: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed source unit {unit}: {message}")]
    SourceFormat { unit: String, message: String },

    #[error("usage detection failed for {} source unit(s): {}", .0.len(), summarize(.0))]
    UsageDetection(Vec<AnalysisError>),

    #[error("failed to serialize view {name}: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn summarize(failures: &[AnalysisError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
