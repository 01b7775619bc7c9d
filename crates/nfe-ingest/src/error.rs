//! Error types for TXT ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading and framing TXT input.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line_number}: empty record")]
    EmptyRecord { line_number: usize },

    #[error("line {line_number}: record {code} appears before the first A record")]
    OrphanLine { line_number: usize, code: String },

    #[error("line {line_number}: invalid NOTAFISCAL header count {value:?}")]
    InvalidHeader { line_number: usize, value: String },

    #[error("NOTAFISCAL header declares {declared} document(s) but {found} were found")]
    DocumentCountMismatch { declared: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, IngestError>;
