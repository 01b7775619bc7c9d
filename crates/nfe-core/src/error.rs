//! Conversion errors.

use nfe_model::EntityKind;
use nfe_schema::SchemaError;
use thiserror::Error;

/// Fatal outcome of converting one document.
///
/// The assembler is fail-fast: any of these aborts the document and no
/// entity of it reaches the builder.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("line {line_number}: empty record")]
    EmptyRecord { line_number: usize },

    #[error("line {line_number}: unrecognized record type {code:?} in {line:?}")]
    UnrecognizedRecordType {
        code: String,
        line: String,
        line_number: usize,
    },

    #[error("line {line_number}: record {code} requires {context}")]
    MissingContext {
        code: String,
        context: String,
        line_number: usize,
    },

    #[error("failed to load record layouts: {0}")]
    SchemaLoadFailure(#[from] SchemaError),

    #[error("layout {version} declares record types without a handler: {}", codes.join(", "))]
    UnmappedLayout { version: String, codes: Vec<String> },

    #[error("document builder rejected {kind}: {message}")]
    BuilderRejection { kind: EntityKind, message: String },
}

/// Refusal of a [`DocumentBuilder`](crate::DocumentBuilder) to accept an entity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct BuilderError {
    pub message: String,
}

impl BuilderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
