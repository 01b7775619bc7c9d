use std::path::Path;

use tracing::info;

use crate::decode::{decode_bytes, split_lines};
use crate::document::{Document, IngestOptions, split_documents};
use crate::error::{IngestError, Result};

/// Read a TXT file and split it into documents.
pub fn read_input(path: &Path, options: &IngestOptions) -> Result<Vec<Document>> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let documents = parse_input(&bytes, options)?;
    info!(
        path = %path.display(),
        bytes = bytes.len(),
        documents = documents.len(),
        "read TXT input"
    );
    Ok(documents)
}

/// Decode and split in-memory TXT content.
pub fn parse_input(bytes: &[u8], options: &IngestOptions) -> Result<Vec<Document>> {
    let text = decode_bytes(bytes);
    split_documents(split_lines(&text), options)
}
