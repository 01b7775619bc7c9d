//! Ingestion of NF-e TXT files.
//!
//! Turns raw bytes into numbered [`SourceLine`](nfe_model::SourceLine)s,
//! groups them into [`Document`]s and tokenizes single lines into
//! [`RawRecord`](nfe_model::RawRecord)s.

pub mod decode;
pub mod document;
pub mod error;
pub mod reader;
pub mod tokenizer;

pub use decode::{decode_bytes, split_lines};
pub use document::{DOCUMENT_START_CODE, Document, HEADER_CODE, IngestOptions, split_documents};
pub use error::{IngestError, Result};
pub use reader::{parse_input, read_input};
pub use tokenizer::tokenize;
