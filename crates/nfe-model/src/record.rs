use serde::Serialize;

use crate::code::RecordCode;

/// One physical input line together with its 1-based position in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

impl SourceLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Raw pipe-delimited fields of one record.
///
/// `fields[0]` is the record-type code exactly as written; the remaining
/// entries are positional values, untrimmed and unsanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub fields: Vec<String>,
    pub line_number: usize,
}

impl RawRecord {
    pub fn code(&self) -> RecordCode {
        self.fields
            .first()
            .map(|raw| RecordCode::normalize(raw))
            .unwrap_or_else(|| RecordCode::normalize(""))
    }

    /// Positional value `index` (1-based, the code sits at 0).
    pub fn value(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}
