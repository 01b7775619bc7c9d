use nfe_model::{RawRecord, SourceLine};

use crate::error::{IngestError, Result};

pub const DELIMITER: char = '|';

/// Split one line on the pipe delimiter.
///
/// Purely mechanical: no trimming, no sanitizing, no field-count checks. A
/// trailing delimiter yields a trailing empty field, which the binder ignores
/// because it lies beyond every layout. Lines with no visible characters
/// carry no code and are rejected.
pub fn tokenize(line: &SourceLine) -> Result<RawRecord> {
    if line.text.trim().is_empty() {
        return Err(IngestError::EmptyRecord {
            line_number: line.number,
        });
    }
    Ok(RawRecord {
        fields: line.text.split(DELIMITER).map(str::to_string).collect(),
        line_number: line.number,
    })
}

/// Raw leading segment of `text`, i.e. the unnormalized record code.
pub(crate) fn leading_field(text: &str) -> &str {
    text.split(DELIMITER).next().unwrap_or_default()
}
