//! Byte decoding and line framing.

use nfe_model::SourceLine;

const BOM: char = '\u{feff}';

/// Decode TXT bytes as UTF-8, falling back to ISO-8859-1 when the input is
/// not valid UTF-8. A leading byte-order mark is dropped.
pub fn decode_bytes(bytes: &[u8]) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            tracing::debug!("input is not valid UTF-8; decoding as ISO-8859-1");
            bytes.iter().map(|&byte| char::from(byte)).collect()
        }
    };
    match text.strip_prefix(BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Split text into numbered lines, accepting `\n`, `\r\n` and bare `\r`.
///
/// Numbering is 1-based and counts blank lines, so numbers match what an
/// editor shows.
pub fn split_lines(text: &str) -> Vec<SourceLine> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<SourceLine> = normalized
        .split('\n')
        .enumerate()
        .map(|(index, line)| SourceLine::new(index + 1, line))
        .collect();
    if lines.last().is_some_and(|line| line.text.is_empty()) {
        lines.pop();
    }
    lines
}
