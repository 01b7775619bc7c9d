//! Splitting a TXT file into documents.

use nfe_model::{RecordCode, SourceLine};
use tracing::{debug, warn};

use crate::error::{IngestError, Result};
use crate::tokenizer::leading_field;

/// Code of the optional first line declaring how many documents follow.
pub const HEADER_CODE: &str = "NOTAFISCAL";
/// Code of the record that opens every document.
pub const DOCUMENT_START_CODE: &str = "A";

/// Options controlling how input files are framed.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Compare the `NOTAFISCAL|<count>|` header against the documents found.
    pub check_header: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { check_header: true }
    }
}

impl IngestOptions {
    pub fn with_check_header(mut self, check_header: bool) -> Self {
        self.check_header = check_header;
        self
    }
}

/// Lines of one document, from its `A` record up to the next one.
///
/// Blank lines are already removed; every line keeps its source number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// 1-based position of the document in its file.
    pub index: usize,
    pub lines: Vec<SourceLine>,
}

impl Document {
    pub fn first_line_number(&self) -> Option<usize> {
        self.lines.first().map(|line| line.number)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Group numbered lines into documents.
pub fn split_documents(lines: Vec<SourceLine>, options: &IngestOptions) -> Result<Vec<Document>> {
    let mut declared: Option<usize> = None;
    let mut documents: Vec<Document> = Vec::new();

    for line in lines {
        if line.text.trim().is_empty() {
            continue;
        }
        let code = RecordCode::normalize(leading_field(&line.text));

        if code.as_str() == HEADER_CODE && documents.is_empty() && declared.is_none() {
            declared = Some(parse_header_count(&line)?);
            continue;
        }
        if code.as_str() == DOCUMENT_START_CODE {
            documents.push(Document {
                index: documents.len() + 1,
                lines: Vec::new(),
            });
        }
        match documents.last_mut() {
            Some(document) => document.lines.push(line),
            None => {
                return Err(IngestError::OrphanLine {
                    line_number: line.number,
                    code: code.to_string(),
                });
            }
        }
    }

    if let Some(declared) = declared {
        if declared != documents.len() {
            if options.check_header {
                return Err(IngestError::DocumentCountMismatch {
                    declared,
                    found: documents.len(),
                });
            }
            warn!(
                declared,
                found = documents.len(),
                "document count does not match NOTAFISCAL header"
            );
        }
    }
    debug!(documents = documents.len(), "split input into documents");
    Ok(documents)
}

fn parse_header_count(line: &SourceLine) -> Result<usize> {
    let value = line.text.split('|').nth(1).unwrap_or_default().trim();
    value
        .parse::<usize>()
        .map_err(|_| IngestError::InvalidHeader {
            line_number: line.number,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::split_lines;

    fn split(text: &str, options: &IngestOptions) -> Result<Vec<Document>> {
        split_documents(split_lines(text), options)
    }

    #[test]
    fn splits_on_a_records() {
        let docs = split(
            "NOTAFISCAL|2|\nA|4.00|NFe1|\nB|35|\n\nA|4.00|NFe2|\nB|35|\nC|x|\n",
            &IngestOptions::default(),
        )
        .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].index, 1);
        assert_eq!(docs[0].len(), 2);
        assert_eq!(docs[1].first_line_number(), Some(5));
        assert_eq!(docs[1].lines[2].text, "C|x|");
    }

    #[test]
    fn header_count_must_match() {
        let err = split("NOTAFISCAL|3|\nA|4.00|\n", &IngestOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::DocumentCountMismatch {
                declared: 3,
                found: 1
            }
        ));

        let docs = split(
            "NOTAFISCAL|3|\nA|4.00|\n",
            &IngestOptions::default().with_check_header(false),
        )
        .unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn header_is_optional() {
        let docs = split("a|4.00|\nB|35|\n", &IngestOptions::default()).unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn rejects_lines_before_first_document() {
        let err = split("B|35|\nA|4.00|\n", &IngestOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::OrphanLine { line_number: 1, ref code } if code == "B"
        ));
    }

    #[test]
    fn rejects_non_numeric_header() {
        let err = split("NOTAFISCAL|two|\nA|4.00|\n", &IngestOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidHeader { line_number: 1, .. }));
    }
}
