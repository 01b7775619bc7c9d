//! Property tests for the tokenizer and line framing.

use nfe_ingest::{split_lines, tokenize};
use nfe_model::SourceLine;
use proptest::prelude::*;

proptest! {
    #[test]
    fn field_count_follows_delimiters(text in "[A-Z0-9]{1,4}(\\|[a-zA-Z0-9 .,]{0,8}){0,12}\\|?") {
        let record = tokenize(&SourceLine::new(1, text.clone())).unwrap();
        prop_assert_eq!(record.fields.len(), text.matches('|').count() + 1);
        prop_assert_eq!(record.fields.join("|"), text);
    }

    #[test]
    fn split_lines_never_yields_line_breaks(text in "[A-Z|0-9\r\n]{0,64}") {
        for line in split_lines(&text) {
            prop_assert!(!line.text.contains('\n'));
            prop_assert!(!line.text.contains('\r'));
            prop_assert!(line.number >= 1);
        }
    }
}
