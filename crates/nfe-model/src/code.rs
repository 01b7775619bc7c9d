use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized record-type code (`C02a`, ` c02A ` and `C02A` are the same code).
///
/// Normalization strips every whitespace character and upper-cases ASCII
/// letters. The normalized form is what schema registries and the handler
/// table are keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordCode(String);

impl RecordCode {
    pub fn normalize(raw: &str) -> Self {
        let code: String = raw
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .map(|ch| ch.to_ascii_uppercase())
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RecordCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RecordCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordCode {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_spaces() {
        assert_eq!(RecordCode::normalize("c02a").as_str(), "C02A");
        assert_eq!(RecordCode::normalize(" Z_user ").as_str(), "Z_USER");
        assert_eq!(RecordCode::normalize("B A02").as_str(), "BA02");
    }

    #[test]
    fn borrows_as_str_for_map_lookups() {
        let mut map = std::collections::HashMap::new();
        map.insert(RecordCode::normalize("w25a1"), 1);
        assert_eq!(map.get("W25A1"), Some(&1));
    }
}
