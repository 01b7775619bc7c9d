use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// NF-e layout versions the TXT format is published for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum LayoutVersion {
    #[serde(rename = "3.10")]
    V310,
    #[default]
    #[serde(rename = "4.00")]
    V400,
}

impl LayoutVersion {
    pub const ALL: [LayoutVersion; 2] = [LayoutVersion::V310, LayoutVersion::V400];

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutVersion::V310 => "3.10",
            LayoutVersion::V400 => "4.00",
        }
    }
}

impl fmt::Display for LayoutVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutVersion {
    type Err = SchemaError;

    /// Accepts `4.00`, `4.0`, `4`, `400` and the same spellings of `3.10`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.trim().chars().filter(|c| *c != '.').collect();
        match compact.trim_end_matches('0') {
            "31" => Ok(LayoutVersion::V310),
            "4" => Ok(LayoutVersion::V400),
            _ => Err(SchemaError::UnsupportedVersion {
                version: s.trim().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_spellings() {
        for raw in ["4.00", "4.0", "4", "400", " 4.00 "] {
            assert_eq!(raw.parse::<LayoutVersion>().unwrap(), LayoutVersion::V400);
        }
        for raw in ["3.10", "3.1", "310"] {
            assert_eq!(raw.parse::<LayoutVersion>().unwrap(), LayoutVersion::V310);
        }
    }

    #[test]
    fn rejects_unknown_versions() {
        let err = "2.00".parse::<LayoutVersion>().unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedVersion { version } if version == "2.00"));
        assert!("".parse::<LayoutVersion>().is_err());
        assert!("3".parse::<LayoutVersion>().is_err());
    }
}
