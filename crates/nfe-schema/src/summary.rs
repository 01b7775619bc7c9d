#![deny(unsafe_code)]

use std::path::PathBuf;

use serde::Serialize;

use crate::registry::SchemaRegistry;
use crate::version::LayoutVersion;

/// Serializable overview of one loaded layout version.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutSummary {
    pub schema: String,
    pub schema_version: u32,
    pub version: LayoutVersion,
    pub source: Option<PathBuf>,
    pub sha256: Option<String>,
    pub counts: LayoutCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutCounts {
    pub records: usize,
    /// Records with no bound fields (group markers such as `BA` or `W`).
    pub markers: usize,
    pub fields: usize,
}

impl LayoutSummary {
    pub fn from_registry(registry: &SchemaRegistry) -> Self {
        let mut counts = LayoutCounts {
            records: 0,
            markers: 0,
            fields: 0,
        };
        for layout in registry.layouts() {
            counts.records += 1;
            let bound = layout.bound_names().count();
            if bound == 0 {
                counts.markers += 1;
            }
            counts.fields += bound;
        }
        Self {
            schema: "nfe-txt.layouts-summary".to_string(),
            schema_version: 1,
            version: registry.version(),
            source: registry.source().map(PathBuf::from),
            sha256: registry.sha256().map(str::to_string),
            counts,
        }
    }
}
