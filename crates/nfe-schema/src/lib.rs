#![deny(unsafe_code)]

//! Schema registry for the NF-e TXT format.
//!
//! Each supported [`LayoutVersion`] maps every record-type code to the
//! ordered list of attribute names bound from its positional values. Layouts
//! are stored as JSON files under `layouts/` and pinned by SHA-256 in
//! `layouts/manifest.toml`.

pub mod error;
pub mod hash;
pub mod layout;
pub mod manifest;
pub mod paths;
pub mod registry;
pub mod summary;
pub mod version;

pub use crate::error::SchemaError;
pub use crate::layout::RecordLayout;
pub use crate::paths::{LAYOUTS_ENV_VAR, layouts_root};
pub use crate::registry::SchemaRegistry;
pub use crate::summary::LayoutSummary;
pub use crate::version::LayoutVersion;
