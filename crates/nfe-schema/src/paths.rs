//! Layouts directory path resolution.

use std::path::PathBuf;

/// Environment variable for overriding the layouts directory.
pub const LAYOUTS_ENV_VAR: &str = "NFE_LAYOUTS_DIR";

/// Get the layouts root directory.
///
/// Resolution order:
/// 1. `NFE_LAYOUTS_DIR` environment variable
/// 2. `layouts/` directory relative to workspace root
///
/// # Example
///
/// ```rust,ignore
/// let root = nfe_schema::layouts_root();
/// let registry = nfe_schema::SchemaRegistry::load(&root, LayoutVersion::V400)?;
/// ```
pub fn layouts_root() -> PathBuf {
    if let Ok(root) = std::env::var(LAYOUTS_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../layouts")
}
