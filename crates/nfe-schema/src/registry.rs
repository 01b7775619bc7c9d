#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use nfe_model::RecordCode;
use tracing::{debug, info};

use crate::error::SchemaError;
use crate::hash::{is_sha256_hex, sha256_hex};
use crate::layout::RecordLayout;
use crate::manifest::{
    MANIFEST_FILE, MANIFEST_SCHEMA, MANIFEST_SCHEMA_VERSION, Manifest, ManifestLayout,
};
use crate::summary::LayoutSummary;
use crate::version::LayoutVersion;

/// Read-only lookup from record-type code to [`RecordLayout`] for one
/// layout version.
///
/// The version is fixed for the lifetime of the registry; a conversion never
/// switches layouts mid-document.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    version: LayoutVersion,
    source: Option<PathBuf>,
    sha256: Option<String>,
    layouts: BTreeMap<RecordCode, RecordLayout>,
}

impl SchemaRegistry {
    /// Verify `layouts_dir/manifest.toml` and load the layout pinned for
    /// `version`.
    pub fn load(layouts_dir: &Path, version: LayoutVersion) -> Result<Self, SchemaError> {
        let manifest = Self::load_manifest(layouts_dir)?;
        let entry = manifest
            .layouts
            .iter()
            .find(|entry| entry.version.parse::<LayoutVersion>().ok() == Some(version))
            .ok_or_else(|| SchemaError::MissingVersion {
                version: version.to_string(),
            })?;

        let path = layouts_dir.join(&entry.path);
        let bytes = verify_file(&path, entry)?;
        let definitions: BTreeMap<String, String> =
            serde_json::from_slice(&bytes).map_err(|source| SchemaError::Json {
                path: path.clone(),
                source,
            })?;

        let layouts = collect_layouts(definitions)?;
        info!(
            version = %version,
            records = layouts.len(),
            path = %path.display(),
            "loaded record layouts"
        );

        Ok(Self {
            version,
            source: Some(path),
            sha256: Some(entry.sha256.to_ascii_lowercase()),
            layouts,
        })
    }

    /// Read and validate the manifest without loading any layout.
    pub fn load_manifest(layouts_dir: &Path) -> Result<Manifest, SchemaError> {
        let path = layouts_dir.join(MANIFEST_FILE);
        let contents = std::fs::read_to_string(&path).map_err(|e| SchemaError::io(&path, e))?;
        let manifest: Manifest = toml::from_str(&contents).map_err(|e| SchemaError::Toml {
            path: path.clone(),
            source: e,
        })?;
        validate_manifest(&manifest)?;
        Ok(manifest)
    }

    /// Build a registry from in-memory layout strings such as `"C02|CNPJ|"`.
    pub fn from_layouts<I, S>(
        version: LayoutVersion,
        definitions: I,
    ) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut layouts = BTreeMap::new();
        for definition in definitions {
            let layout = RecordLayout::parse(definition.as_ref())?;
            insert_layout(&mut layouts, layout)?;
        }
        Ok(Self {
            version,
            source: None,
            sha256: None,
            layouts,
        })
    }

    pub fn version(&self) -> LayoutVersion {
        self.version
    }

    /// Layout file the registry was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn sha256(&self) -> Option<&str> {
        self.sha256.as_deref()
    }

    pub fn lookup(&self, code: &RecordCode) -> Result<&RecordLayout, SchemaError> {
        self.layouts
            .get(code)
            .ok_or_else(|| SchemaError::RecordNotFound {
                version: self.version.to_string(),
                code: code.to_string(),
            })
    }

    pub fn get(&self, code: &str) -> Option<&RecordLayout> {
        self.layouts.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.layouts.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &RecordCode> {
        self.layouts.keys()
    }

    pub fn layouts(&self) -> impl Iterator<Item = &RecordLayout> {
        self.layouts.values()
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn summary(&self) -> LayoutSummary {
        LayoutSummary::from_registry(self)
    }
}

fn collect_layouts(
    definitions: BTreeMap<String, String>,
) -> Result<BTreeMap<RecordCode, RecordLayout>, SchemaError> {
    let mut layouts = BTreeMap::new();
    for (key, definition) in definitions {
        let layout = RecordLayout::parse(&definition)?;
        let key_code = RecordCode::normalize(&key);
        if &key_code != layout.code() {
            return Err(SchemaError::InvalidLayout {
                code: key,
                message: format!("layout string declares code {}", layout.code()),
            });
        }
        debug!(code = %key_code, fields = layout.len(), "record layout");
        insert_layout(&mut layouts, layout)?;
    }
    Ok(layouts)
}

fn insert_layout(
    layouts: &mut BTreeMap<RecordCode, RecordLayout>,
    layout: RecordLayout,
) -> Result<(), SchemaError> {
    let code = layout.code().clone();
    if layouts.contains_key(&code) {
        return Err(SchemaError::InvalidLayout {
            code: code.to_string(),
            message: "record code declared more than once".to_string(),
        });
    }
    layouts.insert(code, layout);
    Ok(())
}

fn validate_manifest(manifest: &Manifest) -> Result<(), SchemaError> {
    if manifest.manifest.schema != MANIFEST_SCHEMA {
        return Err(SchemaError::InvalidManifest {
            message: format!("unsupported schema: {}", manifest.manifest.schema),
        });
    }
    if manifest.manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(SchemaError::InvalidManifest {
            message: format!(
                "unsupported schema_version: {}",
                manifest.manifest.schema_version
            ),
        });
    }

    let mut versions: BTreeSet<LayoutVersion> = BTreeSet::new();
    for entry in &manifest.layouts {
        let version: LayoutVersion = entry.version.parse()?;
        if !versions.insert(version) {
            return Err(SchemaError::DuplicateVersion {
                version: entry.version.clone(),
            });
        }
        if !is_sha256_hex(&entry.sha256) {
            return Err(SchemaError::InvalidSha256 {
                path: PathBuf::from(&entry.path),
                message: "sha256 must be 64 hex characters".to_string(),
            });
        }
        validate_path(&entry.path)?;
    }
    Ok(())
}

fn verify_file(path: &Path, entry: &ManifestLayout) -> Result<Vec<u8>, SchemaError> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SchemaError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            SchemaError::io(path, e)
        }
    })?;

    let actual = sha256_hex(&bytes);
    let expected = entry.sha256.to_ascii_lowercase();
    if actual != expected {
        return Err(SchemaError::Sha256Mismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(bytes)
}

fn validate_path(path: &str) -> Result<(), SchemaError> {
    if path.contains('\\') {
        return Err(SchemaError::InvalidPath {
            path: PathBuf::from(path),
            message: "manifest path must use '/' separators".to_string(),
        });
    }

    let p = PathBuf::from(path);
    if p.is_absolute() {
        return Err(SchemaError::InvalidPath {
            path: p,
            message: "manifest path must be relative".to_string(),
        });
    }
    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(SchemaError::InvalidPath {
            path: p,
            message: "manifest path must not traverse out of layouts/".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_uses_normalized_codes() {
        let registry =
            SchemaRegistry::from_layouts(LayoutVersion::V400, ["A|versao|Id|", "c02a|CPF|"])
                .unwrap();
        assert_eq!(registry.len(), 2);
        let layout = registry.lookup(&RecordCode::normalize(" C02a")).unwrap();
        assert_eq!(layout.fields(), ["CPF"]);
    }

    #[test]
    fn lookup_miss_names_version_and_code() {
        let registry = SchemaRegistry::from_layouts(LayoutVersion::V310, ["A|versao|"]).unwrap();
        let err = registry.lookup(&RecordCode::normalize("ZZ")).unwrap_err();
        assert_eq!(err.to_string(), "record type ZZ is not defined in layout 3.10");
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let err = SchemaRegistry::from_layouts(LayoutVersion::V400, ["C|XNome|", "c|IE|"])
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidLayout { .. }));
    }

    #[test]
    fn validate_path_rejects_traversal() {
        assert!(validate_path("txt_layout_400.json").is_ok());
        assert!(validate_path("../secrets.json").is_err());
        assert!(validate_path("/etc/passwd").is_err());
        assert!(validate_path("a\\b.json").is_err());
    }
}
