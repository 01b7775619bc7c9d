//! JSON dump of completed entities.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nfe_model::CompletedEntity;
use serde::Serialize;

use crate::common::ensure_output_dir;

pub const ENTITY_DUMP_SCHEMA: &str = "nfe-txt.entities";
pub const ENTITY_DUMP_SCHEMA_VERSION: u32 = 1;

/// Serialized form of one document's entity list.
#[derive(Debug, Serialize)]
pub struct EntityDump<'a> {
    pub schema: &'static str,
    pub schema_version: u32,
    pub document: usize,
    pub entities: &'a [CompletedEntity],
}

impl<'a> EntityDump<'a> {
    pub fn new(document: usize, entities: &'a [CompletedEntity]) -> Self {
        Self {
            schema: ENTITY_DUMP_SCHEMA,
            schema_version: ENTITY_DUMP_SCHEMA_VERSION,
            document,
            entities,
        }
    }
}

/// Write `entities` of one document as pretty JSON.
pub fn write_json(output_path: &Path, document: usize, entities: &[CompletedEntity]) -> Result<()> {
    let file =
        File::create(output_path).with_context(|| format!("create {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &EntityDump::new(document, entities))
        .with_context(|| format!("serialize {}", output_path.display()))?;
    writer.write_all(b"\n")?;
    writer
        .flush()
        .with_context(|| format!("flush {}", output_path.display()))?;
    Ok(())
}

/// Write one `nfe-<n>.json` per `(document index, entities)` pair.
pub fn write_json_outputs<'a, I>(output_dir: &Path, documents: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = (usize, &'a [CompletedEntity])>,
{
    let dir = ensure_output_dir(output_dir)?;
    let mut outputs = Vec::new();
    for (document, entities) in documents {
        let path = dir.join(format!("nfe-{document}.json"));
        write_json(&path, document, entities)?;
        outputs.push(path);
    }
    Ok(outputs)
}
