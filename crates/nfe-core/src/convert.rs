use std::collections::BTreeMap;
use std::path::Path;

use nfe_ingest::Document;
use nfe_model::{CompletedEntity, EntityKind};
use nfe_schema::{LayoutVersion, SchemaRegistry};
use serde::Serialize;
use tracing::{info, info_span};

use crate::assembler::Assembler;
use crate::builder::DocumentBuilder;
use crate::error::{ConvertError, Result};
use crate::handlers::HandlerTable;

#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Warn when an opening record replaces a group that was never closed.
    pub warn_on_reopen: bool,
    /// Include bound field values in trace logs.
    pub log_values: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            warn_on_reopen: true,
            log_values: false,
        }
    }
}

impl ConversionOptions {
    pub fn with_warn_on_reopen(mut self, warn_on_reopen: bool) -> Self {
        self.warn_on_reopen = warn_on_reopen;
        self
    }

    pub fn with_log_values(mut self, log_values: bool) -> Self {
        self.log_values = log_values;
        self
    }
}

/// Counts for one converted document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub document_index: usize,
    pub records: usize,
    pub entities: usize,
    pub by_kind: BTreeMap<EntityKind, usize>,
}

impl ConversionReport {
    fn from_entities(document_index: usize, records: usize, entities: &[CompletedEntity]) -> Self {
        let mut by_kind = BTreeMap::new();
        for entity in entities {
            *by_kind.entry(entity.kind).or_insert(0) += 1;
        }
        Self {
            document_index,
            records,
            entities: entities.len(),
            by_kind,
        }
    }
}

/// Load the pinned layouts for `version` from `layouts_dir`.
pub fn load_registry(layouts_dir: &Path, version: LayoutVersion) -> Result<SchemaRegistry> {
    Ok(SchemaRegistry::load(layouts_dir, version)?)
}

/// Converts documents against one layout version.
///
/// The handler table is checked against the registry once, at construction.
/// Each document gets a fresh [`Assembler`]; entities reach the builder only
/// after the whole document assembled successfully.
#[derive(Debug)]
pub struct Converter<'a> {
    registry: &'a SchemaRegistry,
    table: &'static HandlerTable,
    options: ConversionOptions,
}

impl<'a> Converter<'a> {
    pub fn new(registry: &'a SchemaRegistry, options: ConversionOptions) -> Result<Self> {
        let table = HandlerTable::for_registry(registry)?;
        Ok(Self {
            registry,
            table,
            options,
        })
    }

    pub fn version(&self) -> LayoutVersion {
        self.registry.version()
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// A fresh assembler for driving records by hand.
    pub fn assembler(&self) -> Assembler<'_> {
        Assembler::new(self.registry, self.table, &self.options)
    }

    /// Assemble `document` without a builder.
    pub fn assemble(&self, document: &Document) -> Result<Vec<CompletedEntity>> {
        self.assemble_counted(document).map(|(entities, _)| entities)
    }

    /// Assemble `document` and hand every entity to `builder`.
    pub fn convert(
        &self,
        document: &Document,
        builder: &mut dyn DocumentBuilder,
    ) -> Result<ConversionReport> {
        let (entities, records) = self.assemble_counted(document)?;
        let report = ConversionReport::from_entities(document.index, records, &entities);
        for entity in entities {
            let kind = entity.kind;
            builder
                .emit(entity)
                .map_err(|err| ConvertError::BuilderRejection {
                    kind,
                    message: err.message,
                })?;
        }
        info!(
            document = document.index,
            records = report.records,
            entities = report.entities,
            "converted document"
        );
        Ok(report)
    }

    fn assemble_counted(&self, document: &Document) -> Result<(Vec<CompletedEntity>, usize)> {
        let span = info_span!(
            "document",
            index = document.index,
            line = document.first_line_number().unwrap_or_default(),
            layout = %self.registry.version()
        );
        let _guard = span.enter();

        let mut assembler = self.assembler();
        for line in &document.lines {
            assembler.process_line(line)?;
        }
        let records = assembler.records();
        let entities = assembler.finish()?;
        Ok((entities, records))
    }
}
