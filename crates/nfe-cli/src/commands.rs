//! Command implementations behind the `nfe-txt` subcommands.

use std::path::Path;

use anyhow::{Context, Result};
use nfe_core::{ConversionOptions, Converter, load_registry};
use nfe_ingest::{Document, IngestOptions, read_input};
use nfe_report::{XmlDocumentBuilder, XmlOptions, write_json_outputs, write_xml_outputs};
use nfe_schema::{LayoutSummary, LayoutVersion, SchemaRegistry};
use tracing::{debug, error, info, info_span};

use crate::logging::{log_data_enabled, redact_value};
use crate::types::{ConvertResult, ConvertSettings, DocumentSummary};

/// Summaries of every layout version found under `layouts_dir`.
pub fn run_layouts(layouts_dir: &Path) -> Result<Vec<LayoutSummary>> {
    let mut summaries = Vec::new();
    for version in LayoutVersion::ALL {
        let registry = SchemaRegistry::load(layouts_dir, version)
            .with_context(|| format!("load layout {version}"))?;
        summaries.push(registry.summary());
    }
    Ok(summaries)
}

/// Convert every document of `settings.input`.
///
/// Input and layout problems are fatal. A document that fails to convert is
/// recorded in its summary and the remaining documents still run.
pub fn run_convert(settings: &ConvertSettings) -> Result<ConvertResult> {
    let span = info_span!(
        "convert",
        input = %settings.input.display(),
        layout = %settings.layout
    );
    let _guard = span.enter();

    let ingest_options = IngestOptions::default().with_check_header(settings.check_header);
    let documents = read_input(&settings.input, &ingest_options)
        .with_context(|| format!("read {}", settings.input.display()))?;
    let registry = load_registry(&settings.layouts_dir, settings.layout)
        .with_context(|| format!("load layouts from {}", settings.layouts_dir.display()))?;
    let options = ConversionOptions::default().with_log_values(log_data_enabled());
    let converter = Converter::new(&registry, options)?;
    info!(documents = documents.len(), "read input");

    let mut summaries = Vec::with_capacity(documents.len());
    let mut builders = Vec::new();
    for document in &documents {
        let (summary, builder) = convert_document(&converter, document);
        if let Some(builder) = builder {
            builders.push(builder);
        }
        summaries.push(summary);
    }

    let output_dir = if settings.dry_run {
        None
    } else {
        let dir = settings.resolved_output_dir();
        write_outputs(settings, &dir, &builders, &mut summaries)?;
        Some(dir)
    };

    let has_errors = summaries.iter().any(|summary| summary.error.is_some());
    Ok(ConvertResult {
        input: settings.input.clone(),
        layout: settings.layout,
        output_dir,
        documents: summaries,
        has_errors,
    })
}

fn convert_document(
    converter: &Converter<'_>,
    document: &Document,
) -> (DocumentSummary, Option<XmlDocumentBuilder>) {
    let mut summary = DocumentSummary {
        index: document.index,
        first_line: document.first_line_number(),
        records: document.len(),
        ..DocumentSummary::default()
    };
    if let Some(line) = document.lines.first() {
        debug!(
            document = document.index,
            opener = redact_value(&line.text),
            "converting document"
        );
    }

    let mut builder = XmlDocumentBuilder::new(document.index, XmlOptions::default());
    let outcome = converter
        .convert(document, &mut builder)
        .map_err(anyhow::Error::from)
        .and_then(|report| {
            builder.to_element()?;
            Ok(report)
        });
    match outcome {
        Ok(report) => {
            summary.records = report.records;
            summary.entities = report.entities;
            (summary, Some(builder))
        }
        Err(err) => {
            error!(document = document.index, error = %err, "document failed");
            summary.error = Some(err.to_string());
            (summary, None)
        }
    }
}

fn write_outputs(
    settings: &ConvertSettings,
    dir: &Path,
    builders: &[XmlDocumentBuilder],
    summaries: &mut [DocumentSummary],
) -> Result<()> {
    if settings.format.wants_xml() {
        let paths = write_xml_outputs(dir, builders)?;
        for (builder, path) in builders.iter().zip(paths) {
            if let Some(summary) = summary_for(summaries, builder.document_index()) {
                summary.outputs.xml = Some(path);
            }
        }
    }
    if settings.format.wants_json() {
        let documents = builders
            .iter()
            .map(|builder| (builder.document_index(), builder.entities()));
        let paths = write_json_outputs(dir, documents)?;
        for (builder, path) in builders.iter().zip(paths) {
            if let Some(summary) = summary_for(summaries, builder.document_index()) {
                summary.outputs.json = Some(path);
            }
        }
    }
    info!(dir = %dir.display(), documents = builders.len(), "wrote outputs");
    Ok(())
}

fn summary_for(summaries: &mut [DocumentSummary], index: usize) -> Option<&mut DocumentSummary> {
    summaries.iter_mut().find(|summary| summary.index == index)
}
