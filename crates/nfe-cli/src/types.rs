use std::path::PathBuf;

use nfe_schema::LayoutVersion;
use serde::Serialize;

/// Output files to produce per document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Xml,
    Json,
    #[default]
    Both,
}

impl OutputFormat {
    pub fn wants_xml(self) -> bool {
        matches!(self, OutputFormat::Xml | OutputFormat::Both)
    }

    pub fn wants_json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

/// Everything `convert` and `check` need, independent of clap.
#[derive(Debug, Clone)]
pub struct ConvertSettings {
    pub input: PathBuf,
    pub layout: LayoutVersion,
    pub layouts_dir: PathBuf,
    /// Defaults to `output/` next to the input file.
    pub output_dir: Option<PathBuf>,
    pub format: OutputFormat,
    pub dry_run: bool,
    pub check_header: bool,
}

impl ConvertSettings {
    pub fn new(input: impl Into<PathBuf>, layouts_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            layout: LayoutVersion::default(),
            layouts_dir: layouts_dir.into(),
            output_dir: None,
            format: OutputFormat::default(),
            dry_run: false,
            check_header: true,
        }
    }

    pub fn with_layout(mut self, layout: LayoutVersion) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_check_header(mut self, check_header: bool) -> Self {
        self.check_header = check_header;
        self
    }

    pub fn resolved_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => self
                .input
                .parent()
                .map(|parent| parent.join("output"))
                .unwrap_or_else(|| PathBuf::from("output")),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConvertResult {
    pub input: PathBuf,
    pub layout: LayoutVersion,
    /// `None` on a dry run.
    pub output_dir: Option<PathBuf>,
    pub documents: Vec<DocumentSummary>,
    pub has_errors: bool,
}

impl ConvertResult {
    pub fn failed(&self) -> usize {
        self.documents
            .iter()
            .filter(|document| document.error.is_some())
            .count()
    }

    pub fn total_records(&self) -> usize {
        self.documents.iter().map(|document| document.records).sum()
    }

    pub fn total_entities(&self) -> usize {
        self.documents.iter().map(|document| document.entities).sum()
    }
}

#[derive(Debug, Default, Serialize)]
pub struct DocumentSummary {
    pub index: usize,
    pub first_line: Option<usize>,
    pub records: usize,
    pub entities: usize,
    pub outputs: DocumentOutputs,
    pub error: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct DocumentOutputs {
    pub xml: Option<PathBuf>,
    pub json: Option<PathBuf>,
}
