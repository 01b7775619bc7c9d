//! CLI argument definitions for `nfe-txt`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use nfe_cli::types::{ConvertSettings, OutputFormat};
use nfe_schema::{LayoutVersion, layouts_root};

#[derive(Parser)]
#[command(
    name = "nfe-txt",
    version,
    about = "Convert NF-e TXT files into NF-e XML",
    long_about = "Convert pipe-delimited NF-e TXT files (layouts 3.10 and 4.00) into\n\
                  NF-e XML documents and JSON entity dumps."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow field values (names, tax ids) in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert every document of a TXT file.
    Convert(ConvertArgs),

    /// Convert without writing any output (same as `convert --dry-run`).
    Check(CheckArgs),

    /// List the supported layout versions.
    Layouts(LayoutsArgs),
}

#[derive(Args)]
pub struct InputArgs {
    /// NF-e TXT file, optionally starting with a NOTAFISCAL header.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Layout version of the input.
    #[arg(long = "layout", value_enum, default_value = "4.00")]
    pub layout: LayoutArg,

    #[command(flatten)]
    pub layouts: LayoutsArgs,

    /// Do not compare the NOTAFISCAL header count with the documents found.
    #[arg(long = "no-header-check")]
    pub no_header_check: bool,
}

#[derive(Args)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory for generated files (default: <INPUT dir>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format to generate.
    #[arg(long = "format", value_enum, default_value = "both")]
    pub format: OutputFormatArg,

    /// Convert and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args)]
pub struct LayoutsArgs {
    /// Directory holding manifest.toml and the layout files
    /// (default: $NFE_LAYOUTS_DIR, then the bundled layouts/).
    #[arg(long = "layouts-dir", value_name = "DIR")]
    pub layouts_dir: Option<PathBuf>,
}

impl LayoutsArgs {
    pub fn resolve(&self) -> PathBuf {
        self.layouts_dir.clone().unwrap_or_else(layouts_root)
    }
}

impl InputArgs {
    fn settings(&self) -> ConvertSettings {
        ConvertSettings::new(&self.input, self.layouts.resolve())
            .with_layout(self.layout.into())
            .with_check_header(!self.no_header_check)
    }
}

impl ConvertArgs {
    pub fn settings(&self) -> ConvertSettings {
        let settings = self
            .input
            .settings()
            .with_format(self.format.into())
            .with_dry_run(self.dry_run);
        match &self.output_dir {
            Some(dir) => settings.with_output_dir(dir),
            None => settings,
        }
    }
}

impl CheckArgs {
    pub fn settings(&self) -> ConvertSettings {
        self.input.settings().with_dry_run(true)
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    #[value(name = "3.10")]
    V310,
    #[value(name = "4.00")]
    V400,
}

impl From<LayoutArg> for LayoutVersion {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::V310 => LayoutVersion::V310,
            LayoutArg::V400 => LayoutVersion::V400,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Xml,
    Json,
    Both,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(value: OutputFormatArg) -> Self {
        match value {
            OutputFormatArg::Xml => OutputFormat::Xml,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Both => OutputFormat::Both,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
