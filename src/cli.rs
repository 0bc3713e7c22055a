use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sheetdict::config::LogOptions;
use sheetdict::dictionary::flows::{
    AnnotationRequest, annotate, definitions_by_name, inspect, parse_definition_pair,
    parse_definitions_json,
};
use sheetdict::dictionary::load_dictionary;
use sheetdict::dictionary::renderer::{render_loaded_markdown, render_markdown, render_text};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "sheetdict",
    version,
    about = "Build a data dictionary for an .xls/.xlsx file. Runs the desktop form when no command is given."
)]
pub struct Cli {
    /// Default log filter (overridden by `RUST_LOG`)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Log to the console only
    #[arg(long, global = true)]
    pub no_file_log: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            level: self.log_level.clone(),
            file_logging: !self.no_file_log,
            ..LogOptions::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print file metadata and the column profile of a spreadsheet
    Inspect {
        /// Spreadsheet to inspect (.xls or .xlsx)
        file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Write an annotated dictionary workbook for a spreadsheet
    Annotate {
        /// Spreadsheet to describe (.xls or .xlsx)
        file: PathBuf,

        /// Output path; `.xlsx` is appended when no extension is given
        #[arg(short, long)]
        output: PathBuf,

        /// Free-text subject for the whole file
        #[arg(short, long, default_value = "")]
        subject: String,

        /// Column definition, repeatable. Applied after `--definitions`.
        #[arg(short = 'd', long = "define", value_name = "NAME=TEXT")]
        define: Vec<String>,

        /// JSON file with an object mapping column names to definitions
        #[arg(long, value_name = "JSON")]
        definitions: Option<PathBuf>,
    },
    /// Print a dictionary workbook written by `annotate`
    Show {
        /// Dictionary workbook (.xlsx)
        file: PathBuf,
    },
}

pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Inspect { file, format } => handle_inspect(&file, format),
        Commands::Annotate {
            file,
            output,
            subject,
            define,
            definitions,
        } => handle_annotate(&file, output, subject, &define, definitions.as_deref()),
        Commands::Show { file } => handle_show(&file),
    }
}

fn handle_inspect(file: &Path, format: OutputFormat) -> Result<()> {
    let inspection = inspect(file)?;

    let rendered = match format {
        OutputFormat::Text => render_text(&inspection),
        OutputFormat::Json => serde_json::to_string_pretty(&inspection)
            .context("Failed to serialize inspection")?,
        OutputFormat::Markdown => render_markdown(&inspection, None),
    };
    println!("{rendered}");
    Ok(())
}

fn handle_annotate(
    file: &Path,
    output: PathBuf,
    subject: String,
    define: &[String],
    definitions_file: Option<&Path>,
) -> Result<()> {
    let inspection = inspect(file)?;

    let mut named = Vec::new();
    if let Some(path) = definitions_file {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read definitions file {}", path.display()))?;
        named.extend(parse_definitions_json(&json)?);
    }
    for arg in define {
        named.push(parse_definition_pair(arg)?);
    }
    let definitions = definitions_by_name(&inspection.columns, named)?;

    let written = annotate(&AnnotationRequest {
        inspection,
        subject,
        definitions,
        output,
    })?;

    println!("Dictionary written to {}", written.display());
    Ok(())
}

fn handle_show(file: &Path) -> Result<()> {
    let dict = load_dictionary(file)?;
    let title = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("{}", render_loaded_markdown(&title, &dict));
    Ok(())
}
