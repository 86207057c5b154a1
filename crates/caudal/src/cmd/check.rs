//! caudal check - Validate a transactions file and show what would load.

use anyhow::{Context, Result};
use caudal_loader::Dataset;
use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Output format for the check results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output for tooling integration
    Json,
}

/// A rejected record in JSON format.
#[derive(Debug, Serialize)]
pub struct JsonRejection {
    /// Zero-based position of the record in the source array
    pub index: usize,
    /// Why the record was rejected
    pub message: String,
}

/// JSON output structure for the whole check.
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    /// Number of transactions that loaded
    pub accepted: usize,
    /// Number of records that were rejected
    pub rejected: usize,
    /// Years covered by the accepted transactions, newest first
    pub years: Vec<i32>,
    /// Categories covered by the accepted transactions
    pub categories: Vec<String>,
    /// One diagnostic per rejected record
    pub diagnostics: Vec<JsonRejection>,
}

/// Validate a transactions file and show what would load.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// The transactions JSON file to check
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Show verbose output including timing information
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output (just use the exit code)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format (text or json)
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: OutputFormat,
}

fn json_output(dataset: &Dataset) -> JsonOutput {
    JsonOutput {
        accepted: dataset.len(),
        rejected: dataset.rejected.len(),
        years: dataset.filter_years(),
        categories: dataset.filter_categories(),
        diagnostics: dataset
            .rejected
            .iter()
            .map(|r| JsonRejection {
                index: r.index,
                message: r.reason.to_string(),
            })
            .collect(),
    }
}

fn render_text<W: Write>(dataset: &Dataset, file: &Path, writer: &mut W) -> Result<()> {
    writeln!(writer, "Transactions Check")?;
    writeln!(writer, "{}", "=".repeat(60))?;
    writeln!(writer)?;
    writeln!(writer, "File:       {}", file.display())?;
    writeln!(writer, "Accepted:   {}", dataset.len())?;
    writeln!(writer, "Rejected:   {}", dataset.rejected.len())?;
    if let Some((first, last)) = dataset.date_span() {
        writeln!(writer, "Date range: {first} to {last}")?;
    }
    let years: Vec<String> = dataset.filter_years().iter().map(ToString::to_string).collect();
    writeln!(writer, "Years:      {}", years.join(", "))?;
    writeln!(writer, "Categories: {}", dataset.filter_categories().join(", "))?;

    if !dataset.rejected.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Rejected records:")?;
        for record in &dataset.rejected {
            writeln!(writer, "  [{}] {}", record.index, record.reason)?;
        }
    }

    Ok(())
}

fn run(args: &Args) -> Result<ExitCode> {
    let mut stdout = io::stdout().lock();
    let start = std::time::Instant::now();

    if !args.file.exists() {
        anyhow::bail!("file not found: {}", args.file.display());
    }

    if args.verbose && !args.quiet {
        eprintln!("Loading {}...", args.file.display());
    }

    let dataset = caudal_loader::load(&args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;

    if matches!(args.format, OutputFormat::Json) {
        writeln!(
            stdout,
            "{}",
            serde_json::to_string_pretty(&json_output(&dataset))?
        )?;
    } else if !args.quiet {
        render_text(&dataset, &args.file, &mut stdout)?;
        if args.verbose {
            let elapsed = start.elapsed();
            writeln!(stdout, "\nChecked in {:.2}ms", elapsed.as_secs_f64() * 1000.0)?;
        }
    }

    if dataset.rejected.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

/// Main entry point for the check command.
pub fn main(args: &Args) -> ExitCode {
    match run(args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
