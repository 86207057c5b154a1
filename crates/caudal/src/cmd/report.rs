//! caudal report - Filter, aggregate and print a dashboard report.
//!
//! # Usage
//!
//! ```bash
//! caudal report movimientos.json
//! caudal report movimientos.json --granularity monthly --year 2024
//! caudal report movimientos.json --category Comida --json
//! ```

use anyhow::{Context, Result};
use caudal_core::{format_eur, Granularity};
use caudal_report::{build_view, DashboardView, FilterConfig, KpiStatus};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Filter, aggregate and print a dashboard report.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// The transactions JSON file to report on
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Period grouping (all_periods, monthly, quarterly, annual)
    #[arg(short, long, default_value = "all_periods")]
    pub granularity: Granularity,

    /// Keep only transactions from this year
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Keep only transactions in this category (exact match)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Keep only transactions whose description contains this text
    #[arg(short, long)]
    pub description: Option<String>,

    /// Dump the full dashboard view as pretty JSON
    #[arg(long)]
    pub json: bool,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

fn status_word(status: KpiStatus) -> &'static str {
    match status {
        KpiStatus::Ok => "ok",
        KpiStatus::Warn => "warn",
        KpiStatus::Risk => "risk",
    }
}

fn render_report<W: Write>(view: &DashboardView, writer: &mut W) -> Result<()> {
    let kpis = &view.kpis;

    writeln!(writer, "{}", view.table.caption)?;
    writeln!(writer, "{}", "=".repeat(60))?;
    writeln!(writer)?;
    writeln!(writer, "Period:         {}", kpis.figures.period_label)?;
    writeln!(writer, "Income:         {}", kpis.income_display)?;
    writeln!(writer, "Expenses:       {}", kpis.expense_display)?;
    writeln!(
        writer,
        "Net cash flow:  {} ({}) [{}]",
        kpis.net_display,
        kpis.margin_display,
        status_word(kpis.figures.margin_status)
    )?;
    writeln!(
        writer,
        "Ending balance: {} [{}]",
        kpis.balance_display,
        status_word(kpis.figures.balance_status)
    )?;

    let top = |top: &Option<caudal_report::TopCategory>| match top {
        Some(t) => format!("{} ({})", t.category, format_eur(t.total)),
        None => "n/a".to_string(),
    };
    writeln!(writer, "Top expense:    {}", top(&kpis.figures.top_expense))?;
    writeln!(writer, "Top income:     {}", top(&kpis.figures.top_income))?;

    if !view.buckets.is_empty() {
        writeln!(writer)?;
        writeln!(
            writer,
            "{:<22} {:>14} {:>14} {:>14}",
            "Period", "Income", "Expenses", "Net"
        )?;
        for bucket in &view.buckets {
            writeln!(
                writer,
                "{:<22} {:>14} {:>14} {:>14}",
                bucket.label,
                format_eur(bucket.income),
                format_eur(bucket.expense),
                format_eur(bucket.net)
            )?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "Transactions:   {}", view.table.rows.len())?;

    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let mut stdout = io::stdout().lock();

    if !args.file.exists() {
        anyhow::bail!("file not found: {}", args.file.display());
    }

    if args.verbose {
        eprintln!("Loading {}...", args.file.display());
    }

    let dataset = caudal_loader::load(&args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;

    if args.verbose && !dataset.rejected.is_empty() {
        eprintln!("Skipped {} malformed records", dataset.rejected.len());
    }

    let mut config = FilterConfig::new();
    if let Some(year) = args.year {
        config = config.with_year(year);
    }
    if let Some(category) = &args.category {
        config = config.with_category(category.as_str());
    }
    if let Some(description) = &args.description {
        config = config.with_description(description.as_str());
    }

    let view = build_view(&dataset.transactions, &config, args.granularity);

    if args.json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&view)?)?;
    } else {
        render_report(&view, &mut stdout)?;
    }

    Ok(())
}

/// Main entry point for the report command.
pub fn main(args: &Args) -> ExitCode {
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
