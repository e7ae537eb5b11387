use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::cli::{InputArgs, OutputFormat};
use crate::core::types::MatchMethod;
use crate::export::{write_result_file, OutputOptions};
use crate::matching::engine::{reconcile, ReconciliationSummary};
use crate::parsing::{load_deliveries, load_transactions};

#[derive(Args)]
pub struct ReconcileArgs {
    /// Fuel transaction table (xlsx, xlsm, xlsb, xls, ods, csv or tsv)
    #[arg(short, long)]
    pub transactions: PathBuf,

    /// Delivery trip table (xlsx, xlsm, xlsb, xls, ods, csv or tsv)
    #[arg(short, long)]
    pub deliveries: PathBuf,

    /// Result file; written as CSV/TSV for those extensions, xlsx otherwise
    #[arg(short, long, default_value = "result.xlsx")]
    pub output: PathBuf,

    #[command(flatten)]
    pub input: InputArgs,
}

/// Execute reconcile subcommand
///
/// # Errors
///
/// Returns an error if either input cannot be read or normalized, or the
/// result cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ReconcileArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let settings = args.input.settings()?;

    let transactions = load_transactions(
        read_input(&args.transactions)?,
        file_name(&args.transactions),
        &settings,
    )
    .with_context(|| format!("failed to load transactions from {}", args.transactions.display()))?;

    let deliveries = load_deliveries(
        read_input(&args.deliveries)?,
        file_name(&args.deliveries),
        &settings,
    )
    .with_context(|| format!("failed to load deliveries from {}", args.deliveries.display()))?;

    if verbose {
        eprintln!(
            "Loaded {} transactions and {} deliveries",
            transactions.len(),
            deliveries.len()
        );
    }

    let result = reconcile(transactions, &deliveries, &args.input.reconcile_config());

    let options = OutputOptions {
        columns: settings.columns,
        label_style: args.input.labels,
        date_format: settings.date_format,
    };
    write_result_file(&args.output, &result.rows, &options)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    if verbose {
        eprintln!("Wrote {} rows to {}", result.rows.len(), args.output.display());
    }

    match format {
        OutputFormat::Text => print_text_summary(&result.summary, &args.output),
        OutputFormat::Json => print_json_summary(&result.summary, &args.output)?,
        OutputFormat::Tsv => print_tsv_summary(&result.summary),
    }

    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn print_text_summary(summary: &ReconciliationSummary, output: &Path) {
    println!("Reconciled {} transactions", summary.total);
    println!();
    for method in MatchMethod::ALL {
        println!("  {:<14} {:>8}", method.to_string(), summary.count(method));
    }
    println!("  {:<14} {:>8}", "unmatched", summary.unmatched);
    if summary.skipped > 0 {
        println!(
            "    ({} rows lacked a usable date or registration)",
            summary.skipped
        );
    }
    println!();
    println!("Result written to {}", output.display());
}

fn print_json_summary(summary: &ReconciliationSummary, output: &Path) -> anyhow::Result<()> {
    let json = serde_json::json!({
        "output": output.display().to_string(),
        "summary": summary,
        "matched": summary.matched(),
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn print_tsv_summary(summary: &ReconciliationSummary) {
    println!("method\tcount");
    for method in MatchMethod::ALL {
        println!("{method}\t{}", summary.count(method));
    }
    println!("unmatched\t{}", summary.unmatched);
    println!("skipped\t{}", summary.skipped);
    println!("total\t{}", summary.total);
}
