//! Command-line interface for fuel-recon.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **reconcile**: Annotate a fuel transaction table from a delivery table and write the result
//! - **serve**: Start the upload web interface
//!
//! ## Usage
//!
//! ```text
//! # Reconcile two workbooks into result.xlsx
//! fuel-recon reconcile --transactions fuel.xlsx --deliveries trips.xlsx
//!
//! # Pick the transaction sheet by name and write CSV
//! fuel-recon reconcile -t fuel.xlsx -d trips.xlsx --transaction-sheet รถมีนา -o result.csv
//!
//! # JSON run summary for scripting
//! fuel-recon --format json reconcile -t fuel.xlsx -d trips.xlsx
//!
//! # Start web UI
//! fuel-recon serve --port 8080 --open
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::types::LabelStyle;
use crate::matching::engine::{MatchPolicy, ReconcileConfig};
use crate::parsing::normalize::{ColumnMapping, InputSettings, DEFAULT_DATE_FORMAT};
use crate::parsing::table::SheetSelector;

pub mod reconcile;

#[derive(Parser)]
#[command(name = "fuel-recon")]
#[command(version)]
#[command(about = "Match fuel transactions to the delivery trips that explain them")]
#[command(
    long_about = "fuel-recon annotates every row of a fuel-card transaction table with the carrier and trip code of the delivery that best explains it.\n\nA transaction matches deliveries of the same head plate that departed:\n- on the same day\n- one day later\n- on or before the transaction date\n\nRows whose candidates name more than one carrier are flagged as ambiguous."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for the run summary
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile a transaction table against a delivery table
    Reconcile(reconcile::ReconcileArgs),

    /// Start the web server
    Serve(ServeArgs),
}

/// Options shared by every command that reads the two input tables
#[derive(clap::Args, Clone, Debug)]
pub struct InputArgs {
    /// Sheet holding the transactions (default: first sheet)
    #[arg(long)]
    pub transaction_sheet: Option<String>,

    /// Sheet holding the deliveries (default: first sheet)
    #[arg(long)]
    pub delivery_sheet: Option<String>,

    /// Rows above the header row in the transaction sheet
    #[arg(long, default_value = "0")]
    pub transaction_skip_rows: usize,

    /// Rows above the header row in the delivery sheet
    #[arg(long, default_value = "1")]
    pub delivery_skip_rows: usize,

    /// chrono format of text dates
    #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
    pub date_format: String,

    /// JSON file overriding input and output column names
    #[arg(long)]
    pub columns: Option<PathBuf>,

    /// Which rule wins when several rules find deliveries
    #[arg(long, value_enum, default_value = "last-match")]
    pub policy: MatchPolicy,

    /// Language of the match method labels
    #[arg(long, value_enum, default_value = "original")]
    pub labels: LabelStyle,
}

impl InputArgs {
    /// Build reader settings, loading the column mapping file if given
    ///
    /// # Errors
    ///
    /// Returns an error if the column mapping file cannot be read or parsed.
    pub fn settings(&self) -> anyhow::Result<InputSettings> {
        let columns = match &self.columns {
            Some(path) => ColumnMapping::load_from_file(path).map_err(|e| {
                anyhow::anyhow!("failed to load column mapping {}: {e}", path.display())
            })?,
            None => ColumnMapping::default(),
        };

        Ok(InputSettings {
            columns,
            date_format: self.date_format.clone(),
            transaction_sheet: SheetSelector::from_name(self.transaction_sheet.as_deref()),
            delivery_sheet: SheetSelector::from_name(self.delivery_sheet.as_deref()),
            transaction_skip_rows: self.transaction_skip_rows,
            delivery_skip_rows: self.delivery_skip_rows,
        })
    }

    #[must_use]
    pub fn reconcile_config(&self) -> ReconcileConfig {
        ReconcileConfig {
            policy: self.policy,
        }
    }
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,

    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
