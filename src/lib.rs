//! # fuel-recon
//!
//! A library for reconciling fuel-card transactions with the delivery trips
//! that explain them.
//!
//! A fleet's fuel-card export records when and for which vehicle fuel was
//! bought; the dispatch export records which carrier drove which truck on
//! which trip. `fuel-recon` joins the two: every transaction row is annotated
//! with the carrier, the trip code and the rule that linked them, so fuel
//! spend can be charged to the right carrier.
//!
//! ## Features
//!
//! - **Three matching rules**: same-day, next-day and on-or-before departures
//!   of the vehicle's head plate, evaluated in a fixed order
//! - **Ambiguity flagging**: rows whose candidates name several carriers are
//!   marked instead of silently picking one
//! - **Spreadsheet in, spreadsheet out**: xlsx/xls/xlsb/ods and CSV/TSV inputs,
//!   xlsx or CSV results
//! - **CLI and web upload**: the same engine behind `fuel-recon reconcile` and
//!   `fuel-recon serve`
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use fuel_recon::{reconcile, DeliveryRow, MatchMethod, ReconcileConfig, TransactionRow};
//!
//! let day = NaiveDate::from_ymd_opt(2024, 1, 5);
//! let deliveries = vec![DeliveryRow::new(day, "AB-123", "Acme", "T1")];
//! let transactions = vec![TransactionRow::new(day, Some("AB-123"))];
//!
//! let result = reconcile(transactions, &deliveries, &ReconcileConfig::default());
//! let row = &result.rows[0];
//! assert_eq!(row.carrier(), Some("Acme"));
//! assert_eq!(row.method(), Some(MatchMethod::OnOrBefore));
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Row types, match methods and labels
//! - [`matching`]: Rules, the reconciliation engine and trip-code normalization
//! - [`parsing`]: Workbook and CSV readers and the column normalizer
//! - [`export`]: xlsx and CSV writers for the reconciled table
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: Web server for browser-based uploads

pub mod cli;
pub mod core;
pub mod export;
pub mod matching;
pub mod parsing;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use core::delivery::DeliveryRow;
pub use core::transaction::{ReconciledRow, TransactionRow};
pub use core::types::*;
pub use matching::engine::{
    reconcile, MatchPolicy, ReconcileConfig, Reconciliation, ReconciliationEngine,
    ReconciliationSummary,
};
