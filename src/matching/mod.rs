//! Reconciliation engine: tiered date rules, multi-match aggregation and
//! trip-code normalization.
//!
//! - [`ReconciliationEngine`]: main entry point, one annotation per transaction row
//! - [`MatchRule`]: the three date rules and their fixed evaluation order
//! - [`DeliveryIndex`]: delivery rows bucketed by head plate
//!
//! ## Rules
//!
//! Every rule requires `head_plate == registration`. They differ in the date test:
//!
//! | Rule | Departure date |
//! |------|----------------|
//! | `Exact` | equal to the transaction date |
//! | `NextDay` | the day after the transaction date |
//! | `OnOrBefore` | before the day after the transaction date |
//!
//! Rules run in that order. Under the default [`MatchPolicy::LastMatch`] every
//! rule that finds candidates overwrites the annotation of the rules before
//! it, so `OnOrBefore` wins whenever it matches at all. [`MatchPolicy::FirstMatch`]
//! keeps the first rule that matches instead.
//!
//! ## Aggregation
//!
//! Candidates of one rule are collapsed into a single annotation: distinct
//! carriers and distinct trip codes in order of first occurrence. More than
//! one carrier marks the row [`MatchMethod::Ambiguous`](crate::core::types::MatchMethod).
//!
//! After all rows are done, non-ambiguous rows keep only their first trip code.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use fuel_recon::{reconcile, DeliveryRow, ReconcileConfig, TransactionRow};
//!
//! let day = NaiveDate::from_ymd_opt(2024, 1, 5);
//! let transactions = vec![TransactionRow::new(day, Some("AB-123"))];
//! let deliveries = vec![DeliveryRow::new(day, "AB-123", "Acme", "T1")];
//!
//! let result = reconcile(transactions, &deliveries, &ReconcileConfig::default());
//! assert_eq!(result.rows[0].carrier(), Some("Acme"));
//! ```

pub mod engine;
pub mod index;
pub mod rules;
pub mod trip_code;

pub use engine::{
    aggregate, reconcile, MatchPolicy, ReconcileConfig, Reconciliation, ReconciliationEngine,
    ReconciliationSummary,
};
pub use index::DeliveryIndex;
pub use rules::MatchRule;
