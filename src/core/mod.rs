//! Core data types for fuel/delivery reconciliation.
//!
//! - [`TransactionRow`]: one fuel-dispensing event (date + registration)
//! - [`DeliveryRow`]: one delivery trip (departure date + head plate + carrier + trip code)
//! - [`ReconciledRow`]: a transaction row with its optional [`Annotation`]
//! - [`MatchMethod`], [`LabelStyle`]: outcome classification and its written labels
//!
//! ## Keys
//!
//! The two tables share no identifier. A transaction is tied to a delivery by
//! vehicle plate plus a date comparison:
//!
//! | Transaction | Delivery |
//! |-------------|----------|
//! | registration | head plate |
//! | transaction date | departure date |
//!
//! Plates are compared as **exact strings**; no case folding or whitespace
//! trimming is applied.

pub mod delivery;
pub mod transaction;
pub mod types;

pub use delivery::DeliveryRow;
pub use transaction::{ReconciledRow, TransactionRow};
pub use types::{Annotation, LabelStyle, MatchMethod};
