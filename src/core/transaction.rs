use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::types::Annotation;

/// One fuel-dispensing event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRow {
    /// Transaction date, `None` when the source value could not be parsed
    pub transaction_date: Option<NaiveDate>,

    /// Vehicle registration, compared verbatim against delivery head plates
    pub registration: Option<String>,
}

impl TransactionRow {
    pub fn new(transaction_date: Option<NaiveDate>, registration: Option<impl Into<String>>) -> Self {
        Self {
            transaction_date,
            registration: registration.map(Into::into),
        }
    }

    /// Date and registration, if both are present
    #[must_use]
    pub fn key(&self) -> Option<(NaiveDate, &str)> {
        Some((self.transaction_date?, self.registration.as_deref()?))
    }
}

/// A transaction row together with its reconciliation outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledRow {
    pub transaction: TransactionRow,
    pub annotation: Option<Annotation>,
}

impl ReconciledRow {
    #[must_use]
    pub fn carrier(&self) -> Option<&str> {
        self.annotation.as_ref().map(|a| a.carrier.as_str())
    }

    #[must_use]
    pub fn trip_code(&self) -> Option<&str> {
        self.annotation.as_ref().map(|a| a.trip_code.as_str())
    }

    #[must_use]
    pub fn method(&self) -> Option<crate::core::types::MatchMethod> {
        self.annotation.as_ref().map(|a| a.method)
    }
}
