use chrono::{Days, NaiveDate};

use crate::core::delivery::DeliveryRow;
use crate::core::transaction::TransactionRow;
use crate::core::types::MatchMethod;
use crate::matching::index::DeliveryIndex;

/// A date rule tying a transaction to delivery rows with the same plate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchRule {
    /// Departure on the transaction date
    Exact,
    /// Departure the day after the transaction date
    NextDay,
    /// Departure on or before the transaction date
    OnOrBefore,
}

impl MatchRule {
    /// Evaluation order. Later rules overwrite earlier ones under the default policy.
    pub const ORDERED: [MatchRule; 3] = [MatchRule::Exact, MatchRule::NextDay, MatchRule::OnOrBefore];

    /// Method recorded when this rule produces a single-carrier match
    #[must_use]
    pub fn method(self) -> MatchMethod {
        match self {
            Self::Exact => MatchMethod::Exact,
            Self::NextDay => MatchMethod::NextDay,
            Self::OnOrBefore => MatchMethod::OnOrBefore,
        }
    }

    /// Date predicate only; plate equality is checked by the caller
    #[must_use]
    pub fn accepts(self, transaction_date: NaiveDate, departure_date: NaiveDate) -> bool {
        // An out-of-range successor cannot equal or exceed any departure
        let Some(next_day) = transaction_date.checked_add_days(Days::new(1)) else {
            return self == Self::OnOrBefore;
        };

        match self {
            Self::Exact => departure_date == transaction_date,
            Self::NextDay => departure_date == next_day,
            Self::OnOrBefore => departure_date < next_day,
        }
    }

    /// Full predicate over one delivery row
    #[must_use]
    pub fn matches(self, transaction_date: NaiveDate, registration: &str, delivery: &DeliveryRow) -> bool {
        match (delivery.departure_date, delivery.head_plate.as_deref()) {
            (Some(departure), Some(plate)) => {
                plate == registration && self.accepts(transaction_date, departure)
            }
            _ => false,
        }
    }

    /// Collect the candidate set for one transaction row, in delivery-table order.
    ///
    /// Returns an empty set when the transaction has no date or no registration.
    #[must_use]
    pub fn candidates<'a>(
        self,
        transaction: &TransactionRow,
        index: &DeliveryIndex<'a>,
    ) -> Vec<&'a DeliveryRow> {
        let Some((date, registration)) = transaction.key() else {
            return Vec::new();
        };

        index
            .rows_for_plate(registration)
            .iter()
            .copied()
            .filter(|row| self.matches(date, registration, row))
            .collect()
    }
}

impl std::fmt::Display for MatchRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.method())
    }
}
