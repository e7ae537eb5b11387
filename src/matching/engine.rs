use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::delivery::DeliveryRow;
use crate::core::transaction::{ReconciledRow, TransactionRow};
use crate::core::types::{Annotation, MatchMethod};
use crate::matching::index::DeliveryIndex;
use crate::matching::rules::MatchRule;
use crate::matching::trip_code::{normalize_trip_codes, LIST_SEPARATOR};

/// Which rule's annotation survives when several rules find candidates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Every rule with candidates overwrites the previous one; the broadest rule wins
    #[default]
    LastMatch,
    /// The first rule with candidates is kept; the most specific rule wins
    FirstMatch,
}

impl std::str::FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "last-match" | "last" => Ok(Self::LastMatch),
            "first-match" | "first" => Ok(Self::FirstMatch),
            other => Err(format!("unknown match policy '{other}'")),
        }
    }
}

/// Configuration for the reconciliation engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileConfig {
    pub policy: MatchPolicy,
}

/// Counts of outcomes over one reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub total: usize,
    pub exact: usize,
    pub next_day: usize,
    pub on_or_before: usize,
    pub ambiguous: usize,
    pub unmatched: usize,
    /// Rows without a usable date or registration (also counted as unmatched)
    pub skipped: usize,
}

impl ReconciliationSummary {
    fn record(&mut self, outcome: Option<MatchMethod>) {
        self.total += 1;
        match outcome {
            Some(MatchMethod::Exact) => self.exact += 1,
            Some(MatchMethod::NextDay) => self.next_day += 1,
            Some(MatchMethod::OnOrBefore) => self.on_or_before += 1,
            Some(MatchMethod::Ambiguous) => self.ambiguous += 1,
            None => self.unmatched += 1,
        }
    }

    /// Rows that received any annotation
    #[must_use]
    pub fn matched(&self) -> usize {
        self.total - self.unmatched
    }

    #[must_use]
    pub fn count(&self, method: MatchMethod) -> usize {
        match method {
            MatchMethod::Exact => self.exact,
            MatchMethod::NextDay => self.next_day,
            MatchMethod::OnOrBefore => self.on_or_before,
            MatchMethod::Ambiguous => self.ambiguous,
        }
    }
}

/// Output of a reconciliation run
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// One row per input transaction, in input order
    pub rows: Vec<ReconciledRow>,
    pub summary: ReconciliationSummary,
}

/// Summarise one rule's candidate set into an annotation.
///
/// Carriers and trip codes are de-duplicated in order of first occurrence.
/// More than one carrier yields an ambiguous annotation listing all of them.
#[must_use]
pub fn aggregate(rule: MatchRule, candidates: &[&DeliveryRow]) -> Option<Annotation> {
    if candidates.is_empty() {
        return None;
    }

    let carriers = distinct(candidates.iter().map(|c| c.carrier.as_str()));
    let trip_code = distinct(candidates.iter().map(|c| c.trip_code.as_str())).join(LIST_SEPARATOR);

    let annotation = if carriers.len() == 1 {
        Annotation {
            carrier: carriers[0].to_string(),
            trip_code,
            method: rule.method(),
        }
    } else {
        Annotation {
            carrier: carriers.join(LIST_SEPARATOR),
            trip_code,
            method: MatchMethod::Ambiguous,
        }
    };

    Some(annotation)
}

/// Distinct values in order of first occurrence
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|value| seen.insert(*value)).collect()
}

/// The reconciliation engine
pub struct ReconciliationEngine<'a> {
    index: DeliveryIndex<'a>,
    config: ReconcileConfig,
}

impl<'a> ReconciliationEngine<'a> {
    /// Create a new engine with default configuration
    pub fn new(deliveries: &'a [DeliveryRow]) -> Self {
        Self::with_config(deliveries, ReconcileConfig::default())
    }

    /// Create a new engine with custom configuration
    pub fn with_config(deliveries: &'a [DeliveryRow], config: ReconcileConfig) -> Self {
        Self {
            index: DeliveryIndex::new(deliveries),
            config,
        }
    }

    /// Apply every rule to one transaction and return its final annotation
    #[must_use]
    pub fn reconcile_row(&self, transaction: &TransactionRow) -> Option<Annotation> {
        let mut annotation = None;

        for rule in MatchRule::ORDERED {
            let candidates = rule.candidates(transaction, &self.index);
            let Some(result) = aggregate(rule, &candidates) else {
                continue;
            };

            tracing::trace!(
                %rule,
                candidates = candidates.len(),
                method = %result.method,
                "rule matched"
            );
            annotation = Some(result);

            if self.config.policy == MatchPolicy::FirstMatch {
                break;
            }
        }

        annotation
    }

    /// Reconcile a whole transaction table.
    ///
    /// Rows are annotated independently; trip codes are then truncated in a
    /// final pass over the finished table.
    pub fn reconcile(&self, transactions: Vec<TransactionRow>) -> Reconciliation {
        let mut summary = ReconciliationSummary::default();

        let mut rows: Vec<ReconciledRow> = transactions
            .into_iter()
            .enumerate()
            .map(|(i, transaction)| {
                if transaction.key().is_none() {
                    tracing::debug!(row = i, "transaction has no usable date or registration");
                    summary.skipped += 1;
                }
                let annotation = self.reconcile_row(&transaction);
                ReconciledRow {
                    transaction,
                    annotation,
                }
            })
            .collect();

        normalize_trip_codes(&mut rows);

        for row in &rows {
            summary.record(row.method());
        }

        tracing::debug!(
            total = summary.total,
            matched = summary.matched(),
            plates = self.index.plate_count(),
            "reconciliation finished"
        );

        Reconciliation { rows, summary }
    }
}

/// Reconcile `transactions` against `deliveries`.
///
/// Pure function of its inputs: deliveries are only read, and a new table is
/// returned with one row per transaction.
pub fn reconcile(
    transactions: Vec<TransactionRow>,
    deliveries: &[DeliveryRow],
    config: &ReconcileConfig,
) -> Reconciliation {
    ReconciliationEngine::with_config(deliveries, config.clone()).reconcile(transactions)
}
