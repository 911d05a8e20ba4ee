//! Best-candidate selection and statement reconciliation.

use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::models::config::MatchingConfig;
use crate::models::reconciliation::{MatchCandidate, ReconciliationItem, ReconciliationReport};
use crate::models::record::NormalizedRecord;
use crate::models::statement::ExtractedTransaction;

use super::scoring::{classify, score};

/// Scores transactions against accounting records.
///
/// Selection is greedy and per transaction: the same record may be the best
/// candidate for several transactions.
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    config: MatchingConfig,
}

impl MatchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set matching thresholds.
    pub fn with_config(mut self, config: MatchingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Score every candidate, in input order.
    pub fn candidates(
        &self,
        transaction: &ExtractedTransaction,
        records: &[NormalizedRecord],
    ) -> Vec<MatchCandidate> {
        records
            .iter()
            .enumerate()
            .map(|(candidate_index, record)| {
                let breakdown = score(transaction, record);
                let total = breakdown.total();
                MatchCandidate {
                    transaction: transaction.clone(),
                    record: record.clone(),
                    candidate_index,
                    score: total,
                    breakdown,
                    explanation: classify(total, &self.config).explanation().to_string(),
                }
            })
            .collect()
    }

    /// Pick the highest-scoring candidate for `transaction`.
    ///
    /// Ties go to the earliest candidate. Candidates scoring 0 are never
    /// selected.
    pub fn match_transaction(
        &self,
        transaction: &ExtractedTransaction,
        records: &[NormalizedRecord],
    ) -> ReconciliationItem {
        let mut selected: Option<MatchCandidate> = None;
        for candidate in self.candidates(transaction, records) {
            if candidate.score <= Decimal::ZERO {
                continue;
            }
            if selected.as_ref().is_none_or(|best| candidate.score > best.score) {
                selected = Some(candidate);
            }
        }

        let confidence = selected.as_ref().map_or(Decimal::ZERO, |c| c.score);
        let classification = classify(confidence, &self.config);

        debug!(
            concept = %transaction.concept,
            candidates = records.len(),
            confidence = %confidence,
            classification = classification.as_str(),
            "Matched transaction"
        );

        ReconciliationItem {
            transaction: transaction.clone(),
            selected,
            classification,
            confidence,
            explanation: classification.explanation().to_string(),
        }
    }

    /// Match every transaction against the same record set.
    pub fn reconcile(
        &self,
        transactions: &[ExtractedTransaction],
        records: &[NormalizedRecord],
    ) -> ReconciliationReport {
        let start = Instant::now();

        let items = transactions
            .iter()
            .map(|t| self.match_transaction(t, records))
            .collect();
        let report = ReconciliationReport::from_items(items);

        info!(
            "Reconciled {} transactions against {} records: {} matched, {} partial, {} unmatched in {}ms",
            transactions.len(),
            records.len(),
            report.matched,
            report.partial,
            report.unmatched,
            start.elapsed().as_millis()
        );

        report
    }
}

/// Match one transaction with default thresholds.
pub fn match_transaction(
    transaction: &ExtractedTransaction,
    candidates: &[NormalizedRecord],
) -> ReconciliationItem {
    MatchEngine::new().match_transaction(transaction, candidates)
}

/// Reconcile a statement with default thresholds.
pub fn reconcile(
    transactions: &[ExtractedTransaction],
    records: &[NormalizedRecord],
) -> ReconciliationReport {
    MatchEngine::new().reconcile(transactions, records)
}
