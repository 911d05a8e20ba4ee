//! Reconciliation result models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::record::NormalizedRecord;
use super::statement::ExtractedTransaction;

/// Confidence band derived from a composite score.
///
/// Variants are declared from least to most confident so that `Ord`
/// follows confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Unmatched,
    Partial,
    Matched,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unmatched => "unmatched",
            Self::Partial => "partial",
            Self::Matched => "matched",
        }
    }

    /// Audit text for the band. Never fed back into scoring.
    pub fn explanation(&self) -> &'static str {
        match self {
            Self::Matched => "Match on amount, date and counterpart",
            Self::Partial => "Partial match - review details",
            Self::Unmatched => "No corresponding record found",
        }
    }
}

/// Contribution of each scoring term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub amount: Decimal,
    pub date: Decimal,
    pub counterpart: Decimal,
}

impl ScoreBreakdown {
    /// Sum of the terms, capped at 1.
    pub fn total(&self) -> Decimal {
        (self.amount + self.date + self.counterpart).min(Decimal::ONE)
    }
}

/// A scored pairing of a statement transaction with a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub transaction: ExtractedTransaction,
    pub record: NormalizedRecord,
    /// Position of the record in the candidate slice.
    pub candidate_index: usize,
    /// Composite score in `[0, 1]`.
    pub score: Decimal,
    pub breakdown: ScoreBreakdown,
    pub explanation: String,
}

/// Outcome of matching one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationItem {
    pub transaction: ExtractedTransaction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<MatchCandidate>,
    pub classification: Classification,
    pub confidence: Decimal,
    pub explanation: String,
}

/// Outcome of reconciling a whole statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub items: Vec<ReconciliationItem>,
    pub matched: usize,
    pub partial: usize,
    pub unmatched: usize,
    /// Mean confidence over all items, 4 decimal places.
    pub average_confidence: Decimal,
}

impl ReconciliationReport {
    pub fn from_items(items: Vec<ReconciliationItem>) -> Self {
        let count = |c: Classification| items.iter().filter(|i| i.classification == c).count();
        let matched = count(Classification::Matched);
        let partial = count(Classification::Partial);
        let unmatched = count(Classification::Unmatched);

        let average_confidence = if items.is_empty() {
            Decimal::ZERO
        } else {
            let total: Decimal = items.iter().map(|i| i.confidence).sum();
            (total / Decimal::from(items.len())).round_dp(4)
        };

        Self {
            items,
            matched,
            partial,
            unmatched,
            average_confidence,
        }
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }
}
