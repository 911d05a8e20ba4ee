//! Pairwise similarity scoring.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::config::MatchingConfig;
use crate::models::reconciliation::{Classification, ScoreBreakdown};
use crate::models::record::NormalizedRecord;
use crate::models::statement::ExtractedTransaction;
use crate::normalize::comparison_key;

/// Weight of the amount term.
pub const AMOUNT_WEIGHT: Decimal = Decimal::from_parts(4, 0, 0, false, 1);
/// Weight of the date term.
pub const DATE_WEIGHT: Decimal = Decimal::from_parts(3, 0, 0, false, 1);
/// Weight of the counterpart term.
pub const COUNTERPART_WEIGHT: Decimal = Decimal::from_parts(3, 0, 0, false, 1);

const AMOUNT_NEAR: Decimal = Decimal::from_parts(2, 0, 0, false, 1);
const DATE_NEAR: Decimal = Decimal::from_parts(2, 0, 0, false, 1);
const DATE_FAR: Decimal = Decimal::from_parts(1, 0, 0, false, 1);
const COUNTERPART_PARTIAL: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

/// Amount closeness by relative difference `|a - b| / max(a, b)`.
///
/// Full weight within 1%, 0.2 within 5%. Zero amounts score 0, and so do
/// pairs too far apart to compare without overflow.
pub fn score_amount(a: Decimal, b: Decimal) -> Decimal {
    let (a, b) = (a.abs(), b.abs());
    if a.is_zero() || b.is_zero() {
        return Decimal::ZERO;
    }

    let diff = (a - b).abs();
    let max = a.max(b);

    // an overflowing product is far outside either band
    let within = |factor: Decimal| diff.checked_mul(factor).is_some_and(|d| d <= max);

    if within(Decimal::ONE_HUNDRED) {
        AMOUNT_WEIGHT
    } else if within(Decimal::from(20)) {
        AMOUNT_NEAR
    } else {
        Decimal::ZERO
    }
}

/// Date proximity: same day, within 2 days, within 5 days.
pub fn score_date(a: NaiveDate, b: NaiveDate) -> Decimal {
    match (a - b).num_days().abs() {
        0 => DATE_WEIGHT,
        1..=2 => DATE_NEAR,
        3..=5 => DATE_FAR,
        _ => Decimal::ZERO,
    }
}

/// Text agreement between a statement concept and a record counterpart.
///
/// Exact match after normalization scores full weight; a whitespace token of
/// either side found inside the other scores 0.2. Empty text scores 0.
pub fn score_counterpart(concept: &str, counterpart: &str) -> Decimal {
    let concept = comparison_key(concept);
    let counterpart = comparison_key(counterpart);
    if concept.is_empty() || counterpart.is_empty() {
        return Decimal::ZERO;
    }

    if concept == counterpart {
        return COUNTERPART_WEIGHT;
    }

    let shares_token = |from: &str, into: &str| from.split_whitespace().any(|t| into.contains(t));
    if shares_token(&concept, &counterpart) || shares_token(&counterpart, &concept) {
        COUNTERPART_PARTIAL
    } else {
        Decimal::ZERO
    }
}

/// All three terms for one transaction/record pair.
pub fn score(transaction: &ExtractedTransaction, record: &NormalizedRecord) -> ScoreBreakdown {
    ScoreBreakdown {
        amount: score_amount(transaction.amount, record.amount),
        date: score_date(transaction.date, record.date),
        counterpart: score_counterpart(&transaction.concept, &record.counterpart),
    }
}

/// Band a composite score. Monotonic in `score`.
pub fn classify(score: Decimal, config: &MatchingConfig) -> Classification {
    if score >= config.matched_threshold {
        Classification::Matched
    } else if score >= config.partial_threshold {
        Classification::Partial
    } else {
        Classification::Unmatched
    }
}
