//! Bank statement data models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ParseAmbiguityError;

/// Direction of money relative to the statement's account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Money leaving the account.
    Debit,
    /// Money entering the account.
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

/// Statement line layouts, in the order the parser tries them.
///
/// Variants run from most to least specific; the first one whose groups are
/// consistent decides how a line is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementLayout {
    /// `date origin concept debit credit balance`, full or day/month date
    OriginDebitCreditBalance,
    /// `date concept debit credit balance`, full or day/month date
    DebitCreditBalance,
    /// `dd/mm origin concept debit credit`
    OriginDebitCredit,
    /// `dd/mm concept debit credit`
    DebitCredit,
    /// `date concept amount balance`
    AmountBalance,
    /// `date concept amount`
    SignedAmount,
}

impl StatementLayout {
    /// Every layout in cascade priority order.
    pub const CASCADE: [StatementLayout; 6] = [
        Self::OriginDebitCreditBalance,
        Self::DebitCreditBalance,
        Self::OriginDebitCredit,
        Self::DebitCredit,
        Self::AmountBalance,
        Self::SignedAmount,
    ];
}

/// A single movement read from statement text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTransaction {
    /// Value date.
    pub date: NaiveDate,

    /// Free-text description with whitespace collapsed.
    pub concept: String,

    /// Absolute amount; the sign lives in `direction`.
    pub amount: Decimal,

    /// Debit or credit.
    pub direction: Direction,

    /// 1-based page the line came from.
    pub page: usize,

    /// Branch/origin code printed by some banks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// Running balance, when the layout carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,

    /// Layout that produced this transaction.
    pub layout: StatementLayout,
}

impl ExtractedTransaction {
    /// Amount with the direction applied (debits negative).
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Debit => -self.amount,
            Direction::Credit => self.amount,
        }
    }
}

/// Bank or wallet that issued a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "name", rename_all = "snake_case")]
pub enum Institution {
    Identified(String),
    /// No registry entry matched; extraction is still valid.
    Unidentified,
}

impl Institution {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Identified(name) => Some(name),
            Self::Unidentified => None,
        }
    }

    pub fn is_identified(&self) -> bool {
        matches!(self, Self::Identified(_))
    }
}

impl std::fmt::Display for Institution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identified(name) => f.write_str(name),
            Self::Unidentified => f.write_str("unidentified"),
        }
    }
}

/// Why a non-blank line did not become a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    TooShort,
    NoPattern,
    InvalidDate,
    MissingYear,
    InvalidAmount,
    ZeroAmount,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TooShort => "too_short",
            Self::NoPattern => "no_pattern",
            Self::InvalidDate => "invalid_date",
            Self::MissingYear => "missing_year",
            Self::InvalidAmount => "invalid_amount",
            Self::ZeroAmount => "zero_amount",
        }
    }
}

impl From<&ParseAmbiguityError> for SkipReason {
    fn from(err: &ParseAmbiguityError) -> Self {
        match err {
            ParseAmbiguityError::Date(_) => Self::InvalidDate,
            ParseAmbiguityError::MissingYear(_) => Self::MissingYear,
            ParseAmbiguityError::Amount(_) => Self::InvalidAmount,
            ParseAmbiguityError::ZeroAmount => Self::ZeroAmount,
        }
    }
}

/// Diagnostic record for a skipped line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnparsedLine {
    /// 1-based page number.
    pub page: usize,
    /// 1-based line number within the page.
    pub line: usize,
    /// Trimmed line text.
    pub text: String,
    pub reason: SkipReason,
}

/// Facts discovered on the first page and consulted while parsing the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseContext {
    /// Leading slice of the first page.
    pub header: String,

    /// Year used to complete day/month dates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// Output of a full statement parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedStatement {
    pub transactions: Vec<ExtractedTransaction>,
    pub unparsed: Vec<UnparsedLine>,
    pub institution: Institution,
    pub context: ParseContext,
}

/// Aggregate figures for a parsed statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementSummary {
    pub transaction_count: usize,
    pub credit_count: usize,
    pub debit_count: usize,
    pub credit_total: Decimal,
    pub debit_total: Decimal,
    /// Credits minus debits.
    pub net: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_date: Option<NaiveDate>,
    /// Mean absolute amount, rounded to cents.
    pub average_amount: Decimal,
    pub institution: Institution,
}

impl StatementSummary {
    /// Summarize a set of transactions.
    pub fn from_transactions(transactions: &[ExtractedTransaction], institution: Institution) -> Self {
        let (credits, debits): (Vec<_>, Vec<_>) = transactions
            .iter()
            .partition(|t| t.direction == Direction::Credit);

        let credit_total: Decimal = credits.iter().map(|t| t.amount).sum();
        let debit_total: Decimal = debits.iter().map(|t| t.amount).sum();

        let average_amount = if transactions.is_empty() {
            Decimal::ZERO
        } else {
            ((credit_total + debit_total) / Decimal::from(transactions.len())).round_dp(2)
        };

        Self {
            transaction_count: transactions.len(),
            credit_count: credits.len(),
            debit_count: debits.len(),
            credit_total,
            debit_total,
            net: credit_total - debit_total,
            first_date: transactions.iter().map(|t| t.date).min(),
            last_date: transactions.iter().map(|t| t.date).max(),
            average_amount,
            institution,
        }
    }
}

impl ParsedStatement {
    /// Summary over this statement's transactions.
    pub fn summary(&self) -> StatementSummary {
        StatementSummary::from_transactions(&self.transactions, self.institution.clone())
    }
}
