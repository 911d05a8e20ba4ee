//! Per-layout line extraction.

use chrono::NaiveDate;
use regex::{Captures, Regex};
use rust_decimal::Decimal;

use crate::error::ParseAmbiguityError;
use crate::models::statement::{Direction, ExtractedTransaction, StatementLayout};
use crate::normalize::patterns::{
    AMOUNT_BALANCE, DEBIT_CREDIT, DEBIT_CREDIT_BALANCE, ORIGIN_DEBIT_CREDIT,
    ORIGIN_DEBIT_CREDIT_BALANCE, SIGNED_AMOUNT,
};
use crate::normalize::{collapse_whitespace, parse_amount, parse_date, parse_day_month};

type LineResult = Result<ExtractedTransaction, ParseAmbiguityError>;

impl StatementLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OriginDebitCreditBalance => "origin_debit_credit_balance",
            Self::DebitCreditBalance => "debit_credit_balance",
            Self::OriginDebitCredit => "origin_debit_credit",
            Self::DebitCredit => "debit_credit",
            Self::AmountBalance => "amount_balance",
            Self::SignedAmount => "signed_amount",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            Self::OriginDebitCreditBalance => &ORIGIN_DEBIT_CREDIT_BALANCE,
            Self::DebitCreditBalance => &DEBIT_CREDIT_BALANCE,
            Self::OriginDebitCredit => &ORIGIN_DEBIT_CREDIT,
            Self::DebitCredit => &DEBIT_CREDIT,
            Self::AmountBalance => &AMOUNT_BALANCE,
            Self::SignedAmount => &SIGNED_AMOUNT,
        }
    }

    /// Read `line` with this layout.
    ///
    /// Returns `None` when the line does not have this layout's shape, and
    /// `Some(Err(_))` when it does but a value is out of range.
    pub(crate) fn extract(&self, line: &str, page: usize, year: Option<i32>) -> Option<LineResult> {
        let caps = self.pattern().captures(line)?;
        Some(self.read(&caps, page, year))
    }

    fn read(&self, caps: &Captures<'_>, page: usize, year: Option<i32>) -> LineResult {
        let date = resolve_date(&caps["date"], year)?;

        let (amount, direction) = match self {
            Self::OriginDebitCreditBalance
            | Self::DebitCreditBalance
            | Self::OriginDebitCredit
            | Self::DebitCredit => debit_or_credit(&caps["debit"], &caps["credit"])?,
            Self::AmountBalance | Self::SignedAmount => {
                signed(&caps["amount"], caps.name("marker").map(|m| m.as_str()))?
            }
        };

        let balance = caps
            .name("balance")
            .map(|m| read_amount(m.as_str()))
            .transpose()?;

        Ok(ExtractedTransaction {
            date,
            concept: collapse_whitespace(&caps["concept"]),
            amount,
            direction,
            page,
            origin: caps.name("origin").map(|m| collapse_whitespace(m.as_str())),
            balance,
            layout: *self,
        })
    }
}

/// Full dates parse on their own; day/month dates need the statement year.
fn resolve_date(token: &str, year: Option<i32>) -> Result<NaiveDate, ParseAmbiguityError> {
    if token.matches(['/', '-', '.']).count() >= 2 {
        return parse_date(token).ok_or_else(|| ParseAmbiguityError::Date(token.to_string()));
    }

    let year = year.ok_or_else(|| ParseAmbiguityError::MissingYear(token.to_string()))?;
    parse_day_month(token, year).ok_or_else(|| ParseAmbiguityError::Date(token.to_string()))
}

fn read_amount(token: &str) -> Result<Decimal, ParseAmbiguityError> {
    parse_amount(token).ok_or_else(|| ParseAmbiguityError::Amount(token.to_string()))
}

fn debit_or_credit(debit: &str, credit: &str) -> Result<(Decimal, Direction), ParseAmbiguityError> {
    let debit = read_amount(debit)?.abs();
    let credit = read_amount(credit)?.abs();

    if !debit.is_zero() {
        Ok((debit, Direction::Debit))
    } else if !credit.is_zero() {
        Ok((credit, Direction::Credit))
    } else {
        Err(ParseAmbiguityError::ZeroAmount)
    }
}

/// An explicit `DB`/`CR` marker overrides the sign.
fn signed(token: &str, marker: Option<&str>) -> Result<(Decimal, Direction), ParseAmbiguityError> {
    let value = read_amount(token)?;
    if value.is_zero() {
        return Err(ParseAmbiguityError::ZeroAmount);
    }

    let direction = match marker.map(str::to_ascii_uppercase).as_deref() {
        Some("DB") => Direction::Debit,
        Some("CR") => Direction::Credit,
        _ if value.is_sign_negative() => Direction::Debit,
        _ => Direction::Credit,
    };

    Ok((value.abs(), direction))
}
