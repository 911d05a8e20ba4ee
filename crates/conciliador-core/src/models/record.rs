//! Tabular accounting record models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical meaning a tabular column can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticField {
    Date,
    Counterpart,
    Amount,
    Reference,
    Concept,
    DocumentType,
    DocumentNumber,
}

impl SemanticField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Counterpart => "counterpart",
            Self::Amount => "amount",
            Self::Reference => "reference",
            Self::Concept => "concept",
            Self::DocumentType => "document_type",
            Self::DocumentNumber => "document_number",
        }
    }
}

impl fmt::Display for SemanticField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "date" => Ok(Self::Date),
            "counterpart" | "client" | "customer" => Ok(Self::Counterpart),
            "amount" => Ok(Self::Amount),
            "reference" | "ref" => Ok(Self::Reference),
            "concept" | "description" => Ok(Self::Concept),
            "document_type" | "doc_type" => Ok(Self::DocumentType),
            "document_number" | "doc_number" | "document" => Ok(Self::DocumentNumber),
            other => Err(format!("unknown field: {other}")),
        }
    }
}

/// One row of a spreadsheet or CSV, columns kept in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularRecord {
    fields: Vec<(String, String)>,
}

impl TabularRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Append a column. Later duplicates of a column name are kept but never
    /// returned by [`TabularRecord::get`].
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.push((column.into(), value.into()));
    }

    /// Raw value of `column`, matched exactly.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Column names in source order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A tabular row mapped onto canonical fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// 0-based index of the source row.
    pub row: usize,

    pub date: NaiveDate,

    /// Counterpart name as it appeared in the source.
    pub counterpart: String,

    /// Absolute amount.
    pub amount: Decimal,

    /// Invoice/voucher number or other reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
}
