//! Error types for the conciliador-core library.

use serde::Serialize;
use thiserror::Error;

use crate::models::record::SemanticField;

/// Main error type for the conciliador library.
#[derive(Error, Debug)]
pub enum ReconError {
    /// The input had nothing usable in it.
    #[error("empty input: {0}")]
    EmptyInput(#[from] EmptyInputError),

    /// Identity document could not be canonicalized.
    #[error("identity error: {0}")]
    InvalidDocument(#[from] InvalidDocumentError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Call-level failure: no usable pages or rows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmptyInputError {
    /// No pages were supplied.
    #[error("statement has no pages")]
    NoPages,

    /// Every supplied page is blank.
    #[error("statement pages contain no readable text")]
    NoReadableText,

    /// No tabular rows were supplied.
    #[error("record set has no rows")]
    NoRows,
}

/// A document number whose digits do not form a personal or fiscal id.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("invalid document number {raw:?}: {digits} digit(s) after normalization")]
pub struct InvalidDocumentError {
    /// Value exactly as supplied by the caller.
    pub raw: String,
    /// Digit count after stripping separators.
    pub digits: usize,
}

/// A row that lacks a required semantic field.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("row {row}: missing required field {field}")]
pub struct MissingFieldError {
    pub row: usize,
    pub field: SemanticField,
}

/// Per-row problems collected during record normalization.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordError {
    #[error(transparent)]
    MissingField(MissingFieldError),

    /// The field is present but its value cannot be parsed.
    #[error("row {row}: cannot parse {field} from {value:?}")]
    InvalidValue {
        row: usize,
        field: SemanticField,
        value: String,
    },
}

impl RecordError {
    /// Row index the error refers to.
    pub fn row(&self) -> usize {
        match self {
            Self::MissingField(e) => e.row,
            Self::InvalidValue { row, .. } => *row,
        }
    }
}

/// A line matched a layout but one of its values is out of range.
///
/// Never surfaces from a call; the line is reported as unparsed instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAmbiguityError {
    #[error("no date layout accepts {0:?}")]
    Date(String),

    #[error("date {0:?} has no year and none is known for the statement")]
    MissingYear(String),

    #[error("cannot read amount {0:?}")]
    Amount(String),

    #[error("all amount columns are zero")]
    ZeroAmount,
}

/// Result type for the conciliador library.
pub type Result<T> = std::result::Result<T, ReconError>;
