//! Column detection and row normalization.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EmptyInputError, MissingFieldError, RecordError, Result};
use crate::models::record::{NormalizedRecord, SemanticField, TabularRecord};
use crate::normalize::{canonical_reference, parse_amount, parse_date};

use super::keywords::{find_column, keywords, POINT_OF_SALE, RESOLUTION_ORDER};
use super::source::SourceKind;

/// Caller-supplied column assignments that bypass detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaHints {
    overrides: BTreeMap<SemanticField, String>,
}

impl SchemaHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `field` to the column named exactly `column`.
    pub fn with(mut self, field: SemanticField, column: impl Into<String>) -> Self {
        self.overrides.insert(field, column.into());
        self
    }

    pub fn get(&self, field: SemanticField) -> Option<&str> {
        self.overrides.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Resolved field to column assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    columns: BTreeMap<SemanticField, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    point_of_sale: Option<String>,
}

impl ColumnMapping {
    pub fn get(&self, field: SemanticField) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    /// Unclaimed column holding the point of sale for references.
    pub fn point_of_sale(&self) -> Option<&str> {
        self.point_of_sale.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SemanticField, &str)> {
        self.columns.iter().map(|(f, c)| (*f, c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Normalized rows plus the rows that were excluded.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizationResult {
    pub records: Vec<NormalizedRecord>,
    pub errors: Vec<RecordError>,
    pub mapping: ColumnMapping,
    pub source: SourceKind,
}

/// Maps arbitrary tabular schemas onto [`SemanticField`]s.
#[derive(Debug, Clone, Default)]
pub struct SchemaMapper {
    hints: SchemaHints,
}

impl SchemaMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set schema hints.
    pub fn with_hints(mut self, hints: SchemaHints) -> Self {
        self.hints = hints;
        self
    }

    /// Assign columns to fields.
    ///
    /// Hinted fields take their column as given. Remaining fields are
    /// detected in [`RESOLUTION_ORDER`], each ignoring columns already
    /// claimed. A point-of-sale column is looked up last among the
    /// unclaimed ones, only when a reference column exists.
    pub fn map_columns<'a, I>(&self, headers: I) -> ColumnMapping
    where
        I: IntoIterator<Item = &'a str>,
    {
        let headers: Vec<&str> = headers.into_iter().collect();
        let mut columns = BTreeMap::new();

        for field in RESOLUTION_ORDER {
            if let Some(column) = self.hints.get(field) {
                if !headers.contains(&column) {
                    warn!(field = %field, column, "Hinted column not present in input");
                }
                columns.insert(field, column.to_string());
            }
        }

        for field in RESOLUTION_ORDER {
            if columns.contains_key(&field) {
                continue;
            }

            let available = headers
                .iter()
                .copied()
                .filter(|h| !columns.values().any(|claimed| claimed == h));

            if let Some(column) = find_column(available, keywords(field)) {
                debug!(field = %field, column, "Detected column");
                columns.insert(field, column.to_string());
            }
        }

        let point_of_sale = if columns.contains_key(&SemanticField::Reference) {
            let available = headers
                .iter()
                .copied()
                .filter(|h| !columns.values().any(|claimed| claimed == h));
            find_column(available, POINT_OF_SALE).map(str::to_string)
        } else {
            None
        };

        ColumnMapping {
            columns,
            point_of_sale,
        }
    }

    /// Normalize every row, collecting per-row errors.
    pub fn normalize(&self, records: &[TabularRecord]) -> Result<NormalizationResult> {
        if records.is_empty() {
            return Err(EmptyInputError::NoRows.into());
        }

        let start = Instant::now();
        let headers = distinct_columns(records);
        let source = SourceKind::detect(headers.iter().copied());
        let mapping = self.map_columns(headers);
        debug!(source = %source, "Detected source kind");

        let mut normalized = Vec::new();
        let mut errors = Vec::new();
        for (row, record) in records.iter().enumerate() {
            match normalize_row(row, record, &mapping) {
                Ok(r) => normalized.push(r),
                Err(e) => {
                    debug!(row, error = %e, "Excluded row");
                    errors.push(e);
                }
            }
        }

        info!(
            "Normalized {} of {} rows ({} mapped fields, {} source) in {}ms",
            normalized.len(),
            records.len(),
            mapping.len(),
            source,
            start.elapsed().as_millis()
        );

        Ok(NormalizationResult {
            records: normalized,
            errors,
            mapping,
            source,
        })
    }
}

/// Column names across all rows, first-seen order.
fn distinct_columns(records: &[TabularRecord]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for column in records.iter().flat_map(TabularRecord::columns) {
        if !seen.contains(&column) {
            seen.push(column);
        }
    }
    seen
}

fn cell<'r>(record: &'r TabularRecord, mapping: &ColumnMapping, field: SemanticField) -> Option<&'r str> {
    mapping
        .get(field)
        .and_then(|column| record.get(column))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn required<'r>(
    row: usize,
    record: &'r TabularRecord,
    mapping: &ColumnMapping,
    field: SemanticField,
) -> std::result::Result<&'r str, RecordError> {
    cell(record, mapping, field).ok_or(RecordError::MissingField(MissingFieldError { row, field }))
}

fn invalid(row: usize, field: SemanticField, value: &str) -> RecordError {
    RecordError::InvalidValue {
        row,
        field,
        value: value.to_string(),
    }
}

fn normalize_row(
    row: usize,
    record: &TabularRecord,
    mapping: &ColumnMapping,
) -> std::result::Result<NormalizedRecord, RecordError> {
    let raw_date = required(row, record, mapping, SemanticField::Date)?;
    let date: NaiveDate =
        parse_date(raw_date).ok_or_else(|| invalid(row, SemanticField::Date, raw_date))?;

    let counterpart = required(row, record, mapping, SemanticField::Counterpart)?;

    let raw_amount = required(row, record, mapping, SemanticField::Amount)?;
    let amount: Decimal = parse_amount(raw_amount)
        .filter(|a| !a.is_zero())
        .ok_or_else(|| invalid(row, SemanticField::Amount, raw_amount))?
        .abs();

    let optional = |field| cell(record, mapping, field).map(str::to_string);
    let point_of_sale = mapping
        .point_of_sale()
        .and_then(|column| record.get(column))
        .filter(|value| !value.trim().is_empty());

    Ok(NormalizedRecord {
        row,
        date,
        counterpart: counterpart.to_string(),
        amount,
        reference: cell(record, mapping, SemanticField::Reference)
            .map(|raw| canonical_reference(raw, point_of_sale)),
        concept: optional(SemanticField::Concept),
        document_type: optional(SemanticField::DocumentType),
        document_number: optional(SemanticField::DocumentNumber),
    })
}

/// Normalize records with the given hints.
pub fn normalize_records(records: &[TabularRecord], hints: &SchemaHints) -> Result<NormalizationResult> {
    SchemaMapper::new().with_hints(hints.clone()).normalize(records)
}
