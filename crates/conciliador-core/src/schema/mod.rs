//! Tabular schema detection and record normalization.

pub mod keywords;
mod mapper;
mod source;

pub use keywords::{find_column, header_key};
pub use source::SourceKind;
pub use mapper::{normalize_records, ColumnMapping, NormalizationResult, SchemaHints, SchemaMapper};
