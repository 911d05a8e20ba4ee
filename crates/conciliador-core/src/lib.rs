//! Core library for bank statement reconciliation.
//!
//! This crate provides:
//! - Statement text parsing with a cascade of line layouts
//! - Tabular schema detection and record normalization
//! - Transaction to record scoring and classification
//! - DNI/CUIT canonicalization and master-set lookup

pub mod error;
pub mod identity;
pub mod matching;
pub mod models;
pub mod normalize;
pub mod schema;
pub mod statement;

pub use error::{
    EmptyInputError, InvalidDocumentError, MissingFieldError, ParseAmbiguityError, ReconError,
    RecordError, Result,
};
pub use identity::{
    identities_from_records, resolve_batch, resolve_identity, IdentityBatch, IdentityResolver,
    MasterIdentitySet,
};
pub use matching::{match_transaction, reconcile, MatchEngine};
pub use models::config::ReconConfig;
pub use models::identity::{ClientIdentity, DocumentType, RawIdentity};
pub use models::reconciliation::{Classification, ReconciliationItem, ReconciliationReport};
pub use models::record::{NormalizedRecord, SemanticField, TabularRecord};
pub use models::statement::{
    Direction, ExtractedTransaction, Institution, ParsedStatement, StatementSummary,
};
pub use schema::{normalize_records, NormalizationResult, SchemaHints, SchemaMapper, SourceKind};
pub use statement::{parse_statement, CascadeStatementParser, StatementParser};
