//! Bank statement text extraction.

mod institution;
mod layouts;
mod parser;

pub use institution::InstitutionRegistry;
pub use parser::{parse_statement, CascadeStatementParser, LineOutcome, StatementLines};

use crate::error::Result;
use crate::models::statement::ParsedStatement;

/// Trait for statement parsing.
pub trait StatementParser {
    /// Parse already-extracted page texts, first page first.
    fn parse<S: AsRef<str>>(&self, pages: &[S]) -> Result<ParsedStatement>;
}
