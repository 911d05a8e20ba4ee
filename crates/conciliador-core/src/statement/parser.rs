//! Cascade statement parser.

use std::time::Instant;

use chrono::Datelike;
use tracing::{debug, info};

use crate::error::{EmptyInputError, Result};
use crate::models::config::ExtractionConfig;
use crate::models::statement::{
    ExtractedTransaction, ParseContext, ParsedStatement, SkipReason, StatementLayout, UnparsedLine,
};
use crate::normalize::{DateExtractor, FieldExtractor};

use super::institution::InstitutionRegistry;
use super::StatementParser;

/// Outcome for one non-blank line.
pub type LineOutcome = std::result::Result<ExtractedTransaction, UnparsedLine>;

/// Parser that tries every [`StatementLayout`] in cascade order.
pub struct CascadeStatementParser {
    config: ExtractionConfig,
    registry: InstitutionRegistry,
}

impl CascadeStatementParser {
    /// Create a parser with default settings and the built-in registry.
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
            registry: InstitutionRegistry::new(),
        }
    }

    /// Set extraction configuration.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the institution registry.
    pub fn with_registry(mut self, registry: InstitutionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Header facts from the first page.
    pub fn context<S: AsRef<str>>(&self, pages: &[S]) -> ParseContext {
        let header: String = pages
            .first()
            .map(|p| p.as_ref().chars().take(self.config.header_chars).collect())
            .unwrap_or_default();

        let year = DateExtractor::new()
            .extract(&header)
            .map(|m| m.value.year())
            .or(self.config.default_year);

        ParseContext { header, year }
    }

    /// Lazy view over every non-blank line of `pages`.
    ///
    /// Fails only when there are no pages or every page is blank.
    pub fn lines<'a, S: AsRef<str>>(&'a self, pages: &'a [S]) -> Result<StatementLines<'a, S>> {
        if pages.is_empty() {
            return Err(EmptyInputError::NoPages.into());
        }
        if pages.iter().all(|p| p.as_ref().trim().is_empty()) {
            return Err(EmptyInputError::NoReadableText.into());
        }

        Ok(StatementLines {
            parser: self,
            pages,
            context: self.context(pages),
        })
    }

    /// Parse one trimmed, non-blank line.
    pub fn parse_line(
        &self,
        text: &str,
        page: usize,
        context: &ParseContext,
    ) -> std::result::Result<ExtractedTransaction, SkipReason> {
        if text.chars().count() < self.config.min_line_length {
            return Err(SkipReason::TooShort);
        }

        for layout in StatementLayout::CASCADE {
            let Some(outcome) = layout.extract(text, page, context.year) else {
                continue;
            };

            return match outcome {
                Ok(mut txn) => {
                    txn.concept = truncate(&txn.concept, self.config.max_concept_length);
                    Ok(txn)
                }
                Err(e) => {
                    debug!(layout = layout.as_str(), error = %e, "Layout matched with unusable value");
                    Err(SkipReason::from(&e))
                }
            };
        }

        Err(SkipReason::NoPattern)
    }
}

impl Default for CascadeStatementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementParser for CascadeStatementParser {
    fn parse<S: AsRef<str>>(&self, pages: &[S]) -> Result<ParsedStatement> {
        let start = Instant::now();
        let lines = self.lines(pages)?;

        let mut transactions = Vec::new();
        let mut unparsed = Vec::new();
        for outcome in lines.iter() {
            match outcome {
                Ok(txn) => transactions.push(txn),
                Err(line) => {
                    debug!(page = line.page, line = line.line, reason = ?line.reason, "Skipped line");
                    unparsed.push(line);
                }
            }
        }

        let context = lines.context;
        let concepts = transactions
            .iter()
            .map(|t| t.concept.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let institution = self.registry.identify(&context.header, &concepts);

        info!(
            "Parsed {} pages: {} transactions, {} unparsed lines, institution {} in {}ms",
            pages.len(),
            transactions.len(),
            unparsed.len(),
            institution,
            start.elapsed().as_millis()
        );

        Ok(ParsedStatement {
            transactions,
            unparsed,
            institution,
            context,
        })
    }
}

/// Restartable sequence of line outcomes over a set of pages.
///
/// Each call to [`StatementLines::iter`] walks the pages from the start and
/// yields the same outcomes in the same order.
pub struct StatementLines<'a, S> {
    parser: &'a CascadeStatementParser,
    pages: &'a [S],
    context: ParseContext,
}

impl<'a, S: AsRef<str>> StatementLines<'a, S> {
    pub fn context(&self) -> &ParseContext {
        &self.context
    }

    /// Outcomes for every non-blank line, in page then line order.
    pub fn iter(&self) -> impl Iterator<Item = LineOutcome> + '_ {
        self.pages.iter().enumerate().flat_map(move |(page_idx, page)| {
            page.as_ref()
                .lines()
                .enumerate()
                .filter_map(move |(line_idx, raw)| {
                    let text = raw.trim();
                    if text.is_empty() {
                        return None;
                    }

                    let page = page_idx + 1;
                    Some(
                        self.parser
                            .parse_line(text, page, &self.context)
                            .map_err(|reason| UnparsedLine {
                                page,
                                line: line_idx + 1,
                                text: text.to_string(),
                                reason,
                            }),
                    )
                })
        })
    }

    /// Successfully extracted transactions only.
    pub fn transactions(&self) -> impl Iterator<Item = ExtractedTransaction> + '_ {
        self.iter().filter_map(|outcome| outcome.ok())
    }
}

fn truncate(concept: &str, max: usize) -> String {
    if concept.chars().count() <= max {
        concept.to_string()
    } else {
        let mut truncated: String = concept.chars().take(max).collect();
        truncated.push_str("...");
        truncated
    }
}

/// Parse statement pages with the default parser.
pub fn parse_statement<S: AsRef<str>>(pages: &[S]) -> Result<ParsedStatement> {
    CascadeStatementParser::new().parse(pages)
}
