//! Locale-aware value normalization shared by every component.

pub mod amounts;
pub mod dates;
pub mod patterns;
pub mod text;
pub mod voucher;

pub use amounts::{format_amount, format_display_amount, parse_amount};
pub use dates::{parse_date, parse_day_month, DateExtractor};
pub use text::{collapse_whitespace, comparison_key, digits_only, normalize_text, strip_diacritics};
pub use voucher::{canonical_reference, VoucherNumber};

/// Trait for extractors that locate values inside free text.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences, in text order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value found in text, with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in source text.
    pub position: Option<(usize, usize)>,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            position: None,
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
