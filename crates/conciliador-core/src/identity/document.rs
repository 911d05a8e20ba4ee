//! DNI/CUIT canonicalization and validation.

use serde::{Deserialize, Serialize};

use crate::error::InvalidDocumentError;
use crate::models::identity::{DocumentType, TaxCondition};
use crate::normalize::digits_only;

/// A document number reduced to its canonical digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalDocument {
    pub document_type: DocumentType,
    pub number: String,
}

impl CanonicalDocument {
    /// VAT condition implied by the number.
    ///
    /// Fiscal prefixes 20, 23 and 24 belong to individuals registered for VAT;
    /// other fiscal prefixes are treated as simplified-regime taxpayers.
    pub fn tax_condition(&self) -> TaxCondition {
        match self.document_type {
            DocumentType::Personal => TaxCondition::FinalConsumer,
            DocumentType::Fiscal => match &self.number[..2] {
                "20" | "23" | "24" => TaxCondition::RegisteredTaxpayer,
                _ => TaxCondition::SimplifiedRegime,
            },
        }
    }
}

/// Canonicalize a raw document number.
///
/// Non-digits are dropped. 7 digits are zero-padded to an 8-digit DNI,
/// 8 digits are a DNI, 11 digits a CUIT, and longer inputs keep their last
/// 11 digits as a CUIT.
pub fn canonicalize(raw: &str) -> Result<CanonicalDocument, InvalidDocumentError> {
    let digits = digits_only(raw);

    let (document_type, number) = match digits.len() {
        7 => (DocumentType::Personal, format!("0{digits}")),
        8 => (DocumentType::Personal, digits),
        11 => (DocumentType::Fiscal, digits),
        n if n > 11 => (DocumentType::Fiscal, digits[n - 11..].to_string()),
        n => {
            return Err(InvalidDocumentError {
                raw: raw.to_string(),
                digits: n,
            });
        }
    };

    Ok(CanonicalDocument {
        document_type,
        number,
    })
}

/// Validate a CUIT/CUIL using the modulo-11 check digit.
///
/// Weights: 5, 4, 3, 2, 7, 6, 5, 4, 3, 2
pub fn validate_cuit(cuit: &str) -> bool {
    let digits: Vec<u32> = cuit.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 11 {
        return false;
    }

    let weights = [5, 4, 3, 2, 7, 6, 5, 4, 3, 2];
    let sum: u32 = digits
        .iter()
        .take(10)
        .zip(weights.iter())
        .map(|(d, w)| d * w)
        .sum();

    let check = match 11 - (sum % 11) {
        11 => 0,
        10 => 9,
        n => n,
    };

    check == digits[10]
}
