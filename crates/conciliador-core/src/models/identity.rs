//! Client identity models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of identity document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// National identity number (DNI), 8 digits.
    Personal,
    /// Tax identification number (CUIT/CUIL), 11 digits.
    Fiscal,
}

impl DocumentType {
    /// Canonical digit count.
    pub fn length(&self) -> usize {
        match self {
            Self::Personal => 8,
            Self::Fiscal => 11,
        }
    }

    /// Short label used in exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Personal => "DNI",
            Self::Fiscal => "CUIT",
        }
    }

    /// Map a tax-authority document code or label.
    ///
    /// `80`/`86` and `CUIT`/`CUIL` are fiscal, `96` and `DNI` personal.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "80" | "86" | "CUIT" | "CUIL" => Some(Self::Fiscal),
            "96" | "DNI" => Some(Self::Personal),
            _ => None,
        }
    }
}

/// Identity exactly as read from an input row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIdentity {
    pub name: String,
    /// Document type code or label, possibly empty.
    pub document_type: String,
    pub document_number: String,
    /// Declared province/jurisdiction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    /// Withholding/perception amount, for jurisdiction inference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withholding: Option<Decimal>,
    /// Taxable base the withholding was computed on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxable_base: Option<Decimal>,
}

/// Where a jurisdiction value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JurisdictionSource {
    Declared,
    /// Guessed from a withholding rate; not authoritative.
    Inferred,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jurisdiction {
    pub name: String,
    pub source: JurisdictionSource,
}

impl Jurisdiction {
    pub fn declared(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: JurisdictionSource::Declared,
        }
    }

    pub fn inferred(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: JurisdictionSource::Inferred,
        }
    }

    pub fn is_inferred(&self) -> bool {
        self.source == JurisdictionSource::Inferred
    }
}

/// VAT condition implied by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxCondition {
    FinalConsumer,
    RegisteredTaxpayer,
    SimplifiedRegime,
}

impl TaxCondition {
    pub fn label(&self) -> &'static str {
        match self {
            Self::FinalConsumer => "Consumidor Final",
            Self::RegisteredTaxpayer => "Responsable Inscripto",
            Self::SimplifiedRegime => "Monotributista",
        }
    }
}

/// Whether the identity is already present in the master set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStatus {
    Existing,
    New,
}

/// A canonicalized client identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdentity {
    pub document_type: DocumentType,
    /// Digit-only number of exactly `document_type.length()` digits.
    pub document_number: String,
    /// Display name as supplied.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<Jurisdiction>,
    pub tax_condition: TaxCondition,
    pub status: IdentityStatus,
}

impl ClientIdentity {
    /// Well-formed fiscal numbers in `XX-XXXXXXXX-X` form, anything else unchanged.
    pub fn formatted_number(&self) -> String {
        match self.document_type {
            DocumentType::Fiscal
                if self.document_number.len() == 11
                    && self.document_number.bytes().all(|b| b.is_ascii_digit()) =>
            {
                format!(
                    "{}-{}-{}",
                    &self.document_number[0..2],
                    &self.document_number[2..10],
                    &self.document_number[10..11]
                )
            }
            _ => self.document_number.clone(),
        }
    }
}
