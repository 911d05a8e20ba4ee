//! Identity resolution against a master set.

use std::collections::HashSet;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::InvalidDocumentError;
use crate::models::config::IdentityConfig;
use crate::models::identity::{ClientIdentity, DocumentType, IdentityStatus, RawIdentity};
use crate::models::record::{SemanticField, TabularRecord};
use crate::normalize::{digits_only, parse_amount};
use crate::schema::{find_column, SchemaMapper};

use super::document::{canonicalize, validate_cuit};
use super::jurisdiction::resolve_jurisdiction;

const JURISDICTION_KEYWORDS: &[&str] = &["jurisdiccion", "provincia"];
const WITHHOLDING_KEYWORDS: &[&str] = &["percepcion", "retencion", "iibb"];
const TAXABLE_BASE_KEYWORDS: &[&str] = &["base imponible", "neto gravado", "imp neto"];

/// Canonical document numbers already known to the system.
///
/// Built once; lookups are set membership.
#[derive(Debug, Clone, Default)]
pub struct MasterIdentitySet {
    numbers: HashSet<String>,
}

impl MasterIdentitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw document numbers.
    ///
    /// Numbers that do not canonicalize are kept as bare digits.
    pub fn from_numbers<I, S>(numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for number in numbers {
            set.insert(number.as_ref());
        }
        set
    }

    /// Build from master rows, locating the document column the same way
    /// the schema mapper does, so a document-type column is never taken.
    pub fn from_records(records: &[TabularRecord]) -> Self {
        let headers: Vec<&str> = records.first().map(|r| r.columns().collect()).unwrap_or_default();
        let mapping = SchemaMapper::new().map_columns(headers);

        let Some(column) = mapping.get(SemanticField::DocumentNumber) else {
            warn!("Master set has no document column; every identity will be new");
            return Self::new();
        };

        let set = Self::from_numbers(records.iter().filter_map(|r| r.get(column)));
        info!("Loaded {} master identities from column {:?}", set.len(), column);
        set
    }

    pub fn insert(&mut self, raw: &str) {
        let number = canonicalize(raw)
            .map(|doc| doc.number)
            .unwrap_or_else(|_| digits_only(raw));
        if !number.is_empty() {
            self.numbers.insert(number);
        }
    }

    /// Membership test on a canonical number.
    pub fn contains(&self, canonical: &str) -> bool {
        self.numbers.contains(canonical)
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

/// A row whose document number could not be canonicalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchError {
    pub row: usize,
    pub error: InvalidDocumentError,
}

/// Outcome of resolving a batch of raw identities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IdentityBatch {
    /// Identities absent from the master set.
    pub new: Vec<ClientIdentity>,
    /// Identities already in the master set.
    pub existing: Vec<ClientIdentity>,
    /// Rows dropped because an earlier row had the same canonical number.
    pub duplicates: Vec<usize>,
    pub errors: Vec<BatchError>,
}

/// Resolves raw identities into canonical client identities.
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    config: IdentityConfig,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set identity configuration.
    pub fn with_config(mut self, config: IdentityConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve one identity.
    ///
    /// The canonical length decides the document type; a declared type that
    /// disagrees is logged and ignored.
    pub fn resolve(
        &self,
        raw: &RawIdentity,
        master: &MasterIdentitySet,
    ) -> Result<ClientIdentity, InvalidDocumentError> {
        let doc = canonicalize(&raw.document_number)?;

        if let Some(declared) = DocumentType::from_code(&raw.document_type) {
            if declared != doc.document_type {
                warn!(
                    number = %doc.number,
                    declared = declared.label(),
                    detected = doc.document_type.label(),
                    "Declared document type disagrees with number length"
                );
            }
        }

        if doc.document_type == DocumentType::Fiscal && !validate_cuit(&doc.number) {
            debug!(number = %doc.number, "CUIT check digit mismatch");
        }

        let status = if master.contains(&doc.number) {
            IdentityStatus::Existing
        } else {
            IdentityStatus::New
        };

        Ok(ClientIdentity {
            tax_condition: doc.tax_condition(),
            document_type: doc.document_type,
            jurisdiction: resolve_jurisdiction(raw, &self.config.jurisdiction_bands),
            name: raw.name.trim().to_string(),
            document_number: doc.number,
            status,
        })
    }

    /// Resolve a batch, keeping the first row for each canonical number.
    pub fn resolve_batch(&self, raws: &[RawIdentity], master: &MasterIdentitySet) -> IdentityBatch {
        let start = Instant::now();
        let mut batch = IdentityBatch::default();
        let mut seen = HashSet::new();

        for (row, raw) in raws.iter().enumerate() {
            let identity = match self.resolve(raw, master) {
                Ok(identity) => identity,
                Err(error) => {
                    debug!(row, error = %error, "Rejected identity");
                    batch.errors.push(BatchError { row, error });
                    continue;
                }
            };

            if !seen.insert(identity.document_number.clone()) {
                batch.duplicates.push(row);
                continue;
            }

            match identity.status {
                IdentityStatus::New => batch.new.push(identity),
                IdentityStatus::Existing => batch.existing.push(identity),
            }
        }

        info!(
            "Resolved {} identities: {} new, {} existing, {} duplicates, {} errors in {}ms",
            raws.len(),
            batch.new.len(),
            batch.existing.len(),
            batch.duplicates.len(),
            batch.errors.len(),
            start.elapsed().as_millis()
        );

        batch
    }
}

/// Read raw identities from tabular rows.
///
/// Document, name and type columns are detected like any other schema;
/// jurisdiction, withholding and taxable base by their own keywords.
pub fn identities_from_records(records: &[TabularRecord]) -> Vec<RawIdentity> {
    let headers: Vec<&str> = records.first().map(|r| r.columns().collect()).unwrap_or_default();
    let mapping = SchemaMapper::new().map_columns(headers.iter().copied());

    let claimed: Vec<&str> = mapping.iter().map(|(_, column)| column).collect();
    let unclaimed: Vec<&str> = headers
        .iter()
        .copied()
        .filter(|h| !claimed.contains(h))
        .collect();
    let jurisdiction_col = find_column(unclaimed.iter().copied(), JURISDICTION_KEYWORDS);
    let withholding_col = find_column(unclaimed.iter().copied(), WITHHOLDING_KEYWORDS);
    let base_col = find_column(unclaimed.iter().copied(), TAXABLE_BASE_KEYWORDS);

    records
        .iter()
        .map(|record| {
            let text = |column: Option<&str>| {
                column
                    .and_then(|c| record.get(c))
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string()
            };
            let amount = |column: Option<&str>| column.and_then(|c| record.get(c)).and_then(parse_amount);
            let jurisdiction = text(jurisdiction_col);

            RawIdentity {
                name: text(mapping.get(SemanticField::Counterpart)),
                document_type: text(mapping.get(SemanticField::DocumentType)),
                document_number: text(mapping.get(SemanticField::DocumentNumber)),
                jurisdiction: (!jurisdiction.is_empty()).then_some(jurisdiction),
                withholding: amount(withholding_col),
                taxable_base: amount(base_col),
            }
        })
        .collect()
}

/// Resolve one identity with default configuration.
pub fn resolve_identity(
    raw: &RawIdentity,
    master: &MasterIdentitySet,
) -> Result<ClientIdentity, InvalidDocumentError> {
    IdentityResolver::new().resolve(raw, master)
}

/// Resolve a batch with default configuration.
pub fn resolve_batch(raws: &[RawIdentity], master: &MasterIdentitySet) -> IdentityBatch {
    IdentityResolver::new().resolve_batch(raws, master)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::identity::{JurisdictionSource, TaxCondition};
    use pretty_assertions::assert_eq;

    fn raw(name: &str, doc_type: &str, number: &str) -> RawIdentity {
        RawIdentity {
            name: name.to_string(),
            document_type: doc_type.to_string(),
            document_number: number.to_string(),
            ..RawIdentity::default()
        }
    }

    #[test]
    fn test_resolve_new_and_existing() {
        let master = MasterIdentitySet::from_numbers(["20-12345678-6", "1234567"]);

        let existing = resolve_identity(&raw("ABC SA", "80", "20123456786"), &master).unwrap();
        assert_eq!(existing.status, IdentityStatus::Existing);
        assert_eq!(existing.tax_condition, TaxCondition::RegisteredTaxpayer);

        let padded = resolve_identity(&raw("Juan", "96", "1.234.567"), &master).unwrap();
        assert_eq!(padded.document_number, "01234567");
        assert_eq!(padded.status, IdentityStatus::Existing);

        let new = resolve_identity(&raw("Otra", "80", "30712345671"), &master).unwrap();
        assert_eq!(new.status, IdentityStatus::New);
    }

    #[test]
    fn test_length_decides_type() {
        let identity =
            resolve_identity(&raw("Juan", "CUIT", "12345678"), &MasterIdentitySet::new()).unwrap();
        assert_eq!(identity.document_type, DocumentType::Personal);
        assert_eq!(identity.tax_condition, TaxCondition::FinalConsumer);
    }

    #[test]
    fn test_invalid_document() {
        let err = resolve_identity(&raw("X", "", "12-34"), &MasterIdentitySet::new()).unwrap_err();
        assert_eq!(err.raw, "12-34");
        assert_eq!(err.digits, 4);
    }

    #[test]
    fn test_batch_partitions() {
        let master = MasterIdentitySet::from_numbers(["20123456786"]);
        let raws = vec![
            raw("ABC SA", "80", "20-12345678-6"),
            raw("Juan", "96", "1234567"),
            raw("Juan bis", "96", "01.234.567"),
            raw("Roto", "", "123"),
        ];

        let batch = resolve_batch(&raws, &master);

        assert_eq!(batch.existing.len(), 1);
        assert_eq!(batch.new.len(), 1);
        assert_eq!(batch.new[0].name, "Juan");
        assert_eq!(batch.duplicates, vec![2]);
        assert_eq!(batch.errors.len(), 1);
        assert_eq!(batch.errors[0].row, 3);
    }

    #[test]
    fn test_master_from_records() {
        let records = vec![
            TabularRecord::from_pairs([("Razón Social", "ABC SA"), ("CUIT", "20-12345678-6")]),
            TabularRecord::from_pairs([("Razón Social", "Sin doc"), ("CUIT", "")]),
        ];
        let master = MasterIdentitySet::from_records(&records);
        assert_eq!(master.len(), 1);
        assert!(master.contains("20123456786"));
    }

    #[test]
    fn test_master_skips_document_type_column() {
        let records = vec![TabularRecord::from_pairs([
            ("Tipo Documento", "80"),
            ("Documento", "20-12345678-6"),
            ("Razon Social", "ABC SA"),
        ])];
        let master = MasterIdentitySet::from_records(&records);

        assert_eq!(master.len(), 1);
        assert!(master.contains("20123456786"));
        assert!(!master.contains("80"));
    }

    #[test]
    fn test_master_without_document_column() {
        let records = vec![TabularRecord::from_pairs([("Nombre", "ABC")])];
        assert!(MasterIdentitySet::from_records(&records).is_empty());
    }

    #[test]
    fn test_identities_from_portal_rows() {
        let records = vec![TabularRecord::from_pairs([
            ("Fecha", "01/12/2024"),
            ("Tipo Doc. Comprador", "80"),
            ("Nro. Doc. Comprador", "20123456786"),
            ("Denominación Comprador", "ABC SA"),
            ("Imp. Neto Gravado", "1.000,00"),
            ("Percepción IIBB", "30,00"),
            ("Imp. Total", "1.240,00"),
        ])];

        let raws = identities_from_records(&records);
        assert_eq!(raws.len(), 1);
        assert_eq!(raws[0].name, "ABC SA");
        assert_eq!(raws[0].document_type, "80");
        assert_eq!(raws[0].document_number, "20123456786");
        assert_eq!(raws[0].jurisdiction, None);

        let identity = resolve_identity(&raws[0], &MasterIdentitySet::new()).unwrap();
        let jurisdiction = identity.jurisdiction.unwrap();
        assert_eq!(jurisdiction.name, "Ciudad Autonoma de Buenos Aires");
        assert_eq!(jurisdiction.source, JurisdictionSource::Inferred);
    }
}
