//! Client identity canonicalization and master-set lookup.

pub mod document;
pub mod jurisdiction;
mod resolver;

pub use document::{canonicalize, validate_cuit, CanonicalDocument};
pub use jurisdiction::{infer_jurisdiction, resolve_jurisdiction};
pub use resolver::{
    identities_from_records, resolve_batch, resolve_identity, BatchError, IdentityBatch,
    IdentityResolver, MasterIdentitySet,
};
