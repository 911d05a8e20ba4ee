//! Data models shared across the reconciliation pipeline.

pub mod config;
pub mod identity;
pub mod reconciliation;
pub mod record;
pub mod statement;
