//! Transaction to record matching.

mod engine;
pub mod scoring;

pub use engine::{match_transaction, reconcile, MatchEngine};
pub use scoring::{classify, score};
