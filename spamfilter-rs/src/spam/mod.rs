//! Trainable spam/ham classification
//!
//! Per-token Bayesian evidence over a pluggable statistics store, with an
//! idempotent, content-addressed training ledger.

pub mod manager;
pub mod scorer;
pub mod types;

pub use manager::SpamManager;
pub use scorer::BayesianClassifier;
pub use types::*;
