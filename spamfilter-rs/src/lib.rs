//! spamfilter-rs: Trainable Bayesian spam/ham classifier
//!
//! A two-category text/content classifier built on per-token frequency
//! statistics. Callers train it with structured JSON-shaped content and a
//! label; the filter extracts feature tokens, accumulates per-token
//! evidence counts in a pluggable key/value store, and later scores new
//! content from the same statistics.
//!
//! # Features
//!
//! - **Structured content**: arbitrary nested data, not just plain text;
//!   field paths, digrams and array lengths become features
//! - **Incremental**: learn, forget and swap update counts in place, no
//!   batch retraining
//! - **Idempotent training**: a content-addressed ledger makes retraining
//!   with the same label a no-op and a flipped label a reversal
//! - **Pluggable storage**: everything persists through the
//!   [`storage::StatsStore`] contract; an in-memory backend ships with the
//!   crate
//!
//! # Example
//!
//! ```no_run
//! use spamfilter_rs::spam::{Category, SpamManager};
//! use spamfilter_rs::storage::MemoryStore;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let filter = SpamManager::new(store);
//!
//!     filter.train(Category::Spam, &json!({ "subject": "FREE money" })).await?;
//!     let decision = filter.test(&json!({ "subject": "lunch tomorrow?" })).await?;
//!     println!("spam probability: {}", decision.probability);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`tokenizer`]: Structured content → feature tokens
//! - [`storage`]: Statistics store contract and backends
//! - [`spam`]: Evidence model, probability engine and training ledger

pub mod config;
pub mod error;
pub mod spam;
pub mod storage;
pub mod tokenizer;

// Re-export commonly used types
pub use config::{Config, TokenizerConfig};
pub use error::{FilterError, Result};
pub use spam::{BayesianClassifier, Category, Decision, SpamManager, TrainingRecord};
pub use storage::{MemoryStore, Namespace, StatsStore};
pub use tokenizer::Tokenizer;
