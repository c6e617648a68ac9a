//! Training ledger
//!
//! Wraps the classifier with a content-addressed record of what has been
//! trained, making retraining idempotent and label flips reversible.

use std::sync::Arc;
use std::time::Instant;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use md5::{Digest, Md5};
use serde_json::Value;
use tracing::{debug, info};

use super::scorer::BayesianClassifier;
use super::types::{Category, Decision, TrainingRecord};
use crate::error::{FilterError, Result};
use crate::storage::{Namespace, StatsStore};
use crate::tokenizer::Tokenizer;

/// Trainable spam filter: tokenizer, classifier and training ledger.
pub struct SpamManager<S> {
    classifier: BayesianClassifier<S>,
    tokenizer: Tokenizer,
}

impl<S: StatsStore> SpamManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_tokenizer(store, Tokenizer::default())
    }

    pub fn with_tokenizer(store: Arc<S>, tokenizer: Tokenizer) -> Self {
        SpamManager {
            classifier: BayesianClassifier::new(store),
            tokenizer,
        }
    }

    pub fn classifier(&self) -> &BayesianClassifier<S> {
        &self.classifier
    }

    /// Content-addressed key for a piece of content: MD5 of its
    /// serialization, URL-safe base64 without padding. Key order is part
    /// of the identity; structurally equal objects whose keys were
    /// inserted in a different order hash differently.
    pub fn hash_object(content: &Value) -> Result<String> {
        let canonical = serde_json::to_string(content)?;
        let digest = Md5::digest(canonical.as_bytes());

        Ok(URL_SAFE_NO_PAD.encode(digest))
    }

    /// Train `content` as `cat`.
    ///
    /// First-time content is learned and recorded. Content already trained
    /// as `cat` is a no-op that returns the stored record untouched.
    /// Content trained as the opposite category has its attribution
    /// swapped and its record overwritten with the new label.
    pub async fn train(&self, cat: Category, content: &Value) -> Result<TrainingRecord> {
        let start = Instant::now();
        let hash = Self::hash_object(content)?;
        let tokens = self.tokenizer.tokenize(content);

        let store = self.classifier.store();

        match store.read(Namespace::TrainRec, &hash).await {
            Err(e) if e.is_not_found() => {
                debug!(category = %cat, %hash, tokens = tokens.len(), "training new content");
                self.classifier.learn(cat, &tokens).await?;
                self.write_record(cat, content, &hash, start).await
            }
            Err(e) => Err(e),
            Ok(value) => {
                let record: TrainingRecord = serde_json::from_value(value).map_err(|e| {
                    FilterError::DataCorruption(format!("malformed training record '{hash}': {e}"))
                })?;

                if record.cat == cat {
                    // Idempotent retraining; statistics stay untouched.
                    debug!(category = %cat, %hash, "content already trained");
                    Ok(record)
                } else {
                    info!(from = %record.cat, to = %cat, %hash, "retraining under the opposite label");
                    self.classifier.swap(cat, &tokens).await?;
                    self.write_record(cat, content, &hash, start).await
                }
            }
        }
    }

    async fn write_record(
        &self,
        cat: Category,
        content: &Value,
        hash: &str,
        start: Instant,
    ) -> Result<TrainingRecord> {
        let record = TrainingRecord {
            cat,
            object: serde_json::to_string(content)?,
            date: Utc::now(),
            elapsed: start.elapsed().as_millis() as u64,
        };

        let value = serde_json::to_value(&record)?;
        self.classifier
            .store()
            .save(Namespace::TrainRec, hash, &value)
            .await?;

        Ok(record)
    }

    /// Tokenize and score `content` without touching any statistics.
    pub async fn test(&self, content: &Value) -> Result<Decision> {
        let tokens = self.tokenizer.tokenize(content);
        self.classifier.classify(&tokens).await
    }
}
