//! Classifier types and tuning constants

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;
use crate::storage::Namespace;

/// Most-decisive tokens considered when combining probabilities
pub const RELEVANCE_CUTOFF: usize = 20;
/// Lower bound for any cached or combined probability
pub const MIN_PROB: f64 = 0.0001;
/// Upper bound for any cached or combined probability
pub const MAX_PROB: f64 = 0.9999;
/// Probability assumed for tokens without cached evidence
pub const DEFAULT_PROB: f64 = 0.4;
/// Combined probability above which content is called spam
pub const SPAM_PROB: f64 = 0.90;

/// The two classes the filter discriminates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Spam,
    Ham,
}

impl Category {
    /// The other category. Total over the two-value domain, so "neither
    /// same nor opposite" cannot arise once a category has been parsed.
    pub fn opposite(self) -> Self {
        match self {
            Category::Spam => Category::Ham,
            Category::Ham => Category::Spam,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Spam => "spam",
            Category::Ham => "ham",
        }
    }

    /// Namespace holding this category's per-token evidence counts.
    pub fn count_namespace(self) -> Namespace {
        match self {
            Category::Spam => Namespace::Spam,
            Category::Ham => Namespace::Ham,
        }
    }

    /// Namespace holding this category's total counter.
    pub fn total_namespace(self) -> Namespace {
        match self {
            Category::Spam => Namespace::SpamTotal,
            Category::Ham => Namespace::HamTotal,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, FilterError> {
        match s {
            "spam" => Ok(Category::Spam),
            "ham" => Ok(Category::Ham),
            other => Err(FilterError::InvalidCategory(other.to_string())),
        }
    }
}

/// A token paired with its cached (or default) spam probability.
pub type TokenProbability = (String, f64);

/// Outcome of classifying one piece of content. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    /// Combined spam probability, within `[MIN_PROB, MAX_PROB]`
    pub probability: f64,
    /// Whether `probability` exceeds [`SPAM_PROB`]
    pub is_spam: bool,
    /// The most decisive token/probability pairs behind the score
    pub best_keys: Vec<TokenProbability>,
    /// Wall-clock classification time, milliseconds
    pub elapsed: u64,
}

/// Persisted proof that a specific piece of content was trained, keyed by
/// its content hash. Overwritten when content is retrained under the
/// opposite label; its `cat` always reflects the last label applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    /// Category the content was last trained as
    pub cat: Category,
    /// Canonical serialization of the trained content
    pub object: String,
    /// When the training happened
    pub date: DateTime<Utc>,
    /// Wall-clock training time, milliseconds
    pub elapsed: u64,
}
