//! Evidence model and probability engine
//!
//! Keeps per-token and per-category evidence counts in the statistics
//! store and derives per-token probabilities from them (Graham-style),
//! combining the most decisive tokens into a single bounded score.

use std::sync::Arc;
use std::time::Instant;

use futures::future::try_join_all;
use serde_json::Value;
use tracing::debug;

use super::types::{
    Category, Decision, TokenProbability, DEFAULT_PROB, MAX_PROB, MIN_PROB, RELEVANCE_CUTOFF,
    SPAM_PROB,
};
use crate::error::{FilterError, Result};
use crate::storage::{Namespace, StatsStore};

/// Key the category totals are stored under within their namespaces.
const TOTAL_KEY: &str = "total";

/// Direction of an evidence update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Evidence and probability engine over an injected statistics store.
///
/// Holds no state of its own; every count and cached probability lives in
/// the store, so several instances can share one store or use separate
/// ones.
pub struct BayesianClassifier<S> {
    store: Arc<S>,
}

impl<S: StatsStore> BayesianClassifier<S> {
    pub fn new(store: Arc<S>) -> Self {
        BayesianClassifier { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Record that these tokens were seen in `cat` content.
    pub async fn learn(&self, cat: Category, tokens: &[String]) -> Result<Vec<Option<f64>>> {
        self.update_counts(cat, tokens, Direction::Up).await
    }

    /// Reverse a previous `learn` of these tokens for `cat`.
    pub async fn forget(&self, cat: Category, tokens: &[String]) -> Result<Vec<Option<f64>>> {
        self.update_counts(cat, tokens, Direction::Down).await
    }

    /// Move these tokens' attribution from the opposite category to `cat`,
    /// used when content is retrained under the other label.
    pub async fn swap(&self, cat: Category, tokens: &[String]) -> Result<Vec<Option<f64>>> {
        let opp = cat.opposite();

        let cat_total = self.store.incr(cat.total_namespace(), TOTAL_KEY).await?;
        // A missing opposite total counts as 1 here, not 0 as in
        // learn/forget.
        let opp_total = match self.store.decr(opp.total_namespace(), TOTAL_KEY).await {
            Ok(total) => total,
            Err(e) if e.is_not_found() => 1,
            Err(e) => return Err(e),
        };

        debug!(category = %cat, tokens = tokens.len(), cat_total, opp_total, "swapping token counts");

        try_join_all(
            tokens
                .iter()
                .map(|token| self.swap_token_count(cat, token, cat_total, opp_total)),
        )
        .await
    }

    async fn update_counts(
        &self,
        cat: Category,
        tokens: &[String],
        dir: Direction,
    ) -> Result<Vec<Option<f64>>> {
        let opp = cat.opposite();

        let cat_total = match dir {
            Direction::Up => self.store.incr(cat.total_namespace(), TOTAL_KEY).await?,
            Direction::Down => self.store.decr(cat.total_namespace(), TOTAL_KEY).await?,
        };

        let opp_total = match self.store.read(opp.total_namespace(), TOTAL_KEY).await {
            Ok(value) => int_value(&value, opp.total_namespace(), TOTAL_KEY)?,
            Err(e) if e.is_not_found() => 0,
            Err(e) => return Err(e),
        };

        debug!(category = %cat, tokens = tokens.len(), ?dir, cat_total, opp_total, "updating token counts");

        // One totals snapshot for the whole batch; the per-token updates
        // are independent and run concurrently, in no particular order.
        try_join_all(
            tokens
                .iter()
                .map(|token| self.update_token_count(cat, token, dir, cat_total, opp_total)),
        )
        .await
    }

    async fn update_token_count(
        &self,
        cat: Category,
        token: &str,
        dir: Direction,
        cat_total: i64,
        opp_total: i64,
    ) -> Result<Option<f64>> {
        let opp = cat.opposite();

        let cat_count = match dir {
            Direction::Up => self.store.incr(cat.count_namespace(), token).await?,
            Direction::Down => self.store.decr(cat.count_namespace(), token).await?,
        };

        let opp_count = match self.store.read(opp.count_namespace(), token).await {
            Ok(value) => int_value(&value, opp.count_namespace(), token)?,
            Err(e) if e.is_not_found() => 0,
            Err(e) => return Err(e),
        };

        match cat {
            Category::Spam => {
                self.update_token_prob(token, cat_count, opp_count, cat_total, opp_total)
                    .await
            }
            Category::Ham => {
                self.update_token_prob(token, opp_count, cat_count, opp_total, cat_total)
                    .await
            }
        }
    }

    async fn swap_token_count(
        &self,
        cat: Category,
        token: &str,
        cat_total: i64,
        opp_total: i64,
    ) -> Result<Option<f64>> {
        let opp = cat.opposite();

        let cat_count = self.store.incr(cat.count_namespace(), token).await?;
        let opp_count = match self.store.decr(opp.count_namespace(), token).await {
            Ok(count) => count,
            Err(e) if e.is_not_found() => 0,
            Err(e) => return Err(e),
        };

        match cat {
            Category::Spam => {
                self.update_token_prob(token, cat_count, opp_count, cat_total, opp_total)
                    .await
            }
            Category::Ham => {
                self.update_token_prob(token, opp_count, cat_count, opp_total, cat_total)
                    .await
            }
        }
    }

    /// Recompute and persist a token's cached probability from the given
    /// evidence counts. Leaves the cache untouched and returns `None` when
    /// the evidence is too thin (`2·ham + spam <= 5`) or either total is
    /// zero; callers fall back to [`DEFAULT_PROB`].
    pub async fn update_token_prob(
        &self,
        token: &str,
        spam_count: i64,
        ham_count: i64,
        spam_total: i64,
        ham_total: i64,
    ) -> Result<Option<f64>> {
        let g = 2 * ham_count;
        let b = spam_count;

        if g + b <= 5 || spam_total == 0 || ham_total == 0 {
            return Ok(None);
        }

        let b_ratio = (b as f64 / spam_total as f64).min(1.0);
        let g_ratio = (g as f64 / ham_total as f64).min(1.0);
        let p = (b_ratio / (g_ratio + b_ratio)).clamp(MIN_PROB, MAX_PROB);

        self.store.save(Namespace::Prob, token, &Value::from(p)).await?;

        Ok(Some(p))
    }

    /// Cached probabilities for `tokens`, order and duplicates preserved;
    /// tokens without cached evidence get [`DEFAULT_PROB`].
    pub async fn probabilities(&self, tokens: &[String]) -> Result<Vec<TokenProbability>> {
        let cached = self.store.read_all(Namespace::Prob, tokens).await?;

        let mut probs = Vec::with_capacity(tokens.len());
        for token in tokens {
            let p = match cached.get(token) {
                None => DEFAULT_PROB,
                Some(value) => value.as_f64().ok_or_else(|| {
                    FilterError::DataCorruption(format!(
                        "probability for '{token}' is not a number: {value}"
                    ))
                })?,
            };
            probs.push((token.clone(), p));
        }

        Ok(probs)
    }

    /// Score already-tokenized content. Read-only; no statistics are
    /// touched.
    pub async fn classify(&self, tokens: &[String]) -> Result<Decision> {
        let start = Instant::now();

        let probs = self.probabilities(tokens).await?;
        let best_keys = best_probabilities(probs);
        let probability = combine_probabilities(&best_keys);

        Ok(Decision {
            probability,
            is_spam: probability > SPAM_PROB,
            best_keys,
            elapsed: start.elapsed().as_millis() as u64,
        })
    }
}

fn int_value(value: &Value, ns: Namespace, key: &str) -> Result<i64> {
    value.as_i64().ok_or_else(|| {
        FilterError::DataCorruption(format!("count '{ns}:{key}' is not an integer: {value}"))
    })
}

/// The at-most [`RELEVANCE_CUTOFF`] entries whose probability is furthest
/// from 0.5, most decisive first. The sort is stable, so ties keep their
/// input order.
pub fn best_probabilities(mut probs: Vec<TokenProbability>) -> Vec<TokenProbability> {
    probs.sort_by(|a, b| {
        let a_dist = (a.1 - 0.5).abs();
        let b_dist = (b.1 - 0.5).abs();
        b_dist
            .partial_cmp(&a_dist)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    probs.truncate(RELEVANCE_CUTOFF);
    probs
}

/// Combine selected probabilities into one bounded score. Both products
/// start at the multiplicative identity, so the empty set combines to 0.5.
pub fn combine_probabilities(probs: &[TokenProbability]) -> f64 {
    let prod: f64 = probs.iter().map(|(_, p)| *p).product();
    let invprod: f64 = probs.iter().map(|(_, p)| 1.0 - *p).product();

    (prod / (prod + invprod)).clamp(MIN_PROB, MAX_PROB)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prob(token: &str, p: f64) -> TokenProbability {
        (token.to_string(), p)
    }

    #[test]
    fn test_combine_empty_set_is_half() {
        assert_eq!(combine_probabilities(&[]), 0.5);
    }

    #[test]
    fn test_combine_single_value_passes_through() {
        let p = combine_probabilities(&[prob("a", 0.8)]);
        assert!((p - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_combine_stays_within_bounds() {
        let all_spam: Vec<_> = (0..50).map(|i| prob(&format!("t{i}"), 0.9999)).collect();
        let all_ham: Vec<_> = (0..50).map(|i| prob(&format!("t{i}"), 0.0001)).collect();

        assert_eq!(combine_probabilities(&all_spam), MAX_PROB);
        assert_eq!(combine_probabilities(&all_ham), MIN_PROB);
    }

    #[test]
    fn test_combine_balanced_evidence_is_half() {
        let p = combine_probabilities(&[prob("a", 0.3), prob("b", 0.7)]);
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_best_sorts_by_distance_from_half() {
        let best = best_probabilities(vec![
            prob("weak", 0.55),
            prob("strong", 0.99),
            prob("medium", 0.2),
        ]);

        let tokens: Vec<&str> = best.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tokens, vec!["strong", "medium", "weak"]);
    }

    #[test]
    fn test_best_cuts_off_at_twenty() {
        let probs: Vec<_> = (0..40)
            .map(|i| prob(&format!("t{i}"), 0.5 + f64::from(i) * 0.01))
            .collect();

        let best = best_probabilities(probs.clone());
        assert_eq!(best.len(), RELEVANCE_CUTOFF);

        let min_kept = best
            .iter()
            .map(|(_, p)| (p - 0.5).abs())
            .fold(f64::INFINITY, f64::min);
        for (token, p) in &probs {
            if !best.iter().any(|(t, _)| t == token) {
                assert!((p - 0.5).abs() <= min_kept);
            }
        }
    }

    #[test]
    fn test_best_keeps_tie_input_order() {
        let best = best_probabilities(vec![prob("first", 0.6), prob("second", 0.4)]);

        let tokens: Vec<&str> = best.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tokens, vec!["first", "second"]);
    }
}
