use crate::core::fallback::{CompatibilityScorer, ScoringError};
use crate::core::normalizer::NormalizedProfile;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// In-memory cache of external compatibility scores
///
/// Keyed by the unordered pair of profile ids, so (a, b) and (b, a) share an
/// entry. Ids are kept as separate tuple fields, never joined into one
/// string. Entries expire after the configured TTL.
#[derive(Clone)]
pub struct ScoreCache {
    scores: moka::future::Cache<PairKey, f64>,
    ttl_secs: u64,
}

impl ScoreCache {
    pub fn new(max_entries: u64, ttl_secs: u64) -> Self {
        let scores = moka::future::CacheBuilder::new(max_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { scores, ttl_secs }
    }

    pub async fn get(&self, key: &PairKey) -> Option<f64> {
        let hit = self.scores.get(key).await;
        if hit.is_some() {
            tracing::trace!("Score cache hit: {:?}", key);
        }
        hit
    }

    pub async fn insert(&self, key: PairKey, score: f64) {
        self.scores.insert(key, score).await;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.scores.entry_count(),
            ttl_secs: self.ttl_secs,
        }
    }

    #[cfg(test)]
    async fn sync(&self) {
        self.scores.run_pending_tasks().await;
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub ttl_secs: u64,
}

/// Ordered pair of profile ids, lower id first.
pub type PairKey = (String, String);

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a key for a profile pair; `None` unless both profiles have ids.
    pub fn pair(a: &NormalizedProfile, b: &NormalizedProfile) -> Option<PairKey> {
        let (a, b) = (a.id.as_deref()?, b.id.as_deref()?);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Some((low.to_string(), high.to_string()))
    }
}

/// Wraps a scorer so successful scores are reused across requests.
///
/// Failures are never cached: the next call tries the inner scorer again.
pub struct CachedScorer<S> {
    inner: S,
    cache: ScoreCache,
}

impl<S: CompatibilityScorer> CachedScorer<S> {
    pub fn new(inner: S, cache: ScoreCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &ScoreCache {
        &self.cache
    }
}

#[async_trait]
impl<S: CompatibilityScorer> CompatibilityScorer for CachedScorer<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn score(
        &self,
        a: &NormalizedProfile,
        b: &NormalizedProfile,
    ) -> Result<f64, ScoringError> {
        let Some(key) = CacheKey::pair(a, b) else {
            return self.inner.score(a, b).await;
        };

        if let Some(score) = self.cache.get(&key).await {
            return Ok(score);
        }

        let score = self.inner.score(a, b).await?;
        self.cache.insert(key, score).await;
        Ok(score)
    }
}
