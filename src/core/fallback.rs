use crate::core::normalizer::NormalizedProfile;
use crate::core::scoring::compatibility_score;
use crate::models::ScoreSource;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failures of an external compatibility scorer.
///
/// None of these reach the caller of the selector; they only switch the
/// affected candidate to the local score.
#[derive(Debug, Clone, Error)]
pub enum ScoringError {
    #[error("scoring request failed: {0}")]
    Request(String),

    #[error("scoring timed out after {0:?}")]
    Timeout(Duration),

    #[error("scorer returned an unusable score: {0}")]
    Parse(String),

    #[error("scorer unavailable: {0}")]
    Unavailable(String),
}

/// Something that can rate how compatible two profiles are, on a 0-100 scale.
#[async_trait]
pub trait CompatibilityScorer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn score(
        &self,
        a: &NormalizedProfile,
        b: &NormalizedProfile,
    ) -> Result<f64, ScoringError>;
}

/// Reject non-finite scores and clamp the rest into 0..=100.
pub fn sanitise_score(score: f64) -> Result<f64, ScoringError> {
    if !score.is_finite() {
        return Err(ScoringError::Parse(format!("non-finite score {}", score)));
    }
    Ok(score.clamp(0.0, 100.0))
}

/// The deterministic aggregator as a scorer. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalScorer;

impl LocalScorer {
    pub fn score_now(&self, a: &NormalizedProfile, b: &NormalizedProfile) -> f64 {
        compatibility_score(a, b)
    }
}

#[async_trait]
impl CompatibilityScorer for LocalScorer {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn score(
        &self,
        a: &NormalizedProfile,
        b: &NormalizedProfile,
    ) -> Result<f64, ScoringError> {
        Ok(self.score_now(a, b))
    }
}

/// Score together with the scorer that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyScore {
    pub score: f64,
    pub source: ScoreSource,
}

/// Decides, per call, whether the external score or the local one is used.
///
/// There is no remembered state: every call tries the external scorer first
/// (when one is configured) and falls back to the local aggregator on any
/// error or timeout.
#[derive(Clone)]
pub struct FallbackPolicy {
    external: Option<Arc<dyn CompatibilityScorer>>,
    timeout: Duration,
    local: LocalScorer,
}

impl FallbackPolicy {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(external: Option<Arc<dyn CompatibilityScorer>>, timeout: Duration) -> Self {
        Self {
            external,
            timeout,
            local: LocalScorer,
        }
    }

    pub fn with_external(external: Arc<dyn CompatibilityScorer>) -> Self {
        Self::new(Some(external), Self::DEFAULT_TIMEOUT)
    }

    pub fn local_only() -> Self {
        Self::new(None, Self::DEFAULT_TIMEOUT)
    }

    pub fn has_external(&self) -> bool {
        self.external.is_some()
    }

    /// Local score, no external call.
    pub fn local_score(&self, a: &NormalizedProfile, b: &NormalizedProfile) -> f64 {
        self.local.score_now(a, b)
    }

    /// Score a pair, preferring the external scorer.
    pub async fn score(&self, a: &NormalizedProfile, b: &NormalizedProfile) -> PolicyScore {
        let Some(external) = &self.external else {
            return PolicyScore {
                score: self.local_score(a, b),
                source: ScoreSource::Local,
            };
        };

        match self.try_external(external.as_ref(), a, b).await {
            Ok(score) => PolicyScore {
                score,
                source: ScoreSource::External,
            },
            Err(e) => {
                tracing::warn!(
                    "External scorer '{}' failed for {:?} -> {:?}, using local score: {}",
                    external.name(),
                    a.id,
                    b.id,
                    e
                );
                PolicyScore {
                    score: self.local_score(a, b),
                    source: ScoreSource::Local,
                }
            }
        }
    }

    async fn try_external(
        &self,
        scorer: &dyn CompatibilityScorer,
        a: &NormalizedProfile,
        b: &NormalizedProfile,
    ) -> Result<f64, ScoringError> {
        let raw = tokio::time::timeout(self.timeout, scorer.score(a, b))
            .await
            .map_err(|_| ScoringError::Timeout(self.timeout))??;

        sanitise_score(raw)
    }
}

impl std::fmt::Debug for FallbackPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackPolicy")
            .field("external", &self.external.as_ref().map(|s| s.name()))
            .field("timeout", &self.timeout)
            .finish()
    }
}
