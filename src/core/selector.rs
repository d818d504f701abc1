use crate::core::fallback::FallbackPolicy;
use crate::core::normalizer::NormalizedProfile;
use crate::core::scoring::compatibility_score;
use crate::models::{CompatibilityResult, RankedCandidate, ScoreSource};
use futures::future::join_all;

/// Winning candidate of a blind-match selection.
#[derive(Debug, Clone, Copy)]
pub struct BestMatch<'a> {
    pub index: usize,
    pub profile: &'a NormalizedProfile,
    pub score: f64,
    pub source: ScoreSource,
}

impl BestMatch<'_> {
    pub fn to_result(&self) -> CompatibilityResult {
        CompatibilityResult {
            score: self.score,
            matched_profile_id: self.profile.id.clone(),
            source: Some(self.source),
        }
    }
}

/// Blind-match orchestrator
///
/// Scores every candidate against the user through the [`FallbackPolicy`]
/// and keeps the best one. Selection is deterministic for a given set of
/// scores:
/// 1. Candidates are scored concurrently, then folded in the order given.
/// 2. A candidate replaces the current best only with a strictly greater
///    score, so ties go to the first one seen.
/// 3. The running maximum starts at zero, so a pool where nobody scores
///    above zero yields no match.
#[derive(Debug, Clone)]
pub struct BlindMatcher {
    policy: FallbackPolicy,
}

impl BlindMatcher {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }

    pub fn local_only() -> Self {
        Self {
            policy: FallbackPolicy::local_only(),
        }
    }

    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    /// Pick the most compatible candidate for `user`.
    ///
    /// Returns `None` when `candidates` is empty or no candidate scores
    /// above zero. External scoring failures are absorbed per candidate by
    /// the fallback policy.
    pub async fn select_best_match<'a>(
        &self,
        user: &NormalizedProfile,
        candidates: &'a [NormalizedProfile],
    ) -> Option<BestMatch<'a>> {
        // join_all keeps input order, which the tie-break relies on
        let scores = join_all(
            candidates
                .iter()
                .map(|candidate| self.policy.score(user, candidate)),
        )
        .await;

        let mut best: Option<BestMatch<'a>> = None;
        let mut best_score = 0.0;

        for (index, (candidate, scored)) in candidates.iter().zip(scores).enumerate() {
            tracing::debug!(
                "Candidate {} ({:?}) scored {:.2} via {:?}",
                index,
                candidate.id,
                scored.score,
                scored.source
            );

            if scored.score > best_score {
                best_score = scored.score;
                best = Some(BestMatch {
                    index,
                    profile: candidate,
                    score: scored.score,
                    source: scored.source,
                });
            }
        }

        best
    }

    /// Synchronous selection using only the local aggregator.
    pub fn select_best_local<'a>(
        &self,
        user: &NormalizedProfile,
        candidates: &'a [NormalizedProfile],
    ) -> Option<BestMatch<'a>> {
        select_by_score(candidates, |candidate| self.policy.local_score(user, candidate))
    }

    /// Rank candidates by local score, best first.
    ///
    /// Equal scores keep their input order. At most `limit` entries are
    /// returned.
    pub fn rank_candidates(
        &self,
        user: &NormalizedProfile,
        candidates: &[NormalizedProfile],
        limit: usize,
    ) -> Vec<RankedCandidate> {
        let mut ranked: Vec<RankedCandidate> = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| RankedCandidate {
                index,
                profile_id: candidate.id.clone(),
                score: compatibility_score(user, candidate),
                shared_hobbies: shared_hobbies(user, candidate),
            })
            .collect();

        // sort_by is stable, ties stay in input order
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        ranked.truncate(limit);
        ranked
    }
}

impl Default for BlindMatcher {
    fn default() -> Self {
        Self::local_only()
    }
}

/// Running maximum with first-seen tie-breaking over precomputed scores.
pub fn select_by_score<'a, F>(
    candidates: &'a [NormalizedProfile],
    mut score: F,
) -> Option<BestMatch<'a>>
where
    F: FnMut(&NormalizedProfile) -> f64,
{
    let mut best: Option<BestMatch<'a>> = None;
    let mut best_score = 0.0;

    for (index, candidate) in candidates.iter().enumerate() {
        let value = score(candidate);
        if value > best_score {
            best_score = value;
            best = Some(BestMatch {
                index,
                profile: candidate,
                score: value,
                source: ScoreSource::Local,
            });
        }
    }

    best
}

fn shared_hobbies(a: &NormalizedProfile, b: &NormalizedProfile) -> Vec<String> {
    match (&a.hobbies, &b.hobbies) {
        (Ok(left), Ok(right)) => left.intersection(right).cloned().collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fallback::{CompatibilityScorer, ScoringError};
    use crate::core::normalizer::normalize;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// Returns a preset score per candidate id.
    struct TableScorer(HashMap<String, f64>);

    #[async_trait]
    impl CompatibilityScorer for TableScorer {
        fn name(&self) -> &'static str {
            "table"
        }

        async fn score(
            &self,
            _a: &NormalizedProfile,
            b: &NormalizedProfile,
        ) -> Result<f64, ScoringError> {
            b.id.as_ref()
                .and_then(|id| self.0.get(id).copied())
                .ok_or_else(|| ScoringError::Unavailable("no score".to_string()))
        }
    }

    fn create_candidate(id: &str, age: u32, hobbies: &[&str]) -> NormalizedProfile {
        normalize(&json!({
            "id": id,
            "age": age,
            "height": 170,
            "seriousness": 6,
            "hobbies": hobbies,
        }))
    }

    fn create_user() -> NormalizedProfile {
        create_candidate("user", 30, &["chess", "hiking"])
    }

    fn table_matcher(scores: &[(&str, f64)]) -> BlindMatcher {
        let table = scores.iter().map(|(id, s)| (id.to_string(), *s)).collect();
        BlindMatcher::new(FallbackPolicy::with_external(Arc::new(TableScorer(table))))
    }

    #[tokio::test]
    async fn test_empty_pool_has_no_match() {
        let matcher = BlindMatcher::local_only();
        let user = create_user();

        assert!(matcher.select_best_match(&user, &[]).await.is_none());
        assert!(matcher.select_best_local(&user, &[]).is_none());
    }

    #[tokio::test]
    async fn test_first_seen_wins_ties() {
        let matcher = table_matcher(&[("a", 40.0), ("b", 90.0), ("c", 90.0), ("d", 20.0)]);
        let user = create_user();
        let candidates = vec![
            create_candidate("a", 30, &[]),
            create_candidate("b", 30, &[]),
            create_candidate("c", 30, &[]),
            create_candidate("d", 30, &[]),
        ];

        let best = matcher.select_best_match(&user, &candidates).await.unwrap();

        assert_eq!(best.index, 1);
        assert_eq!(best.profile.id.as_deref(), Some("b"));
        assert_eq!(best.score, 90.0);
        assert_eq!(best.source, ScoreSource::External);
    }

    #[tokio::test]
    async fn test_fallback_is_per_candidate() {
        // "b" has no external score and falls back to the local aggregator
        let matcher = table_matcher(&[("a", 10.0)]);
        let user = create_user();
        let candidates = vec![
            create_candidate("a", 30, &[]),
            create_candidate("b", 30, &["chess", "hiking"]),
        ];

        let best = matcher.select_best_match(&user, &candidates).await.unwrap();

        assert_eq!(best.index, 1);
        assert_eq!(best.source, ScoreSource::Local);
        assert_eq!(best.score, compatibility_score(&user, &candidates[1]));
    }

    #[tokio::test]
    async fn test_no_positive_score_has_no_match() {
        let matcher = table_matcher(&[("a", 0.0), ("b", 0.0)]);
        let user = create_user();
        let candidates = vec![create_candidate("a", 30, &[]), create_candidate("b", 30, &[])];

        assert!(matcher.select_best_match(&user, &candidates).await.is_none());
        assert!(select_by_score(&candidates, |_| 0.0).is_none());
    }

    /// Never answers within any reasonable timeout.
    struct HangingScorer;

    #[async_trait]
    impl CompatibilityScorer for HangingScorer {
        fn name(&self) -> &'static str {
            "hanging"
        }

        async fn score(
            &self,
            _a: &NormalizedProfile,
            _b: &NormalizedProfile,
        ) -> Result<f64, ScoringError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(100.0)
        }
    }

    #[tokio::test]
    async fn test_candidates_time_out_together() {
        let timeout = Duration::from_millis(200);
        let matcher = BlindMatcher::new(FallbackPolicy::new(Some(Arc::new(HangingScorer)), timeout));
        let user = create_user();
        let candidates: Vec<NormalizedProfile> = (0..10)
            .map(|i| create_candidate(&i.to_string(), 30 + i, &[]))
            .collect();

        let started = Instant::now();
        let best = matcher.select_best_match(&user, &candidates).await.unwrap();

        // sequential scoring would need ten timeouts
        assert!(started.elapsed() < timeout * 4);
        assert_eq!(best.index, 0);
        assert_eq!(best.source, ScoreSource::Local);
    }

    #[test]
    fn test_select_best_local() {
        let matcher = BlindMatcher::local_only();
        let user = create_user();
        let candidates = vec![
            create_candidate("far", 55, &[]),
            create_candidate("close", 31, &["chess"]),
            create_candidate("closest", 30, &["chess", "hiking"]),
        ];

        let best = matcher.select_best_local(&user, &candidates).unwrap();

        assert_eq!(best.profile.id.as_deref(), Some("closest"));
        assert_eq!(best.source, ScoreSource::Local);
    }

    #[test]
    fn test_select_by_score_ties() {
        let candidates: Vec<NormalizedProfile> =
            (0..4).map(|i| create_candidate(&i.to_string(), 30, &[])).collect();
        let scores = [40.0, 90.0, 90.0, 20.0];
        let mut calls = 0;

        let best = select_by_score(&candidates, |_| {
            let s = scores[calls];
            calls += 1;
            s
        })
        .unwrap();

        assert_eq!(best.index, 1);
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_rank_candidates_sorted_and_limited() {
        let matcher = BlindMatcher::local_only();
        let user = create_user();
        let candidates = vec![
            create_candidate("far", 55, &[]),
            create_candidate("twin-1", 30, &["chess", "hiking"]),
            create_candidate("close", 31, &["chess"]),
            create_candidate("twin-2", 30, &["chess", "hiking"]),
        ];

        let ranked = matcher.rank_candidates(&user, &candidates, 3);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].profile_id.as_deref(), Some("twin-1"));
        assert_eq!(ranked[1].profile_id.as_deref(), Some("twin-2"));
        assert_eq!(ranked[2].profile_id.as_deref(), Some("close"));
        assert_eq!(ranked[0].shared_hobbies, vec!["chess", "hiking"]);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
