use serde::{Deserialize, Serialize};
use crate::models::domain::{CompatibilityResult, FactorScore, RankedCandidate};

/// Response for the pair compatibility endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityResponse {
    pub score: f64,
    pub factors: Vec<FactorScore>,
}

/// Response for the rank endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankResponse {
    pub matches: Vec<RankedCandidate>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Response for blind-match selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlindSelectResponse {
    #[serde(flatten)]
    pub result: CompatibilityResult,
    #[serde(rename = "candidateIndex")]
    pub candidate_index: Option<usize>,
}

/// Accepted blind-match message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlindMessageResponse {
    #[serde(rename = "messageId")]
    pub message_id: String,
    #[serde(rename = "matchId")]
    pub match_id: String,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "iceBreaker")]
    pub ice_breaker: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyCheckResponse {
    pub safe: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "aiEnabled")]
    pub ai_enabled: bool,
    #[serde(rename = "cachedScores")]
    pub cached_scores: Option<u64>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
