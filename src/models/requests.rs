use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Request to score one pair of profiles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityRequest {
    pub user: Value,
    pub candidate: Value,
}

/// Request to rank a candidate pool by local score
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankRequest {
    pub user: Value,
    #[validate(length(min = 1))]
    pub candidates: Vec<Value>,
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request to pick a blind match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlindSelectRequest {
    pub user: Value,
    #[serde(default)]
    pub candidates: Vec<Value>,
}

/// Message sent inside a blind match
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BlindMessageRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "match_id", rename = "matchId")]
    pub match_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    /// Sender profile, used for the ice-breaker suggestion
    #[serde(default)]
    pub user: Option<Value>,
    #[serde(default)]
    pub partner: Option<Value>,
}

/// Two profiles for a generation request (date suggestion, ice-breaker)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairRequest {
    pub user: Value,
    pub partner: Value,
}

/// Conversation to analyse
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatAnalysisRequest {
    #[validate(length(min = 1))]
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SafetyCheckRequest {
    #[validate(length(max = 10000))]
    pub text: String,
}
