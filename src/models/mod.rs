// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Profile, Factor, FactorScore, ScoreSource, CompatibilityResult, RankedCandidate, DateSuggestion, ConversationAnalysis};
pub use requests::{CompatibilityRequest, RankRequest, BlindSelectRequest, BlindMessageRequest, PairRequest, ChatAnalysisRequest, SafetyCheckRequest};
pub use responses::{CompatibilityResponse, RankResponse, BlindSelectResponse, BlindMessageResponse, SafetyCheckResponse, HealthResponse, ErrorResponse};
