// Service exports
pub mod background;
pub mod cache;
pub mod openrouter;

pub use background::{review_message, spawn_best_effort, ReviewError};
pub use cache::{CacheKey, CacheStats, CachedScorer, PairKey, ScoreCache};
pub use openrouter::{AiError, AiModels, OpenRouterClient};
