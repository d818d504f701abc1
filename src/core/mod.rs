// Core algorithm exports
pub mod catalog;
pub mod factors;
pub mod fallback;
pub mod normalizer;
pub mod safety;
pub mod scoring;
pub mod selector;

pub use catalog::Catalog;
pub use fallback::{CompatibilityScorer, FallbackPolicy, LocalScorer, PolicyScore, ScoringError};
pub use normalizer::{normalize, Attr, NormalizedProfile, Unavailable};
pub use safety::is_safe;
pub use scoring::{aggregate, compatibility_score, score_breakdown, TOTAL_MAX_POINTS};
pub use selector::{select_by_score, BestMatch, BlindMatcher};
