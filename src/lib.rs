//! Blind Match - compatibility scoring service for blind dating
//!
//! This library scores how well two dating profiles fit together and picks
//! the best blind match from a candidate pool. Scores come from a language
//! model when one is configured, with a deterministic local scorer as the
//! per-candidate fallback.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{normalize, compatibility_score, BlindMatcher, FallbackPolicy, NormalizedProfile};
pub use models::{CompatibilityResult, Factor, FactorScore, Profile, ScoreSource};
