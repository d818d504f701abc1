use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Dating-relevant snapshot of a user, as supplied by the caller.
///
/// Handlers usually receive profiles as loose JSON and run them through the
/// normalizer instead; this typed form is for callers that already hold
/// well-formed data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<String>,
    pub age: u32,
    #[serde(rename = "heightCm")]
    pub height_cm: u32,
    #[serde(rename = "weightKg", default)]
    pub weight_kg: u32,
    pub seriousness: u8,
    #[serde(default)]
    pub smokes: bool,
    #[serde(default)]
    pub drinks: bool,
    #[serde(rename = "jobCategory", default)]
    pub job_category: String,
    #[serde(rename = "educationLevel", default)]
    pub education_level: String,
    #[serde(default)]
    pub hobbies: BTreeSet<String>,
    #[serde(rename = "hobbyCategories", default)]
    pub hobby_categories: BTreeSet<String>,
}

/// One independently scored compatibility dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Factor {
    Age,
    Height,
    Hobbies,
    Education,
    Lifestyle,
    Seriousness,
}

impl Factor {
    pub const ALL: [Factor; 6] = [
        Factor::Age,
        Factor::Height,
        Factor::Hobbies,
        Factor::Education,
        Factor::Lifestyle,
        Factor::Seriousness,
    ];

    /// Points this factor contributes to the 100-point total.
    pub const fn max_points(self) -> f64 {
        match self {
            Factor::Age => 20.0,
            Factor::Height => 15.0,
            Factor::Hobbies => 25.0,
            Factor::Education => 10.0,
            Factor::Lifestyle => 15.0,
            Factor::Seriousness => 15.0,
        }
    }
}

/// Bounded contribution of a single factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub factor: Factor,
    pub value: f64,
    pub max: f64,
}

impl FactorScore {
    pub fn new(factor: Factor, value: f64) -> Self {
        Self {
            factor,
            value: value.clamp(0.0, factor.max_points()),
            max: factor.max_points(),
        }
    }
}

/// Which scorer produced a compatibility score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    External,
    Local,
}

/// Outcome of a blind-match selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityResult {
    pub score: f64,
    #[serde(rename = "matchedProfileId")]
    pub matched_profile_id: Option<String>,
    pub source: Option<ScoreSource>,
}

impl CompatibilityResult {
    /// Result for an empty candidate pool.
    pub fn no_match() -> Self {
        Self {
            score: 0.0,
            matched_profile_id: None,
            source: None,
        }
    }
}

/// Candidate with its local compatibility score, used for ranked feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub index: usize,
    #[serde(rename = "profileId")]
    pub profile_id: Option<String>,
    pub score: f64,
    #[serde(rename = "sharedHobbies")]
    pub shared_hobbies: Vec<String>,
}

/// Date idea produced by the generation service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateSuggestion {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub why_perfect: String,
}

/// Structured reading of a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationAnalysis {
    #[serde(default)]
    pub common_interests: Vec<String>,
    #[serde(default)]
    pub compatibility_topics: Vec<String>,
    #[serde(default)]
    pub potential_activities: Vec<String>,
    #[serde(default)]
    pub compatibility_score: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_points_sum_to_hundred() {
        let total: f64 = Factor::ALL.iter().map(|f| f.max_points()).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn test_factor_score_is_clamped() {
        let score = FactorScore::new(Factor::Age, 42.0);
        assert_eq!(score.value, 20.0);
        assert_eq!(score.max, 20.0);

        let negative = FactorScore::new(Factor::Hobbies, -1.0);
        assert_eq!(negative.value, 0.0);
    }

    #[test]
    fn test_profile_deserializes_camel_case() {
        let json = r#"{
            "id": "u1",
            "age": 30,
            "heightCm": 172,
            "seriousness": 6,
            "jobCategory": "Tech",
            "educationLevel": "Master",
            "hobbies": ["chess"]
        }"#;

        let profile: Profile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.id.as_deref(), Some("u1"));
        assert_eq!(profile.height_cm, 172);
        assert_eq!(profile.weight_kg, 0);
        assert!(!profile.smokes);
        assert!(profile.hobbies.contains("chess"));
    }
}
