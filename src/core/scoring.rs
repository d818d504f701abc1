use crate::core::factors::score_factor;
use crate::core::normalizer::NormalizedProfile;
use crate::models::{Factor, FactorScore};

/// Sum of every factor's maximum points.
///
/// This is the fixed denominator: a factor whose attribute is unavailable
/// still counts here, so missing data lowers the percentage.
pub const TOTAL_MAX_POINTS: f64 = 100.0;

/// Score all six factors for a pair of profiles.
pub fn score_breakdown(a: &NormalizedProfile, b: &NormalizedProfile) -> [FactorScore; 6] {
    Factor::ALL.map(|factor| score_factor(factor, a, b))
}

/// Combine factor scores into a 0-100 percentage.
///
/// score = sum(value) / TOTAL_MAX_POINTS * 100
#[inline]
pub fn aggregate(factors: &[FactorScore]) -> f64 {
    let raw: f64 = factors.iter().map(|f| f.value).sum();
    if TOTAL_MAX_POINTS <= 0.0 {
        return 0.0;
    }

    ((raw / TOTAL_MAX_POINTS) * 100.0).clamp(0.0, 100.0)
}

/// Local compatibility score (0-100) between two profiles.
pub fn compatibility_score(a: &NormalizedProfile, b: &NormalizedProfile) -> f64 {
    aggregate(&score_breakdown(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalizer::{normalize, Unavailable};
    use serde_json::json;

    fn create_test_profile(age: u32, height: u32, seriousness: u8) -> NormalizedProfile {
        normalize(&json!({
            "age": age,
            "height": height,
            "seriousness": seriousness,
            "smokes": false,
            "drinks": true,
            "job_category": "Tech",
            "education": "Bachelor",
            "hobbies": ["music", "guitar"]
        }))
    }

    #[test]
    fn test_denominator_matches_factor_points() {
        let total: f64 = Factor::ALL.iter().map(|f| f.max_points()).sum();
        assert_eq!(total, TOTAL_MAX_POINTS);
    }

    #[test]
    fn test_identical_profiles_score_full_marks() {
        let profile = create_test_profile(28, 180, 7);

        let breakdown = score_breakdown(&profile, &profile);

        for factor in &breakdown {
            assert_eq!(factor.value, factor.max, "{:?}", factor.factor);
        }
        assert_eq!(compatibility_score(&profile, &profile), 100.0);
    }

    #[test]
    fn test_breakdown_order_follows_factor_list() {
        let profile = create_test_profile(28, 180, 7);
        let breakdown = score_breakdown(&profile, &profile);

        let factors: Vec<Factor> = breakdown.iter().map(|f| f.factor).collect();
        assert_eq!(factors, Factor::ALL.to_vec());
    }

    #[test]
    fn test_unavailable_profile_scores_zero() {
        let profile = create_test_profile(28, 180, 7);
        let empty = NormalizedProfile::unavailable(Unavailable::Missing);

        assert_eq!(compatibility_score(&profile, &empty), 0.0);
        assert_eq!(aggregate(&[]), 0.0);
    }

    #[test]
    fn test_missing_factor_keeps_denominator() {
        let full = create_test_profile(28, 180, 7);
        let mut partial = full.clone();
        partial.hobbies = Err(Unavailable::Missing);

        // hobby points are lost, not redistributed
        assert_eq!(compatibility_score(&full, &partial), 75.0);
    }
}
