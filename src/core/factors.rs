use crate::core::catalog::Catalog;
use crate::core::normalizer::{Attr, NormalizedProfile};
use crate::models::{Factor, FactorScore};

/// Score one factor for a pair of profiles.
pub fn score_factor(factor: Factor, a: &NormalizedProfile, b: &NormalizedProfile) -> FactorScore {
    let value = match factor {
        Factor::Age => age_score(a, b),
        Factor::Height => height_score(a, b),
        Factor::Hobbies => hobby_score(a, b),
        Factor::Education => education_score(a, b),
        Factor::Lifestyle => lifestyle_score(a, b),
        Factor::Seriousness => seriousness_score(a, b),
    };
    FactorScore::new(factor, value)
}

/// Age compatibility (max 20)
#[inline]
pub fn age_score(a: &NormalizedProfile, b: &NormalizedProfile) -> f64 {
    let Some(diff) = abs_diff(&a.age, &b.age) else {
        return 0.0;
    };

    match diff {
        0..=2 => 20.0,
        3..=5 => 15.0,
        6..=10 => 10.0,
        11..=15 => 5.0,
        _ => 0.0,
    }
}

/// Height compatibility (max 15)
#[inline]
pub fn height_score(a: &NormalizedProfile, b: &NormalizedProfile) -> f64 {
    let Some(diff) = abs_diff(&a.height_cm, &b.height_cm) else {
        return 0.0;
    };

    match diff {
        0..=5 => 15.0,
        6..=10 => 12.0,
        11..=15 => 8.0,
        16..=20 => 4.0,
        _ => 0.0,
    }
}

/// Jaccard overlap of the two hobby sets scaled to 25 points.
#[inline]
pub fn hobby_score(a: &NormalizedProfile, b: &NormalizedProfile) -> f64 {
    let (Ok(left), Ok(right)) = (&a.hobbies, &b.hobbies) else {
        return 0.0;
    };
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let common = left.intersection(right).count();
    let union = left.len() + right.len() - common;

    (common as f64 / union as f64) * Factor::Hobbies.max_points()
}

/// Education compatibility (max 10)
///
/// Levels are mapped to ordinals through the catalog; unrecognised levels
/// count as the middle of the scale.
#[inline]
pub fn education_score(a: &NormalizedProfile, b: &NormalizedProfile) -> f64 {
    let (Ok(left), Ok(right)) = (&a.education_level, &b.education_level) else {
        return 0.0;
    };

    let catalog = Catalog::global();
    let diff = catalog
        .education_ordinal_or_default(left)
        .abs_diff(catalog.education_ordinal_or_default(right));

    match diff {
        0 => 10.0,
        1 => 8.0,
        2 => 5.0,
        _ => 2.0,
    }
}

/// Lifestyle compatibility (max 15): five points each for matching smoking
/// habit, drinking habit and job category.
#[inline]
pub fn lifestyle_score(a: &NormalizedProfile, b: &NormalizedProfile) -> f64 {
    let mut score = 0.0;

    if both_equal(&a.smokes, &b.smokes) {
        score += 5.0;
    }
    if both_equal(&a.drinks, &b.drinks) {
        score += 5.0;
    }
    if both_equal(&a.job_category, &b.job_category) {
        score += 5.0;
    }

    score
}

/// Seriousness compatibility (max 15)
#[inline]
pub fn seriousness_score(a: &NormalizedProfile, b: &NormalizedProfile) -> f64 {
    let (Ok(left), Ok(right)) = (a.seriousness, b.seriousness) else {
        return 0.0;
    };

    match left.abs_diff(right) {
        0..=1 => 15.0,
        2 => 12.0,
        3 => 8.0,
        4 => 4.0,
        _ => 0.0,
    }
}

/// Absolute difference when both sides are available.
#[inline]
fn abs_diff(a: &Attr<u32>, b: &Attr<u32>) -> Option<u32> {
    match (a, b) {
        (Ok(x), Ok(y)) => Some(x.abs_diff(*y)),
        _ => None,
    }
}

#[inline]
fn both_equal<T: PartialEq>(a: &Attr<T>, b: &Attr<T>) -> bool {
    matches!((a, b), (Ok(x), Ok(y)) if x == y)
}
