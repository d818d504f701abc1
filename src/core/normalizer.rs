//! Coerces loosely typed profile input into comparable attributes.
//!
//! Profiles arrive as arbitrary JSON: numbers as strings, hobby lists stored
//! as JSON-encoded text, keys in either snake or camel case. Every attribute
//! is extracted on its own; a field that is absent or cannot be coerced is
//! reported as [`Unavailable`] and the remaining fields are still usable.

use crate::core::catalog::Catalog;
use crate::models::Profile;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use thiserror::Error;

/// Why an attribute cannot take part in scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Unavailable {
    #[error("attribute missing")]
    Missing,

    #[error("attribute malformed")]
    Malformed,
}

/// An extracted attribute, or the reason it is unusable.
pub type Attr<T> = Result<T, Unavailable>;

const ID_KEYS: &[&str] = &["id", "user_id", "userId"];
const AGE_KEYS: &[&str] = &["age"];
const HEIGHT_KEYS: &[&str] = &["height", "height_cm", "heightCm"];
const WEIGHT_KEYS: &[&str] = &["weight", "weight_kg", "weightKg"];
const SERIOUSNESS_KEYS: &[&str] = &["seriousness"];
const SMOKES_KEYS: &[&str] = &["smokes"];
const DRINKS_KEYS: &[&str] = &["drinks"];
const JOB_CATEGORY_KEYS: &[&str] = &["job_category", "jobCategory"];
const EDUCATION_KEYS: &[&str] = &["education", "education_level", "educationLevel"];
const HOBBY_KEYS: &[&str] = &["hobbies"];
const HOBBY_CATEGORY_KEYS: &[&str] = &["hobby_categories", "hobbyCategories"];

pub const MIN_SERIOUSNESS: u8 = 1;
pub const MAX_SERIOUSNESS: u8 = 10;

/// Profile with every attribute extracted independently.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedProfile {
    pub id: Option<String>,
    pub age: Attr<u32>,
    pub height_cm: Attr<u32>,
    pub weight_kg: Attr<u32>,
    pub seriousness: Attr<u8>,
    pub smokes: Attr<bool>,
    pub drinks: Attr<bool>,
    pub job_category: Attr<String>,
    pub education_level: Attr<String>,
    pub hobbies: Attr<BTreeSet<String>>,
    pub hobby_categories: Attr<BTreeSet<String>>,
}

impl NormalizedProfile {
    /// Profile where every attribute carries the same unavailability.
    pub fn unavailable(reason: Unavailable) -> Self {
        Self {
            id: None,
            age: Err(reason),
            height_cm: Err(reason),
            weight_kg: Err(reason),
            seriousness: Err(reason),
            smokes: Err(reason),
            drinks: Err(reason),
            job_category: Err(reason),
            education_level: Err(reason),
            hobbies: Err(reason),
            hobby_categories: Err(reason),
        }
    }

    /// Number of attributes that can take part in scoring.
    pub fn available_count(&self) -> usize {
        [
            self.age.is_ok(),
            self.height_cm.is_ok(),
            self.weight_kg.is_ok(),
            self.seriousness.is_ok(),
            self.smokes.is_ok(),
            self.drinks.is_ok(),
            self.job_category.is_ok(),
            self.education_level.is_ok(),
            self.hobbies.is_ok(),
            self.hobby_categories.is_ok(),
        ]
        .iter()
        .filter(|ok| **ok)
        .count()
    }

    /// JSON object holding only the available attributes.
    ///
    /// Used when a profile has to be described to the language model.
    pub fn to_prompt_value(&self) -> Value {
        let mut map = Map::new();
        if let Ok(age) = self.age {
            map.insert("age".into(), age.into());
        }
        if let Ok(height) = self.height_cm {
            map.insert("height_cm".into(), height.into());
        }
        if let Ok(weight) = self.weight_kg {
            map.insert("weight_kg".into(), weight.into());
        }
        if let Ok(seriousness) = self.seriousness {
            map.insert("seriousness".into(), seriousness.into());
        }
        if let Ok(smokes) = self.smokes {
            map.insert("smokes".into(), smokes.into());
        }
        if let Ok(drinks) = self.drinks {
            map.insert("drinks".into(), drinks.into());
        }
        if let Ok(job) = &self.job_category {
            map.insert("job_category".into(), job.clone().into());
        }
        if let Ok(education) = &self.education_level {
            map.insert("education".into(), education.clone().into());
        }
        if let Ok(hobbies) = &self.hobbies {
            map.insert("hobbies".into(), hobbies.iter().cloned().collect::<Vec<_>>().into());
        }
        if let Ok(categories) = &self.hobby_categories {
            map.insert(
                "hobby_categories".into(),
                categories.iter().cloned().collect::<Vec<_>>().into(),
            );
        }
        Value::Object(map)
    }
}

impl From<&Profile> for NormalizedProfile {
    fn from(profile: &Profile) -> Self {
        let hobbies = normalize_items(profile.hobbies.iter().map(String::as_str));
        let hobby_categories = if profile.hobby_categories.is_empty() {
            Catalog::global().hobby_categories_for(&hobbies)
        } else {
            normalize_items(profile.hobby_categories.iter().map(String::as_str))
        };

        Self {
            id: profile.id.clone(),
            age: Ok(profile.age),
            height_cm: Ok(profile.height_cm),
            weight_kg: Ok(profile.weight_kg),
            seriousness: seriousness_in_range(u64::from(profile.seriousness)),
            smokes: Ok(profile.smokes),
            drinks: Ok(profile.drinks),
            job_category: non_empty(&profile.job_category),
            education_level: non_empty(&profile.education_level),
            hobbies: Ok(hobbies),
            hobby_categories: Ok(hobby_categories),
        }
    }
}

/// Extract every attribute from a loosely typed profile.
///
/// Anything other than a JSON object yields a profile whose attributes are
/// all [`Unavailable::Malformed`].
pub fn normalize(raw: &Value) -> NormalizedProfile {
    let Some(object) = raw.as_object() else {
        tracing::debug!("Profile is not a JSON object; all attributes unavailable");
        return NormalizedProfile::unavailable(Unavailable::Malformed);
    };

    let hobbies = field(object, HOBBY_KEYS).and_then(as_string_set);
    let hobby_categories = match field(object, HOBBY_CATEGORY_KEYS) {
        Err(Unavailable::Missing) => match &hobbies {
            Ok(hobbies) => Ok(Catalog::global().hobby_categories_for(hobbies)),
            Err(reason) => Err(*reason),
        },
        other => other.and_then(as_string_set),
    };

    NormalizedProfile {
        id: field(object, ID_KEYS).ok().and_then(as_id),
        age: field(object, AGE_KEYS).and_then(as_u32),
        height_cm: field(object, HEIGHT_KEYS).and_then(as_u32),
        weight_kg: field(object, WEIGHT_KEYS).and_then(as_u32),
        seriousness: field(object, SERIOUSNESS_KEYS)
            .and_then(as_u64)
            .and_then(seriousness_in_range),
        smokes: field(object, SMOKES_KEYS).and_then(as_bool),
        drinks: field(object, DRINKS_KEYS).and_then(as_bool),
        job_category: field(object, JOB_CATEGORY_KEYS).and_then(as_text),
        education_level: field(object, EDUCATION_KEYS).and_then(as_text),
        hobbies,
        hobby_categories,
    }
}

/// First non-null value under any of the aliases.
fn field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Attr<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
        .ok_or(Unavailable::Missing)
}

fn as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_u64(value: &Value) -> Attr<u64> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Ok(v)
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
                    _ => Err(Unavailable::Malformed),
                }
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(Unavailable::Missing);
            }
            trimmed
                .parse::<u64>()
                .or_else(|_| match trimmed.parse::<f64>() {
                    Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
                    _ => Err(Unavailable::Malformed),
                })
        }
        _ => Err(Unavailable::Malformed),
    }
}

fn as_u32(value: &Value) -> Attr<u32> {
    as_u64(value).and_then(|v| u32::try_from(v).map_err(|_| Unavailable::Malformed))
}

fn seriousness_in_range(value: u64) -> Attr<u8> {
    match u8::try_from(value) {
        Ok(v) if (MIN_SERIOUSNESS..=MAX_SERIOUSNESS).contains(&v) => Ok(v),
        _ => Err(Unavailable::Malformed),
    }
}

fn as_bool(value: &Value) -> Attr<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(Unavailable::Malformed),
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "" => Err(Unavailable::Missing),
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(Unavailable::Malformed),
        },
        _ => Err(Unavailable::Malformed),
    }
}

fn as_text(value: &Value) -> Attr<String> {
    match value {
        Value::String(s) => non_empty(s),
        _ => Err(Unavailable::Malformed),
    }
}

fn non_empty(s: &str) -> Attr<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        Err(Unavailable::Missing)
    } else {
        Ok(trimmed.to_string())
    }
}

fn as_string_set(value: &Value) -> Attr<BTreeSet<String>> {
    match value {
        Value::Array(items) => Ok(normalize_items(items.iter().filter_map(Value::as_str))),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.starts_with('[') {
                // hobby lists are often persisted as JSON text
                let parsed: Vec<Value> =
                    serde_json::from_str(trimmed).map_err(|_| Unavailable::Malformed)?;
                Ok(normalize_items(parsed.iter().filter_map(Value::as_str)))
            } else {
                Ok(normalize_items(trimmed.split(',')))
            }
        }
        _ => Err(Unavailable::Malformed),
    }
}

fn normalize_items<'a, I>(items: I) -> BTreeSet<String>
where
    I: Iterator<Item = &'a str>,
{
    items
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}
