use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::{
    error::DecodeError,
    models::{Recommendation, RecommendationEnvelope},
};

const TITLES_KEY: &str = "titles";
const SKIPPED_KEY: &str = "skipped";
const OWNED_KEY: &str = "titles_owned";

/// Decodes a raw response body into candidate recommendations
///
/// The envelope is strict: the body must be a JSON object whose `titles` is an
/// array of objects and whose `skipped` and `titles_owned` are arrays of strings.
/// Entries of `titles` are lenient: any object that fails
/// [`Recommendation::try_decode`] is dropped without affecting its siblings.
pub fn decode_envelope(raw: &[u8]) -> Result<RecommendationEnvelope, DecodeError> {
    let value: Value = serde_json::from_slice(raw)?;

    let object = value.as_object().ok_or_else(|| {
        DecodeError::InvalidEnvelope("top-level value is not an object".to_string())
    })?;

    let titles = object
        .get(TITLES_KEY)
        .and_then(Value::as_array)
        .filter(|entries| entries.iter().all(Value::is_object))
        .ok_or_else(|| invalid_key(TITLES_KEY, "an array of objects"))?;
    let skipped = string_set(object, SKIPPED_KEY)?;
    let owned = string_set(object, OWNED_KEY)?;

    let items: Vec<Recommendation> = titles
        .iter()
        .filter_map(Recommendation::try_decode)
        .collect();

    let dropped = titles.len() - items.len();
    if dropped > 0 {
        tracing::debug!(
            dropped = dropped,
            kept = items.len(),
            "Dropped undecodable recommendation entries"
        );
    }

    Ok(RecommendationEnvelope {
        items,
        skipped,
        owned,
    })
}

fn string_set(object: &Map<String, Value>, key: &str) -> Result<HashSet<String>, DecodeError> {
    let entries = object
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| invalid_key(key, "an array of strings"))?;

    entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid_key(key, "an array of strings"))
        })
        .collect()
}

fn invalid_key(key: &str, expected: &str) -> DecodeError {
    DecodeError::InvalidEnvelope(format!("`{}` must be present and {}", key, expected))
}
