use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// A single recommended title, as persisted and shown to the display layer
///
/// Serialized field names match the on-disk cache format.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub title: String,
    pub tagline: String,
    pub rating: f64,
    #[serde(rename = "isReleased")]
    pub is_released: bool,
}

impl Recommendation {
    /// Builds a recommendation from one untrusted entry of the `titles` array
    ///
    /// Returns `None` unless the entry is an object carrying a numeric `rating`.
    /// Every other field falls back to its default when absent or mistyped.
    pub fn try_decode(raw: &Value) -> Option<Self> {
        let fields = raw.as_object()?;
        let rating = fields.get("rating")?.as_f64()?;

        let text = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default()
        };

        Some(Self {
            image_url: text("image"),
            title: text("title"),
            tagline: text("tagline"),
            rating,
            is_released: fields
                .get("is_released")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }
}

/// Decoded response body: candidate titles plus the exclusion lists shipped with them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationEnvelope {
    pub items: Vec<Recommendation>,
    pub skipped: HashSet<String>,
    pub owned: HashSet<String>,
}
