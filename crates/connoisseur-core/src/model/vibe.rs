//! Vibe payloads produced by the image caption service.
//!
//! The caption service has emitted three shapes over time: a flat object
//! keyed by dimension name, a list of `{"aspect", "value"}` entries, and a
//! full reading with a vibe plus a short visual summary. All of them resolve
//! to a [`FeatureVector`] through the feature schema.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::vector::FeatureVector;

/// Short visual description that accompanies a vibe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibeSummary {
    /// At most a few words, always lower case.
    #[serde(deserialize_with = "lowercase")]
    pub text: String,
    /// Hex colour, e.g. `#0000ff`.
    pub color: String,
    pub emoji: String,
}

impl VibeSummary {
    #[must_use]
    pub fn new(text: impl Into<String>, color: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            text: text.into().to_lowercase(),
            color: color.into(),
            emoji: emoji.into(),
        }
    }
}

fn lowercase<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    String::deserialize(deserializer).map(|text| text.to_lowercase())
}

/// A complete caption-service reading: feature targets plus summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibeReading {
    pub vibe: FeatureVector,
    pub summary: VibeSummary,
}

#[derive(Debug, Deserialize)]
struct Aspect {
    aspect: String,
    value: f64,
}

/// Parse any supported vibe payload into a feature vector.
///
/// # Errors
///
/// Returns [`Error::MissingDimension`] or [`Error::UnknownDimension`] when the
/// payload does not match the schema, and [`Error::InvalidData`] when the
/// JSON has none of the supported shapes.
pub fn parse_vibe(value: Value) -> Result<FeatureVector> {
    match value {
        Value::Array(_) => {
            let aspects: Vec<Aspect> = serde_json::from_value(value)?;
            FeatureVector::from_named(aspects.into_iter().map(|a| (a.aspect, a.value)))
        }
        Value::Object(mut map) => match map.remove("vibe") {
            Some(vibe) => parse_vibe(vibe),
            None => {
                let mut pairs = Vec::with_capacity(map.len());
                for (name, value) in map {
                    let number = value.as_f64().ok_or_else(|| {
                        Error::InvalidData(format!("value for {} is not a number", name))
                    })?;
                    pairs.push((name, number));
                }
                FeatureVector::from_named(pairs)
            }
        },
        other => Err(Error::InvalidData(format!(
            "unsupported vibe payload: {}",
            other
        ))),
    }
}

/// Parse a vibe payload from JSON text.
pub fn parse_vibe_str(json: &str) -> Result<FeatureVector> {
    parse_vibe(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::vector::Dimension;
    use serde_json::json;

    fn expected() -> FeatureVector {
        FeatureVector::new([0.2, 0.15, 0.05, 0.85, 0.6, 0.3, 60.0]).unwrap()
    }

    #[test]
    fn test_parse_flat_object() {
        let value = json!({
            "danceability": 0.2, "energy": 0.15, "speechiness": 0.05,
            "acousticness": 0.85, "instrumentalness": 0.6, "valence": 0.3,
            "tempo": 60.0
        });
        assert_eq!(parse_vibe(value).unwrap(), expected());
    }

    #[test]
    fn test_parse_aspect_list() {
        let value = json!([
            {"aspect": "danceability", "value": 0.2},
            {"aspect": "energy", "value": 0.15},
            {"aspect": "speechiness", "value": 0.05},
            {"aspect": "acousticness", "value": 0.85},
            {"aspect": "instrumentalness", "value": 0.6},
            {"aspect": "valence", "value": 0.3},
            {"aspect": "tempo", "value": 60.0}
        ]);
        assert_eq!(parse_vibe(value).unwrap(), expected());
    }

    #[test]
    fn test_parse_full_reading() {
        let value = json!({
            "vibe": {
                "danceability": 0.2, "energy": 0.15, "speechiness": 0.05,
                "acousticness": 0.85, "instrumentalness": 0.6, "valence": 0.3,
                "tempo": 60.0
            },
            "summary": {"text": "Blue Plastic Dusk", "color": "#0000FF", "emoji": "🌆"}
        });
        assert_eq!(parse_vibe(value.clone()).unwrap(), expected());

        let reading: VibeReading = serde_json::from_value(value).unwrap();
        assert_eq!(reading.summary.text, "blue plastic dusk");
    }

    #[test]
    fn test_aspect_list_without_tempo_is_rejected() {
        // Older caption prompts omitted tempo entirely.
        let value = json!([
            {"aspect": "danceability", "value": 0.6},
            {"aspect": "energy", "value": 0.7},
            {"aspect": "speechiness", "value": 0.1},
            {"aspect": "acousticness", "value": 0.3},
            {"aspect": "instrumentalness", "value": 0.2},
            {"aspect": "valence", "value": 0.6}
        ]);
        assert!(matches!(
            parse_vibe(value),
            Err(Error::MissingDimension {
                dimension: Dimension::Tempo
            })
        ));
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        let value = json!({"danceability": "high"});
        assert!(matches!(parse_vibe(value), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_scalar_payload_is_rejected() {
        assert!(matches!(parse_vibe_str("42"), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_summary_new_lowercases() {
        let summary = VibeSummary::new("Humid Velvet Glow", "#aa00cc", "🌙");
        assert_eq!(summary.text, "humid velvet glow");
    }
}
