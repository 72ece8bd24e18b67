//! Typed view of a text-analysis response.
//!
//! Every field is optional on the wire. Missing pieces deserialize to their
//! empty value (no sentiment, no phrases, no entities) so partial provider
//! output can still be fed to the emotion inferer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Overall document sentiment as labelled by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

impl Default for SentimentLabel {
    fn default() -> Self {
        SentimentLabel::Neutral
    }
}

impl SentimentLabel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Some(SentimentLabel::Positive),
            "neutral" => Some(SentimentLabel::Neutral),
            "negative" => Some(SentimentLabel::Negative),
            "mixed" => Some(SentimentLabel::Mixed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Mixed => "mixed",
        }
    }
}

/// Probability-like triple, each in [0, 1], summing to roughly 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SentimentScores {
    #[schema(example = 0.9)]
    pub positive: f64,
    #[schema(example = 0.05)]
    pub neutral: f64,
    #[schema(example = 0.05)]
    pub negative: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub scores: SentimentScores,
}

impl Sentiment {
    /// What a failed sentiment call degrades to: fully neutral.
    pub fn fallback() -> Self {
        Sentiment {
            label: SentimentLabel::Neutral,
            scores: SentimentScores {
                positive: 0.0,
                neutral: 1.0,
                negative: 0.0,
            },
        }
    }
}

/// Named span recognised by the provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Entity {
    #[schema(example = "Seattle")]
    pub text: String,
    #[schema(example = "Location")]
    pub category: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DetectedLanguage {
    #[schema(example = "English")]
    pub name: String,
    #[schema(example = "en")]
    pub code: String,
    pub confidence: f64,
}

impl Default for DetectedLanguage {
    fn default() -> Self {
        DetectedLanguage {
            name: "English".to_string(),
            code: "en".to_string(),
            confidence: 0.0,
        }
    }
}

/// Privacy-sensitive span (email, phone number, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PiiEntity {
    pub text: String,
    #[schema(example = "Email")]
    pub category: String,
}

/// Everything the provider told us about one piece of text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AnalysisResult {
    pub sentiment: Option<Sentiment>,
    #[serde(alias = "keyPhrases")]
    pub key_phrases: Vec<String>,
    pub entities: Vec<Entity>,
    pub language: Option<DetectedLanguage>,
    #[serde(alias = "piiEntities")]
    pub pii_entities: Vec<PiiEntity>,
}

impl AnalysisResult {
    /// Build a result from loosely-shaped JSON.
    ///
    /// Returns `None` when `value` is not an object. Inside an object, items
    /// of the wrong shape are skipped rather than failing the whole record:
    /// non-string key phrases, entities without text, non-numeric scores.
    /// Entities may be objects (`{text, category, confidence}`) or
    /// positional arrays (`[text, category, confidence]`).
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;

        let key_phrases = array_field(map, "key_phrases", "keyPhrases")
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let entities = map
            .get("entities")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(lenient_entity).collect())
            .unwrap_or_default();

        let pii_entities = array_field(map, "pii_entities", "piiEntities")
            .map(|items| items.iter().filter_map(lenient_pii).collect())
            .unwrap_or_default();

        Some(AnalysisResult {
            sentiment: map.get("sentiment").and_then(lenient_sentiment),
            key_phrases,
            entities,
            language: map.get("language").and_then(lenient_language),
            pii_entities,
        })
    }
}

/// First of `name` / `alias` that holds an array. A null or mistyped field
/// does not hide a usable alias.
fn array_field<'a>(map: &'a Map<String, Value>, name: &str, alias: &str) -> Option<&'a Vec<Value>> {
    map.get(name)
        .and_then(Value::as_array)
        .or_else(|| map.get(alias).and_then(Value::as_array))
}

fn number(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(0.0)
}

fn text(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn lenient_sentiment(value: &Value) -> Option<Sentiment> {
    let map = value.as_object()?;
    let label = map
        .get("label")
        .and_then(Value::as_str)
        .and_then(SentimentLabel::parse)
        .unwrap_or_default();
    let scores = match map.get("scores").and_then(Value::as_object) {
        Some(scores) => SentimentScores {
            positive: number(scores.get("positive")),
            neutral: number(scores.get("neutral")),
            negative: number(scores.get("negative")),
        },
        None => SentimentScores::default(),
    };
    Some(Sentiment { label, scores })
}

fn lenient_entity(value: &Value) -> Option<Entity> {
    match value {
        Value::Object(map) => Some(Entity {
            text: map.get("text")?.as_str()?.to_string(),
            category: text(map.get("category")),
            confidence: number(
                map.get("confidence")
                    .or_else(|| map.get("confidence_score"))
                    .or_else(|| map.get("confidenceScore")),
            ),
        }),
        Value::Array(items) => Some(Entity {
            text: items.first()?.as_str()?.to_string(),
            category: text(items.get(1)),
            confidence: number(items.get(2)),
        }),
        _ => None,
    }
}

fn lenient_pii(value: &Value) -> Option<PiiEntity> {
    match value {
        Value::Object(map) => Some(PiiEntity {
            text: map.get("text")?.as_str()?.to_string(),
            category: text(map.get("category")),
        }),
        Value::Array(items) => Some(PiiEntity {
            text: items.first()?.as_str()?.to_string(),
            category: text(items.get(1)),
        }),
        _ => None,
    }
}

fn lenient_language(value: &Value) -> Option<DetectedLanguage> {
    let map = value.as_object()?;
    Some(DetectedLanguage {
        name: text(map.get("name")),
        code: text(map.get("code")),
        confidence: number(map.get("confidence")),
    })
}
