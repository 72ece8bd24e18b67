//! Primary-emotion inference.
//!
//! Turns an [`AnalysisResult`] into one of seven emotion labels. Keyword hits
//! in the key phrases and entity texts take precedence; when nothing matches,
//! the sentiment scores decide between joy, sadness and neutral.
//!
//! Everything here is pure: no I/O, no logging, no shared mutable state. The
//! keyword table is injected as an `Arc` and only ever read.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::analysis::AnalysisResult;
use crate::error::UnknownEmotion;
use crate::keywords::KeywordTable;

/// Positive score above which an unmatched text counts as joy.
pub const JOY_POSITIVE_THRESHOLD: f64 = 0.7;
/// Negative score above which an unmatched text counts as sadness.
pub const SADNESS_NEGATIVE_THRESHOLD: f64 = 0.6;

/// The closed set of emotions the service can report.
///
/// Declaration order is the canonical order used for tie-breaking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
    Neutral,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 7] = [
        EmotionLabel::Joy,
        EmotionLabel::Sadness,
        EmotionLabel::Anger,
        EmotionLabel::Fear,
        EmotionLabel::Surprise,
        EmotionLabel::Disgust,
        EmotionLabel::Neutral,
    ];

    /// Emotions that carry a keyword set, in canonical order.
    pub const SCORED: [EmotionLabel; 6] = [
        EmotionLabel::Joy,
        EmotionLabel::Sadness,
        EmotionLabel::Anger,
        EmotionLabel::Fear,
        EmotionLabel::Surprise,
        EmotionLabel::Disgust,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Joy => "joy",
            EmotionLabel::Sadness => "sadness",
            EmotionLabel::Anger => "anger",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Surprise => "surprise",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Neutral => "neutral",
        }
    }

    pub fn is_scored(&self) -> bool {
        !matches!(self, EmotionLabel::Neutral)
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionLabel {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        EmotionLabel::ALL
            .into_iter()
            .find(|e| e.as_str() == wanted)
            .ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}

/// Keyword match count per scored emotion.
pub type Breakdown = BTreeMap<EmotionLabel, usize>;

/// Everything the inferer can say about one analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InferenceOutcome {
    pub emotion: EmotionLabel,
    #[schema(example = 0.9)]
    pub confidence: f64,
    #[schema(value_type = Object)]
    pub breakdown: Breakdown,
}

static DEFAULT_TABLE: Lazy<Arc<KeywordTable>> = Lazy::new(|| Arc::new(KeywordTable::default()));

/// Stateless emotion classifier over a fixed keyword table.
#[derive(Debug, Clone)]
pub struct EmotionInferer {
    table: Arc<KeywordTable>,
}

impl Default for EmotionInferer {
    fn default() -> Self {
        EmotionInferer {
            table: DEFAULT_TABLE.clone(),
        }
    }
}

impl EmotionInferer {
    pub fn new(table: Arc<KeywordTable>) -> Self {
        EmotionInferer { table }
    }

    /// Primary emotion for `result`. Absent input is neutral.
    pub fn infer(&self, result: Option<&AnalysisResult>) -> EmotionLabel {
        match result {
            Some(result) => pick(&self.score(result), result),
            None => EmotionLabel::Neutral,
        }
    }

    /// Sentiment-derived confidence for `emotion`, in [0, 1].
    ///
    /// This reads only the sentiment scores; it does not reflect how many
    /// keywords matched.
    pub fn confidence_for(&self, result: Option<&AnalysisResult>, emotion: EmotionLabel) -> f64 {
        let Some(scores) = result.and_then(|r| r.sentiment.as_ref()).map(|s| s.scores) else {
            return 0.0;
        };
        let value = match emotion {
            EmotionLabel::Joy => scores.positive,
            EmotionLabel::Sadness
            | EmotionLabel::Anger
            | EmotionLabel::Fear
            | EmotionLabel::Disgust => scores.negative,
            EmotionLabel::Surprise => scores.positive.max(scores.negative),
            EmotionLabel::Neutral => scores.neutral,
        };
        if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Keyword match counts for all six scored emotions.
    pub fn breakdown(&self, result: Option<&AnalysisResult>) -> Breakdown {
        result.map(|r| self.score(r)).unwrap_or_default()
    }

    /// `infer`, `confidence_for` and `breakdown` computed from one pass.
    pub fn analyze(&self, result: Option<&AnalysisResult>) -> InferenceOutcome {
        let breakdown = self.breakdown(result);
        let emotion = match result {
            Some(r) => pick(&breakdown, r),
            None => EmotionLabel::Neutral,
        };
        InferenceOutcome {
            emotion,
            confidence: self.confidence_for(result, emotion),
            breakdown,
        }
    }

    fn score(&self, result: &AnalysisResult) -> Breakdown {
        let blob = blob(result);
        EmotionLabel::SCORED
            .into_iter()
            .map(|emotion| {
                let hits = self
                    .table
                    .triggers(emotion)
                    .iter()
                    .filter(|trigger| blob.contains(trigger.as_str()))
                    .count();
                (emotion, hits)
            })
            .collect()
    }
}

/// Lowercased key phrases followed by entity texts, space separated.
pub fn blob(result: &AnalysisResult) -> String {
    result
        .key_phrases
        .iter()
        .map(String::as_str)
        .chain(result.entities.iter().map(|e| e.text.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn pick(scores: &Breakdown, result: &AnalysisResult) -> EmotionLabel {
    let mut best: Option<(EmotionLabel, usize)> = None;
    for emotion in EmotionLabel::SCORED {
        let hits = scores.get(&emotion).copied().unwrap_or(0);
        // strict `>` keeps the earliest emotion on ties
        if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
            best = Some((emotion, hits));
        }
    }
    if let Some((emotion, _)) = best {
        return emotion;
    }

    let scores = result.sentiment.map(|s| s.scores).unwrap_or_default();
    if scores.positive > JOY_POSITIVE_THRESHOLD {
        EmotionLabel::Joy
    } else if scores.negative > SADNESS_NEGATIVE_THRESHOLD {
        EmotionLabel::Sadness
    } else {
        EmotionLabel::Neutral
    }
}
