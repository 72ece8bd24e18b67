//! Error types shared across the service.
//!
//! The inference core never returns errors; everything here belongs to the
//! collaborators around it (provider client, registries, configuration).

use crate::emotion::EmotionLabel;
use crate::recommend::RecommendationKind;

/// Failures while talking to the language service.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Nothing to analyse.
    #[error("no text provided for analysis")]
    EmptyText,

    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("language service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from the service.
    #[error("language service returned {status}: {message}")]
    Service { status: u16, message: String },

    /// The service accepted the request but rejected the document.
    #[error("language service rejected the document: {0}")]
    Document(String),

    /// The response body did not have the expected shape.
    #[error("unexpected language service response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Every analysis task failed, so there is nothing to infer from.
    #[error("every analysis task failed; last error: {0}")]
    Unavailable(Box<AnalysisError>),
}

/// Configuration could not be loaded from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Azure credentials not found in environment variables (AZURE_LANGUAGE_ENDPOINT, AZURE_LANGUAGE_KEY)")]
    MissingCredentials,

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Rejected keyword-table edits.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeywordError {
    #[error("neutral has no keyword set")]
    NeutralHasNoKeywords,

    #[error("keyword must not be empty")]
    EmptyKeyword,

    #[error("keyword {keyword:?} already registered for {emotion}")]
    DuplicateKeyword { emotion: EmotionLabel, keyword: String },
}

/// Rejected recommendation additions.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecommendationError {
    #[error("recommendation text must not be empty")]
    EmptyText,

    #[error("recommendation already present for {emotion}/{kind}")]
    Duplicate {
        emotion: EmotionLabel,
        kind: RecommendationKind,
    },
}

/// A label that is not part of the closed emotion set.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown emotion label: {0:?}")]
pub struct UnknownEmotion(pub String);

/// A recommendation type other than songs, quotes or activities.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown recommendation type: {0:?}")]
pub struct UnknownRecommendationKind(pub String);
