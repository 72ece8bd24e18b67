//! Emotion trigger words.
//!
//! [`KeywordTable`] is plain immutable configuration. [`KeywordRegistry`]
//! holds the table currently in use and lets callers extend it at runtime
//! without ever mutating a table someone else is reading: each edit builds a
//! new table and swaps the `Arc`.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use utoipa::ToSchema;

use crate::emotion::EmotionLabel;
use crate::error::KeywordError;

static DEFAULT_KEYWORDS: Lazy<KeywordTable> = Lazy::new(|| {
    KeywordTable::new([
        (
            EmotionLabel::Joy,
            vec!["happy", "excited", "wonderful", "amazing", "love", "great", "fantastic", "thrilled"],
        ),
        (
            EmotionLabel::Sadness,
            vec!["sad", "depressed", "down", "lonely", "hurt", "disappointed", "devastated"],
        ),
        (
            EmotionLabel::Anger,
            vec!["angry", "mad", "frustrated", "annoyed", "furious", "irritated", "outraged"],
        ),
        (
            EmotionLabel::Fear,
            vec!["scared", "afraid", "worried", "anxious", "nervous", "concerned", "terrified"],
        ),
        (
            EmotionLabel::Surprise,
            vec!["surprised", "shocked", "unexpected", "sudden", "amazed", "astonished"],
        ),
        (
            EmotionLabel::Disgust,
            vec!["disgusted", "sick", "awful", "terrible", "hate", "revolted"],
        ),
    ])
});

/// Lowercase trigger words per scored emotion. Neutral never has any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    entries: BTreeMap<EmotionLabel, Vec<String>>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        DEFAULT_KEYWORDS.clone()
    }
}

impl KeywordTable {
    /// Build a table from `(emotion, triggers)` pairs.
    ///
    /// Triggers are trimmed and lowercased; empty ones, duplicates and
    /// anything listed under neutral are dropped.
    pub fn new<I, W, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (EmotionLabel, W)>,
        W: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = KeywordTable {
            entries: BTreeMap::new(),
        };
        for (emotion, words) in entries {
            if !emotion.is_scored() {
                continue;
            }
            for word in words {
                let trigger = normalize(word.as_ref());
                if trigger.is_empty() {
                    continue;
                }
                let slot = table.entries.entry(emotion).or_default();
                if !slot.contains(&trigger) {
                    slot.push(trigger);
                }
            }
        }
        table
    }

    pub fn empty() -> Self {
        KeywordTable {
            entries: BTreeMap::new(),
        }
    }

    pub fn triggers(&self, emotion: EmotionLabel) -> &[String] {
        self.entries.get(&emotion).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, emotion: EmotionLabel, trigger: &str) -> bool {
        let trigger = normalize(trigger);
        self.triggers(emotion).iter().any(|t| *t == trigger)
    }

    /// Total number of triggers across all emotions.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of this table with one more trigger.
    pub fn with_keyword(&self, emotion: EmotionLabel, trigger: &str) -> Result<Self, KeywordError> {
        if !emotion.is_scored() {
            return Err(KeywordError::NeutralHasNoKeywords);
        }
        let trigger = normalize(trigger);
        if trigger.is_empty() {
            return Err(KeywordError::EmptyKeyword);
        }
        if self.triggers(emotion).contains(&trigger) {
            return Err(KeywordError::DuplicateKeyword {
                emotion,
                keyword: trigger,
            });
        }
        let mut next = self.clone();
        next.entries.entry(emotion).or_default().push(trigger);
        Ok(next)
    }

    pub fn info(&self) -> KeywordTableInfo {
        KeywordTableInfo {
            emotions: EmotionLabel::SCORED
                .into_iter()
                .map(|e| (e, self.triggers(e).to_vec()))
                .collect(),
            total: self.len(),
        }
    }
}

fn normalize(trigger: &str) -> String {
    trigger.trim().to_lowercase()
}

/// Serializable view of a keyword table for API responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KeywordTableInfo {
    #[schema(value_type = Object)]
    pub emotions: BTreeMap<EmotionLabel, Vec<String>>,
    #[schema(example = 41)]
    pub total: usize,
}

/// Copy-on-write holder of the active keyword table.
pub struct KeywordRegistry {
    base: Arc<KeywordTable>,
    current: RwLock<Arc<KeywordTable>>,
}

impl Default for KeywordRegistry {
    fn default() -> Self {
        KeywordRegistry::new(KeywordTable::default())
    }
}

impl KeywordRegistry {
    pub fn new(base: KeywordTable) -> Self {
        let base = Arc::new(base);
        Self {
            current: RwLock::new(base.clone()),
            base,
        }
    }

    /// The table in use right now. Later edits never show up in it.
    pub fn snapshot(&self) -> Arc<KeywordTable> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Register an extra trigger word for `emotion`.
    pub fn add_keyword(
        &self,
        emotion: EmotionLabel,
        trigger: &str,
    ) -> Result<KeywordTableInfo, KeywordError> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = current.with_keyword(emotion, trigger)?;
        tracing::info!(%emotion, trigger = %trigger.trim(), total = next.len(), "➕ Added keyword");
        let info = next.info();
        *current = Arc::new(next);
        Ok(info)
    }

    /// Drop every runtime addition.
    pub fn reset(&self) -> KeywordTableInfo {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = self.base.clone();
        tracing::info!(total = self.base.len(), "Keyword table reset");
        self.base.info()
    }

    pub fn list(&self) -> KeywordTableInfo {
        self.snapshot().info()
    }
}
