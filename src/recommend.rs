//! Mood-based recommendations.
//!
//! A fixed catalogue of songs, quotes and activities per emotion, plus an
//! append-only set of custom entries that can be registered at runtime.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use utoipa::ToSchema;

use crate::emotion::EmotionLabel;
use crate::error::{RecommendationError, UnknownRecommendationKind};

/// Emotions the "surprise me" pick draws from.
pub const RANDOM_POOL: [EmotionLabel; 6] = [
    EmotionLabel::Joy,
    EmotionLabel::Sadness,
    EmotionLabel::Anger,
    EmotionLabel::Fear,
    EmotionLabel::Surprise,
    EmotionLabel::Neutral,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Songs,
    Quotes,
    Activities,
}

impl Default for RecommendationKind {
    fn default() -> Self {
        RecommendationKind::Songs
    }
}

impl RecommendationKind {
    pub const ALL: [RecommendationKind; 3] = [
        RecommendationKind::Songs,
        RecommendationKind::Quotes,
        RecommendationKind::Activities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::Songs => "songs",
            RecommendationKind::Quotes => "quotes",
            RecommendationKind::Activities => "activities",
        }
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationKind {
    type Err = UnknownRecommendationKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        RecommendationKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| UnknownRecommendationKind(s.to_string()))
    }
}

type Catalogue = HashMap<(EmotionLabel, RecommendationKind), Vec<String>>;

static BUILTIN: Lazy<Arc<Catalogue>> = Lazy::new(|| {
    use EmotionLabel::*;
    use RecommendationKind::*;

    let rows: [(EmotionLabel, RecommendationKind, [&str; 3]); 21] = [
        (Joy, Songs, [
            "🎵 Feel Good Hits: https://open.spotify.com/playlist/37i9dQZF1DXdPec7aLTmlC",
            "🎵 Pop Rising: https://open.spotify.com/playlist/37i9dQZF1DX0XUsuxWHRQd",
            "🎵 Good Vibes: https://open.spotify.com/playlist/37i9dQZF1DX4VqfSk8VmCi",
        ]),
        (Joy, Quotes, [
            "The best time to plant a tree was 20 years ago. The second best time is now.",
            "Life is what happens to you while you're busy making other plans. - John Lennon",
            "The only way to do great work is to love what you do. - Steve Jobs",
        ]),
        (Joy, Activities, [
            "📞 Call a friend you haven't talked to in a while",
            "🌳 Take a walk in nature",
            "🎨 Try a creative hobby",
        ]),
        (Sadness, Songs, [
            "🎵 Healing Vibes: https://open.spotify.com/playlist/37i9dQZF1DX59NCqCqJtoH",
            "🎵 Comfort Zone: https://open.spotify.com/playlist/37i9dQZF1DWZUAeYvs88zc",
            "🎵 Gentle Acoustic: https://open.spotify.com/playlist/37i9dQZF1DX1s9knjP51Oa",
        ]),
        (Sadness, Quotes, [
            "This too shall pass.",
            "You are stronger than you think and more resilient than you know.",
            "Every storm runs out of rain. - Maya Angelou",
        ]),
        (Sadness, Activities, [
            "🛁 Take a warm bath or shower",
            "📝 Write in a journal",
            "🫖 Make your favorite warm drink",
        ]),
        (Anger, Songs, [
            "🎵 Workout Beats: https://open.spotify.com/playlist/37i9dQZF1DX76Wlfdnj7AP",
            "🎵 Rock Anthems: https://open.spotify.com/playlist/37i9dQZF1DX8FwnYE6PRvL",
            "🎵 Release Energy: https://open.spotify.com/playlist/37i9dQZF1DX32NsLKyzScr",
        ]),
        (Anger, Quotes, [
            "Anger is an acid that can do more harm to the vessel than to anything it pours upon.",
            "The best fighter is never angry. - Lao Tzu",
            "You will not be punished for your anger; you will be punished by your anger.",
        ]),
        (Anger, Activities, [
            "🏃 Go for a run or intense workout",
            "🥊 Try a boxing workout",
            "🧘 Practice deep breathing exercises",
        ]),
        (Fear, Songs, [
            "🎵 Calming Instrumentals: https://open.spotify.com/playlist/37i9dQZF1DX4sWSpwAYIy1",
            "🎵 Confidence Boosters: https://open.spotify.com/playlist/37i9dQZF1DX0BcQWzuB7ZO",
            "🎵 Empowerment: https://open.spotify.com/playlist/37i9dQZF1DX4fpCWaHOned",
        ]),
        (Fear, Quotes, [
            "Courage is not the absence of fear, but action despite it.",
            "The cave you fear to enter holds the treasure you seek.",
            "You are braver than you believe, stronger than you seem.",
        ]),
        (Fear, Activities, [
            "🧘 Practice mindfulness meditation",
            "📚 Read inspiring success stories",
            "💪 List your past achievements",
        ]),
        (Surprise, Songs, [
            "🎵 Discovery Playlist: https://open.spotify.com/playlist/37i9dQZF1DX0XUsuxWHRQd",
            "🎵 World Music: https://open.spotify.com/playlist/37i9dQZF1DX0Urj5lo8vTp",
            "🎵 Eclectic Mix: https://open.spotify.com/playlist/37i9dQZF1DWWQRwui0ExPn",
        ]),
        (Surprise, Quotes, [
            "Life is full of surprises, embrace them all.",
            "The unexpected is often the most beautiful part of life.",
            "Surprises are gifts from the universe.",
        ]),
        (Surprise, Activities, [
            "🎲 Try something completely new",
            "🌍 Explore a new place in your city",
            "🎨 Experiment with a new art form",
        ]),
        (Disgust, Songs, [
            "🎵 Cleansing Sounds: https://open.spotify.com/playlist/37i9dQZF1DX0Urj5lo8vTp",
            "🎵 Fresh Start: https://open.spotify.com/playlist/37i9dQZF1DX4VqfSk8VmCi",
            "🎵 Positive Vibes: https://open.spotify.com/playlist/37i9dQZF1DXdPec7aLTmlC",
        ]),
        (Disgust, Quotes, [
            "Sometimes you need to step back to see the beauty in chaos.",
            "Cleanliness is next to godliness.",
            "A fresh perspective can transform any situation.",
        ]),
        (Disgust, Activities, [
            "🧹 Organize and clean your space",
            "🚿 Take a refreshing shower",
            "🌿 Spend time in nature",
        ]),
        (Neutral, Songs, [
            "🎵 Ambient Chill: https://open.spotify.com/playlist/37i9dQZF1DWWQRwui0ExPn",
            "🎵 Lo-fi Study: https://open.spotify.com/playlist/37i9dQZF1DX0SM0LYsmbMT",
            "🎵 Background Instrumentals: https://open.spotify.com/playlist/37i9dQZF1DX4sWSpwAYIy1",
        ]),
        (Neutral, Quotes, [
            "In stillness, we find our center.",
            "Peace is not the absence of conflict, but the ability to cope with it.",
            "Sometimes the most profound thing you can do is nothing.",
        ]),
        (Neutral, Activities, [
            "📖 Read a book quietly",
            "☕ Enjoy a hot beverage mindfully",
            "🌅 Watch the sunrise or sunset",
        ]),
    ];

    Arc::new(
        rows.into_iter()
            .map(|(emotion, kind, entries)| {
                ((emotion, kind), entries.iter().map(|s| s.to_string()).collect())
            })
            .collect(),
    )
});

/// Picks recommendations for an emotion.
pub struct RecommendationEngine {
    builtin: Arc<Catalogue>,
    custom: RwLock<Catalogue>,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        RecommendationEngine {
            builtin: BUILTIN.clone(),
            custom: RwLock::new(HashMap::new()),
        }
    }
}

impl RecommendationEngine {
    /// An engine with no built-in entries; only custom additions are served.
    pub fn empty() -> Self {
        RecommendationEngine {
            builtin: Arc::new(HashMap::new()),
            custom: RwLock::new(HashMap::new()),
        }
    }

    /// Every entry currently available for `emotion` / `kind`.
    pub fn entries(&self, emotion: EmotionLabel, kind: RecommendationKind) -> Vec<String> {
        let custom = self.custom.read().unwrap_or_else(PoisonError::into_inner);
        self.builtin
            .get(&(emotion, kind))
            .into_iter()
            .chain(custom.get(&(emotion, kind)))
            .flatten()
            .cloned()
            .collect()
    }

    /// A random entry, or a "nothing available" message.
    pub fn get_recommendation(&self, emotion: EmotionLabel, kind: RecommendationKind) -> String {
        self.entries(emotion, kind)
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| format!("No {} recommendations available for {}", kind, emotion))
    }

    /// Random emotion from [`RANDOM_POOL`] and a recommendation for it.
    pub fn random_recommendation(&self, kind: RecommendationKind) -> (EmotionLabel, String) {
        let emotion = *RANDOM_POOL
            .choose(&mut rand::thread_rng())
            .unwrap_or(&EmotionLabel::Neutral);
        (emotion, self.get_recommendation(emotion, kind))
    }

    /// Register a custom entry.
    pub fn add_recommendation(
        &self,
        emotion: EmotionLabel,
        kind: RecommendationKind,
        text: &str,
    ) -> Result<usize, RecommendationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RecommendationError::EmptyText);
        }
        let mut custom = self.custom.write().unwrap_or_else(PoisonError::into_inner);
        let builtin_has = self
            .builtin
            .get(&(emotion, kind))
            .is_some_and(|entries| entries.iter().any(|e| e == text));
        let slot = custom.entry((emotion, kind)).or_default();
        if builtin_has || slot.iter().any(|e| e == text) {
            return Err(RecommendationError::Duplicate { emotion, kind });
        }
        slot.push(text.to_string());
        tracing::info!(%emotion, %kind, custom = slot.len(), "➕ Added recommendation");
        Ok(slot.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_cell_has_three_entries() {
        let engine = RecommendationEngine::default();
        for emotion in EmotionLabel::ALL {
            for kind in RecommendationKind::ALL {
                assert_eq!(engine.entries(emotion, kind).len(), 3, "{}/{}", emotion, kind);
            }
        }
    }

    #[test]
    fn test_recommendation_comes_from_table() {
        let engine = RecommendationEngine::default();
        let entries = engine.entries(EmotionLabel::Sadness, RecommendationKind::Quotes);
        for _ in 0..20 {
            let pick = engine.get_recommendation(EmotionLabel::Sadness, RecommendationKind::Quotes);
            assert!(entries.contains(&pick));
        }
    }

    #[test]
    fn test_fallback_message() {
        let engine = RecommendationEngine::empty();
        assert_eq!(
            engine.get_recommendation(EmotionLabel::Fear, RecommendationKind::Activities),
            "No activities recommendations available for fear"
        );
    }

    #[test]
    fn test_custom_entries() {
        let engine = RecommendationEngine::empty();
        assert_eq!(
            engine.add_recommendation(EmotionLabel::Joy, RecommendationKind::Songs, "  Dance party "),
            Ok(1)
        );
        assert_eq!(
            engine.get_recommendation(EmotionLabel::Joy, RecommendationKind::Songs),
            "Dance party"
        );
        assert_eq!(
            engine.add_recommendation(EmotionLabel::Joy, RecommendationKind::Songs, "Dance party"),
            Err(RecommendationError::Duplicate {
                emotion: EmotionLabel::Joy,
                kind: RecommendationKind::Songs
            })
        );
        assert_eq!(
            engine.add_recommendation(EmotionLabel::Joy, RecommendationKind::Songs, " "),
            Err(RecommendationError::EmptyText)
        );
    }

    #[test]
    fn test_builtin_duplicate_rejected() {
        let engine = RecommendationEngine::default();
        let result = engine.add_recommendation(
            EmotionLabel::Sadness,
            RecommendationKind::Quotes,
            "This too shall pass.",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_random_pool() {
        let engine = RecommendationEngine::default();
        for _ in 0..20 {
            let (emotion, text) = engine.random_recommendation(RecommendationKind::Activities);
            assert!(RANDOM_POOL.contains(&emotion));
            assert!(engine
                .entries(emotion, RecommendationKind::Activities)
                .contains(&text));
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Quotes".parse::<RecommendationKind>(), Ok(RecommendationKind::Quotes));
        assert!("movies".parse::<RecommendationKind>().is_err());
        assert_eq!(RecommendationKind::default(), RecommendationKind::Songs);
    }
}
