use std::fmt;

use serde::{Deserialize, Serialize};

/// Expression label reported by the face classifier.
///
/// Anything outside the five priced expressions is kept verbatim as `Other` so it can be
/// displayed and persisted, while the offer policy treats it as unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EmotionLabel {
    Sad,
    Happy,
    Angry,
    Surprised,
    Neutral,
    Other(String),
}

impl EmotionLabel {
    pub const PRICED: [EmotionLabel; 5] = [
        EmotionLabel::Sad,
        EmotionLabel::Happy,
        EmotionLabel::Angry,
        EmotionLabel::Surprised,
        EmotionLabel::Neutral,
    ];

    /// Exact, case-sensitive match against the classifier vocabulary.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "sad" => Self::Sad,
            "happy" => Self::Happy,
            "angry" => Self::Angry,
            "surprised" => Self::Surprised,
            "neutral" => Self::Neutral,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Sad => "sad",
            Self::Happy => "happy",
            Self::Angry => "angry",
            Self::Surprised => "surprised",
            Self::Neutral => "neutral",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_priced(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for EmotionLabel {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for EmotionLabel {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<EmotionLabel> for String {
    fn from(value: EmotionLabel) -> Self {
        match value {
            EmotionLabel::Other(raw) => raw,
            priced => priced.as_str().to_string(),
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
