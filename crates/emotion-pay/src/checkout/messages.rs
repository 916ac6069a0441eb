//! JSON bodies exchanged between the kiosk and the event API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields the API accepts are not schema-checked: any JSON value is stored as sent, and a
/// missing field becomes an empty string.
pub fn empty_field() -> Value {
    Value::String(String::new())
}

/// Text of a stored field, or its JSON rendering when it is not a string.
pub fn field_text(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionReport {
    #[serde(default = "empty_field")]
    pub emotion: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionAck {
    pub emotion: Value,
    pub discount: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSubmission {
    #[serde(default = "empty_field")]
    pub emotion: Value,
    #[serde(default = "empty_field")]
    pub review: Value,
}

impl ReviewSubmission {
    pub fn new(emotion: impl Into<String>, review: impl Into<String>) -> Self {
        Self {
            emotion: Value::String(emotion.into()),
            review: Value::String(review.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub const REVIEW_SAVED: &'static str = "리뷰 저장 완료";
    pub const METHOD_NOT_ALLOWED: &'static str = "Method not allowed";

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
