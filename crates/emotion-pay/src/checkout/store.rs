use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EMOTIONS_COLLECTION: &str = "emotions";
pub const REVIEWS_COLLECTION: &str = "reviews";

/// One classification event as stored in the `emotions` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionDocument {
    pub emotion: Value,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// One submitted review as stored in the `reviews` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDocument {
    pub emotion: Value,
    pub review: Value,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn sequential(collection: &str, sequence: u64) -> Self {
        Self(format!("{collection}-{sequence:06}"))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append-only document store behind the event API. Duplicate submissions create
/// duplicate documents.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn append_emotion(&self, document: EmotionDocument) -> Result<DocumentId, StoreError>;
    async fn append_review(&self, document: ReviewDocument) -> Result<DocumentId, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("document encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("document store io failed: {0}")]
    Io(#[from] std::io::Error),
}
