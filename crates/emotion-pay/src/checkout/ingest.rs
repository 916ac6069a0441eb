use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use super::emotion::EmotionLabel;
use super::messages::{EmotionAck, ReviewSubmission};
use super::offer::ingest_discount_percent;
use super::store::{DocumentId, EmotionDocument, EventStore, ReviewDocument, StoreError};

pub type Clock = fn() -> i64;

pub fn epoch_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Server side of the persistence gateway: stamps incoming events and appends them to
/// the injected store.
pub struct EventIngestService<S> {
    store: Arc<S>,
    clock: Clock,
}

impl<S> EventIngestService<S>
where
    S: EventStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, epoch_millis)
    }

    pub fn with_clock(store: Arc<S>, clock: Clock) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Stores the value verbatim and answers with the ingest discount table. Non-string
    /// values are stored too and get no discount.
    pub async fn record_emotion(&self, emotion: Value) -> Result<EmotionAck, StoreError> {
        let discount = emotion
            .as_str()
            .map_or(0, |label| ingest_discount_percent(&EmotionLabel::parse(label)));
        let id = self
            .store
            .append_emotion(EmotionDocument {
                emotion: emotion.clone(),
                timestamp: (self.clock)(),
            })
            .await?;

        info!(%id, %emotion, discount, "emotion event stored");
        Ok(EmotionAck { emotion, discount })
    }

    pub async fn record_review(
        &self,
        submission: ReviewSubmission,
    ) -> Result<DocumentId, StoreError> {
        let ReviewSubmission { emotion, review } = submission;
        let id = self
            .store
            .append_review(ReviewDocument {
                emotion,
                review,
                timestamp: (self.clock)(),
            })
            .await?;

        info!(%id, "review stored");
        Ok(id)
    }
}
