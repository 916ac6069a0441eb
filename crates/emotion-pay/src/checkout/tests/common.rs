use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::checkout::backend::{BackendError, CheckoutBackend};
use crate::checkout::controller::CheckoutController;
use crate::checkout::ingest::EventIngestService;
use crate::checkout::messages::{EmotionAck, ReviewSubmission};
use crate::checkout::offer::ingest_discount_percent;
use crate::checkout::store::{
    DocumentId, EmotionDocument, EventStore, ReviewDocument, StoreError, EMOTIONS_COLLECTION,
    REVIEWS_COLLECTION,
};
use crate::checkout::EmotionLabel;

pub(super) const FIXED_TIMESTAMP: i64 = 1_735_689_600_000;

pub(super) fn fixed_clock() -> i64 {
    FIXED_TIMESTAMP
}

#[derive(Default)]
pub(super) struct RecordingBackend {
    emotions: Mutex<Vec<String>>,
    reviews: Mutex<Vec<ReviewSubmission>>,
}

impl RecordingBackend {
    pub(super) fn emotions(&self) -> Vec<String> {
        self.emotions.lock().expect("backend mutex poisoned").clone()
    }

    pub(super) fn reviews(&self) -> Vec<ReviewSubmission> {
        self.reviews.lock().expect("backend mutex poisoned").clone()
    }
}

#[async_trait]
impl CheckoutBackend for RecordingBackend {
    async fn record_emotion(&self, emotion: &str) -> Result<EmotionAck, BackendError> {
        self.emotions
            .lock()
            .expect("backend mutex poisoned")
            .push(emotion.to_string());
        Ok(EmotionAck {
            emotion: emotion.into(),
            discount: ingest_discount_percent(&EmotionLabel::parse(emotion)),
        })
    }

    async fn submit_review(&self, submission: ReviewSubmission) -> Result<(), BackendError> {
        self.reviews
            .lock()
            .expect("backend mutex poisoned")
            .push(submission);
        Ok(())
    }
}

pub(super) struct OfflineBackend;

#[async_trait]
impl CheckoutBackend for OfflineBackend {
    async fn record_emotion(&self, _emotion: &str) -> Result<EmotionAck, BackendError> {
        Err(BackendError::Transport("connection refused".to_string()))
    }

    async fn submit_review(&self, _submission: ReviewSubmission) -> Result<(), BackendError> {
        Err(BackendError::Transport("connection refused".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    emotions: Mutex<Vec<EmotionDocument>>,
    reviews: Mutex<Vec<ReviewDocument>>,
}

impl MemoryStore {
    pub(super) fn emotions(&self) -> Vec<EmotionDocument> {
        self.emotions.lock().expect("store mutex poisoned").clone()
    }

    pub(super) fn reviews(&self) -> Vec<ReviewDocument> {
        self.reviews.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn append_emotion(&self, document: EmotionDocument) -> Result<DocumentId, StoreError> {
        let mut emotions = self.emotions.lock().expect("store mutex poisoned");
        emotions.push(document);
        Ok(DocumentId::sequential(EMOTIONS_COLLECTION, emotions.len() as u64))
    }

    async fn append_review(&self, document: ReviewDocument) -> Result<DocumentId, StoreError> {
        let mut reviews = self.reviews.lock().expect("store mutex poisoned");
        reviews.push(document);
        Ok(DocumentId::sequential(REVIEWS_COLLECTION, reviews.len() as u64))
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl EventStore for UnavailableStore {
    async fn append_emotion(&self, _document: EmotionDocument) -> Result<DocumentId, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn append_review(&self, _document: ReviewDocument) -> Result<DocumentId, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn ingest_service() -> (Arc<EventIngestService<MemoryStore>>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = Arc::new(EventIngestService::with_clock(store.clone(), fixed_clock));
    (service, store)
}

pub(super) fn controller() -> (CheckoutController<RecordingBackend>, Arc<RecordingBackend>) {
    let backend = Arc::new(RecordingBackend::default());
    (CheckoutController::new(backend.clone()), backend)
}

/// Controller with an offer on screen and a complete card form.
pub(super) fn ready_to_pay(
    emotion: &str,
) -> (CheckoutController<RecordingBackend>, Arc<RecordingBackend>) {
    let (mut controller, backend) = controller();
    controller.on_emotion(emotion).expect("offer presented");
    controller
        .input_card_number("4111111111111111")
        .expect("card number accepted");
    controller.input_expiry("1225").expect("expiry accepted");
    controller.input_cvv("123").expect("cvv accepted");
    controller
        .set_agreed_to_terms(true)
        .expect("consent accepted");
    (controller, backend)
}

/// Lets spawned fire-and-forget tasks run to completion on the test runtime.
pub(super) async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
