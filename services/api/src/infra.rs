use async_trait::async_trait;
use emotion_pay::checkout::{
    BackendError, CheckoutBackend, DocumentId, EmotionAck, EmotionDocument, EventIngestService,
    EventStore, ReviewDocument, ReviewSubmission, StoreError, EMOTIONS_COLLECTION,
    REVIEWS_COLLECTION,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::AsyncWriteExt;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Each collection numbers its documents from 1, assigned under the collection lock.
#[derive(Default, Clone)]
pub(crate) struct InMemoryEventStore {
    emotions: Arc<Mutex<Vec<EmotionDocument>>>,
    reviews: Arc<Mutex<Vec<ReviewDocument>>>,
}

impl InMemoryEventStore {
    pub(crate) fn emotions(&self) -> Vec<EmotionDocument> {
        self.emotions.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn reviews(&self) -> Vec<ReviewDocument> {
        self.reviews.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

fn append_locked<D>(
    collection: &Mutex<Vec<D>>,
    name: &str,
    document: D,
) -> Result<DocumentId, StoreError> {
    let mut documents = collection
        .lock()
        .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))?;
    documents.push(document);
    Ok(DocumentId::sequential(name, documents.len() as u64))
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append_emotion(&self, document: EmotionDocument) -> Result<DocumentId, StoreError> {
        append_locked(&self.emotions, EMOTIONS_COLLECTION, document)
    }

    async fn append_review(&self, document: ReviewDocument) -> Result<DocumentId, StoreError> {
        append_locked(&self.reviews, REVIEWS_COLLECTION, document)
    }
}

/// Appends each collection to `<directory>/<collection>.jsonl`, one document per line.
pub(crate) struct JsonlEventStore {
    directory: PathBuf,
    sequences: tokio::sync::Mutex<HashMap<&'static str, u64>>,
}

#[derive(Serialize)]
struct StoredDocument<'a, D> {
    id: &'a DocumentId,
    #[serde(flatten)]
    document: &'a D,
}

impl JsonlEventStore {
    pub(crate) async fn open(directory: impl AsRef<Path>) -> Result<Self, StoreError> {
        let directory = directory.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&directory).await?;

        let mut sequences = HashMap::new();
        for collection in [EMOTIONS_COLLECTION, REVIEWS_COLLECTION] {
            let existing = match tokio::fs::read_to_string(collection_path(&directory, collection))
                .await
            {
                Ok(contents) => contents
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .count() as u64,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => 0,
                Err(err) => return Err(err.into()),
            };
            sequences.insert(collection, existing);
        }

        Ok(Self {
            directory,
            sequences: tokio::sync::Mutex::new(sequences),
        })
    }

    async fn append<D>(
        &self,
        collection: &'static str,
        document: &D,
    ) -> Result<DocumentId, StoreError>
    where
        D: Serialize + Sync,
    {
        let mut sequences = self.sequences.lock().await;
        let next = sequences.get(collection).copied().unwrap_or(0) + 1;
        let id = DocumentId::sequential(collection, next);

        let mut line = serde_json::to_vec(&StoredDocument { id: &id, document })?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(collection_path(&self.directory, collection))
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        sequences.insert(collection, next);
        Ok(id)
    }
}

fn collection_path(directory: &Path, collection: &str) -> PathBuf {
    directory.join(format!("{collection}.jsonl"))
}

#[async_trait]
impl EventStore for JsonlEventStore {
    async fn append_emotion(&self, document: EmotionDocument) -> Result<DocumentId, StoreError> {
        self.append(EMOTIONS_COLLECTION, &document).await
    }

    async fn append_review(&self, document: ReviewDocument) -> Result<DocumentId, StoreError> {
        self.append(REVIEWS_COLLECTION, &document).await
    }
}

/// Kiosk backend that skips HTTP and calls the ingest service directly.
pub(crate) struct InProcessBackend<S> {
    service: Arc<EventIngestService<S>>,
}

impl<S> InProcessBackend<S> {
    pub(crate) fn new(service: Arc<EventIngestService<S>>) -> Self {
        Self { service }
    }
}

fn internal_rejection(error: StoreError) -> BackendError {
    BackendError::Rejected {
        status: 500,
        message: error.to_string(),
    }
}

#[async_trait]
impl<S> CheckoutBackend for InProcessBackend<S>
where
    S: EventStore + 'static,
{
    async fn record_emotion(&self, emotion: &str) -> Result<EmotionAck, BackendError> {
        self.service
            .record_emotion(emotion.into())
            .await
            .map_err(internal_rejection)
    }

    async fn submit_review(&self, submission: ReviewSubmission) -> Result<(), BackendError> {
        self.service
            .record_review(submission)
            .await
            .map(|_| ())
            .map_err(internal_rejection)
    }
}
