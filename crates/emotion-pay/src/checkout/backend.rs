use async_trait::async_trait;
use tracing::debug;

use super::messages::{ApiMessage, EmotionAck, EmotionReport, ReviewSubmission};

/// Kiosk-side view of the event API. The flow never waits on these calls, so
/// implementations only need to report failures for logging.
#[async_trait]
pub trait CheckoutBackend: Send + Sync {
    async fn record_emotion(&self, emotion: &str) -> Result<EmotionAck, BackendError>;
    async fn submit_review(&self, submission: ReviewSubmission) -> Result<(), BackendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("event api unreachable: {0}")]
    Transport(String),
    #[error("event api rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl From<reqwest::Error> for BackendError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

/// Talks to `/api/emotions` and `/api/review` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCheckoutBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCheckoutBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn rejection(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();
    let message = match response.json::<ApiMessage>().await {
        Ok(body) => body.message,
        Err(_) => "unreadable error body".to_string(),
    };
    BackendError::Rejected { status, message }
}

#[async_trait]
impl CheckoutBackend for HttpCheckoutBackend {
    async fn record_emotion(&self, emotion: &str) -> Result<EmotionAck, BackendError> {
        let report = EmotionReport {
            emotion: emotion.into(),
        };
        let response = self
            .client
            .post(self.endpoint("/api/emotions"))
            .json(&report)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let ack = response.json::<EmotionAck>().await?;
        debug!(emotion = %ack.emotion, discount = ack.discount, "emotion recorded");
        Ok(ack)
    }

    async fn submit_review(&self, submission: ReviewSubmission) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.endpoint("/api/review"))
            .json(&submission)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        debug!(emotion = %submission.emotion, "review submitted");
        Ok(())
    }
}
