use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::warn;

use super::ingest::EventIngestService;
use super::messages::{ApiMessage, EmotionReport, ReviewSubmission};
use super::store::EventStore;

/// Router exposing the emotion and review ingest endpoints. Only `POST` is accepted;
/// every other method gets a 405 with a message body.
pub fn event_router<S>(service: Arc<EventIngestService<S>>) -> Router
where
    S: EventStore + 'static,
{
    Router::new()
        .route(
            "/api/emotions",
            post(emotion_handler::<S>).fallback(method_not_allowed),
        )
        .route(
            "/api/review",
            post(review_handler::<S>).fallback(method_not_allowed),
        )
        .with_state(service)
}

pub(crate) async fn emotion_handler<S>(
    State(service): State<Arc<EventIngestService<S>>>,
    Json(report): Json<EmotionReport>,
) -> Response
where
    S: EventStore + 'static,
{
    match service.record_emotion(report.emotion).await {
        Ok(ack) => (StatusCode::OK, Json(ack)).into_response(),
        Err(error) => {
            warn!(%error, "failed to store emotion event");
            store_failure(error.to_string())
        }
    }
}

pub(crate) async fn review_handler<S>(
    State(service): State<Arc<EventIngestService<S>>>,
    Json(submission): Json<ReviewSubmission>,
) -> Response
where
    S: EventStore + 'static,
{
    match service.record_review(submission).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiMessage::new(ApiMessage::REVIEW_SAVED)),
        )
            .into_response(),
        Err(error) => {
            warn!(%error, "failed to store review");
            store_failure(error.to_string())
        }
    }
}

pub(crate) async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ApiMessage::new(ApiMessage::METHOD_NOT_ALLOWED)),
    )
        .into_response()
}

fn store_failure(message: String) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiMessage::new(message))).into_response()
}
