//! Periodic polling of the face-expression classifier.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Source of expression labels, typically a camera frame run through a face model.
/// `Ok(None)` means no face was found in the frame.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self) -> Result<Option<String>, ClassifierError>;
}

/// Face model that reports per-expression probabilities for every face in the frame.
#[async_trait]
pub trait FaceExpressionModel: Send + Sync {
    async fn detect_faces(&self) -> Result<Vec<Vec<(String, f32)>>, ClassifierError>;
}

/// Adapts a [`FaceExpressionModel`] into a classifier by taking the first face's
/// strongest expression.
pub struct DominantExpression<M> {
    model: M,
}

impl<M> DominantExpression<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<M> EmotionClassifier for DominantExpression<M>
where
    M: FaceExpressionModel,
{
    async fn classify(&self) -> Result<Option<String>, ClassifierError> {
        let faces = self.model.detect_faces().await?;
        Ok(faces.first().and_then(|scores| {
            dominant_expression(scores.iter().map(|(label, score)| (label.as_str(), *score)))
                .map(str::to_string)
        }))
    }
}

/// Highest-scoring expression; the earliest entry wins ties.
pub fn dominant_expression<'a, I>(scores: I) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a str, f32)>,
{
    scores
        .into_iter()
        .fold(None, |best: Option<(&'a str, f32)>, candidate| match best {
            Some(current) if candidate.1 > current.1 => Some(candidate),
            Some(current) => Some(current),
            None => Some(candidate),
        })
        .map(|(label, _)| label)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifierError {
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
    #[error("expression model failed to load: {0}")]
    ModelLoad(String),
    #[error("classification failed: {0}")]
    Inference(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectorEvent {
    Detected(String),
    Unavailable(ClassifierError),
}

const EVENT_BUFFER: usize = 8;

pub struct EmotionDetector;

impl EmotionDetector {
    /// Polls `classifier` every `interval` on a background task until `cancel` fires or
    /// the handle is dropped. The first classification happens one interval after spawn.
    /// Each tick awaits the classifier before the next one is taken and overrun ticks are
    /// skipped, so classifications never overlap.
    pub fn spawn<C>(
        classifier: Arc<C>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> DetectorHandle
    where
        C: EmotionClassifier + 'static,
    {
        let (sender, events) = mpsc::channel(EVENT_BUFFER);
        let token = cancel.clone();
        let period = interval.max(Duration::from_millis(1));
        let first_tick = tokio::time::Instant::now() + period;

        let task = tokio::spawn(async move {
            let mut timer = tokio::time::interval_at(first_tick, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = timer.tick() => {}
                }

                let result = tokio::select! {
                    _ = token.cancelled() => break,
                    result = classifier.classify() => result,
                };

                let event = match result {
                    Ok(Some(label)) => DetectorEvent::Detected(label),
                    Ok(None) => {
                        debug!("no face in frame");
                        continue;
                    }
                    Err(error) => {
                        warn!(%error, "emotion classifier unavailable");
                        DetectorEvent::Unavailable(error)
                    }
                };

                if sender.send(event).await.is_err() {
                    break;
                }
            }

            debug!("emotion detector stopped");
        });

        DetectorHandle {
            events,
            cancel,
            task,
        }
    }
}

pub struct DetectorHandle {
    events: mpsc::Receiver<DetectorEvent>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl DetectorHandle {
    /// `None` once the detector has stopped and the buffer is drained.
    pub async fn next_event(&mut self) -> Option<DetectorEvent> {
        self.events.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stops polling and waits for the background task to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let DetectorHandle { events, task, .. } = self;
        drop(events);
        if let Err(error) = task.await {
            warn!(%error, "emotion detector task ended abnormally");
        }
    }
}
