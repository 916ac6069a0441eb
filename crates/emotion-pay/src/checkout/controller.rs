use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::backend::CheckoutBackend;
use super::detector::{ClassifierError, DetectorEvent, DetectorHandle};
use super::form::{FormValidationError, PaymentFormState, PaymentMethod};
use super::messages::ReviewSubmission;
use super::offer::{compute_offer, Offer, BASE_PRICE};
use super::payment::{PaymentOutcome, PaymentProcessor, PaymentRequest};
use super::review::{
    suggested_review, OutcomeNotice, GENERIC_REVIEW_SUGGESTION, PAYMENT_FAILED, PAYMENT_SUCCEEDED,
};

/// Stage of a single kiosk checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    AwaitingEmotion,
    OfferPresented,
    Processing,
    Succeeded,
    ReviewPending,
    Failed,
    Closed,
}

impl FlowState {
    pub fn label(&self) -> &'static str {
        match self {
            FlowState::AwaitingEmotion => "awaiting emotion",
            FlowState::OfferPresented => "offer presented",
            FlowState::Processing => "processing payment",
            FlowState::Succeeded => "payment succeeded",
            FlowState::ReviewPending => "review pending",
            FlowState::Failed => "payment failed",
            FlowState::Closed => "closed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::Failed | FlowState::Closed)
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("cannot {action} while the checkout is {state}")]
    InvalidTransition {
        action: &'static str,
        state: FlowState,
    },
    #[error(transparent)]
    Validation(#[from] FormValidationError),
    #[error("payment processing was cancelled")]
    Cancelled,
    #[error("emotion detector stopped before an emotion was detected")]
    DetectorStopped,
    #[error("no async runtime available to deliver the review")]
    RuntimeUnavailable,
}

/// Drives one customer from emotion detection through payment to the review prompt.
///
/// Backend calls (emotion analytics, review submission) are spawned onto the current
/// Tokio runtime and never awaited by the flow. Outside a runtime the emotion report is
/// skipped with a warning and `submit_review` fails with [`FlowError::RuntimeUnavailable`].
pub struct CheckoutController<B> {
    backend: Arc<B>,
    state: FlowState,
    offer: Option<Offer>,
    form: PaymentFormState,
    review_prompt: Option<&'static str>,
    detector_issue: Option<ClassifierError>,
    decline_reason: Option<String>,
}

impl<B> CheckoutController<B>
where
    B: CheckoutBackend + 'static,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: FlowState::AwaitingEmotion,
            offer: None,
            form: PaymentFormState::default(),
            review_prompt: None,
            detector_issue: None,
            decline_reason: None,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn offer(&self) -> Option<&Offer> {
        self.offer.as_ref()
    }

    pub fn form(&self) -> &PaymentFormState {
        &self.form
    }

    pub fn review_prompt(&self) -> Option<&'static str> {
        self.review_prompt
    }

    /// Last classifier failure seen while waiting for a face; cleared by the next label.
    pub fn detector_issue(&self) -> Option<&ClassifierError> {
        self.detector_issue.as_ref()
    }

    pub fn decline_reason(&self) -> Option<&str> {
        self.decline_reason.as_deref()
    }

    pub fn outcome_notice(&self) -> Option<OutcomeNotice> {
        match self.state {
            FlowState::Succeeded | FlowState::ReviewPending => Some(PAYMENT_SUCCEEDED),
            FlowState::Failed => Some(PAYMENT_FAILED),
            _ => None,
        }
    }

    fn expect_state(&self, expected: FlowState, action: &'static str) -> Result<(), FlowError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(FlowError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    /// Prices the checkout for the first classified emotion.
    pub fn on_emotion(&mut self, raw: &str) -> Result<&Offer, FlowError> {
        self.expect_state(FlowState::AwaitingEmotion, "accept an emotion")?;

        let offer = compute_offer(raw);
        info!(
            emotion = %offer.emotion,
            discount = offer.discount_percent,
            final_price = offer.final_price,
            "offer presented"
        );

        self.report_emotion(raw.to_string());
        self.detector_issue = None;
        self.state = FlowState::OfferPresented;
        Ok(&*self.offer.insert(offer))
    }

    pub fn on_detector_error(&mut self, error: ClassifierError) {
        if self.state == FlowState::AwaitingEmotion {
            self.detector_issue = Some(error);
        }
    }

    /// Feeds detector events into the flow until the first label arrives, then stops
    /// the detector.
    pub async fn await_emotion(
        &mut self,
        detector: &mut DetectorHandle,
    ) -> Result<&Offer, FlowError> {
        self.expect_state(FlowState::AwaitingEmotion, "wait for an emotion")?;

        loop {
            match detector.next_event().await {
                Some(DetectorEvent::Detected(label)) => {
                    detector.stop();
                    return self.on_emotion(&label);
                }
                Some(DetectorEvent::Unavailable(error)) => self.on_detector_error(error),
                None => return Err(FlowError::DetectorStopped),
            }
        }
    }

    pub fn input_card_number(&mut self, raw: &str) -> Result<(), FlowError> {
        self.expect_state(FlowState::OfferPresented, "edit the payment form")?;
        self.form.input_card_number(raw);
        Ok(())
    }

    pub fn input_expiry(&mut self, raw: &str) -> Result<(), FlowError> {
        self.expect_state(FlowState::OfferPresented, "edit the payment form")?;
        self.form.input_expiry(raw);
        Ok(())
    }

    pub fn input_cvv(&mut self, raw: &str) -> Result<(), FlowError> {
        self.expect_state(FlowState::OfferPresented, "edit the payment form")?;
        self.form.input_cvv(raw);
        Ok(())
    }

    pub fn select_payment_method(&mut self, method: PaymentMethod) -> Result<(), FlowError> {
        self.expect_state(FlowState::OfferPresented, "edit the payment form")?;
        self.form.select_payment_method(method);
        Ok(())
    }

    pub fn set_agreed_to_terms(&mut self, agreed: bool) -> Result<(), FlowError> {
        self.expect_state(FlowState::OfferPresented, "edit the payment form")?;
        self.form.set_agreed_to_terms(agreed);
        Ok(())
    }

    /// Validates the form. An incomplete form leaves the offer on screen.
    pub fn submit_payment(&mut self) -> Result<(), FlowError> {
        self.expect_state(FlowState::OfferPresented, "submit payment")?;
        self.form.validate()?;
        self.state = FlowState::Processing;
        Ok(())
    }

    /// Runs the processor for the current offer. Cancelling puts the offer back on
    /// screen; a decline ends in [`FlowState::Failed`].
    pub async fn process_payment<P>(
        &mut self,
        processor: &P,
        cancel: &CancellationToken,
    ) -> Result<FlowState, FlowError>
    where
        P: PaymentProcessor + ?Sized,
    {
        self.expect_state(FlowState::Processing, "process a payment")?;

        let request = PaymentRequest {
            amount: self
                .offer
                .as_ref()
                .map_or(BASE_PRICE, |offer| offer.final_price),
            method: self.form.payment_method,
        };

        let outcome = tokio::select! {
            _ = cancel.cancelled() => None,
            outcome = processor.charge(request) => Some(outcome),
        };

        match outcome {
            None => {
                warn!("payment processing cancelled");
                self.state = FlowState::OfferPresented;
                Err(FlowError::Cancelled)
            }
            Some(PaymentOutcome::Approved) => {
                info!(amount = request.amount, "payment approved");
                self.state = FlowState::Succeeded;
                Ok(self.state)
            }
            Some(PaymentOutcome::Declined { reason }) => {
                warn!(amount = request.amount, %reason, "payment declined");
                self.decline_reason = Some(reason);
                self.state = FlowState::Failed;
                Ok(self.state)
            }
        }
    }

    /// Submit and process in one step, as the pay button does.
    pub async fn pay<P>(
        &mut self,
        processor: &P,
        cancel: &CancellationToken,
    ) -> Result<FlowState, FlowError>
    where
        P: PaymentProcessor + ?Sized,
    {
        self.submit_payment()?;
        self.process_payment(processor, cancel).await
    }

    pub fn begin_review(&mut self) -> Result<&'static str, FlowError> {
        self.expect_state(FlowState::Succeeded, "request a review")?;

        let prompt = self
            .offer
            .as_ref()
            .map_or(GENERIC_REVIEW_SUGGESTION, |offer| suggested_review(&offer.emotion));
        self.review_prompt = Some(prompt);
        self.state = FlowState::ReviewPending;
        Ok(prompt)
    }

    /// Closes the prompt immediately and sends the review in the background. The
    /// returned handle resolves once the backend call has finished (successfully or not).
    pub fn submit_review(&mut self) -> Result<JoinHandle<()>, FlowError> {
        self.expect_state(FlowState::ReviewPending, "submit a review")?;
        let runtime = Handle::try_current().map_err(|_| FlowError::RuntimeUnavailable)?;

        let submission = ReviewSubmission::new(
            self.offer
                .as_ref()
                .map(|offer| offer.emotion.to_string())
                .unwrap_or_default(),
            self.review_prompt.unwrap_or_default(),
        );
        self.state = FlowState::Closed;

        let backend = Arc::clone(&self.backend);
        Ok(runtime.spawn(async move {
            if let Err(error) = backend.submit_review(submission).await {
                warn!(%error, "review not recorded");
            }
        }))
    }

    pub fn skip_review(&mut self) -> Result<(), FlowError> {
        self.expect_state(FlowState::ReviewPending, "skip the review")?;
        self.state = FlowState::Closed;
        Ok(())
    }

    fn report_emotion(&self, emotion: String) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(%emotion, "no async runtime; emotion event not reported");
            return;
        };
        let backend = Arc::clone(&self.backend);
        runtime.spawn(async move {
            if let Err(error) = backend.record_emotion(&emotion).await {
                warn!(%error, %emotion, "emotion event not recorded");
            }
        });
    }
}
