//! Emotion-aware kiosk checkout: the offer policy, payment form masking, the checkout
//! state machine, classifier polling, and the event ingest API.

pub mod backend;
pub mod controller;
pub mod detector;
pub mod emotion;
pub mod form;
pub mod format;
pub mod ingest;
pub mod messages;
pub mod offer;
pub mod payment;
pub mod review;
pub mod router;
pub mod store;

#[cfg(test)]
mod tests;

pub use backend::{BackendError, CheckoutBackend, HttpCheckoutBackend};
pub use controller::{CheckoutController, FlowError, FlowState};
pub use detector::{
    dominant_expression, ClassifierError, DetectorEvent, DetectorHandle, DominantExpression,
    EmotionClassifier, EmotionDetector, FaceExpressionModel,
};
pub use emotion::EmotionLabel;
pub use form::{
    BankTransferInstructions, FormField, FormValidationError, PaymentFormState, PaymentMethod,
    BANK_TRANSFER,
};
pub use format::{format_card_number, format_cvv, format_expiry};
pub use ingest::EventIngestService;
pub use messages::{
    empty_field, field_text, ApiMessage, EmotionAck, EmotionReport, ReviewSubmission,
};
pub use offer::{
    compute_offer, discounted_price, ingest_discount_percent, Offer, OfferTheme, BASE_PRICE,
};
pub use payment::{PaymentOutcome, PaymentProcessor, PaymentRequest, SimulatedPaymentProcessor};
pub use review::{suggested_review, OutcomeNotice, GENERIC_REVIEW_SUGGESTION, SAD_REVIEW_SUGGESTION};
pub use router::event_router;
pub use store::{
    DocumentId, EmotionDocument, EventStore, ReviewDocument, StoreError, EMOTIONS_COLLECTION,
    REVIEWS_COLLECTION,
};
