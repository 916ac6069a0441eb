use crate::infra::{InMemoryEventStore, InProcessBackend};
use async_trait::async_trait;
use clap::Args;
use emotion_pay::checkout::{
    compute_offer, field_text, CheckoutBackend, CheckoutController, ClassifierError,
    EmotionClassifier, EmotionDetector, EventIngestService, FlowError, FlowState,
    HttpCheckoutBackend, Offer, PaymentMethod, SimulatedPaymentProcessor,
};
use emotion_pay::config::{AppConfig, CheckoutConfig};
use emotion_pay::error::AppError;
use emotion_pay::telemetry;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub(crate) struct OfferArgs {
    /// Classifier label, e.g. sad, happy, angry, surprised, neutral
    pub(crate) emotion: String,
}

pub(crate) fn run_offer(args: OfferArgs) -> Result<(), AppError> {
    let offer = compute_offer(&args.emotion);
    match serde_json::to_string_pretty(&offer) {
        Ok(json) => println!("{}", json),
        Err(err) => println!("Offer payload unavailable: {}", err),
    }
    println!("Display price: {}", offer.display_price());
    Ok(())
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Label the scripted classifier reports once a face appears
    #[arg(long, default_value = "happy")]
    pub(crate) emotion: String,
    /// Frames without a face before the label is reported
    #[arg(long, default_value_t = 1)]
    pub(crate) empty_frames: usize,
    /// Raw card number as typed on the keypad
    #[arg(long = "card", default_value = "4111111111111111")]
    pub(crate) card_number: String,
    /// Raw expiry digits (MMYY)
    #[arg(long, default_value = "1228")]
    pub(crate) expiry: String,
    #[arg(long, default_value = "123")]
    pub(crate) cvv: String,
    /// Leave the terms checkbox unticked
    #[arg(long)]
    pub(crate) no_consent: bool,
    /// Pay by bank transfer instead of card
    #[arg(long)]
    pub(crate) bank_transfer: bool,
    /// Make the simulated processor decline the charge
    #[arg(long)]
    pub(crate) decline: bool,
    /// Close the review prompt without submitting
    #[arg(long)]
    pub(crate) skip_review: bool,
    /// Base URL of a running event API; events stay in process when omitted
    #[arg(long)]
    pub(crate) endpoint: Option<String>,
}

/// Stand-in for the camera and face model: no face for a few frames, then one label.
struct ScriptedClassifier {
    emotion: String,
    empty_frames: usize,
    frames_seen: AtomicUsize,
}

impl ScriptedClassifier {
    fn new(emotion: String, empty_frames: usize) -> Self {
        Self {
            emotion,
            empty_frames,
            frames_seen: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EmotionClassifier for ScriptedClassifier {
    async fn classify(&self) -> Result<Option<String>, ClassifierError> {
        let frame = self.frames_seen.fetch_add(1, Ordering::Relaxed);
        if frame < self.empty_frames {
            Ok(None)
        } else {
            Ok(Some(self.emotion.clone()))
        }
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    println!("EmotionPay kiosk demo");

    match args.endpoint.clone() {
        Some(endpoint) => {
            info!(%endpoint, "reporting events over http");
            let backend = Arc::new(HttpCheckoutBackend::new(endpoint));
            run_checkout_session(&config.checkout, &args, backend).await?;
        }
        None => {
            let store = Arc::new(InMemoryEventStore::default());
            let service = Arc::new(EventIngestService::new(store.clone()));
            let backend = Arc::new(InProcessBackend::new(service));
            run_checkout_session(&config.checkout, &args, backend).await?;
            render_stored_events(&store);
        }
    }

    Ok(())
}

/// Walks one customer through the kiosk and returns the state the checkout ended in.
pub(crate) async fn run_checkout_session<B>(
    checkout: &CheckoutConfig,
    args: &DemoArgs,
    backend: Arc<B>,
) -> Result<FlowState, AppError>
where
    B: CheckoutBackend + 'static,
{
    let mut controller = CheckoutController::new(backend);
    let cancel = CancellationToken::new();
    let classifier = Arc::new(ScriptedClassifier::new(
        args.emotion.clone(),
        args.empty_frames,
    ));

    println!("\nLooking for a face...");
    let mut detector =
        EmotionDetector::spawn(classifier, checkout.detection_interval, cancel.child_token());
    let offer = controller.await_emotion(&mut detector).await?.clone();
    detector.shutdown().await;
    render_offer(&offer);

    controller.select_payment_method(if args.bank_transfer {
        PaymentMethod::Bank
    } else {
        PaymentMethod::Card
    })?;
    controller.input_card_number(&args.card_number)?;
    controller.input_expiry(&args.expiry)?;
    controller.input_cvv(&args.cvv)?;
    controller.set_agreed_to_terms(!args.no_consent)?;

    let form = controller.form();
    println!("\nPayment form ({})", form.payment_method.label());
    println!(
        "- card {} | expiry {} | cvv {} | terms {}",
        form.card_number,
        form.expiry_date,
        "*".repeat(form.cvv.len()),
        if form.agreed_to_terms { "agreed" } else { "not agreed" }
    );
    if let Some(bank) = form.bank_instructions() {
        println!(
            "- transfer to {} {} ({})",
            bank.bank, bank.account_number, bank.account_holder
        );
    }

    match controller.submit_payment() {
        Ok(()) => {}
        Err(FlowError::Validation(err)) => {
            println!("\n{}", err);
            for field in &err.missing {
                println!("  - missing: {}", field.label());
            }
            return Ok(controller.state());
        }
        Err(err) => return Err(err.into()),
    }

    println!("\nProcessing {}...", offer.display_price());
    let processor = if args.decline {
        SimulatedPaymentProcessor::declining(checkout.processing_delay, "card declined")
    } else {
        SimulatedPaymentProcessor::new(checkout.processing_delay)
    };
    let state = controller.process_payment(&processor, &cancel).await?;

    if let Some(notice) = controller.outcome_notice() {
        println!("{}: {}", notice.title, notice.body);
    }
    if state == FlowState::Failed {
        if let Some(reason) = controller.decline_reason() {
            println!("  reason: {}", reason);
        }
        return Ok(state);
    }

    let prompt = controller.begin_review()?;
    println!("\nSuggested review: \"{}\"", prompt);

    if args.skip_review {
        controller.skip_review()?;
        println!("Review skipped");
    } else {
        let delivery = controller.submit_review()?;
        println!("Review submitted");
        if let Err(err) = delivery.await {
            warn!(error = %err, "review delivery task failed");
        }
    }

    Ok(controller.state())
}

fn render_offer(offer: &Offer) {
    println!(
        "\n{} {} ({})",
        offer.theme.icon, offer.theme.message, offer.emotion
    );
    println!(
        "- base {}원 | discount {}% | pay {}",
        offer.base_price,
        offer.discount_percent,
        offer.display_price()
    );
    println!(
        "- theme background {} accent {}",
        offer.theme.background_color, offer.theme.accent_color
    );
}

fn render_stored_events(store: &InMemoryEventStore) {
    println!("\nStored events");
    for document in store.emotions() {
        println!(
            "- emotions: {} at {}",
            field_text(&document.emotion),
            document.timestamp
        );
    }
    let reviews = store.reviews();
    if reviews.is_empty() {
        println!("- reviews: none");
    }
    for document in reviews {
        println!(
            "- reviews: [{}] {}",
            field_text(&document.emotion),
            field_text(&document.review)
        );
    }
}
