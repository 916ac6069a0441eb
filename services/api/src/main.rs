#[tokio::main]
async fn main() {
    if let Err(err) = emotion_pay_api::run().await {
        eprintln!("emotion-pay-api: {err}");
        std::process::exit(1);
    }
}
