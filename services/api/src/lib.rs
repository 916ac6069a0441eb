mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use emotion_pay::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
