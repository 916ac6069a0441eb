use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::form::PaymentMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    pub amount: u32,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PaymentOutcome {
    Approved,
    Declined { reason: String },
}

/// Charges the customer. The kiosk ships with a timer-based simulation; a real gateway
/// would implement the same trait.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn charge(&self, request: PaymentRequest) -> PaymentOutcome;
}

/// Waits a fixed delay, then approves (or declines when configured to).
#[derive(Debug, Clone)]
pub struct SimulatedPaymentProcessor {
    delay: Duration,
    decline_reason: Option<String>,
}

impl SimulatedPaymentProcessor {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            decline_reason: None,
        }
    }

    pub fn declining(delay: Duration, reason: impl Into<String>) -> Self {
        Self {
            delay,
            decline_reason: Some(reason.into()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl PaymentProcessor for SimulatedPaymentProcessor {
    async fn charge(&self, _request: PaymentRequest) -> PaymentOutcome {
        tokio::time::sleep(self.delay).await;
        match &self.decline_reason {
            Some(reason) => PaymentOutcome::Declined {
                reason: reason.clone(),
            },
            None => PaymentOutcome::Approved,
        }
    }
}
