use serde::{Deserialize, Serialize};

use super::format::{format_card_number, format_cvv, format_expiry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    Bank,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "카드",
            PaymentMethod::Bank => "계좌이체",
        }
    }
}

/// Account details shown while the bank transfer method is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BankTransferInstructions {
    pub bank: &'static str,
    pub account_number: &'static str,
    pub account_holder: &'static str,
}

pub const BANK_TRANSFER: BankTransferInstructions = BankTransferInstructions {
    bank: "디지털은행",
    account_number: "123-456-789012",
    account_holder: "커피샵",
};

/// Payment screen inputs. Every setter runs the matching mask; nothing is validated
/// until [`PaymentFormState::validate`] is called on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentFormState {
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub payment_method: PaymentMethod,
    pub agreed_to_terms: bool,
}

impl PaymentFormState {
    pub fn input_card_number(&mut self, raw: &str) {
        self.card_number = format_card_number(raw);
    }

    pub fn input_expiry(&mut self, raw: &str) {
        self.expiry_date = format_expiry(raw);
    }

    pub fn input_cvv(&mut self, raw: &str) {
        self.cvv = format_cvv(raw);
    }

    pub fn select_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    pub fn set_agreed_to_terms(&mut self, agreed: bool) {
        self.agreed_to_terms = agreed;
    }

    pub fn bank_instructions(&self) -> Option<BankTransferInstructions> {
        match self.payment_method {
            PaymentMethod::Bank => Some(BANK_TRANSFER),
            PaymentMethod::Card => None,
        }
    }

    /// Card fields are required whichever method is selected.
    pub fn validate(&self) -> Result<(), FormValidationError> {
        let mut missing = Vec::new();
        if self.card_number.is_empty() {
            missing.push(FormField::CardNumber);
        }
        if self.expiry_date.is_empty() {
            missing.push(FormField::ExpiryDate);
        }
        if self.cvv.is_empty() {
            missing.push(FormField::Cvv);
        }
        if !self.agreed_to_terms {
            missing.push(FormField::TermsConsent);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(FormValidationError { missing })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    CardNumber,
    ExpiryDate,
    Cvv,
    TermsConsent,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::CardNumber => "카드 번호",
            FormField::ExpiryDate => "유효기간",
            FormField::Cvv => "CVV",
            FormField::TermsConsent => "약관 동의",
        }
    }
}

/// Blocking alert raised when the customer submits an incomplete form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("모든 정보를 입력하고 약관에 동의해주세요.")]
pub struct FormValidationError {
    pub missing: Vec<FormField>,
}
