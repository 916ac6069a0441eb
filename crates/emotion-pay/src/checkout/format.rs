//! Keystroke masking for the card payment form. Purely syntactic: no Luhn check, no
//! month range validation.

/// Longest masked card number: four groups of four digits plus three separators.
pub const CARD_NUMBER_MAX_LEN: usize = 19;
pub const EXPIRY_MAX_LEN: usize = 5;
pub const CVV_MAX_LEN: usize = 3;

const CARD_DIGITS_MAX: usize = 16;
const CARD_DIGITS_MIN: usize = 4;

fn digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn truncate_chars(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}

/// Groups the first 16 digits in blocks of four. With fewer than four digits there is
/// nothing to group and the input is echoed back (still capped at the field length).
pub fn format_card_number(raw: &str) -> String {
    let digits = digits(raw);
    if digits.len() < CARD_DIGITS_MIN {
        return truncate_chars(raw, CARD_NUMBER_MAX_LEN);
    }

    let mut formatted = String::with_capacity(CARD_NUMBER_MAX_LEN);
    for (index, digit) in digits.chars().take(CARD_DIGITS_MAX).enumerate() {
        if index > 0 && index % 4 == 0 {
            formatted.push(' ');
        }
        formatted.push(digit);
    }
    formatted
}

/// `MM/YY` mask. A slash appears as soon as two digits are present.
pub fn format_expiry(raw: &str) -> String {
    let digits = digits(raw);
    if digits.len() < 2 {
        return digits;
    }

    let year_end = digits.len().min(4);
    let masked = format!("{}/{}", &digits[..2], &digits[2..year_end]);
    truncate_chars(&masked, EXPIRY_MAX_LEN)
}

pub fn format_cvv(raw: &str) -> String {
    truncate_chars(&digits(raw), CVV_MAX_LEN)
}
