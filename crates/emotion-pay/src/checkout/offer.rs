use serde::Serialize;

use super::emotion::EmotionLabel;

/// Price of one coffee before any emotion discount, in whole won.
pub const BASE_PRICE: u32 = 5000;

/// Visual treatment of the payment screen for a detected emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OfferTheme {
    pub icon: &'static str,
    pub background_color: &'static str,
    pub accent_color: &'static str,
    pub message: &'static str,
}

impl OfferTheme {
    pub const DEFAULT: OfferTheme = OfferTheme {
        icon: "☕",
        background_color: "#e6f0ff",
        accent_color: "#007bff",
        message: "커피로 하루를 채워보세요!",
    };

    pub fn for_emotion(emotion: &EmotionLabel) -> Self {
        match emotion {
            EmotionLabel::Sad => OfferTheme {
                icon: "😢",
                background_color: "#e6f0ff",
                accent_color: "#007bff",
                message: "힘든 날엔 할인으로 위로드릴게요!",
            },
            EmotionLabel::Happy => OfferTheme {
                icon: "😊",
                background_color: "#fef3e7",
                accent_color: "#f59e0b",
                message: "기쁜 날엔 커피가 더 달콤해요!",
            },
            EmotionLabel::Angry => OfferTheme {
                icon: "😠",
                background_color: "#fee2e2",
                accent_color: "#ef4444",
                message: "화난 날엔 커피로 진정하세요!",
            },
            EmotionLabel::Surprised => OfferTheme {
                icon: "😲",
                background_color: "#f3e8ff",
                accent_color: "#9333ea",
                message: "놀란 날엔 작은 할인으로 기분 전환!",
            },
            EmotionLabel::Neutral => OfferTheme {
                icon: "😐",
                background_color: "#f3f4f6",
                accent_color: "#6b7280",
                message: "평온한 날엔 커피 한 잔 어때요?",
            },
            EmotionLabel::Other(_) => Self::DEFAULT,
        }
    }
}

/// Priced, themed checkout configuration derived from one classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Offer {
    pub emotion: EmotionLabel,
    pub discount_percent: u8,
    pub base_price: u32,
    pub final_price: u32,
    pub theme: OfferTheme,
}

impl Offer {
    pub fn for_emotion(emotion: EmotionLabel) -> Self {
        let discount_percent = discount_percent(&emotion);
        Self {
            theme: OfferTheme::for_emotion(&emotion),
            emotion,
            discount_percent,
            base_price: BASE_PRICE,
            final_price: discounted_price(BASE_PRICE, discount_percent),
        }
    }

    /// Final price as shown on the kiosk, e.g. `4,750원`.
    pub fn display_price(&self) -> String {
        format!("{}원", group_thousands(self.final_price))
    }
}

/// Offer for any classifier output; unlisted labels get the default theme and no discount.
pub fn compute_offer(raw: &str) -> Offer {
    Offer::for_emotion(EmotionLabel::parse(raw))
}

/// Kiosk discount table.
pub fn discount_percent(emotion: &EmotionLabel) -> u8 {
    match emotion {
        EmotionLabel::Sad => 10,
        EmotionLabel::Happy => 5,
        EmotionLabel::Angry => 8,
        EmotionLabel::Surprised => 3,
        EmotionLabel::Neutral | EmotionLabel::Other(_) => 0,
    }
}

/// Discount the `/api/emotions` endpoint reports back. Only `sad` and `happy` are priced
/// here, unlike [`discount_percent`].
pub fn ingest_discount_percent(emotion: &EmotionLabel) -> u8 {
    match emotion {
        EmotionLabel::Sad => 10,
        EmotionLabel::Happy => 5,
        _ => 0,
    }
}

/// `base * (1 - discount / 100)` rounded half-up to a whole currency unit.
///
/// Discounts above 100 are clamped so the result never underflows.
pub fn discounted_price(base: u32, discount_percent: u8) -> u32 {
    let keep = 100 - u64::from(discount_percent.min(100));
    let scaled = u64::from(base) * keep;
    ((scaled + 50) / 100) as u32
}

fn group_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priced_emotions_match_the_kiosk_table() {
        let expected = [
            ("sad", 10, 4500, "😢"),
            ("happy", 5, 4750, "😊"),
            ("angry", 8, 4600, "😠"),
            ("surprised", 3, 4850, "😲"),
            ("neutral", 0, 5000, "😐"),
        ];

        for (raw, discount, final_price, icon) in expected {
            let offer = compute_offer(raw);
            assert_eq!(offer.discount_percent, discount, "discount for {raw}");
            assert_eq!(offer.base_price, BASE_PRICE);
            assert_eq!(offer.final_price, final_price, "final price for {raw}");
            assert_eq!(offer.theme.icon, icon);
        }
    }

    #[test]
    fn unknown_labels_fall_back_to_default_theme() {
        for raw in ["fearful", "", "HAPPY", "disgusted"] {
            let offer = compute_offer(raw);
            assert_eq!(offer.discount_percent, 0);
            assert_eq!(offer.final_price, BASE_PRICE);
            assert_eq!(offer.theme, OfferTheme::DEFAULT);
            assert_eq!(offer.emotion.as_str(), raw);
        }
    }

    #[test]
    fn neutral_keeps_its_own_theme() {
        let offer = compute_offer("neutral");
        assert_ne!(offer.theme, OfferTheme::DEFAULT);
        assert_eq!(offer.theme.message, "평온한 날엔 커피 한 잔 어때요?");
    }

    #[test]
    fn compute_offer_is_deterministic() {
        assert_eq!(compute_offer("angry"), compute_offer("angry"));
    }

    #[test]
    fn discounted_price_rounds_half_up() {
        assert_eq!(discounted_price(5000, 8), 4600);
        assert_eq!(discounted_price(1050, 10), 945);
        assert_eq!(discounted_price(15, 10), 14);
        assert_eq!(discounted_price(25, 10), 23);
        assert_eq!(discounted_price(5000, 100), 0);
        assert_eq!(discounted_price(5000, 250), 0);
    }

    #[test]
    fn display_price_groups_thousands() {
        assert_eq!(compute_offer("happy").display_price(), "4,750원");
        assert_eq!(compute_offer("neutral").display_price(), "5,000원");
        assert_eq!(group_thousands(950), "950");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn ingest_table_only_prices_sad_and_happy() {
        assert_eq!(ingest_discount_percent(&EmotionLabel::Sad), 10);
        assert_eq!(ingest_discount_percent(&EmotionLabel::Happy), 5);
        assert_eq!(ingest_discount_percent(&EmotionLabel::Angry), 0);
        assert_eq!(ingest_discount_percent(&EmotionLabel::Surprised), 0);
        assert_ne!(
            ingest_discount_percent(&EmotionLabel::Angry),
            discount_percent(&EmotionLabel::Angry)
        );
    }
}
