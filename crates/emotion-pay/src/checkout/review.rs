use serde::Serialize;

use super::emotion::EmotionLabel;

pub const SAD_REVIEW_SUGGESTION: &str = "스트레스받았는데 할인 덕분에 기뻤어요!";
pub const GENERIC_REVIEW_SUGGESTION: &str = "행복한 날이 더 좋아졌어요!";

/// Review text offered after a successful payment.
pub fn suggested_review(emotion: &EmotionLabel) -> &'static str {
    match emotion {
        EmotionLabel::Sad => SAD_REVIEW_SUGGESTION,
        _ => GENERIC_REVIEW_SUGGESTION,
    }
}

/// Static copy for the terminal payment screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutcomeNotice {
    pub title: &'static str,
    pub body: &'static str,
}

pub const PAYMENT_SUCCEEDED: OutcomeNotice = OutcomeNotice {
    title: "결제 성공",
    body: "커피 주문이 완료됐어요! 즐거운 시간 보내세요.",
};

pub const PAYMENT_FAILED: OutcomeNotice = OutcomeNotice {
    title: "결제 실패",
    body: "결제에 문제가 생겼어요. 다시 시도해주세요.",
};
