use crate::domain::hand::HandKind;

/// Человеческое описание руки по категории и tiebreak.
pub fn describe_hand(kind: HandKind, tiebreak: u8) -> String {
    match kind {
        HandKind::Hifumi => "1-2-3 (instant loss)".to_string(),
        HandKind::Shigoro => "4-5-6 (instant win)".to_string(),
        HandKind::Triple => format!("{} triple (instant win)", tiebreak),
        HandKind::Point => format!("{} point", tiebreak),
        HandKind::NoHand => "no hand".to_string(),
    }
}
