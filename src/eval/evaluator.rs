use core::cmp::Ordering;

use crate::domain::dice::Dice;
use crate::domain::hand::{Hand, HandKind, Outcome};
use crate::eval::hand_rank::describe_hand;

/// Оценить бросок. Результат не зависит от порядка костей.
pub fn evaluate(dice: &Dice) -> Hand {
    evaluate_values(dice.sorted())
}

/// Оценка по уже отсортированной тройке `(a, b, c)`.
pub fn evaluate_values(sorted: [u8; 3]) -> Hand {
    let (kind, tiebreak) = classify(sorted);
    Hand {
        kind,
        tiebreak,
        label: describe_hand(kind, tiebreak),
    }
}

fn classify([a, b, c]: [u8; 3]) -> (HandKind, u8) {
    match (a, b, c) {
        (1, 2, 3) => (HandKind::Hifumi, 0),
        (4, 5, 6) => (HandKind::Shigoro, 0),
        _ if a == b && b == c => (HandKind::Triple, a),
        // Пара внизу – очко у старшей кости, пара сверху – у младшей.
        _ if a == b => (HandKind::Point, c),
        _ if b == c => (HandKind::Point, a),
        _ => (HandKind::NoHand, 0),
    }
}

/// Сравнить руку родителя и руку ребёнка: ранг, затем tiebreak.
pub fn compare(parent: &Hand, child: &Hand) -> Outcome {
    match child.strength().cmp(&parent.strength()) {
        Ordering::Greater => Outcome::ChildWins,
        Ordering::Less => Outcome::ChildLoses,
        Ordering::Equal => Outcome::Draw,
    }
}
