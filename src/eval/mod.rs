//! Оценка силы броска из трёх костей.
//!
//! Основные функции:
//!   `evaluate(dice) -> Hand`
//!   `compare(parent, child) -> Outcome`

pub mod evaluator;
pub mod hand_rank;

pub use evaluator::{compare, evaluate, evaluate_values};
pub use hand_rank::describe_hand;
