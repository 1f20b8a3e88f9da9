use core::fmt;

use serde::{Deserialize, Serialize};

/// Категория руки. Числовое значение = ранг (больше – сильнее).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandKind {
    /// 1-2-3: мгновенный проигрыш.
    Hifumi = 1,
    /// Нет комбинации.
    NoHand = 2,
    /// Пара + «очко» (кикер).
    Point = 3,
    /// Три одинаковых.
    Triple = 4,
    /// 4-5-6: мгновенная победа.
    Shigoro = 5,
}

impl HandKind {
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Закрывает ли такая рука ход сразу (всё, кроме «нет комбинации»).
    pub fn is_scoring(self) -> bool {
        !matches!(self, HandKind::NoHand)
    }
}

/// Итоговая рука по трём костям. После создания не меняется.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hand {
    pub kind: HandKind,
    /// Значение для сравнения внутри одной категории (0, если не используется).
    pub tiebreak: u8,
    pub label: String,
}

impl Hand {
    pub fn rank(&self) -> u8 {
        self.kind.rank()
    }

    /// Ключ сравнения: сначала ранг, потом tiebreak.
    pub fn strength(&self) -> (u8, u8) {
        (self.rank(), self.tiebreak)
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Результат сравнения «родитель против ребёнка» с точки зрения ребёнка.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Outcome {
    ChildWins,
    ChildLoses,
    Draw,
}

impl Outcome {
    /// Тот же исход, если поменять стороны местами.
    pub fn reversed(self) -> Outcome {
        match self {
            Outcome::ChildWins => Outcome::ChildLoses,
            Outcome::ChildLoses => Outcome::ChildWins,
            Outcome::Draw => Outcome::Draw,
        }
    }
}
