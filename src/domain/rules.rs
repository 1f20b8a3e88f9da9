use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;

/// Жёсткий лимит бросков за один ход.
pub const MAX_TRIES: u8 = 3;

/// Правила стола: лимиты ставок и минимальное число участников.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameRules {
    /// Максимальная ставка ребёнка за раунд.
    pub max_bet: Chips,
    /// Шаг изменения ставки в UI (+/-). Ядро его не навязывает.
    pub bet_step: Chips,
    /// Сколько участников нужно, чтобы хост мог начать выбор родителя.
    pub min_participants: usize,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            max_bet: Chips(1_000_000),
            bet_step: Chips(100),
            min_participants: 2,
        }
    }
}
