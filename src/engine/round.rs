use serde::{Deserialize, Serialize};

use crate::domain::dice::Dice;
use crate::domain::hand::Hand;
use crate::domain::rules::MAX_TRIES;
use crate::domain::{PlayerId, Role};
use crate::engine::errors::EngineError;
use crate::engine::{roll_dice, DiceSource};
use crate::eval::evaluate;

/// Результат одного броска внутри хода.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RollResult {
    pub dice: Dice,
    pub hand: Hand,
    /// Номер попытки (1..=3).
    pub attempt: u8,
    /// Зафиксирован ли ход этим броском.
    pub finalized: bool,
}

/// Ход одного игрока (родителя или ребёнка).
///
/// `final_hand` выставляется ровно один раз, после этого сессия терминальна.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundSession {
    pub actor_id: PlayerId,
    pub role: Role,
    pub tries: u8,
    pub last_roll: Option<Dice>,
    pub final_hand: Option<Hand>,
    /// Ход закрыт через STOP, а не броском.
    pub stopped: bool,
}

impl RoundSession {
    pub fn new(actor_id: PlayerId, role: Role) -> Self {
        Self {
            actor_id,
            role,
            tries: 0,
            last_roll: None,
            final_hand: None,
            stopped: false,
        }
    }

    pub fn is_final(&self) -> bool {
        self.final_hand.is_some()
    }

    /// Проверки перед броском: актёр, бюджет попыток, терминальность.
    pub fn ensure_can_roll(&self, actor: PlayerId) -> Result<(), EngineError> {
        if actor != self.actor_id {
            return Err(EngineError::NotYourTurn(actor));
        }
        if self.tries >= MAX_TRIES {
            return Err(EngineError::RetryBudgetExhausted);
        }
        if self.is_final() {
            return Err(EngineError::AlreadyFinalized);
        }
        Ok(())
    }

    /// Бросить кости из источника случайности.
    pub fn roll(&mut self, actor: PlayerId, rng: &mut dyn DiceSource) -> Result<RollResult, EngineError> {
        self.ensure_can_roll(actor)?;
        let dice = roll_dice(rng);
        self.apply_roll(actor, dice)
    }

    /// Применить уже выпавший бросок.
    ///
    /// Ход закрывается, если рука «с комбинацией» или это третья попытка.
    pub fn apply_roll(&mut self, actor: PlayerId, dice: Dice) -> Result<RollResult, EngineError> {
        self.ensure_can_roll(actor)?;

        self.tries += 1;
        self.last_roll = Some(dice);
        let hand = evaluate(&dice);

        let finalized = hand.kind.is_scoring() || self.tries >= MAX_TRIES;
        if finalized {
            self.final_hand = Some(hand.clone());
        }

        Ok(RollResult {
            dice,
            hand,
            attempt: self.tries,
            finalized,
        })
    }

    /// STOP: зафиксировать руку последнего броска (без переброса).
    pub fn stop(&mut self, actor: PlayerId) -> Result<(Dice, Hand), EngineError> {
        if actor != self.actor_id {
            return Err(EngineError::NotYourTurn(actor));
        }
        if self.is_final() {
            return Err(EngineError::AlreadyFinalized);
        }
        let dice = self.last_roll.ok_or(EngineError::NothingToStop)?;

        let hand = evaluate(&dice);
        self.final_hand = Some(hand.clone());
        self.stopped = true;
        Ok((dice, hand))
    }
}
