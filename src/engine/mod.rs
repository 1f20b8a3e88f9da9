//! Движок чинчиро: фазы сессии, ходы с бросками, ставки, расчёты, ротация родителя.
//!
//! Высокоуровневые объекты:
//!   - `GameSession` – синхронный агрегат одной игры (все инварианты здесь);
//!   - `SessionRegistry` – процессный реестр сессий по ключу канала;
//!   - `TurnScheduler` – async-обвязка: блокировка сессии, in-flight флаг,
//!     вызовы render / settlement коллабораторов.

pub mod betting;
pub mod errors;
pub mod game_loop;
pub mod phase;
pub mod positions;
pub mod round;
pub mod round_history;
pub mod scheduler;
pub mod session_registry;
pub mod settlement;
pub mod sinks;
pub mod validation;

pub use betting::{BetLine, BettingLedger};
pub use errors::{EngineError, ErrorCode};
pub use game_loop::{
    GameSession, NextTurn, ParentSelection, RollReport, RoundEnd, SelectionRoll, TurnResolution,
};
pub use phase::Phase;
pub use round::{RollResult, RoundSession};
pub use round_history::{RoundEvent, RoundEventKind, RoundHistory};
pub use scheduler::{Delivery, RollOutcome, TurnScheduler};
pub use session_registry::{FlightGuard, SessionRegistry, SessionSlot};
pub use settlement::{AutoSettlement, ChildSettlement, ParentResolution, SettlementEngine, Transfer};
pub use sinks::{ArtifactRef, RenderContext, RenderSink, RollStage, SettlementSink, SinkError};

use crate::domain::dice::{Dice, DIE_FACES};

/// Источник случайности для костей.
/// Реализации – в infra (обёртки над `rand` и скриптованный вариант для тестов).
pub trait DiceSource: Send {
    /// Одна кость, 1..=6.
    fn roll_die(&mut self) -> u8;

    /// Равномерный индекс в `0..len` (`len > 0`).
    fn choose_index(&mut self, len: usize) -> usize;
}

/// Бросить три кости. Значения вне 1..=6 зажимаются в диапазон.
pub fn roll_dice(rng: &mut dyn DiceSource) -> Dice {
    let mut face = || rng.roll_die().clamp(1, DIE_FACES);
    Dice([face(), face(), face()])
}
