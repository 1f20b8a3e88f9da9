use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PlayerId, SessionKey};
use crate::engine::phase::Phase;

/// Ошибки движка чинчиро. Все – локальные синхронные отказы, без ретраев.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Действие недоступно в фазе {0:?}")]
    InvalidPhase(Phase),

    #[error("Сейчас не ход игрока с id={0}")]
    NotYourTurn(PlayerId),

    #[error("Ход уже завершён, бросок зафиксирован")]
    AlreadyFinalized,

    #[error("Попытки исчерпаны (максимум 3 броска)")]
    RetryBudgetExhausted,

    #[error("У игрока {0} нет прав на это действие")]
    Unauthorized(PlayerId),

    #[error("Недостаточно средств: нужно {required}, доступно {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Игрок {0} не участвует в игре")]
    NotAParticipant(PlayerId),

    #[error("Бросок уже обрабатывается")]
    Busy,

    #[error("Остановиться можно только после первого броска")]
    NothingToStop,

    #[error("Игрок {0} уже в лобби")]
    AlreadyJoined(PlayerId),

    #[error("Нужно минимум {required} участников, сейчас {actual}")]
    NotEnoughParticipants { required: usize, actual: usize },

    #[error("Недопустимое значение кости: {0}")]
    InvalidDice(u8),

    #[error("Сессия {0} не найдена")]
    SessionNotFound(SessionKey),

    #[error("Сессия {0} уже существует")]
    SessionAlreadyExists(SessionKey),

    #[error("Внутренняя ошибка: {0}")]
    Internal(&'static str),
}

/// Машиночитаемый код ошибки для транспорта.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidPhase,
    NotYourTurn,
    AlreadyFinalized,
    RetryBudgetExhausted,
    Unauthorized,
    InsufficientFunds,
    NotAParticipant,
    Busy,
    NothingToStop,
    AlreadyJoined,
    NotEnoughParticipants,
    InvalidDice,
    SessionNotFound,
    SessionAlreadyExists,
    Internal,
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::InvalidPhase(_) => ErrorCode::InvalidPhase,
            EngineError::NotYourTurn(_) => ErrorCode::NotYourTurn,
            EngineError::AlreadyFinalized => ErrorCode::AlreadyFinalized,
            EngineError::RetryBudgetExhausted => ErrorCode::RetryBudgetExhausted,
            EngineError::Unauthorized(_) => ErrorCode::Unauthorized,
            EngineError::InsufficientFunds { .. } => ErrorCode::InsufficientFunds,
            EngineError::NotAParticipant(_) => ErrorCode::NotAParticipant,
            EngineError::Busy => ErrorCode::Busy,
            EngineError::NothingToStop => ErrorCode::NothingToStop,
            EngineError::AlreadyJoined(_) => ErrorCode::AlreadyJoined,
            EngineError::NotEnoughParticipants { .. } => ErrorCode::NotEnoughParticipants,
            EngineError::InvalidDice(_) => ErrorCode::InvalidDice,
            EngineError::SessionNotFound(_) => ErrorCode::SessionNotFound,
            EngineError::SessionAlreadyExists(_) => ErrorCode::SessionAlreadyExists,
            EngineError::Internal(_) => ErrorCode::Internal,
        }
    }
}
