//! Контракты внешних коллабораторов: отрисовка броска и применение переводов.
//!
//! Реализации – в `infra::sinks`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::dice::Dice;
use crate::domain::{PlayerId, Role, SessionKey};
use crate::engine::settlement::Transfer;

/// Ссылка на готовый артефакт (файл, id сообщения и т.п.).
pub type ArtifactRef = String;

/// Для какого этапа делается бросок.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RollStage {
    ParentSelection,
    Turn(Role),
}

/// Контекст отрисовки броска.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderContext {
    pub session_key: SessionKey,
    pub actor_id: PlayerId,
    pub actor_label: String,
    pub stage: RollStage,
    pub attempt: u8,
    /// Рука зафиксирована через STOP (кости не бросались заново).
    pub stopped: bool,
}

/// Ошибка коллаборатора. Движок её только логирует.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("Получатель недоступен: {0}")]
    Unavailable(String),

    #[error("Перевод отклонён: {0}")]
    Rejected(String),
}

/// Отрисовка броска. Fire-and-forget: свои ошибки реализация глотает сама.
#[async_trait]
pub trait RenderSink: Send + Sync {
    async fn render_roll(&self, dice: Dice, context: RenderContext) -> Option<ArtifactRef>;
}

/// Применение перевода во внешней экономике / собственном балансе.
#[async_trait]
pub trait SettlementSink: Send + Sync {
    async fn apply_transfer(&self, transfer: &Transfer) -> Result<(), SinkError>;
}
