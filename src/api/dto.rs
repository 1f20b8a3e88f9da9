use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::hand::Hand;
use crate::domain::{PlayerId, Role, RoundNumber, SessionKey};
use crate::engine::{BetLine, ParentSelection, Phase, RollOutcome, RoundHistory};

/// Текущий ход: кто бросает и сколько попыток уже потрачено.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnDto {
    pub actor_id: PlayerId,
    pub role: Role,
    pub tries: u8,
    pub max_tries: u8,
}

/// Снимок сессии для статус-сообщения / панели.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionViewDto {
    pub session_key: SessionKey,
    pub phase: Phase,
    pub host_id: PlayerId,
    pub participants: Vec<PlayerId>,
    pub parent_id: Option<PlayerId>,
    pub child_order: Vec<PlayerId>,
    /// Панель ставок по детям в порядке хода.
    pub bets: Vec<BetLine>,
    pub parent_hand: Option<Hand>,
    /// `None`, если сейчас никто не бросает.
    pub turn: Option<TurnDto>,
    pub round_number: RoundNumber,
    pub bet_step: Chips,
    pub max_bet: Chips,
}

/// Журналы событий сессии: текущий раунд и последний завершённый.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryDto {
    pub session_key: SessionKey,
    pub round_number: RoundNumber,
    pub current: RoundHistory,
    pub last_round: Option<RoundHistory>,
}

/// Ответ на команду.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandResponse {
    /// Состояние сессии после команды (open / join / старт броска родителя).
    Session(SessionViewDto),

    /// Игрок вышел; при `remaining == 0` сессия закрыта.
    Left { player_id: PlayerId, remaining: usize },

    ParentSelected(ParentSelection),

    /// Строка панели ставок после +/-, сброса или подтверждения.
    Bet(BetLine),

    Rolled(RollOutcome),

    Ended { session_key: SessionKey },
}
