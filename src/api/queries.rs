use serde::{Deserialize, Serialize};

use crate::domain::rules::MAX_TRIES;
use crate::domain::SessionKey;
use crate::engine::GameSession;

use super::dto::{HistoryDto, SessionViewDto, TurnDto};

/// Запросы "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Query {
    /// Статус сессии в канале.
    Status { session_key: SessionKey },

    /// Журнал текущего и прошлого раунда.
    History { session_key: SessionKey },

    /// Ключи всех живых сессий.
    ListSessions,
}

/// Результат запроса "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum QueryResponse {
    Session(SessionViewDto),
    History(HistoryDto),
    Sessions(Vec<SessionKey>),
}

pub fn build_history(game: &GameSession) -> HistoryDto {
    HistoryDto {
        session_key: game.session_key,
        round_number: game.round_number,
        current: game.history.clone(),
        last_round: game.last_round.clone(),
    }
}

/// Сформировать снимок сессии.
pub fn build_session_view(game: &GameSession) -> SessionViewDto {
    let turn = game
        .current_round
        .as_ref()
        .filter(|round| !round.is_final())
        .map(|round| TurnDto {
            actor_id: round.actor_id,
            role: round.role,
            tries: round.tries,
            max_tries: MAX_TRIES,
        });

    SessionViewDto {
        session_key: game.session_key,
        phase: game.phase,
        host_id: game.host_id,
        participants: game.participants.clone(),
        parent_id: game.parent_id,
        child_order: game.child_order.clone(),
        bets: game.ledger.snapshot(&game.child_order),
        parent_hand: game.parent_hand.clone(),
        turn,
        round_number: game.round_number,
        bet_step: game.rules.bet_step,
        max_bet: game.rules.max_bet,
    }
}
