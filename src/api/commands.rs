use serde::{Deserialize, Serialize};

use crate::domain::{PlayerId, SessionKey};

/// Команда верхнего уровня. Транспорт (кнопки / текстовые команды чата)
/// превращает ввод пользователя в одну из них.
///
/// У каждой команды есть ключ сессии и актёр, который её выполняет.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Command {
    /// Открыть лобби в канале. Хост сам в игру не входит.
    OpenLobby { session_key: SessionKey, host_id: PlayerId },

    Join { session_key: SessionKey, player_id: PlayerId },

    Leave { session_key: SessionKey, player_id: PlayerId },

    /// Хост запускает выбор родителя.
    StartParentSelection { session_key: SessionKey, actor: PlayerId },

    /// Кнопки +/- панели ставок.
    AdjustBet {
        session_key: SessionKey,
        actor: PlayerId,
        delta: i64,
    },

    /// Кнопка "сбросить": временная ставка = 0.
    ClearBet { session_key: SessionKey, actor: PlayerId },

    ConfirmBet { session_key: SessionKey, actor: PlayerId },

    /// Родитель закрывает ставки и бросает первым.
    StartParentRoll { session_key: SessionKey, actor: PlayerId },

    Roll { session_key: SessionKey, actor: PlayerId },

    Stop { session_key: SessionKey, actor: PlayerId },

    /// Завершить игру (хост или текущий родитель).
    End { session_key: SessionKey, actor: PlayerId },
}

impl Command {
    pub fn session_key(&self) -> SessionKey {
        match *self {
            Command::OpenLobby { session_key, .. }
            | Command::Join { session_key, .. }
            | Command::Leave { session_key, .. }
            | Command::StartParentSelection { session_key, .. }
            | Command::AdjustBet { session_key, .. }
            | Command::ClearBet { session_key, .. }
            | Command::ConfirmBet { session_key, .. }
            | Command::StartParentRoll { session_key, .. }
            | Command::Roll { session_key, .. }
            | Command::Stop { session_key, .. }
            | Command::End { session_key, .. } => session_key,
        }
    }

    /// Кто выполняет команду.
    pub fn actor(&self) -> PlayerId {
        match *self {
            Command::OpenLobby { host_id, .. } => host_id,
            Command::Join { player_id, .. } | Command::Leave { player_id, .. } => player_id,
            Command::StartParentSelection { actor, .. }
            | Command::AdjustBet { actor, .. }
            | Command::ClearBet { actor, .. }
            | Command::ConfirmBet { actor, .. }
            | Command::StartParentRoll { actor, .. }
            | Command::Roll { actor, .. }
            | Command::Stop { actor, .. }
            | Command::End { actor, .. } => actor,
        }
    }
}
