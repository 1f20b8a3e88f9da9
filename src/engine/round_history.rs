use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::dice::Dice;
use crate::domain::hand::{Hand, Outcome};
use crate::domain::{PlayerId, Role, RoundNumber, SessionKey};
use crate::engine::phase::Phase;
use crate::engine::settlement::Transfer;

/// Тип события в раунде.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoundEventKind {
    /// Лобби открыто хостом.
    LobbyOpened { session_key: SessionKey, host_id: PlayerId },

    PlayerJoined { player_id: PlayerId },

    PlayerLeft { player_id: PlayerId },

    /// Бросок при выборе родителя.
    SelectionRolled { player_id: PlayerId, dice: Dice, hand: Hand },

    ParentChosen { parent_id: PlayerId },

    BetConfirmed { player_id: PlayerId, amount: Chips },

    /// Родитель начал ход – ставки закрыты.
    BettingClosed,

    Rolled {
        player_id: PlayerId,
        role: Role,
        attempt: u8,
        dice: Dice,
        hand: Hand,
        finalized: bool,
    },

    Stopped { player_id: PlayerId, role: Role, hand: Hand },

    /// Итог ребёнка против родителя.
    ChildResolved { player_id: PlayerId, outcome: Outcome },

    TransferIssued(Transfer),

    PhaseChanged { from: Phase, to: Phase },

    /// Новый раунд, новый родитель.
    RoundRotated { round: RoundNumber, parent_id: PlayerId },

    SessionEnded { by: PlayerId },
}

/// Событие с порядковым номером.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundEvent {
    pub index: u32,
    pub kind: RoundEventKind,
}

/// Журнал раунда. При ротации уходит в `GameSession::last_round`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundHistory {
    pub events: Vec<RoundEvent>,
}

impl RoundHistory {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, kind: RoundEventKind) {
        let index = u32::try_from(self.events.len()).unwrap_or(u32::MAX);
        self.events.push(RoundEvent { index, kind });
    }

    pub fn transfers(&self) -> impl Iterator<Item = &Transfer> {
        self.events.iter().filter_map(|e| match &e.kind {
            RoundEventKind::TransferIssued(t) => Some(t),
            _ => None,
        })
    }
}
