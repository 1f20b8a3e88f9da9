use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::chips::Chips;
use crate::domain::hand::{Hand, HandKind, Outcome};
use crate::domain::{PlayerId, RoundNumber};
use crate::engine::betting::BettingLedger;
use crate::engine::errors::EngineError;
use crate::eval::compare;

/// Перевод между игроками. Нулевые переводы не создаются.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transfer {
    pub from: PlayerId,
    pub to: PlayerId,
    pub amount: Chips,
}

impl Transfer {
    pub fn new(from: PlayerId, to: PlayerId, amount: Chips) -> Option<Self> {
        if amount.is_zero() {
            None
        } else {
            Some(Self { from, to, amount })
        }
    }
}

/// Авто-расчёт раунда по руке родителя.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutoSettlement {
    pub parent_wins: bool,
    pub hand: Hand,
    pub transfers: Vec<Transfer>,
}

/// Что делать после фиксации руки родителя.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ParentResolution {
    /// Раунд закрыт без ходов детей.
    Auto(AutoSettlement),
    /// Рука родителя становится планкой для детей.
    Contest,
}

/// Расчёт одного ребёнка против родителя.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChildSettlement {
    pub child: PlayerId,
    pub outcome: Outcome,
    pub stake: Chips,
    pub transfer: Option<Transfer>,
}

/// Движок расчётов одного раунда.
///
/// Гарантирует не более одного расчёта на пару (раунд, ребёнок).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementEngine {
    round: RoundNumber,
    settled: BTreeSet<PlayerId>,
    auto_resolved: bool,
}

impl SettlementEngine {
    pub fn new(round: RoundNumber) -> Self {
        Self {
            round,
            settled: BTreeSet::new(),
            auto_resolved: false,
        }
    }

    /// Новый раунд: забываем, кого уже рассчитали.
    pub fn start_round(&mut self, round: RoundNumber) {
        self.round = round;
        self.settled.clear();
        self.auto_resolved = false;
    }

    /// Решить по руке родителя: авто-расчёт (4-5-6, тройка, 1-2-3) или ходы детей.
    pub fn resolve_parent(
        &mut self,
        parent: PlayerId,
        hand: &Hand,
        children: &[PlayerId],
        ledger: &BettingLedger,
    ) -> Result<ParentResolution, EngineError> {
        let parent_wins = match hand.kind {
            HandKind::Shigoro | HandKind::Triple => true,
            HandKind::Hifumi => false,
            HandKind::Point | HandKind::NoHand => return Ok(ParentResolution::Contest),
        };

        if self.auto_resolved || !self.settled.is_empty() {
            return Err(EngineError::Internal("раунд уже рассчитан"));
        }
        self.auto_resolved = true;

        let mut transfers = Vec::new();
        for &child in children {
            self.settled.insert(child);
            let stake = ledger.confirmed_stake(child);
            let transfer = if parent_wins {
                Transfer::new(child, parent, stake)
            } else {
                Transfer::new(parent, child, stake)
            };
            transfers.extend(transfer);
        }

        Ok(ParentResolution::Auto(AutoSettlement {
            parent_wins,
            hand: hand.clone(),
            transfers,
        }))
    }

    /// Рассчитать ребёнка сразу после фиксации его руки.
    pub fn settle_child(
        &mut self,
        parent: PlayerId,
        parent_hand: &Hand,
        child: PlayerId,
        child_hand: &Hand,
        stake: Chips,
    ) -> Result<ChildSettlement, EngineError> {
        if self.auto_resolved || !self.settled.insert(child) {
            warn!(round = self.round, child, "duplicate child settlement");
            return Err(EngineError::Internal("ребёнок уже рассчитан в этом раунде"));
        }

        let outcome = compare(parent_hand, child_hand);
        let transfer = match outcome {
            Outcome::Draw => None,
            Outcome::ChildWins => Transfer::new(parent, child, stake),
            Outcome::ChildLoses => Transfer::new(child, parent, stake),
        };

        Ok(ChildSettlement {
            child,
            outcome,
            stake,
            transfer,
        })
    }
}
