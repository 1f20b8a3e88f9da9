use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::PlayerId;
use crate::engine::errors::EngineError;
use crate::engine::phase::Phase;

/// Строка панели ставок для одного ребёнка.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BetLine {
    pub player_id: PlayerId,
    pub confirmed: Chips,
    /// Незафиксированное значение, если ребёнок его менял после подтверждения.
    pub provisional: Option<Chips>,
    /// Что показывать: provisional, иначе confirmed.
    pub displayed: Chips,
}

/// Ставки раунда: черновые (provisional) и подтверждённые (confirmed).
///
/// После `close()` любые изменения отклоняются – подтверждённые ставки
/// используются только для расчёта.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BettingLedger {
    provisional: BTreeMap<PlayerId, Chips>,
    confirmed: BTreeMap<PlayerId, Chips>,
    max_bet: Chips,
    closed: bool,
}

impl BettingLedger {
    pub fn new(max_bet: Chips) -> Self {
        Self {
            provisional: BTreeMap::new(),
            confirmed: BTreeMap::new(),
            max_bet,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.closed {
            // Приём ставок закрывается ровно при переходе к броску родителя.
            return Err(EngineError::InvalidPhase(Phase::ParentRolling));
        }
        Ok(())
    }

    /// Текущее отображаемое значение: черновик, иначе подтверждённая ставка.
    pub fn displayed(&self, child: PlayerId) -> Chips {
        self.provisional
            .get(&child)
            .or_else(|| self.confirmed.get(&child))
            .copied()
            .unwrap_or(Chips::ZERO)
    }

    /// Изменить черновую ставку на `delta`, зажимая в `[0, max_bet]`.
    pub fn adjust(&mut self, child: PlayerId, delta: i64) -> Result<Chips, EngineError> {
        self.ensure_open()?;
        let next = self.displayed(child).shifted_clamped(delta, self.max_bet);
        self.provisional.insert(child, next);
        Ok(next)
    }

    /// Сбросить черновик в 0.
    pub fn clear(&mut self, child: PlayerId) -> Result<(), EngineError> {
        self.ensure_open()?;
        self.provisional.insert(child, Chips::ZERO);
        Ok(())
    }

    /// Перенести черновик (или прежнюю подтверждённую ставку) в confirmed.
    pub fn confirm(&mut self, child: PlayerId) -> Result<Chips, EngineError> {
        self.ensure_open()?;
        let amount = self.displayed(child);
        self.confirmed.insert(child, amount);
        self.provisional.remove(&child);
        Ok(amount)
    }

    /// Подтверждённая ставка ребёнка (0, если не подтверждал).
    pub fn confirmed_stake(&self, child: PlayerId) -> Chips {
        self.confirmed.get(&child).copied().unwrap_or(Chips::ZERO)
    }

    /// Закрыть приём ставок. Черновики больше не учитываются.
    pub fn close(&mut self) {
        self.closed = true;
        self.provisional.clear();
    }

    /// Полный сброс при ротации раунда.
    pub fn reset(&mut self) {
        self.provisional.clear();
        self.confirmed.clear();
        self.closed = false;
    }

    /// Строка панели для одного ребёнка.
    pub fn line(&self, player_id: PlayerId) -> BetLine {
        BetLine {
            player_id,
            confirmed: self.confirmed_stake(player_id),
            provisional: self.provisional.get(&player_id).copied(),
            displayed: self.displayed(player_id),
        }
    }

    /// Снимок панели ставок в порядке `children`.
    pub fn snapshot(&self, children: &[PlayerId]) -> Vec<BetLine> {
        children.iter().map(|&player_id| self.line(player_id)).collect()
    }
}
