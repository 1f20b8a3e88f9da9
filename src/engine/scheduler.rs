use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::dice::Dice;
use crate::domain::{PlayerId, SessionKey};
use crate::engine::errors::EngineError;
use crate::engine::game_loop::{ParentSelection, RollReport};
use crate::engine::session_registry::SessionSlot;
use crate::engine::settlement::Transfer;
use crate::engine::sinks::{RenderContext, RenderSink, RollStage, SettlementSink};
use crate::infra::mapping::PlayerNameResolver;

/// Результат доставки одного перевода в settlement sink.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Delivery {
    pub transfer: Transfer,
    pub delivered: bool,
}

/// Бросок / STOP вместе с результатами доставки переводов.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RollOutcome {
    pub report: RollReport,
    pub deliveries: Vec<Delivery>,
}

/// Async-обвязка над `GameSession`.
///
/// Все действия с бросками идут так: in-flight флаг → мьютекс сессии →
/// синхронный шаг движка → render → settlement. Мьютекс держится до конца,
/// поэтому прогресс хода строго последовательный.
pub struct TurnScheduler {
    render: Arc<dyn RenderSink>,
    settlement: Arc<dyn SettlementSink>,
    names: Arc<dyn PlayerNameResolver>,
}

impl TurnScheduler {
    pub fn new(
        render: Arc<dyn RenderSink>,
        settlement: Arc<dyn SettlementSink>,
        names: Arc<dyn PlayerNameResolver>,
    ) -> Self {
        Self {
            render,
            settlement,
            names,
        }
    }

    /// Подменить резолвер имён (для подписей на отрисовке).
    pub fn with_names(mut self, names: Arc<dyn PlayerNameResolver>) -> Self {
        self.names = names;
        self
    }

    /// Выбор родителя: по броску на участника, каждый бросок отрисовывается.
    pub async fn select_parent(
        &self,
        slot: &SessionSlot,
        actor: PlayerId,
    ) -> Result<ParentSelection, EngineError> {
        let _flight = slot.begin_flight()?;
        let mut game = slot.lock().await;

        let selection = game.select_parent(actor)?;
        for roll in &selection.rolls {
            self.show_roll(slot.key(), roll.player_id, roll.dice, RollStage::ParentSelection, 1, false)
                .await;
        }
        Ok(selection)
    }

    pub async fn roll(&self, slot: &SessionSlot, actor: PlayerId) -> Result<RollOutcome, EngineError> {
        let _flight = slot.begin_flight()?;
        let mut game = slot.lock().await;

        let report = game.roll(actor)?;
        self.complete(slot.key(), report).await
    }

    pub async fn stop(&self, slot: &SessionSlot, actor: PlayerId) -> Result<RollOutcome, EngineError> {
        let _flight = slot.begin_flight()?;
        let mut game = slot.lock().await;

        let report = game.stop(actor)?;
        self.complete(slot.key(), report).await
    }

    async fn complete(&self, key: SessionKey, report: RollReport) -> Result<RollOutcome, EngineError> {
        self.show_roll(
            key,
            report.actor_id,
            report.dice,
            RollStage::Turn(report.role),
            report.attempt,
            report.stopped,
        )
        .await;

        let deliveries = self.emit(key, report.transfers()).await;
        Ok(RollOutcome { report, deliveries })
    }

    async fn show_roll(
        &self,
        key: SessionKey,
        actor_id: PlayerId,
        dice: Dice,
        stage: RollStage,
        attempt: u8,
        stopped: bool,
    ) {
        let context = RenderContext {
            session_key: key,
            actor_id,
            actor_label: self.names.resolve_name(actor_id),
            stage,
            attempt,
            stopped,
        };
        // Артефакт нужен только транспорту, движку он не важен.
        let _ = self.render.render_roll(dice, context).await;
    }

    /// Отправить переводы. Сбой перевода логируется, раунд всё равно идёт дальше.
    pub async fn emit(&self, key: SessionKey, transfers: Vec<Transfer>) -> Vec<Delivery> {
        let mut deliveries = Vec::with_capacity(transfers.len());

        for transfer in transfers {
            let delivered = match self.settlement.apply_transfer(&transfer).await {
                Ok(()) => {
                    info!(
                        session = key,
                        from = transfer.from,
                        to = transfer.to,
                        amount = transfer.amount.0,
                        "transfer applied"
                    );
                    true
                }
                Err(err) => {
                    warn!(
                        session = key,
                        from = transfer.from,
                        to = transfer.to,
                        amount = transfer.amount.0,
                        error = %err,
                        "transfer failed, not retried"
                    );
                    false
                }
            };
            deliveries.push(Delivery {
                transfer,
                delivered,
            });
        }

        deliveries
    }
}
