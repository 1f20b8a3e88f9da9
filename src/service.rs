//! Сервис сессий: реестр игр по каналам + обработка команд транспорта.
//!
//! Все команды идут через `ChinchiroService`. Каждая команда отмечает
//! активность сессии по `ActivityClock`; броски и STOP проходят через
//! `TurnScheduler`, остальные команды просто берут мьютекс сессии.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};

use crate::api::{
    build_history, build_session_view, ApiError, Command, CommandResponse, HistoryDto, Query,
    QueryResponse, SessionViewDto,
};
use crate::config::ServiceConfig;
use crate::domain::chips::Chips;
use crate::domain::{PlayerId, SessionKey};
use crate::engine::{
    BetLine, DiceSource, EngineError, GameSession, ParentSelection, RenderSink, RollOutcome,
    RoundEnd, SessionRegistry, SessionSlot, SettlementSink, TurnScheduler,
};
use crate::infra::mapping::{DefaultNameResolver, PlayerNameResolver};
use crate::infra::persistence::{BalanceStore, JsonFileBalanceStore, StoreError};
use crate::infra::rng::SystemRng;
use crate::infra::sinks::{LedgerSettlementSink, TemplateSettlementSink};
use crate::time_ctrl::{ActivityClock, SystemClock};

/// Фабрика RNG для новых сессий.
pub type RngFactory = Arc<dyn Fn() -> Box<dyn DiceSource> + Send + Sync>;

pub struct ChinchiroService {
    config: ServiceConfig,
    registry: SessionRegistry,
    scheduler: TurnScheduler,
    balances: Option<Arc<dyn BalanceStore>>,
    clock: Arc<dyn ActivityClock>,
    rng_factory: RngFactory,
}

impl ChinchiroService {
    /// Сервис с произвольным settlement sink (внешняя экономика и т.п.).
    pub fn new(
        config: ServiceConfig,
        render: Arc<dyn RenderSink>,
        settlement: Arc<dyn SettlementSink>,
    ) -> Self {
        let names: Arc<dyn PlayerNameResolver> = Arc::new(DefaultNameResolver);
        Self {
            config,
            registry: SessionRegistry::new(),
            scheduler: TurnScheduler::new(render, settlement, names),
            balances: None,
            clock: Arc::new(SystemClock),
            rng_factory: Arc::new(|| Box::new(SystemRng) as Box<dyn DiceSource>),
        }
    }

    /// Сервис со своим леджером: переводы применяются к `store`,
    /// подтверждение ставки проверяет баланс ребёнка.
    pub fn with_ledger(
        config: ServiceConfig,
        render: Arc<dyn RenderSink>,
        store: Arc<dyn BalanceStore>,
    ) -> Self {
        let settlement = Arc::new(LedgerSettlementSink::new(Arc::clone(&store)));
        let mut service = Self::new(config, render, settlement);
        service.balances = Some(store);
        service
    }

    /// Собрать сервис по конфигу.
    ///
    /// Если задан `balances_path` – леджер в JSON-файле. Иначе переводы
    /// публикуются строками по шаблону, и вызывающий получает приёмник канала.
    pub fn from_config(
        config: ServiceConfig,
        render: Arc<dyn RenderSink>,
    ) -> Result<(Self, Option<UnboundedReceiver<String>>), StoreError> {
        match config.balances_path.clone() {
            Some(path) => {
                let store = JsonFileBalanceStore::open(path, config.starting_balance)?;
                info!(path = %store.path().display(), "using file balance ledger");
                Ok((Self::with_ledger(config, render, Arc::new(store)), None))
            }
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                let sink = Arc::new(TemplateSettlementSink::new(
                    config.transfer_template.clone(),
                    tx,
                ));
                Ok((Self::new(config, render, sink), Some(rx)))
            }
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn ActivityClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_rng_factory(mut self, factory: RngFactory) -> Self {
        self.rng_factory = factory;
        self
    }

    pub fn with_names(mut self, names: Arc<dyn PlayerNameResolver>) -> Self {
        self.scheduler = self.scheduler.with_names(names);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn balances(&self) -> Option<&Arc<dyn BalanceStore>> {
        self.balances.as_ref()
    }

    /// Найти сессию и отметить активность.
    async fn slot(&self, key: SessionKey) -> Result<Arc<SessionSlot>, EngineError> {
        let slot = self.registry.get(key).await?;
        slot.touch(self.clock.now_secs());
        Ok(slot)
    }

    // ------------------------------------------------------------------
    // Лобби
    // ------------------------------------------------------------------

    pub async fn open_lobby(
        &self,
        key: SessionKey,
        host_id: PlayerId,
    ) -> Result<SessionViewDto, EngineError> {
        let rng = (self.rng_factory)();
        self.open_lobby_with_rng(key, host_id, rng).await
    }

    /// Открыть лобби с конкретным источником костей (тесты, реплеи).
    pub async fn open_lobby_with_rng(
        &self,
        key: SessionKey,
        host_id: PlayerId,
        rng: Box<dyn DiceSource>,
    ) -> Result<SessionViewDto, EngineError> {
        let game = GameSession::new(key, host_id, self.config.rules.clone(), rng);
        let view = build_session_view(&game);
        self.registry
            .insert_new(SessionSlot::new(game, self.clock.now_secs()))
            .await?;
        debug!(session = key, host_id, "lobby opened");
        Ok(view)
    }

    pub async fn join(
        &self,
        key: SessionKey,
        player_id: PlayerId,
    ) -> Result<SessionViewDto, EngineError> {
        let slot = self.slot(key).await?;
        let mut game = slot.lock().await;
        game.join(player_id)?;
        Ok(build_session_view(&game))
    }

    /// Выйти из лобби. Пустое лобби удаляется из реестра.
    pub async fn leave(&self, key: SessionKey, player_id: PlayerId) -> Result<usize, EngineError> {
        let slot = self.slot(key).await?;
        let remaining = {
            let mut game = slot.lock().await;
            game.leave(player_id)?
        };

        if remaining == 0 {
            self.registry.remove_slot(&slot).await;
            info!(session = key, "lobby emptied, session closed");
        }
        Ok(remaining)
    }

    pub async fn start_parent_selection(
        &self,
        key: SessionKey,
        actor: PlayerId,
    ) -> Result<ParentSelection, EngineError> {
        let slot = self.slot(key).await?;
        self.scheduler.select_parent(&slot, actor).await
    }

    // ------------------------------------------------------------------
    // Ставки
    // ------------------------------------------------------------------

    pub async fn adjust_bet(
        &self,
        key: SessionKey,
        actor: PlayerId,
        delta: i64,
    ) -> Result<BetLine, EngineError> {
        let slot = self.slot(key).await?;
        let mut game = slot.lock().await;
        game.adjust_bet(actor, delta)?;
        debug!(session = key, player_id = actor, delta, "bet adjusted");
        Ok(game.ledger.line(actor))
    }

    pub async fn clear_bet(&self, key: SessionKey, actor: PlayerId) -> Result<BetLine, EngineError> {
        let slot = self.slot(key).await?;
        let mut game = slot.lock().await;
        game.clear_bet(actor)?;
        Ok(game.ledger.line(actor))
    }

    /// Подтвердить ставку. С леджером ставка не может превышать баланс.
    pub async fn confirm_bet(
        &self,
        key: SessionKey,
        actor: PlayerId,
    ) -> Result<BetLine, EngineError> {
        let slot = self.slot(key).await?;
        let available = self.available_balance(actor)?;
        let mut game = slot.lock().await;
        game.confirm_bet_within(actor, available)?;
        Ok(game.ledger.line(actor))
    }

    fn available_balance(&self, player_id: PlayerId) -> Result<Option<Chips>, EngineError> {
        let Some(store) = &self.balances else {
            return Ok(None);
        };
        store.balance(player_id).map(Some).map_err(|err| {
            warn!(player_id, error = %err, "balance lookup failed");
            EngineError::Internal("хранилище балансов недоступно")
        })
    }

    pub async fn start_parent_roll(
        &self,
        key: SessionKey,
        actor: PlayerId,
    ) -> Result<SessionViewDto, EngineError> {
        let slot = self.slot(key).await?;
        let mut game = slot.lock().await;
        game.start_parent_roll(actor)?;
        Ok(build_session_view(&game))
    }

    // ------------------------------------------------------------------
    // Броски
    // ------------------------------------------------------------------

    pub async fn roll(&self, key: SessionKey, actor: PlayerId) -> Result<RollOutcome, EngineError> {
        let slot = self.slot(key).await?;
        let outcome = self.scheduler.roll(&slot, actor).await?;
        self.close_if_emptied(&slot, &outcome).await;
        Ok(outcome)
    }

    pub async fn stop(&self, key: SessionKey, actor: PlayerId) -> Result<RollOutcome, EngineError> {
        let slot = self.slot(key).await?;
        let outcome = self.scheduler.stop(&slot, actor).await?;
        self.close_if_emptied(&slot, &outcome).await;
        Ok(outcome)
    }

    async fn close_if_emptied(&self, slot: &Arc<SessionSlot>, outcome: &RollOutcome) {
        if outcome.report.round_end() == Some(&RoundEnd::Emptied) {
            self.registry.remove_slot(slot).await;
        }
    }

    // ------------------------------------------------------------------
    // Статус / завершение
    // ------------------------------------------------------------------

    /// Снимок сессии. Активность не отмечает.
    pub async fn status(&self, key: SessionKey) -> Result<SessionViewDto, EngineError> {
        let slot = self.registry.get(key).await?;
        let game = slot.lock().await;
        Ok(build_session_view(&game))
    }

    /// Журналы раундов. Активность не трогает.
    pub async fn history(&self, key: SessionKey) -> Result<HistoryDto, EngineError> {
        let slot = self.registry.get(key).await?;
        let game = slot.lock().await;
        Ok(build_history(&game))
    }

    /// Завершить игру и убрать сессию из реестра.
    pub async fn end(&self, key: SessionKey, actor: PlayerId) -> Result<(), EngineError> {
        let slot = self.slot(key).await?;
        {
            let mut game = slot.lock().await;
            game.end(actor)?;
        }
        self.registry.remove_slot(&slot).await;
        info!(session = key, by = actor, "session ended");
        Ok(())
    }

    /// Закрыть сессии, простоявшие дольше `idle_expiry_secs`.
    pub async fn sweep_idle(&self) -> Vec<SessionKey> {
        let expired = self
            .registry
            .sweep_idle(self.clock.now_secs(), &self.config.idle_policy())
            .await;
        if !expired.is_empty() {
            info!(count = expired.len(), "idle sessions closed");
        }
        expired
    }

    // ------------------------------------------------------------------
    // API
    // ------------------------------------------------------------------

    pub async fn handle(&self, command: Command) -> Result<CommandResponse, ApiError> {
        let response = match command {
            Command::OpenLobby {
                session_key,
                host_id,
            } => CommandResponse::Session(self.open_lobby(session_key, host_id).await?),
            Command::Join {
                session_key,
                player_id,
            } => CommandResponse::Session(self.join(session_key, player_id).await?),
            Command::Leave {
                session_key,
                player_id,
            } => CommandResponse::Left {
                player_id,
                remaining: self.leave(session_key, player_id).await?,
            },
            Command::StartParentSelection { session_key, actor } => CommandResponse::ParentSelected(
                self.start_parent_selection(session_key, actor).await?,
            ),
            Command::AdjustBet {
                session_key,
                actor,
                delta,
            } => CommandResponse::Bet(self.adjust_bet(session_key, actor, delta).await?),
            Command::ClearBet { session_key, actor } => {
                CommandResponse::Bet(self.clear_bet(session_key, actor).await?)
            }
            Command::ConfirmBet { session_key, actor } => {
                CommandResponse::Bet(self.confirm_bet(session_key, actor).await?)
            }
            Command::StartParentRoll { session_key, actor } => {
                CommandResponse::Session(self.start_parent_roll(session_key, actor).await?)
            }
            Command::Roll { session_key, actor } => {
                CommandResponse::Rolled(self.roll(session_key, actor).await?)
            }
            Command::Stop { session_key, actor } => {
                CommandResponse::Rolled(self.stop(session_key, actor).await?)
            }
            Command::End { session_key, actor } => {
                self.end(session_key, actor).await?;
                CommandResponse::Ended { session_key }
            }
        };
        Ok(response)
    }

    /// Команда в виде JSON (как её присылает транспорт).
    pub async fn handle_json(&self, raw: &str) -> Result<CommandResponse, ApiError> {
        let command: Command = serde_json::from_str(raw)?;
        self.handle(command).await
    }

    pub async fn query(&self, query: Query) -> Result<QueryResponse, ApiError> {
        match query {
            Query::Status { session_key } => {
                Ok(QueryResponse::Session(self.status(session_key).await?))
            }
            Query::History { session_key } => {
                Ok(QueryResponse::History(self.history(session_key).await?))
            }
            Query::ListSessions => Ok(QueryResponse::Sessions(self.registry.keys().await)),
        }
    }
}
