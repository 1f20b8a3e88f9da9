use core::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::chips::Chips;
use crate::domain::dice::Dice;
use crate::domain::hand::{Hand, Outcome};
use crate::domain::rules::GameRules;
use crate::domain::{PlayerId, Role, RoundNumber, SessionKey};
use crate::engine::betting::BettingLedger;
use crate::engine::errors::EngineError;
use crate::engine::phase::Phase;
use crate::engine::positions::{build_child_order, pick_next_parent};
use crate::engine::round::RoundSession;
use crate::engine::round_history::{RoundEventKind, RoundHistory};
use crate::engine::settlement::{
    AutoSettlement, ChildSettlement, ParentResolution, SettlementEngine, Transfer,
};
use crate::engine::validation::{
    ensure_can_end, ensure_child, ensure_host, ensure_parent, ensure_participant, ensure_phase,
};
use crate::engine::{roll_dice, DiceSource};
use crate::eval::{compare, evaluate};

/// Бросок одного участника при выборе родителя.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionRoll {
    pub player_id: PlayerId,
    pub dice: Dice,
    pub hand: Hand,
}

/// Итог выбора родителя.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParentSelection {
    pub rolls: Vec<SelectionRoll>,
    pub parent_id: PlayerId,
    pub child_order: Vec<PlayerId>,
}

/// Чем закончился раунд.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoundEnd {
    /// Новый раунд с новым родителем, фаза снова Betting.
    Rotated { round: RoundNumber, parent_id: PlayerId },
    /// Участников не осталось – сессия закрыта.
    Emptied,
}

/// Кто ходит дальше.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum NextTurn {
    Child(PlayerId),
    RoundOver(RoundEnd),
}

/// Что произошло после фиксации руки.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurnResolution {
    /// Родитель выбросил 4-5-6 / тройку / 1-2-3.
    ParentAuto {
        settlement: AutoSettlement,
        round_end: RoundEnd,
    },
    /// Рука родителя записана, ходят дети.
    ParentContest { parent_hand: Hand, next: NextTurn },
    /// Ребёнок рассчитан против родителя.
    ChildSettled {
        settlement: ChildSettlement,
        next: NextTurn,
    },
}

/// Отчёт о броске или STOP.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RollReport {
    pub actor_id: PlayerId,
    pub role: Role,
    pub dice: Dice,
    pub hand: Hand,
    pub attempt: u8,
    pub finalized: bool,
    pub stopped: bool,
    /// Заполнено, только если ход зафиксирован.
    pub resolution: Option<TurnResolution>,
}

impl RollReport {
    /// Переводы, которые нужно отправить в settlement sink.
    pub fn transfers(&self) -> Vec<Transfer> {
        match &self.resolution {
            Some(TurnResolution::ParentAuto { settlement, .. }) => settlement.transfers.clone(),
            Some(TurnResolution::ChildSettled { settlement, .. }) => {
                settlement.transfer.iter().cloned().collect()
            }
            Some(TurnResolution::ParentContest { .. }) | None => Vec::new(),
        }
    }

    /// Итог ротации, если раунд закончился этим действием.
    pub fn round_end(&self) -> Option<&RoundEnd> {
        match &self.resolution {
            Some(TurnResolution::ParentAuto { round_end, .. }) => Some(round_end),
            Some(TurnResolution::ParentContest { next, .. })
            | Some(TurnResolution::ChildSettled { next, .. }) => match next {
                NextTurn::RoundOver(end) => Some(end),
                NextTurn::Child(_) => None,
            },
            None => None,
        }
    }
}

/// Одна игровая сессия (один канал): участники, роли, фаза, ставки, текущий ход.
pub struct GameSession {
    pub session_key: SessionKey,
    pub host_id: PlayerId,
    pub rules: GameRules,
    pub phase: Phase,
    /// Участники в порядке входа в лобби.
    pub participants: Vec<PlayerId>,
    pub parent_id: Option<PlayerId>,
    /// Дети в порядке хода; никогда не содержит родителя.
    pub child_order: Vec<PlayerId>,
    pub turn_index: usize,
    pub ledger: BettingLedger,
    pub current_round: Option<RoundSession>,
    pub parent_hand: Option<Hand>,
    /// 0 в лобби, 1 – первый раунд после выбора родителя.
    pub round_number: RoundNumber,
    pub settlement: SettlementEngine,
    /// Журнал текущего раунда.
    pub history: RoundHistory,
    /// Журнал последнего завершённого раунда (с его переводами).
    pub last_round: Option<RoundHistory>,
    rng: Box<dyn DiceSource>,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("session_key", &self.session_key)
            .field("host_id", &self.host_id)
            .field("phase", &self.phase)
            .field("participants", &self.participants)
            .field("parent_id", &self.parent_id)
            .field("child_order", &self.child_order)
            .field("turn_index", &self.turn_index)
            .field("round_number", &self.round_number)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Открыть лобби.
    pub fn new(
        session_key: SessionKey,
        host_id: PlayerId,
        rules: GameRules,
        rng: Box<dyn DiceSource>,
    ) -> Self {
        let mut history = RoundHistory::new();
        history.push(RoundEventKind::LobbyOpened {
            session_key,
            host_id,
        });

        Self {
            session_key,
            host_id,
            ledger: BettingLedger::new(rules.max_bet),
            rules,
            phase: Phase::Lobby,
            participants: Vec::new(),
            parent_id: None,
            child_order: Vec::new(),
            turn_index: 0,
            current_round: None,
            parent_hand: None,
            round_number: 0,
            settlement: SettlementEngine::new(0),
            history,
            last_round: None,
            rng,
        }
    }

    /// Чей сейчас бросок (если идёт незафиксированный ход).
    pub fn current_actor(&self) -> Option<PlayerId> {
        self.current_round
            .as_ref()
            .filter(|r| !r.is_final())
            .map(|r| r.actor_id)
    }

    fn transition(&mut self, next: Phase) -> Result<(), EngineError> {
        let from = self.phase;
        if !from.can_transition_to(next) {
            return Err(EngineError::Internal("недопустимый переход фазы"));
        }
        self.phase = next;
        self.history.push(RoundEventKind::PhaseChanged { from, to: next });
        info!(session = self.session_key, ?from, to = ?next, "phase changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Лобби
    // ------------------------------------------------------------------

    pub fn join(&mut self, player_id: PlayerId) -> Result<(), EngineError> {
        ensure_phase(self, Phase::Lobby)?;
        if self.participants.contains(&player_id) {
            return Err(EngineError::AlreadyJoined(player_id));
        }
        self.participants.push(player_id);
        self.history.push(RoundEventKind::PlayerJoined { player_id });
        debug!(session = self.session_key, player_id, "player joined");
        Ok(())
    }

    /// Выйти из лобби. Возвращает, сколько участников осталось.
    ///
    /// Если никого не осталось, сессия переходит в `Ended`.
    pub fn leave(&mut self, player_id: PlayerId) -> Result<usize, EngineError> {
        ensure_phase(self, Phase::Lobby)?;
        ensure_participant(self, player_id)?;
        self.participants.retain(|&p| p != player_id);
        self.history.push(RoundEventKind::PlayerLeft { player_id });
        debug!(session = self.session_key, player_id, "player left");

        // Пустое лобби схлопывается.
        if self.participants.is_empty() {
            self.transition(Phase::Ended)?;
        }
        Ok(self.participants.len())
    }

    /// Хост запускает выбор родителя: по одному броску на участника,
    /// побеждает самая сильная рука, при равенстве – кто раньше вошёл.
    pub fn select_parent(&mut self, actor: PlayerId) -> Result<ParentSelection, EngineError> {
        ensure_phase(self, Phase::Lobby)?;
        ensure_host(self, actor)?;
        let required = self.rules.min_participants.max(2);
        if self.participants.len() < required {
            return Err(EngineError::NotEnoughParticipants {
                required,
                actual: self.participants.len(),
            });
        }

        self.transition(Phase::ChoosingParent)?;

        let mut rolls = Vec::with_capacity(self.participants.len());
        let mut best: Option<(PlayerId, Hand)> = None;

        for &player_id in &self.participants {
            let dice = roll_dice(self.rng.as_mut());
            let hand = evaluate(&dice);

            let stronger = match &best {
                None => true,
                Some((_, best_hand)) => compare(best_hand, &hand) == Outcome::ChildWins,
            };
            if stronger {
                best = Some((player_id, hand.clone()));
            }

            self.history.push(RoundEventKind::SelectionRolled {
                player_id,
                dice,
                hand: hand.clone(),
            });
            rolls.push(SelectionRoll {
                player_id,
                dice,
                hand,
            });
        }

        let (parent_id, _) = best.ok_or(EngineError::Internal("нет участников для выбора"))?;
        self.parent_id = Some(parent_id);
        self.child_order = build_child_order(&self.participants, parent_id);
        self.turn_index = 0;
        self.ledger.reset();
        self.round_number = 1;
        self.settlement.start_round(self.round_number);
        self.history.push(RoundEventKind::ParentChosen { parent_id });

        self.transition(Phase::Betting)?;
        info!(session = self.session_key, parent_id, "parent chosen");

        Ok(ParentSelection {
            rolls,
            parent_id,
            child_order: self.child_order.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Ставки
    // ------------------------------------------------------------------

    pub fn adjust_bet(&mut self, actor: PlayerId, delta: i64) -> Result<Chips, EngineError> {
        ensure_phase(self, Phase::Betting)?;
        ensure_child(self, actor)?;
        self.ledger.adjust(actor, delta)
    }

    pub fn clear_bet(&mut self, actor: PlayerId) -> Result<(), EngineError> {
        ensure_phase(self, Phase::Betting)?;
        ensure_child(self, actor)?;
        self.ledger.clear(actor)?;
        debug!(session = self.session_key, player_id = actor, "bet cleared");
        Ok(())
    }

    pub fn confirm_bet(&mut self, actor: PlayerId) -> Result<Chips, EngineError> {
        self.confirm_bet_within(actor, None)
    }

    /// Подтвердить ставку, не превышая `available` (вариант со своим балансом).
    pub fn confirm_bet_within(
        &mut self,
        actor: PlayerId,
        available: Option<Chips>,
    ) -> Result<Chips, EngineError> {
        ensure_phase(self, Phase::Betting)?;
        ensure_child(self, actor)?;

        if let Some(available) = available {
            let wanted = self.ledger.displayed(actor);
            if wanted > available {
                return Err(EngineError::InsufficientFunds {
                    required: wanted.0,
                    available: available.0,
                });
            }
        }

        let amount = self.ledger.confirm(actor)?;
        self.history.push(RoundEventKind::BetConfirmed {
            player_id: actor,
            amount,
        });
        debug!(session = self.session_key, player_id = actor, %amount, "bet confirmed");
        Ok(amount)
    }

    /// Родитель закрывает ставки и начинает свой ход.
    pub fn start_parent_roll(&mut self, actor: PlayerId) -> Result<(), EngineError> {
        ensure_phase(self, Phase::Betting)?;
        ensure_parent(self, actor)?;

        self.ledger.close();
        self.history.push(RoundEventKind::BettingClosed);
        self.transition(Phase::ParentRolling)?;
        self.current_round = Some(RoundSession::new(actor, Role::Parent));
        debug!(session = self.session_key, parent_id = actor, "parent roll started");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Броски
    // ------------------------------------------------------------------

    fn ensure_rolling_actor(&self, actor: PlayerId) -> Result<&RoundSession, EngineError> {
        if !self.phase.is_rolling() {
            return Err(EngineError::InvalidPhase(self.phase));
        }
        ensure_participant(self, actor)?;
        self.current_round
            .as_ref()
            .ok_or(EngineError::Internal("нет активного хода"))
    }

    /// Бросок текущего актёра.
    pub fn roll(&mut self, actor: PlayerId) -> Result<RollReport, EngineError> {
        self.ensure_rolling_actor(actor)?.ensure_can_roll(actor)?;
        let dice = roll_dice(self.rng.as_mut());
        self.apply_roll(actor, dice)
    }

    /// Применить заданный бросок (реплей / детерминированные сценарии).
    pub fn apply_roll(&mut self, actor: PlayerId, dice: Dice) -> Result<RollReport, EngineError> {
        self.ensure_rolling_actor(actor)?;
        let round = self
            .current_round
            .as_mut()
            .ok_or(EngineError::Internal("нет активного хода"))?;
        let role = round.role;
        let result = round.apply_roll(actor, dice)?;

        self.history.push(RoundEventKind::Rolled {
            player_id: actor,
            role,
            attempt: result.attempt,
            dice,
            hand: result.hand.clone(),
            finalized: result.finalized,
        });
        debug!(
            session = self.session_key,
            player_id = actor,
            attempt = result.attempt,
            hand = %result.hand,
            "rolled"
        );

        let resolution = if result.finalized {
            Some(self.finalize_turn(role, actor, result.hand.clone())?)
        } else {
            None
        };

        Ok(RollReport {
            actor_id: actor,
            role,
            dice,
            hand: result.hand,
            attempt: result.attempt,
            finalized: result.finalized,
            stopped: false,
            resolution,
        })
    }

    /// STOP: зафиксировать последний бросок.
    pub fn stop(&mut self, actor: PlayerId) -> Result<RollReport, EngineError> {
        self.ensure_rolling_actor(actor)?;
        let round = self
            .current_round
            .as_mut()
            .ok_or(EngineError::Internal("нет активного хода"))?;
        let role = round.role;
        let attempt = round.tries;
        let (dice, hand) = round.stop(actor)?;

        self.history.push(RoundEventKind::Stopped {
            player_id: actor,
            role,
            hand: hand.clone(),
        });

        let resolution = self.finalize_turn(role, actor, hand.clone())?;

        Ok(RollReport {
            actor_id: actor,
            role,
            dice,
            hand,
            attempt,
            finalized: true,
            stopped: true,
            resolution: Some(resolution),
        })
    }

    fn finalize_turn(
        &mut self,
        role: Role,
        actor: PlayerId,
        hand: Hand,
    ) -> Result<TurnResolution, EngineError> {
        match role {
            Role::Parent => self.finalize_parent(actor, hand),
            Role::Child => self.finalize_child(actor, hand),
        }
    }

    fn finalize_parent(&mut self, parent: PlayerId, hand: Hand) -> Result<TurnResolution, EngineError> {
        let resolution =
            self.settlement
                .resolve_parent(parent, &hand, &self.child_order, &self.ledger)?;

        match resolution {
            ParentResolution::Auto(settlement) => {
                for t in &settlement.transfers {
                    self.history.push(RoundEventKind::TransferIssued(t.clone()));
                }
                info!(
                    session = self.session_key,
                    parent_wins = settlement.parent_wins,
                    transfers = settlement.transfers.len(),
                    "parent auto-resolution"
                );
                let round_end = self.rotate()?;
                Ok(TurnResolution::ParentAuto {
                    settlement,
                    round_end,
                })
            }
            ParentResolution::Contest => {
                self.parent_hand = Some(hand.clone());
                self.transition(Phase::ChildrenRolling)?;
                self.turn_index = 0;
                let next = self.begin_child_turn_or_rotate()?;
                Ok(TurnResolution::ParentContest {
                    parent_hand: hand,
                    next,
                })
            }
        }
    }

    fn finalize_child(&mut self, child: PlayerId, hand: Hand) -> Result<TurnResolution, EngineError> {
        let parent = self
            .parent_id
            .ok_or(EngineError::Internal("нет родителя"))?;
        let parent_hand = self
            .parent_hand
            .clone()
            .ok_or(EngineError::Internal("рука родителя не записана"))?;
        let stake = self.ledger.confirmed_stake(child);

        let settlement = self
            .settlement
            .settle_child(parent, &parent_hand, child, &hand, stake)?;

        self.history.push(RoundEventKind::ChildResolved {
            player_id: child,
            outcome: settlement.outcome,
        });
        if let Some(t) = &settlement.transfer {
            self.history.push(RoundEventKind::TransferIssued(t.clone()));
        }

        // Ничья тоже закрывает ход ребёнка – переброса нет.
        self.turn_index += 1;
        let next = self.begin_child_turn_or_rotate()?;
        Ok(TurnResolution::ChildSettled { settlement, next })
    }

    fn begin_child_turn_or_rotate(&mut self) -> Result<NextTurn, EngineError> {
        match self.child_order.get(self.turn_index).copied() {
            Some(child) => {
                self.current_round = Some(RoundSession::new(child, Role::Child));
                Ok(NextTurn::Child(child))
            }
            None => {
                self.current_round = None;
                Ok(NextTurn::RoundOver(self.rotate()?))
            }
        }
    }

    /// Ротация: случайный новый родитель, сброс всего, что относится к раунду.
    fn rotate(&mut self) -> Result<RoundEnd, EngineError> {
        self.current_round = None;
        self.parent_hand = None;
        self.turn_index = 0;
        self.ledger.reset();

        if self.participants.is_empty() {
            self.parent_id = None;
            self.child_order.clear();
            self.transition(Phase::Ended)?;
            return Ok(RoundEnd::Emptied);
        }

        let next_parent = pick_next_parent(&self.participants, self.parent_id, self.rng.as_mut())
            .ok_or(EngineError::Internal("не из кого выбрать родителя"))?;

        self.parent_id = Some(next_parent);
        self.child_order = build_child_order(&self.participants, next_parent);
        self.round_number += 1;
        self.settlement.start_round(self.round_number);

        self.last_round = Some(std::mem::take(&mut self.history));
        self.transition(Phase::Betting)?;
        self.history.push(RoundEventKind::RoundRotated {
            round: self.round_number,
            parent_id: next_parent,
        });
        info!(
            session = self.session_key,
            round = self.round_number,
            parent_id = next_parent,
            "round rotated"
        );

        Ok(RoundEnd::Rotated {
            round: self.round_number,
            parent_id: next_parent,
        })
    }

    /// Принудительно завершить игру (хост или родитель).
    pub fn end(&mut self, actor: PlayerId) -> Result<(), EngineError> {
        if self.phase == Phase::Ended {
            return Err(EngineError::InvalidPhase(Phase::Ended));
        }
        ensure_can_end(self, actor)?;

        self.current_round = None;
        self.transition(Phase::Ended)?;
        self.history.push(RoundEventKind::SessionEnded { by: actor });
        Ok(())
    }
}
