// Полный цикл сессии на синхронном движке: лобби, выбор родителя,
// ставки, броски, расчёты, ротация.

use chinchiro_engine::domain::chips::Chips;
use chinchiro_engine::domain::hand::{HandKind, Outcome};
use chinchiro_engine::domain::rules::GameRules;
use chinchiro_engine::domain::PlayerId;
use chinchiro_engine::engine::{
    EngineError, GameSession, NextTurn, Phase, RoundEnd, RoundEventKind, Transfer, TurnResolution,
};
use chinchiro_engine::infra::ScriptedDice;

const HOST: PlayerId = 100;
const SESSION: u64 = 77;

/// Выбор родителя: у игрока 1 – 4-5-6, у 2 и 3 – пусто.
const SELECTION: [[u8; 3]; 3] = [[4, 5, 6], [1, 2, 4], [2, 3, 5]];

fn transfer(from: PlayerId, to: PlayerId, amount: u64) -> Transfer {
    Transfer {
        from,
        to,
        amount: Chips(amount),
    }
}

/// Лобби с игроками 1, 2, 3 и скриптом костей: сначала `SELECTION`, потом `rolls`.
fn lobby(rolls: &[[u8; 3]], picks: &[usize]) -> GameSession {
    let mut script: Vec<[u8; 3]> = SELECTION.to_vec();
    script.extend_from_slice(rolls);
    let dice = ScriptedDice::from_rolls(&script).with_picks(picks);

    let mut game = GameSession::new(SESSION, HOST, GameRules::default(), Box::new(dice));
    for p in [1, 2, 3] {
        game.join(p).unwrap();
    }
    game
}

/// Лобби сразу после выбора родителя (родитель – игрок 1).
fn betting(rolls: &[[u8; 3]], picks: &[usize]) -> GameSession {
    let mut game = lobby(rolls, picks);
    let selection = game.select_parent(HOST).unwrap();
    assert_eq!(selection.parent_id, 1);
    game
}

fn bet(game: &mut GameSession, child: PlayerId, amount: i64) {
    game.adjust_bet(child, amount).unwrap();
    game.confirm_bet(child).unwrap();
}

//
// Лобби
//

#[test]
fn join_rejects_duplicates_and_late_players() {
    let mut game = lobby(&[], &[]);
    assert_eq!(game.join(2), Err(EngineError::AlreadyJoined(2)));

    game.select_parent(HOST).unwrap();
    assert_eq!(game.join(9), Err(EngineError::InvalidPhase(Phase::Betting)));
}

#[test]
fn leave_of_stranger_is_rejected() {
    let mut game = lobby(&[], &[]);
    assert_eq!(game.leave(9), Err(EngineError::NotAParticipant(9)));
}

#[test]
fn last_leave_ends_lobby() {
    let mut game = GameSession::new(SESSION, HOST, GameRules::default(), Box::new(ScriptedDice::new()));
    game.join(1).unwrap();
    assert_eq!(game.leave(1), Ok(0));
    assert_eq!(game.phase, Phase::Ended);
}

#[test]
fn selection_needs_host_and_two_players() {
    let mut game = GameSession::new(SESSION, HOST, GameRules::default(), Box::new(ScriptedDice::new()));
    game.join(1).unwrap();

    assert_eq!(game.select_parent(1), Err(EngineError::Unauthorized(1)));
    assert_eq!(
        game.select_parent(HOST),
        Err(EngineError::NotEnoughParticipants {
            required: 2,
            actual: 1
        })
    );
    assert_eq!(game.phase, Phase::Lobby);
}

//
// Выбор родителя
//

#[test]
fn strongest_selection_roll_becomes_parent() {
    let mut game = GameSession::new(
        SESSION,
        HOST,
        GameRules::default(),
        Box::new(ScriptedDice::from_rolls(&[[1, 2, 4], [3, 3, 5], [6, 6, 1]])),
    );
    for p in [1, 2, 3] {
        game.join(p).unwrap();
    }

    let selection = game.select_parent(HOST).unwrap();
    assert_eq!(selection.rolls.len(), 3);
    assert_eq!(selection.parent_id, 2);
    assert_eq!(selection.child_order, vec![1, 3]);
    assert_eq!(game.phase, Phase::Betting);
    assert_eq!(game.round_number, 1);
}

#[test]
fn selection_tie_goes_to_earlier_player() {
    let mut game = GameSession::new(
        SESSION,
        HOST,
        GameRules::default(),
        Box::new(ScriptedDice::from_rolls(&[[1, 2, 4], [2, 2, 5], [5, 3, 3]])),
    );
    for p in [1, 2, 3] {
        game.join(p).unwrap();
    }

    let selection = game.select_parent(HOST).unwrap();
    assert_eq!(selection.parent_id, 2);
    assert_eq!(game.child_order, vec![1, 3]);
}

//
// Ставки
//

#[test]
fn only_children_bet_and_only_parent_starts() {
    let mut game = betting(&[], &[]);

    assert_eq!(game.adjust_bet(1, 100), Err(EngineError::Unauthorized(1)));
    assert_eq!(game.adjust_bet(HOST, 100), Err(EngineError::NotAParticipant(HOST)));
    assert_eq!(game.start_parent_roll(2), Err(EngineError::Unauthorized(2)));
    assert_eq!(game.roll(1), Err(EngineError::InvalidPhase(Phase::Betting)));

    game.start_parent_roll(1).unwrap();
    assert_eq!(game.phase, Phase::ParentRolling);
    assert_eq!(game.adjust_bet(2, 100), Err(EngineError::InvalidPhase(Phase::ParentRolling)));
    assert_eq!(game.clear_bet(2), Err(EngineError::InvalidPhase(Phase::ParentRolling)));
}

#[test]
fn insufficient_funds_blocks_confirmation() {
    let mut game = betting(&[], &[]);
    game.adjust_bet(2, 500).unwrap();

    assert_eq!(
        game.confirm_bet_within(2, Some(Chips(300))),
        Err(EngineError::InsufficientFunds {
            required: 500,
            available: 300
        })
    );
    assert_eq!(game.ledger.confirmed_stake(2), Chips::ZERO);

    assert_eq!(game.confirm_bet_within(2, Some(Chips(500))), Ok(Chips(500)));
}

//
// Авто-расчёт по руке родителя
//

#[test]
fn parent_hifumi_pays_every_staked_child() {
    // Сценарии A и E: ребёнок без ставки перевода не получает.
    let mut game = betting(&[[2, 1, 3]], &[0]);
    bet(&mut game, 3, 300);
    game.start_parent_roll(1).unwrap();

    let report = game.roll(1).unwrap();
    assert!(report.finalized);
    assert_eq!(report.hand.kind, HandKind::Hifumi);

    match report.resolution.clone() {
        Some(TurnResolution::ParentAuto {
            settlement,
            round_end,
        }) => {
            assert!(!settlement.parent_wins);
            assert_eq!(settlement.transfers, vec![transfer(1, 3, 300)]);
            assert_eq!(round_end, RoundEnd::Rotated { round: 2, parent_id: 2 });
        }
        other => panic!("expected auto resolution, got {:?}", other),
    }
    assert_eq!(report.transfers(), vec![transfer(1, 3, 300)]);

    // Ходов детей не было – сразу новый раунд.
    assert_eq!(game.phase, Phase::Betting);
    assert_eq!(game.parent_id, Some(2));
    assert_eq!(game.child_order, vec![1, 3]);
    assert_eq!(game.ledger.confirmed_stake(3), Chips::ZERO);
    assert!(game.current_round.is_none());
}

#[test]
fn parent_triple_collects_every_stake() {
    // Сценарий B.
    let mut game = betting(&[[4, 4, 4]], &[1]);
    bet(&mut game, 2, 200);
    bet(&mut game, 3, 500);
    game.start_parent_roll(1).unwrap();

    let report = game.roll(1).unwrap();
    assert_eq!((report.hand.kind, report.hand.tiebreak), (HandKind::Triple, 4));
    assert_eq!(report.transfers(), vec![transfer(2, 1, 200), transfer(3, 1, 500)]);
    assert_eq!(
        report.round_end(),
        Some(&RoundEnd::Rotated { round: 2, parent_id: 3 })
    );
}

#[test]
fn parent_shigoro_wins_outright() {
    let mut game = betting(&[[6, 5, 4]], &[]);
    bet(&mut game, 2, 100);
    game.start_parent_roll(1).unwrap();

    let report = game.roll(1).unwrap();
    assert_eq!(report.transfers(), vec![transfer(2, 1, 100)]);
}

//
// Ходы детей
//

#[test]
fn child_beats_parent_point() {
    // Сценарий C: 2-2-5 у родителя, 3-3-6 у ребёнка.
    let mut game = betting(&[[2, 2, 5], [3, 3, 6], [5, 2, 2]], &[1]);
    bet(&mut game, 2, 300);
    bet(&mut game, 3, 400);
    game.start_parent_roll(1).unwrap();

    let parent = game.roll(1).unwrap();
    match parent.resolution {
        Some(TurnResolution::ParentContest { parent_hand, next }) => {
            assert_eq!((parent_hand.kind, parent_hand.tiebreak), (HandKind::Point, 5));
            assert_eq!(next, NextTurn::Child(2));
        }
        other => panic!("expected contest, got {:?}", other),
    }
    assert_eq!(game.phase, Phase::ChildrenRolling);
    assert_eq!(game.current_actor(), Some(2));

    let child = game.roll(2).unwrap();
    match &child.resolution {
        Some(TurnResolution::ChildSettled { settlement, next }) => {
            assert_eq!(settlement.outcome, Outcome::ChildWins);
            assert_eq!(settlement.transfer, Some(transfer(1, 2, 300)));
            assert_eq!(next, &NextTurn::Child(3));
        }
        other => panic!("expected child settlement, got {:?}", other),
    }
    let issued: Vec<_> = game.history.transfers().cloned().collect();
    assert_eq!(issued, vec![transfer(1, 2, 300)]);

    // Ничья: перевода нет, ход всё равно закрыт, раунд закончился.
    let last = game.roll(3).unwrap();
    match &last.resolution {
        Some(TurnResolution::ChildSettled { settlement, next }) => {
            assert_eq!(settlement.outcome, Outcome::Draw);
            assert_eq!(settlement.transfer, None);
            assert_eq!(
                next,
                &NextTurn::RoundOver(RoundEnd::Rotated { round: 2, parent_id: 3 })
            );
        }
        other => panic!("expected child settlement, got {:?}", other),
    }
    assert_eq!(game.phase, Phase::Betting);
    assert_eq!(game.parent_id, Some(3));
    assert!(game.parent_hand.is_none());
}

#[test]
fn child_without_hand_after_three_tries_loses() {
    // Сценарий D.
    let mut game = betting(
        &[[2, 2, 5], [1, 2, 4], [2, 3, 5], [3, 4, 6], [1, 1, 1]],
        &[],
    );
    bet(&mut game, 2, 250);
    game.start_parent_roll(1).unwrap();
    game.roll(1).unwrap();

    assert!(!game.roll(2).unwrap().finalized);
    assert!(!game.roll(2).unwrap().finalized);
    let third = game.roll(2).unwrap();
    assert!(third.finalized);
    assert_eq!(third.attempt, 3);
    assert_eq!(third.hand.kind, HandKind::NoHand);
    assert_eq!(third.transfers(), vec![transfer(2, 1, 250)]);

    // Ход перешёл к следующему ребёнку.
    assert_eq!(game.current_actor(), Some(3));
    assert_eq!(game.roll(2), Err(EngineError::NotYourTurn(2)));
}

#[test]
fn stop_settles_on_last_roll() {
    let mut game = betting(&[[2, 2, 5], [1, 2, 4], [6, 6, 6]], &[]);
    bet(&mut game, 2, 100);
    game.start_parent_roll(1).unwrap();
    game.roll(1).unwrap();

    assert_eq!(game.stop(3), Err(EngineError::NotYourTurn(3)));
    game.roll(2).unwrap();
    let report = game.stop(2).unwrap();
    assert!(report.stopped);
    assert!(report.finalized);
    assert_eq!(report.dice.values(), [1, 2, 4]);
    assert_eq!(report.transfers(), vec![transfer(2, 1, 100)]);
    assert_eq!(game.current_actor(), Some(3));
}

#[test]
fn parent_no_hand_lets_children_roll() {
    // Родитель без комбинации: ребёнку достаточно любой точки.
    let mut game = betting(&[[1, 2, 4], [1, 2, 4], [1, 2, 4], [1, 1, 2]], &[]);
    bet(&mut game, 2, 100);
    game.start_parent_roll(1).unwrap();

    game.roll(1).unwrap();
    game.roll(1).unwrap();
    let parent = game.roll(1).unwrap();
    assert!(matches!(
        parent.resolution,
        Some(TurnResolution::ParentContest { .. })
    ));

    let child = game.roll(2).unwrap();
    assert_eq!(child.transfers(), vec![transfer(1, 2, 100)]);
}

//
// Ротация и завершение
//

#[test]
fn rotation_never_keeps_the_same_parent() {
    let mut game = betting(&[], &[]);
    for _ in 0..10 {
        let before = game.parent_id;
        game.start_parent_roll(before.unwrap()).unwrap();
        // Скрипт кончился: кости падают 1-1-1, это тройка родителя.
        let report = game.roll(before.unwrap()).unwrap();
        assert!(matches!(report.round_end(), Some(RoundEnd::Rotated { .. })));
        assert_ne!(game.parent_id, before);
        assert!(!game.child_order.contains(&game.parent_id.unwrap()));
        assert_eq!(game.child_order.len(), 2);
    }
    assert_eq!(game.round_number, 11);
}

#[test]
fn rotation_archives_finished_round() {
    let mut game = betting(&[[4, 5, 6]], &[]);
    assert!(game.last_round.is_none());
    assert!(game
        .history
        .events
        .iter()
        .any(|e| matches!(e.kind, RoundEventKind::ParentChosen { parent_id: 1 })));

    game.start_parent_roll(1).unwrap();
    game.roll(1).unwrap();

    assert!(matches!(
        game.history.events.last().map(|e| &e.kind),
        Some(RoundEventKind::RoundRotated { round: 2, .. })
    ));
    assert!(!game
        .history
        .events
        .iter()
        .any(|e| matches!(e.kind, RoundEventKind::ParentChosen { .. })));

    let archived = game.last_round.as_ref().unwrap();
    assert!(archived
        .events
        .iter()
        .any(|e| matches!(e.kind, RoundEventKind::ParentChosen { parent_id: 1 })));
    let indexes: Vec<u32> = archived.events.iter().map(|e| e.index).collect();
    assert_eq!(indexes, (0..archived.events.len() as u32).collect::<Vec<_>>());
}

#[test]
fn auto_resolution_transfers_survive_rotation() {
    // Родитель выбросил 1-2-3: платит сразу, раунд закрыт.
    let mut game = betting(&[[1, 2, 3]], &[]);
    bet(&mut game, 2, 300);
    game.start_parent_roll(1).unwrap();

    let report = game.roll(1).unwrap();
    assert!(matches!(
        report.resolution,
        Some(TurnResolution::ParentAuto { .. })
    ));
    let paid = report.transfers();
    assert!(!paid.is_empty());
    assert!(paid.iter().all(|t| t.from == 1));

    assert_eq!(game.history.transfers().count(), 0);
    let archived: Vec<_> = game
        .last_round
        .as_ref()
        .unwrap()
        .transfers()
        .cloned()
        .collect();
    assert_eq!(archived, paid);
}

#[test]
fn last_child_transfer_survives_rotation() {
    // Родитель 2-2-5; ребёнок 2 выбрасывает 1-2-3, ребёнок 3 – 6-6-6 последним.
    let mut game = betting(&[[2, 2, 5], [1, 2, 3], [6, 6, 6]], &[]);
    bet(&mut game, 2, 100);
    bet(&mut game, 3, 200);
    game.start_parent_roll(1).unwrap();
    game.roll(1).unwrap();
    game.roll(2).unwrap();

    let last = game.roll(3).unwrap();
    assert!(matches!(last.round_end(), Some(RoundEnd::Rotated { .. })));

    let archived: Vec<_> = game
        .last_round
        .as_ref()
        .unwrap()
        .transfers()
        .cloned()
        .collect();
    assert_eq!(archived.len(), 2);
    assert_eq!(archived[0].from, 2);
    assert_eq!(archived[1].from, 1);
    assert_eq!(archived[1].to, 3);
    assert_eq!(Some(&archived[1]), last.transfers().first());
}

#[test]
fn end_is_reserved_for_host_or_parent() {
    let mut game = betting(&[], &[]);
    assert_eq!(game.end(2), Err(EngineError::Unauthorized(2)));

    game.end(1).unwrap();
    assert_eq!(game.phase, Phase::Ended);
    assert_eq!(game.end(HOST), Err(EngineError::InvalidPhase(Phase::Ended)));
    assert_eq!(game.roll(1), Err(EngineError::InvalidPhase(Phase::Ended)));
}

#[test]
fn host_can_end_mid_turn() {
    let mut game = betting(&[[2, 2, 5]], &[]);
    bet(&mut game, 2, 100);
    game.start_parent_roll(1).unwrap();
    game.roll(1).unwrap();
    assert_eq!(game.phase, Phase::ChildrenRolling);

    game.end(HOST).unwrap();
    assert_eq!(game.phase, Phase::Ended);
    assert!(game.current_round.is_none());
}
