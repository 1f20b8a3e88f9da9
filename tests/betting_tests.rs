// Панель ставок: черновики, подтверждение, закрытие приёма.

use chinchiro_engine::domain::chips::Chips;
use chinchiro_engine::engine::{BettingLedger, EngineError, Phase};

#[test]
fn adjust_clamps_to_range() {
    let mut ledger = BettingLedger::new(Chips(1_000));

    assert_eq!(ledger.adjust(2, -100).unwrap(), Chips::ZERO);
    assert_eq!(ledger.adjust(2, 700).unwrap(), Chips(700));
    assert_eq!(ledger.adjust(2, 700).unwrap(), Chips(1_000));
    assert_eq!(ledger.adjust(2, -300).unwrap(), Chips(700));
}

#[test]
fn confirm_promotes_provisional() {
    let mut ledger = BettingLedger::new(Chips(1_000));
    ledger.adjust(2, 300).unwrap();
    assert_eq!(ledger.confirmed_stake(2), Chips::ZERO);

    assert_eq!(ledger.confirm(2).unwrap(), Chips(300));
    assert_eq!(ledger.confirmed_stake(2), Chips(300));

    let line = ledger.line(2);
    assert_eq!(line.provisional, None);
    assert_eq!(line.displayed, Chips(300));
}

#[test]
fn confirm_without_edit_keeps_prior_stake() {
    let mut ledger = BettingLedger::new(Chips(1_000));
    ledger.adjust(2, 400).unwrap();
    ledger.confirm(2).unwrap();

    assert_eq!(ledger.confirm(2).unwrap(), Chips(400));
}

#[test]
fn edits_continue_from_confirmed_value() {
    let mut ledger = BettingLedger::new(Chips(1_000));
    ledger.adjust(2, 400).unwrap();
    ledger.confirm(2).unwrap();

    assert_eq!(ledger.adjust(2, 100).unwrap(), Chips(500));
    // Пока не подтверждено, в расчёт идёт старая ставка.
    assert_eq!(ledger.confirmed_stake(2), Chips(400));
}

#[test]
fn clear_zeroes_provisional_only() {
    let mut ledger = BettingLedger::new(Chips(1_000));
    ledger.adjust(2, 400).unwrap();
    ledger.confirm(2).unwrap();
    ledger.adjust(2, 100).unwrap();

    ledger.clear(2).unwrap();
    let line = ledger.line(2);
    assert_eq!(line.provisional, Some(Chips::ZERO));
    assert_eq!(line.displayed, Chips::ZERO);
    assert_eq!(line.confirmed, Chips(400));

    assert_eq!(ledger.confirm(2).unwrap(), Chips::ZERO);
}

#[test]
fn closed_ledger_rejects_edits_and_drops_drafts() {
    let mut ledger = BettingLedger::new(Chips(1_000));
    ledger.adjust(2, 300).unwrap();
    ledger.confirm(2).unwrap();
    ledger.adjust(3, 200).unwrap();

    ledger.close();
    assert!(ledger.is_closed());
    assert_eq!(ledger.adjust(2, 100), Err(EngineError::InvalidPhase(Phase::ParentRolling)));
    assert_eq!(ledger.confirm(3), Err(EngineError::InvalidPhase(Phase::ParentRolling)));

    assert_eq!(ledger.confirmed_stake(2), Chips(300));
    assert_eq!(ledger.confirmed_stake(3), Chips::ZERO);
    assert_eq!(ledger.line(3).provisional, None);
}

#[test]
fn snapshot_follows_child_order() {
    let mut ledger = BettingLedger::new(Chips(1_000));
    ledger.adjust(3, 200).unwrap();
    ledger.adjust(2, 100).unwrap();
    ledger.confirm(2).unwrap();

    let lines = ledger.snapshot(&[3, 2, 4]);
    let ids: Vec<_> = lines.iter().map(|l| l.player_id).collect();
    assert_eq!(ids, vec![3, 2, 4]);
    assert_eq!(lines[0].displayed, Chips(200));
    assert_eq!(lines[1].confirmed, Chips(100));
    assert_eq!(lines[2].displayed, Chips::ZERO);
}
