// Инфраструктура: хранилище балансов, sink'и переводов, конфиг, RNG.

use std::sync::Arc;

use chinchiro_engine::config::{ConfigError, DEFAULT_TRANSFER_TEMPLATE};
use chinchiro_engine::domain::chips::Chips;
use chinchiro_engine::engine::{DiceSource, SettlementSink, SinkError, Transfer};
use chinchiro_engine::infra::{
    BalanceStore, DeterministicRng, InMemoryBalanceStore, JsonFileBalanceStore,
    LedgerSettlementSink, NoopRenderSink, ScriptedDice, StoreError, TemplateSettlementSink,
};
use chinchiro_engine::{ChinchiroService, ServiceConfig};

fn transfer(from: u64, to: u64, amount: u64) -> Transfer {
    Transfer {
        from,
        to,
        amount: Chips(amount),
    }
}

//
// Балансы
//

#[test]
fn in_memory_transfer_moves_exact_amount() {
    let store = InMemoryBalanceStore::new(Chips(1_000));
    store.transfer(1, 2, Chips(250)).unwrap();

    assert_eq!(store.balance(1).unwrap(), Chips(750));
    assert_eq!(store.balance(2).unwrap(), Chips(1_250));
    assert_eq!(store.balance(3).unwrap(), Chips(1_000));
}

#[test]
fn in_memory_transfer_rejects_overdraft() {
    let store = InMemoryBalanceStore::new(Chips(100));
    let err = store.transfer(1, 2, Chips(150)).unwrap_err();

    assert!(matches!(
        err,
        StoreError::InsufficientFunds {
            player_id: 1,
            required: 150,
            available: 100
        }
    ));
    assert_eq!(store.balance(1).unwrap(), Chips(100));
    assert_eq!(store.balance(2).unwrap(), Chips(100));
}

#[test]
fn json_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("balances.json");

    {
        let store = JsonFileBalanceStore::open(&path, Chips(500)).unwrap();
        store.set_balance(7, Chips(900)).unwrap();
        store.transfer(7, 8, Chips(400)).unwrap();
    }

    let reopened = JsonFileBalanceStore::open(&path, Chips(0)).unwrap();
    assert_eq!(reopened.balance(7).unwrap(), Chips(500));
    assert_eq!(reopened.balance(8).unwrap(), Chips(900));
    // Неизвестный игрок получает стартовый баланс нового хранилища.
    assert_eq!(reopened.balance(9).unwrap(), Chips(0));

    // Временный файл после rename не остаётся.
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn json_store_failed_transfer_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("balances.json");

    let store = JsonFileBalanceStore::open(&path, Chips(100)).unwrap();
    store.set_balance(1, Chips(100)).unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    assert!(store.transfer(1, 2, Chips(101)).is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn json_store_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("balances.json");
    std::fs::write(&path, "{ definitely not json").unwrap();

    assert!(matches!(
        JsonFileBalanceStore::open(&path, Chips(0)),
        Err(StoreError::Corrupt(_))
    ));
}

//
// Sink'и переводов
//

#[tokio::test]
async fn ledger_sink_maps_overdraft_to_rejection() {
    let store = Arc::new(InMemoryBalanceStore::new(Chips(100)));
    let sink = LedgerSettlementSink::new(store.clone());

    sink.apply_transfer(&transfer(1, 2, 100)).await.unwrap();
    assert_eq!(store.balance(2).unwrap(), Chips(200));

    let err = sink.apply_transfer(&transfer(1, 2, 1)).await.unwrap_err();
    assert!(matches!(err, SinkError::Rejected(_)));
}

#[tokio::test]
async fn template_sink_publishes_formatted_lines() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let sink = TemplateSettlementSink::new(DEFAULT_TRANSFER_TEMPLATE, tx);

    sink.apply_transfer(&transfer(3, 4, 700)).await.unwrap();
    assert_eq!(rx.recv().await.unwrap(), "!pay <@3> <@4> 700");

    drop(rx);
    assert!(matches!(
        sink.apply_transfer(&transfer(3, 4, 1)).await,
        Err(SinkError::Unavailable(_))
    ));
}

//
// Конфиг
//

#[test]
fn config_defaults_fill_missing_keys() {
    let config = ServiceConfig::from_toml_str(
        r#"
        idle_expiry_secs = 900

        [rules]
        max_bet = 5000
        "#,
    )
    .unwrap();

    assert_eq!(config.rules.max_bet, Chips(5_000));
    assert_eq!(config.rules.bet_step, Chips(100));
    assert_eq!(config.rules.min_participants, 2);
    assert_eq!(config.transfer_template, DEFAULT_TRANSFER_TEMPLATE);
    assert_eq!(config.idle_expiry_secs, Some(900));
    assert!(config.balances_path.is_none());
    assert!(config.idle_policy().is_enabled());
}

#[test]
fn config_rejects_bad_values() {
    assert!(matches!(
        ServiceConfig::from_toml_str("[rules]\nmin_participants = 1\n"),
        Err(ConfigError::InvalidValue { field: "rules.min_participants", .. })
    ));
    assert!(matches!(
        ServiceConfig::from_toml_str("transfer_template = [1, 2]"),
        Err(ConfigError::Toml(_))
    ));
}

#[test]
fn config_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chinchiro.toml");
    std::fs::write(&path, "transfer_template = \"/give {payer} {payee} {amount}\"\n").unwrap();

    let config = ServiceConfig::load(&path).unwrap();
    assert_eq!(config.transfer_template, "/give {payer} {payee} {amount}");

    assert!(matches!(
        ServiceConfig::load(dir.path().join("missing.toml")),
        Err(ConfigError::Io { .. })
    ));
}

#[tokio::test]
async fn service_from_config_publishes_transfer_commands() {
    let (service, outbox) =
        ChinchiroService::from_config(ServiceConfig::default(), Arc::new(NoopRenderSink)).unwrap();
    let mut outbox = outbox.unwrap();

    // Выбор: у игрока 1 – 4-5-6; родитель потом выбрасывает 1-2-3.
    let dice = ScriptedDice::from_rolls(&[[4, 5, 6], [1, 2, 4], [1, 2, 3]]);
    service.open_lobby_with_rng(5, 100, Box::new(dice)).await.unwrap();
    service.join(5, 1).await.unwrap();
    service.join(5, 2).await.unwrap();
    service.start_parent_selection(5, 100).await.unwrap();
    service.adjust_bet(5, 2, 300).await.unwrap();
    service.confirm_bet(5, 2).await.unwrap();
    service.start_parent_roll(5, 1).await.unwrap();
    service.roll(5, 1).await.unwrap();

    assert_eq!(outbox.recv().await.unwrap(), "!pay <@1> <@2> 300");
}

#[test]
fn service_from_config_uses_file_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        balances_path: Some(dir.path().join("balances.json")),
        starting_balance: Chips(2_500),
        ..ServiceConfig::default()
    };

    let (service, outbox) = ChinchiroService::from_config(config, Arc::new(NoopRenderSink)).unwrap();
    assert!(outbox.is_none());
    let balances = service.balances().unwrap();
    assert_eq!(balances.balance(1).unwrap(), Chips(2_500));
}

//
// RNG
//

#[test]
fn deterministic_rng_repeats_per_seed() {
    let mut a = DeterministicRng::from_seed(7);
    let mut b = DeterministicRng::from_seed(7);
    for _ in 0..50 {
        let face = a.roll_die();
        assert!((1..=6).contains(&face));
        assert_eq!(face, b.roll_die());
    }
}

#[test]
fn scripted_dice_fall_back_when_exhausted() {
    let mut dice = ScriptedDice::from_rolls(&[[6, 5, 4]]).with_picks(&[9]);
    assert_eq!([dice.roll_die(), dice.roll_die(), dice.roll_die()], [6, 5, 4]);
    assert_eq!(dice.roll_die(), 1);
    assert_eq!(dice.choose_index(3), 2);
    assert_eq!(dice.choose_index(3), 0);
}
