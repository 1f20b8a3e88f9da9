// src/bin/chinchiro_dev_cli.rs

use std::error::Error;
use std::sync::Arc;

use chinchiro_engine::api::SessionViewDto;
use chinchiro_engine::domain::hand::HandKind;
use chinchiro_engine::domain::{PlayerId, SessionKey};
use chinchiro_engine::engine::{DiceSource, RollOutcome, TurnResolution};
use chinchiro_engine::infra::{
    BalanceStore, DeterministicRng, InMemoryBalanceStore, LoggingRenderSink, StaticNameResolver,
};
use chinchiro_engine::{ChinchiroService, ServiceConfig};
use tracing_subscriber::EnvFilter;

const SESSION: SessionKey = 1;
const HOST: PlayerId = 100;
const PLAYERS: [PlayerId; 4] = [1, 2, 3, 4];
const ROUNDS: usize = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("chinchiro_dev_cli: локальная симуляция нескольких раундов…");

    // 1. Конфиг: из файла, если передан путь, иначе дефолт.
    let config = match std::env::args().nth(1) {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };
    let step = config.rules.bet_step.0 as i64;

    // 2. Свой леджер в памяти + "рендер" в консоль.
    let store = Arc::new(InMemoryBalanceStore::new(config.starting_balance));
    let ledger: Arc<dyn BalanceStore> = store.clone();
    let service = ChinchiroService::with_ledger(config, Arc::new(LoggingRenderSink), ledger)
        .with_rng_factory(Arc::new(|| {
            Box::new(DeterministicRng::from_seed(42)) as Box<dyn DiceSource>
        }))
        .with_names(Arc::new(
            StaticNameResolver::new()
                .with_name(1, "alice")
                .with_name(2, "bob")
                .with_name(3, "carol")
                .with_name(4, "dave"),
        ));

    // 3. Лобби и выбор родителя.
    service.open_lobby(SESSION, HOST).await?;
    for player in PLAYERS {
        service.join(SESSION, player).await?;
    }

    let selection = service.start_parent_selection(SESSION, HOST).await?;
    println!();
    println!("================ ВЫБОР РОДИТЕЛЯ =================");
    for roll in &selection.rolls {
        println!("  <@{}>: {}  {}", roll.player_id, roll.dice, roll.hand);
    }
    println!("  родитель: <@{}>", selection.parent_id);

    // 4. Раунды.
    for _ in 0..ROUNDS {
        let view = service.status(SESSION).await?;
        play_round(&service, &view, step).await?;
        print_balances(store.as_ref())?;
    }

    service.end(SESSION, HOST).await?;
    println!();
    println!("Сессия завершена.");
    Ok(())
}

async fn play_round(
    service: &ChinchiroService,
    view: &SessionViewDto,
    step: i64,
) -> Result<(), Box<dyn Error>> {
    let parent = view.parent_id.ok_or("нет родителя")?;

    println!();
    println!(
        "================ РАУНД {} (родитель <@{}>) =================",
        view.round_number, parent
    );

    // Ставки: ребёнок i ставит (i + 1) шагов.
    for (i, &child) in view.child_order.iter().enumerate() {
        service.adjust_bet(SESSION, child, step * (i as i64 + 1)).await?;
        let line = service.confirm_bet(SESSION, child).await?;
        println!("  ставка <@{}>: {}", child, line.confirmed);
    }

    service.start_parent_roll(SESSION, parent).await?;

    // Бросаем, пока раунд не закончится. Пустой второй бросок фиксируем через STOP.
    loop {
        let status = service.status(SESSION).await?;
        let Some(turn) = status.turn else { break };

        let mut outcome = service.roll(SESSION, turn.actor_id).await?;
        print_roll(&outcome);

        let report = &outcome.report;
        if !report.finalized && report.hand.kind == HandKind::NoHand && report.attempt == 2 {
            outcome = service.stop(SESSION, turn.actor_id).await?;
            print_roll(&outcome);
        }

        if outcome.report.round_end().is_some() {
            break;
        }
    }
    Ok(())
}

fn print_roll(outcome: &RollOutcome) {
    let report = &outcome.report;
    println!(
        "  <@{}> [{}] #{} {}  {}{}",
        report.actor_id,
        report.role.label(),
        report.attempt,
        report.dice,
        report.hand,
        if report.stopped { " (STOP)" } else { "" }
    );

    match &report.resolution {
        Some(TurnResolution::ParentAuto { settlement, .. }) => {
            let who = if settlement.parent_wins { "забирает все ставки" } else { "платит всем" };
            println!("    родитель {}", who);
        }
        Some(TurnResolution::ChildSettled { settlement, .. }) => {
            println!("    <@{}>: {:?}", settlement.child, settlement.outcome);
        }
        Some(TurnResolution::ParentContest { .. }) | None => {}
    }

    for delivery in &outcome.deliveries {
        println!(
            "    перевод <@{}> -> <@{}> : {} {}",
            delivery.transfer.from,
            delivery.transfer.to,
            delivery.transfer.amount,
            if delivery.delivered { "" } else { "(НЕ ПРОШЁЛ)" }
        );
    }
}

fn print_balances(store: &InMemoryBalanceStore) -> Result<(), Box<dyn Error>> {
    let mut line = String::from("  балансы:");
    for player in PLAYERS {
        line.push_str(&format!(" <@{}>={}", player, store.balance(player)?));
    }
    println!("{}", line);
    Ok(())
}
