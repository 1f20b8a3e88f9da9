//! Реализации коллабораторов движка: отрисовка бросков и применение переводов.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::domain::dice::Dice;
use crate::domain::mention;
use crate::engine::settlement::Transfer;
use crate::engine::sinks::{ArtifactRef, RenderContext, RenderSink, RollStage, SettlementSink, SinkError};
use crate::infra::persistence::{BalanceStore, StoreError};

/// Ничего не рисует.
#[derive(Clone, Debug, Default)]
pub struct NoopRenderSink;

#[async_trait]
impl RenderSink for NoopRenderSink {
    async fn render_roll(&self, _dice: Dice, _context: RenderContext) -> Option<ArtifactRef> {
        None
    }
}

/// "Рисует" бросок в лог и отдаёт текстовую строку как артефакт.
#[derive(Clone, Debug, Default)]
pub struct LoggingRenderSink;

#[async_trait]
impl RenderSink for LoggingRenderSink {
    async fn render_roll(&self, dice: Dice, context: RenderContext) -> Option<ArtifactRef> {
        let stage = match context.stage {
            RollStage::ParentSelection => "selection",
            RollStage::Turn(role) => role.label(),
        };
        let line = format!(
            "{} [{}] #{} {}{}",
            context.actor_label,
            stage,
            context.attempt,
            dice,
            if context.stopped { " (stop)" } else { "" }
        );
        info!(session = context.session_key, actor = context.actor_id, "{}", line);
        Some(line)
    }
}

/// Переводы в собственном леджере балансов.
pub struct LedgerSettlementSink {
    store: Arc<dyn BalanceStore>,
}

impl LedgerSettlementSink {
    pub fn new(store: Arc<dyn BalanceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SettlementSink for LedgerSettlementSink {
    async fn apply_transfer(&self, transfer: &Transfer) -> Result<(), SinkError> {
        self.store
            .transfer(transfer.from, transfer.to, transfer.amount)
            .map_err(|err| match err {
                StoreError::InsufficientFunds { .. } => SinkError::Rejected(err.to_string()),
                other => SinkError::Unavailable(other.to_string()),
            })
    }
}

/// Строка перевода, когда шаблон не подходит.
pub fn fallback_transfer_line(transfer: &Transfer) -> String {
    format!(
        "[TRANSFER] {} -> {} : {}",
        mention(transfer.from),
        mention(transfer.to),
        transfer.amount
    )
}

/// Подставить перевод в шаблон команды внешней экономики.
///
/// `{payer}` и `{payee}` становятся упоминаниями `<@id>`, `{amount}` – суммой,
/// `{{` и `}}` – литеральными скобками. Неизвестный ключ или непарная скобка
/// дают строку `[TRANSFER] ...`.
pub fn format_transfer_line(template: &str, transfer: &Transfer) -> String {
    render_template(template, transfer).unwrap_or_else(|| fallback_transfer_line(transfer))
}

fn render_template(template: &str, transfer: &Transfer) -> Option<String> {
    let mut out = String::with_capacity(template.len() + 16);
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next()? {
                        '}' => break,
                        '{' => return None,
                        other => key.push(other),
                    }
                }
                match key.as_str() {
                    "payer" => out.push_str(&mention(transfer.from)),
                    "payee" => out.push_str(&mention(transfer.to)),
                    "amount" => out.push_str(&transfer.amount.to_string()),
                    _ => return None,
                }
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return None,
            other => out.push(other),
        }
    }
    Some(out)
}

/// Публикует перевод как текстовую команду для бота-экономики.
/// Транспорт читает строки из канала и отправляет их куда нужно.
pub struct TemplateSettlementSink {
    template: String,
    outbox: UnboundedSender<String>,
}

impl TemplateSettlementSink {
    pub fn new(template: impl Into<String>, outbox: UnboundedSender<String>) -> Self {
        Self {
            template: template.into(),
            outbox,
        }
    }
}

#[async_trait]
impl SettlementSink for TemplateSettlementSink {
    async fn apply_transfer(&self, transfer: &Transfer) -> Result<(), SinkError> {
        let line = format_transfer_line(&self.template, transfer);
        debug!(line = %line, "publishing transfer command");
        self.outbox
            .send(line)
            .map_err(|_| SinkError::Unavailable("канал переводов закрыт".to_string()))
    }
}

/// Только логирует переводы. Для dev-запусков без экономики.
#[derive(Clone, Debug, Default)]
pub struct LoggingSettlementSink;

#[async_trait]
impl SettlementSink for LoggingSettlementSink {
    async fn apply_transfer(&self, transfer: &Transfer) -> Result<(), SinkError> {
        info!(
            from = transfer.from,
            to = transfer.to,
            amount = transfer.amount.0,
            "{}",
            fallback_transfer_line(transfer)
        );
        Ok(())
    }
}
