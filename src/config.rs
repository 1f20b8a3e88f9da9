//! Конфигурация сервиса: правила стола, шаблон переводов, хранилище балансов.
//!
//! Читается из TOML; отсутствующие ключи берутся из `Default`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::chips::Chips;
use crate::domain::rules::GameRules;
use crate::time_ctrl::IdlePolicy;

pub const DEFAULT_TRANSFER_TEMPLATE: &str = "!pay {payer} {payee} {amount}";

/// Ошибки загрузки конфига.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Не удалось прочитать {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Некорректный TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Некорректное значение {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServiceConfig {
    pub rules: GameRules,
    /// Шаблон команды перевода для внешней экономики.
    pub transfer_template: String,
    /// Через сколько секунд простоя сессия закрывается. `None` – никогда.
    pub idle_expiry_secs: Option<u64>,
    /// Путь к JSON с балансами. Если задан, сервис ведёт свой леджер.
    pub balances_path: Option<PathBuf>,
    /// Баланс игрока, которого леджер ещё не видел.
    pub starting_balance: Chips,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            rules: GameRules::default(),
            transfer_template: DEFAULT_TRANSFER_TEMPLATE.to_string(),
            idle_expiry_secs: None,
            balances_path: None,
            starting_balance: Chips(10_000),
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.max_bet.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "rules.max_bet",
                reason: "должна быть больше нуля".to_string(),
            });
        }
        if self.rules.min_participants < 2 {
            return Err(ConfigError::InvalidValue {
                field: "rules.min_participants",
                reason: format!("минимум 2, получено {}", self.rules.min_participants),
            });
        }
        Ok(())
    }

    pub fn idle_policy(&self) -> IdlePolicy {
        match self.idle_expiry_secs {
            Some(secs) => IdlePolicy::new(secs),
            None => IdlePolicy::disabled(),
        }
    }
}
