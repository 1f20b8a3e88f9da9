// src/time_ctrl/idle.rs
//! Политика закрытия заброшенных сессий.

use serde::{Deserialize, Serialize};

/// Сколько секунд сессия может простаивать без команд.
/// `max_idle_secs == 0` выключает авто-закрытие.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdlePolicy {
    pub max_idle_secs: u64,
}

impl IdlePolicy {
    pub fn new(max_idle_secs: u64) -> Self {
        Self { max_idle_secs }
    }

    pub fn disabled() -> Self {
        Self { max_idle_secs: 0 }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_idle_secs > 0
    }

    /// Истекла ли сессия с последней активностью `last_activity` к моменту `now`.
    pub fn is_expired(&self, last_activity: u64, now: u64) -> bool {
        self.is_enabled() && now.saturating_sub(last_activity) >= self.max_idle_secs
    }
}

impl Default for IdlePolicy {
    /// Час простоя.
    fn default() -> Self {
        Self::new(3_600)
    }
}
