// src/time_ctrl/clock.rs
//! Источники "текущего времени" в секундах.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Часы активности. Секунды с произвольной, но фиксированной точки отсчёта.
pub trait ActivityClock: Send + Sync {
    fn now_secs(&self) -> u64;
}

/// Системное время (UNIX-секунды).
#[derive(Clone, Debug, Default)]
pub struct SystemClock;

impl ActivityClock for SystemClock {
    fn now_secs(&self) -> u64 {
        // Часы до 1970 года считаем нулём.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Ручные часы для тестов и симуляций.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_secs: u64) -> Self {
        Self {
            now: AtomicU64::new(start_secs),
        }
    }

    pub fn set(&self, secs: u64) {
        self.now.store(secs, Ordering::SeqCst);
    }

    /// Сдвинуть часы вперёд, вернуть новое значение.
    pub fn advance(&self, secs: u64) -> u64 {
        self.now.fetch_add(secs, Ordering::SeqCst).saturating_add(secs)
    }
}

impl ActivityClock for ManualClock {
    fn now_secs(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
