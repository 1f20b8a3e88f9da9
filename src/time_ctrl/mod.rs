// src/time_ctrl/mod.rs
//! Время для сервиса сессий: часы активности и политика простоя.
//!
//! Движок сам времени не знает. Сервис отмечает активность каждой сессии
//! по `ActivityClock`, а `IdlePolicy` решает, какие сессии пора закрыть.

pub mod clock;
pub mod idle;

pub use clock::{ActivityClock, ManualClock, SystemClock};
pub use idle::IdlePolicy;
