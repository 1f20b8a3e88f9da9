//! Движок чинчиро (три кости, родитель против детей) для чат-бота.
//!
//! Слои:
//! - `domain` – кости, руки, ставки, роли, правила стола;
//! - `eval` – оценка броска и сравнение рук;
//! - `engine` – сессия, ходы, расчёты, реестр сессий, async-планировщик;
//! - `infra` – RNG, балансы, реализации коллабораторов;
//! - `api` – команды, запросы, DTO для транспорта;
//! - `service` – точка входа транспорта.

pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod eval;
pub mod infra;
pub mod service;
pub mod time_ctrl;

pub use config::{ConfigError, ServiceConfig};
pub use service::{ChinchiroService, RngFactory};
