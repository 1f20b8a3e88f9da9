//! Внешний API сервиса чинчиро.
//!
//! Здесь описываются:
//! - команды (commands.rs) – всё, что меняет состояние сессии;
//! - запросы (queries.rs) – только чтение;
//! - DTO (dto.rs) – снимок сессии и ответы на команды для транспорта;
//! - ошибки (errors.rs) – то, что видит клиент.

pub mod commands;
pub mod dto;
pub mod errors;
pub mod queries;

pub use commands::*;
pub use dto::*;
pub use errors::*;
pub use queries::*;
