//! Инфраструктурный слой вокруг движка чинчиро:
//! - RNG-реализации для костей;
//! - хранилище балансов (in-memory / JSON-файл);
//! - реализации render / settlement коллабораторов;
//! - имена игроков для текстов.

pub mod mapping;
pub mod persistence;
pub mod rng;
pub mod sinks;

pub use mapping::*;
pub use persistence::*;
pub use rng::*;
pub use sinks::*;
