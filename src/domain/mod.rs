//! Доменная модель чинчиро: кости, руки, ставки, роли, правила стола.

pub mod chips;
pub mod dice;
pub mod hand;
pub mod player;
pub mod rules;

// Базовые идентификаторы. Ключ сессии – это, как правило, id канала транспорта.
pub type PlayerId = u64;
pub type SessionKey = u64;
pub type RoundNumber = u64;

pub use chips::*;
pub use dice::*;
pub use hand::*;
pub use player::*;
pub use rules::*;
