use serde::{Deserialize, Serialize};

use crate::domain::PlayerId;

/// Роль игрока в текущем раунде.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    Parent,
    Child,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Parent => "parent",
            Role::Child => "child",
        }
    }
}

/// Упоминание игрока в формате чата (`<@id>`).
pub fn mention(player_id: PlayerId) -> String {
    format!("<@{}>", player_id)
}
