use std::collections::HashMap;

use crate::domain::{mention, PlayerId};

/// Отображаемое имя игрока для рендера и текстов.
///
/// Транспорт может подставить свой резолвер (ник из чата и т.п.).
pub trait PlayerNameResolver: Send + Sync {
    fn resolve_name(&self, player_id: PlayerId) -> String;
}

/// Простая реализация: имя = упоминание `<@id>`.
#[derive(Clone, Debug, Default)]
pub struct DefaultNameResolver;

impl PlayerNameResolver for DefaultNameResolver {
    fn resolve_name(&self, player_id: PlayerId) -> String {
        mention(player_id)
    }
}

/// Резолвер по таблице имён, с fallback на упоминание.
#[derive(Clone, Debug, Default)]
pub struct StaticNameResolver {
    names: HashMap<PlayerId, String>,
}

impl StaticNameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, player_id: PlayerId, name: impl Into<String>) -> Self {
        self.names.insert(player_id, name.into());
        self
    }
}

impl PlayerNameResolver for StaticNameResolver {
    fn resolve_name(&self, player_id: PlayerId) -> String {
        self.names
            .get(&player_id)
            .cloned()
            .unwrap_or_else(|| mention(player_id))
    }
}
