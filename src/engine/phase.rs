use serde::{Deserialize, Serialize};

/// Фаза игровой сессии.
///
/// Порядок строгий: Lobby → ChoosingParent → Betting → ParentRolling →
/// ChildrenRolling → (ротация) Betting. В Ended можно попасть из любой фазы.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Phase {
    Lobby,
    ChoosingParent,
    Betting,
    ParentRolling,
    ChildrenRolling,
    Ended,
}

impl Phase {
    /// Таблица допустимых переходов.
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;

        match (self, next) {
            (Ended, _) => false,
            (_, Ended) => true,
            (Lobby, ChoosingParent) => true,
            (ChoosingParent, Betting) => true,
            (Betting, ParentRolling) => true,
            // Авто-результат родителя сразу ротирует раунд.
            (ParentRolling, ChildrenRolling) | (ParentRolling, Betting) => true,
            (ChildrenRolling, Betting) => true,
            _ => false,
        }
    }

    /// Фазы, в которых идёт ход с бросками.
    pub fn is_rolling(self) -> bool {
        matches!(self, Phase::ParentRolling | Phase::ChildrenRolling)
    }
}

#[cfg(test)]
mod tests {
    use super::Phase::*;

    #[test]
    fn no_skipping_forward() {
        assert!(Lobby.can_transition_to(ChoosingParent));
        assert!(!Lobby.can_transition_to(Betting));
        assert!(!Betting.can_transition_to(ChildrenRolling));
        assert!(!ChildrenRolling.can_transition_to(ParentRolling));
        assert!(ChildrenRolling.can_transition_to(Betting));
    }

    #[test]
    fn ended_is_terminal_and_reachable() {
        for p in [Lobby, ChoosingParent, Betting, ParentRolling, ChildrenRolling] {
            assert!(p.can_transition_to(Ended));
        }
        assert!(!Ended.can_transition_to(Lobby));
        assert!(!Ended.can_transition_to(Ended));
    }
}
