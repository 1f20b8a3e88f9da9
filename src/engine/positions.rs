use crate::domain::PlayerId;
use crate::engine::DiceSource;

/// Порядок детей: участники без родителя, в порядке входа в лобби.
pub fn build_child_order(participants: &[PlayerId], parent: PlayerId) -> Vec<PlayerId> {
    participants
        .iter()
        .copied()
        .filter(|&p| p != parent)
        .collect()
}

/// Следующий родитель: случайно из участников, кроме текущего.
///
/// Если кроме текущего никого нет – выбираем из всех участников.
pub fn pick_next_parent(
    participants: &[PlayerId],
    current: Option<PlayerId>,
    rng: &mut dyn DiceSource,
) -> Option<PlayerId> {
    let mut candidates: Vec<PlayerId> = participants
        .iter()
        .copied()
        .filter(|&p| Some(p) != current)
        .collect();

    if candidates.is_empty() {
        candidates = participants.to_vec();
    }
    if candidates.is_empty() {
        return None;
    }

    let idx = rng.choose_index(candidates.len()).min(candidates.len() - 1);
    Some(candidates[idx])
}
