use crate::domain::PlayerId;
use crate::engine::errors::EngineError;
use crate::engine::game_loop::GameSession;
use crate::engine::phase::Phase;

/// Действие разрешено только в фазе `expected`.
pub fn ensure_phase(game: &GameSession, expected: Phase) -> Result<(), EngineError> {
    if game.phase != expected {
        return Err(EngineError::InvalidPhase(game.phase));
    }
    Ok(())
}

/// Актёр должен быть участником сессии.
pub fn ensure_participant(game: &GameSession, actor: PlayerId) -> Result<(), EngineError> {
    if !game.participants.contains(&actor) {
        return Err(EngineError::NotAParticipant(actor));
    }
    Ok(())
}

/// Ставить может только ребёнок текущего раунда.
pub fn ensure_child(game: &GameSession, actor: PlayerId) -> Result<(), EngineError> {
    ensure_participant(game, actor)?;
    if game.parent_id == Some(actor) || !game.child_order.contains(&actor) {
        return Err(EngineError::Unauthorized(actor));
    }
    Ok(())
}

/// Только текущий родитель.
pub fn ensure_parent(game: &GameSession, actor: PlayerId) -> Result<(), EngineError> {
    ensure_participant(game, actor)?;
    if game.parent_id != Some(actor) {
        return Err(EngineError::Unauthorized(actor));
    }
    Ok(())
}

/// Только хост лобби.
pub fn ensure_host(game: &GameSession, actor: PlayerId) -> Result<(), EngineError> {
    if game.host_id != actor {
        return Err(EngineError::Unauthorized(actor));
    }
    Ok(())
}

/// Завершить игру может хост или текущий родитель.
pub fn ensure_can_end(game: &GameSession, actor: PlayerId) -> Result<(), EngineError> {
    if game.host_id == actor || game.parent_id == Some(actor) {
        Ok(())
    } else {
        Err(EngineError::Unauthorized(actor))
    }
}
