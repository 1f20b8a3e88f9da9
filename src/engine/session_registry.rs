use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info};

use crate::domain::SessionKey;
use crate::engine::errors::EngineError;
use crate::engine::game_loop::GameSession;
use crate::time_ctrl::IdlePolicy;

/// Слот одной сессии в реестре: сама игра под мьютексом + in-flight флаг.
///
/// Мьютекс сериализует все изменения сессии, включая await на коллабораторах.
/// Флаг проверяется до захвата мьютекса, поэтому повторный ROLL не встаёт
/// в очередь, а сразу получает `Busy`.
#[derive(Debug)]
pub struct SessionSlot {
    key: SessionKey,
    game: Mutex<GameSession>,
    in_flight: AtomicBool,
    last_activity: AtomicU64,
}

impl SessionSlot {
    pub fn new(game: GameSession, now_secs: u64) -> Self {
        Self {
            key: game.session_key,
            game: Mutex::new(game),
            in_flight: AtomicBool::new(false),
            last_activity: AtomicU64::new(now_secs),
        }
    }

    pub fn key(&self) -> SessionKey {
        self.key
    }

    pub async fn lock(&self) -> MutexGuard<'_, GameSession> {
        self.game.lock().await
    }

    /// Занять слот под бросок. Второй одновременный бросок получает `Busy`.
    pub fn begin_flight(&self) -> Result<FlightGuard<'_>, EngineError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EngineError::Busy)?;
        Ok(FlightGuard {
            flag: &self.in_flight,
        })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn touch(&self, now_secs: u64) {
        self.last_activity.fetch_max(now_secs, Ordering::AcqRel);
    }

    pub fn last_activity(&self) -> u64 {
        self.last_activity.load(Ordering::Acquire)
    }
}

/// Снимает in-flight флаг при выходе из области видимости (в том числе по ошибке).
#[derive(Debug)]
pub struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Реестр сессий процесса: ключ канала -> слот.
///
/// Вставка и удаление атомарны (под write-lock), блокировки разных сессий
/// друг от друга не зависят.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionKey, Arc<SessionSlot>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Зарегистрировать новую сессию. Если ключ занят – `SessionAlreadyExists`.
    pub async fn insert_new(&self, slot: SessionSlot) -> Result<Arc<SessionSlot>, EngineError> {
        let mut sessions = self.sessions.write().await;
        let key = slot.key();
        if sessions.contains_key(&key) {
            return Err(EngineError::SessionAlreadyExists(key));
        }
        let slot = Arc::new(slot);
        sessions.insert(key, Arc::clone(&slot));
        info!(session = key, total = sessions.len(), "session registered");
        Ok(slot)
    }

    pub async fn get(&self, key: SessionKey) -> Result<Arc<SessionSlot>, EngineError> {
        self.sessions
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or(EngineError::SessionNotFound(key))
    }

    /// Удалить сессию, только если под ключом всё ещё именно этот слот.
    pub async fn remove_slot(&self, slot: &Arc<SessionSlot>) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&slot.key()) {
            Some(current) if Arc::ptr_eq(current, slot) => {
                sessions.remove(&slot.key());
                info!(session = slot.key(), "session removed");
                true
            }
            _ => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub async fn keys(&self) -> Vec<SessionKey> {
        let mut keys: Vec<SessionKey> = self.sessions.read().await.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Удалить сессии, простоявшие дольше, чем разрешает `policy`.
    /// Сессии с броском в процессе не трогаем.
    pub async fn sweep_idle(&self, now_secs: u64, policy: &IdlePolicy) -> Vec<SessionKey> {
        if !policy.is_enabled() {
            return Vec::new();
        }
        let mut sessions = self.sessions.write().await;
        let expired: Vec<SessionKey> = sessions
            .values()
            .filter(|slot| !slot.is_in_flight())
            .filter(|slot| policy.is_expired(slot.last_activity(), now_secs))
            .map(|slot| slot.key())
            .collect();

        for key in &expired {
            sessions.remove(key);
            debug!(session = key, "idle session expired");
        }
        expired
    }
}
