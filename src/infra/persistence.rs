use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use crate::domain::chips::Chips;
use crate::domain::PlayerId;

/// Ошибки хранилища балансов.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Недостаточно средств у игрока {player_id}: нужно {required}, есть {available}")]
    InsufficientFunds {
        player_id: PlayerId,
        required: u64,
        available: u64,
    },

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Повреждённый файл балансов: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Хранилище недоступно: блокировка отравлена")]
    Poisoned,
}

/// Хранилище балансов (вариант со своим леджером, без внешнего бота-экономики).
///
/// Каждая операция read-modify-write атомарна по отношению к другим вызовам.
pub trait BalanceStore: Send + Sync {
    fn balance(&self, player_id: PlayerId) -> Result<Chips, StoreError>;

    fn set_balance(&self, player_id: PlayerId, amount: Chips) -> Result<(), StoreError>;

    /// Списать у `from` и зачислить `to` одной операцией.
    fn transfer(&self, from: PlayerId, to: PlayerId, amount: Chips) -> Result<(), StoreError>;
}

/// Таблица балансов + стартовый баланс для новых игроков.
#[derive(Clone, Debug, Default)]
struct BalanceBook {
    balances: BTreeMap<PlayerId, u64>,
    starting: Chips,
}

impl BalanceBook {
    fn get(&self, player_id: PlayerId) -> Chips {
        self.balances
            .get(&player_id)
            .copied()
            .map(Chips)
            .unwrap_or(self.starting)
    }

    fn set(&mut self, player_id: PlayerId, amount: Chips) {
        self.balances.insert(player_id, amount.0);
    }

    fn transfer(&mut self, from: PlayerId, to: PlayerId, amount: Chips) -> Result<(), StoreError> {
        let available = self.get(from);
        let rest = available
            .checked_sub(amount)
            .ok_or(StoreError::InsufficientFunds {
                player_id: from,
                required: amount.0,
                available: available.0,
            })?;
        self.set(from, rest);
        let credited = self.get(to) + amount;
        self.set(to, credited);
        Ok(())
    }
}

fn lock_book(book: &Mutex<BalanceBook>) -> Result<MutexGuard<'_, BalanceBook>, StoreError> {
    book.lock().map_err(|_| StoreError::Poisoned)
}

/// In-memory реализация для тестов и локального запуска.
#[derive(Debug, Default)]
pub struct InMemoryBalanceStore {
    book: Mutex<BalanceBook>,
}

impl InMemoryBalanceStore {
    pub fn new(starting: Chips) -> Self {
        Self {
            book: Mutex::new(BalanceBook {
                balances: BTreeMap::new(),
                starting,
            }),
        }
    }
}

impl BalanceStore for InMemoryBalanceStore {
    fn balance(&self, player_id: PlayerId) -> Result<Chips, StoreError> {
        Ok(lock_book(&self.book)?.get(player_id))
    }

    fn set_balance(&self, player_id: PlayerId, amount: Chips) -> Result<(), StoreError> {
        lock_book(&self.book)?.set(player_id, amount);
        Ok(())
    }

    fn transfer(&self, from: PlayerId, to: PlayerId, amount: Chips) -> Result<(), StoreError> {
        lock_book(&self.book)?.transfer(from, to, amount)
    }
}

/// Балансы в JSON-файле. Запись через временный файл + rename,
/// так что на диске всегда либо старая, либо новая версия целиком.
#[derive(Debug)]
pub struct JsonFileBalanceStore {
    path: PathBuf,
    book: Mutex<BalanceBook>,
}

impl JsonFileBalanceStore {
    /// Открыть файл (или начать с пустой таблицы, если его нет).
    pub fn open(path: impl Into<PathBuf>, starting: Chips) -> Result<Self, StoreError> {
        let path = path.into();
        let balances = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<BTreeMap<PlayerId, u64>>(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            book: Mutex::new(BalanceBook { balances, starting }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, book: &BalanceBook) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&book.balances)?;
        let tmp = self.path.with_extension("tmp");

        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Изменить таблицу и сохранить; при ошибке записи откатить изменения в памяти.
    fn mutate<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BalanceBook) -> Result<(), StoreError>,
    {
        let mut book = lock_book(&self.book)?;
        let before = book.clone();
        f(&mut *book)?;
        if let Err(err) = self.persist(&*book) {
            *book = before;
            return Err(err);
        }
        Ok(())
    }
}

impl BalanceStore for JsonFileBalanceStore {
    fn balance(&self, player_id: PlayerId) -> Result<Chips, StoreError> {
        Ok(lock_book(&self.book)?.get(player_id))
    }

    fn set_balance(&self, player_id: PlayerId, amount: Chips) -> Result<(), StoreError> {
        self.mutate(|book| {
            book.set(player_id, amount);
            Ok(())
        })
    }

    fn transfer(&self, from: PlayerId, to: PlayerId, amount: Chips) -> Result<(), StoreError> {
        self.mutate(|book| book.transfer(from, to, amount))
    }
}
