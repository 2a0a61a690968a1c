use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::ServiceError;
use crate::model::{Pet, User};
use crate::storage::json_table::JsonTable;

/// Whole-table persistence for users and pets.
///
/// Implementations only load and save complete tables. Callers that mutate
/// pets hold `pets_write_lock` across their load/save pair so concurrent
/// writers in the same process cannot overwrite each other.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn load_users(&self) -> Result<Vec<User>, ServiceError>;
    async fn save_users(&self, users: &[User]) -> Result<(), ServiceError>;
    async fn load_pets(&self) -> Result<Vec<Pet>, ServiceError>;
    async fn save_pets(&self, pets: &[Pet]) -> Result<(), ServiceError>;
    fn pets_write_lock(&self) -> &Mutex<()>;
}

/// File-backed store: `users` and `pets` as two sibling JSON array files.
pub struct JsonFileStore {
    users: JsonTable<User>,
    pets: JsonTable<Pet>,
    pets_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new<U: Into<PathBuf>, P: Into<PathBuf>>(users_path: U, pets_path: P) -> Self {
        Self { users: JsonTable::new(users_path), pets: JsonTable::new(pets_path), pets_lock: Mutex::new(()) }
    }

    /// `users.json` and `pets.json` inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join("users.json"), dir.join("pets.json"))
    }

    /// Create both files (as empty arrays) if they do not exist yet.
    pub async fn ensure_files(&self) -> Result<(), ServiceError> {
        self.users.ensure().await?;
        self.pets.ensure().await?;
        debug!(users = %self.users.path().display(), pets = %self.pets.path().display(), "tables ready");
        Ok(())
    }

    pub fn users_path(&self) -> &Path {
        self.users.path()
    }

    pub fn pets_path(&self) -> &Path {
        self.pets.path()
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn load_users(&self) -> Result<Vec<User>, ServiceError> { self.users.load().await }
    async fn save_users(&self, users: &[User]) -> Result<(), ServiceError> { self.users.save(users).await }
    async fn load_pets(&self) -> Result<Vec<Pet>, ServiceError> { self.pets.load().await }
    async fn save_pets(&self, pets: &[Pet]) -> Result<(), ServiceError> { self.pets.save(pets).await }
    fn pets_write_lock(&self) -> &Mutex<()> { &self.pets_lock }
}

/// In-memory store for tests. Counts pet table writes.
#[derive(Default)]
pub struct MemoryRecordStore {
    users: StdMutex<Vec<User>>,
    pets: StdMutex<Vec<Pet>>,
    pets_lock: Mutex<()>,
    pet_saves: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn with_data(users: Vec<User>, pets: Vec<Pet>) -> Self {
        Self { users: StdMutex::new(users), pets: StdMutex::new(pets), ..Default::default() }
    }

    /// Number of `save_pets` calls so far.
    pub fn pet_saves(&self) -> usize {
        self.pet_saves.load(Ordering::SeqCst)
    }

    fn lock<T>(m: &StdMutex<T>) -> Result<std::sync::MutexGuard<'_, T>, ServiceError> {
        m.lock().map_err(|_| ServiceError::Db("memory store poisoned".into()))
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn load_users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(Self::lock(&self.users)?.clone())
    }

    async fn save_users(&self, users: &[User]) -> Result<(), ServiceError> {
        *Self::lock(&self.users)? = users.to_vec();
        Ok(())
    }

    async fn load_pets(&self) -> Result<Vec<Pet>, ServiceError> {
        Ok(Self::lock(&self.pets)?.clone())
    }

    async fn save_pets(&self, pets: &[Pet]) -> Result<(), ServiceError> {
        *Self::lock(&self.pets)? = pets.to_vec();
        self.pet_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn pets_write_lock(&self) -> &Mutex<()> { &self.pets_lock }
}
