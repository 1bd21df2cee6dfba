use async_trait::async_trait;
use lingo_core::model::{ProgressBook, QuestionBank};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::keys::StorageKey;
use crate::records;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable string-to-string store, the analogue of browser local storage.
///
/// Writes complete before the returned future resolves.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key was never written or was removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be read.
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    /// Write several entries together. Backends that support it apply them atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be written.
    async fn set_many(&self, entries: &[(StorageKey, String)]) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be written.
    async fn remove(&self, key: StorageKey) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be written.
    async fn set(&self, key: StorageKey, value: String) -> Result<(), StorageError> {
        self.set_many(&[(key, value)]).await
    }

    /// Release backend resources. Further calls may fail.
    async fn close(&self) {}
}

/// Persistence of the progress book (`progress_data` + `progress_xp`).
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the persisted book; absent keys read as an empty book.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage is unavailable or holds malformed data.
    async fn load_progress(&self) -> Result<ProgressBook, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the book cannot be written.
    async fn save_progress(&self, book: &ProgressBook) -> Result<(), StorageError>;
}

/// Persistence of the admin gate flag (`admin_flag`).
#[async_trait]
pub trait AccessRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if storage is unavailable.
    async fn load_admin_flag(&self) -> Result<bool, StorageError>;

    /// Store `true`, or remove the flag for `false`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if storage is unavailable.
    async fn save_admin_flag(&self, is_admin: bool) -> Result<(), StorageError>;
}

/// Persistence of the question bank (`question_bank`).
#[async_trait]
pub trait QuestionBankRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if storage is unavailable or the bank is malformed.
    async fn load_question_bank(&self) -> Result<Option<QuestionBank>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the bank cannot be written.
    async fn save_question_bank(&self, bank: &QuestionBank) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: KeyValueStore> ProgressRepository for T {
    async fn load_progress(&self) -> Result<ProgressBook, StorageError> {
        let data = self.get(StorageKey::ProgressData).await?;
        let xp = self.get(StorageKey::ProgressXp).await?;
        records::decode_progress(data.as_deref(), xp.as_deref())
    }

    async fn save_progress(&self, book: &ProgressBook) -> Result<(), StorageError> {
        let entries = records::encode_progress(book)?;
        self.set_many(&entries).await
    }
}

#[async_trait]
impl<T: KeyValueStore> AccessRepository for T {
    async fn load_admin_flag(&self) -> Result<bool, StorageError> {
        let raw = self.get(StorageKey::AdminFlag).await?;
        Ok(records::decode_admin_flag(raw.as_deref()))
    }

    async fn save_admin_flag(&self, is_admin: bool) -> Result<(), StorageError> {
        if is_admin {
            self.set(StorageKey::AdminFlag, records::ADMIN_FLAG_SET.to_string())
                .await
        } else {
            self.remove(StorageKey::AdminFlag).await
        }
    }
}

#[async_trait]
impl<T: KeyValueStore> QuestionBankRepository for T {
    async fn load_question_bank(&self) -> Result<Option<QuestionBank>, StorageError> {
        self.get(StorageKey::QuestionBank)
            .await?
            .map(|raw| records::decode_question_bank(&raw))
            .transpose()
    }

    async fn save_question_bank(&self, bank: &QuestionBank) -> Result<(), StorageError> {
        let raw = records::encode_question_bank(bank)?;
        self.set(StorageKey::QuestionBank, raw).await
    }
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<StorageKey, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    async fn set_many(&self, entries: &[(StorageKey, String)]) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for (key, value) in entries {
            guard.insert(*key, value.clone());
        }
        Ok(())
    }

    async fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&key);
        Ok(())
    }
}

/// Aggregates the typed repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub access: Arc<dyn AccessRepository>,
    pub questions: Arc<dyn QuestionBankRepository>,
    backend: Arc<dyn KeyValueStore>,
}

impl Storage {
    /// Wire every repository to one key-value backend.
    #[must_use]
    pub fn from_store<S>(store: S) -> Self
    where
        S: KeyValueStore + Clone + 'static,
    {
        let progress: Arc<dyn ProgressRepository> = Arc::new(store.clone());
        let access: Arc<dyn AccessRepository> = Arc::new(store.clone());
        let questions: Arc<dyn QuestionBankRepository> = Arc::new(store.clone());
        let backend: Arc<dyn KeyValueStore> = Arc::new(store);
        Self {
            progress,
            access,
            questions,
            backend,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryStore::new())
    }

    /// Raw access to the backend, for tooling that inspects stored values.
    #[must_use]
    pub fn backend(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.backend)
    }

    pub async fn close(&self) {
        self.backend.close().await;
    }
}
