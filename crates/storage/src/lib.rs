#![forbid(unsafe_code)]

pub mod keys;
pub mod records;
pub mod repository;
pub mod sqlite;

pub use keys::StorageKey;
pub use repository::{
    AccessRepository, InMemoryStore, KeyValueStore, ProgressRepository, QuestionBankRepository,
    Storage, StorageError,
};
