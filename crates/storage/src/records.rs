//! Encoding of domain values into the strings kept under each storage key.

use std::collections::BTreeMap;

use lingo_core::model::{LanguageId, LanguageProgress, ProgressBook, QuestionBank};

use crate::keys::StorageKey;
use crate::repository::StorageError;

/// Stored value of an unlocked admin flag.
pub const ADMIN_FLAG_SET: &str = "true";

fn ser<E: core::fmt::Display>(key: StorageKey, e: E) -> StorageError {
    StorageError::Serialization(format!("{key}: {e}"))
}

/// # Errors
///
/// Returns `StorageError::Serialization` if the book cannot be encoded.
pub fn encode_progress(book: &ProgressBook) -> Result<[(StorageKey, String); 2], StorageError> {
    let data = serde_json::to_string(book.languages())
        .map_err(|e| ser(StorageKey::ProgressData, e))?;
    let xp = serde_json::to_string(&book.total_xp()).map_err(|e| ser(StorageKey::ProgressXp, e))?;
    Ok([
        (StorageKey::ProgressData, data),
        (StorageKey::ProgressXp, xp),
    ])
}

/// Rebuild a progress book; missing values read as empty / zero.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if either value is present but malformed.
pub fn decode_progress(
    data: Option<&str>,
    xp: Option<&str>,
) -> Result<ProgressBook, StorageError> {
    let languages: BTreeMap<LanguageId, LanguageProgress> = match data {
        Some(raw) => serde_json::from_str(raw).map_err(|e| ser(StorageKey::ProgressData, e))?,
        None => BTreeMap::new(),
    };
    let total_xp: u64 = match xp {
        Some(raw) => serde_json::from_str(raw.trim()).map_err(|e| ser(StorageKey::ProgressXp, e))?,
        None => 0,
    };
    Ok(ProgressBook::from_parts(languages, total_xp))
}

#[must_use]
pub fn decode_admin_flag(raw: Option<&str>) -> bool {
    raw.is_some_and(|value| value == ADMIN_FLAG_SET)
}

/// # Errors
///
/// Returns `StorageError::Serialization` if the bank cannot be encoded.
pub fn encode_question_bank(bank: &QuestionBank) -> Result<String, StorageError> {
    serde_json::to_string(bank).map_err(|e| ser(StorageKey::QuestionBank, e))
}

/// # Errors
///
/// Returns `StorageError::Serialization` if the stored bank is malformed or
/// holds an invalid question.
pub fn decode_question_bank(raw: &str) -> Result<QuestionBank, StorageError> {
    serde_json::from_str(raw).map_err(|e| ser(StorageKey::QuestionBank, e))
}
