//! Shared error types for the services crate.

use thiserror::Error;

use lingo_core::model::{LanguageId, LessonError, ProgressError, QuestionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressService`.
///
/// Storage failures never show up here: they are logged and the in-memory
/// state carries on.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    InvalidLessonData(#[from] ProgressError),
}

/// Errors emitted by `QuestionBankService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionBankServiceError {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `LessonService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonServiceError {
    #[error("unknown language: {language}")]
    UnknownLanguage { language: LanguageId },
    #[error("no questions available for {language}")]
    NoQuestions { language: String },
    #[error(transparent)]
    Lesson(#[from] LessonError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
