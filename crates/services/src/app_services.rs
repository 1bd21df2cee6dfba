use std::sync::Arc;

use lingo_core::model::{AdminSecret, LanguageCatalog};
use storage::repository::Storage;

use crate::auth_service::AuthService;
use crate::error::AppServicesError;
use crate::lesson_service::LessonService;
use crate::progress_service::ProgressService;
use crate::question_bank_service::QuestionBankService;
use crate::Clock;

/// Builds every app-facing service once and hands out shared handles.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    catalog: Arc<LanguageCatalog>,
    progress: Arc<ProgressService>,
    auth: Arc<AuthService>,
    questions: Arc<QuestionBankService>,
    lessons: Arc<LessonService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        secret: AdminSecret,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock, secret).await)
    }

    /// Build services over in-memory storage; nothing outlives the process.
    pub async fn in_memory(clock: Clock, secret: AdminSecret) -> Self {
        Self::from_storage(Storage::in_memory(), clock, secret).await
    }

    /// Load every store from `storage`.
    pub async fn from_storage(storage: Storage, clock: Clock, secret: AdminSecret) -> Self {
        let catalog = Arc::new(LanguageCatalog::builtin());
        let progress = Arc::new(ProgressService::load(clock, Arc::clone(&storage.progress)).await);
        let auth = Arc::new(AuthService::load(secret, Arc::clone(&storage.access)).await);
        let questions =
            Arc::new(QuestionBankService::load(Arc::clone(&storage.questions)).await);
        let lessons = Arc::new(LessonService::new(
            Arc::clone(&catalog),
            Arc::clone(&questions),
            Arc::clone(&progress),
        ));

        Self {
            storage,
            catalog,
            progress,
            auth,
            questions,
            lessons,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<LanguageCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn questions(&self) -> Arc<QuestionBankService> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn lessons(&self) -> Arc<LessonService> {
        Arc::clone(&self.lessons)
    }

    /// Close the storage backend. Every write has already completed.
    pub async fn shutdown(self) {
        self.storage.close().await;
    }
}
