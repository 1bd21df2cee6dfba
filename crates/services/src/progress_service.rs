use std::sync::Arc;

use lingo_core::model::{
    LanguageId, LanguageProgress, LessonOutcome, ProgressBook, ProgressStats,
};
use storage::repository::ProgressRepository;
use tokio::sync::Mutex;

use crate::error::ProgressServiceError;
use crate::Clock;

/// Tracks per-language quiz results and total XP, persisting every change.
///
/// The book lock is held across the write, so a completion and its
/// persistence finish before the next mutation starts.
pub struct ProgressService {
    clock: Clock,
    repo: Arc<dyn ProgressRepository>,
    book: Mutex<ProgressBook>,
}

impl ProgressService {
    /// Load persisted progress.
    ///
    /// Unreadable or malformed progress is discarded and the service starts
    /// from an empty book with zero XP.
    pub async fn load(clock: Clock, repo: Arc<dyn ProgressRepository>) -> Self {
        let book = match repo.load_progress().await {
            Ok(book) => book,
            Err(err) => {
                tracing::warn!("Discarding unreadable progress, starting empty: {}", err);
                ProgressBook::new()
            }
        };
        tracing::debug!(
            languages = book.languages().len(),
            total_xp = book.total_xp(),
            "progress loaded"
        );

        Self {
            clock,
            repo,
            book: Mutex::new(book),
        }
    }

    /// Record a finished lesson and return the XP it earned (10 per correct answer).
    ///
    /// Not idempotent: each call counts as another completed lesson.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::InvalidLessonData` if `total_questions`
    /// is zero or `score` exceeds it. Nothing is changed in that case.
    pub async fn record_completion(
        &self,
        language: &LanguageId,
        score: u32,
        total_questions: u32,
    ) -> Result<u64, ProgressServiceError> {
        let outcome = LessonOutcome::new(score, total_questions)?;
        Ok(self.record_outcome(language.clone(), outcome).await)
    }

    /// Record an already validated outcome. See [`Self::record_completion`].
    pub async fn record_outcome(&self, language: LanguageId, outcome: LessonOutcome) -> u64 {
        let mut book = self.book.lock().await;
        let xp = book.record_completion(language.clone(), outcome, self.clock.now());
        tracing::debug!(
            language = %language,
            score = outcome.score(),
            total_questions = outcome.total_questions(),
            xp,
            "lesson completion recorded"
        );
        self.persist(&book).await;
        xp
    }

    /// `None` until a lesson has been completed in this language.
    pub async fn language_progress(&self, language: &LanguageId) -> Option<LanguageProgress> {
        self.book.lock().await.get(language).cloned()
    }

    pub async fn total_xp(&self) -> u64 {
        self.book.lock().await.total_xp()
    }

    pub async fn snapshot(&self) -> ProgressBook {
        self.book.lock().await.clone()
    }

    pub async fn stats(&self) -> ProgressStats {
        self.book.lock().await.stats()
    }

    /// Erase all progress and XP. Callers confirm with the user first.
    pub async fn reset(&self) {
        let mut book = self.book.lock().await;
        book.reset();
        tracing::info!("progress reset");
        self.persist(&book).await;
    }

    async fn persist(&self, book: &ProgressBook) {
        if let Err(err) = self.repo.save_progress(book).await {
            tracing::warn!("Failed to save progress: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use lingo_core::model::ProgressError;
    use lingo_core::time::{fixed_clock, fixed_now};
    use storage::repository::{InMemoryStore, KeyValueStore, StorageError};
    use storage::StorageKey;

    fn spanish() -> LanguageId {
        LanguageId::new("spanish").unwrap()
    }

    async fn fresh() -> (ProgressService, InMemoryStore) {
        let store = InMemoryStore::new();
        let service = ProgressService::load(fixed_clock(), Arc::new(store.clone())).await;
        (service, store)
    }

    /// Store whose reads and writes always fail.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: StorageKey) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("disk gone".into()))
        }

        async fn set_many(&self, _entries: &[(StorageKey, String)]) -> Result<(), StorageError> {
            Err(StorageError::Connection("disk gone".into()))
        }

        async fn remove(&self, _key: StorageKey) -> Result<(), StorageError> {
            Err(StorageError::Connection("disk gone".into()))
        }
    }

    #[tokio::test]
    async fn completion_scenarios_match_expected_progress() {
        let (service, _store) = fresh().await;

        assert_eq!(service.record_completion(&spanish(), 4, 5).await.unwrap(), 40);
        let progress = service.language_progress(&spanish()).await.unwrap();
        assert_eq!(progress.last_score(), 80);
        assert_eq!(progress.total_questions(), 5);
        assert_eq!(progress.completed_lessons(), 1);
        assert_eq!(progress.high_score(), 80);
        assert_eq!(progress.last_completed(), Some(fixed_now()));

        assert_eq!(service.record_completion(&spanish(), 2, 5).await.unwrap(), 20);
        let progress = service.language_progress(&spanish()).await.unwrap();
        assert_eq!(progress.last_score(), 40);
        assert_eq!(progress.high_score(), 80);
        assert_eq!(progress.completed_lessons(), 2);

        let french = LanguageId::new("french").unwrap();
        assert_eq!(service.record_completion(&french, 0, 5).await.unwrap(), 0);
        let progress = service.language_progress(&french).await.unwrap();
        assert_eq!(progress.last_score(), 0);
        assert_eq!(progress.high_score(), 0);
        assert_eq!(progress.completed_lessons(), 1);

        assert_eq!(service.total_xp().await, 60);
    }

    #[tokio::test]
    async fn xp_is_ten_per_correct_answer_and_sums() {
        let (service, _store) = fresh().await;
        let mut expected = 0;
        for total in 1..=6_u32 {
            for score in 0..=total {
                let xp = service.record_completion(&spanish(), score, total).await.unwrap();
                assert_eq!(xp, u64::from(score) * 10);
                expected += xp;
            }
        }
        assert_eq!(service.total_xp().await, expected);
        let progress = service.language_progress(&spanish()).await.unwrap();
        assert_eq!(progress.completed_lessons(), 27);
        assert_eq!(progress.high_score(), 100);
    }

    #[tokio::test]
    async fn invalid_lesson_data_changes_nothing() {
        let (service, store) = fresh().await;

        let err = service.record_completion(&spanish(), 0, 0).await.unwrap_err();
        assert!(matches!(
            err,
            ProgressServiceError::InvalidLessonData(ProgressError::InvalidLessonData { .. })
        ));
        assert!(service.record_completion(&spanish(), 6, 5).await.is_err());

        assert!(service.language_progress(&spanish()).await.is_none());
        assert_eq!(service.total_xp().await, 0);
        assert_eq!(store.get(StorageKey::ProgressXp).await.unwrap(), None);
    }

    #[tokio::test]
    async fn every_completion_is_persisted_before_returning() {
        let (service, store) = fresh().await;
        service.record_completion(&spanish(), 3, 5).await.unwrap();

        let reloaded = ProgressService::load(fixed_clock(), Arc::new(store.clone())).await;
        assert_eq!(reloaded.snapshot().await, service.snapshot().await);
        assert_eq!(reloaded.total_xp().await, 30);
    }

    #[tokio::test]
    async fn reset_survives_reload() {
        let (service, store) = fresh().await;
        service.record_completion(&spanish(), 5, 5).await.unwrap();
        service.reset().await;

        assert!(service.snapshot().await.is_empty());
        let reloaded = ProgressService::load(fixed_clock(), Arc::new(store)).await;
        assert!(reloaded.snapshot().await.languages().is_empty());
        assert_eq!(reloaded.total_xp().await, 0);
    }

    #[tokio::test]
    async fn malformed_state_loads_as_empty() {
        let store = InMemoryStore::new();
        store
            .set(StorageKey::ProgressData, "{\"spanish\": 12}".to_string())
            .await
            .unwrap();
        store
            .set(StorageKey::ProgressXp, "250".to_string())
            .await
            .unwrap();

        let service = ProgressService::load(fixed_clock(), Arc::new(store)).await;
        assert!(service.snapshot().await.is_empty());
        assert_eq!(service.total_xp().await, 0);
    }

    #[tokio::test]
    async fn unavailable_storage_is_not_fatal() {
        let service = ProgressService::load(fixed_clock(), Arc::new(BrokenStore)).await;
        assert_eq!(service.total_xp().await, 0);

        let xp = service.record_completion(&spanish(), 2, 4).await.unwrap();
        assert_eq!(xp, 20);
        assert_eq!(service.total_xp().await, 20);
        service.reset().await;
        assert_eq!(service.total_xp().await, 0);
    }

    #[tokio::test]
    async fn stats_follow_completions() {
        let (service, _store) = fresh().await;
        service.record_completion(&spanish(), 4, 5).await.unwrap();
        service
            .record_completion(&LanguageId::new("german").unwrap(), 5, 5)
            .await
            .unwrap();

        let stats = service.stats().await;
        assert_eq!(stats.total_xp, 90);
        assert_eq!(stats.total_lessons, 2);
        assert_eq!(stats.languages_started, 2);
        assert_eq!(stats.total_correct_answers, 9);
    }
}
