use std::sync::Arc;

use lingo_core::model::{LanguageCatalog, LanguageId, Lesson};

use crate::error::LessonServiceError;
use crate::progress_service::ProgressService;
use crate::question_bank_service::QuestionBankService;

/// Result shown at the end of a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonReport {
    pub language: LanguageId,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u8,
    pub xp_earned: u64,
    pub high_score: u8,
}

/// Starts lessons from the question bank and reports finished ones to progress.
#[derive(Clone)]
pub struct LessonService {
    catalog: Arc<LanguageCatalog>,
    questions: Arc<QuestionBankService>,
    progress: Arc<ProgressService>,
}

impl LessonService {
    #[must_use]
    pub fn new(
        catalog: Arc<LanguageCatalog>,
        questions: Arc<QuestionBankService>,
        progress: Arc<ProgressService>,
    ) -> Self {
        Self {
            catalog,
            questions,
            progress,
        }
    }

    /// Begin a lesson over every question stored for the language.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::UnknownLanguage` if the language is not
    /// in the catalog and `LessonServiceError::NoQuestions` if it has no questions.
    pub async fn start(&self, language: &LanguageId) -> Result<Lesson, LessonServiceError> {
        let entry = self
            .catalog
            .get(language)
            .ok_or_else(|| LessonServiceError::UnknownLanguage {
                language: language.clone(),
            })?;

        let questions = self.questions.questions_for(entry.name()).await;
        if questions.is_empty() {
            return Err(LessonServiceError::NoQuestions {
                language: entry.name().to_string(),
            });
        }

        tracing::debug!(language = %language, questions = questions.len(), "lesson started");
        Ok(Lesson::new(language.clone(), questions)?)
    }

    /// Report a completed lesson to progress tracking.
    ///
    /// Takes the lesson by value: a playthrough is reported at most once.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Lesson` if questions remain unanswered.
    pub async fn finish(&self, lesson: Lesson) -> Result<LessonReport, LessonServiceError> {
        let outcome = lesson.outcome()?;
        let language = lesson.language().clone();

        let xp_earned = self
            .progress
            .record_outcome(language.clone(), outcome)
            .await;
        let high_score = self
            .progress
            .language_progress(&language)
            .await
            .map_or(outcome.percentage(), |p| p.high_score());

        Ok(LessonReport {
            language,
            score: outcome.score(),
            total_questions: outcome.total_questions(),
            percentage: outcome.percentage(),
            xp_earned,
            high_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lingo_core::model::LessonError;
    use lingo_core::time::fixed_clock;
    use storage::repository::Storage;

    async fn service() -> (LessonService, Arc<ProgressService>) {
        let storage = Storage::in_memory();
        let progress = Arc::new(ProgressService::load(fixed_clock(), storage.progress).await);
        let questions = Arc::new(QuestionBankService::load(storage.questions).await);
        let lessons = LessonService::new(
            Arc::new(LanguageCatalog::builtin()),
            questions,
            Arc::clone(&progress),
        );
        (lessons, progress)
    }

    #[tokio::test]
    async fn perfect_lesson_reports_full_marks() {
        let (lessons, progress) = service().await;
        let french = LanguageId::new("french").unwrap();

        let mut lesson = lessons.start(&french).await.unwrap();
        while let Some(question) = lesson.current_question() {
            let correct = question.correct_index();
            lesson.answer(correct).unwrap();
        }

        let report = lessons.finish(lesson).await.unwrap();
        assert_eq!(report.score, 5);
        assert_eq!(report.percentage, 100);
        assert_eq!(report.xp_earned, 50);
        assert_eq!(report.high_score, 100);

        let stored = progress.language_progress(&french).await.unwrap();
        assert_eq!(stored.completed_lessons(), 1);
        assert_eq!(progress.total_xp().await, 50);
    }

    #[tokio::test]
    async fn unfinished_lesson_is_not_recorded() {
        let (lessons, progress) = service().await;
        let german = LanguageId::new("german").unwrap();

        let mut lesson = lessons.start(&german).await.unwrap();
        lesson.answer(0).unwrap();
        let err = lessons.finish(lesson).await.unwrap_err();
        assert!(matches!(
            err,
            LessonServiceError::Lesson(LessonError::Incomplete { .. })
        ));
        assert!(progress.language_progress(&german).await.is_none());
    }

    #[tokio::test]
    async fn unknown_language_cannot_start() {
        let (lessons, _progress) = service().await;
        let err = lessons
            .start(&LanguageId::new("klingon").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, LessonServiceError::UnknownLanguage { .. }));
    }
}
