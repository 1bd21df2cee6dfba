use std::sync::Arc;

use lingo_core::model::{Question, QuestionBank, QuestionDraft, QuestionId};
use storage::repository::QuestionBankRepository;
use tokio::sync::Mutex;

use crate::error::QuestionBankServiceError;

/// Owns the editable question bank.
///
/// Edits are applied to a copy, persisted, and only then made visible, so a
/// failed write leaves the bank unchanged.
pub struct QuestionBankService {
    repo: Arc<dyn QuestionBankRepository>,
    bank: Mutex<QuestionBank>,
}

impl QuestionBankService {
    /// Load the stored bank, seeding the default questions when none is
    /// stored.
    ///
    /// An unreadable bank is replaced by the defaults in memory only; the
    /// stored value stays until the next edit or `restore_defaults`.
    pub async fn load(repo: Arc<dyn QuestionBankRepository>) -> Self {
        let bank = match repo.load_question_bank().await {
            Ok(Some(bank)) => bank,
            Ok(None) => {
                let defaults = QuestionBank::defaults();
                if let Err(err) = repo.save_question_bank(&defaults).await {
                    tracing::warn!("Failed to save default questions: {}", err);
                }
                tracing::debug!(questions = defaults.total_questions(), "seeded default questions");
                defaults
            }
            Err(err) => {
                tracing::warn!("Using default questions, stored bank is unreadable: {}", err);
                QuestionBank::defaults()
            }
        };

        Self {
            repo,
            bank: Mutex::new(bank),
        }
    }

    /// Questions for a language display name, in lesson order.
    pub async fn questions_for(&self, language: &str) -> Vec<Question> {
        self.bank.lock().await.questions_for(language).to_vec()
    }

    pub async fn language_names(&self) -> Vec<String> {
        self.bank
            .lock()
            .await
            .language_names()
            .map(str::to_owned)
            .collect()
    }

    pub async fn snapshot(&self) -> QuestionBank {
        self.bank.lock().await.clone()
    }

    /// # Errors
    ///
    /// Returns `QuestionBankServiceError::Question` for invalid drafts and
    /// `QuestionBankServiceError::Storage` if the bank cannot be saved.
    pub async fn add(
        &self,
        language: &str,
        draft: QuestionDraft,
    ) -> Result<QuestionId, QuestionBankServiceError> {
        let mut bank = self.bank.lock().await;
        let mut next = bank.clone();
        let id = next.add(language, draft)?;
        self.repo.save_question_bank(&next).await?;
        *bank = next;
        tracing::debug!(language, question_id = id.value(), "question added");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `QuestionBankServiceError::Question` if the question does not
    /// exist or the draft is invalid, and `QuestionBankServiceError::Storage`
    /// if the bank cannot be saved.
    pub async fn update(
        &self,
        language: &str,
        id: QuestionId,
        draft: QuestionDraft,
    ) -> Result<(), QuestionBankServiceError> {
        let mut bank = self.bank.lock().await;
        let mut next = bank.clone();
        next.update(language, id, draft)?;
        self.repo.save_question_bank(&next).await?;
        *bank = next;
        tracing::debug!(language, question_id = id.value(), "question updated");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuestionBankServiceError::Question` if the question does not
    /// exist and `QuestionBankServiceError::Storage` if the bank cannot be saved.
    pub async fn remove(
        &self,
        language: &str,
        id: QuestionId,
    ) -> Result<Question, QuestionBankServiceError> {
        let mut bank = self.bank.lock().await;
        let mut next = bank.clone();
        let removed = next.remove(language, id)?;
        self.repo.save_question_bank(&next).await?;
        *bank = next;
        tracing::debug!(language, question_id = id.value(), "question removed");
        Ok(removed)
    }

    /// Replace the whole bank with the default questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankServiceError::Storage` if the bank cannot be saved.
    pub async fn restore_defaults(&self) -> Result<(), QuestionBankServiceError> {
        let mut bank = self.bank.lock().await;
        let defaults = QuestionBank::defaults();
        self.repo.save_question_bank(&defaults).await?;
        *bank = defaults;
        tracing::info!("question bank restored to defaults");
        Ok(())
    }
}
