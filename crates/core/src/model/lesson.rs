use thiserror::Error;

use crate::model::{LanguageId, LessonOutcome, ProgressError, Question, QuestionId, OPTION_COUNT};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson has no questions")]
    Empty,

    #[error("lesson already finished")]
    Finished,

    #[error("answer {choice} is not one of the options")]
    InvalidChoice { choice: usize },

    #[error("lesson incomplete: {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },

    #[error(transparent)]
    Outcome(#[from] ProgressError),
}

/// What the student sees after picking an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub question_id: QuestionId,
    pub chosen: usize,
    pub correct_index: usize,
    pub is_correct: bool,
}

/// Position within a lesson, for progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

/// One playthrough of a fixed list of questions.
///
/// Questions are answered strictly in order; each answer advances to the
/// next question. Once all are answered the lesson yields its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    language: LanguageId,
    questions: Vec<Question>,
    current: usize,
    correct: u32,
}

impl Lesson {
    /// # Errors
    ///
    /// Returns `LessonError::Empty` if there are no questions.
    pub fn new(language: LanguageId, questions: Vec<Question>) -> Result<Self, LessonError> {
        if questions.is_empty() {
            return Err(LessonError::Empty);
        }
        Ok(Self {
            language,
            questions,
            current: 0,
            correct: 0,
        })
    }

    #[must_use]
    pub fn language(&self) -> &LanguageId {
        &self.language
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Correct answers so far.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current >= self.questions.len()
    }

    #[must_use]
    pub fn progress(&self) -> LessonProgress {
        let total = self.questions.len();
        let answered = self.current.min(total);
        LessonProgress {
            total,
            answered,
            remaining: total - answered,
            is_complete: self.is_complete(),
        }
    }

    /// Grade `choice` against the current question and move on.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Finished` when every question is answered, or
    /// `LessonError::InvalidChoice` when `choice` is not an option index. An
    /// invalid choice does not consume the question.
    pub fn answer(&mut self, choice: usize) -> Result<AnswerFeedback, LessonError> {
        let question = self.current_question().ok_or(LessonError::Finished)?;
        if choice >= OPTION_COUNT {
            return Err(LessonError::InvalidChoice { choice });
        }

        let feedback = AnswerFeedback {
            question_id: question.id(),
            chosen: choice,
            correct_index: question.correct_index(),
            is_correct: question.is_correct(choice),
        };

        if feedback.is_correct {
            self.correct += 1;
        }
        self.current += 1;
        Ok(feedback)
    }

    /// Final score of a completed lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Incomplete` while questions remain.
    pub fn outcome(&self) -> Result<LessonOutcome, LessonError> {
        if !self.is_complete() {
            return Err(LessonError::Incomplete {
                answered: self.current,
                total: self.questions.len(),
            });
        }
        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        Ok(LessonOutcome::new(self.correct, total)?)
    }
}
