mod access;
mod ids;
mod language;
mod lesson;
mod progress;
mod question;

pub use ids::QuestionId;

pub use access::{AccessLevel, AdminSecret, DEFAULT_ADMIN_SECRET};
pub use language::{FALLBACK_SPEECH_TAG, Language, LanguageCatalog, LanguageError, LanguageId};
pub use lesson::{AnswerFeedback, Lesson, LessonError, LessonProgress};
pub use progress::{
    LanguageProgress, LessonOutcome, ProgressBook, ProgressError, ProgressStats,
    XP_PER_CORRECT_ANSWER,
};
pub use question::{OPTION_COUNT, Question, QuestionBank, QuestionDraft, QuestionError};
