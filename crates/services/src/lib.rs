#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth_service;
pub mod error;
pub mod lesson_service;
pub mod progress_service;
pub mod question_bank_service;

pub use lingo_core::Clock;

pub use app_services::AppServices;
pub use auth_service::AuthService;
pub use error::{
    AppServicesError, LessonServiceError, ProgressServiceError, QuestionBankServiceError,
};
pub use lesson_service::{LessonReport, LessonService};
pub use progress_service::ProgressService;
pub use question_bank_service::QuestionBankService;
