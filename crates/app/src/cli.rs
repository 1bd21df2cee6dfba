use clap::{Args, Parser, Subcommand};
use lingo_core::model::{DEFAULT_ADMIN_SECRET, LanguageId, OPTION_COUNT, QuestionDraft};

use crate::config::DEFAULT_DB_URL;

#[derive(Debug, Parser)]
#[command(name = "lingo", version, about = "Practice language quizzes and track your XP")]
pub struct Cli {
    /// `SQLite` database URL or path.
    #[arg(long, env = "LINGO_DB_URL", default_value = DEFAULT_DB_URL, global = true)]
    pub db: String,

    /// Password that unlocks admin mode.
    #[arg(
        long,
        env = "LINGO_ADMIN_SECRET",
        default_value = DEFAULT_ADMIN_SECRET,
        hide_default_value = true,
        hide_env_values = true,
        global = true
    )]
    pub admin_secret: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the available languages.
    Languages,
    /// Show progress for one language, or for all of them.
    Progress {
        #[arg(value_parser = parse_language)]
        language: Option<LanguageId>,
    },
    /// Show totals across every language.
    Stats,
    /// Record a finished lesson without playing it.
    Complete {
        #[arg(value_parser = parse_language)]
        language: LanguageId,
        score: u32,
        total: u32,
    },
    /// Play a lesson interactively.
    Lesson {
        #[arg(value_parser = parse_language)]
        language: LanguageId,
    },
    /// Wipe all progress and XP.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Enter admin mode.
    Login { password: String },
    /// Leave admin mode.
    Logout,
    /// Show the current access level.
    Whoami,
    /// Inspect or edit the question bank.
    #[command(subcommand)]
    Questions(QuestionsCommand),
    /// Write the default question bank.
    Seed {
        /// Overwrite an existing bank.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum QuestionsCommand {
    /// List the questions for a language.
    List { language: String },
    /// Add a question (admin only).
    Add(QuestionArgs),
    /// Replace a question (admin only).
    Update {
        #[arg(long)]
        id: u64,
        #[command(flatten)]
        question: QuestionArgs,
    },
    /// Delete a question (admin only).
    Delete {
        language: String,
        #[arg(long)]
        id: u64,
    },
}

#[derive(Debug, Clone, Args)]
pub struct QuestionArgs {
    /// Language id or display name, e.g. `spanish` or `Spanish`.
    #[arg(long)]
    pub language: String,

    #[arg(long)]
    pub question: String,

    /// Text read aloud with the question.
    #[arg(long, default_value = "")]
    pub audio: String,

    /// The four answer options, in order.
    #[arg(long = "option", required = true, num_args = OPTION_COUNT)]
    pub options: Vec<String>,

    /// Number of the correct option, 1 to 4.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub correct: u8,
}

impl QuestionArgs {
    /// Build a draft; `correct` becomes a zero-based index.
    #[must_use]
    pub fn to_draft(&self) -> Option<QuestionDraft> {
        let options: [String; OPTION_COUNT] = self.options.clone().try_into().ok()?;
        Some(QuestionDraft {
            question: self.question.clone(),
            audio_text: self.audio.clone(),
            options,
            correct: usize::from(self.correct) - 1,
        })
    }
}

fn parse_language(raw: &str) -> Result<LanguageId, lingo_core::model::LanguageError> {
    LanguageId::new(raw)
}
