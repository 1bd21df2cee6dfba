use std::io::{BufRead, Write};

use lingo_core::model::{LanguageCatalog, LanguageId, LanguageProgress, Lesson, QuestionId};
use services::{AppServices, LessonReport, LessonService};
use thiserror::Error;

use crate::cli::{Command, QuestionArgs, QuestionsCommand};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Error)]
enum CommandError {
    #[error("admin login required (run `lingo login <password>`)")]
    AdminRequired,
    #[error("exactly four options are required, got {given}")]
    OptionCount { given: usize },
    #[error("lesson abandoned, nothing recorded")]
    LessonAbandoned,
}

/// Run one CLI command against `services`, reading answers from `input`.
pub async fn dispatch<R: BufRead, W: Write>(
    services: &AppServices,
    command: Command,
    input: &mut R,
    out: &mut W,
) -> CommandResult {
    match command {
        Command::Languages => languages(services, out).await,
        Command::Progress { language } => progress(services, language.as_ref(), out).await,
        Command::Stats => stats(services, out).await,
        Command::Complete {
            language,
            score,
            total,
        } => {
            let xp = services
                .progress()
                .record_completion(&language, score, total)
                .await?;
            writeln!(out, "Recorded {score}/{total} for {language} (+{xp} XP)")?;
            Ok(())
        }
        Command::Lesson { language } => {
            let lesson = services.lessons().start(&language).await?;
            let speech_tag = services.catalog().speech_tag_for(&language).to_string();
            let report = play_lesson(&services.lessons(), lesson, &speech_tag, input, out).await?;
            print_report(&services.catalog(), &report, out)
        }
        Command::Reset { yes } => {
            if !yes
                && !confirm(
                    "Reset all progress and XP? This cannot be undone.",
                    input,
                    out,
                )?
            {
                writeln!(out, "Reset cancelled")?;
                return Ok(());
            }
            services.progress().reset().await;
            writeln!(out, "Progress reset")?;
            Ok(())
        }
        Command::Login { password } => {
            if services.auth().login(&password).await {
                writeln!(out, "Logged in as admin")?;
            } else {
                writeln!(out, "Incorrect password")?;
            }
            Ok(())
        }
        Command::Logout => {
            services.auth().logout().await;
            writeln!(out, "Logged out")?;
            Ok(())
        }
        Command::Whoami => {
            writeln!(out, "{}", services.auth().access_level().await)?;
            Ok(())
        }
        Command::Questions(command) => questions(services, command, out).await,
        Command::Seed { force } => {
            let questions = services.questions();
            if force {
                require_admin(services).await?;
                questions.restore_defaults().await?;
                writeln!(out, "Question bank restored to defaults")?;
            } else {
                writeln!(
                    out,
                    "Question bank ready ({} languages); use --force to restore defaults",
                    questions.language_names().await.len()
                )?;
            }
            Ok(())
        }
    }
}

async fn languages<W: Write>(services: &AppServices, out: &mut W) -> CommandResult {
    let catalog = services.catalog();
    let questions = services.questions();
    for language in catalog.all() {
        let count = questions.questions_for(language.name()).await.len();
        writeln!(
            out,
            "{:<10} {:<10} {:<6} {count} questions  {}",
            language.id(),
            language.name(),
            language.speech_tag(),
            language.description()
        )?;
    }
    Ok(())
}

async fn progress<W: Write>(
    services: &AppServices,
    language: Option<&LanguageId>,
    out: &mut W,
) -> CommandResult {
    let catalog = services.catalog();
    let book = services.progress().snapshot().await;

    if let Some(language) = language {
        let name = catalog.display_name_for(language);
        match book.get(language) {
            Some(entry) => print_progress(&name, entry, out)?,
            None => writeln!(out, "{name}: not started")?,
        }
        return Ok(());
    }

    if book.is_empty() {
        writeln!(out, "No lessons completed yet")?;
    }
    for (language, entry) in book.languages() {
        print_progress(&catalog.display_name_for(language), entry, out)?;
    }
    writeln!(out, "Total XP: {}", book.total_xp())?;
    Ok(())
}

fn print_progress<W: Write>(name: &str, entry: &LanguageProgress, out: &mut W) -> CommandResult {
    let last = entry.last_completed().map_or_else(
        || "unknown".to_string(),
        |at| at.format("%Y-%m-%d %H:%M UTC").to_string(),
    );
    writeln!(
        out,
        "{name}: last {}% of {} questions, best {}%, {} lessons, last played {last}",
        entry.last_score(),
        entry.total_questions(),
        entry.high_score(),
        entry.completed_lessons()
    )?;
    Ok(())
}

async fn stats<W: Write>(services: &AppServices, out: &mut W) -> CommandResult {
    let stats = services.progress().stats().await;
    writeln!(out, "Total XP:        {}", stats.total_xp)?;
    writeln!(out, "Lessons:         {}", stats.total_lessons)?;
    writeln!(out, "Correct answers: {}", stats.total_correct_answers)?;
    writeln!(out, "Languages:       {}", stats.languages_started)?;
    Ok(())
}

async fn questions<W: Write>(
    services: &AppServices,
    command: QuestionsCommand,
    out: &mut W,
) -> CommandResult {
    let catalog = services.catalog();
    let questions = services.questions();

    if let QuestionsCommand::List { language } = &command {
        let name = bank_language(&catalog, language);
        let list = questions.questions_for(&name).await;
        if list.is_empty() {
            writeln!(out, "No questions for {name}")?;
        }
        for question in list {
            writeln!(out, "#{} {}", question.id(), question.prompt())?;
            for (index, option) in question.options().iter().enumerate() {
                let mark = if question.is_correct(index) { "*" } else { " " };
                writeln!(out, "  {mark}{}. {option}", index + 1)?;
            }
        }
        return Ok(());
    }

    require_admin(services).await?;

    match command {
        QuestionsCommand::List { .. } => Ok(()),
        QuestionsCommand::Add(args) => {
            let name = bank_language(&catalog, &args.language);
            let id = questions.add(&name, draft(&args)?).await?;
            writeln!(out, "Added question #{id} to {name}")?;
            Ok(())
        }
        QuestionsCommand::Update { id, question } => {
            let name = bank_language(&catalog, &question.language);
            questions
                .update(&name, QuestionId::new(id), draft(&question)?)
                .await?;
            writeln!(out, "Updated question #{id} in {name}")?;
            Ok(())
        }
        QuestionsCommand::Delete { language, id } => {
            let name = bank_language(&catalog, &language);
            let removed = questions.remove(&name, QuestionId::new(id)).await?;
            writeln!(out, "Deleted question #{id}: {}", removed.prompt())?;
            Ok(())
        }
    }
}

async fn require_admin(services: &AppServices) -> Result<(), CommandError> {
    if services.auth().is_admin().await {
        Ok(())
    } else {
        Err(CommandError::AdminRequired)
    }
}

fn draft(args: &QuestionArgs) -> Result<lingo_core::model::QuestionDraft, CommandError> {
    args.to_draft().ok_or(CommandError::OptionCount {
        given: args.options.len(),
    })
}

/// Questions are grouped by display name; accept a catalog id as well.
fn bank_language(catalog: &LanguageCatalog, raw: &str) -> String {
    LanguageId::new(raw)
        .ok()
        .and_then(|id| catalog.get(&id).map(|lang| lang.name().to_string()))
        .unwrap_or_else(|| raw.trim().to_string())
}

/// Ask every question on `out` and read 1-based answers from `input`.
///
/// Unparseable answers are asked again. End of input abandons the lesson
/// without recording anything.
pub async fn play_lesson<R: BufRead, W: Write>(
    lessons: &LessonService,
    mut lesson: Lesson,
    speech_tag: &str,
    input: &mut R,
    out: &mut W,
) -> Result<LessonReport, Box<dyn std::error::Error>> {
    while let Some(question) = lesson.current_question().cloned() {
        let progress = lesson.progress();
        writeln!(
            out,
            "\nQuestion {} of {}: {}",
            progress.answered + 1,
            progress.total,
            question.prompt()
        )?;
        if !question.audio_text().is_empty() {
            writeln!(out, "  listen [{speech_tag}]: {}", question.audio_text())?;
        }
        for (index, option) in question.options().iter().enumerate() {
            writeln!(out, "  {}. {option}", index + 1)?;
        }

        let choice = loop {
            write!(out, "Your answer (1-4): ")?;
            out.flush()?;
            let Some(line) = read_line(input)? else {
                return Err(CommandError::LessonAbandoned.into());
            };
            match line.parse::<usize>() {
                Ok(n @ 1..=4) => break n - 1,
                _ => writeln!(out, "Please enter a number from 1 to 4")?,
            }
        };

        let feedback = lesson.answer(choice)?;
        if feedback.is_correct {
            writeln!(out, "Correct!")?;
        } else {
            writeln!(
                out,
                "Not quite. The answer was {}. {}",
                feedback.correct_index + 1,
                question.options()[feedback.correct_index]
            )?;
        }
    }

    Ok(lessons.finish(lesson).await?)
}

fn print_report<W: Write>(
    catalog: &LanguageCatalog,
    report: &LessonReport,
    out: &mut W,
) -> CommandResult {
    writeln!(
        out,
        "\n{} lesson complete: {}/{} ({}%), +{} XP, best {}%",
        catalog.display_name_for(&report.language),
        report.score,
        report.total_questions,
        report.percentage,
        report.xp_earned,
        report.high_score
    )?;
    Ok(())
}

fn confirm<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    out: &mut W,
) -> Result<bool, Box<dyn std::error::Error>> {
    write!(out, "{prompt} [y/N] ")?;
    out.flush()?;
    let answer = read_line(input)?.unwrap_or_default();
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn read_line<R: BufRead>(input: &mut R) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use lingo_core::model::AdminSecret;
    use lingo_core::time::fixed_clock;

    async fn services() -> AppServices {
        AppServices::in_memory(fixed_clock(), AdminSecret::default()).await
    }

    async fn run(services: &AppServices, command: Command, input: &str) -> (CommandResult, String) {
        let mut input = input.as_bytes();
        let mut out = Vec::new();
        let result = dispatch(services, command, &mut input, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    fn spanish() -> LanguageId {
        LanguageId::new("spanish").unwrap()
    }

    #[tokio::test]
    async fn lesson_reads_answers_and_records_progress() {
        let app = services().await;
        let answers: Vec<String> = app
            .questions()
            .questions_for("Spanish")
            .await
            .iter()
            .map(|q| (q.correct_index() + 1).to_string())
            .collect();
        // one garbage line is asked again
        let input = format!("nope\n{}\n", answers.join("\n"));

        let (result, output) = run(&app, Command::Lesson { language: spanish() }, &input).await;
        result.unwrap();
        assert!(output.contains("Please enter a number from 1 to 4"));
        assert!(output.contains("listen [es-ES]"));
        assert!(output.contains("Spanish lesson complete: 5/5 (100%), +50 XP, best 100%"));
        assert_eq!(app.progress().total_xp().await, 50);
    }

    #[tokio::test]
    async fn abandoned_lesson_records_nothing() {
        let app = services().await;
        let (result, _) = run(&app, Command::Lesson { language: spanish() }, "1\n").await;
        assert!(result.is_err());
        assert!(app.progress().snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn reset_requires_confirmation() {
        let app = services().await;
        app.progress()
            .record_completion(&spanish(), 3, 5)
            .await
            .unwrap();

        let (result, output) = run(&app, Command::Reset { yes: false }, "n\n").await;
        result.unwrap();
        assert!(output.contains("Reset cancelled"));
        assert_eq!(app.progress().total_xp().await, 30);

        let (result, _) = run(&app, Command::Reset { yes: false }, "y\n").await;
        result.unwrap();
        assert_eq!(app.progress().total_xp().await, 0);
    }

    #[tokio::test]
    async fn question_edits_need_admin() {
        let app = services().await;
        let args = QuestionArgs {
            language: "french".to_string(),
            question: "What does 'Merci' mean?".to_string(),
            audio: "Merci".to_string(),
            options: vec!["Thanks".into(), "Hello".into(), "Bye".into(), "Yes".into()],
            correct: 1,
        };

        let add = Command::Questions(QuestionsCommand::Add(args.clone()));
        let (result, _) = run(&app, add, "").await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("admin login required"));

        let (_, output) = run(&app, Command::Login { password: "admin123".into() }, "").await;
        assert!(output.contains("Logged in as admin"));

        let add = Command::Questions(QuestionsCommand::Add(args));
        let (result, output) = run(&app, add, "").await;
        result.unwrap();
        assert!(output.contains("to French"));
        assert_eq!(app.questions().questions_for("French").await.len(), 6);
    }

    #[tokio::test]
    async fn forced_seed_needs_admin() {
        let app = services().await;
        let args = QuestionArgs {
            language: "French".to_string(),
            question: "What does 'Chat' mean?".to_string(),
            audio: String::new(),
            options: vec!["Cat".into(), "Dog".into(), "Bird".into(), "Fish".into()],
            correct: 1,
        };
        let _ = run(&app, Command::Login { password: "admin123".into() }, "").await;
        let (result, _) = run(&app, Command::Questions(QuestionsCommand::Add(args)), "").await;
        result.unwrap();
        let _ = run(&app, Command::Logout, "").await;

        let (result, output) = run(&app, Command::Seed { force: true }, "").await;
        assert!(result.unwrap_err().to_string().contains("admin login required"));
        assert!(output.is_empty());
        assert_eq!(app.questions().questions_for("French").await.len(), 6);

        // without --force nothing is written, so guests may run it
        let (result, _) = run(&app, Command::Seed { force: false }, "").await;
        result.unwrap();

        let _ = run(&app, Command::Login { password: "admin123".into() }, "").await;
        let (result, output) = run(&app, Command::Seed { force: true }, "").await;
        result.unwrap();
        assert!(output.contains("restored to defaults"));
        assert_eq!(app.questions().questions_for("French").await.len(), 5);
    }

    #[tokio::test]
    async fn wrong_password_keeps_guest() {
        let app = services().await;
        let (_, output) = run(&app, Command::Login { password: "guess".into() }, "").await;
        assert!(output.contains("Incorrect password"));
        let (_, output) = run(&app, Command::Whoami, "").await;
        assert_eq!(output.trim(), "guest");
    }

    #[tokio::test]
    async fn progress_for_unstarted_language() {
        let app = services().await;
        let (result, output) = run(
            &app,
            Command::Progress {
                language: Some(LanguageId::new("german").unwrap()),
            },
            "",
        )
        .await;
        result.unwrap();
        assert_eq!(output.trim(), "German: not started");
    }

    #[test]
    fn bank_language_accepts_ids_and_names() {
        let catalog = LanguageCatalog::builtin();
        assert_eq!(bank_language(&catalog, "japanese"), "Japanese");
        assert_eq!(bank_language(&catalog, "Japanese"), "Japanese");
        assert_eq!(bank_language(&catalog, " Italian "), "Italian");
    }
}
