use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::QuestionId;

/// Every question offers exactly this many answers.
pub const OPTION_COUNT: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyPrompt,

    #[error("option {index} cannot be empty")]
    EmptyOption { index: usize },

    #[error("correct answer index {index} is out of range")]
    CorrectOutOfRange { index: usize },

    #[error("language name cannot be empty")]
    EmptyLanguage,

    #[error("question {id} not found")]
    NotFound { id: QuestionId },
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "QuestionRecord")]
pub struct Question {
    id: QuestionId,
    question: String,
    audio_text: String,
    options: [String; OPTION_COUNT],
    correct: usize,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.question
    }

    /// Text spoken aloud for this question; may be empty.
    #[must_use]
    pub fn audio_text(&self) -> &str {
        &self.audio_text
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct
    }
}

/// Unvalidated question fields as entered in the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    pub question: String,
    pub audio_text: String,
    pub options: [String; OPTION_COUNT],
    pub correct: usize,
}

impl QuestionDraft {
    /// Trim and validate the draft into a question with the given id.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt or any option is blank, or the
    /// correct index does not point at an option.
    pub fn validate(self, id: QuestionId) -> Result<Question, QuestionError> {
        let question = self.question.trim().to_string();
        if question.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }

        let mut options: [String; OPTION_COUNT] = Default::default();
        for (index, (slot, raw)) in options.iter_mut().zip(self.options).enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(QuestionError::EmptyOption { index });
            }
            *slot = trimmed.to_string();
        }

        if self.correct >= OPTION_COUNT {
            return Err(QuestionError::CorrectOutOfRange {
                index: self.correct,
            });
        }

        Ok(Question {
            id,
            question,
            audio_text: self.audio_text.trim().to_string(),
            options,
            correct: self.correct,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRecord {
    id: QuestionId,
    question: String,
    #[serde(default)]
    audio_text: String,
    options: [String; OPTION_COUNT],
    correct: usize,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        QuestionDraft {
            question: record.question,
            audio_text: record.audio_text,
            options: record.options,
            correct: record.correct,
        }
        .validate(record.id)
    }
}

/// Questions grouped by language display name, in lesson order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    languages: BTreeMap<String, Vec<Question>>,
}

impl QuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of languages that have an entry, even an empty one.
    pub fn language_names(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    /// Questions for a language; empty when the language has none.
    #[must_use]
    pub fn questions_for(&self, language: &str) -> &[Question] {
        self.languages
            .get(language)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.languages.values().map(Vec::len).sum()
    }

    /// One past the largest id in the bank.
    #[must_use]
    pub fn next_id(&self) -> QuestionId {
        self.languages
            .values()
            .flatten()
            .map(Question::id)
            .max()
            .map_or(QuestionId::new(1), |max| max.next())
    }

    /// Append a question to a language.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the language name is blank or the draft is invalid.
    pub fn add(&mut self, language: &str, draft: QuestionDraft) -> Result<QuestionId, QuestionError> {
        let language = language_key(language)?;
        let question = draft.validate(self.next_id())?;
        let id = question.id();
        self.languages.entry(language).or_default().push(question);
        Ok(id)
    }

    /// Replace the contents of an existing question, keeping its id and position.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::NotFound` if the language has no such question,
    /// or a validation error for the draft.
    pub fn update(
        &mut self,
        language: &str,
        id: QuestionId,
        draft: QuestionDraft,
    ) -> Result<(), QuestionError> {
        let slot = self
            .languages
            .get_mut(language.trim())
            .and_then(|questions| questions.iter_mut().find(|q| q.id == id))
            .ok_or(QuestionError::NotFound { id })?;
        *slot = draft.validate(id)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuestionError::NotFound` if the language has no such question.
    pub fn remove(&mut self, language: &str, id: QuestionId) -> Result<Question, QuestionError> {
        let questions = self
            .languages
            .get_mut(language.trim())
            .ok_or(QuestionError::NotFound { id })?;
        let index = questions
            .iter()
            .position(|q| q.id == id)
            .ok_or(QuestionError::NotFound { id })?;
        Ok(questions.remove(index))
    }

    /// The starter bank: five greetings per built-in language.
    #[must_use]
    pub fn defaults() -> Self {
        const GREETINGS: [&str; 4] = ["Hello", "Goodbye", "Thank you", "Please"];
        const YES_NO: [&str; 4] = ["No", "Yes", "Maybe", "Please"];
        const YES_NO_HELLO: [&str; 4] = ["No", "Yes", "Maybe", "Hello"];

        let table: [(&str, [(&str, &str, [&str; 4], usize); 5]); 4] = [
            (
                "Spanish",
                [
                    ("What does 'Hola' mean?", "Hola", GREETINGS, 0),
                    ("What does 'Gracias' mean?", "Gracias", GREETINGS, 2),
                    ("What does 'Adiós' mean?", "Adiós", GREETINGS, 1),
                    ("What does 'Sí' mean?", "Sí", YES_NO, 1),
                    ("What does 'Por favor' mean?", "Por favor", GREETINGS, 3),
                ],
            ),
            (
                "French",
                [
                    ("What does 'Bonjour' mean?", "Bonjour", GREETINGS, 0),
                    ("What does 'Merci' mean?", "Merci", GREETINGS, 2),
                    ("What does 'Au revoir' mean?", "Au revoir", GREETINGS, 1),
                    ("What does 'S'il vous plaît' mean?", "S'il vous plaît", GREETINGS, 3),
                    ("What does 'Oui' mean?", "Oui", YES_NO_HELLO, 1),
                ],
            ),
            (
                "German",
                [
                    ("What does 'Hallo' mean?", "Hallo", GREETINGS, 0),
                    ("What does 'Danke' mean?", "Danke", GREETINGS, 2),
                    ("What does 'Tschüss' mean?", "Tschüss", GREETINGS, 1),
                    ("What does 'Ja' mean?", "Ja", YES_NO, 1),
                    ("What does 'Bitte' mean?", "Bitte", GREETINGS, 3),
                ],
            ),
            (
                "Japanese",
                [
                    ("What does 'こんにちは (Konnichiwa)' mean?", "こんにちは", GREETINGS, 0),
                    ("What does 'ありがとう (Arigatou)' mean?", "ありがとう", GREETINGS, 2),
                    ("What does 'さようなら (Sayounara)' mean?", "さようなら", GREETINGS, 1),
                    ("What does 'はい (Hai)' mean?", "はい", YES_NO_HELLO, 1),
                    (
                        "What does 'お願いします (Onegaishimasu)' mean?",
                        "お願いします",
                        GREETINGS,
                        3,
                    ),
                ],
            ),
        ];

        let mut next = QuestionId::new(1);
        let mut languages = BTreeMap::new();
        for (language, rows) in table {
            let questions = rows
                .into_iter()
                .map(|(prompt, audio, options, correct)| {
                    let id = next;
                    next = next.next();
                    Question {
                        id,
                        question: prompt.to_string(),
                        audio_text: audio.to_string(),
                        options: options.map(str::to_string),
                        correct,
                    }
                })
                .collect();
            languages.insert(language.to_string(), questions);
        }

        Self { languages }
    }
}

fn language_key(language: &str) -> Result<String, QuestionError> {
    let trimmed = language.trim();
    if trimmed.is_empty() {
        return Err(QuestionError::EmptyLanguage);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(prompt: &str, correct: usize) -> QuestionDraft {
        QuestionDraft {
            question: prompt.to_string(),
            audio_text: "Ciao".to_string(),
            options: ["Hello".into(), "Goodbye".into(), "Thanks".into(), "Please".into()],
            correct,
        }
    }

    #[test]
    fn defaults_cover_builtin_languages_with_sequential_ids() {
        let bank = QuestionBank::defaults();
        assert_eq!(bank.total_questions(), 20);
        assert_eq!(bank.questions_for("Spanish").len(), 5);
        assert_eq!(bank.questions_for("Japanese")[4].id(), QuestionId::new(20));
        assert_eq!(bank.questions_for("French")[0].prompt(), "What does 'Bonjour' mean?");
        assert!(bank.questions_for("German")[1].is_correct(2));
        assert_eq!(bank.next_id(), QuestionId::new(21));
    }

    #[test]
    fn draft_validation_rejects_blank_fields() {
        assert_eq!(
            draft("   ", 0).validate(QuestionId::new(1)),
            Err(QuestionError::EmptyPrompt)
        );

        let mut blank_option = draft("Q?", 0);
        blank_option.options[2] = " ".into();
        assert_eq!(
            blank_option.validate(QuestionId::new(1)),
            Err(QuestionError::EmptyOption { index: 2 })
        );

        assert_eq!(
            draft("Q?", 4).validate(QuestionId::new(1)),
            Err(QuestionError::CorrectOutOfRange { index: 4 })
        );
    }

    #[test]
    fn add_update_remove_round_trip() {
        let mut bank = QuestionBank::new();
        let id = bank.add("Italian", draft("What does 'Ciao' mean?", 0)).unwrap();
        assert_eq!(id, QuestionId::new(1));

        bank.update("Italian", id, draft("What does 'Ciao' mean here?", 1))
            .unwrap();
        let question = &bank.questions_for("Italian")[0];
        assert_eq!(question.prompt(), "What does 'Ciao' mean here?");
        assert_eq!(question.correct_index(), 1);

        let removed = bank.remove("Italian", id).unwrap();
        assert_eq!(removed.id(), id);
        assert!(bank.questions_for("Italian").is_empty());
        assert_eq!(
            bank.remove("Italian", id),
            Err(QuestionError::NotFound { id })
        );
    }

    #[test]
    fn update_unknown_question_is_not_found() {
        let mut bank = QuestionBank::defaults();
        let id = QuestionId::new(99);
        assert_eq!(
            bank.update("Spanish", id, draft("Q?", 0)),
            Err(QuestionError::NotFound { id })
        );
        assert_eq!(
            bank.add(" ", draft("Q?", 0)),
            Err(QuestionError::EmptyLanguage)
        );
    }

    #[test]
    fn bank_json_matches_stored_layout() {
        let bank = QuestionBank::defaults();
        let json = serde_json::to_value(&bank).unwrap();
        let first = &json["Spanish"][0];
        assert_eq!(first["id"], 1);
        assert_eq!(first["audioText"], "Hola");
        assert_eq!(first["correct"], 0);
        assert_eq!(first["options"][3], "Please");

        let parsed: QuestionBank = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, bank);

        let bad = r#"{"Spanish":[{"id":1,"question":"Q","audioText":"","options":["a","b","c","d"],"correct":7}]}"#;
        assert!(serde_json::from_str::<QuestionBank>(bad).is_err());
    }
}
