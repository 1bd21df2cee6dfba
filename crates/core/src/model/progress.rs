use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::LanguageId;

/// XP awarded for each correctly answered question.
pub const XP_PER_CORRECT_ANSWER: u64 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("invalid lesson data: {score} correct out of {total_questions}")]
    InvalidLessonData { score: u32, total_questions: u32 },

    #[error("{field} must be a percentage between 0 and 100, got {value}")]
    PercentageOutOfRange { field: &'static str, value: u32 },
}

/// Final result of one lesson: correct answers out of the lesson size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonOutcome {
    score: u32,
    total_questions: u32,
}

impl LessonOutcome {
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidLessonData` if `total_questions` is zero
    /// or `score` exceeds it.
    pub fn new(score: u32, total_questions: u32) -> Result<Self, ProgressError> {
        if total_questions == 0 || score > total_questions {
            return Err(ProgressError::InvalidLessonData {
                score,
                total_questions,
            });
        }
        Ok(Self {
            score,
            total_questions,
        })
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    /// Percentage correct, halves rounded up.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        let score = u64::from(self.score);
        let total = u64::from(self.total_questions);
        // floor(100 * score / total + 1/2) without floating point
        let pct = (200 * score + total) / (2 * total);
        u8::try_from(pct.min(100)).unwrap_or(100)
    }

    #[must_use]
    pub fn xp(&self) -> u64 {
        u64::from(self.score) * XP_PER_CORRECT_ANSWER
    }
}

/// Learning progress for a single language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "LanguageProgressRecord")]
pub struct LanguageProgress {
    last_score: u8,
    total_questions: u32,
    completed_lessons: u32,
    high_score: u8,
    last_completed: Option<DateTime<Utc>>,
}

impl LanguageProgress {
    /// Rehydrate progress from persisted values.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::PercentageOutOfRange` if either score is above 100.
    pub fn from_persisted(
        last_score: u32,
        total_questions: u32,
        completed_lessons: u32,
        high_score: u32,
        last_completed: Option<DateTime<Utc>>,
    ) -> Result<Self, ProgressError> {
        Ok(Self {
            last_score: percentage_field("lastScore", last_score)?,
            total_questions,
            completed_lessons,
            high_score: percentage_field("highScore", high_score)?,
            last_completed,
        })
    }

    fn after(previous: Option<&Self>, outcome: LessonOutcome, now: DateTime<Utc>) -> Self {
        let percentage = outcome.percentage();
        let (completed_lessons, high_score) = previous.map_or((0, 0), |p| {
            (p.completed_lessons, p.high_score)
        });
        Self {
            last_score: percentage,
            total_questions: outcome.total_questions(),
            completed_lessons: completed_lessons.saturating_add(1),
            high_score: high_score.max(percentage),
            last_completed: Some(now),
        }
    }

    #[must_use]
    pub fn last_score(&self) -> u8 {
        self.last_score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn completed_lessons(&self) -> u32 {
        self.completed_lessons
    }

    #[must_use]
    pub fn high_score(&self) -> u8 {
        self.high_score
    }

    #[must_use]
    pub fn last_completed(&self) -> Option<DateTime<Utc>> {
        self.last_completed
    }
}

fn percentage_field(field: &'static str, value: u32) -> Result<u8, ProgressError> {
    u8::try_from(value)
        .ok()
        .filter(|pct| *pct <= 100)
        .ok_or(ProgressError::PercentageOutOfRange { field, value })
}

/// Wire shape of a progress entry; entries written before `lastCompleted`
/// existed still load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LanguageProgressRecord {
    last_score: u32,
    total_questions: u32,
    completed_lessons: u32,
    high_score: u32,
    #[serde(default)]
    last_completed: Option<DateTime<Utc>>,
}

impl TryFrom<LanguageProgressRecord> for LanguageProgress {
    type Error = ProgressError;

    fn try_from(record: LanguageProgressRecord) -> Result<Self, Self::Error> {
        Self::from_persisted(
            record.last_score,
            record.total_questions,
            record.completed_lessons,
            record.high_score,
            record.last_completed,
        )
    }
}

/// Progress for every language the student has touched, plus total XP.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressBook {
    languages: BTreeMap<LanguageId, LanguageProgress>,
    total_xp: u64,
}

impl ProgressBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_parts(languages: BTreeMap<LanguageId, LanguageProgress>, total_xp: u64) -> Self {
        Self {
            languages,
            total_xp,
        }
    }

    #[must_use]
    pub fn languages(&self) -> &BTreeMap<LanguageId, LanguageProgress> {
        &self.languages
    }

    #[must_use]
    pub fn total_xp(&self) -> u64 {
        self.total_xp
    }

    /// `None` means no lesson has been completed for this language.
    #[must_use]
    pub fn get(&self, language: &LanguageId) -> Option<&LanguageProgress> {
        self.languages.get(language)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty() && self.total_xp == 0
    }

    /// Fold a finished lesson into the book and return the XP it earned.
    ///
    /// Every call counts: reporting the same playthrough twice awards it twice.
    pub fn record_completion(
        &mut self,
        language: LanguageId,
        outcome: LessonOutcome,
        now: DateTime<Utc>,
    ) -> u64 {
        let updated = LanguageProgress::after(self.languages.get(&language), outcome, now);
        self.languages.insert(language, updated);

        let xp = outcome.xp();
        self.total_xp = self.total_xp.saturating_add(xp);
        xp
    }

    pub fn reset(&mut self) {
        self.languages.clear();
        self.total_xp = 0;
    }

    #[must_use]
    pub fn stats(&self) -> ProgressStats {
        let mut stats = ProgressStats {
            total_xp: self.total_xp,
            ..ProgressStats::default()
        };

        for progress in self.languages.values().filter(|p| p.completed_lessons > 0) {
            stats.languages_started += 1;
            stats.total_lessons += u64::from(progress.completed_lessons);
            // Estimated from the high score, as the dashboard always has.
            let product = u64::from(progress.high_score)
                * u64::from(progress.total_questions)
                * u64::from(progress.completed_lessons);
            stats.total_correct_answers += (2 * product + 100) / 200;
        }

        stats
    }
}

/// Summary figures for the statistics dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressStats {
    pub total_xp: u64,
    pub total_lessons: u64,
    pub total_correct_answers: u64,
    pub languages_started: usize,
}
