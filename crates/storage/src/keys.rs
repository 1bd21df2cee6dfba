use std::fmt;

/// Keys of the persisted key-value entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    /// JSON object: language id -> progress entry.
    ProgressData,
    /// JSON integer: total XP.
    ProgressXp,
    /// `"true"` while the admin gate is unlocked.
    AdminFlag,
    /// JSON object: language display name -> questions.
    QuestionBank,
}

impl StorageKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::ProgressData => "progress_data",
            StorageKey::ProgressXp => "progress_xp",
            StorageKey::AdminFlag => "admin_flag",
            StorageKey::QuestionBank => "question_bank",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
