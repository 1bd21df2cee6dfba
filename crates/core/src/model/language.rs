use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Speech tag used when a language has no catalog entry.
pub const FALLBACK_SPEECH_TAG: &str = "en-US";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LanguageError {
    #[error("language id cannot be empty")]
    EmptyId,
}

/// Key of a language in progress records (trimmed, lower-case, non-empty).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageId(String);

impl LanguageId {
    /// Create a validated language id.
    ///
    /// # Errors
    ///
    /// Returns `LanguageError::EmptyId` if the id is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, LanguageError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LanguageError::EmptyId);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Capitalised form of the id, used when the catalog has no display name.
    #[must_use]
    pub fn capitalized(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl TryFrom<String> for LanguageId {
    type Error = LanguageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LanguageId> for String {
    fn from(id: LanguageId) -> Self {
        id.0
    }
}

impl fmt::Debug for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LanguageId({})", self.0)
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A language students can pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    id: LanguageId,
    name: String,
    description: String,
    speech_tag: String,
}

impl Language {
    #[must_use]
    pub fn new(
        id: LanguageId,
        name: impl Into<String>,
        description: impl Into<String>,
        speech_tag: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            speech_tag: speech_tag.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &LanguageId {
        &self.id
    }

    /// Display name; also the key of this language in the question bank.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// BCP 47 tag handed to text-to-speech.
    #[must_use]
    pub fn speech_tag(&self) -> &str {
        &self.speech_tag
    }
}

/// The set of languages offered to students.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCatalog {
    languages: Vec<Language>,
}

impl LanguageCatalog {
    #[must_use]
    pub fn new(languages: Vec<Language>) -> Self {
        Self { languages }
    }

    /// Spanish, French, German and Japanese.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = [
            ("spanish", "Spanish", "es-ES"),
            ("french", "French", "fr-FR"),
            ("german", "German", "de-DE"),
            ("japanese", "Japanese", "ja-JP"),
        ];
        let languages = entries
            .into_iter()
            .map(|(id, name, tag)| Language {
                id: LanguageId(id.to_string()),
                name: name.to_string(),
                description: format!("Learn the basics of {name}"),
                speech_tag: tag.to_string(),
            })
            .collect();
        Self { languages }
    }

    #[must_use]
    pub fn all(&self) -> &[Language] {
        &self.languages
    }

    #[must_use]
    pub fn get(&self, id: &LanguageId) -> Option<&Language> {
        self.languages.iter().find(|lang| lang.id == *id)
    }

    #[must_use]
    pub fn display_name_for(&self, id: &LanguageId) -> String {
        self.get(id)
            .map_or_else(|| id.capitalized(), |lang| lang.name.clone())
    }

    #[must_use]
    pub fn speech_tag_for(&self, id: &LanguageId) -> &str {
        self.get(id)
            .map_or(FALLBACK_SPEECH_TAG, |lang| lang.speech_tag.as_str())
    }
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_id_is_trimmed_and_lowercased() {
        let id = LanguageId::new("  Spanish ").unwrap();
        assert_eq!(id.as_str(), "spanish");
        assert_eq!(id.capitalized(), "Spanish");
        assert_eq!(LanguageId::new("   "), Err(LanguageError::EmptyId));
    }

    #[test]
    fn catalog_resolves_builtin_and_falls_back_for_unknown() {
        let catalog = LanguageCatalog::builtin();
        let japanese = LanguageId::new("japanese").unwrap();
        assert_eq!(catalog.display_name_for(&japanese), "Japanese");
        assert_eq!(catalog.speech_tag_for(&japanese), "ja-JP");

        let klingon = LanguageId::new("klingon").unwrap();
        assert!(catalog.get(&klingon).is_none());
        assert_eq!(catalog.display_name_for(&klingon), "Klingon");
        assert_eq!(catalog.speech_tag_for(&klingon), FALLBACK_SPEECH_TAG);
    }

    #[test]
    fn language_id_rejects_empty_json_string() {
        let parsed: Result<LanguageId, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());
        let parsed: LanguageId = serde_json::from_str("\"French\"").unwrap();
        assert_eq!(parsed.as_str(), "french");
    }
}
