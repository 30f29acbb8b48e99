//! Content model: the supported H5P content types and the user payload
//! that gets injected into them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TemplateError, ValidationError};

/// Minimum number of clue/answer pairs a crossword needs to be playable
pub const MIN_WORD_ENTRIES: usize = 2;

/// Supported content types, each backed by one stock template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    CrossWords,
    #[serde(alias = "DragTheWords")]
    DragAndDrop,
}

impl ContentType {
    pub const ALL: [ContentType; 2] = [ContentType::CrossWords, ContentType::DragAndDrop];

    /// Directory of the stock template, relative to the templates root
    pub fn template_dir(&self) -> &'static str {
        match self {
            ContentType::CrossWords => "crossword",
            ContentType::DragAndDrop => "drag-the-words",
        }
    }

    /// Descriptor key that holds the content-specific payload
    pub fn payload_field(&self) -> &'static str {
        match self {
            ContentType::CrossWords => "words",
            ContentType::DragAndDrop => "textField",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::CrossWords => "CrossWords",
            ContentType::DragAndDrop => "DragAndDrop",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CrossWords" => Ok(ContentType::CrossWords),
            "DragAndDrop" | "DragTheWords" => Ok(ContentType::DragAndDrop),
            other => Err(TemplateError::UnknownContentType(other.to_string())),
        }
    }
}

/// Crossword word orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Across,
    Down,
}

/// A single crossword clue/answer pair.
///
/// `fixWord` is always `false`; whatever the client sends is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    #[serde(rename = "fixWord", default, skip_deserializing)]
    fix_word: bool,
    pub orientation: Orientation,
    pub clue: String,
    pub answer: String,
}

impl WordEntry {
    pub fn new(orientation: Orientation, clue: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            fix_word: false,
            orientation,
            clue: clue.into(),
            answer: answer.into(),
        }
    }

    pub fn fix_word(&self) -> bool {
        self.fix_word
    }
}

/// The content-specific part of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPayload {
    /// Crossword clue/answer pairs, in submission order
    Words(Vec<WordEntry>),
    /// Drag-the-words text with `*answer*` markers
    Text(String),
}

impl ContentPayload {
    /// Content type this payload can be injected into
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentPayload::Words(_) => ContentType::CrossWords,
            ContentPayload::Text(_) => ContentType::DragAndDrop,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            ContentPayload::Words(words) => {
                if words.len() < MIN_WORD_ENTRIES {
                    return Err(ValidationError::new(
                        "words",
                        format!("at least {} entries are required", MIN_WORD_ENTRIES),
                    ));
                }
                for (index, word) in words.iter().enumerate() {
                    if word.clue.trim().is_empty() {
                        return Err(ValidationError::new(
                            format!("words[{}].clue", index),
                            "must not be empty",
                        ));
                    }
                    if word.answer.trim().is_empty() {
                        return Err(ValidationError::new(
                            format!("words[{}].answer", index),
                            "must not be empty",
                        ));
                    }
                }
                Ok(())
            }
            ContentPayload::Text(text) => {
                if text.trim().is_empty() {
                    return Err(ValidationError::new("text", "must not be empty"));
                }
                Ok(())
            }
        }
    }
}

/// Everything a user submits for one generated package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPayload {
    pub title: String,
    pub description: String,
    pub payload: ContentPayload,
}

impl RequestPayload {
    pub fn words(title: impl Into<String>, description: impl Into<String>, words: Vec<WordEntry>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            payload: ContentPayload::Words(words),
        }
    }

    pub fn text(title: impl Into<String>, description: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            payload: ContentPayload::Text(text.into()),
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.payload.content_type()
    }

    /// Reject blank fields and too-short word lists. Values are not trimmed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::new("title", "must not be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::new("description", "must not be empty"));
        }
        self.payload.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_words() -> Vec<WordEntry> {
        vec![
            WordEntry::new(Orientation::Across, "Capital of France", "Paris"),
            WordEntry::new(Orientation::Down, "Largest planet", "Jupiter"),
        ]
    }

    #[test]
    fn test_content_type_parsing() {
        assert_eq!("CrossWords".parse::<ContentType>().unwrap(), ContentType::CrossWords);
        assert_eq!("DragAndDrop".parse::<ContentType>().unwrap(), ContentType::DragAndDrop);
        assert_eq!("DragTheWords".parse::<ContentType>().unwrap(), ContentType::DragAndDrop);
        assert!(matches!(
            "Quiz".parse::<ContentType>(),
            Err(TemplateError::UnknownContentType(_))
        ));
    }

    #[test]
    fn test_word_entry_ignores_incoming_fix_word() {
        let word: WordEntry = serde_json::from_value(json!({
            "fixWord": true,
            "orientation": "down",
            "clue": "Opposite of up",
            "answer": "Down"
        }))
        .unwrap();

        assert!(!word.fix_word());
        assert_eq!(word.orientation, Orientation::Down);

        let value = serde_json::to_value(&word).unwrap();
        assert_eq!(value["fixWord"], json!(false));
        assert_eq!(value["orientation"], json!("down"));
    }

    #[test]
    fn test_word_entry_rejects_unknown_orientation() {
        let result = serde_json::from_value::<WordEntry>(json!({
            "orientation": "diagonal",
            "clue": "c",
            "answer": "a"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_valid_payloads() {
        assert!(RequestPayload::words("Quiz", "Solve it", two_words()).validate().is_ok());
        assert!(RequestPayload::text("Drag", "Fill the gaps", "The *sun* is hot").validate().is_ok());
    }

    #[test]
    fn test_too_few_words() {
        let mut words = two_words();
        words.pop();
        let err = RequestPayload::words("Quiz", "Solve it", words).validate().unwrap_err();
        assert_eq!(err.field, "words");
    }

    #[test]
    fn test_blank_fields() {
        let err = RequestPayload::text("   ", "desc", "text").validate().unwrap_err();
        assert_eq!(err.field, "title");

        let err = RequestPayload::text("title", "", "text").validate().unwrap_err();
        assert_eq!(err.field, "description");

        let err = RequestPayload::text("title", "desc", " \n ").validate().unwrap_err();
        assert_eq!(err.field, "text");

        let mut words = two_words();
        words[1].answer = String::new();
        let err = RequestPayload::words("t", "d", words).validate().unwrap_err();
        assert_eq!(err.field, "words[1].answer");
    }
}
