//! Structured views over the two JSON files of an H5P package.
//!
//! Both keep the full JSON object so that fields we do not know about
//! survive a load/inject/write cycle untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content::{ContentPayload, ContentType, WordEntry};
use crate::error::ValidationError;

/// Key of the HTML task description shown above every exercise
pub const TASK_DESCRIPTION: &str = "taskDescription";

/// The package manifest (`h5p.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Map<String, Value>);

impl Manifest {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    pub fn set_title(&mut self, title: &str) {
        self.0.insert("title".to_string(), Value::String(title.to_string()));
    }

    pub fn main_library(&self) -> Option<&str> {
        self.0.get("mainLibrary").and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Crossword descriptor (`H5P.Crossword`)
#[derive(Debug, Clone, PartialEq)]
pub struct CrosswordDescriptor {
    fields: Map<String, Value>,
}

/// Drag-the-words descriptor (`H5P.DragText`)
#[derive(Debug, Clone, PartialEq)]
pub struct DragWordsDescriptor {
    fields: Map<String, Value>,
}

/// The content descriptor (`content/content.json`) of a template
#[derive(Debug, Clone, PartialEq)]
pub enum ContentDescriptor {
    Crossword(CrosswordDescriptor),
    DragWords(DragWordsDescriptor),
}

impl CrosswordDescriptor {
    pub fn words(&self) -> Option<Vec<WordEntry>> {
        self.fields
            .get(ContentType::CrossWords.payload_field())
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    fn set_words(&mut self, words: &[WordEntry]) -> serde_json::Result<()> {
        self.fields.insert(
            ContentType::CrossWords.payload_field().to_string(),
            serde_json::to_value(words)?,
        );
        Ok(())
    }
}

impl DragWordsDescriptor {
    pub fn text(&self) -> Option<&str> {
        self.fields
            .get(ContentType::DragAndDrop.payload_field())
            .and_then(Value::as_str)
    }

    fn set_text(&mut self, text: &str) {
        self.fields.insert(
            ContentType::DragAndDrop.payload_field().to_string(),
            Value::String(text.to_string()),
        );
    }
}

impl ContentDescriptor {
    /// Wrap a parsed `content.json` object for the given content type
    pub fn from_fields(content_type: ContentType, fields: Map<String, Value>) -> Self {
        match content_type {
            ContentType::CrossWords => ContentDescriptor::Crossword(CrosswordDescriptor { fields }),
            ContentType::DragAndDrop => ContentDescriptor::DragWords(DragWordsDescriptor { fields }),
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            ContentDescriptor::Crossword(_) => ContentType::CrossWords,
            ContentDescriptor::DragWords(_) => ContentType::DragAndDrop,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        match self {
            ContentDescriptor::Crossword(d) => &d.fields,
            ContentDescriptor::DragWords(d) => &d.fields,
        }
    }

    fn fields_mut(&mut self) -> &mut Map<String, Value> {
        match self {
            ContentDescriptor::Crossword(d) => &mut d.fields,
            ContentDescriptor::DragWords(d) => &mut d.fields,
        }
    }

    pub fn task_description(&self) -> Option<&str> {
        self.fields().get(TASK_DESCRIPTION).and_then(Value::as_str)
    }

    /// Set the task description, wrapped as a single HTML paragraph
    pub fn set_task_description(&mut self, description: &str) {
        self.fields_mut().insert(
            TASK_DESCRIPTION.to_string(),
            Value::String(format!("<p>{}</p>", description)),
        );
    }

    /// Overlay the content-specific payload field
    pub fn overlay(&mut self, payload: &ContentPayload) -> Result<(), ValidationError> {
        match (self, payload) {
            (ContentDescriptor::Crossword(d), ContentPayload::Words(words)) => d
                .set_words(words)
                .map_err(|e| ValidationError::new("words", e.to_string())),
            (ContentDescriptor::DragWords(d), ContentPayload::Text(text)) => {
                d.set_text(text);
                Ok(())
            }
            (descriptor, payload) => Err(ValidationError::new(
                "payload",
                format!(
                    "{} content cannot be used with a {} template",
                    payload.content_type(),
                    descriptor.content_type()
                ),
            )),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields().clone())
    }
}
