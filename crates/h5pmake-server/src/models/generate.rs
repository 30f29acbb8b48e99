//! Request and response bodies of the generate endpoints

use h5pmake::{ContentType, RequestPayload, WordEntry};
use h5pmake_publish::Publication;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Body of `POST /generate/wordlist`
///
/// Missing fields deserialize as empty so validation can name them.
#[derive(Debug, Deserialize)]
pub struct WordlistRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "wordsData")]
    pub words: Vec<WordEntry>,
}

impl From<WordlistRequest> for RequestPayload {
    fn from(req: WordlistRequest) -> Self {
        RequestPayload::words(req.title, req.description, req.words)
    }
}

/// Body of `POST /generate/dragwords`
#[derive(Debug, Deserialize)]
pub struct DragwordsRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "textField", alias = "textFieldsData")]
    pub text: String,
}

impl From<DragwordsRequest> for RequestPayload {
    fn from(req: DragwordsRequest) -> Self {
        RequestPayload::text(req.title, req.description, req.text)
    }
}

/// Query of `GET /generate/premade`
#[derive(Debug, Deserialize)]
pub struct PremadeQuery {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

impl PremadeQuery {
    pub fn content_type(&self) -> Result<ContentType> {
        let raw = self
            .content_type
            .as_deref()
            .ok_or_else(|| ApiError::bad_request("type: must be CrossWords or DragAndDrop"))?;
        raw.parse()
            .map_err(|_| ApiError::BadRequest(format!("type: unknown content type '{}'", raw)))
    }
}

/// Successful generate response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub url: String,
    pub key: String,
    pub file_name: String,
}

impl From<Publication> for GenerateResponse {
    fn from(publication: Publication) -> Self {
        Self {
            success: true,
            url: publication.url,
            key: publication.key,
            file_name: publication.file_name,
        }
    }
}
