//! UploadThing storage implementation
//!
//! Files are sent straight to the UploadThing ingest server: the client signs
//! an ingest URL with the app's API key and PUTs the file to it as multipart
//! form data. The ingest server answers with the public file URL.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use reqwest::Url;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use sqids::Sqids;
use std::time::Duration;
use tracing::debug;

use super::{UploadError, UploadFile, UploadedFile, Uploader};

type HmacSha256 = Hmac<Sha256>;

/// How long a signed ingest URL stays valid
const URL_TTL: Duration = Duration::from_secs(60 * 60);

const SDK_VERSION: &str = "7.7.2";

/// Base alphabet, shuffled per app before encoding keys
const KEY_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const APP_PREFIX_LEN: u8 = 12;
const FILE_SEED_LEN: u8 = 36;

/// Decoded `UPLOADTHING_TOKEN`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPayload {
    api_key: String,
    app_id: String,
    regions: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngestResponse {
    url: String,
    #[serde(default)]
    app_url: Option<String>,
    #[serde(default)]
    ufs_url: Option<String>,
}

/// UploadThing uploader
///
/// The API key is kept in a [`SecretString`] and never shows up in
/// `Debug` output or logs.
pub struct UploadThing {
    client: reqwest::Client,
    api_key: SecretString,
    app_id: String,
    region: String,
    ingest_host: Option<String>,
}

impl std::fmt::Debug for UploadThing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadThing")
            .field("app_id", &self.app_id)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl UploadThing {
    /// Create an uploader from a base64 `UPLOADTHING_TOKEN` value
    pub fn from_token(token: &str, timeout: Duration) -> Result<Self, UploadError> {
        let decoded = STANDARD
            .decode(token.trim())
            .map_err(|e| UploadError::Credentials(format!("token is not base64: {}", e)))?;
        let payload: TokenPayload = serde_json::from_slice(&decoded)
            .map_err(|e| UploadError::Credentials(format!("token is not valid JSON: {}", e)))?;

        if payload.api_key.is_empty() || payload.app_id.is_empty() {
            return Err(UploadError::Credentials(
                "token is missing apiKey or appId".to_string(),
            ));
        }
        let region = payload
            .regions
            .into_iter()
            .next()
            .ok_or_else(|| UploadError::Credentials("token lists no regions".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::Backend(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: SecretString::from(payload.api_key),
            app_id: payload.app_id,
            region,
            ingest_host: None,
        })
    }

    /// Override the ingest host (useful for testing or proxies)
    pub fn with_ingest_host(mut self, host: impl Into<String>) -> Self {
        self.ingest_host = Some(host.into());
        self
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    fn ingest_base(&self) -> String {
        match &self.ingest_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}.ingest.uploadthing.com", self.region),
        }
    }

    /// New file key: the app prefix followed by a seed derived from the file.
    ///
    /// The ingest server only accepts keys that start with the prefix for the
    /// signing app.
    fn generate_key(&self, file: &UploadFile, now_ms: i64) -> Result<String, UploadError> {
        let hash_parts = serde_json::json!([file.name, file.size(), file.mime_type, now_ms, now_ms]);
        let alphabet = app_alphabet(&self.app_id);

        let prefix = encode_hash(&alphabet, APP_PREFIX_LEN, djb2(&self.app_id))?;
        let seed = encode_hash(&alphabet, FILE_SEED_LEN, djb2(&hash_parts.to_string()))?;
        Ok(prefix + &seed)
    }

    fn sign(&self, url: &str) -> Result<String, UploadError> {
        let mut mac = HmacSha256::new_from_slice(self.api_key.expose_secret().as_bytes())
            .map_err(|e| UploadError::Credentials(e.to_string()))?;
        mac.update(url.as_bytes());
        Ok(format!("hmac-sha256={}", hex::encode(mac.finalize().into_bytes())))
    }

    /// Build the signed ingest URL for one file
    fn signed_url(&self, key: &str, file: &UploadFile, expires_ms: i128) -> Result<Url, UploadError> {
        let base = format!("{}/{}", self.ingest_base(), key);
        let size = file.size().to_string();
        let expires = expires_ms.to_string();
        let mut url = Url::parse_with_params(
            &base,
            &[
                ("expires", expires.as_str()),
                ("x-ut-identifier", self.app_id.as_str()),
                ("x-ut-file-name", file.name.as_str()),
                ("x-ut-file-size", size.as_str()),
                ("x-ut-file-type", file.mime_type.as_str()),
                ("x-ut-content-disposition", "inline"),
            ],
        )
        .map_err(|e| UploadError::Backend(format!("Invalid ingest URL '{}': {}", base, e)))?;

        let signature = self.sign(url.as_str())?;
        url.query_pairs_mut().append_pair("signature", &signature);
        Ok(url)
    }
}

/// djb2 over UTF-16 code units, walked back to front, with JS int32 wrapping
fn djb2(s: &str) -> i32 {
    let units: Vec<u16> = s.encode_utf16().collect();
    let mut h: i32 = 5381;
    for unit in units.into_iter().rev() {
        h = h.wrapping_mul(33) ^ i32::from(unit);
    }
    (h & 0xbfff_ffff_u32 as i32) | (((h as u32) >> 1) & 0x4000_0000) as i32
}

/// Key alphabet permuted by the app id
fn app_alphabet(app_id: &str) -> Vec<char> {
    let mut chars: Vec<char> = KEY_ALPHABET.chars().collect();
    let seed = i64::from(djb2(app_id));
    let len = chars.len() as i64;
    for i in 0..chars.len() {
        let j = ((seed % (i as i64 + 1)) + i as i64) % len;
        chars.swap(i, j as usize);
    }
    chars
}

fn encode_hash(alphabet: &[char], min_length: u8, hash: i32) -> Result<String, UploadError> {
    let sqids = Sqids::builder()
        .alphabet(alphabet.to_vec())
        .min_length(min_length)
        .build()
        .map_err(|e| UploadError::Backend(format!("Invalid key alphabet: {}", e)))?;
    sqids
        .encode(&[i64::from(hash).unsigned_abs()])
        .map_err(|e| UploadError::Backend(format!("Failed to encode file key: {}", e)))
}

#[async_trait]
impl Uploader for UploadThing {
    async fn upload(&self, file: UploadFile) -> Result<Vec<UploadedFile>, UploadError> {
        let now_ms = (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
        let key = self.generate_key(&file, now_ms)?;
        let expires_ms = now_ms as i128 + URL_TTL.as_millis() as i128;
        let url = self.signed_url(&key, &file, expires_ms)?;

        debug!("Uploading {} ({} bytes) as {}", file.name, file.size(), key);

        let name = file.name.clone();
        let size = file.size();
        let part = Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(&file.mime_type)
            .map_err(|e| UploadError::Backend(format!("Invalid MIME type: {}", e)))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .put(url)
            .header("x-uploadthing-version", SDK_VERSION)
            .header("Range", "bytes=0-")
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Backend(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected(format!("{}: {}", status, body)));
        }

        let body: IngestResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Backend(format!("Unexpected response: {}", e)))?;

        Ok(vec![UploadedFile {
            key,
            name,
            size,
            url: body.ufs_url.unwrap_or(body.url),
            app_url: body.app_url,
        }])
    }
}
