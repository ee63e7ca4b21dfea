//! Gemini REST client
//!
//! Covers the subset of the Generative Language API the analysis needs:
//! resumable file upload, file state polling, `generateContent` against an
//! uploaded file, and file deletion.

use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const USER_AGENT: &str = concat!("podium/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Gemini client errors
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Remote file {0} failed processing")]
    ProcessingFailed(String),

    #[error("Remote file {name} not active after {waited_ms} ms")]
    Timeout { name: String, waited_ms: u64 },

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid API key")]
    InvalidApiKey,
}

/// Processing state of an uploaded file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    #[default]
    StateUnspecified,
    Processing,
    Active,
    Failed,
}

/// File resource as returned by the Files API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub state: FileState,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Result<Self, GeminiError> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Client against a different host (tests point this at a mock server)
    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> Result<Self, GeminiError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).map_err(|_| GeminiError::InvalidApiKey)?;
        headers.insert("x-goog-api-key", key);

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GeminiError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Upload a local file with the resumable upload protocol
    pub async fn upload_file(&self, path: &Path, mime_type: &str) -> Result<RemoteFile, GeminiError> {
        let bytes = tokio::fs::read(path).await?;
        let display_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload");

        tracing::debug!(
            file = display_name,
            size_bytes = bytes.len(),
            mime_type,
            "Starting Gemini file upload"
        );

        // Step 1: open an upload session
        let start_url = format!("{}/upload/v1beta/files", self.base_url);
        let response = self
            .http_client
            .post(&start_url)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "displayName": display_name } }))
            .send()
            .await
            .map_err(|e| GeminiError::Network(e.to_string()))?;

        let response = check_response(response).await?;
        let upload_url = response
            .headers()
            .get("X-Goog-Upload-URL")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| GeminiError::Parse("Missing X-Goog-Upload-URL header".to_string()))?;

        // Step 2: send the bytes and finalize
        let response = self
            .http_client
            .post(&upload_url)
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header("X-Goog-Upload-Offset", "0")
            .body(bytes)
            .send()
            .await
            .map_err(|e| GeminiError::Network(e.to_string()))?;

        let response = check_response(response).await?;
        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        tracing::debug!(name = %uploaded.file.name, state = ?uploaded.file.state, "Gemini file uploaded");
        Ok(uploaded.file)
    }

    pub async fn get_file(&self, name: &str) -> Result<RemoteFile, GeminiError> {
        let response = self
            .http_client
            .get(self.file_url(name))
            .send()
            .await
            .map_err(|e| GeminiError::Network(e.to_string()))?;

        check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))
    }

    /// Poll until the file is `ACTIVE`
    ///
    /// `FAILED` ends the wait immediately; so does exceeding `timeout`.
    pub async fn wait_until_active(
        &self,
        mut file: RemoteFile,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<RemoteFile, GeminiError> {
        let started = Instant::now();

        loop {
            match file.state {
                FileState::Active => return Ok(file),
                FileState::Failed => return Err(GeminiError::ProcessingFailed(file.name)),
                FileState::Processing | FileState::StateUnspecified => {}
            }

            if started.elapsed() >= timeout {
                return Err(GeminiError::Timeout {
                    name: file.name,
                    waited_ms: started.elapsed().as_millis() as u64,
                });
            }

            tracing::debug!(name = %file.name, "Remote file still processing");
            tokio::time::sleep(poll_interval).await;
            file = self.get_file(&file.name).await?;
        }
    }

    /// Run the model over an uploaded file and return the reply text
    pub async fn generate_content(&self, file: &RemoteFile, prompt: &str) -> Result<String, GeminiError> {
        let file_uri = file
            .uri
            .as_deref()
            .ok_or_else(|| GeminiError::Parse(format!("File {} has no URI", file.name)))?;
        let mime_type = file.mime_type.as_deref().unwrap_or("application/octet-stream");

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "fileData": { "mimeType": mime_type, "fileUri": file_uri } },
                    { "text": prompt }
                ]
            }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeminiError::Network(e.to_string()))?;

        let reply: GenerateContentResponse = check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        let text: String = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse);
        }
        Ok(text)
    }

    pub async fn delete_file(&self, name: &str) -> Result<(), GeminiError> {
        let response = self
            .http_client
            .delete(self.file_url(name))
            .send()
            .await
            .map_err(|e| GeminiError::Network(e.to_string()))?;

        check_response(response).await?;
        Ok(())
    }

    fn file_url(&self, name: &str) -> String {
        let name = name.strip_prefix("files/").unwrap_or(name);
        format!("{}/v1beta/files/{}", self.base_url, name)
    }
}

/// Turn a non-success status into `GeminiError::Api` with the body text
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, GeminiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(GeminiError::Api(status.as_u16(), body))
}
