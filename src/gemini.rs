//! Gemini provider adapter
//!
//! Holds the process-scoped provider settings (base URL, model name, API key)
//! and turns a prompt into one `generateContent` request. The transport is
//! injected through the [`HttpClient`] trait so tests can swap in a mock.
use axum::body::Body;
use axum::http::{Method, Request, Uri, header};
use bon::Builder;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};
use url::Url;

use crate::client::HttpClient;
use crate::errors::AnalyzeError;

/// Settings for the Gemini completion provider. Built once at startup and
/// handed to the application state; there is no global instance.
#[derive(Clone, Builder)]
pub struct Gemini {
    pub base_url: Url,
    pub model: String,
    api_key: String,
}

impl std::fmt::Debug for Gemini {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gemini")
            .field("base_url", &self.base_url.as_str())
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Gemini {
    /// Ask the model to complete `prompt`, returning the raw reply text.
    /// One request per call; failures are not retried.
    pub async fn complete<T: HttpClient>(
        &self,
        http_client: &T,
        prompt: &str,
    ) -> Result<String, AnalyzeError> {
        let url = self
            .base_url
            .join(&format!("v1beta/models/{}:generateContent", self.model))
            .map_err(|e| AnalyzeError::Provider(format!("Invalid provider URL: {e}")))?;
        let uri = Uri::try_from(url.as_str())
            .map_err(|e| AnalyzeError::Provider(format!("Invalid provider URI: {e}")))?;

        // Set the host header to match the provider (otherwise cloudflare gets mad).
        let host_value = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(AnalyzeError::Provider(format!(
                    "Provider URL has no host: {url}"
                )));
            }
        };

        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}]
        });
        let body_bytes = serde_json::to_vec(&body)
            .map_err(|e| AnalyzeError::Provider(format!("Failed to serialize request: {e}")))?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::HOST, host_value)
            .header("x-goog-api-key", self.api_key.as_str())
            .body(Body::from(body_bytes))
            .map_err(|e| AnalyzeError::Provider(format!("Failed to build request: {e}")))?;

        debug!(model = %self.model, "Requesting completion");
        let response = http_client.request(request).await.map_err(|e| {
            error!(error = %e, "Error sending request to provider");
            AnalyzeError::Provider(format!("Request to provider failed: {e}"))
        })?;

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| {
                AnalyzeError::Provider(format!("Failed to read provider response: {e}"))
            })?;

        if !status.is_success() {
            let snippet: String = String::from_utf8_lossy(&body_bytes)
                .chars()
                .take(200)
                .collect();
            error!(status = %status, body = %snippet, "Provider returned an error");
            return Err(AnalyzeError::Provider(format!(
                "Provider returned {status}: {snippet}"
            )));
        }

        let envelope: GenerateContentResponse =
            serde_json::from_slice(&body_bytes).map_err(|e| {
                AnalyzeError::Provider(format!("Unrecognized provider response: {e}"))
            })?;

        match envelope.completion_text() {
            Some(text) => Ok(text),
            None => {
                // Safety-blocked replies come back with a finish reason and no text
                let reason = envelope
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.as_deref())
                    .unwrap_or("unknown");
                Err(AnalyzeError::Provider(format!(
                    "Provider response contained no completion text (finish reason: {reason})"
                )))
            }
        }
    }
}

/// Lenient view of a generateContent response. Only the reply text is
/// extracted; usage metadata and the other provider fields are ignored.
/// TODO: parse promptFeedback.blockReason for prompt-level blocks (those come
/// back with no candidates at all).
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// The concatenated text of the first candidate's parts, if any.
    fn completion_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}
