//! Error types for the analysis pipeline and their HTTP mappings.
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    /// The submitted content was empty after trimming. Rejected before any
    /// model call is made.
    #[error("Content is empty")]
    EmptyContent,

    /// The upstream model call failed: network error, auth/quota rejection, or
    /// a response envelope with no usable completion text.
    #[error("Model request failed: {0}")]
    Provider(String),

    /// The model's reply was not a single JSON object after fence stripping.
    #[error("Failed to parse response: {message}")]
    UnparsableReply { message: String, raw: String },

    /// A score field was present in the reply but held a non-numeric value.
    #[error("Failed to parse response: field '{field}' is not a number (got {value})")]
    ScoreNotNumeric {
        field: &'static str,
        value: String,
        raw: String,
    },
}

/// The JSON body returned for all errors. `raw` carries the verbatim model
/// reply on parse and coercion failures so callers can see what the model
/// actually said.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let (status, raw) = match &self {
            AnalyzeError::EmptyContent => (StatusCode::BAD_REQUEST, None),
            AnalyzeError::Provider(_) => (StatusCode::BAD_GATEWAY, None),
            AnalyzeError::UnparsableReply { raw, .. }
            | AnalyzeError::ScoreNotNumeric { raw, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, Some(raw.clone()))
            }
        };

        if status.is_client_error() {
            warn!(error = %self, "Rejecting request");
        } else {
            error!(error = %self, "Analysis failed");
        }

        let body = ErrorBody {
            detail: self.to_string(),
            raw,
        };
        (status, Json(body)).into_response()
    }
}
