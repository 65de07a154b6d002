/// Axum handlers for the analysis service
use crate::AppState;
use crate::client::HttpClient;
use crate::errors::AnalyzeError;
use crate::models::{AnalysisRequest, AnalysisResult};
use crate::parse::parse_analysis;
use crate::prompt::build_analysis_prompt;
use axum::{Json, extract::State};
use tracing::{debug, info, instrument};

/// Handler for POST /analyze
///
/// Validates the content, prompts the model exactly once, and parses the
/// reply into a structured result. Empty content is rejected before any
/// model call is made.
#[instrument(skip(state, request))]
pub async fn analyze<T: HttpClient>(
    State(state): State<AppState<T>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResult>, AnalyzeError> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(AnalyzeError::EmptyContent);
    }

    debug!(content_len = content.len(), "Received analysis request");

    let prompt = build_analysis_prompt(content);
    let raw = state.provider.complete(&state.http_client, &prompt).await?;
    debug!(raw = %raw, "Raw model reply");

    let result = parse_analysis(&raw)?;
    info!(
        readability = result.readability,
        seo = result.seo,
        grammar = result.grammar,
        "Analysis complete"
    );

    Ok(Json(result))
}
