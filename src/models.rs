/// Wire types for the /analyze endpoint.
use serde::{Deserialize, Serialize};

/// The request body for POST /analyze. The content is the text to score.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub content: String,
}

/// The structured result returned by POST /analyze.
///
/// Every field is always present: scores default to 0 and text fields to ""
/// when the model's reply omits them. The score ranges and the overall
/// vocabulary are requested in the prompt but not enforced here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// How easy the content is to read, 0-100.
    pub readability: i64,
    /// Search-engine friendliness, 0-100.
    pub seo: i64,
    /// Grammatical correctness, 0-100.
    pub grammar: i64,
    /// A one-word tone label, e.g. "Formal" or "Casual".
    pub tone: String,
    /// An overall rating, e.g. "Excellent", "Good", "Average" or "Poor".
    pub overall: String,
    /// A short improvement suggestion.
    pub suggestion: String,
}
