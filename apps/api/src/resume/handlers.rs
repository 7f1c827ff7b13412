//! Axum route handler for public resume parsing.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::resume::extractor::{ExtractionError, ParsedResume};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ParseResumeRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_filename() -> String {
    "resume.txt".to_string()
}

/// POST /api/parse-resume
///
/// Sends plain resume text to the model and returns {skills, experience, education}.
/// The API key never leaves the server.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    payload: Result<Json<ParseResumeRequest>, JsonRejection>,
) -> Result<Json<ParsedResume>, AppError> {
    let Json(request) = payload?;
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("Missing resume text".to_string()));
    }

    let parsed = state
        .extractor
        .extract(&request.text, &request.filename)
        .await
        .map_err(extraction_error)?;

    Ok(Json(parsed))
}

fn extraction_error(e: ExtractionError) -> AppError {
    match e {
        ExtractionError::NotConfigured => {
            AppError::Internal(anyhow::anyhow!("OPENAI_API_KEY missing on server"))
        }
        ExtractionError::Upstream(LlmError::Api { status, message }) => {
            tracing::error!("Resume extraction upstream returned {status}: {message}");
            AppError::Upstream(format!("Resume extraction failed (upstream status {status})"))
        }
        other => {
            tracing::error!("Resume extraction failed: {other}");
            AppError::Upstream("Resume extraction failed".to_string())
        }
    }
}
