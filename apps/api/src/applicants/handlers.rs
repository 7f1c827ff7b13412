use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::auth::AdminIdentity;
use crate::errors::AppError;
use crate::extract::ResourceId;
use crate::models::applicant::{ApplicantDetail, ApplicantSummary, NewApplicant};
use crate::state::AppState;
use crate::uploads::UploadForm;

#[derive(Serialize)]
pub struct ApplicantListResponse {
    pub applicants: Vec<ApplicantSummary>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct ApplicantResponse {
    pub applicant: ApplicantDetail,
}

#[derive(Serialize)]
pub struct ApplicantCreatedResponse {
    pub message: &'static str,
    pub applicant: ApplicantSummary,
}

/// GET /api/applicants
pub async fn handle_list_applicants(
    State(state): State<AppState>,
    AdminIdentity(_): AdminIdentity,
) -> Result<Json<ApplicantListResponse>, AppError> {
    let applicants = state.store.list_applicants().await?;
    Ok(Json(ApplicantListResponse {
        count: applicants.len(),
        applicants,
    }))
}

/// GET /api/applicants/:id
pub async fn handle_get_applicant(
    State(state): State<AppState>,
    AdminIdentity(_): AdminIdentity,
    ResourceId(id): ResourceId,
) -> Result<Json<ApplicantResponse>, AppError> {
    let applicant = state
        .store
        .find_applicant(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Applicant not found".to_string()))?;
    Ok(Json(ApplicantResponse { applicant }))
}

/// POST /api/applicants
///
/// Public multipart form. `skills` may be repeated or sent once as a JSON array;
/// `experience` is a JSON document sent as text.
pub async fn handle_create_applicant(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ApplicantCreatedResponse>), AppError> {
    let mut multipart = multipart?;
    let form = UploadForm::read(&mut multipart, "resume").await?;

    let (Some(name), Some(email)) = (form.text("name"), form.text("email")) else {
        return Err(AppError::Validation(
            "Name and email are required".to_string(),
        ));
    };

    let applicant = NewApplicant {
        name,
        email,
        phone: form.text("phone"),
        skills: parse_skills(form.values("skills"))?,
        experience: form
            .text("experience")
            .map(|raw| parse_json_field("experience", &raw))
            .transpose()?,
        education: form.text("education"),
        resume: form.file,
    };

    let applicant = state.store.create_applicant(applicant).await?;
    tracing::info!(applicant_id = %applicant.id, "Applicant created");

    Ok((
        StatusCode::CREATED,
        Json(ApplicantCreatedResponse {
            message: "Applicant created successfully",
            applicant,
        }),
    ))
}

fn parse_skills(values: &[String]) -> Result<Vec<String>, AppError> {
    match values {
        [single] if single.trim_start().starts_with('[') => {
            serde_json::from_str(single).map_err(|_| {
                AppError::Validation("skills must be a JSON array of strings".to_string())
            })
        }
        many => Ok(many
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()),
    }
}

fn parse_json_field(name: &str, raw: &str) -> Result<Value, AppError> {
    serde_json::from_str(raw)
        .map_err(|_| AppError::Validation(format!("{name} must be valid JSON")))
}
