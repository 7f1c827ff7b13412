use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::guard::require_user;
use crate::auth::{ensure_owner, AdminIdentity, ApplicationScope, Identity};
use crate::errors::AppError;
use crate::extract::ResourceId;
use crate::models::application::{
    decode_parsed_data, Application, ApplicationDetail, ApplicationPatch, ApplicationSummary,
    NewApplication,
};
use crate::state::AppState;
use crate::uploads::UploadForm;

#[derive(Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationSummary>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct ApplicationResponse {
    pub application: ApplicationDetail,
}

#[derive(Serialize)]
pub struct ApplicationMutationResponse {
    pub message: &'static str,
    pub application: Application,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn application_not_found() -> AppError {
    AppError::NotFound("Application not found".to_string())
}

fn invalid_parsed_data(_: serde_json::Error) -> AppError {
    AppError::Validation("ai_parsed_data must be valid JSON".to_string())
}

/// Looks up the owner and applies the ownership rule. A missing row is reported
/// before a foreign one.
async fn authorize_access(state: &AppState, identity: &Identity, id: Uuid) -> Result<(), AppError> {
    let owner = state
        .store
        .application_owner(id)
        .await?
        .ok_or_else(application_not_found)?;
    ensure_owner(identity, owner)
}

/// GET /api/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<ApplicationListResponse>, AppError> {
    let scope = ApplicationScope::for_identity(&identity);
    let applications = state.store.list_applications(scope).await?;
    Ok(Json(ApplicationListResponse {
        count: applications.len(),
        applications,
    }))
}

/// GET /api/jobs/:id/applications
pub async fn handle_list_job_applications(
    State(state): State<AppState>,
    AdminIdentity(_): AdminIdentity,
    ResourceId(job_id): ResourceId,
) -> Result<Json<ApplicationListResponse>, AppError> {
    let applications = state.store.list_applications_for_job(job_id).await?;
    Ok(Json(ApplicationListResponse {
        count: applications.len(),
        applications,
    }))
}

/// GET /api/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    identity: Identity,
    ResourceId(id): ResourceId,
) -> Result<Json<ApplicationResponse>, AppError> {
    let application = state
        .store
        .find_application(id)
        .await?
        .ok_or_else(application_not_found)?;
    ensure_owner(&identity, application.user_id)?;
    Ok(Json(ApplicationResponse { application }))
}

/// POST /api/applications
///
/// Multipart form with `job_id`, optional `name`/`email`/`phone`, an optional
/// `resume` file and `ai_parsed_data` as JSON text. Name and email default to
/// the caller's account details.
pub async fn handle_create_application(
    State(state): State<AppState>,
    identity: Identity,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ApplicationMutationResponse>), AppError> {
    let identity = require_user(identity, "Only regular users can create applications")?;
    let mut multipart = multipart?;
    let form = UploadForm::read(&mut multipart, "resume").await?;

    let job_id = form
        .text("job_id")
        .ok_or_else(|| AppError::Validation("Job ID is required".to_string()))?;
    let job_id = Uuid::parse_str(job_id.trim())
        .map_err(|_| AppError::Validation("Job ID is invalid".to_string()))?;

    if state.store.find_job(job_id).await?.is_none() {
        return Err(AppError::NotFound("Job not found".to_string()));
    }
    if state
        .store
        .application_exists(identity.subject_id, job_id)
        .await?
    {
        return Err(AppError::Duplicate(
            "You have already applied for this job".to_string(),
        ));
    }

    let (mut name, mut email) = (form.text("name"), form.text("email"));
    if name.is_none() || email.is_none() {
        if let Some(account) = state.store.find_user(identity.subject_id).await? {
            name = name.or(Some(account.full_name));
            email = email.or(Some(account.email));
        }
    }
    let (Some(name), Some(email)) = (name, email) else {
        return Err(AppError::Validation(
            "Name and email are required".to_string(),
        ));
    };

    let ai_parsed_data = form
        .text("ai_parsed_data")
        .map(|raw| decode_parsed_data(Value::String(raw)).map_err(invalid_parsed_data))
        .transpose()?;

    let application = state
        .store
        .create_application(NewApplication {
            job_id,
            user_id: identity.subject_id,
            name,
            email,
            phone: form.text("phone"),
            resume: form.file,
            ai_parsed_data,
        })
        .await?;
    tracing::info!(
        application_id = %application.id,
        job_id = %job_id,
        user_id = %identity.subject_id,
        "Application submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApplicationMutationResponse {
            message: "Application submitted successfully",
            application,
        }),
    ))
}

/// PUT /api/applications/:id
pub async fn handle_update_application(
    State(state): State<AppState>,
    identity: Identity,
    ResourceId(id): ResourceId,
    payload: Result<Json<ApplicationPatch>, JsonRejection>,
) -> Result<Json<ApplicationMutationResponse>, AppError> {
    let Json(mut patch) = payload?;
    authorize_access(&state, &identity, id).await?;

    patch.ai_parsed_data = patch
        .ai_parsed_data
        .map(decode_parsed_data)
        .transpose()
        .map_err(invalid_parsed_data)?;

    let application = state
        .store
        .update_application(id, patch)
        .await?
        .ok_or_else(application_not_found)?;

    Ok(Json(ApplicationMutationResponse {
        message: "Application updated successfully",
        application,
    }))
}

/// DELETE /api/applications/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    identity: Identity,
    ResourceId(id): ResourceId,
) -> Result<Json<MessageResponse>, AppError> {
    authorize_access(&state, &identity, id).await?;
    if !state.store.delete_application(id).await? {
        return Err(application_not_found());
    }
    tracing::info!(application_id = %id, subject = %identity.subject_id, "Application deleted");
    Ok(Json(MessageResponse {
        message: "Application deleted successfully",
    }))
}
