use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::AdminIdentity;
use crate::errors::AppError;
use crate::extract::ResourceId;
use crate::models::job::{Job, JobFilter, JobPatch, NewJob};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
}

impl CreateJobRequest {
    fn validate(self) -> Result<NewJob, AppError> {
        let required = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let (Some(title), Some(company), Some(description)) = (
            required(self.title),
            required(self.company),
            required(self.description),
        ) else {
            return Err(AppError::Validation(
                "Title, company, and description are required".to_string(),
            ));
        };

        Ok(NewJob {
            title,
            company,
            description,
            required_skills: self.required_skills.unwrap_or_default(),
            location: self.location,
            job_type: self.job_type,
            category: self.category,
            language: self.language,
        })
    }
}

#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct JobResponse {
    pub job: Job,
}

#[derive(Serialize)]
pub struct JobMutationResponse {
    pub message: &'static str,
    pub job: Job,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn job_not_found() -> AppError {
    AppError::NotFound("Job not found".to_string())
}

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(filter): Query<JobFilter>,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = state.store.list_jobs(&filter.normalized()).await?;
    Ok(Json(JobListResponse {
        count: jobs.len(),
        jobs,
    }))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<JobResponse>, AppError> {
    let job = state.store.find_job(id).await?.ok_or_else(job_not_found)?;
    Ok(Json(JobResponse { job }))
}

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JobMutationResponse>), AppError> {
    let Json(req) = payload?;
    let job = state.store.create_job(req.validate()?).await?;
    tracing::info!(job_id = %job.id, admin_id = %admin.subject_id, "Job created");

    Ok((
        StatusCode::CREATED,
        Json(JobMutationResponse {
            message: "Job created successfully",
            job,
        }),
    ))
}

/// PUT /api/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    AdminIdentity(_): AdminIdentity,
    ResourceId(id): ResourceId,
    payload: Result<Json<JobPatch>, JsonRejection>,
) -> Result<Json<JobMutationResponse>, AppError> {
    let Json(patch) = payload?;
    let job = state
        .store
        .update_job(id, patch)
        .await?
        .ok_or_else(job_not_found)?;

    Ok(Json(JobMutationResponse {
        message: "Job updated successfully",
        job,
    }))
}

/// DELETE /api/jobs/:id
///
/// Applications pointing at the job are left in place.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    ResourceId(id): ResourceId,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.delete_job(id).await? {
        return Err(job_not_found());
    }
    tracing::info!(job_id = %id, admin_id = %admin.subject_id, "Job deleted");
    Ok(Json(MessageResponse {
        message: "Job deleted successfully",
    }))
}
