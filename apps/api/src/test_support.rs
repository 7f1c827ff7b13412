//! Test fixtures: an in-memory `Store`, stub extractors and request helpers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::auth::{ApplicationScope, PasswordHasher, TokenService};
use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::models::account::{
    AdminAccount, AdminCredentials, Role, UserAccount, UserCredentials,
};
use crate::models::applicant::{ApplicantDetail, ApplicantSummary, NewApplicant};
use crate::models::application::{
    Application, ApplicationDetail, ApplicationPatch, ApplicationSummary, NewApplication,
};
use crate::models::job::{Job, JobFilter, JobPatch, NewJob};
use crate::resume::extractor::{parse_reply, ExtractionError, ParsedResume, ResumeExtractor};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{AccountStore, ApplicantStore, ApplicationStore, JobStore, Store};

pub const TEST_SECRET: &str = "test-secret-with-enough-entropy-0123456789";
const BOUNDARY: &str = "jobboard-test-boundary";

// ────────────────────────────────────────────────────────────────────────────
// In-memory store
// ────────────────────────────────────────────────────────────────────────────

struct StoredApplication {
    row: Application,
    resume_mime: Option<String>,
    resume_data: Option<Vec<u8>>,
}

#[derive(Default)]
struct Tables {
    admins: Vec<AdminCredentials>,
    users: Vec<UserCredentials>,
    jobs: Vec<Job>,
    applicants: Vec<ApplicantDetail>,
    applications: Vec<StoredApplication>,
}

/// Rows are kept in insertion order; listings walk them in reverse so the
/// newest row comes first even when timestamps tie.
pub struct MemoryStore {
    tables: Mutex<Tables>,
    healthy: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            healthy: AtomicBool::new(true),
        }
    }
}

impl MemoryStore {
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn application_count(&self) -> usize {
        self.tables.lock().unwrap().applications.len()
    }

    fn summary(tables: &Tables, stored: &StoredApplication, with_user: bool) -> ApplicationSummary {
        let job = tables.jobs.iter().find(|j| j.id == stored.row.job_id);
        let user_name = with_user
            .then(|| tables.users.iter().find(|u| u.id == stored.row.user_id))
            .flatten()
            .map(|u| u.full_name.clone());
        let row = &stored.row;
        ApplicationSummary {
            id: row.id,
            job_id: row.job_id,
            user_id: row.user_id,
            name: row.name.clone(),
            email: row.email.clone(),
            phone: row.phone.clone(),
            resume_filename: row.resume_filename.clone(),
            ai_parsed_data: row.ai_parsed_data.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            job_title: job.map(|j| j.title.clone()),
            job_company: job.map(|j| j.company.clone()),
            user_name,
        }
    }
}

fn summary_of(detail: &ApplicantDetail) -> ApplicantSummary {
    ApplicantSummary {
        id: detail.id,
        name: detail.name.clone(),
        email: detail.email.clone(),
        phone: detail.phone.clone(),
        skills: detail.skills.clone(),
        experience: detail.experience.clone(),
        education: detail.education.clone(),
        resume_filename: detail.resume_filename.clone(),
        created_at: detail.created_at,
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminCredentials>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.admins.iter().find(|a| a.email == email).cloned())
    }

    async fn admin_exists(&self, id: Uuid) -> Result<bool, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.admins.iter().any(|a| a.id == id))
    }

    async fn create_admin(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<AdminAccount, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.admins.iter().any(|a| a.email == email) {
            return Err(AppError::Duplicate(
                "Admin with this email already exists".to_string(),
            ));
        }
        let admin = AdminCredentials {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        let account = admin.account();
        tables.admins.push(admin);
        Ok(account)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserCredentials>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserAccount>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| u.id == id)
            .map(UserCredentials::account))
    }

    async fn create_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserAccount, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.email == email) {
            return Err(AppError::Duplicate(
                "User with this email already exists".to_string(),
            ));
        }
        let user = UserCredentials {
            id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        let account = user.account();
        tables.users.push(user);
        Ok(account)
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .jobs
            .iter()
            .rev()
            .filter(|j| filter.matches(j))
            .cloned()
            .collect())
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn create_job(&self, job: NewJob) -> Result<Job, AppError> {
        let job = Job {
            id: Uuid::new_v4(),
            title: job.title,
            company: job.company,
            description: job.description,
            required_skills: job.required_skills,
            location: job.location,
            job_type: job.job_type,
            category: job.category,
            language: job.language,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().jobs.push(job.clone());
        Ok(job)
    }

    async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<Option<Job>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.jobs.iter_mut().find(|j| j.id == id).map(|job| {
            patch.apply(job);
            job.clone()
        }))
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.jobs.len();
        tables.jobs.retain(|j| j.id != id);
        Ok(tables.jobs.len() < before)
    }
}

#[async_trait]
impl ApplicantStore for MemoryStore {
    async fn list_applicants(&self) -> Result<Vec<ApplicantSummary>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.applicants.iter().rev().map(summary_of).collect())
    }

    async fn find_applicant(&self, id: Uuid) -> Result<Option<ApplicantDetail>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.applicants.iter().find(|a| a.id == id).cloned())
    }

    async fn create_applicant(
        &self,
        applicant: NewApplicant,
    ) -> Result<ApplicantSummary, AppError> {
        let (resume_filename, resume_mime, resume_data) = match applicant.resume {
            Some(file) => (Some(file.filename), Some(file.mime), Some(file.data)),
            None => (None, None, None),
        };
        let detail = ApplicantDetail {
            id: Uuid::new_v4(),
            name: applicant.name,
            email: applicant.email,
            phone: applicant.phone,
            skills: applicant.skills,
            experience: applicant.experience,
            education: applicant.education,
            resume_filename,
            resume_mime,
            resume_data,
            created_at: Utc::now(),
        };
        let summary = summary_of(&detail);
        self.tables.lock().unwrap().applicants.push(detail);
        Ok(summary)
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn list_applications(
        &self,
        scope: ApplicationScope,
    ) -> Result<Vec<ApplicationSummary>, AppError> {
        let tables = self.tables.lock().unwrap();
        let with_user = scope == ApplicationScope::All;
        Ok(tables
            .applications
            .iter()
            .rev()
            .filter(|a| scope.permits(a.row.user_id))
            .map(|a| Self::summary(&tables, a, with_user))
            .collect())
    }

    async fn list_applications_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<ApplicationSummary>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .applications
            .iter()
            .rev()
            .filter(|a| a.row.job_id == job_id)
            .map(|a| Self::summary(&tables, a, true))
            .collect())
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<ApplicationDetail>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .applications
            .iter()
            .find(|a| a.row.id == id)
            .map(|stored| {
                let job = tables.jobs.iter().find(|j| j.id == stored.row.job_id);
                let row = &stored.row;
                ApplicationDetail {
                    id: row.id,
                    job_id: row.job_id,
                    user_id: row.user_id,
                    name: row.name.clone(),
                    email: row.email.clone(),
                    phone: row.phone.clone(),
                    resume_filename: row.resume_filename.clone(),
                    resume_mime: stored.resume_mime.clone(),
                    resume_data: stored.resume_data.clone(),
                    ai_parsed_data: row.ai_parsed_data.clone(),
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                    job_title: job.map(|j| j.title.clone()),
                    job_company: job.map(|j| j.company.clone()),
                }
            }))
    }

    async fn application_owner(&self, id: Uuid) -> Result<Option<Uuid>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .applications
            .iter()
            .find(|a| a.row.id == id)
            .map(|a| a.row.user_id))
    }

    async fn application_exists(&self, user_id: Uuid, job_id: Uuid) -> Result<bool, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .applications
            .iter()
            .any(|a| a.row.user_id == user_id && a.row.job_id == job_id))
    }

    async fn create_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, AppError> {
        let mut tables = self.tables.lock().unwrap();
        // Mirrors the UNIQUE (user_id, job_id) constraint.
        if tables
            .applications
            .iter()
            .any(|a| a.row.user_id == application.user_id && a.row.job_id == application.job_id)
        {
            return Err(AppError::Duplicate(
                "You have already applied for this job".to_string(),
            ));
        }
        let (resume_filename, resume_mime, resume_data) = match application.resume {
            Some(file) => (Some(file.filename), Some(file.mime), Some(file.data)),
            None => (None, None, None),
        };
        let now = Utc::now();
        let row = Application {
            id: Uuid::new_v4(),
            job_id: application.job_id,
            user_id: application.user_id,
            name: application.name,
            email: application.email,
            phone: application.phone,
            resume_filename,
            ai_parsed_data: application.ai_parsed_data,
            created_at: now,
            updated_at: now,
        };
        tables.applications.push(StoredApplication {
            row: row.clone(),
            resume_mime,
            resume_data,
        });
        Ok(row)
    }

    async fn update_application(
        &self,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> Result<Option<Application>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .applications
            .iter_mut()
            .find(|a| a.row.id == id)
            .map(|stored| {
                patch.apply(&mut stored.row);
                stored.row.clone()
            }))
    }

    async fn delete_application(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.applications.len();
        tables.applications.retain(|a| a.row.id != id);
        Ok(tables.applications.len() < before)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::Internal(anyhow::anyhow!("connection refused")))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub extractors
// ────────────────────────────────────────────────────────────────────────────

/// Replays a canned model reply (through the real reply parser) or a canned failure.
pub struct StubExtractor {
    reply: Result<String, u16>,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubExtractor {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResumeExtractor for StubExtractor {
    async fn extract(
        &self,
        raw_text: &str,
        filename: &str,
    ) -> Result<ParsedResume, ExtractionError> {
        self.calls
            .lock()
            .unwrap()
            .push((raw_text.to_string(), filename.to_string()));
        match &self.reply {
            Ok(reply) => parse_reply(reply),
            Err(status) => Err(ExtractionError::Upstream(LlmError::Api {
                status: *status,
                message: "stubbed failure".to_string(),
            })),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// State and request helpers
// ────────────────────────────────────────────────────────────────────────────

pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    test_state_with_extractor(Arc::new(StubExtractor::replying("{}")))
}

pub fn test_state_with_extractor(
    extractor: Arc<dyn ResumeExtractor>,
) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let state = AppState {
        store: store.clone(),
        tokens: TokenService::new(TEST_SECRET),
        passwords: PasswordHasher::new(4),
        extractor,
    };
    (state, store)
}

pub fn test_app(state: AppState) -> Router {
    build_router(state)
}

/// Drives one request through the router and decodes the JSON body (Null if empty).
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Builds a multipart/form-data request. `file` is (filename, content type, bytes)
/// and is sent under the `resume` field.
pub fn multipart_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// Seed helpers
// ────────────────────────────────────────────────────────────────────────────

pub async fn seed_admin(state: &AppState, email: &str) -> (AdminAccount, String) {
    let admin = state.store.create_admin(email, "unused-hash").await.unwrap();
    let token = state.tokens.issue(admin.id, &admin.email, Role::Admin).unwrap();
    (admin, token)
}

pub async fn seed_user(state: &AppState, full_name: &str, email: &str) -> (UserAccount, String) {
    let user = state
        .store
        .create_user(full_name, email, "unused-hash")
        .await
        .unwrap();
    let token = state.tokens.issue(user.id, &user.email, Role::User).unwrap();
    (user, token)
}

pub async fn seed_job(state: &AppState, title: &str, company: &str) -> Job {
    state
        .store
        .create_job(NewJob {
            title: title.to_string(),
            company: company.to_string(),
            description: format!("{title} at {company}"),
            required_skills: vec!["Rust".to_string()],
            location: Some("Remote".to_string()),
            job_type: Some("full-time".to_string()),
            category: Some("engineering".to_string()),
            language: Some("en".to_string()),
        })
        .await
        .unwrap()
}

pub async fn seed_application(state: &AppState, user: &UserAccount, job: &Job) -> Application {
    state
        .store
        .create_application(NewApplication {
            job_id: job.id,
            user_id: user.id,
            name: user.full_name.clone(),
            email: user.email.clone(),
            phone: None,
            resume: None,
            ai_parsed_data: None,
        })
        .await
        .unwrap()
}
