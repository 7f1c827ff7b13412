//! Persistence seam. Handlers talk to `Arc<dyn Store>`; production wires in
//! `PgStore`, tests use the in-memory store from `test_support`.
//!
//! Methods that enforce a uniqueness rule return `AppError::Duplicate` on conflict.

pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::ApplicationScope;
use crate::errors::AppError;
use crate::models::account::{AdminAccount, AdminCredentials, UserAccount, UserCredentials};
use crate::models::applicant::{ApplicantDetail, ApplicantSummary, NewApplicant};
use crate::models::application::{
    Application, ApplicationDetail, ApplicationPatch, ApplicationSummary, NewApplication,
};
use crate::models::job::{Job, JobFilter, JobPatch, NewJob};

pub use postgres::PgStore;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminCredentials>, AppError>;
    async fn admin_exists(&self, id: Uuid) -> Result<bool, AppError>;
    async fn create_admin(&self, email: &str, password_hash: &str)
        -> Result<AdminAccount, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserCredentials>, AppError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<UserAccount>, AppError>;
    async fn create_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserAccount, AppError>;
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Newest first.
    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, AppError>;
    async fn find_job(&self, id: Uuid) -> Result<Option<Job>, AppError>;
    async fn create_job(&self, job: NewJob) -> Result<Job, AppError>;
    /// `None` when no job has this id.
    async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<Option<Job>, AppError>;
    /// `false` when no job has this id.
    async fn delete_job(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ApplicantStore: Send + Sync {
    async fn list_applicants(&self) -> Result<Vec<ApplicantSummary>, AppError>;
    async fn find_applicant(&self, id: Uuid) -> Result<Option<ApplicantDetail>, AppError>;
    async fn create_applicant(&self, applicant: NewApplicant)
        -> Result<ApplicantSummary, AppError>;
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// The scope is applied inside the query; rows outside it are never loaded.
    async fn list_applications(
        &self,
        scope: ApplicationScope,
    ) -> Result<Vec<ApplicationSummary>, AppError>;
    async fn list_applications_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<ApplicationSummary>, AppError>;
    async fn find_application(&self, id: Uuid) -> Result<Option<ApplicationDetail>, AppError>;
    /// Owner lookup used ahead of ownership-checked mutations.
    async fn application_owner(&self, id: Uuid) -> Result<Option<Uuid>, AppError>;
    async fn application_exists(&self, user_id: Uuid, job_id: Uuid) -> Result<bool, AppError>;
    async fn create_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, AppError>;
    async fn update_application(
        &self,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> Result<Option<Application>, AppError>;
    async fn delete_application(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Everything the HTTP layer needs from persistence.
#[async_trait]
pub trait Store: AccountStore + JobStore + ApplicantStore + ApplicationStore {
    /// Round trip used by the health probe.
    async fn ping(&self) -> Result<(), AppError>;
}
