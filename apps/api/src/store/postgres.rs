use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{AccountStore, ApplicantStore, ApplicationStore, JobStore, Store};
use crate::auth::ApplicationScope;
use crate::errors::AppError;
use crate::models::account::{AdminAccount, AdminCredentials, UserAccount, UserCredentials};
use crate::models::applicant::{ApplicantDetail, ApplicantSummary, NewApplicant};
use crate::models::application::{
    Application, ApplicationDetail, ApplicationPatch, ApplicationSummary, NewApplication,
};
use crate::models::job::{Job, JobFilter, JobPatch, NewJob};

const UNIQUE_VIOLATION: &str = "23505";

const JOB_COLUMNS: &str = "id, title, company, description, required_skills, location, \
                           job_type, category, language, created_at";

const APPLICANT_COLUMNS: &str = "id, name, email, phone, skills, experience, education, \
                                 resume_filename, created_at";

const APPLICATION_COLUMNS: &str = "id, job_id, user_id, name, email, phone, resume_filename, \
                                   ai_parsed_data, created_at, updated_at";

/// PostgreSQL-backed store. Shares one pool across all repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a unique-constraint violation to `Duplicate`; everything else stays a database error.
fn unique_or_db(e: sqlx::Error, message: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            AppError::Duplicate(message.to_string())
        }
        _ => AppError::Database(e),
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminCredentials>, AppError> {
        Ok(sqlx::query_as::<_, AdminCredentials>(
            "SELECT id, email, password_hash, created_at FROM admin_users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn admin_exists(&self, id: Uuid) -> Result<bool, AppError> {
        let found: Option<Uuid> = sqlx::query_scalar("SELECT id FROM admin_users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn create_admin(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<AdminAccount, AppError> {
        sqlx::query_as::<_, AdminAccount>(
            "INSERT INTO admin_users (email, password_hash) VALUES ($1, $2) \
             RETURNING id, email, created_at",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_or_db(e, "Admin with this email already exists"))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserCredentials>, AppError> {
        Ok(sqlx::query_as::<_, UserCredentials>(
            "SELECT id, full_name, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserAccount>, AppError> {
        Ok(sqlx::query_as::<_, UserAccount>(
            "SELECT id, full_name, email, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserAccount, AppError> {
        sqlx::query_as::<_, UserAccount>(
            "INSERT INTO users (full_name, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING id, full_name, email, created_at",
        )
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_or_db(e, "User with this email already exists"))
    }
}

#[async_trait]
impl JobStore for PgStore {
    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, AppError> {
        // A NULL parameter disables its predicate, keeping the statement fully parameterized.
        let sql = format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE ($1::text IS NULL OR location = $1)
              AND ($2::text IS NULL OR job_type = $2)
              AND ($3::text IS NULL OR category = $3)
              AND ($4::text IS NULL OR language = $4)
              AND ($5::text IS NULL
                   OR title ILIKE '%' || $5 || '%'
                   OR company ILIKE '%' || $5 || '%'
                   OR description ILIKE '%' || $5 || '%')
            ORDER BY created_at DESC
            "#
        );

        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(&filter.location)
            .bind(&filter.job_type)
            .bind(&filter.category)
            .bind(&filter.language)
            .bind(&filter.search)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        Ok(
            sqlx::query_as::<_, Job>(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_job(&self, job: NewJob) -> Result<Job, AppError> {
        let sql = format!(
            r#"
            INSERT INTO jobs
                (title, company, description, required_skills, location, job_type, category, language)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {JOB_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(job.title)
            .bind(job.company)
            .bind(job.description)
            .bind(job.required_skills)
            .bind(job.location)
            .bind(job.job_type)
            .bind(job.category)
            .bind(job.language)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<Option<Job>, AppError> {
        let sql = format!(
            r#"
            UPDATE jobs
            SET title = COALESCE($1, title),
                company = COALESCE($2, company),
                description = COALESCE($3, description),
                required_skills = COALESCE($4, required_skills),
                location = COALESCE($5, location),
                job_type = COALESCE($6, job_type),
                category = COALESCE($7, category),
                language = COALESCE($8, language)
            WHERE id = $9
            RETURNING {JOB_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(patch.title)
            .bind(patch.company)
            .bind(patch.description)
            .bind(patch.required_skills)
            .bind(patch.location)
            .bind(patch.job_type)
            .bind(patch.category)
            .bind(patch.language)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ApplicantStore for PgStore {
    async fn list_applicants(&self) -> Result<Vec<ApplicantSummary>, AppError> {
        Ok(sqlx::query_as::<_, ApplicantSummary>(&format!(
            "SELECT {APPLICANT_COLUMNS} FROM applicants ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_applicant(&self, id: Uuid) -> Result<Option<ApplicantDetail>, AppError> {
        Ok(sqlx::query_as::<_, ApplicantDetail>(
            r#"
            SELECT id, name, email, phone, skills, experience, education,
                   resume_filename, resume_mime, resume_data, created_at
            FROM applicants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_applicant(
        &self,
        applicant: NewApplicant,
    ) -> Result<ApplicantSummary, AppError> {
        let (filename, mime, data) = match applicant.resume {
            Some(file) => (Some(file.filename), Some(file.mime), Some(file.data)),
            None => (None, None, None),
        };
        let sql = format!(
            r#"
            INSERT INTO applicants
                (name, email, phone, skills, experience, education,
                 resume_filename, resume_mime, resume_data)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {APPLICANT_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, ApplicantSummary>(&sql)
            .bind(applicant.name)
            .bind(applicant.email)
            .bind(applicant.phone)
            .bind(applicant.skills)
            .bind(applicant.experience)
            .bind(applicant.education)
            .bind(filename)
            .bind(mime)
            .bind(data)
            .fetch_one(&self.pool)
            .await?)
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn list_applications(
        &self,
        scope: ApplicationScope,
    ) -> Result<Vec<ApplicationSummary>, AppError> {
        let rows = match scope {
            ApplicationScope::All => {
                sqlx::query_as::<_, ApplicationSummary>(
                    r#"
                    SELECT a.id, a.job_id, a.user_id, a.name, a.email, a.phone, a.resume_filename,
                           a.ai_parsed_data, a.created_at, a.updated_at,
                           j.title AS job_title, j.company AS job_company,
                           u.full_name AS user_name
                    FROM applications a
                    LEFT JOIN jobs j ON a.job_id = j.id
                    LEFT JOIN users u ON a.user_id = u.id
                    ORDER BY a.created_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
            ApplicationScope::Owner(user_id) => {
                sqlx::query_as::<_, ApplicationSummary>(
                    r#"
                    SELECT a.id, a.job_id, a.user_id, a.name, a.email, a.phone, a.resume_filename,
                           a.ai_parsed_data, a.created_at, a.updated_at,
                           j.title AS job_title, j.company AS job_company,
                           NULL::text AS user_name
                    FROM applications a
                    LEFT JOIN jobs j ON a.job_id = j.id
                    WHERE a.user_id = $1
                    ORDER BY a.created_at DESC
                    "#,
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    async fn list_applications_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<ApplicationSummary>, AppError> {
        Ok(sqlx::query_as::<_, ApplicationSummary>(
            r#"
            SELECT a.id, a.job_id, a.user_id, a.name, a.email, a.phone, a.resume_filename,
                   a.ai_parsed_data, a.created_at, a.updated_at,
                   j.title AS job_title, j.company AS job_company,
                   u.full_name AS user_name
            FROM applications a
            LEFT JOIN jobs j ON a.job_id = j.id
            LEFT JOIN users u ON a.user_id = u.id
            WHERE a.job_id = $1
            ORDER BY a.created_at DESC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<ApplicationDetail>, AppError> {
        Ok(sqlx::query_as::<_, ApplicationDetail>(
            r#"
            SELECT a.id, a.job_id, a.user_id, a.name, a.email, a.phone,
                   a.resume_filename, a.resume_mime, a.resume_data, a.ai_parsed_data,
                   a.created_at, a.updated_at,
                   j.title AS job_title, j.company AS job_company
            FROM applications a
            LEFT JOIN jobs j ON a.job_id = j.id
            WHERE a.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn application_owner(&self, id: Uuid) -> Result<Option<Uuid>, AppError> {
        Ok(
            sqlx::query_scalar("SELECT user_id FROM applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn application_exists(&self, user_id: Uuid, job_id: Uuid) -> Result<bool, AppError> {
        let found: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM applications WHERE user_id = $1 AND job_id = $2")
                .bind(user_id)
                .bind(job_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    async fn create_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, AppError> {
        let (filename, mime, data) = match application.resume {
            Some(file) => (Some(file.filename), Some(file.mime), Some(file.data)),
            None => (None, None, None),
        };
        // UNIQUE (user_id, job_id) closes the window between the existence check and this insert.
        let sql = format!(
            r#"
            INSERT INTO applications
                (job_id, user_id, name, email, phone,
                 resume_filename, resume_mime, resume_data, ai_parsed_data)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {APPLICATION_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Application>(&sql)
            .bind(application.job_id)
            .bind(application.user_id)
            .bind(application.name)
            .bind(application.email)
            .bind(application.phone)
            .bind(filename)
            .bind(mime)
            .bind(data)
            .bind(application.ai_parsed_data)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unique_or_db(e, "You have already applied for this job"))
    }

    async fn update_application(
        &self,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> Result<Option<Application>, AppError> {
        let sql = format!(
            r#"
            UPDATE applications
            SET name = COALESCE($1, name),
                email = COALESCE($2, email),
                phone = COALESCE($3, phone),
                ai_parsed_data = COALESCE($4, ai_parsed_data),
                updated_at = NOW()
            WHERE id = $5
            RETURNING {APPLICATION_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Application>(&sql)
            .bind(patch.name)
            .bind(patch.email)
            .bind(patch.phone)
            .bind(patch.ai_parsed_data)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_application(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
