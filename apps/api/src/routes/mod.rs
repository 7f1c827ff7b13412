pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::applicants::handlers as applicants;
use crate::applications::handlers as applications;
use crate::auth::handlers as auth;
use crate::jobs::handlers as jobs;
use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::uploads::REQUEST_BODY_LIMIT;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/api/health", get(health::health_handler))
        .route("/api/parse-resume", post(resume::handle_parse_resume))
        // Accounts
        .route("/api/admin/register", post(auth::handle_admin_register))
        .route("/api/admin/login", post(auth::handle_admin_login))
        .route("/api/users/register", post(auth::handle_user_register))
        .route("/api/users/login", post(auth::handle_user_login))
        .route("/api/users/me", get(auth::handle_me))
        // Jobs
        .route(
            "/api/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/jobs/:id",
            get(jobs::handle_get_job)
                .put(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route(
            "/api/jobs/:id/applications",
            get(applications::handle_list_job_applications),
        )
        // Applicants
        .route(
            "/api/applicants",
            get(applicants::handle_list_applicants).post(applicants::handle_create_applicant),
        )
        .route("/api/applicants/:id", get(applicants::handle_get_applicant))
        // Applications
        .route(
            "/api/applications",
            get(applications::handle_list_applications)
                .post(applications::handle_create_application),
        )
        .route(
            "/api/applications/:id",
            get(applications::handle_get_application)
                .put(applications::handle_update_application)
                .delete(applications::handle_delete_application),
        )
        .layer(DefaultBodyLimit::max(REQUEST_BODY_LIMIT))
        .with_state(state)
}
