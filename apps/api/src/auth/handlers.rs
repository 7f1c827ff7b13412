//! Account registration, login and profile handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::guard::UserIdentity;
use crate::errors::AppError;
use crate::models::account::{AdminAccount, Role, UserAccount};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserRegisterRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminAuthResponse {
    pub message: &'static str,
    pub admin: AdminAccount,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserAuthResponse {
    pub message: &'static str,
    pub user: UserAccount,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserAccount,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn email_and_password(req: CredentialsRequest) -> Result<(String, String), AppError> {
    match (present(req.email), present(req.password)) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(AppError::Validation(
            "Email and password are required".to_string(),
        )),
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

fn issue(state: &AppState, id: uuid::Uuid, email: &str, role: Role) -> Result<String, AppError> {
    state
        .tokens
        .issue(id, email, role)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))
}

/// POST /api/admin/register
pub async fn handle_admin_register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AdminAuthResponse>), AppError> {
    let Json(req) = payload?;
    let (email, password) = email_and_password(req)?;

    if state.store.find_admin_by_email(&email).await?.is_some() {
        return Err(AppError::Duplicate(
            "Admin with this email already exists".to_string(),
        ));
    }

    let hash = state.passwords.hash(&password).await?;
    let admin = state.store.create_admin(&email, &hash).await?;
    let token = issue(&state, admin.id, &admin.email, Role::Admin)?;
    tracing::info!(admin_id = %admin.id, "Admin registered");

    Ok((
        StatusCode::CREATED,
        Json(AdminAuthResponse {
            message: "Admin registered successfully",
            admin,
            token,
        }),
    ))
}

/// POST /api/admin/login
pub async fn handle_admin_login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<AdminAuthResponse>, AppError> {
    let Json(req) = payload?;
    let (email, password) = email_and_password(req)?;

    let admin = state
        .store
        .find_admin_by_email(&email)
        .await?
        .ok_or_else(invalid_credentials)?;
    if !state.passwords.verify(&password, &admin.password_hash).await? {
        return Err(invalid_credentials());
    }

    let token = issue(&state, admin.id, &admin.email, Role::Admin)?;
    Ok(Json(AdminAuthResponse {
        message: "Admin logged in successfully",
        admin: admin.account(),
        token,
    }))
}

/// POST /api/users/register
pub async fn handle_user_register(
    State(state): State<AppState>,
    payload: Result<Json<UserRegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserAuthResponse>), AppError> {
    let Json(req) = payload?;
    let (Some(full_name), Some(email), Some(password)) = (
        present(req.full_name),
        present(req.email),
        present(req.password),
    ) else {
        return Err(AppError::Validation(
            "Full name, email, and password are required".to_string(),
        ));
    };

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Duplicate(
            "User with this email already exists".to_string(),
        ));
    }

    let hash = state.passwords.hash(&password).await?;
    let user = state.store.create_user(&full_name, &email, &hash).await?;
    let token = issue(&state, user.id, &user.email, Role::User)?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(UserAuthResponse {
            message: "User registered successfully",
            user,
            token,
        }),
    ))
}

/// POST /api/users/login
pub async fn handle_user_login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<UserAuthResponse>, AppError> {
    let Json(req) = payload?;
    let (email, password) = email_and_password(req)?;

    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(invalid_credentials)?;
    if !state.passwords.verify(&password, &user.password_hash).await? {
        return Err(invalid_credentials());
    }

    let token = issue(&state, user.id, &user.email, Role::User)?;
    Ok(Json(UserAuthResponse {
        message: "User logged in successfully",
        user: user.account(),
        token,
    }))
}

/// GET /api/users/me
pub async fn handle_me(
    State(state): State<AppState>,
    UserIdentity(identity): UserIdentity,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = state
        .store
        .find_user(identity.subject_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(ProfileResponse { user }))
}
