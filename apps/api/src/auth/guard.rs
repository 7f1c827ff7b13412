//! Authorization predicates.
//!
//! A request moves through `token presented → token verified → role checked →
//! ownership checked`. Each step is an extractor or a pure function, so a handler
//! states its requirements in its signature and the router applies them in order.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::auth::token::{Claims, TokenError};
use crate::errors::AppError;
use crate::models::account::Role;
use crate::state::AppState;
use crate::store::AccountStore;

const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Verified caller identity. Role is taken from the token as issued.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub subject_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            subject_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Reads the token from `Authorization: <scheme> <token>`, falling back to `x-access-token`.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let from_authorization = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_whitespace().nth(1));

    from_authorization
        .or_else(|| {
            headers
                .get(ACCESS_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        })
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(identity.clone());
        }

        let token = extract_token(&parts.headers).ok_or_else(|| {
            AppError::Unauthorized("Access denied. No token provided.".to_string())
        })?;

        let claims = state.tokens.verify(token).map_err(|e| {
            match &e {
                TokenError::Expired => tracing::debug!(uri = %parts.uri, "expired token"),
                _ => tracing::debug!(uri = %parts.uri, "token rejected: {e}"),
            }
            AppError::InvalidToken
        })?;

        let identity = Identity::from(claims);
        parts.extensions.insert(identity.clone());
        Ok(identity)
    }
}

/// Caller whose token claims admin AND whose subject still exists as an admin account.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Identity);

/// Role first, then the store lookup: a user token never reaches the admin table,
/// even if its subject id collides with an admin id.
pub async fn authorize_admin<S>(identity: Identity, store: &S) -> Result<Identity, AppError>
where
    S: AccountStore + ?Sized,
{
    if !identity.is_admin() {
        return Err(admin_required());
    }
    if !store.admin_exists(identity.subject_id).await? {
        tracing::warn!(subject = %identity.subject_id, "admin token for unknown admin account");
        return Err(admin_required());
    }
    Ok(identity)
}

fn admin_required() -> AppError {
    AppError::Forbidden("Access denied. Admin privileges required.".to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        let identity = authorize_admin(identity, state.store.as_ref()).await?;
        Ok(AdminIdentity(identity))
    }
}

/// Caller holding a regular user token.
#[derive(Debug, Clone)]
pub struct UserIdentity(pub Identity);

pub fn require_user(identity: Identity, message: &str) -> Result<Identity, AppError> {
    match identity.role {
        Role::User => Ok(identity),
        Role::Admin => Err(AppError::Forbidden(message.to_string())),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for UserIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        Ok(UserIdentity(require_user(identity, "Access denied")?))
    }
}

/// Admins may touch any application; users only their own.
pub fn ensure_owner(identity: &Identity, owner_id: Uuid) -> Result<(), AppError> {
    if identity.is_admin() || identity.subject_id == owner_id {
        Ok(())
    } else {
        Err(AppError::Forbidden("Access denied".to_string()))
    }
}

/// Visibility of application rows, pushed down into the list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationScope {
    All,
    Owner(Uuid),
}

impl ApplicationScope {
    pub fn for_identity(identity: &Identity) -> Self {
        match identity.role {
            Role::Admin => ApplicationScope::All,
            Role::User => ApplicationScope::Owner(identity.subject_id),
        }
    }

    #[cfg(test)]
    pub fn permits(&self, user_id: Uuid) -> bool {
        match self {
            ApplicationScope::All => true,
            ApplicationScope::Owner(owner) => *owner == user_id,
        }
    }
}
