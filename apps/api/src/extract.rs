use axum::extract::FromRequestParts;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;

/// A `:id` path parameter parsed as a UUID, rejected in the common error shape.
#[derive(Debug, Clone, Copy, Deserialize, FromRequestParts)]
#[serde(transparent)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ResourceId(pub Uuid);
