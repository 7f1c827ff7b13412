use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::uploads::UploadedFile;

/// Listing view of an applicant: everything except the resume blob.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicantSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub experience: Option<Value>,
    pub education: Option<String>,
    pub resume_filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Admin detail view. The blob is rendered as base64 and omitted when absent.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicantDetail {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub experience: Option<Value>,
    pub education: Option<String>,
    pub resume_filename: Option<String>,
    pub resume_mime: Option<String>,
    #[serde(
        serialize_with = "super::serialize_blob",
        skip_serializing_if = "Option::is_none"
    )]
    pub resume_data: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
}

/// Public resume submission.
#[derive(Debug, Clone)]
pub struct NewApplicant {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub experience: Option<Value>,
    pub education: Option<String>,
    pub resume: Option<UploadedFile>,
}
