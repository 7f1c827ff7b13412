use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::uploads::UploadedFile;

/// An application row as returned by create and update. No blob.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub resume_filename: Option<String>,
    pub ai_parsed_data: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing view joined with the job and, for admin listings, the applicant's account name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationSummary {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub resume_filename: Option<String>,
    pub ai_parsed_data: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Null once the job has been deleted.
    pub job_title: Option<String>,
    pub job_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationDetail {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub resume_filename: Option<String>,
    pub resume_mime: Option<String>,
    #[serde(
        serialize_with = "super::serialize_blob",
        skip_serializing_if = "Option::is_none"
    )]
    pub resume_data: Option<Vec<u8>>,
    pub ai_parsed_data: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub job_title: Option<String>,
    pub job_company: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub resume: Option<UploadedFile>,
    pub ai_parsed_data: Option<Value>,
}

/// Field-level merge for applications; `updated_at` is always bumped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub ai_parsed_data: Option<Value>,
}

impl ApplicationPatch {
    #[cfg(test)]
    pub fn apply(self, application: &mut Application) {
        if let Some(name) = self.name {
            application.name = name;
        }
        if let Some(email) = self.email {
            application.email = email;
        }
        if let Some(phone) = self.phone {
            application.phone = Some(phone);
        }
        if let Some(data) = self.ai_parsed_data {
            application.ai_parsed_data = Some(data);
        }
        application.updated_at = Utc::now();
    }
}

/// `ai_parsed_data` arrives either as a JSON value or as a JSON-encoded string
/// (multipart forms can only carry text). Decodes the latter.
pub fn decode_parsed_data(raw: Value) -> Result<Value, serde_json::Error> {
    match raw {
        Value::String(text) => serde_json::from_str(&text),
        other => Ok(other),
    }
}
