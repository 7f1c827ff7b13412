//! Multipart form buffering for resume uploads.

use std::collections::HashMap;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;

use crate::errors::AppError;

/// Largest accepted resume file.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Request body ceiling: one maximal file plus headroom for the text fields.
pub const REQUEST_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub mime: String,
    pub data: Vec<u8>,
}

/// A fully buffered multipart form: repeatable text fields plus at most one file.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, Vec<String>>,
    pub file: Option<UploadedFile>,
}

impl UploadForm {
    /// Reads every part of the form. The part named `file_field` is treated as the
    /// upload; an empty file part (no name, no bytes) counts as no upload.
    pub async fn read(multipart: &mut Multipart, file_field: &str) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            if name == file_field {
                let filename = field.file_name().unwrap_or_default().to_string();
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = read_bounded(field).await?;
                if filename.is_empty() && data.is_empty() {
                    continue;
                }
                form.file = Some(UploadedFile {
                    filename,
                    mime,
                    data,
                });
                continue;
            }

            let value = field.text().await.map_err(multipart_error)?;
            form.fields.entry(name).or_default().push(value);
        }

        Ok(form)
    }

    /// First non-blank value of a text field.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)?
            .iter()
            .find(|v| !v.trim().is_empty())
            .cloned()
    }

    /// Every value submitted under `name`, in order.
    pub fn values(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

async fn read_bounded(mut field: Field<'_>) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::Validation(format!(
                "Resume file exceeds the {} MB limit",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
}
