//! Multipart upload extraction shared by the attachment and datasheet handlers.

use axum::extract::Multipart;

use crate::error::{AppError, AppResult};

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// A single uploaded file read fully into memory.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Read the `file` field from a multipart body.
///
/// Other fields are skipped. Fails with 400 when the field is missing or
/// empty and with 413 when it exceeds `max_bytes`.
pub async fn read_upload(multipart: &mut Multipart, max_bytes: usize) -> AppResult<Upload> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| "fil".to_string());
        let content_type = field.content_type().map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "File exceeds the maximum size of {max_bytes} bytes"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".into()));
        }

        return Ok(Upload {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(AppError::BadRequest(format!(
        "Multipart field '{FILE_FIELD}' is required"
    )))
}
