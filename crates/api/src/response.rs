//! Shared response envelope types for API handlers.
//!
//! List responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!({ "data": ... })` to get compile-time
//! type safety and consistent serialization.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// A CSV document sent as a file download.
pub struct CsvResponse {
    pub file_name: String,
    pub body: String,
}

impl IntoResponse for CsvResponse {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    hms_core::files::attachment_disposition(&self.file_name),
                ),
            ],
            self.body,
        )
            .into_response()
    }
}

/// Raw file bytes sent as a download.
pub struct FileResponse {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl IntoResponse for FileResponse {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, self.content_type),
                (
                    header::CONTENT_DISPOSITION,
                    hms_core::files::attachment_disposition(&self.file_name),
                ),
            ],
            self.bytes,
        )
            .into_response()
    }
}
