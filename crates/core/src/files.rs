//! Object key and file name rules for uploaded attachments.

use crate::types::DbId;

/// Longest sanitized file name kept in an object key.
pub const MAX_FILE_NAME_LEN: usize = 100;

/// Content type accepted for chemical safety datasheets.
pub const DATASHEET_CONTENT_TYPE: &str = "application/pdf";

/// Replace every character outside `[A-Za-z0-9._-]` with `_` and truncate.
///
/// Leading dots are stripped so a name can never become `..` or a hidden
/// file. An empty result becomes `"file"`.
pub fn sanitize_file_name(raw: &str) -> String {
    // Browsers may send a full client path.
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    let truncated: String = trimmed.chars().take(MAX_FILE_NAME_LEN).collect();

    if truncated.is_empty() {
        "file".to_string()
    } else {
        truncated
    }
}

/// Key for a task attachment: `bedrift/{bedrift}/oppgaver/{oppgave}/{unique}-{name}`.
pub fn task_file_key(bedrift_id: DbId, oppgave_id: DbId, unique: &str, file_name: &str) -> String {
    format!(
        "bedrift/{bedrift_id}/oppgaver/{oppgave_id}/{unique}-{}",
        sanitize_file_name(file_name)
    )
}

/// Key for a chemical datasheet: `bedrift/{bedrift}/stoffkartotek/{id}/{unique}-{name}`.
pub fn datasheet_key(bedrift_id: DbId, stoff_id: DbId, unique: &str, file_name: &str) -> String {
    format!(
        "bedrift/{bedrift_id}/stoffkartotek/{stoff_id}/{unique}-{}",
        sanitize_file_name(file_name)
    )
}

/// Value for a `Content-Disposition: attachment` header.
pub fn attachment_disposition(file_name: &str) -> String {
    format!("attachment; filename=\"{}\"", sanitize_file_name(file_name))
}
