use axum::extract::Multipart;
use axum::http::HeaderMap;
use bytes::Bytes;

/// One uploaded file pulled out of a multipart body.
pub(super) struct UploadField {
    pub filename: String,
    pub data: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub(super) enum UploadError {
    #[error("no file uploaded in field '{0}'")]
    MissingField(&'static str),
    #[error("failed to read multipart body: {0}")]
    Read(String),
}

/// Finds the form field the endpoint expects, skipping any others. The two
/// serving modes deliberately use different field names (`file` direct,
/// `audio` queued), matching the clients each one serves.
pub(super) async fn read_named_field(
    multipart: &mut Multipart,
    name: &'static str,
) -> Result<UploadField, UploadError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Read(e.to_string()))?
    {
        if field.name() != Some(name) {
            continue;
        }

        let filename = field.file_name().unwrap_or("unknown").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| UploadError::Read(e.to_string()))?;

        return Ok(UploadField { filename, data });
    }

    Err(UploadError::MissingField(name))
}

/// Client network origin for completion alerts, when a proxy forwarded it.
pub(super) fn client_origin(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
