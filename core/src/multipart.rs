//! `multipart/form-data` encoding for the edit upload (RFC 7578).
//!
//! The body is assembled by hand so the core stays free of HTTP client
//! crates; transports only forward the bytes and the content type.

use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::types::EditJob;

/// Name of the part carrying the input media.
pub const MEDIA_PART: &str = "Media";
/// Name of the part carrying the JSON edit job.
pub const EDITS_PART: &str = "Edits";

struct Part {
    name: String,
    filename: Option<String>,
    content_type: String,
    data: Vec<u8>,
}

/// An ordered set of form parts.
pub struct MultipartForm {
    boundary: String,
    parts: Vec<Part>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: new_boundary(),
            parts: Vec::new(),
        }
    }

    /// Add a plain field.
    pub fn part(mut self, name: &str, content_type: &str, data: Vec<u8>) -> Self {
        self.parts.push(Part {
            name: name.to_string(),
            filename: None,
            content_type: content_type.to_string(),
            data,
        });
        self
    }

    /// Add a field that servers treat as an uploaded file.
    pub fn file_part(mut self, name: &str, filename: &str, content_type: &str, data: Vec<u8>) -> Self {
        self.parts.push(Part {
            name: name.to_string(),
            filename: Some(filename.to_string()),
            content_type: content_type.to_string(),
            data,
        });
        self
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `content-type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Serialize all parts in insertion order.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        while self.parts.iter().any(|part| contains(&part.data, self.boundary.as_bytes())) {
            self.boundary = new_boundary();
        }

        let mut body = Vec::with_capacity(self.parts.iter().map(|p| p.data.len() + 128).sum());
        for part in &self.parts {
            body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            let disposition = match &part.filename {
                Some(filename) => format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.name, filename
                ),
                None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
            body.extend_from_slice(&part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());

        (self.content_type(), body)
    }
}

/// Encode an edit upload: the media under `Media`, tagged with `media_type`,
/// and the job as `{"edits": [...]}` under `Edits`.
///
/// `media_type` is forwarded as-is; a malformed value surfaces as a remote
/// error, not a local one.
pub fn encode_edit(media: &[u8], media_type: &str, job: &EditJob) -> Result<(String, Vec<u8>)> {
    let edits = serde_json::to_vec(job).map_err(ApiError::Encode)?;
    Ok(MultipartForm::new()
        .file_part(MEDIA_PART, MEDIA_PART, media_type, media.to_vec())
        .part(EDITS_PART, "application/json", edits)
        .finish())
}

fn new_boundary() -> String {
    format!("shitposts-{}", Uuid::new_v4().simple())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
