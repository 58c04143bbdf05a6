//! Minimal `multipart/form-data` encoder for the evaluate upload.
//!
//! `ureq` 2 sends raw bodies only, so the form is assembled here: text fields
//! and file fields, each framed by a boundary line, closed by the terminating
//! boundary.

use chrono::Utc;

const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    /// Start a form with a time-derived boundary.
    pub fn new() -> Self {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        Self::with_boundary(format!("----dqai-form-{nanos:x}"))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Append a plain text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part();
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"",
                escape_quoted(name)
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(CRLF);
        self.body.extend_from_slice(CRLF);
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(CRLF);
        self
    }

    /// Append a file field carrying its original file name.
    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.open_part();
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                escape_quoted(name),
                escape_quoted(filename)
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(CRLF);
        self.body
            .extend_from_slice(format!("Content-Type: {content_type}").as_bytes());
        self.body.extend_from_slice(CRLF);
        self.body.extend_from_slice(CRLF);
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(CRLF);
        self
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Close the form and return `(content_type, body)`.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        let content_type = self.content_type();
        self.body
            .extend_from_slice(format!("--{}--", self.boundary).as_bytes());
        self.body.extend_from_slice(CRLF);
        (content_type, self.body)
    }

    fn open_part(&mut self) {
        self.body
            .extend_from_slice(format!("--{}", self.boundary).as_bytes());
        self.body.extend_from_slice(CRLF);
    }
}

/// Header parameter values may not contain raw quotes or line breaks.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
