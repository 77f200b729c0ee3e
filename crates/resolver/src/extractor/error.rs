use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("tls error: {0}")]
    TlsError(#[from] rustls::Error),
    #[error("upstream error {code}: {message}")]
    UpstreamError { code: i64, message: String },
    #[error("part {index} out of range, video has {parts} part(s)")]
    PartIndexOutOfRange { index: usize, parts: usize },
    #[error("no stream available")]
    NoStreamAvailable,
    #[error("timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
    #[error("validation error: {0}")]
    ValidationError(String),
}

impl ResolverError {
    pub fn upstream(code: i64, message: impl Into<String>) -> Self {
        Self::UpstreamError {
            code,
            message: message.into(),
        }
    }
}
