use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for the isilon-papi client
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the isilon-papi client
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport error (connect, TLS, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The appliance answered with a non-2xx status
    #[error("API error ({}): {}", .0.status(), .0.message())]
    Api(ApiError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The appliance runs a Platform API release this client cannot talk to
    #[error("unsupported Platform API version {major}.{minor}: OneFS releases older than 8.0 are no longer supported")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// Invalid response
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// HTTP status of an [`Error::Api`], if this is one.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Error::Api(err) => Some(err.status()),
            _ => None,
        }
    }

    /// True for a 404 from the appliance or a local lookup miss.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Api(err) => err.status() == StatusCode::NOT_FOUND,
            _ => false,
        }
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Api(err)
    }
}

/// A single entry of the appliance's error payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

/// Decoded non-2xx response: the HTTP status plus the `errors` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    errors: Vec<ApiErrorDetail>,
}

impl ApiError {
    pub fn new(status: StatusCode, errors: Vec<ApiErrorDetail>) -> Self {
        Self { status, errors }
    }

    /// Builds the error from a raw response body.
    ///
    /// A body that is not an error list, or whose first entry carries no
    /// message, is reported with the HTTP status text (`404 Not Found`).
    pub fn from_body(status: StatusCode, body: &[u8]) -> Self {
        let mut errors = serde_json::from_slice::<ApiErrorBody>(body)
            .map(|b| b.errors)
            .unwrap_or_default();

        match errors.first_mut() {
            Some(first) if first.message.is_empty() => first.message = status.to_string(),
            Some(_) => {}
            None => errors.push(ApiErrorDetail {
                message: status.to_string(),
                ..Default::default()
            }),
        }

        Self { status, errors }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Message of the first error entry.
    pub fn message(&self) -> &str {
        self.errors
            .first()
            .map(|e| e.message.as_str())
            .unwrap_or_default()
    }

    pub fn errors(&self) -> &[ApiErrorDetail] {
        &self.errors
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ApiError {}
