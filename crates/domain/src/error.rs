/// Shared error type used across all Strata crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("validation: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("upstream {endpoint}: {message}")]
    Upstream { endpoint: String, message: String },

    #[error("storage: {0}")]
    Storage(String),

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Caller-facing error classes.
///
/// Every [`Error`] falls into exactly one of these.  The gateway maps
/// them onto HTTP status codes; the chat orchestrator absorbs
/// `UpstreamUnavailable` into a fallback reply instead of surfacing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    UpstreamUnavailable,
    Internal,
}

impl Error {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Http(_) | Error::Timeout(_) | Error::Upstream { .. } | Error::Auth(_) => {
                ErrorKind::UpstreamUnavailable
            }
            Error::Io(_)
            | Error::Json(_)
            | Error::Storage(_)
            | Error::Config(_)
            | Error::Other(_) => ErrorKind::Internal,
        }
    }
}
