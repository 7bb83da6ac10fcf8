use thiserror::Error;

/// Failure of a single Kubernetes API call or client construction
///
/// Permission failures (401/403) and missing objects (404) get their own
/// variants so callers can tell "not allowed here" apart from a broken
/// cluster.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("api error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("failed to create client for context {context}: {message}")]
    Client { context: String, message: String },

    #[error("transport error: {0}")]
    Transport(#[source] kube::Error),
}

impl ApiError {
    /// Forbidden or unauthorized
    pub fn is_permission(&self) -> bool {
        matches!(self, Self::Forbidden(_) | Self::Unauthorized(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<kube::Error> for ApiError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) => match resp.code {
                401 => Self::Unauthorized(resp.message),
                403 => Self::Forbidden(resp.message),
                404 => Self::NotFound(resp.message),
                code => Self::Api {
                    code,
                    message: resp.message,
                },
            },
            other => Self::Transport(other),
        }
    }
}

/// Result of a list call, with permission failures split out from real errors
#[derive(Debug)]
pub enum ListOutcome<T> {
    Ok(T),
    Forbidden,
    Failed(ApiError),
}

impl<T> From<Result<T, ApiError>> for ListOutcome<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(items) => Self::Ok(items),
            Err(e) if e.is_permission() => Self::Forbidden,
            Err(e) => Self::Failed(e),
        }
    }
}
