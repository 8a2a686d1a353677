use reqwest::StatusCode;

/// Errors that may occur while configuring the client or sending a message
#[derive(thiserror::Error, Debug)]
pub enum GcmError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("401 Forbidden; Authentication Error")]
    Authentication,

    #[error("400 Bad Request; {0}")]
    BadRequest(String),

    #[error("{}", server_error_text(*kind, retry_after.as_deref()))]
    Server {
        kind: ServerErrorKind,
        /// Raw `Retry-After` header value, passed through unparsed.
        retry_after: Option<String>,
    },

    #[error("Response body did not contain a valid JSON response")]
    InvalidBody(#[source] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// The two server-side failure modes GCM reports
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ServerErrorKind {
    InternalServerError,
    ServiceUnavailable,
}

fn server_error_text(kind: ServerErrorKind, retry_after: Option<&str>) -> String {
    let mut text = match kind {
        ServerErrorKind::InternalServerError => "500 Internal Server Error".to_string(),
        ServerErrorKind::ServiceUnavailable => "503 Server Unavailable".to_string(),
    };

    if let Some(retry) = retry_after {
        text.push_str("; Retry After: ");
        text.push_str(retry);
    }

    text
}

impl GcmError {
    /// Get the associated HTTP status code, if the error was derived from one.
    ///
    /// The upstream service reported code 500 for the 503 branch as well;
    /// here `ServiceUnavailable` reports 503.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GcmError::Authentication => Some(StatusCode::UNAUTHORIZED),
            GcmError::BadRequest(_) => Some(StatusCode::BAD_REQUEST),
            GcmError::Server {
                kind: ServerErrorKind::InternalServerError,
                ..
            } => Some(StatusCode::INTERNAL_SERVER_ERROR),
            GcmError::Server {
                kind: ServerErrorKind::ServiceUnavailable,
                ..
            } => Some(StatusCode::SERVICE_UNAVAILABLE),
            GcmError::Http(e) => e.status(),
            GcmError::InvalidArgument(_) | GcmError::InvalidBody(_) => None,
        }
    }

    /// Get the raw `Retry-After` value attached to a server error, if the
    /// server sent one. Callers can use it to decide when to retry without
    /// string-parsing the error message.
    pub fn retry_after(&self) -> Option<&str> {
        match self {
            GcmError::Server { retry_after, .. } => retry_after.as_deref(),
            _ => None,
        }
    }
}
