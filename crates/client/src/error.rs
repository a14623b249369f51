/// Errors from the remote box API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The requested resource does not exist.
    #[error("Resource does not exist")]
    NotFound,

    /// The caller lacks permission for the requested resource or action.
    #[error("Insufficient permission")]
    InsufficientPermission,

    /// Any other structured error reported by the server.
    #[error("Server reported {code}: {message}")]
    Application {
        /// Error code or result type name, e.g. `"UnauthorizedForBaseError"`.
        code: String,
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Network or HTTP-level failure, as opposed to a structured answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Http { .. })
    }
}
