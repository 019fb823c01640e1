use thiserror::Error;

/// Top-level error type for the `roompla-api` crate.
///
/// Every gateway call surfaces exactly one of these to its caller. Nothing
/// is retried, logged away or reinterpreted on the way out: a 401 is an
/// [`Error::Api`] like any other status, not an implicit logout.
#[derive(Debug, Error)]
pub enum Error {
    // ── Client-side validation ──────────────────────────────────────
    /// A required call parameter was absent. Raised before any I/O.
    #[error("Required parameter `{parameter}` was missing when calling {operation}")]
    RequiredParameter {
        parameter: &'static str,
        operation: &'static str,
    },

    /// The request could not be built from the client configuration
    /// (unbound path placeholder, unparseable URL, invalid header value).
    #[error("Invalid client configuration: {message}")]
    Configuration { message: String },

    /// A time range violated the hour-aligned `start < end` invariant.
    #[error("Invalid time range: {message}")]
    InvalidTimeRange { message: String },

    // ── Server ──────────────────────────────────────────────────────
    /// Non-2xx response. The body is kept verbatim and never decoded.
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    // ── Data ────────────────────────────────────────────────────────
    /// A success response did not match the expected wire shape,
    /// with the raw body for debugging.
    #[error("Decode error: {message}")]
    Decode { message: String, body: String },
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Configuration {
            message: format!("invalid request URL: {err}"),
        }
    }
}

impl Error {
    /// HTTP status of an [`Error::Api`] response, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the server rejected the bearer token.
    ///
    /// Callers decide what to do about it; the client never logs out on
    /// its own.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Returns `true` for errors detected before anything was sent.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            Self::RequiredParameter { .. } | Self::Configuration { .. } | Self::InvalidTimeRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_side_errors_carry_no_status() {
        let err = Error::RequiredParameter {
            parameter: "room",
            operation: "put_occupancy",
        };
        assert!(err.is_client_side());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn api_error_exposes_status() {
        let err = Error::Api {
            status: 401,
            body: "expired".into(),
        };
        assert!(!err.is_client_side());
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "API error (HTTP 401): expired");
    }
}
