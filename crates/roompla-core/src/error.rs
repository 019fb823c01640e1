// ── Core error types ──
//
// Errors surfaced by session flows. Gateway failures pass through
// untouched in `Api`; the core adds only what it detects itself.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    /// The session switched credentials while `operation` was in flight.
    /// Its result was discarded.
    #[error("Session changed while {operation} was in flight; result discarded")]
    StaleSession { operation: &'static str },

    // ── Validation errors ────────────────────────────────────────────
    #[error("Invalid time range: {message}")]
    InvalidTimeRange { message: String },

    // ── API errors ───────────────────────────────────────────────────
    #[error(transparent)]
    Api(roompla_api::Error),
}

impl CoreError {
    /// HTTP status of the underlying API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

// ── Conversion from gateway errors ───────────────────────────────────

impl From<roompla_api::Error> for CoreError {
    fn from(err: roompla_api::Error) -> Self {
        match err {
            roompla_api::Error::InvalidTimeRange { message } => {
                CoreError::InvalidTimeRange { message }
            }
            other => CoreError::Api(other),
        }
    }
}
