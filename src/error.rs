//! Session error taxonomy.
//!
//! Errors returned from session operations are local rejections: nothing
//! was appended to the transcript and no request was issued. Backend
//! failures are not errors at this level; they become `SystemError`
//! transcript entries (see `session`).

use crate::csv::ExportError;

/// Stable machine-readable codes for surfacing errors to renderers.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

// =============================================================================
// VALIDATION
// =============================================================================

/// A submission or lifecycle call rejected before any side effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The query text is empty after trimming.
    #[error("query text is empty")]
    EmptyQuery,

    /// Another query is still awaiting its response.
    #[error("a query is already in flight: {pending}")]
    RequestInFlight { pending: String },

    /// `initialize` was already called on this session.
    #[error("session already initialized")]
    AlreadyInitialized,
}

impl ErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "E_EMPTY_QUERY",
            Self::RequestInFlight { .. } => "E_REQUEST_IN_FLIGHT",
            Self::AlreadyInitialized => "E_ALREADY_INITIALIZED",
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The session requires a ready schema and it is not available.
    #[error("schema unavailable: {0}")]
    SchemaUnavailable(String),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.error_code(),
            Self::SchemaUnavailable(_) => "E_SCHEMA_UNAVAILABLE",
            Self::Export(e) => e.error_code(),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
