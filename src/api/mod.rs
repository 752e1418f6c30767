//! Backend contract — the opaque chat-to-SQL service.
//!
//! DESIGN
//! ======
//! `QueryBackend` is the only seam between the session and the network.
//! `HttpBackend` speaks the JSON-over-HTTP contract; tests substitute
//! in-memory mocks.

pub mod curl;
pub mod http;
pub mod types;

pub use http::HttpBackend;
pub use types::{ApiError, ExecuteResponse, Schema};

/// Provider-neutral async trait for the backend. Enables mocking in tests.
#[async_trait::async_trait]
pub trait QueryBackend: Send + Sync {
    /// Fetch and normalize the database schema (`GET /api/schema`).
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or a
    /// body that reports or fails to describe a schema.
    async fn fetch_schema(&self) -> Result<Schema, ApiError>;

    /// List available tables (`GET /api/tables`).
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or an
    /// unparseable body.
    async fn fetch_tables(&self) -> Result<Vec<String>, ApiError>;

    /// Submit a natural-language query (`POST /api/execute`).
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status (with the
    /// backend's `detail` text), or an unparseable body.
    async fn execute(&self, query: &str) -> Result<ExecuteResponse, ApiError>;

    /// Equivalent `curl` command for an execute request, for request logs.
    fn curl_for(&self, query: &str) -> Option<String> {
        let _ = query;
        None
    }
}
