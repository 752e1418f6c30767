//! sqlchat — client-side session for a natural-language-to-SQL backend.
//!
//! DESIGN
//! ======
//! The `QuerySession` owns the conversation transcript and the single
//! in-flight request. It talks to the backend through the `QueryBackend`
//! trait (`HttpBackend` in production, mocks in tests) and reports every
//! state change to subscribed observers, so renderers never reach into
//! session internals.

pub mod api;
pub mod config;
pub mod csv;
pub mod download;
pub mod error;
pub mod log;
pub mod render;
pub mod session;

pub use api::{HttpBackend, QueryBackend};
pub use config::ClientConfig;
pub use error::{ErrorCode, SessionError, ValidationError};
pub use session::QuerySession;
