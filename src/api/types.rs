//! Backend wire types and errors.
//!
//! Field names match the backend's JSON exactly. Everything here is
//! provider-neutral: the session only ever sees these types, never raw
//! HTTP responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fallback error text when a non-2xx response carries no `detail`.
pub const DEFAULT_EXECUTE_ERROR: &str = "Failed to execute query";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// A success body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// A success body parsed but violates the result contract.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The schema endpoint answered 200 with an error text in place of a schema.
    #[error("{0}")]
    SchemaReported(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl crate::error::ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::Http { .. } => "E_HTTP",
            Self::Parse(_) => "E_PARSE",
            Self::Malformed(_) => "E_MALFORMED",
            Self::SchemaReported(_) => "E_SCHEMA_REPORTED",
            Self::ClientBuild(_) => "E_CLIENT_BUILD",
        }
    }
}

// =============================================================================
// EXECUTE
// =============================================================================

/// Body of `POST /api/execute`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecuteRequest {
    pub query: String,
}

/// Success body of `POST /api/execute`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecuteResponse {
    pub sql: String,
    pub columns: Vec<String>,
    pub data: Vec<serde_json::Map<String, Value>>,
    /// Base64-encoded PNG, present for chart requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curl_command: Option<String>,
}

/// Error body of any non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub detail: Option<Value>,
}

impl ErrorDetail {
    /// Extract the detail text from an error body, falling back to `fallback`.
    #[must_use]
    pub fn text_from_body(body: &str, fallback: &str) -> String {
        let detail = serde_json::from_str::<ErrorDetail>(body)
            .ok()
            .and_then(|e| e.detail);
        match detail {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::Null) | None => fallback.to_string(),
            Some(other) => other.to_string(),
        }
    }
}

// =============================================================================
// SCHEMA
// =============================================================================

/// Canonical schema representation, independent of the response shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Table name → backend-supplied description (columns, types, ...).
    pub tables: BTreeMap<String, Value>,
    /// Free-text schema description from the legacy `schema` shape.
    pub description: Option<String>,
}

impl Schema {
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

/// Normalize a `GET /api/schema` success body.
///
/// Canonical shape is `{ "database_schema": { "tables": {...} } }`. The
/// legacy `{ "schema": "<text>" }` shape is accepted; a text starting with
/// `Error` means the backend could not read its own schema.
///
/// # Errors
///
/// Returns `ApiError::SchemaReported` for an error-prefixed legacy text and
/// `ApiError::Parse` for anything that matches neither shape.
pub fn parse_schema_response(body: &str) -> Result<Schema, ApiError> {
    let value: Value = serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;

    if let Some(tables) = value
        .get("database_schema")
        .and_then(|s| s.get("tables"))
        .and_then(Value::as_object)
    {
        let tables = tables.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        return Ok(Schema { tables, description: None });
    }

    if let Some(text) = value.get("schema").and_then(Value::as_str) {
        if text.trim_start().starts_with("Error") {
            return Err(ApiError::SchemaReported(text.to_string()));
        }
        return Ok(Schema { tables: BTreeMap::new(), description: Some(text.to_string()) });
    }

    Err(ApiError::Parse("expected `database_schema.tables` or `schema` in schema response".into()))
}

/// Success body of `GET /api/tables`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TablesResponse {
    pub table_list: Vec<String>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
