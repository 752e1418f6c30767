//! Transcript messages.

use serde_json::Value;
use time::OffsetDateTime;

use crate::api::ApiError;

/// One result row: column name → value. Keys are always a subset of the
/// owning result's columns.
pub type Row = serde_json::Map<String, Value>;

/// Session-unique, monotonically increasing message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    User,
    SystemResult,
    SystemError,
}

// =============================================================================
// QUERY RESULT
// =============================================================================

/// Tabular payload of a `SystemResult` message.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    sql: String,
    columns: Vec<String>,
    rows: Vec<Row>,
    chart_image: Option<Vec<u8>>,
}

impl QueryResult {
    /// Build a result, rejecting rows that carry keys outside `columns`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Malformed` naming the first offending row and key.
    pub fn new(sql: impl Into<String>, columns: Vec<String>, rows: Vec<Row>) -> Result<Self, ApiError> {
        for (index, row) in rows.iter().enumerate() {
            if let Some(key) = row.keys().find(|k| !columns.contains(k)) {
                return Err(ApiError::Malformed(format!("row {index} has column '{key}' not listed in columns")));
            }
        }
        Ok(Self { sql: sql.into(), columns, rows, chart_image: None })
    }

    #[must_use]
    pub fn with_chart(mut self, image: Vec<u8>) -> Self {
        self.chart_image = Some(image);
        self
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn chart_image(&self) -> Option<&[u8]> {
        self.chart_image.as_deref()
    }
}

// =============================================================================
// MESSAGE
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    User { text: String },
    Result(QueryResult),
    Error { text: String },
}

/// A single transcript entry. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub created_at: OffsetDateTime,
    pub body: MessageBody,
}

impl Message {
    #[must_use]
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self::new(id, MessageBody::User { text: text.into() })
    }

    #[must_use]
    pub fn system_result(id: MessageId, result: QueryResult) -> Self {
        Self::new(id, MessageBody::Result(result))
    }

    #[must_use]
    pub fn system_error(id: MessageId, text: impl Into<String>) -> Self {
        Self::new(id, MessageBody::Error { text: text.into() })
    }

    fn new(id: MessageId, body: MessageBody) -> Self {
        Self { id, created_at: OffsetDateTime::now_utc(), body }
    }

    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self.body {
            MessageBody::User { .. } => MessageKind::User,
            MessageBody::Result(_) => MessageKind::SystemResult,
            MessageBody::Error { .. } => MessageKind::SystemError,
        }
    }

    /// Text of user and error messages.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            MessageBody::User { text } | MessageBody::Error { text } => Some(text),
            MessageBody::Result(_) => None,
        }
    }

    #[must_use]
    pub fn result(&self) -> Option<&QueryResult> {
        match &self.body {
            MessageBody::Result(r) => Some(r),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
