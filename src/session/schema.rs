//! Schema gate state.

use crate::api::Schema;

/// One-directional: `Loading` → `Ready` | `Unavailable`, never back.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SchemaState {
    #[default]
    Loading,
    Ready(Schema),
    Unavailable(String),
}

impl SchemaState {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    #[must_use]
    pub fn schema(&self) -> Option<&Schema> {
        match self {
            Self::Ready(schema) => Some(schema),
            _ => None,
        }
    }

    /// Short human-readable description of why submission may be blocked.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Loading => "schema is still loading".to_string(),
            Self::Ready(_) => "schema is ready".to_string(),
            Self::Unavailable(reason) => reason.clone(),
        }
    }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
