//! Structured event log collaborator.
//!
//! The session never prints. It reports request/response pairs and state
//! transitions as `(event, fields)` to an injected `EventLog`; the default
//! `TracingLog` forwards them to `tracing`.

use std::fmt::Write;

/// One structured field: name and rendered value.
pub type Field<'a> = (&'a str, String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Warn,
}

pub trait EventLog: Send + Sync {
    fn log(&self, severity: Severity, event: &str, fields: &[Field<'_>]);
}

/// Forwards session events to `tracing` under the `sqlchat` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl EventLog for TracingLog {
    fn log(&self, severity: Severity, event: &str, fields: &[Field<'_>]) {
        let fields = render_fields(fields);
        match severity {
            Severity::Debug => tracing::debug!(target: "sqlchat", event, %fields),
            Severity::Info => tracing::info!(target: "sqlchat", event, %fields),
            Severity::Warn => tracing::warn!(target: "sqlchat", event, %fields),
        }
    }
}

/// Render fields as `key=value` pairs. Values containing whitespace or
/// quotes are debug-quoted.
#[must_use]
pub fn render_fields(fields: &[Field<'_>]) -> String {
    let mut out = String::new();
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        if value.is_empty() || value.contains(|c: char| c.is_whitespace() || c == '"' || c == '=') {
            let _ = write!(out, "{key}={value:?}");
        } else {
            let _ = write!(out, "{key}={value}");
        }
    }
    out
}

#[cfg(test)]
#[path = "log_test.rs"]
mod tests;
