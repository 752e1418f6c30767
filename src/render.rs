//! Plain-text renderer for terminals.
//!
//! A thin consumer of the session's observer contract: it formats events
//! and never touches session state.

use std::fmt::Write;

use serde_json::Value;

use crate::session::events::{BannerSource, SessionEvent, SessionObserver};
use crate::session::message::{Message, MessageBody, QueryResult};
use crate::session::schema::SchemaState;

/// Cells longer than this are truncated in table output.
const MAX_CELL_WIDTH: usize = 40;

/// Format one transcript message for display.
#[must_use]
pub fn message(msg: &Message) -> String {
    match &msg.body {
        MessageBody::User { text } => format!("> {text}"),
        MessageBody::Error { text } => format!("error: {text}"),
        MessageBody::Result(result) => {
            let mut out = format!("SQL: {}\n", result.sql());
            out.push_str(&table(result));
            if let Some(chart) = result.chart_image() {
                let _ = write!(out, "\n[chart: {} bytes]", chart.len());
            }
            out
        }
    }
}

/// Render a result as an aligned text table, or `No results found`.
#[must_use]
pub fn table(result: &QueryResult) -> String {
    if result.rows().is_empty() {
        return "No results found".to_string();
    }

    let cells: Vec<Vec<String>> = result
        .rows()
        .iter()
        .map(|row| result.columns().iter().map(|c| display_cell(row.get(c))).collect())
        .collect();
    let widths: Vec<usize> = result
        .columns()
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(cells.len() + 2);
    lines.push(join_padded(result.columns(), &widths));
    lines.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
    for row in &cells {
        lines.push(join_padded(row, &widths));
    }
    lines.join("\n")
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(c, &w)| format!("{c:<w$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

fn display_cell(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.replace('\n', " "),
        Some(other) => other.to_string(),
    };
    if text.chars().count() > MAX_CELL_WIDTH {
        let cut: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
        format!("{cut}…")
    } else {
        text
    }
}

/// Prints session events to stdout (results) and stderr (status).
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    /// Echo user messages; off when the user just typed them.
    pub echo_user: bool,
}

impl SessionObserver for ConsoleRenderer {
    fn on_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::SchemaChanged(SchemaState::Ready(schema)) => {
                eprintln!("schema ready: {} tables", schema.tables.len());
            }
            SessionEvent::SchemaChanged(_) | SessionEvent::PendingChanged(false) => {}
            SessionEvent::PendingChanged(true) => eprintln!("running..."),
            SessionEvent::MessageAppended(m) => match &m.body {
                MessageBody::User { .. } if !self.echo_user => {}
                _ => println!("{}\n", message(m)),
            },
            SessionEvent::Banner(banner) => {
                let source = match banner.source {
                    BannerSource::Schema => "schema",
                    BannerSource::Query => "query",
                };
                eprintln!("[{source}] {}", banner.text);
            }
        }
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
