//! CSV export of query results.
//!
//! DESIGN
//! ======
//! Every cell (header cells included) goes through one rule: the value is
//! turned into a plain string, then JSON-string encoded. That wraps it in
//! double quotes and escapes quotes, backslashes and control characters,
//! so commas and newlines inside a value never break the row.

use serde_json::Value;

use crate::session::message::{Message, QueryResult};

pub const DEFAULT_CSV_FILENAME: &str = "query_results.csv";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// Only `SystemResult` messages carry a table.
    #[error("message is not a query result")]
    NotAResult,

    /// The transcript holds no query result yet.
    #[error("no query result to export")]
    NoResult,
}

impl crate::error::ErrorCode for ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotAResult => "E_NOT_A_RESULT",
            Self::NoResult => "E_NO_RESULT",
        }
    }
}

/// A CSV artifact ready to hand to a `Downloader`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Export a result message as CSV.
///
/// # Errors
///
/// Returns `ExportError::NotAResult` for user and error messages.
pub fn export_message(message: &Message, filename: Option<&str>) -> Result<CsvExport, ExportError> {
    let result = message.result().ok_or(ExportError::NotAResult)?;
    Ok(CsvExport { filename: normalize_filename(filename), bytes: render(result).into_bytes() })
}

/// Render a result table as CSV text: header line, then one line per row.
#[must_use]
pub fn render(result: &QueryResult) -> String {
    let mut lines = Vec::with_capacity(result.rows().len() + 1);
    lines.push(
        result
            .columns()
            .iter()
            .map(|c| quote(c))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in result.rows() {
        let line = result
            .columns()
            .iter()
            .map(|c| cell(row.get(c)))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }
    lines.join("\n")
}

/// Encode one cell value. Missing and null values encode as `""`.
#[must_use]
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => quote(""),
        Some(Value::String(s)) => quote(s),
        Some(other) => quote(&other.to_string()),
    }
}

fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// Apply the default filename, or enforce a `.csv` suffix on a caller's name.
#[must_use]
pub fn normalize_filename(filename: Option<&str>) -> String {
    let name = filename.map(str::trim).filter(|n| !n.is_empty());
    match name {
        None => DEFAULT_CSV_FILENAME.to_string(),
        Some(n) if n.to_ascii_lowercase().ends_with(".csv") => n.to_string(),
        Some(n) => format!("{n}.csv"),
    }
}

#[cfg(test)]
#[path = "csv_test.rs"]
mod tests;
