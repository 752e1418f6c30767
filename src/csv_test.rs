use super::*;
use crate::error::ErrorCode;
use crate::session::message::{Message, MessageId, Row};
use serde_json::json;

fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap()
}

fn result_message(columns: &[&str], rows: Vec<Value>) -> Message {
    let result = QueryResult::new(
        "SELECT ...",
        columns.iter().map(|c| (*c).to_string()).collect(),
        rows.into_iter().map(row).collect(),
    )
    .unwrap();
    Message::system_result(MessageId(2), result)
}

fn text(export: &CsvExport) -> &str {
    std::str::from_utf8(&export.bytes).unwrap()
}

// =============================================================================
// export_message
// =============================================================================

#[test]
fn export_quotes_every_cell() {
    let msg = result_message(&["a", "b"], vec![json!({ "a": 1, "b": "x,y" })]);
    let export = export_message(&msg, None).unwrap();
    assert_eq!(text(&export), "\"a\",\"b\"\n\"1\",\"x,y\"");
    assert_eq!(export.filename, DEFAULT_CSV_FILENAME);
}

#[test]
fn export_missing_and_null_cells_are_empty() {
    let msg = result_message(&["a", "b", "c"], vec![json!({ "a": null, "c": true })]);
    let export = export_message(&msg, None).unwrap();
    assert_eq!(text(&export), "\"a\",\"b\",\"c\"\n\"\",\"\",\"true\"");
}

#[test]
fn export_escapes_quotes_and_newlines() {
    let msg = result_message(&["note"], vec![json!({ "note": "say \"hi\"\nback\\slash" })]);
    let export = export_message(&msg, None).unwrap();
    assert_eq!(text(&export), "\"note\"\n\"say \\\"hi\\\"\\nback\\\\slash\"");
    assert_eq!(text(&export).lines().count(), 2);
}

#[test]
fn export_orders_cells_by_columns() {
    let msg = result_message(&["b", "a"], vec![json!({ "a": 1, "b": 2 }), json!({ "a": 3, "b": 4.5 })]);
    let export = export_message(&msg, Some("sales")).unwrap();
    assert_eq!(text(&export), "\"b\",\"a\"\n\"2\",\"1\"\n\"4.5\",\"3\"");
    assert_eq!(export.filename, "sales.csv");
}

#[test]
fn export_empty_result_is_header_only() {
    let msg = result_message(&["id"], vec![]);
    assert_eq!(text(&export_message(&msg, None).unwrap()), "\"id\"");
}

#[test]
fn export_user_message_fails() {
    let msg = Message::user(MessageId(1), "top 5 customers");
    let err = export_message(&msg, None).unwrap_err();
    assert_eq!(err, ExportError::NotAResult);
    assert_eq!(err.error_code(), "E_NOT_A_RESULT");
}

#[test]
fn export_error_message_fails() {
    let msg = Message::system_error(MessageId(2), "HTTP 500: boom");
    assert_eq!(export_message(&msg, None), Err(ExportError::NotAResult));
}

// =============================================================================
// cell
// =============================================================================

#[test]
fn cell_nested_values_use_compact_json() {
    assert_eq!(cell(Some(&json!([1, 2]))), "\"[1,2]\"");
    assert_eq!(cell(Some(&json!({ "k": "v" }))), "\"{\\\"k\\\":\\\"v\\\"}\"");
}

// =============================================================================
// normalize_filename
// =============================================================================

#[test]
fn filename_default_and_suffix() {
    assert_eq!(normalize_filename(None), "query_results.csv");
    assert_eq!(normalize_filename(Some("  ")), "query_results.csv");
    assert_eq!(normalize_filename(Some("report")), "report.csv");
    assert_eq!(normalize_filename(Some("report.csv")), "report.csv");
    assert_eq!(normalize_filename(Some("REPORT.CSV")), "REPORT.CSV");
    assert_eq!(normalize_filename(Some("data.json")), "data.json.csv");
}
