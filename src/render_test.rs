use super::*;
use crate::session::message::{MessageId, Row};
use serde_json::json;

fn result(columns: &[&str], rows: Vec<Value>) -> QueryResult {
    QueryResult::new(
        "SELECT id, name FROM customers;",
        columns.iter().map(|c| (*c).to_string()).collect(),
        rows.into_iter().map(|r| r.as_object().cloned().unwrap()).collect::<Vec<Row>>(),
    )
    .unwrap()
}

#[test]
fn table_aligns_columns() {
    let r = result(&["id", "name"], vec![json!({ "id": 1, "name": "Ann" }), json!({ "id": 22, "name": null })]);
    assert_eq!(table(&r), "id | name\n---+-----\n1  | Ann\n22 |");
}

#[test]
fn table_empty_rows() {
    assert_eq!(table(&result(&["id"], vec![])), "No results found");
}

#[test]
fn long_cells_are_truncated() {
    let long = "x".repeat(100);
    let r = result(&["v"], vec![json!({ "v": long })]);
    let rendered = table(&r);
    let last = rendered.lines().last().unwrap();
    assert_eq!(last.chars().count(), MAX_CELL_WIDTH);
    assert!(last.ends_with('…'));
}

#[test]
fn message_variants() {
    assert_eq!(message(&Message::user(MessageId(1), "top 5")), "> top 5");
    assert_eq!(message(&Message::system_error(MessageId(2), "HTTP 500: boom")), "error: HTTP 500: boom");

    let r = result(&["id"], vec![json!({ "id": 1 })]).with_chart(vec![0; 16]);
    let text = message(&Message::system_result(MessageId(3), r));
    assert!(text.starts_with("SQL: SELECT id, name FROM customers;\n"));
    assert!(text.ends_with("[chart: 16 bytes]"));
}
