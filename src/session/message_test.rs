use super::*;
use serde_json::json;

fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap()
}

#[test]
fn result_accepts_rows_within_columns() {
    let result = QueryResult::new(
        "SELECT a, b FROM t;",
        vec!["a".into(), "b".into()],
        vec![row(json!({ "a": 1, "b": "x" })), row(json!({ "a": 2 }))],
    )
    .unwrap();
    assert_eq!(result.rows().len(), 2);
    assert!(result.chart_image().is_none());
}

#[test]
fn result_rejects_row_with_unknown_key() {
    let err = QueryResult::new("SELECT 1;", vec!["a".into()], vec![row(json!({ "a": 1 })), row(json!({ "z": 2 }))])
        .unwrap_err();
    assert!(matches!(&err, ApiError::Malformed(msg) if msg.contains("row 1") && msg.contains("'z'")));
}

#[test]
fn result_with_chart() {
    let result = QueryResult::new("SELECT 1;", vec![], vec![]).unwrap().with_chart(vec![0x89, b'P']);
    assert_eq!(result.chart_image(), Some(&[0x89, b'P'][..]));
}

#[test]
fn kinds_and_accessors() {
    let user = Message::user(MessageId(1), "top 5 customers");
    assert_eq!(user.kind(), MessageKind::User);
    assert_eq!(user.text(), Some("top 5 customers"));
    assert!(user.result().is_none());

    let err = Message::system_error(MessageId(2), "HTTP 500: boom");
    assert_eq!(err.kind(), MessageKind::SystemError);
    assert_eq!(err.text(), Some("HTTP 500: boom"));

    let result = QueryResult::new("SELECT 1;", vec!["id".into()], vec![]).unwrap();
    let msg = Message::system_result(MessageId(3), result);
    assert_eq!(msg.kind(), MessageKind::SystemResult);
    assert!(msg.text().is_none());
    assert_eq!(msg.result().map(QueryResult::sql), Some("SELECT 1;"));
}

#[test]
fn message_ids_order() {
    assert!(MessageId(1) < MessageId(2));
}
