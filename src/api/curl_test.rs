use super::*;

/// The JSON body as a shell would see it after unquoting `'...'` segments.
fn unquoted_body(cmd: &str) -> String {
    let arg = cmd.rsplit_once("-d ").unwrap().1;
    arg.replace(r"'\''", "'").trim_matches('\'').to_string()
}

#[test]
fn command_targets_execute_endpoint() {
    let cmd = execute_command("http://localhost:5000/", "top 5 customers");
    assert!(cmd.starts_with("curl -X POST http://localhost:5000/api/execute"));
    assert!(cmd.contains("-H \"Content-Type: application/json\""));
    assert!(cmd.ends_with(r#"-d '{"query":"top 5 customers"}'"#));
}

#[test]
fn command_escapes_double_quotes() {
    let cmd = execute_command("http://h", r#"customers named "Ann""#);
    assert!(cmd.ends_with(r#"-d '{"query":"customers named \"Ann\""}'"#));
}

#[test]
fn backslashes_keep_body_valid_json() {
    let query = r"names like 'a\b' and path C:\temp";
    let cmd = execute_command("http://h", query);
    let body: serde_json::Value = serde_json::from_str(&unquoted_body(&cmd)).unwrap();
    assert_eq!(body["query"], query);
}

#[test]
fn single_quotes_are_shell_escaped() {
    let cmd = execute_command("http://h", "customers named O'Brien");
    assert!(cmd.ends_with(r#"-d '{"query":"customers named O'\''Brien"}'"#));
    let body: serde_json::Value = serde_json::from_str(&unquoted_body(&cmd)).unwrap();
    assert_eq!(body["query"], "customers named O'Brien");
}

#[test]
fn command_is_multiline() {
    let cmd = execute_command("http://h", "q");
    assert_eq!(cmd.lines().count(), 3);
    assert_eq!(execute_command("http://h", "two\nlines").lines().count(), 3);
}
