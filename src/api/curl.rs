//! Render execute requests as copy-pasteable `curl` commands.

/// Path of the execute endpoint, relative to the backend base URL.
pub const EXECUTE_PATH: &str = "/api/execute";

/// Build the `curl` invocation equivalent to `POST /api/execute` with `query`.
///
/// The body is serialized as JSON and then single-quoted for a POSIX shell,
/// so any query text pastes back into a terminal unchanged.
#[must_use]
pub fn execute_command(base_url: &str, query: &str) -> String {
    let url = format!("{}{EXECUTE_PATH}", base_url.trim_end_matches('/'));
    let body = serde_json::json!({ "query": query }).to_string();
    format!(
        "curl -X POST {url} \\\n  -H \"Content-Type: application/json\" \\\n  -d {}",
        shell_quote(&body)
    )
}

/// Wrap `text` in single quotes; an embedded `'` becomes `'\''`.
fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

#[cfg(test)]
#[path = "curl_test.rs"]
mod tests;
