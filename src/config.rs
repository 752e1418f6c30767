//! Client configuration parsed from environment variables.

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
}

impl crate::error::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E_CONFIG_PARSE",
        }
    }
}

/// Whether a query may be submitted before the schema is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaPolicy {
    /// Submit regardless of schema state; a schema failure is only a banner.
    #[default]
    Permissive,
    /// Reject submissions until the schema is ready.
    RequireReady,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub schema_policy: SchemaPolicy,
    /// Decode backend-supplied chart images into results.
    pub charts: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            schema_policy: SchemaPolicy::Permissive,
            charts: true,
        }
    }
}

impl ClientConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `SQLCHAT_BASE_URL`: default `http://localhost:5000`
    /// - `SQLCHAT_CONNECT_TIMEOUT_SECS`: default 10
    /// - `SQLCHAT_SCHEMA_POLICY`: `permissive` (default) or `require_ready`
    /// - `SQLCHAT_CHARTS`: `true` (default) or `false`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for values that are present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("SQLCHAT_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let connect_timeout_secs = match std::env::var("SQLCHAT_CONNECT_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::Parse(format!("invalid SQLCHAT_CONNECT_TIMEOUT_SECS: {raw}")))?,
            Err(_) => DEFAULT_CONNECT_TIMEOUT_SECS,
        };
        let schema_policy = parse_schema_policy(std::env::var("SQLCHAT_SCHEMA_POLICY").ok().as_deref())?;
        let charts = parse_bool("SQLCHAT_CHARTS", std::env::var("SQLCHAT_CHARTS").ok().as_deref(), true)?;

        Ok(Self { base_url, connect_timeout_secs, schema_policy, charts })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Parse a schema policy name.
///
/// # Errors
///
/// Returns `ConfigError::Parse` for unknown names.
pub fn parse_schema_policy(raw: Option<&str>) -> Result<SchemaPolicy, ConfigError> {
    match raw.unwrap_or("permissive") {
        "permissive" => Ok(SchemaPolicy::Permissive),
        "require_ready" => Ok(SchemaPolicy::RequireReady),
        other => Err(ConfigError::Parse(format!(
            "unsupported schema policy '{other}' (expected 'permissive' or 'require_ready')"
        ))),
    }
}

fn parse_bool(key: &str, raw: Option<&str>, default: bool) -> Result<bool, ConfigError> {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(ConfigError::Parse(format!("invalid {key}: {other}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
