use super::*;
use std::sync::Mutex;

/// Env vars are process-global; serialize tests that touch them.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// # Safety
/// Callers must hold `ENV_LOCK`.
unsafe fn clear_sqlchat_env() {
    unsafe {
        std::env::remove_var("SQLCHAT_BASE_URL");
        std::env::remove_var("SQLCHAT_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("SQLCHAT_SCHEMA_POLICY");
        std::env::remove_var("SQLCHAT_CHARTS");
    }
}

#[test]
fn from_env_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe { clear_sqlchat_env() };

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
    assert_eq!(cfg.schema_policy, SchemaPolicy::Permissive);
    assert!(cfg.charts);
}

#[test]
fn from_env_parses_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_sqlchat_env();
        std::env::set_var("SQLCHAT_BASE_URL", "https://sql.example.test/");
        std::env::set_var("SQLCHAT_CONNECT_TIMEOUT_SECS", "3");
        std::env::set_var("SQLCHAT_SCHEMA_POLICY", "require_ready");
        std::env::set_var("SQLCHAT_CHARTS", "off");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, "https://sql.example.test");
    assert_eq!(cfg.connect_timeout_secs, 3);
    assert_eq!(cfg.schema_policy, SchemaPolicy::RequireReady);
    assert!(!cfg.charts);

    unsafe { clear_sqlchat_env() };
}

#[test]
fn from_env_bad_timeout_errors() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_sqlchat_env();
        std::env::set_var("SQLCHAT_CONNECT_TIMEOUT_SECS", "soon");
    }

    let err = ClientConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("SQLCHAT_CONNECT_TIMEOUT_SECS"));

    unsafe { clear_sqlchat_env() };
}

#[test]
fn from_env_unknown_policy_errors() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        clear_sqlchat_env();
        std::env::set_var("SQLCHAT_SCHEMA_POLICY", "strict");
    }

    let err = ClientConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("unsupported schema policy"));

    unsafe { clear_sqlchat_env() };
}

#[test]
fn parse_schema_policy_default_is_permissive() {
    assert_eq!(parse_schema_policy(None).unwrap(), SchemaPolicy::Permissive);
}

#[test]
fn with_base_url_overrides() {
    let cfg = ClientConfig::default().with_base_url("http://other:8080");
    assert_eq!(cfg.base_url, "http://other:8080");
}
