//! Tests for configuration loading from files and the process environment.

use std::io::Write;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use agent_relay::config::{env, ConfigFile, Credential, RelayConfig};
use agent_relay::error::RelayError;
use agent_relay::types::ApprovalPolicy;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    /// Snapshot `keys` and clear them for the duration of the test.
    fn clear(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        for key in keys {
            std::env::remove_var(key);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_toml(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn toml_file_supplies_every_field() {
    let file = write_toml(
        r#"
endpoint = "https://acct.services.ai.azure.com/api/projects/demo"
api_key = "file-key"
model = "gpt-4.1-mini"
tool_server_url = "https://abc.ngrok-free.app/mcp"
tool_server_label = "slack-prod"
tool_token = "xoxb-file"
workspace = "acme"
agent_name = "OpsAssistant"
approval_policy = "always"
streaming = true
request_timeout_secs = 30
"#,
    );

    let parsed = ConfigFile::load(file.path()).unwrap();
    let config = RelayConfig::resolve(&parsed, |_| None).unwrap();

    assert_eq!(config.credential, Credential::ApiKey("file-key".into()));
    assert_eq!(config.model, "gpt-4.1-mini");
    assert_eq!(config.tool_server_label, "slack-prod");
    assert_eq!(config.tool_token.as_deref(), Some("xoxb-file"));
    assert_eq!(config.workspace, "acme");
    assert_eq!(config.agent_name, "OpsAssistant");
    assert_eq!(config.approval_policy, ApprovalPolicy::AlwaysAsk);
    assert!(config.streaming);
    assert_eq!(config.request_timeout, Duration::from_secs(30));
}

#[test]
fn malformed_toml_is_a_config_file_error() {
    let file = write_toml("endpoint = [unterminated");
    let err = ConfigFile::load(file.path()).unwrap_err();
    assert!(matches!(err, RelayError::ConfigFile(_)));
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConfigFile::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, RelayError::Io(_)));
}

#[test]
fn load_prefers_environment_over_file() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::clear(&env::ALL);
    let file = write_toml(
        r#"
endpoint = "https://file.services.ai.azure.com/api/projects/demo"
api_key = "file-key"
tool_server_url = "http://localhost:13080/mcp"
model = "file-model"
"#,
    );
    std::env::set_var(env::MODEL, "env-model");
    std::env::set_var(env::ACCESS_TOKEN, "env-token");

    let config = RelayConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.model, "env-model");
    assert_eq!(config.credential, Credential::BearerToken("env-token".into()));
    assert_eq!(
        config.endpoint,
        "https://file.services.ai.azure.com/api/projects/demo"
    );
}

#[test]
fn load_reports_all_missing_fields() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::clear(&env::ALL);
    let file = write_toml("model = \"gpt-4o\"\n");

    let err = RelayConfig::load(Some(file.path())).unwrap_err();

    assert_eq!(
        err.missing_fields(),
        vec!["endpoint", "credential", "tool_server_url"]
    );
    let message = err.to_string();
    assert!(message.contains("FOUNDRY_PROJECT_ENDPOINT"));
    assert!(message.contains("SLACK_MCP_SERVER_URL"));
}
