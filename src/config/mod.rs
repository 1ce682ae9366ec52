//! Configuration resolution (layered: defaults < TOML file < environment).
//!
//! Resolution is a pure read. Every required field is checked before anything
//! touches the network, and all missing fields are reported together.

pub mod auth;

pub use auth::Credential;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{RelayError, Result};
use crate::types::ApprovalPolicy;

/// Environment variable names.
pub mod env {
    pub const ENDPOINT: &str = "FOUNDRY_PROJECT_ENDPOINT";
    pub const API_KEY: &str = "FOUNDRY_API_KEY";
    pub const ACCESS_TOKEN: &str = "FOUNDRY_ACCESS_TOKEN";
    pub const MODEL: &str = "FOUNDRY_MODEL_DEPLOYMENT_NAME";
    pub const TOOL_SERVER_URL: &str = "SLACK_MCP_SERVER_URL";
    pub const TOOL_SERVER_LABEL: &str = "MCP_SERVER_LABEL";
    pub const BOT_TOKEN: &str = "SLACK_BOT_TOKEN";
    pub const USER_TOKEN: &str = "SLACK_USER_TOKEN";
    pub const WORKSPACE: &str = "SLACK_WORKSPACE";
    pub const AGENT_NAME: &str = "FOUNDRY_AGENT_NAME";
    pub const APPROVAL: &str = "MCP_REQUIRE_APPROVAL";
    pub const STREAMING: &str = "FOUNDRY_STREAMING";
    pub const REQUEST_TIMEOUT: &str = "FOUNDRY_REQUEST_TIMEOUT_SECS";
    pub const API_VERSION: &str = "FOUNDRY_API_VERSION";
    pub const DEBUG: &str = "DEBUG";

    /// Every variable the resolver reads.
    pub const ALL: [&str; 15] = [
        ENDPOINT,
        API_KEY,
        ACCESS_TOKEN,
        MODEL,
        TOOL_SERVER_URL,
        TOOL_SERVER_LABEL,
        BOT_TOKEN,
        USER_TOKEN,
        WORKSPACE,
        AGENT_NAME,
        APPROVAL,
        STREAMING,
        REQUEST_TIMEOUT,
        API_VERSION,
        DEBUG,
    ];
}

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_AGENT_NAME: &str = "SlackAssistant";
pub const DEFAULT_SERVER_LABEL: &str = "slack";
pub const DEFAULT_WORKSPACE: &str = "default";
pub const DEFAULT_API_VERSION: &str = "2025-11-15-preview";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_DESCRIPTION: &str = "Slack workspace AI assistant with MCP integration";
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful Slack workspace assistant.

Use the available Slack MCP tools to help users query and interact with their workspace.

When responding:
1. Be clear and concise
2. Use markdown formatting for better readability
3. Cite specific messages or channels when relevant
4. Provide actionable information

Available actions:
- List channels
- Read message history
- Search for specific messages
- Get channel information
- Read thread replies
";

/// A required setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    Endpoint,
    Credential,
    ToolServerUrl,
}

impl ConfigField {
    /// Logical field name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Endpoint => "endpoint",
            Self::Credential => "credential",
            Self::ToolServerUrl => "tool_server_url",
        }
    }

    /// Where the field is read from.
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Endpoint => env::ENDPOINT,
            Self::Credential => "FOUNDRY_API_KEY or FOUNDRY_ACCESS_TOKEN",
            Self::ToolServerUrl => env::TOOL_SERVER_URL,
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Optional on-disk layer (`relay.toml`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub model: Option<String>,
    pub tool_server_url: Option<String>,
    pub tool_server_label: Option<String>,
    pub tool_token: Option<String>,
    pub workspace: Option<String>,
    pub agent_name: Option<String>,
    pub instructions: Option<String>,
    pub description: Option<String>,
    pub approval_policy: Option<ApprovalPolicy>,
    pub streaming: Option<bool>,
    pub request_timeout_secs: Option<u64>,
    pub api_version: Option<String>,
    pub debug: Option<bool>,
}

impl ConfigFile {
    /// Default location: `<config dir>/agent-relay/relay.toml`.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "agent-relay")
            .map(|dirs| dirs.config_dir().join("relay.toml"))
    }

    /// Load an explicit file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Load the default file if it exists.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// Where the tool server lives, for status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ToolServerLocation {
    Local,
    Tunnel,
    Remote,
}

/// Resolved, validated configuration. Read-only after startup.
#[derive(Clone)]
pub struct RelayConfig {
    pub endpoint: String,
    pub credential: Credential,
    pub model: String,
    pub tool_server_url: String,
    pub tool_server_label: String,
    pub tool_token: Option<String>,
    pub workspace: String,
    pub agent_name: String,
    pub instructions: String,
    pub description: String,
    pub approval_policy: ApprovalPolicy,
    pub streaming: bool,
    pub request_timeout: Duration,
    pub api_version: String,
    pub debug: bool,
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("endpoint", &self.endpoint)
            .field("credential", &self.credential)
            .field("model", &self.model)
            .field("tool_server_url", &self.tool_server_url)
            .field("tool_server_label", &self.tool_server_label)
            .field("tool_token", &self.tool_token.as_ref().map(|_| ".."))
            .field("workspace", &self.workspace)
            .field("agent_name", &self.agent_name)
            .field("approval_policy", &self.approval_policy)
            .field("streaming", &self.streaming)
            .field("request_timeout", &self.request_timeout)
            .field("api_version", &self.api_version)
            .field("debug", &self.debug)
            .finish()
    }
}

impl RelayConfig {
    /// Load `.env`, the default TOML file, and the process environment.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Like [`RelayConfig::from_env`], with an explicit TOML file.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let file = match config_path {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::load_default()?,
        };
        Self::resolve(&file, |key| std::env::var(key).ok())
    }

    /// Resolve from environment only, through an injected lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(&ConfigFile::default(), lookup)
    }

    /// Merge the file layer under the environment layer and validate.
    pub fn resolve<F>(file: &ConfigFile, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_blank(lookup(key));
        let pick = |key: &str, fallback: &Option<String>| get(key).or_else(|| non_blank(fallback.clone()));

        let endpoint = pick(env::ENDPOINT, &file.endpoint);
        let credential = get(env::API_KEY)
            .map(Credential::ApiKey)
            .or_else(|| get(env::ACCESS_TOKEN).map(Credential::BearerToken))
            .or_else(|| non_blank(file.api_key.clone()).map(Credential::ApiKey))
            .or_else(|| non_blank(file.access_token.clone()).map(Credential::BearerToken));
        let tool_server_url = pick(env::TOOL_SERVER_URL, &file.tool_server_url);

        let mut missing = Vec::new();
        if endpoint.is_none() {
            missing.push(ConfigField::Endpoint);
        }
        if credential.is_none() {
            missing.push(ConfigField::Credential);
        }
        if tool_server_url.is_none() {
            missing.push(ConfigField::ToolServerUrl);
        }
        let (Some(endpoint), Some(credential), Some(tool_server_url)) =
            (endpoint, credential, tool_server_url)
        else {
            return Err(RelayError::MissingConfig { fields: missing });
        };

        validate_url(ConfigField::Endpoint, &endpoint)?;
        validate_url(ConfigField::ToolServerUrl, &tool_server_url)?;

        let approval_policy = match get(env::APPROVAL) {
            Some(raw) => raw.to_ascii_lowercase().parse().map_err(|_| {
                RelayError::Configuration(format!(
                    "{} must be 'never' or 'always', got '{raw}'",
                    env::APPROVAL
                ))
            })?,
            None => file.approval_policy.unwrap_or_default(),
        };

        let streaming = match get(env::STREAMING) {
            Some(raw) => parse_flag(env::STREAMING, &raw)?,
            None => file.streaming.unwrap_or(false),
        };
        let debug = match get(env::DEBUG) {
            Some(raw) => parse_flag(env::DEBUG, &raw)?,
            None => file.debug.unwrap_or(false),
        };

        let request_timeout = match get(env::REQUEST_TIMEOUT) {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|_| {
                RelayError::Configuration(format!(
                    "{} must be a whole number of seconds, got '{raw}'",
                    env::REQUEST_TIMEOUT
                ))
            })?),
            None => file
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        };
        if request_timeout.is_zero() {
            return Err(RelayError::Configuration(
                "request timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credential,
            model: pick(env::MODEL, &file.model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            tool_server_url,
            tool_server_label: pick(env::TOOL_SERVER_LABEL, &file.tool_server_label)
                .unwrap_or_else(|| DEFAULT_SERVER_LABEL.to_string()),
            tool_token: get(env::BOT_TOKEN)
                .or_else(|| get(env::USER_TOKEN))
                .or_else(|| non_blank(file.tool_token.clone())),
            workspace: pick(env::WORKSPACE, &file.workspace)
                .unwrap_or_else(|| DEFAULT_WORKSPACE.to_string()),
            agent_name: pick(env::AGENT_NAME, &file.agent_name)
                .unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string()),
            instructions: non_blank(file.instructions.clone())
                .unwrap_or_else(|| DEFAULT_INSTRUCTIONS.to_string()),
            description: non_blank(file.description.clone())
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            approval_policy,
            streaming,
            request_timeout,
            api_version: pick(env::API_VERSION, &file.api_version)
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            debug,
        })
    }

    /// Classify the tool server URL as local, tunnelled, or remote.
    pub fn tool_server_location(&self) -> ToolServerLocation {
        let Ok(url) = url::Url::parse(&self.tool_server_url) else {
            return ToolServerLocation::Remote;
        };
        match url.host() {
            Some(url::Host::Domain(domain)) if domain.eq_ignore_ascii_case("localhost") => {
                ToolServerLocation::Local
            }
            Some(url::Host::Domain(domain)) if domain.contains("ngrok") => ToolServerLocation::Tunnel,
            Some(url::Host::Ipv4(ip)) if ip.is_loopback() => ToolServerLocation::Local,
            Some(url::Host::Ipv6(ip)) if ip.is_loopback() => ToolServerLocation::Local,
            _ => ToolServerLocation::Remote,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(RelayError::Configuration(format!(
            "{key} must be true or false, got '{raw}'"
        ))),
    }
}

fn validate_url(field: ConfigField, raw: &str) -> Result<()> {
    let url = url::Url::parse(raw).map_err(|e| {
        RelayError::Configuration(format!("{} is not a valid URL ({e}): {raw}", field.name()))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RelayError::Configuration(format!(
            "{} must use http or https: {raw}",
            field.name()
        )));
    }
    Ok(())
}
