use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::graph::GraphCredentials;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// TigerGraph connection settings.
/// Credentials are never stored in the file, only the names of the
/// environment variables holding them.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_graph_host")]
    pub host: String,
    #[serde(default = "default_restpp_port")]
    pub restpp_port: u16,
    #[serde(default = "default_gsql_port")]
    pub gsql_port: u16,
    #[serde(default = "default_graph_name")]
    pub graph_name: String,
    #[serde(default = "default_username_env")]
    pub username_env: String,
    #[serde(default = "default_password_env")]
    pub password_env: String,
    /// Optional env var holding a REST++ bearer token
    #[serde(default)]
    pub token_env: Option<String>,
    #[serde(default = "default_graph_timeout")]
    pub timeout_secs: u64,
}

/// Azure OpenAI settings
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_deployment")]
    pub deployment: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

/// Conversation agent settings
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Ceiling on model round-trips per chat turn
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Resolve display names to person ids before id-based tools run
    #[serde(default = "default_true")]
    pub resolve_names: bool,
    #[serde(default = "default_person_id_pattern")]
    pub person_id_pattern: String,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_chat_timeout")]
    pub chat_timeout_secs: u64,
}

fn default_graph_host() -> String {
    "http://localhost".to_string()
}

fn default_restpp_port() -> u16 {
    9000
}

fn default_gsql_port() -> u16 {
    14240
}

fn default_graph_name() -> String {
    "SocialNetwork".to_string()
}

fn default_username_env() -> String {
    "TIGERGRAPH_USERNAME".to_string()
}

fn default_password_env() -> String {
    "TIGERGRAPH_PASSWORD".to_string()
}

fn default_graph_timeout() -> u64 {
    30
}

fn default_deployment() -> String {
    "gpt-4".to_string()
}

fn default_api_version() -> String {
    "2024-02-15-preview".to_string()
}

fn default_llm_api_key_env() -> String {
    "AZURE_OPENAI_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_max_iterations() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_person_id_pattern() -> String {
    r"^person_\d+$".to_string()
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    5000
}

fn default_chat_timeout() -> u64 {
    120
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            host: default_graph_host(),
            restpp_port: default_restpp_port(),
            gsql_port: default_gsql_port(),
            graph_name: default_graph_name(),
            username_env: default_username_env(),
            password_env: default_password_env(),
            token_env: None,
            timeout_secs: default_graph_timeout(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            deployment: default_deployment(),
            api_version: default_api_version(),
            api_key_env: default_llm_api_key_env(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            resolve_names: default_true(),
            person_id_pattern: default_person_id_pattern(),
        }
    }
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            allowed_origins: Vec::new(),
            chat_timeout_secs: default_chat_timeout(),
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// Loads environment variables from .env file (if present), then reads the
    /// config file from `GRAPHCHAT_CONFIG` or `./config.toml`. A missing
    /// `./config.toml` falls back to built-in defaults; a missing file named by
    /// `GRAPHCHAT_CONFIG` is an error. Environment overrides are applied last.
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let mut config = match std::env::var("GRAPHCHAT_CONFIG") {
            Ok(path) => {
                let path = PathBuf::from(path);
                let config_str = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                Self::from_toml_str(&config_str)?
            }
            Err(_) => {
                let path = PathBuf::from("config.toml");
                if path.exists() {
                    let config_str = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                    Self::from_toml_str(&config_str)?
                } else {
                    log::debug!("No config.toml found, using built-in defaults");
                    Self::default()
                }
            }
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML text (no env overrides, no validation)
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        toml::from_str(config_str).context("Failed to parse config.toml")
    }

    /// Apply the environment variables the deployment scripts set
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("TIGERGRAPH_HOST") {
            self.graph.host = host;
        }
        if let Ok(graph_name) = std::env::var("TIGERGRAPH_GRAPH_NAME") {
            self.graph.graph_name = graph_name;
        }
        if let Ok(endpoint) = std::env::var("AZURE_OPENAI_ENDPOINT") {
            self.llm.endpoint = Some(endpoint);
        }
        if let Ok(deployment) = std::env::var("AZURE_OPENAI_DEPLOYMENT") {
            self.llm.deployment = deployment;
        }
        if let Ok(port) = std::env::var("GRAPHCHAT_PORT") {
            match port.parse() {
                Ok(port) => self.http_server.port = port,
                Err(_) => log::warn!("Ignoring invalid GRAPHCHAT_PORT value: {}", port),
            }
        }
    }

    /// Validate configuration values and the presence of required secrets
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.llm.endpoint.as_deref().map_or(true, |e| e.trim().is_empty()) {
            missing.push("AZURE_OPENAI_ENDPOINT".to_string());
        }
        for var in [
            &self.llm.api_key_env,
            &self.graph.username_env,
            &self.graph.password_env,
        ] {
            if std::env::var(var).map_or(true, |v| v.is_empty()) {
                missing.push(var.clone());
            }
        }
        if !missing.is_empty() {
            anyhow::bail!(
                "Missing required settings: {}. Set them in your .env file or as environment variables.",
                missing.join(", ")
            );
        }

        url::Url::parse(&self.graph.host)
            .with_context(|| format!("graph.host is not a valid URL: {}", self.graph.host))?;
        if let Some(endpoint) = &self.llm.endpoint {
            url::Url::parse(endpoint)
                .with_context(|| format!("llm.endpoint is not a valid URL: {}", endpoint))?;
        }

        if self.graph.graph_name.trim().is_empty() {
            anyhow::bail!("graph.graph_name must not be empty");
        }

        if self.agent.max_iterations == 0 {
            anyhow::bail!("agent.max_iterations must be greater than 0");
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            anyhow::bail!("llm.temperature must be between 0.0 and 2.0");
        }

        if self.graph.timeout_secs == 0
            || self.llm.timeout_secs == 0
            || self.http_server.chat_timeout_secs == 0
        {
            anyhow::bail!("timeouts must be greater than 0 seconds");
        }

        regex::Regex::new(&self.agent.person_id_pattern).with_context(|| {
            format!(
                "agent.person_id_pattern is not a valid regex: {}",
                self.agent.person_id_pattern
            )
        })?;

        Ok(())
    }

    /// Read graph credentials from the environment
    pub fn graph_credentials(&self) -> Result<GraphCredentials> {
        let username = std::env::var(&self.graph.username_env)
            .with_context(|| format!("Environment variable {} not set", self.graph.username_env))?;
        let password = std::env::var(&self.graph.password_env)
            .with_context(|| format!("Environment variable {} not set", self.graph.password_env))?;
        let token = self
            .graph
            .token_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|t| !t.is_empty());

        Ok(GraphCredentials {
            username,
            password,
            token,
        })
    }

    /// Read the model API key from the environment
    pub fn llm_api_key(&self) -> Result<String> {
        std::env::var(&self.llm.api_key_env).with_context(|| {
            format!(
                "Environment variable {} not set. Set it in your .env file or as an environment variable with your Azure OpenAI key.",
                self.llm.api_key_env
            )
        })
    }

    /// Model endpoint (validated to be present by `validate`)
    pub fn llm_endpoint(&self) -> Result<&str> {
        self.llm
            .endpoint
            .as_deref()
            .context("llm.endpoint is not configured")
    }
}
