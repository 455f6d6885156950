//! Runtime configuration.
//!
//! Everything the server and the agent gateway need is passed in explicitly;
//! nothing reads the process environment after startup.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_AGENT_URL: &str = "http://localhost:3001";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BODY_LIMIT: usize = 1 << 20;

/// Where and how to reach the external agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub base_url: String,
    /// Sent as a bearer token when present.
    pub auth_token: Option<String>,
    /// Budget for single-stage calls (improve, chat, edit-section).
    pub timeout: Duration,
    /// Budget for the cross-stage global chat, which carries the full context.
    pub global_chat_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AGENT_URL.to_string(),
            auth_token: None,
            timeout: Duration::from_secs(30),
            global_chat_timeout: Duration::from_secs(60),
        }
    }
}

impl AgentConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_global_chat_timeout(mut self, timeout: Duration) -> Self {
        self.global_chat_timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Empty allows any origin.
    pub allowed_origins: Vec<String>,
    pub body_limit: usize,
    /// Upper bound on the background opening message after a stage is created.
    pub initial_content_timeout: Duration,
    pub agent: AgentConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            database_path: None,
            allowed_origins: Vec::new(),
            body_limit: DEFAULT_BODY_LIMIT,
            initial_content_timeout: Duration::from_secs(30),
            agent: AgentConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Splits a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
