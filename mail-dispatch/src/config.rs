use crate::error::{MailError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub smtp: TransportConfig,
    pub dispatch: DispatchConfig,
    pub logging: LoggingConfig,
}

/// Mail server coordinates and credentials, shared read-only by every send
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Deadline applied to each message send; none means wait forever
    pub timeout_secs: Option<u64>,
    /// Cap on in-flight sends during a batch; none means one task per message
    pub max_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MailError::Config(e.to_string()))?;

        toml::from_str(&content).map_err(|e| MailError::Config(e.to_string()))
    }

    /// Override SMTP settings from `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`
    /// and `SMTP_PASSWORD` when they are set
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SMTP_HOST") {
            self.smtp.host = host;
        }
        if let Ok(port) = std::env::var("SMTP_PORT") {
            self.smtp.port = port
                .parse()
                .map_err(|_| MailError::Config(format!("Invalid SMTP_PORT: {}", port)))?;
        }
        if let Ok(username) = std::env::var("SMTP_USERNAME") {
            self.smtp.username = username;
        }
        if let Ok(password) = std::env::var("SMTP_PASSWORD") {
            self.smtp.password = password;
        }
        Ok(())
    }
}

impl TransportConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Server address in `host:port` form
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 2525,
            username: String::new(),
            password: String::new(),
        }
    }
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl DispatchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
