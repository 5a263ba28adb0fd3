//! Configuration file handling for the `webterm` binary.
//!
//! The file is TOML with three optional sections:
//!
//! ```toml
//! [terminal]
//! prompt = "$ "
//! job_ttl_secs = 300
//!
//! [terminal.builtins.upload]
//! enabled = false
//!
//! [server]
//! port = 9000
//! base_path = "/console"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use std::net::IpAddr;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use webterm_core::TerminalSettings;
use webterm_server::ServerSettings;

use crate::logging::{LogConfig, LogFormat};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub terminal: TerminalSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LogConfig,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<IpAddr>,
    pub port: Option<u16>,
    pub display_exceptions: bool,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

impl AppConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("invalid configuration file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.terminal.validate()?;
        if self.server.max_request_body_size == 0 {
            anyhow::bail!("server.max_request_body_size must be greater than zero");
        }
        Ok(())
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(bind) = overrides.bind {
            self.server.bind_address = bind;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if overrides.display_exceptions {
            self.terminal.display_exceptions = true;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
    }
}
