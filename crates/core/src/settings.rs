//! `[terminal]` configuration.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Per built-in overrides, keyed by command name under `[terminal.builtins]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinSettings {
    #[serde(default = "BuiltinSettings::default_flag")]
    pub enabled: bool,
    #[serde(default = "BuiltinSettings::default_flag", alias = "browsable")]
    pub visible_for_help: bool,
    #[serde(default = "BuiltinSettings::default_flag")]
    pub tab_completion: bool,
}

impl BuiltinSettings {
    const fn default_flag() -> bool {
        true
    }
}

impl Default for BuiltinSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            visible_for_help: true,
            tab_completion: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSettings {
    /// Render full error chains to the client instead of a generic message.
    #[serde(default)]
    pub display_exceptions: bool,
    #[serde(default = "TerminalSettings::default_prompt")]
    pub prompt: String,
    #[serde(default = "TerminalSettings::default_greeting")]
    pub greeting: Vec<String>,
    #[serde(default = "TerminalSettings::default_license")]
    pub license: String,
    /// Seconds a queued job stays resumable (0 disables expiry).
    #[serde(default = "TerminalSettings::default_job_ttl_secs", alias = "job_expiration_time")]
    pub job_ttl_secs: u64,
    #[serde(default = "TerminalSettings::default_job_purge_interval_secs")]
    pub job_purge_interval_secs: u64,
    /// Upper bound on queued jobs (0 = unbounded).
    #[serde(default)]
    pub max_jobs: usize,
    #[serde(default)]
    pub builtins: HashMap<String, BuiltinSettings>,
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            display_exceptions: false,
            prompt: Self::default_prompt(),
            greeting: Self::default_greeting(),
            license: Self::default_license(),
            job_ttl_secs: Self::default_job_ttl_secs(),
            job_purge_interval_secs: Self::default_job_purge_interval_secs(),
            max_jobs: 0,
            builtins: HashMap::new(),
        }
    }
}

impl TerminalSettings {
    fn default_prompt() -> String {
        "> ".to_string()
    }

    fn default_greeting() -> Vec<String> {
        vec![
            "Welcome to webterm.".to_string(),
            "Type 'help' to list the available commands.".to_string(),
        ]
    }

    fn default_license() -> String {
        "webterm is distributed under the MIT License.".to_string()
    }

    const fn default_job_ttl_secs() -> u64 {
        900
    }

    const fn default_job_purge_interval_secs() -> u64 {
        60
    }

    #[must_use]
    pub fn job_ttl(&self) -> Option<Duration> {
        (self.job_ttl_secs > 0).then(|| Duration::from_secs(self.job_ttl_secs))
    }

    #[must_use]
    pub fn job_purge_interval(&self) -> Duration {
        Duration::from_secs(self.job_purge_interval_secs.max(1))
    }

    #[must_use]
    pub fn max_jobs(&self) -> Option<usize> {
        (self.max_jobs > 0).then_some(self.max_jobs)
    }

    /// Overrides for the built-in `name`, defaults when none are configured.
    pub fn builtin(&self, name: &str) -> BuiltinSettings {
        self.builtins.get(name).copied().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.prompt.contains('\n') {
            return Err(SettingsError::InvalidValue {
                field: "prompt",
                reason: "must be a single line".to_string(),
            });
        }
        if self.job_ttl_secs > 0 && self.job_purge_interval_secs == 0 {
            return Err(SettingsError::InvalidValue {
                field: "job_purge_interval_secs",
                reason: "must be positive while job expiry is enabled".to_string(),
            });
        }
        Ok(())
    }
}
