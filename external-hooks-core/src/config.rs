// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use crate::error::{HooksError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub apply: ApplyConfig,
    #[serde(default)]
    pub load_policy: LoadPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server root, e.g. "http://localhost:7990"
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Context path the application is deployed under ("/" means none)
    #[serde(default)]
    pub context_path: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApplyConfig {
    /// Delay between two progress polls, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Polls before giving up (0 = poll until finished)
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Consecutive failed polls that end the run (0 = never give up)
    #[serde(default = "default_max_poll_failures")]
    pub max_poll_failures: u32,
}

/// How a load treats kinds that failed to fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Render nothing unless every kind loaded.
    #[default]
    AllOrNothing,
    /// Render the kinds that loaded, report the others.
    Partial,
}

impl FromStr for LoadPolicy {
    type Err = HooksError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "all_or_nothing" => Ok(LoadPolicy::AllOrNothing),
            "partial" => Ok(LoadPolicy::Partial),
            other => Err(HooksError::InvalidConfig(format!(
                "unknown load policy '{other}'"
            ))),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:7990".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    200
}

fn default_max_poll_attempts() -> u32 {
    3000
}

fn default_max_poll_failures() -> u32 {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            context_path: String::new(),
            request_timeout_secs: default_request_timeout(),
            username: None,
            password: None,
        }
    }
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
            max_poll_failures: default_max_poll_failures(),
        }
    }
}

impl ApplyConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_attempts(&self) -> Option<u32> {
        (self.max_poll_attempts > 0).then_some(self.max_poll_attempts)
    }

    pub fn max_failures(&self) -> Option<u32> {
        (self.max_poll_failures > 0).then_some(self.max_poll_failures)
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl PanelConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration: file (when given and present), then environment
    /// overrides, then defaults for anything unset.
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let config = match config_file {
            Some(path) if path.exists() => {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            }
            Some(path) => {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };

        config.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Override fields from `EXTERNAL_HOOKS_*` variables returned by `lookup`.
    pub fn merge_env_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("EXTERNAL_HOOKS_BASE_URL") {
            self.server.base_url = url;
        }

        if let Some(path) = lookup("EXTERNAL_HOOKS_CONTEXT_PATH") {
            self.server.context_path = path;
        }

        if let Some(timeout) = lookup("EXTERNAL_HOOKS_REQUEST_TIMEOUT") {
            self.server.request_timeout_secs =
                parse_number("EXTERNAL_HOOKS_REQUEST_TIMEOUT", &timeout)?;
        }

        if let Some(user) = lookup("EXTERNAL_HOOKS_USER") {
            self.server.username = Some(user);
        }

        if let Some(password) = lookup("EXTERNAL_HOOKS_PASSWORD") {
            self.server.password = Some(password);
        }

        if let Some(interval) = lookup("EXTERNAL_HOOKS_POLL_INTERVAL_MS") {
            self.apply.poll_interval_ms =
                parse_number("EXTERNAL_HOOKS_POLL_INTERVAL_MS", &interval)?;
        }

        if let Some(attempts) = lookup("EXTERNAL_HOOKS_MAX_POLL_ATTEMPTS") {
            self.apply.max_poll_attempts =
                parse_number("EXTERNAL_HOOKS_MAX_POLL_ATTEMPTS", &attempts)?;
        }

        if let Some(failures) = lookup("EXTERNAL_HOOKS_MAX_POLL_FAILURES") {
            self.apply.max_poll_failures =
                parse_number("EXTERNAL_HOOKS_MAX_POLL_FAILURES", &failures)?;
        }

        if let Some(policy) = lookup("EXTERNAL_HOOKS_LOAD_POLICY") {
            self.load_policy = policy.parse()?;
        }

        Ok(self)
    }

    /// Reject values that would make the panel unusable.
    pub fn validate(&self) -> Result<()> {
        if self.server.base_url.trim().is_empty() {
            return Err(HooksError::InvalidConfig("base_url must not be empty".into()));
        }
        if self.apply.poll_interval_ms == 0 {
            return Err(HooksError::InvalidConfig(
                "poll_interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| HooksError::InvalidConfig(format!("{name} is not a number: '{value}'")))
}
