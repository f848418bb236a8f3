//! Configuration loading.
//!
//! Credentials, the claim threshold and the dedup file location come from
//! the environment (optionally seeded from `.env` by `main`). Tuning knobs
//! that have sensible defaults live in an optional TOML file.

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::types::ClaimError;

pub const ENV_USERNAME: &str = "TEXTBROKER_AUTHOR_USERNAME";
pub const ENV_PASSWORD: &str = "TEXTBROKER_AUTHOR_PASSWORD";
pub const ENV_MINIMUM: &str = "MINIMUM_EUROS_ORDER";
pub const ENV_USER_AGENT: &str = "USER_AGENT";
pub const ENV_DEDUP_FILE: &str = "ALREADY_READ_ORDERS_FILE";
pub const ENV_TUNING_FILE: &str = "CLAIMBOT_CONFIG";

const DEFAULT_TUNING_FILE: &str = "claimbot.toml";

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub author_username: String,
    pub author_password: SecretString,
    /// Orders must pay strictly more than this to be claimed.
    pub minimum_amount_order: Decimal,
    pub user_agent: String,
    pub dedup_file_path: PathBuf,
    pub tuning: TuningConfig,
}

/// Optional settings, read from `claimbot.toml` when present.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TuningConfig {
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlatformConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://intern.textbroker.fr".into()
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollerConfig {
    /// Pause between two listing requests that produced nothing to claim.
    #[serde(default = "default_poll_delay_ms")]
    pub poll_delay_ms: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_delay_ms: default_poll_delay_ms(),
        }
    }
}

fn default_poll_delay_ms() -> u64 {
    350
}

impl PollerConfig {
    pub fn poll_delay(&self) -> Duration {
        Duration::from_millis(self.poll_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    #[default]
    Bell,
    Command,
    Silent,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NotifierConfig {
    #[serde(default)]
    pub kind: NotifierKind,
    /// argv of the audio player, e.g. `["aplay", "tone.wav"]`.
    #[serde(default)]
    pub command: Vec<String>,
}

impl AppConfig {
    /// Load from the process environment plus the optional tuning file.
    pub fn load() -> Result<Self, ClaimError> {
        let tuning_path = std::env::var(ENV_TUNING_FILE)
            .unwrap_or_else(|_| DEFAULT_TUNING_FILE.to_string());
        let tuning = TuningConfig::load(Path::new(&tuning_path))?;
        Self::from_lookup(|key| std::env::var(key).ok(), tuning)
    }

    /// Build from an arbitrary key lookup. `load` passes the environment;
    /// tests pass a map.
    pub fn from_lookup<F>(lookup: F, tuning: TuningConfig) -> Result<Self, ClaimError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| -> Result<String, ClaimError> {
            match lookup(key) {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(ClaimError::Config(format!("{key} is not set"))),
            }
        };

        let author_username = require(ENV_USERNAME)?;
        let author_password = SecretString::new(require(ENV_PASSWORD)?);
        let minimum_raw = require(ENV_MINIMUM)?;
        let minimum_amount_order = Decimal::from_str(minimum_raw.trim()).map_err(|e| {
            ClaimError::Config(format!("{ENV_MINIMUM}={minimum_raw:?} is not a number: {e}"))
        })?;
        if minimum_amount_order <= Decimal::ZERO {
            return Err(ClaimError::Config(format!(
                "{ENV_MINIMUM} must be greater than zero, got {minimum_amount_order}"
            )));
        }
        let user_agent = require(ENV_USER_AGENT)?;
        let dedup_file_path = PathBuf::from(require(ENV_DEDUP_FILE)?);

        if tuning.notifier.kind == NotifierKind::Command && tuning.notifier.command.is_empty() {
            return Err(ClaimError::Config(
                "notifier.kind = \"command\" requires a non-empty notifier.command".into(),
            ));
        }

        Ok(Self {
            author_username,
            author_password,
            minimum_amount_order,
            user_agent,
            dedup_file_path,
            tuning,
        })
    }
}

impl TuningConfig {
    /// Read the tuning file. A missing file means all defaults.
    pub fn load(path: &Path) -> Result<Self, ClaimError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClaimError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&contents).map_err(|e| {
            ClaimError::Config(format!("Failed to parse {}: {e}", path.display()))
        })
    }
}
