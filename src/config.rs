//! Layered settings.
//!
//! Values are resolved in order, later layers winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config monitor.toml`)
//! 3. environment variables prefixed with `WECM_` (nested keys use `__`,
//!    e.g. `WECM_THRESHOLDS__CAUTION=3`)
//! 4. command line flags, applied by the binary
//!
//! ```toml
//! user = "MapOMatic"
//! poll_interval_ms = 1000
//!
//! [profile]
//! url = "https://www.waze.com/user/editor/{user}"
//! format = "markup"
//! count_source = "daily"
//!
//! [[profile.categories]]
//! key = "mapUpdateRequest"
//! label = "URs closed"
//!
//! [thresholds]
//! caution = 5
//! alert = 10
//!
//! [reminder]
//! remind_at = 100
//! warn_at = 150
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::monitor::{ReminderThresholds, Thresholds, TrackedCategory};
use crate::profile::{CountSource, ProfileFormat, SnapshotMapping, DEFAULT_PROFILE_URL};
use crate::source::DEFAULT_POLL_INTERVAL;

/// Environment variable prefix for settings.
pub const ENV_PREFIX: &str = "WECM";

/// Where and how to read the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    /// URL template with a `{user}` placeholder.
    pub url: String,
    pub format: ProfileFormat,
    pub count_source: CountSource,
    pub categories: Vec<TrackedCategory>,
    /// Read the profile from this file instead of over HTTP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_PROFILE_URL.to_string(),
            format: ProfileFormat::default(),
            count_source: CountSource::default(),
            categories: TrackedCategory::defaults(),
            file: None,
            timeout_secs: 10,
        }
    }
}

impl ProfileSettings {
    pub fn mapping(&self) -> SnapshotMapping {
        SnapshotMapping {
            format: self.format,
            count_source: self.count_source,
            categories: self.categories.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// All monitor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Editor whose profile is watched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub profile: ProfileSettings,
    pub thresholds: Thresholds,
    pub reminder: ReminderThresholds,
    /// Interval for the status-file poller.
    pub poll_interval_ms: u64,
    /// Where session summaries are appended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_log: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user: None,
            profile: ProfileSettings::default(),
            thresholds: Thresholds::default(),
            reminder: ReminderThresholds::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            session_log: None,
        }
    }
}

impl Settings {
    /// Load defaults, then the optional file, then `WECM_*` variables.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(file, ENV_PREFIX)
    }

    fn load_with_prefix(file: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load settings")?;

        let settings: Settings = config
            .try_deserialize()
            .context("Failed to deserialize settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.reminder.validate()?;
        if self.poll_interval_ms == 0 {
            anyhow::bail!("poll_interval_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
