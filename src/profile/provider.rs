//! Profile providers: where edit snapshots come from.
//!
//! The monitor does not care how a profile is obtained. A provider is picked
//! once at start-up and handed to the [`FetchWorker`](super::FetchWorker).

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::payload::{CountSource, ProfilePayload};
use crate::error::MonitorError;
use crate::monitor::{EditSnapshot, TrackedCategory};

/// Default profile page, with `{user}` replaced by the lower-cased user name.
pub const DEFAULT_PROFILE_URL: &str = "https://www.waze.com/user/editor/{user}";

/// How a provider's response body encodes the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileFormat {
    /// The body is the profile JSON.
    Json,
    /// The body is a profile page with the JSON embedded in a script.
    #[default]
    Markup,
}

impl ProfileFormat {
    /// Parse a body in this format.
    pub fn parse(&self, body: &str) -> Result<ProfilePayload, MonitorError> {
        match self {
            ProfileFormat::Json => ProfilePayload::from_json(body),
            ProfileFormat::Markup => ProfilePayload::from_markup(body),
        }
    }
}

/// Settings shared by all providers for turning a payload into a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotMapping {
    pub format: ProfileFormat,
    pub count_source: CountSource,
    pub categories: Vec<TrackedCategory>,
}

impl Default for SnapshotMapping {
    fn default() -> Self {
        Self {
            format: ProfileFormat::default(),
            count_source: CountSource::default(),
            categories: TrackedCategory::defaults(),
        }
    }
}

impl SnapshotMapping {
    /// Parse a raw body and map it to a snapshot.
    pub fn snapshot_from_body(&self, body: &str) -> Result<EditSnapshot, MonitorError> {
        self.format
            .parse(body)?
            .to_snapshot(&self.categories, self.count_source)
    }
}

/// Something that can produce the current edit snapshot for a user.
#[async_trait]
pub trait ProfileProvider: Send + Sync + Debug {
    /// Fetch the user's profile and map it to a snapshot.
    ///
    /// Any failure is reported as [`MonitorError::DataUnavailable`].
    async fn fetch(&self, user: &str) -> Result<EditSnapshot, MonitorError>;

    /// Human-readable description, shown in the status bar.
    fn description(&self) -> String;
}

/// Fetches the profile over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProfileProvider {
    client: Client,
    url_template: String,
    mapping: SnapshotMapping,
}

impl HttpProfileProvider {
    /// Create a new builder for configuring the provider.
    pub fn builder() -> HttpProfileProviderBuilder {
        HttpProfileProviderBuilder::default()
    }

    /// The URL fetched for `user`.
    pub fn url_for(&self, user: &str) -> String {
        self.url_template.replace("{user}", &user.to_lowercase())
    }
}

#[async_trait]
impl ProfileProvider for HttpProfileProvider {
    async fn fetch(&self, user: &str) -> Result<EditSnapshot, MonitorError> {
        let url = self.url_for(user);
        debug!("Fetching profile from {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(MonitorError::unavailable(format!(
                "profile request returned status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        self.mapping.snapshot_from_body(&body)
    }

    fn description(&self) -> String {
        format!("http: {}", self.url_template)
    }
}

/// Builder for [`HttpProfileProvider`].
#[derive(Debug, Default)]
pub struct HttpProfileProviderBuilder {
    url_template: Option<String>,
    timeout: Option<Duration>,
    mapping: SnapshotMapping,
}

impl HttpProfileProviderBuilder {
    /// URL template containing a `{user}` placeholder.
    pub fn url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = Some(template.into());
        self
    }

    /// Per-request timeout (default 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn mapping(mut self, mapping: SnapshotMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Build the provider.
    pub fn build(self) -> Result<HttpProfileProvider, MonitorError> {
        let url_template = self
            .url_template
            .unwrap_or_else(|| DEFAULT_PROFILE_URL.to_string());
        if !url_template.contains("{user}") {
            return Err(MonitorError::Config(format!(
                "profile URL template '{}' has no {{user}} placeholder",
                url_template
            )));
        }

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(10)))
            .user_agent(concat!("edit-count-monitor/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MonitorError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpProfileProvider {
            client,
            url_template,
            mapping: self.mapping,
        })
    }
}

/// Reads the profile from a local file, ignoring the user name.
///
/// Useful offline and for replaying captured profiles.
#[derive(Debug, Clone)]
pub struct FileProfileProvider {
    path: PathBuf,
    mapping: SnapshotMapping,
}

impl FileProfileProvider {
    pub fn new<P: AsRef<Path>>(path: P, mapping: SnapshotMapping) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            mapping,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ProfileProvider for FileProfileProvider {
    async fn fetch(&self, _user: &str) -> Result<EditSnapshot, MonitorError> {
        let body = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            MonitorError::unavailable(format!("read error on {}: {}", self.path.display(), e))
        })?;
        self.mapping.snapshot_from_body(&body)
    }

    fn description(&self) -> String {
        format!("file: {}", self.path.display())
    }
}
