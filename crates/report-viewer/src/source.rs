use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use shared::models::MonthKey;
use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const MONTHS_FILE: &str = "months.json";
const LATEST_REPORT_FILE: &str = "report.json";

/// Static snapshot published next to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceName {
    Months,
    LatestReport,
    MonthReport(MonthKey),
}

impl ResourceName {
    pub fn file_name(&self) -> String {
        match self {
            ResourceName::Months => MONTHS_FILE.to_string(),
            ResourceName::LatestReport => LATEST_REPORT_FILE.to_string(),
            ResourceName::MonthReport(month) => month.report_file_name(),
        }
    }

    /// Inverse of [`ResourceName::file_name`].
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name {
            MONTHS_FILE => Some(ResourceName::Months),
            LATEST_REPORT_FILE => Some(ResourceName::LatestReport),
            _ => name
                .strip_prefix("report_")
                .and_then(|rest| rest.strip_suffix(".json"))
                .and_then(|month| month.parse().ok())
                .map(ResourceName::MonthReport),
        }
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{0} not found")]
    NotFound(ResourceName),
    #[error("failed to fetch {resource}: {message}")]
    Fetch {
        resource: ResourceName,
        message: String,
    },
    #[error("invalid {resource}: {source}")]
    Parse {
        resource: ResourceName,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only origin of the report snapshots.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn fetch(&self, resource: ResourceName) -> Result<Vec<u8>, SourceError>;
}

pub struct HttpReportSource {
    client: Client,
    base_url: Url,
}

impl HttpReportSource {
    pub fn new(mut base_url: Url) -> Result<Self, reqwest::Error> {
        // Url::join drops the last segment unless the base ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl ReportSource for HttpReportSource {
    async fn fetch(&self, resource: ResourceName) -> Result<Vec<u8>, SourceError> {
        let fetch_error = |message: String| SourceError::Fetch { resource, message };

        let url = self
            .base_url
            .join(&resource.file_name())
            .map_err(|e| fetch_error(e.to_string()))?;
        debug!("Fetching {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(SourceError::NotFound(resource)),
            status if !status.is_success() => Err(fetch_error(format!("HTTP {status}"))),
            _ => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| fetch_error(e.to_string()))?;
                Ok(body.to_vec())
            }
        }
    }
}

pub struct DirReportSource {
    root: PathBuf,
}

impl DirReportSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ReportSource for DirReportSource {
    async fn fetch(&self, resource: ResourceName) -> Result<Vec<u8>, SourceError> {
        let path = self.root.join(resource.file_name());
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(SourceError::NotFound(resource)),
            Err(e) => Err(SourceError::Fetch {
                resource,
                message: format!("{}: {e}", path.display()),
            }),
        }
    }
}

/// In-memory snapshots keyed by resource, for tests and local previews.
#[derive(Debug, Clone, Default)]
pub struct MockReportSource {
    resources: HashMap<ResourceName, Vec<u8>>,
}

impl MockReportSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resource: ResourceName, body: impl Into<Vec<u8>>) -> Self {
        self.resources.insert(resource, body.into());
        self
    }
}

#[async_trait]
impl ReportSource for MockReportSource {
    async fn fetch(&self, resource: ResourceName) -> Result<Vec<u8>, SourceError> {
        self.resources
            .get(&resource)
            .cloned()
            .ok_or(SourceError::NotFound(resource))
    }
}
