//! Latest-version lookup against a remote repository.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::cmp::Ordering;
use std::time::Duration;
use tracing::debug;

use mavenkit_core::repository::CENTRAL_URL;
use mavenkit_core::{Error, MavenKitConfig, Result, version};

use crate::parse::{ArtifactMetadata, parse_metadata};

const USER_AGENT: &str = concat!("mavenkit/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A version compared against the newest published one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompareResult {
    /// Newest published version.
    pub latest_version: String,
    /// How the given version orders against `latest_version`.
    #[serde(serialize_with = "serialize_ordering")]
    pub ordering: Ordering,
}

impl CompareResult {
    /// `-1`, `0` or `1`.
    #[must_use]
    pub const fn signum(&self) -> i32 {
        self.ordering as i32
    }

    /// Whether the given version is older than the newest one.
    #[must_use]
    pub fn is_outdated(&self) -> bool {
        self.ordering == Ordering::Less
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_ordering<S: serde::Serializer>(ordering: &Ordering, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_i32(*ordering as i32)
}

/// Looks up published versions in `maven-metadata.xml`.
#[derive(Debug, Clone)]
pub struct ArtifactLookup {
    base_url: String,
    client: Client,
}

impl ArtifactLookup {
    /// Lookup against Maven Central.
    pub fn central() -> Result<Self> {
        Self::new(CENTRAL_URL)
    }

    /// Lookup against the configured metadata base URL.
    pub fn from_config(config: &MavenKitConfig) -> Result<Self> {
        Self::new(&config.metadata_base_url)
    }

    /// Lookup against `base_url`; a trailing `/` is added when missing.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::network_with_source("Failed to create HTTP client", e))?;
        Ok(Self::with_client(base_url, client))
    }

    /// Lookup sharing an existing client.
    #[must_use]
    pub fn with_client(base_url: &str, client: Client) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Self { base_url, client }
    }

    /// Base URL, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the metadata document for `group_id:artifact_id`.
    #[must_use]
    pub fn metadata_url(&self, group_id: &str, artifact_id: &str) -> String {
        format!(
            "{}{}/{}/maven-metadata.xml",
            self.base_url,
            group_id.replace('.', "/"),
            artifact_id
        )
    }

    /// Fetch and parse the metadata document.
    ///
    /// 404 means [`Error::NotFound`]; every other failure to obtain a
    /// parseable document is [`Error::Network`].
    pub async fn fetch_metadata(&self, group_id: &str, artifact_id: &str) -> Result<ArtifactMetadata> {
        let url = self.metadata_url(group_id, artifact_id);
        debug!(%url, "Fetching artifact metadata");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::network_with_source(format!("Failed to fetch {url}"), e))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(Error::not_found(format!(
                    "No metadata for {group_id}:{artifact_id} at {url}"
                )));
            }
            status => {
                return Err(Error::network(format!(
                    "Unexpected HTTP {status} fetching {url}"
                )));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network_with_source(format!("Failed to read {url}"), e))?;
        parse_metadata(&body)
    }

    /// The newest published version: `<release>`, else `<latest>`.
    pub async fn fetch_latest_version(&self, group_id: &str, artifact_id: &str) -> Result<String> {
        let metadata = self.fetch_metadata(group_id, artifact_id).await?;
        let newest = metadata.newest().map(str::to_string).ok_or_else(|| {
            Error::not_found(format!(
                "Metadata for {group_id}:{artifact_id} lists no release or latest version"
            ))
        })?;
        debug!(group_id, artifact_id, version = %newest, "Resolved latest version");
        Ok(newest)
    }

    /// [`Self::fetch_latest_version`] for `groupId:artifactId[:packaging[:classifier]]`.
    pub async fn fetch_latest_version_str(&self, coordinate: &str) -> Result<String> {
        let parts = split_coordinate(coordinate, 2..=4, "groupId:artifactId[:packaging[:classifier]]")?;
        self.fetch_latest_version(parts[0], parts[1]).await
    }

    /// Compare `version` with the newest published version.
    pub async fn compare_with_latest(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: &str,
    ) -> Result<CompareResult> {
        let latest_version = self.fetch_latest_version(group_id, artifact_id).await?;
        let ordering = version::compare(version, &latest_version);
        Ok(CompareResult {
            latest_version,
            ordering,
        })
    }

    /// [`Self::compare_with_latest`] for
    /// `groupId:artifactId:version[:packaging[:classifier]]`.
    pub async fn compare_with_latest_str(&self, coordinate: &str) -> Result<CompareResult> {
        let parts = split_coordinate(
            coordinate,
            3..=5,
            "groupId:artifactId:version[:packaging[:classifier]]",
        )?;
        self.compare_with_latest(parts[0], parts[1], parts[2]).await
    }
}

fn split_coordinate<'a>(
    coordinate: &'a str,
    allowed: std::ops::RangeInclusive<usize>,
    form: &str,
) -> Result<Vec<&'a str>> {
    let parts: Vec<&str> = coordinate.split(':').map(str::trim).collect();
    if !allowed.contains(&parts.len()) {
        return Err(Error::malformed_input(format!(
            "Expected {form}, got '{coordinate}' ({} parts)",
            parts.len()
        )));
    }
    if parts[..*allowed.start()].iter().any(|p| p.is_empty()) {
        return Err(Error::malformed_input(format!(
            "Expected {form}, got '{coordinate}' with an empty segment"
        )));
    }
    Ok(parts)
}
