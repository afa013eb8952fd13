//! Fetching artifacts from remote repositories into the local repository.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use mavenkit_core::{Coordinate, Error, RemoteRepository, Result};

use crate::layout::{LocalRepository, relative_path};

const USER_AGENT: &str = concat!("mavenkit/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Makes an artifact available as a local file.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Return the local path of `coordinate`, downloading it from the first
    /// repository that has it when it is not cached yet.
    ///
    /// [`Error::NotFound`] when no repository has it; [`Error::Network`]
    /// when at least one repository could not be asked.
    async fn fetch(&self, coordinate: &Coordinate, repositories: &[RemoteRepository]) -> Result<PathBuf>;
}

/// Outcome of asking one repository.
enum Transfer {
    Downloaded,
    Missing,
}

/// Fetches over HTTP(S) and from `file://` repositories.
#[derive(Debug, Clone)]
pub struct RepositoryConnector {
    local: LocalRepository,
    client: Client,
}

impl RepositoryConnector {
    /// Create a connector caching into `local`.
    pub fn new(local: LocalRepository) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::network_with_source("Failed to create HTTP client", e))?;
        Ok(Self { local, client })
    }

    /// The local repository files are cached in.
    #[must_use]
    pub const fn local_repository(&self) -> &LocalRepository {
        &self.local
    }

    async fn transfer(
        &self,
        repository: &RemoteRepository,
        coordinate: &Coordinate,
        dest: &Path,
    ) -> Result<Transfer> {
        let base = Url::parse(&repository.base_url()).map_err(|e| {
            Error::network_with_source(format!("Invalid URL for repository {repository}"), e)
        })?;
        let url = base.join(&relative_path(coordinate)).map_err(|e| {
            Error::network_with_source(format!("Invalid artifact URL in {repository}"), e)
        })?;

        match url.scheme() {
            "file" => copy_file(&url, dest).await,
            "http" | "https" => self.download(&url, dest).await,
            other => Err(Error::network(format!(
                "Unsupported scheme '{other}' for repository {repository}"
            ))),
        }
    }

    async fn download(&self, url: &Url, dest: &Path) -> Result<Transfer> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::network_with_source(format!("Failed to fetch {url}"), e))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Ok(Transfer::Missing),
            status => {
                return Err(Error::network(format!("Unexpected HTTP {status} fetching {url}")));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::network_with_source(format!("Failed to read {url}"), e))?;
        write_atomically(dest, &bytes).await?;
        Ok(Transfer::Downloaded)
    }
}

async fn copy_file(url: &Url, dest: &Path) -> Result<Transfer> {
    let source = url
        .to_file_path()
        .map_err(|()| Error::network(format!("Invalid file URL {url}")))?;
    if !source.is_file() {
        return Ok(Transfer::Missing);
    }
    let bytes = tokio::fs::read(&source)
        .await
        .map_err(|e| Error::io(e, Some(source.clone()), "reading repository file"))?;
    write_atomically(dest, &bytes).await?;
    Ok(Transfer::Downloaded)
}

/// Write to `<dest>.part`, then rename into place.
async fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(e, Some(parent.to_path_buf()), "creating local repository directory"))?;
    }
    let mut part = dest.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);
    tokio::fs::write(&part, bytes)
        .await
        .map_err(|e| Error::io(e, Some(part.clone()), "writing artifact"))?;
    if let Err(e) = tokio::fs::rename(&part, dest).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(Error::io(e, Some(dest.to_path_buf()), "moving artifact into place"));
    }
    Ok(())
}

#[async_trait]
impl ArtifactFetcher for RepositoryConnector {
    async fn fetch(&self, coordinate: &Coordinate, repositories: &[RemoteRepository]) -> Result<PathBuf> {
        if let Some(path) = self.local.find(coordinate)? {
            return Ok(path);
        }

        debug!(%coordinate, "Resolving");
        let dest = self.local.path_for(coordinate)?;
        let mut failures = Vec::new();

        for repository in repositories {
            debug!(%coordinate, repository = %repository.id, "Downloading");
            match self.transfer(repository, coordinate, &dest).await {
                Ok(Transfer::Downloaded) => {
                    debug!(%coordinate, repository = %repository.id, "Downloaded");
                    debug!(%coordinate, path = %dest.display(), "Resolved");
                    return Ok(dest);
                }
                Ok(Transfer::Missing) => {}
                Err(e) => {
                    warn!(%coordinate, repository = %repository.id, error = %e, "Transfer failed");
                    failures.push(format!("{}: {e}", repository.id));
                }
            }
        }

        let searched = repositories
            .iter()
            .map(|r| r.id.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        if failures.is_empty() {
            Err(Error::not_found(format!(
                "{coordinate} not found in [{searched}]"
            )))
        } else {
            Err(Error::network(format!(
                "Could not transfer {coordinate}: {}",
                failures.join("; ")
            )))
        }
    }
}
