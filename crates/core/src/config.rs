//! Configuration passed explicitly into resolvers, lookups and selectors.
//!
//! Values come from an optional `mavenkit.toml`:
//!
//! ```toml
//! probe_timeout_secs = 30
//! metadata_base_url = "https://repo1.maven.org/maven2/"
//! local_repository = "/var/cache/m2"
//!
//! [[repositories]]
//! id = "central"
//! url = "https://repo1.maven.org/maven2/"
//!
//! [fallback_repository]
//! id = "central"
//! url = "https://repo1.maven.org/maven2/"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::repository::{CENTRAL_URL, DEAD_CENTRAL_MIRROR, RemoteRepository};
use crate::{Error, Result};

/// Default file name looked up by the CLI.
pub const CONFIG_FILE_NAME: &str = "mavenkit.toml";

/// Default bound on a single executable interrogation.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 60;

/// Settings shared by every mavenkit component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MavenKitConfig {
    /// Repositories every resolver starts with, in search order.
    pub repositories: Vec<RemoteRepository>,
    /// Added to the search list when nothing equivalent is present.
    pub fallback_repository: RemoteRepository,
    /// Repository URLs that are dropped when declared by a project.
    pub dead_repository_urls: Vec<String>,
    /// Overrides the settings-derived local repository.
    pub local_repository: Option<PathBuf>,
    /// Upper bound on one executable interrogation, in seconds.
    pub probe_timeout_secs: u64,
    /// Base URL for `maven-metadata.xml` lookups.
    pub metadata_base_url: String,
}

impl Default for MavenKitConfig {
    fn default() -> Self {
        Self {
            repositories: vec![RemoteRepository::central()],
            fallback_repository: RemoteRepository::central(),
            dead_repository_urls: vec![DEAD_CENTRAL_MIRROR.to_string()],
            local_repository: None,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            metadata_base_url: CENTRAL_URL.to_string(),
        }
    }
}

impl MavenKitConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::config_build(format!("Invalid mavenkit configuration: {e}")))
    }

    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                tracing::debug!(path = %path.display(), "Loading mavenkit configuration");
                Self::from_toml_str(&content).map_err(|e| match e {
                    Error::ConfigBuild { message } => {
                        Error::config_build(format!("{}: {message}", path.display()))
                    }
                    other => other,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(Error::io(
                e,
                Some(path.to_path_buf()),
                "reading configuration",
            )),
        }
    }

    /// Interrogation timeout as a [`Duration`].
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}
