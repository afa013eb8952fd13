//! Snapshot of the process environment used for toolchain discovery.
//!
//! Discovery reads `PATH`, `MAVEN_HOME`, `M2_HOME`, the user's home
//! directory, and a map of system-property style overrides. Capturing them
//! in a value keeps discovery testable without mutating the real process
//! environment.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::{Error, Result};

/// Name of the variable and property that overrides the tool home.
pub const MAVEN_HOME: &str = "MAVEN_HOME";

/// Legacy tool home variable consulted for global settings.
pub const M2_HOME: &str = "M2_HOME";

/// Values discovery depends on.
#[derive(Debug, Clone, Default)]
pub struct ToolEnvironment {
    path: Option<OsString>,
    maven_home: Option<String>,
    m2_home: Option<String>,
    properties: BTreeMap<String, String>,
    home_dir: Option<PathBuf>,
}

impl ToolEnvironment {
    /// Capture the current process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self {
            path: std::env::var_os("PATH"),
            maven_home: std::env::var(MAVEN_HOME).ok(),
            m2_home: std::env::var(M2_HOME).ok(),
            properties: BTreeMap::new(),
            home_dir: dirs::home_dir(),
        }
    }

    /// An environment with nothing set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace `PATH`.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<OsString>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Replace `PATH` with the given directories joined for the host OS.
    #[must_use]
    pub fn with_path_entries<I, P>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let dirs: Vec<PathBuf> = entries.into_iter().map(Into::into).collect();
        self.path = std::env::join_paths(dirs).ok();
        self
    }

    /// Set the `MAVEN_HOME` environment value.
    #[must_use]
    pub fn with_maven_home(mut self, home: impl Into<String>) -> Self {
        self.maven_home = Some(home.into());
        self
    }

    /// Set the `M2_HOME` environment value.
    #[must_use]
    pub fn with_m2_home(mut self, home: impl Into<String>) -> Self {
        self.m2_home = Some(home.into());
        self
    }

    /// Set a system-property style override.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Replace the user's home directory.
    #[must_use]
    pub fn with_home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(home.into());
        self
    }

    /// Directories listed in `PATH`, in order. Empty entries are skipped.
    #[must_use]
    pub fn path_entries(&self) -> Vec<PathBuf> {
        self.path
            .as_ref()
            .map(|p| {
                std::env::split_paths(p)
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// System-property style overrides.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Look up a system-property style override.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// The explicit tool home override: the `MAVEN_HOME` property first,
    /// then the environment variable. Blank values count as unset.
    #[must_use]
    pub fn maven_home_override(&self) -> Option<PathBuf> {
        self.property(MAVEN_HOME)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.maven_home.as_deref().filter(|v| !v.trim().is_empty()))
            .map(|v| PathBuf::from(v.trim()))
    }

    /// Home used to locate global settings when no tool home was chosen:
    /// `M2_HOME`, then `MAVEN_HOME`.
    #[must_use]
    pub fn settings_home_fallback(&self) -> Option<PathBuf> {
        self.m2_home
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.maven_home.as_deref().filter(|v| !v.trim().is_empty()))
            .map(|v| PathBuf::from(v.trim()))
    }

    /// The user's home directory. Fails when it is unknown or missing.
    pub fn user_home(&self) -> Result<PathBuf> {
        let home = self
            .home_dir
            .clone()
            .ok_or_else(|| Error::not_found("Could not determine the user home directory"))?;
        if !home.is_dir() {
            return Err(Error::not_found(format!(
                "User home directory {} does not exist",
                home.display()
            )));
        }
        Ok(home)
    }
}
