//! `settings.xml` reading, reduced to `<localRepository>`.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use mavenkit_core::{Error, Result, ToolEnvironment};

use crate::xml::{child_text, parse_document};

/// The settings values mavenkit uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// `<localRepository>` as written, `${user.home}` not yet expanded.
    pub local_repository: Option<String>,
}

impl Settings {
    /// Fill unset values from `other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self {
            local_repository: self.local_repository.or(other.local_repository),
        }
    }
}

/// Reads user and global settings into one [`Settings`], user values winning.
pub trait SettingsReader: Send + Sync {
    /// Read the files that exist; missing files contribute nothing.
    fn read(&self, user: Option<&Path>, global: Option<&Path>) -> Result<Settings>;
}

/// Reads `settings.xml` files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlSettingsReader;

impl XmlSettingsReader {
    fn read_file(path: &Path) -> Result<Option<Settings>> {
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::io(e, Some(path.to_path_buf()), "reading settings"))?;
        let doc = parse_document(&text, path)?;
        let root = doc.root_element();
        if !root.has_tag_name("settings") {
            return Err(Error::config_build(format!(
                "{} is not a settings file: root element is <{}>",
                path.display(),
                root.tag_name().name()
            )));
        }
        Ok(Some(Settings {
            local_repository: child_text(root, "localRepository"),
        }))
    }
}

impl SettingsReader for XmlSettingsReader {
    fn read(&self, user: Option<&Path>, global: Option<&Path>) -> Result<Settings> {
        let user_settings = match user {
            Some(path) => {
                let settings = Self::read_file(path)?;
                if settings.is_none() {
                    warn!(path = %path.display(), "User settings not found");
                }
                settings
            }
            None => None,
        };
        let global_settings = match global {
            Some(path) => {
                let settings = Self::read_file(path)?;
                if settings.is_none() {
                    debug!(path = %path.display(), "Global settings not found");
                }
                settings
            }
            None => None,
        };
        Ok(user_settings
            .unwrap_or_default()
            .or(global_settings.unwrap_or_default()))
    }
}

/// `~/.m2/settings.xml`.
pub fn user_settings_path(env: &ToolEnvironment) -> Result<PathBuf> {
    Ok(env.user_home()?.join(".m2").join("settings.xml"))
}

/// `<home>/conf/settings.xml`, where `home` is the selected tool home or,
/// failing that, `M2_HOME`/`MAVEN_HOME`.
#[must_use]
pub fn global_settings_path(settings_home: Option<&Path>, env: &ToolEnvironment) -> Option<PathBuf> {
    settings_home
        .map(Path::to_path_buf)
        .or_else(|| env.settings_home_fallback())
        .map(|home| home.join("conf").join("settings.xml"))
}

/// The local repository directory: `override_path`, else `<localRepository>`
/// with `${user.home}` expanded, else `~/.m2/repository`.
pub fn local_repository_path(
    settings: &Settings,
    env: &ToolEnvironment,
    override_path: Option<&Path>,
) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path.to_path_buf());
    }
    let home = env.user_home()?;
    match settings.local_repository.as_deref() {
        Some(configured) if !configured.trim().is_empty() => {
            let home = home.to_string_lossy();
            Ok(PathBuf::from(configured.trim().replace("${user.home}", &home)))
        }
        _ => Ok(home.join(".m2").join("repository")),
    }
}
