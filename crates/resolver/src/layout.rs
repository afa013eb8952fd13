//! The `default` repository layout, shared by remote repositories and the
//! local cache.
//!
//! Structure:
//! ```text
//! <root>/
//! └── org/slf4j/            # groupId, dots become directories
//!     └── slf4j-api/        # artifactId
//!         └── 2.0.16/       # version
//!             ├── slf4j-api-2.0.16.pom
//!             ├── slf4j-api-2.0.16.jar
//!             └── slf4j-api-2.0.16-sources.jar
//! ```

use std::path::{Path, PathBuf};
use tracing::trace;

use mavenkit_core::{Coordinate, Error, Result};

/// File name of an artifact: `artifactId-version[-classifier].extension`.
#[must_use]
pub fn file_name(coordinate: &Coordinate) -> String {
    let mut name = format!("{}-{}", coordinate.artifact_id, coordinate.version);
    if let Some(classifier) = &coordinate.classifier {
        name.push('-');
        name.push_str(classifier);
    }
    name.push('.');
    name.push_str(&coordinate.extension);
    name
}

/// Path of an artifact relative to a repository root, `/`-separated.
#[must_use]
pub fn relative_path(coordinate: &Coordinate) -> String {
    format!(
        "{}/{}/{}/{}",
        coordinate.group_id.replace('.', "/"),
        coordinate.artifact_id,
        coordinate.version,
        file_name(coordinate)
    )
}

/// The local artifact cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    /// A local repository rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `coordinate` lives in this repository.
    ///
    /// [`Error::MalformedInput`] when a component would place the file
    /// outside the root.
    pub fn path_for(&self, coordinate: &Coordinate) -> Result<PathBuf> {
        coordinate.check_path_safe()?;
        let mut path = self.root.clone();
        path.extend(coordinate.group_id.split('.').filter(|s| !s.is_empty()));
        path.push(&coordinate.artifact_id);
        path.push(&coordinate.version);
        path.push(file_name(coordinate));
        if !path.starts_with(&self.root) {
            return Err(Error::malformed_input(format!(
                "Coordinate '{coordinate}' resolves outside the local repository"
            )));
        }
        Ok(path)
    }

    /// The cached file for `coordinate`, if present.
    pub fn find(&self, coordinate: &Coordinate) -> Result<Option<PathBuf>> {
        let path = self.path_for(coordinate)?;
        if path.is_file() {
            trace!(%coordinate, path = %path.display(), "Found in local repository");
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}
