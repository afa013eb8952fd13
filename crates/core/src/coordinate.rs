//! Artifact coordinates.
//!
//! A [`Coordinate`] names one resolvable file:
//! `groupId:artifactId:extension[:classifier]:version`. Its version-less
//! projection, [`ArtifactKey`], is the identity used for conflict mediation:
//! a resolved set never holds two files with the same key.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Default extension for artifacts that do not declare one.
pub const DEFAULT_EXTENSION: &str = "jar";

/// Version-less artifact identity: `(groupId, artifactId, classifier, extension)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
    /// Group identifier (e.g. `org.slf4j`).
    pub group_id: String,
    /// Artifact identifier (e.g. `slf4j-api`).
    pub artifact_id: String,
    /// Optional classifier (e.g. `sources`, `tests`).
    pub classifier: Option<String>,
    /// File extension (e.g. `jar`, `pom`).
    pub extension: String,
}

impl ArtifactKey {
    /// Whether this key refers to the given group and artifact, ignoring
    /// classifier and extension.
    #[must_use]
    pub fn is(&self, group_id: &str, artifact_id: &str) -> bool {
        self.group_id == group_id && self.artifact_id == artifact_id
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

/// A fully versioned artifact coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// Group identifier.
    pub group_id: String,
    /// Artifact identifier.
    pub artifact_id: String,
    /// Optional classifier; empty strings are normalized to `None`.
    pub classifier: Option<String>,
    /// File extension.
    pub extension: String,
    /// Version string, compared with [`crate::version::compare`].
    pub version: String,
}

impl Coordinate {
    /// Create a `jar` coordinate without classifier.
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            classifier: None,
            extension: DEFAULT_EXTENSION.to_string(),
            version: version.into(),
        }
    }

    /// Set the classifier. Blank classifiers clear it.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Option<impl Into<String>>) -> Self {
        self.classifier = classifier
            .map(Into::into)
            .filter(|c: &String| !c.trim().is_empty());
        self
    }

    /// Set the extension. Blank extensions fall back to `jar`.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = if extension.trim().is_empty() {
            DEFAULT_EXTENSION.to_string()
        } else {
            extension
        };
        self
    }

    /// Replace the version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The version-less identity of this coordinate.
    #[must_use]
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            classifier: self.classifier.clone(),
            extension: self.extension.clone(),
        }
    }

    /// The coordinate of this artifact's descriptor (`.pom`, no classifier).
    #[must_use]
    pub fn pom(&self) -> Self {
        Self {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            classifier: None,
            extension: "pom".to_string(),
            version: self.version.clone(),
        }
    }

    /// Parse `groupId:artifactId[:extension[:classifier]]:version`.
    pub fn parse(spec: &str) -> Result<Self> {
        let parts: Vec<&str> = spec.split(':').collect();
        if parts.iter().any(|p| p.trim().is_empty()) && parts.len() != 5 {
            return Err(Error::malformed_input(format!(
                "Coordinate '{spec}' contains an empty segment"
            )));
        }
        let coordinate = match parts.as_slice() {
            [g, a, v] => Self::new(*g, *a, *v),
            [g, a, e, v] => Self::new(*g, *a, *v).with_extension(*e),
            [g, a, e, c, v] => Self::new(*g, *a, *v)
                .with_extension(*e)
                .with_classifier(Some(*c)),
            _ => {
                return Err(Error::malformed_input(format!(
                    "Coordinate must have 3 to 5 parts (groupId:artifactId[:extension[:classifier]]:version), got: {spec}"
                )));
            }
        };
        if coordinate.group_id.trim().is_empty()
            || coordinate.artifact_id.trim().is_empty()
            || coordinate.version.trim().is_empty()
        {
            return Err(Error::malformed_input(format!(
                "Coordinate '{spec}' has an empty groupId, artifactId or version"
            )));
        }
        coordinate.check_path_safe()?;
        Ok(coordinate)
    }

    /// Reject components that would leave a repository root when laid out
    /// as path segments: separators, drive prefixes, `.` and `..`.
    pub fn check_path_safe(&self) -> Result<()> {
        let components = [
            ("groupId", Some(self.group_id.as_str())),
            ("artifactId", Some(self.artifact_id.as_str())),
            ("version", Some(self.version.as_str())),
            ("classifier", self.classifier.as_deref()),
            ("extension", Some(self.extension.as_str())),
        ];
        for (name, value) in components {
            if let Some(value) = value
                && !is_safe_segment(value)
            {
                return Err(Error::malformed_input(format!(
                    "Coordinate '{self}' has an unsafe {name} '{value}'"
                )));
            }
        }
        Ok(())
    }
}

fn is_safe_segment(value: &str) -> bool {
    value != "."
        && value != ".."
        && !value
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':' | '\0'))
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.version)
    }
}
