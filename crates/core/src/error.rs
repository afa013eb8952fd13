//! Error types shared by every mavenkit crate.
//!
//! The taxonomy mirrors the failure classes callers need to tell apart:
//! a missing coordinate is not the same thing as an unreachable repository,
//! and neither is the same as a broken graph.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Boxed source error carried by transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for mavenkit operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A coordinate, metadata document, or configuration file is absent
    #[error("Not found: {message}")]
    #[diagnostic(code(mavenkit::not_found))]
    NotFound {
        /// What could not be found
        message: String,
    },

    /// Transport, DNS, timeout, interruption, or malformed endpoint
    #[error("Network error: {message}")]
    #[diagnostic(code(mavenkit::network))]
    Network {
        /// Description of the failed exchange
        message: String,
        /// Underlying transport error, if any
        #[source]
        source: Option<BoxError>,
    },

    /// The dependency graph could not be resolved
    #[error("Failed to resolve {coordinate}: {message}")]
    #[diagnostic(
        code(mavenkit::dependency_resolution),
        help("check that the coordinate exists in one of the configured repositories")
    )]
    DependencyResolution {
        /// The coordinate that could not be resolved
        coordinate: String,
        /// Why resolution failed
        message: String,
    },

    /// Ill-formed coordinate strings or argument counts
    #[error("Malformed input: {message}")]
    #[diagnostic(code(mavenkit::malformed_input))]
    MalformedInput {
        /// What was wrong with the input
        message: String,
    },

    /// Settings or model building failed
    #[error("Configuration error: {message}")]
    #[diagnostic(code(mavenkit::config_build))]
    ConfigBuild {
        /// What went wrong while building configuration or the model
        message: String,
    },

    /// I/O error with path context
    #[error("I/O error during {operation}: {source}")]
    #[diagnostic(code(mavenkit::io))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The path where the I/O error occurred, if applicable
        path: Option<Box<Path>>,
        /// Description of the operation that failed
        operation: String,
    },
}

impl Error {
    /// Create a not-found error
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a network error without an underlying source
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error wrapping a transport error
    #[must_use]
    pub fn network_with_source(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a dependency resolution error naming the offending coordinate
    #[must_use]
    pub fn dependency_resolution(
        coordinate: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::DependencyResolution {
            coordinate: coordinate.into(),
            message: message.into(),
        }
    }

    /// Create a malformed input error
    #[must_use]
    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Create a configuration/model building error
    #[must_use]
    pub fn config_build(message: impl Into<String>) -> Self {
        Self::ConfigBuild {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    #[must_use]
    pub fn io(source: std::io::Error, path: Option<PathBuf>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.map(PathBuf::into_boxed_path),
            operation: operation.into(),
        }
    }

    /// Whether this error means "the thing does not exist" as opposed to
    /// "the thing could not be reached".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this error is a transport failure.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

/// Result type for mavenkit operations
pub type Result<T> = std::result::Result<T, Error>;
