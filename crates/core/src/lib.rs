//! Core types shared by the mavenkit crates.
//!
//! - [`Error`]/[`Result`]: the failure taxonomy every crate reports through
//! - [`Coordinate`]/[`ArtifactKey`]: artifact identity
//! - [`RemoteRepository`]: repository descriptions
//! - [`version`]: Maven version ordering
//! - [`ToolEnvironment`]: the environment toolchain discovery reads
//! - [`MavenKitConfig`]: explicit configuration

pub mod config;
pub mod coordinate;
pub mod env;
pub mod error;
pub mod repository;
pub mod version;

pub use config::MavenKitConfig;
pub use coordinate::{ArtifactKey, Coordinate};
pub use env::ToolEnvironment;
pub use error::{Error, Result};
pub use repository::RemoteRepository;
