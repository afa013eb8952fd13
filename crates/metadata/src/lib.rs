//! Remote metadata lookup.
//!
//! [`ArtifactLookup`] reads `maven-metadata.xml` from a repository to find
//! the newest published version of an artifact, and compares a given
//! version against it with [`mavenkit_core::version::compare`].

pub mod lookup;
pub mod parse;

pub use lookup::{ArtifactLookup, CompareResult};
pub use parse::{ArtifactMetadata, parse_metadata};
