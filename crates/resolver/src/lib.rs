//! Dependency resolution for POM projects.
//!
//! [`MavenResolver`] is the entry point. It picks an installation through
//! the invoker's selector, reads that installation's settings to find the
//! local repository, builds the effective model with a [`ModelBuilder`] and
//! hands the direct dependencies to a [`DependencyGraphEngine`].
//!
//! The default pieces:
//! - [`PomModelBuilder`]: parents, interpolation, BOM import
//! - [`RepositoryConnector`]: HTTP(S) and `file://` transport into the
//!   local repository
//! - [`MediatingGraphEngine`]: breadth-first collection, nearest wins

pub mod connector;
pub mod descriptor;
pub mod graph;
pub mod layout;
pub mod model;
pub mod model_builder;
pub mod pom_builder;
pub mod repositories;
pub mod resolver;
pub mod settings;

mod pom;
mod xml;

pub use connector::{ArtifactFetcher, RepositoryConnector};
pub use descriptor::{ArtifactDescriptor, ArtifactDescriptorReader, PomDescriptorReader};
pub use graph::{
    CollectRequest, DependencyGraphEngine, MediatingGraphEngine, ResolvedArtifact, ScopeFilter,
};
pub use layout::LocalRepository;
pub use model::{
    BuildDirectories, Dependency, DependencyOrigin, EffectiveModel, Exclusion, ParentRef, Scope,
};
pub use model_builder::{
    ModelBuilder, ModelBuildingRequest, ModelResolver, ParentAsDependency, RepositoryModelResolver,
};
pub use pom_builder::PomModelBuilder;
pub use resolver::{
    DefaultRepositorySystem, DependenciesResolution, MavenResolver, RepositorySession,
    RepositorySystem, ResolvedArtifactSet,
};
pub use settings::{Settings, SettingsReader, XmlSettingsReader};
