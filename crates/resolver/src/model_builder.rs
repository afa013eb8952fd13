//! Model building seams.
//!
//! A [`ModelBuilder`] turns a POM file into an [`EffectiveModel`]. Parents
//! and imported BOMs it cannot find on disk are obtained through the
//! request's [`ModelResolver`], which also learns about repositories the
//! models declare along the way.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use mavenkit_core::{Coordinate, RemoteRepository, Result};

use crate::connector::ArtifactFetcher;
use crate::model::{Dependency, DependencyOrigin, EffectiveModel, Scope};

/// Finds POMs for parents and BOM imports.
#[async_trait]
pub trait ModelResolver: Send + Sync {
    /// Local path of the POM for `coordinate`.
    async fn resolve_pom(&self, coordinate: &Coordinate) -> Result<PathBuf>;

    /// Make a repository declared by a model available to later lookups.
    fn add_repository(&self, repository: RemoteRepository);
}

/// Input to [`ModelBuilder::build`].
pub struct ModelBuildingRequest<'a> {
    /// The POM to build.
    pub pom_file: PathBuf,
    /// Values for `${...}` expressions not defined by the model.
    pub system_properties: BTreeMap<String, String>,
    /// Source of parents and BOMs.
    pub resolver: &'a dyn ModelResolver,
    /// Drop dependencies without a version instead of failing.
    pub lenient: bool,
}

impl<'a> ModelBuildingRequest<'a> {
    /// A strict request for `pom_file`.
    pub fn new(pom_file: impl Into<PathBuf>, resolver: &'a dyn ModelResolver) -> Self {
        Self {
            pom_file: pom_file.into(),
            system_properties: BTreeMap::new(),
            resolver,
            lenient: false,
        }
    }

    /// Set the system properties.
    #[must_use]
    pub fn with_system_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.system_properties = properties;
        self
    }

    /// Set leniency.
    #[must_use]
    pub const fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }
}

/// Builds effective models.
#[async_trait]
pub trait ModelBuilder: Send + Sync {
    /// Build the effective model for `request.pom_file`.
    async fn build(&self, request: &ModelBuildingRequest<'_>) -> Result<EffectiveModel>;
}

/// [`ModelResolver`] backed by an [`ArtifactFetcher`] and a growing
/// repository list.
pub struct RepositoryModelResolver {
    fetcher: Arc<dyn ArtifactFetcher>,
    repositories: Mutex<Vec<RemoteRepository>>,
    dead_urls: Vec<String>,
}

impl RepositoryModelResolver {
    /// Start with `repositories`; declared repositories whose URL is in
    /// `dead_urls` are ignored.
    pub fn new(
        fetcher: Arc<dyn ArtifactFetcher>,
        repositories: Vec<RemoteRepository>,
        dead_urls: Vec<String>,
    ) -> Self {
        Self {
            fetcher,
            repositories: Mutex::new(repositories),
            dead_urls,
        }
    }

    /// Current repository list.
    pub fn repositories(&self) -> Vec<RemoteRepository> {
        self.repositories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ModelResolver for RepositoryModelResolver {
    async fn resolve_pom(&self, coordinate: &Coordinate) -> Result<PathBuf> {
        let repositories = self.repositories();
        self.fetcher.fetch(&coordinate.pom(), &repositories).await
    }

    fn add_repository(&self, repository: RemoteRepository) {
        if repository.is_dead(&self.dead_urls) {
            debug!(repository = %repository, "Ignoring dead repository");
            return;
        }
        let mut repositories = self
            .repositories
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if repositories.iter().all(|r| r.id != repository.id) {
            debug!(repository = %repository, "Adding model repository");
            repositories.push(repository);
        }
    }
}

/// Appends the parent as a `compile`/`pom` dependency with
/// [`DependencyOrigin::Parent`] to every model it builds.
pub struct ParentAsDependency<B> {
    inner: B,
}

impl<B> ParentAsDependency<B> {
    /// Wrap `inner`.
    pub const fn new(inner: B) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<B: ModelBuilder> ModelBuilder for ParentAsDependency<B> {
    async fn build(&self, request: &ModelBuildingRequest<'_>) -> Result<EffectiveModel> {
        let mut model = self.inner.build(request).await?;
        if let Some(parent) = &model.parent {
            let mut dependency = Dependency::new(parent.coordinate()).with_scope(Scope::Compile);
            dependency.origin = DependencyOrigin::Parent;
            model.dependencies.push(dependency);
        }
        Ok(model)
    }
}

#[async_trait]
impl<B: ModelBuilder + ?Sized> ModelBuilder for Arc<B> {
    async fn build(&self, request: &ModelBuildingRequest<'_>) -> Result<EffectiveModel> {
        (**self).build(request).await
    }
}
