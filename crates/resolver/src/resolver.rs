//! The resolver facade: from a POM to local files.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use mavenkit_core::{ArtifactKey, Coordinate, MavenKitConfig, RemoteRepository, Result};
use mavenkit_invoker::{DistributionSelection, DistributionSelector, ExecutionOptions, ProcessProbe};

use crate::connector::{ArtifactFetcher, RepositoryConnector};
use crate::descriptor::PomDescriptorReader;
use crate::graph::{CollectRequest, DependencyGraphEngine, MediatingGraphEngine, ScopeFilter};
use crate::layout::LocalRepository;
use crate::model::{DependencyOrigin, EffectiveModel, Scope};
use crate::model_builder::{ModelBuilder, ModelBuildingRequest, ParentAsDependency, RepositoryModelResolver};
use crate::pom_builder::PomModelBuilder;
use crate::repositories::build_search_list;
use crate::settings::{
    SettingsReader, XmlSettingsReader, global_settings_path, local_repository_path, user_settings_path,
};

/// Local files keyed by artifact identity, in resolution order. Holds at
/// most one file per [`ArtifactKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArtifactSet {
    files: IndexMap<ArtifactKey, PathBuf>,
}

impl ResolvedArtifactSet {
    /// Record `path` for `key`. Returns `false` and keeps the existing file
    /// when `key` is already present.
    pub fn insert(&mut self, key: ArtifactKey, path: PathBuf) -> bool {
        if self.files.contains_key(&key) {
            return false;
        }
        self.files.insert(key, path);
        true
    }

    /// Number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The file for `key`.
    #[must_use]
    pub fn get(&self, key: &ArtifactKey) -> Option<&Path> {
        self.files.get(key).map(PathBuf::as_path)
    }

    /// `(key, file)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&ArtifactKey, &Path)> {
        self.files.iter().map(|(k, p)| (k, p.as_path()))
    }

    /// Files in order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.values().map(PathBuf::as_path)
    }

    /// Whether `path` is one of the files.
    #[must_use]
    pub fn contains_path(&self, path: &Path) -> bool {
        self.files.values().any(|p| p == path)
    }

    /// Consume into the ordered file list.
    #[must_use]
    pub fn into_paths(self) -> Vec<PathBuf> {
        self.files.into_values().collect()
    }
}

/// Result of [`MavenResolver::resolve_dependencies`].
#[derive(Debug, Clone)]
pub struct DependenciesResolution {
    /// The resolved files.
    pub files: ResolvedArtifactSet,
    /// The installation whose settings were used.
    pub selection: DistributionSelection,
}

/// Transport and graph engine bound to one local repository.
pub struct RepositorySession {
    /// Fetches single artifacts.
    pub fetcher: Arc<dyn ArtifactFetcher>,
    /// Collects and resolves graphs.
    pub engine: Arc<dyn DependencyGraphEngine>,
}

/// Creates [`RepositorySession`]s.
pub trait RepositorySystem: Send + Sync {
    /// A session caching into `local`, building descriptors with `builder`.
    fn session(&self, local: LocalRepository, builder: Arc<dyn ModelBuilder>) -> Result<RepositorySession>;
}

/// [`RepositoryConnector`] transport with the [`MediatingGraphEngine`].
#[derive(Debug, Clone, Default)]
pub struct DefaultRepositorySystem {
    dead_urls: Vec<String>,
}

impl DefaultRepositorySystem {
    /// Ignore repositories with these URLs when POMs declare them.
    #[must_use]
    pub const fn new(dead_urls: Vec<String>) -> Self {
        Self { dead_urls }
    }
}

impl RepositorySystem for DefaultRepositorySystem {
    fn session(&self, local: LocalRepository, builder: Arc<dyn ModelBuilder>) -> Result<RepositorySession> {
        let fetcher: Arc<dyn ArtifactFetcher> = Arc::new(RepositoryConnector::new(local)?);
        let descriptors = PomDescriptorReader::new(Arc::clone(&fetcher), builder, self.dead_urls.clone());
        let engine = MediatingGraphEngine::new(Arc::new(descriptors), Arc::clone(&fetcher))
            .with_dead_urls(self.dead_urls.clone());
        Ok(RepositorySession {
            fetcher,
            engine: Arc::new(engine),
        })
    }
}

/// Resolves POM dependency closures and single artifacts.
///
/// Each call selects an installation, reads its settings to find the local
/// repository, then works against the resolver's repository list.
pub struct MavenResolver {
    config: MavenKitConfig,
    repositories: Vec<RemoteRepository>,
    selector: DistributionSelector,
    settings_reader: Arc<dyn SettingsReader>,
    model_builder: Arc<dyn ModelBuilder>,
    system: Arc<dyn RepositorySystem>,
}

impl std::fmt::Debug for MavenResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MavenResolver")
            .field("config", &self.config)
            .field("repositories", &self.repositories)
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

impl Default for MavenResolver {
    fn default() -> Self {
        Self::new(MavenKitConfig::default())
    }
}

impl MavenResolver {
    /// A resolver starting from `config.repositories`, discovering
    /// installations in the process environment.
    #[must_use]
    pub fn new(config: MavenKitConfig) -> Self {
        let selector = DistributionSelector::new(
            mavenkit_core::ToolEnvironment::from_process(),
            Arc::new(ProcessProbe::new(config.probe_timeout())),
        );
        Self {
            repositories: config.repositories.clone(),
            system: Arc::new(DefaultRepositorySystem::new(config.dead_repository_urls.clone())),
            config,
            selector,
            settings_reader: Arc::new(XmlSettingsReader),
            model_builder: Arc::new(PomModelBuilder::new()),
        }
    }

    /// Replace the installation selector.
    #[must_use]
    pub fn with_selector(mut self, selector: DistributionSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Replace the settings reader.
    #[must_use]
    pub fn with_settings_reader(mut self, reader: Arc<dyn SettingsReader>) -> Self {
        self.settings_reader = reader;
        self
    }

    /// Replace the model builder.
    #[must_use]
    pub fn with_model_builder(mut self, builder: Arc<dyn ModelBuilder>) -> Self {
        self.model_builder = builder;
        self
    }

    /// Replace transport and graph engine.
    #[must_use]
    pub fn with_repository_system(mut self, system: Arc<dyn RepositorySystem>) -> Self {
        self.system = system;
        self
    }

    /// The installation selector.
    #[must_use]
    pub const fn selector(&self) -> &DistributionSelector {
        &self.selector
    }

    /// The configuration this resolver was built with.
    #[must_use]
    pub const fn config(&self) -> &MavenKitConfig {
        &self.config
    }

    /// The repository list, in search order.
    #[must_use]
    pub fn remote_repositories(&self) -> &[RemoteRepository] {
        &self.repositories
    }

    /// Append a repository. Ids already present are ignored.
    pub fn add_repository(&mut self, id: impl Into<String>, url: impl Into<String>) {
        self.add_remote_repository(RemoteRepository::new(id, url));
    }

    /// Append a repository. Ids already present are ignored.
    pub fn add_remote_repository(&mut self, repository: RemoteRepository) {
        if self.repositories.iter().any(|r| r.id == repository.id) {
            debug!(repository = %repository, "Repository id already registered");
            return;
        }
        debug!(repository = %repository, "Adding repository");
        self.repositories.push(repository);
    }

    /// The local repository the settings of the selected installation point
    /// at.
    pub async fn local_repository(
        &self,
        pom: Option<&Path>,
        options: &ExecutionOptions,
    ) -> Result<LocalRepository> {
        let (_, local) = self.prepare(pom, options).await?;
        Ok(local)
    }

    /// Build the effective model of `pom`.
    pub async fn parse_pom(&self, pom: &Path, options: &ExecutionOptions) -> Result<EffectiveModel> {
        let (_, local) = self.prepare(Some(pom), options).await?;
        let session = self.system.session(local, Arc::clone(&self.model_builder))?;
        let resolver = self.model_resolver(&session);
        let request = ModelBuildingRequest::new(pom, &resolver)
            .with_system_properties(self.selector.env().properties().clone());
        self.model_builder.build(&request).await
    }

    /// Resolve the transitive dependencies of `pom` to local files: the
    /// `compile`+`runtime` closure, plus `test` when `include_test`.
    pub async fn resolve_dependencies(
        &self,
        pom: &Path,
        options: &ExecutionOptions,
        include_test: bool,
    ) -> Result<DependenciesResolution> {
        let (_, resolution) = self.resolve_with_model(pom, options, include_test).await?;
        Ok(resolution)
    }

    /// The project's output directories followed by every resolved file
    /// that exists, test scope included.
    pub async fn class_path(&self, pom: &Path, options: &ExecutionOptions) -> Result<Vec<PathBuf>> {
        let (model, resolution) = self.resolve_with_model(pom, options, true).await?;
        let mut class_path = vec![
            model.build.output_directory,
            model.build.test_output_directory,
        ];
        class_path.extend(
            resolution
                .files
                .into_paths()
                .into_iter()
                .filter(|p| p.exists()),
        );
        Ok(class_path)
    }

    /// Resolve one artifact to a local file using default options.
    ///
    /// [`mavenkit_core::Error::NotFound`] when no repository has it,
    /// [`mavenkit_core::Error::Network`] when one could not be asked.
    pub async fn resolve_artifact(
        &self,
        group_id: &str,
        artifact_id: &str,
        classifier: Option<&str>,
        extension: Option<&str>,
        version: &str,
    ) -> Result<PathBuf> {
        let coordinate = Coordinate::new(group_id, artifact_id, version)
            .with_classifier(classifier)
            .with_extension(extension.unwrap_or_default());
        self.resolve_coordinate(&coordinate, &ExecutionOptions::default())
            .await
    }

    /// Resolve one artifact to a local file.
    pub async fn resolve_coordinate(
        &self,
        coordinate: &Coordinate,
        options: &ExecutionOptions,
    ) -> Result<PathBuf> {
        let (_, local) = self.prepare(None, options).await?;
        let session = self.system.session(local, Arc::clone(&self.model_builder))?;
        let repositories = build_search_list(&self.repositories, &[], &self.config);
        let path = session.fetcher.fetch(coordinate, &repositories).await?;
        info!(%coordinate, path = %path.display(), "Resolved artifact");
        Ok(path)
    }

    async fn resolve_with_model(
        &self,
        pom: &Path,
        options: &ExecutionOptions,
        include_test: bool,
    ) -> Result<(EffectiveModel, DependenciesResolution)> {
        let (selection, local) = self.prepare(Some(pom), options).await?;
        let session = self.system.session(local, Arc::clone(&self.model_builder))?;

        let resolver = self.model_resolver(&session);
        let request = ModelBuildingRequest::new(pom, &resolver)
            .with_system_properties(self.selector.env().properties().clone());
        let model = ParentAsDependency::new(Arc::clone(&self.model_builder))
            .build(&request)
            .await?;

        let repositories = build_search_list(&self.repositories, &model.repositories, &self.config);
        let roots = model
            .dependencies
            .iter()
            .filter(|d| d.scope != Scope::Import && d.origin != DependencyOrigin::Parent)
            .cloned()
            .collect();
        let collect = CollectRequest {
            roots,
            managed: model.dependency_management.clone(),
            repositories,
        };
        let resolved = session
            .engine
            .resolve(&collect, &ScopeFilter::for_closure(include_test))
            .await?;

        let mut files = ResolvedArtifactSet::default();
        for artifact in resolved {
            files.insert(artifact.coordinate.key(), artifact.path);
        }
        info!(
            project = %model.coordinate,
            files = files.len(),
            include_test,
            "Resolved dependencies"
        );
        Ok((model, DependenciesResolution { files, selection }))
    }

    /// Select an installation and locate the local repository its settings
    /// name.
    async fn prepare(
        &self,
        pom: Option<&Path>,
        options: &ExecutionOptions,
    ) -> Result<(DistributionSelection, LocalRepository)> {
        let selection = self.selector.select(pom, options).await;
        let settings_home = self.selector.home_for_settings(&selection).await;
        let env = self.selector.env();

        let user = user_settings_path(env).ok();
        let global = global_settings_path(settings_home.as_deref(), env);
        let settings = self.settings_reader.read(user.as_deref(), global.as_deref())?;
        let root = local_repository_path(&settings, env, self.config.local_repository.as_deref())?;
        debug!(
            mode = ?selection.mode,
            local = %root.display(),
            "Prepared resolution"
        );
        Ok((selection, LocalRepository::new(root)))
    }

    fn model_resolver(&self, session: &RepositorySession) -> RepositoryModelResolver {
        RepositoryModelResolver::new(
            Arc::clone(&session.fetcher),
            build_search_list(&self.repositories, &[], &self.config),
            self.config.dead_repository_urls.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(artifact: &str) -> ArtifactKey {
        Coordinate::new("g", artifact, "1").key()
    }

    #[test]
    fn test_resolved_set_keeps_first_file_per_key() {
        let mut set = ResolvedArtifactSet::default();
        assert!(set.insert(key("a"), PathBuf::from("/a-1.jar")));
        assert!(set.insert(key("b"), PathBuf::from("/b-1.jar")));
        assert!(!set.insert(key("a"), PathBuf::from("/a-2.jar")));
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(&key("a")), Some(Path::new("/a-1.jar")));
        assert!(set.contains_path(Path::new("/b-1.jar")));
        assert_eq!(
            set.into_paths(),
            vec![PathBuf::from("/a-1.jar"), PathBuf::from("/b-1.jar")]
        );
    }

    #[test]
    fn test_add_repository_appends_unique_ids() {
        let mut resolver = MavenResolver::new(MavenKitConfig::default());
        resolver.add_repository("internal", "https://nexus.example.com/repo");
        resolver.add_repository("central", "https://elsewhere.example.com/");
        let ids: Vec<&str> = resolver
            .remote_repositories()
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["central", "internal"]);
        assert_eq!(
            resolver.remote_repositories()[0].url,
            "https://repo1.maven.org/maven2/"
        );
    }
}
