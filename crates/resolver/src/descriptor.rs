//! Artifact descriptors: what a dependency's own POM says about its
//! dependencies.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use mavenkit_core::{Coordinate, RemoteRepository, Result};

use crate::connector::ArtifactFetcher;
use crate::model::Dependency;
use crate::model_builder::{ModelBuilder, ModelBuildingRequest, RepositoryModelResolver};

/// The parts of a dependency's model the graph engine needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    /// Declared dependencies, in order.
    pub dependencies: Vec<Dependency>,
    /// The model's dependency management. [`crate::graph::MediatingGraphEngine`]
    /// only applies the root's management and ignores this; it is kept for
    /// engines that honor nested management.
    pub managed: Vec<Dependency>,
    /// Repositories the model declares.
    pub repositories: Vec<RemoteRepository>,
}

/// Reads descriptors for coordinates.
#[async_trait]
pub trait ArtifactDescriptorReader: Send + Sync {
    /// The descriptor of `coordinate`, searching `repositories` for its POM
    /// and ancestors.
    async fn read_descriptor(
        &self,
        coordinate: &Coordinate,
        repositories: &[RemoteRepository],
    ) -> Result<ArtifactDescriptor>;
}

/// Builds descriptors from POMs with a [`ModelBuilder`].
pub struct PomDescriptorReader {
    fetcher: Arc<dyn ArtifactFetcher>,
    builder: Arc<dyn ModelBuilder>,
    dead_urls: Vec<String>,
}

impl PomDescriptorReader {
    /// Fetch POMs with `fetcher` and build them with `builder`.
    pub fn new(
        fetcher: Arc<dyn ArtifactFetcher>,
        builder: Arc<dyn ModelBuilder>,
        dead_urls: Vec<String>,
    ) -> Self {
        Self {
            fetcher,
            builder,
            dead_urls,
        }
    }
}

#[async_trait]
impl ArtifactDescriptorReader for PomDescriptorReader {
    async fn read_descriptor(
        &self,
        coordinate: &Coordinate,
        repositories: &[RemoteRepository],
    ) -> Result<ArtifactDescriptor> {
        let pom = match self.fetcher.fetch(&coordinate.pom(), repositories).await {
            Ok(pom) => pom,
            Err(e) if e.is_not_found() => {
                warn!(%coordinate, "No POM found, assuming no dependencies");
                return Ok(ArtifactDescriptor::default());
            }
            Err(e) => return Err(e),
        };

        debug!(%coordinate, pom = %pom.display(), "Reading descriptor");
        let resolver = RepositoryModelResolver::new(
            Arc::clone(&self.fetcher),
            repositories.to_vec(),
            self.dead_urls.clone(),
        );
        let request = ModelBuildingRequest::new(pom, &resolver).with_lenient(true);
        let model = self.builder.build(&request).await?;

        Ok(ArtifactDescriptor {
            dependencies: model.dependencies,
            managed: model.dependency_management,
            repositories: model.repositories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::RepositoryConnector;
    use crate::layout::LocalRepository;
    use crate::pom_builder::PomModelBuilder;
    use tempfile::TempDir;

    fn reader(local: &std::path::Path) -> PomDescriptorReader {
        let fetcher = Arc::new(RepositoryConnector::new(LocalRepository::new(local)).unwrap());
        PomDescriptorReader::new(fetcher, Arc::new(PomModelBuilder::new()), Vec::new())
    }

    #[tokio::test]
    async fn test_missing_pom_is_empty_descriptor() {
        let local = TempDir::new().unwrap();
        let descriptor = reader(local.path())
            .read_descriptor(&Coordinate::new("g", "a", "1"), &[])
            .await
            .unwrap();
        assert_eq!(descriptor, ArtifactDescriptor::default());
    }

    #[tokio::test]
    async fn test_descriptor_from_cached_pom() {
        let local = TempDir::new().unwrap();
        let c = Coordinate::new("com.example", "lib", "1.0");
        let pom = LocalRepository::new(local.path()).path_for(&c.pom()).unwrap();
        std::fs::create_dir_all(pom.parent().unwrap()).unwrap();
        std::fs::write(
            &pom,
            r"<project><groupId>com.example</groupId><artifactId>lib</artifactId><version>1.0</version>
              <dependencyManagement><dependencies>
                <dependency><groupId>org.dep</groupId><artifactId>pinned</artifactId><version>3</version></dependency>
              </dependencies></dependencyManagement>
              <dependencies>
                <dependency><groupId>org.dep</groupId><artifactId>ok</artifactId><version>2</version></dependency>
                <dependency><groupId>org.dep</groupId><artifactId>unversioned</artifactId></dependency>
              </dependencies></project>",
        )
        .unwrap();

        let descriptor = reader(local.path()).read_descriptor(&c, &[]).await.unwrap();
        assert_eq!(descriptor.dependencies.len(), 1);
        assert_eq!(descriptor.dependencies[0].coordinate.artifact_id, "ok");
        assert_eq!(descriptor.managed.len(), 1);
        assert_eq!(descriptor.managed[0].coordinate.version, "3");
    }
}
