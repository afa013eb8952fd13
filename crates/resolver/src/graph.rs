//! Transitive dependency collection with nearest-wins version mediation.
//!
//! The graph is walked breadth first in declaration order. The first node
//! reached for an [`ArtifactKey`] wins its conflict group; later nodes for
//! the same key are recorded for scope selection but never expanded. Final
//! scopes are the widest derived scope over every occurrence, recomputed
//! until they stop changing.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, trace};

use mavenkit_core::{ArtifactKey, Coordinate, Error, RemoteRepository, Result};

use crate::connector::ArtifactFetcher;
use crate::descriptor::ArtifactDescriptorReader;
use crate::model::{Dependency, Exclusion, Scope};
use crate::repositories::merge_repositories;

/// What to collect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectRequest {
    /// Direct dependencies, in declaration order.
    pub roots: Vec<Dependency>,
    /// Root dependency management, applied to transitive nodes.
    pub managed: Vec<Dependency>,
    /// Repositories to search.
    pub repositories: Vec<RemoteRepository>,
}

/// The scopes a resolution keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFilter {
    scopes: Vec<Scope>,
}

impl ScopeFilter {
    /// `compile` and `runtime`.
    #[must_use]
    pub fn runtime() -> Self {
        Self {
            scopes: vec![Scope::Compile, Scope::Runtime],
        }
    }

    /// `compile`, `runtime` and `test`.
    #[must_use]
    pub fn test() -> Self {
        Self {
            scopes: vec![Scope::Compile, Scope::Runtime, Scope::Test],
        }
    }

    /// [`Self::test`] when `include_test`, else [`Self::runtime`].
    #[must_use]
    pub fn for_closure(include_test: bool) -> Self {
        if include_test { Self::test() } else { Self::runtime() }
    }

    /// Whether `scope` is kept.
    #[must_use]
    pub fn accepts(&self, scope: Scope) -> bool {
        self.scopes.contains(&scope)
    }
}

/// One artifact of the resolved graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// The mediated coordinate.
    pub coordinate: Coordinate,
    /// Final scope.
    pub scope: Scope,
    /// Local file.
    pub path: PathBuf,
    /// Distance from the project; direct dependencies are at depth 1.
    pub depth: usize,
}

/// Collects and resolves a dependency graph.
#[async_trait]
pub trait DependencyGraphEngine: Send + Sync {
    /// Resolve `request`, keeping artifacts whose final scope `filter`
    /// accepts. Any unresolvable coordinate fails the whole request with
    /// [`Error::DependencyResolution`].
    async fn resolve(&self, request: &CollectRequest, filter: &ScopeFilter) -> Result<Vec<ResolvedArtifact>>;
}

/// A node waiting to be visited.
struct Pending {
    dependency: Dependency,
    depth: usize,
    parent: Option<ArtifactKey>,
    path: Vec<ArtifactKey>,
    exclusions: Vec<Exclusion>,
    repositories: Vec<RemoteRepository>,
}

/// The node that won a conflict group.
struct Winner {
    coordinate: Coordinate,
    depth: usize,
    declared: Scope,
    repositories: Vec<RemoteRepository>,
    /// `(parent, declared scope)` of every node reached for this key.
    occurrences: Vec<(Option<ArtifactKey>, Scope)>,
}

/// The default engine.
pub struct MediatingGraphEngine {
    descriptors: Arc<dyn ArtifactDescriptorReader>,
    fetcher: Arc<dyn ArtifactFetcher>,
    dead_urls: Vec<String>,
}

impl MediatingGraphEngine {
    /// Read descriptors through `descriptors`, download through `fetcher`.
    pub fn new(descriptors: Arc<dyn ArtifactDescriptorReader>, fetcher: Arc<dyn ArtifactFetcher>) -> Self {
        Self {
            descriptors,
            fetcher,
            dead_urls: Vec::new(),
        }
    }

    /// Repositories with these URLs are ignored when descriptors declare them.
    #[must_use]
    pub fn with_dead_urls(mut self, dead_urls: Vec<String>) -> Self {
        self.dead_urls = dead_urls;
        self
    }

    async fn collect(&self, request: &CollectRequest) -> Result<IndexMap<ArtifactKey, Winner>> {
        let managed: HashMap<ArtifactKey, &Dependency> = request
            .managed
            .iter()
            .map(|d| (d.coordinate.key(), d))
            .collect();

        let mut queue: VecDeque<Pending> = request
            .roots
            .iter()
            .map(|root| Pending {
                dependency: root.clone(),
                depth: 1,
                parent: None,
                path: Vec::new(),
                exclusions: Vec::new(),
                repositories: request.repositories.clone(),
            })
            .collect();
        let mut winners: IndexMap<ArtifactKey, Winner> = IndexMap::new();

        while let Some(pending) = queue.pop_front() {
            let Pending {
                dependency,
                depth,
                parent,
                path,
                exclusions,
                repositories,
            } = pending;
            let key = dependency.coordinate.key();

            if let Some(winner) = winners.get_mut(&key) {
                trace!(
                    candidate = %dependency.coordinate,
                    winner = %winner.coordinate,
                    "Nearer node already won"
                );
                winner.occurrences.push((parent, dependency.scope));
                continue;
            }

            let descriptor = self
                .descriptors
                .read_descriptor(&dependency.coordinate, &repositories)
                .await
                .map_err(|e| Error::dependency_resolution(dependency.coordinate.to_string(), e.to_string()))?;

            let mut child_repositories = repositories.clone();
            merge_repositories(&mut child_repositories, &descriptor.repositories, &self.dead_urls);
            let mut child_path = path;
            child_path.push(key.clone());
            let mut child_exclusions = exclusions.clone();
            child_exclusions.extend(dependency.exclusions.iter().cloned());

            for child in descriptor.dependencies {
                if matches!(child.scope, Scope::Test | Scope::Provided | Scope::Import) || child.optional {
                    continue;
                }
                if dependency.excludes(&child.coordinate)
                    || exclusions.iter().any(|e| e.matches(&child.coordinate))
                {
                    trace!(child = %child.coordinate, "Excluded");
                    continue;
                }
                let child = apply_management(child, &managed);
                let child_key = child.coordinate.key();
                if child_path.contains(&child_key) {
                    trace!(child = %child.coordinate, "Cycle, not following");
                    continue;
                }
                queue.push_back(Pending {
                    dependency: child,
                    depth: depth + 1,
                    parent: Some(key.clone()),
                    path: child_path.clone(),
                    exclusions: child_exclusions.clone(),
                    repositories: child_repositories.clone(),
                });
            }

            debug!(coordinate = %dependency.coordinate, depth, "Collected");
            winners.insert(
                key,
                Winner {
                    coordinate: dependency.coordinate,
                    depth,
                    declared: dependency.scope,
                    repositories,
                    occurrences: vec![(parent, dependency.scope)],
                },
            );
        }

        Ok(winners)
    }
}

fn apply_management(mut child: Dependency, managed: &HashMap<ArtifactKey, &Dependency>) -> Dependency {
    let Some(entry) = managed.get(&child.coordinate.key()) else {
        return child;
    };
    if !entry.coordinate.version.is_empty() && entry.coordinate.version != child.coordinate.version {
        trace!(
            child = %child.coordinate,
            managed = %entry.coordinate.version,
            "Applying managed version"
        );
        child.coordinate.version.clone_from(&entry.coordinate.version);
    }
    if entry.scope != Scope::Compile {
        child.scope = entry.scope;
    }
    for exclusion in &entry.exclusions {
        if !child.exclusions.contains(exclusion) {
            child.exclusions.push(exclusion.clone());
        }
    }
    child
}

/// Final scope per winner: direct winners keep their declared scope, others
/// take the widest scope derived over all their occurrences.
fn select_scopes(winners: &IndexMap<ArtifactKey, Winner>) -> HashMap<ArtifactKey, Scope> {
    let mut scopes: HashMap<ArtifactKey, Scope> = winners
        .iter()
        .filter(|(_, w)| w.depth == 1)
        .map(|(k, w)| (k.clone(), w.declared))
        .collect();

    for _ in 0..=winners.len() {
        let mut changed = false;
        for (key, winner) in winners.iter().filter(|(_, w)| w.depth > 1) {
            let derived = winner
                .occurrences
                .iter()
                .filter_map(|(parent, declared)| {
                    let parent_scope = scopes.get(parent.as_ref()?)?;
                    Some(parent_scope.derive(*declared))
                })
                .reduce(Scope::widest);
            if let Some(scope) = derived
                && scopes.get(key) != Some(&scope)
            {
                scopes.insert(key.clone(), scope);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    scopes
}

#[async_trait]
impl DependencyGraphEngine for MediatingGraphEngine {
    async fn resolve(&self, request: &CollectRequest, filter: &ScopeFilter) -> Result<Vec<ResolvedArtifact>> {
        let winners = self.collect(request).await?;
        let scopes = select_scopes(&winners);

        let mut resolved = Vec::new();
        for (key, winner) in winners {
            let Some(&scope) = scopes.get(&key) else {
                continue;
            };
            if !filter.accepts(scope) {
                trace!(coordinate = %winner.coordinate, %scope, "Outside requested scopes");
                continue;
            }
            let path = self
                .fetcher
                .fetch(&winner.coordinate, &winner.repositories)
                .await
                .map_err(|e| Error::dependency_resolution(winner.coordinate.to_string(), e.to_string()))?;
            resolved.push(ResolvedArtifact {
                coordinate: winner.coordinate,
                scope,
                path,
                depth: winner.depth,
            });
        }
        Ok(resolved)
    }
}
