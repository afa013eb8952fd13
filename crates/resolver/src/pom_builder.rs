//! Default [`ModelBuilder`]: a reduced effective-model builder.
//!
//! Supported: parent inheritance (via `relativePath` or the resolver),
//! `${...}` interpolation, BOM import, managed version injection and default
//! build directories. Profiles, version ranges and plugin configuration are
//! not modelled.

use async_recursion::async_recursion;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use mavenkit_core::{ArtifactKey, Coordinate, Error, RemoteRepository, Result};

use crate::model::{
    BuildDirectories, Dependency, DependencyOrigin, EffectiveModel, Exclusion, ParentRef, Scope,
    artifact_type,
};
use crate::model_builder::{ModelBuilder, ModelBuildingRequest, ModelResolver};
use crate::pom::{RawBuild, RawDependency, RawModel};

const MAX_LINEAGE: usize = 32;
const MAX_IMPORT_DEPTH: usize = 16;
const MAX_INTERPOLATION_DEPTH: usize = 10;

/// Builds effective models from POM files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PomModelBuilder;

impl PomModelBuilder {
    /// Create a builder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModelBuilder for PomModelBuilder {
    async fn build(&self, request: &ModelBuildingRequest<'_>) -> Result<EffectiveModel> {
        build_model(&request.pom_file, request, 0).await
    }
}

/// The inheritance-merged, not yet interpolated model.
#[derive(Debug, Default)]
struct Merged {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    packaging: Option<String>,
    parent: Option<ParentRef>,
    properties: IndexMap<String, String>,
    dependencies: Vec<RawDependency>,
    dependency_management: Vec<RawDependency>,
    repositories: Vec<RemoteRepository>,
    build: RawBuild,
}

#[async_recursion]
async fn build_model<'r>(
    pom: &Path,
    request: &ModelBuildingRequest<'r>,
    import_depth: usize,
) -> Result<EffectiveModel> {
    debug!(pom = %pom.display(), "Building effective model");
    let lineage = read_lineage(pom, request.resolver).await?;
    let merged = merge(lineage);

    let basedir = pom
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let basedir = std::path::absolute(&basedir).unwrap_or(basedir);

    let interpolator = Interpolator::new(&merged, &basedir, &request.system_properties);
    let group_id = required(merged.group_id.as_deref(), "groupId", pom, &interpolator)?;
    let artifact_id = required(merged.artifact_id.as_deref(), "artifactId", pom, &interpolator)?;
    let version = required(merged.version.as_deref(), "version", pom, &interpolator)?;
    let packaging = merged
        .packaging
        .as_deref()
        .map_or_else(|| "jar".to_string(), |p| interpolator.interpolate(p));

    // Local management first, then BOM imports in declaration order.
    let mut management: IndexMap<ArtifactKey, Dependency> = IndexMap::new();
    let mut imports = Vec::new();
    for raw in &merged.dependency_management {
        let raw = interpolator.interpolate_dependency(raw);
        if raw.scope.as_deref() == Some("import") && raw.type_name.as_deref() == Some("pom") {
            imports.push(raw);
            continue;
        }
        if let Some(dep) = to_dependency(&raw, raw.version.clone().unwrap_or_default(), pom, request.lenient)? {
            management.entry(dep.coordinate.key()).or_insert(dep);
        }
    }
    for bom in imports {
        let Some(version) = bom.version.clone() else {
            return Err(Error::config_build(format!(
                "{}: imported BOM {}:{} has no version",
                pom.display(),
                bom.group_id,
                bom.artifact_id
            )));
        };
        if import_depth >= MAX_IMPORT_DEPTH {
            return Err(Error::config_build(format!(
                "{}: BOM imports nested too deeply at {}:{}",
                pom.display(),
                bom.group_id,
                bom.artifact_id
            )));
        }
        let coordinate =
            Coordinate::new(&bom.group_id, &bom.artifact_id, version).with_extension("pom");
        debug!(bom = %coordinate, "Importing dependency management");
        let bom_path = request.resolver.resolve_pom(&coordinate).await?;
        let bom_model = build_model(&bom_path, request, import_depth + 1).await?;
        for dep in bom_model.dependency_management {
            management.entry(dep.coordinate.key()).or_insert(dep);
        }
    }

    let mut dependencies = Vec::new();
    for raw in &merged.dependencies {
        let raw = interpolator.interpolate_dependency(raw);
        let key = raw_key(&raw);
        let managed = management.get(&key);
        let version = raw
            .version
            .clone()
            .or_else(|| managed.map(|m| m.coordinate.version.clone()))
            .filter(|v| !v.is_empty());
        let Some(version) = version else {
            let message = format!(
                "{}: 'dependencies.dependency.version' for {} is missing",
                pom.display(),
                raw.management_key()
            );
            if request.lenient {
                warn!("{message}");
                continue;
            }
            return Err(Error::config_build(message));
        };
        let Some(mut dep) = to_dependency(&raw, version, pom, request.lenient)? else {
            continue;
        };
        if let Some(managed) = managed {
            if raw.scope.is_none() {
                dep.scope = managed.scope;
            }
            for exclusion in &managed.exclusions {
                if !dep.exclusions.contains(exclusion) {
                    dep.exclusions.push(exclusion.clone());
                }
            }
        }
        dependencies.push(dep);
    }

    let repositories = merged
        .repositories
        .iter()
        .map(|r| {
            let mut repo = r.clone();
            repo.url = interpolator.interpolate(&r.url);
            repo
        })
        .collect();

    let build = build_directories(&merged.build, &basedir, &interpolator);

    let mut properties = IndexMap::new();
    for (k, v) in &merged.properties {
        properties.insert(k.clone(), interpolator.interpolate(v));
    }

    Ok(EffectiveModel {
        coordinate: Coordinate::new(group_id, artifact_id, version).with_extension("pom"),
        packaging,
        parent: merged.parent,
        dependencies,
        dependency_management: management.into_values().collect(),
        repositories,
        properties,
        build,
    })
}

fn required(value: Option<&str>, field: &str, pom: &Path, interpolator: &Interpolator) -> Result<String> {
    value
        .map(|v| interpolator.interpolate(v))
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::config_build(format!("{}: project.{field} is missing", pom.display())))
}

/// Read `pom` and its ancestors, child first.
async fn read_lineage(pom: &Path, resolver: &dyn ModelResolver) -> Result<Vec<RawModel>> {
    let mut lineage = Vec::new();
    let mut seen = HashSet::new();
    let mut path = pom.to_path_buf();

    loop {
        let raw = RawModel::read(&path).await?;
        for repository in &raw.repositories {
            resolver.add_repository(repository.clone());
        }
        let parent = raw.parent.clone();
        lineage.push(raw);

        let Some(parent) = parent else { break };
        if lineage.len() >= MAX_LINEAGE || !seen.insert(parent.coordinate().key()) {
            return Err(Error::config_build(format!(
                "{}: parent chain is cyclic or too deep at {}",
                pom.display(),
                parent.coordinate()
            )));
        }
        path = locate_parent(&path, &parent, resolver).await?;
    }

    Ok(lineage)
}

async fn locate_parent(child: &Path, parent: &ParentRef, resolver: &dyn ModelResolver) -> Result<PathBuf> {
    let relative = parent.relative_path.as_deref().unwrap_or("../pom.xml");
    if !relative.is_empty() {
        let dir = child.parent().unwrap_or_else(|| Path::new("."));
        let mut candidate = dir.join(relative);
        if candidate.is_dir() {
            candidate.push("pom.xml");
        }
        if candidate.is_file()
            && let Ok(raw) = RawModel::read(&candidate).await
            && raw.effective_group_id() == Some(parent.group_id.as_str())
            && raw.artifact_id.as_deref() == Some(parent.artifact_id.as_str())
            && raw.effective_version() == Some(parent.version.as_str())
        {
            trace!(parent = %candidate.display(), "Parent found on disk");
            return Ok(candidate);
        }
    }
    debug!(parent = %parent.coordinate(), "Resolving parent from repositories");
    resolver.resolve_pom(&parent.coordinate()).await
}

/// Apply inheritance from the root ancestor down to the leaf.
fn merge(lineage: Vec<RawModel>) -> Merged {
    let mut merged = Merged::default();
    for (i, raw) in lineage.into_iter().rev().enumerate() {
        let leaf_parent = raw.parent.clone();
        merged.group_id = raw
            .group_id
            .clone()
            .or_else(|| merged.group_id.take())
            .or_else(|| raw.parent.as_ref().map(|p| p.group_id.clone()));
        merged.version = raw
            .version
            .clone()
            .or_else(|| merged.version.take())
            .or_else(|| raw.parent.as_ref().map(|p| p.version.clone()));
        merged.artifact_id = raw.artifact_id;
        merged.packaging = raw.packaging;
        merged.parent = leaf_parent;
        merged.properties.extend(raw.properties);
        merged.dependencies = child_first(raw.dependencies, std::mem::take(&mut merged.dependencies));
        merged.dependency_management = child_first(
            raw.dependency_management,
            std::mem::take(&mut merged.dependency_management),
        );

        let mut repositories = raw.repositories;
        for inherited in std::mem::take(&mut merged.repositories) {
            if repositories.iter().all(|r| r.id != inherited.id) {
                repositories.push(inherited);
            }
        }
        merged.repositories = repositories;

        merged.build = RawBuild {
            directory: raw.build.directory.or(merged.build.directory.take()),
            output_directory: raw.build.output_directory.or(merged.build.output_directory.take()),
            test_output_directory: raw
                .build
                .test_output_directory
                .or(merged.build.test_output_directory.take()),
        };
        trace!(depth = i, "Merged ancestor");
    }
    merged
}

/// The child's entries in order, then inherited entries the child does not
/// redeclare.
fn child_first(child: Vec<RawDependency>, inherited: Vec<RawDependency>) -> Vec<RawDependency> {
    let keys: HashSet<String> = child.iter().map(RawDependency::management_key).collect();
    let mut result = child;
    result.extend(
        inherited
            .into_iter()
            .filter(|d| !keys.contains(&d.management_key())),
    );
    result
}

fn raw_key(raw: &RawDependency) -> ArtifactKey {
    let (extension, implied) = artifact_type(raw.type_name.as_deref().unwrap_or("jar"));
    ArtifactKey {
        group_id: raw.group_id.clone(),
        artifact_id: raw.artifact_id.clone(),
        classifier: raw.classifier.clone().or_else(|| implied.map(str::to_string)),
        extension: extension.to_string(),
    }
}

fn to_dependency(raw: &RawDependency, version: String, pom: &Path, lenient: bool) -> Result<Option<Dependency>> {
    let fail = |message: String| {
        if lenient {
            warn!("{message}");
            Ok(None)
        } else {
            Err(Error::config_build(message))
        }
    };

    if raw.group_id.is_empty() || raw.artifact_id.is_empty() {
        return fail(format!(
            "{}: dependency '{}' lacks a groupId or artifactId",
            pom.display(),
            raw.management_key()
        ));
    }
    let scope = match raw.scope.as_deref().map(str::parse::<Scope>).transpose() {
        Ok(scope) => scope.unwrap_or_default(),
        Err(e) => return fail(format!("{}: {e}", pom.display())),
    };

    let key = raw_key(raw);
    let coordinate = Coordinate::new(key.group_id, key.artifact_id, version)
        .with_extension(key.extension)
        .with_classifier(key.classifier);
    Ok(Some(Dependency {
        coordinate,
        scope,
        optional: raw
            .optional
            .as_deref()
            .is_some_and(|o| o.trim().eq_ignore_ascii_case("true")),
        exclusions: raw.exclusions.clone(),
        origin: DependencyOrigin::Declared,
    }))
}

fn build_directories(build: &RawBuild, basedir: &Path, interpolator: &Interpolator) -> BuildDirectories {
    let resolve = |value: &str| {
        let path = PathBuf::from(interpolator.interpolate(value));
        if path.is_absolute() { path } else { basedir.join(path) }
    };
    let target = build
        .directory
        .as_deref()
        .map_or_else(|| basedir.join("target"), resolve);
    BuildDirectories {
        output_directory: build
            .output_directory
            .as_deref()
            .map_or_else(|| target.join("classes"), resolve),
        test_output_directory: build
            .test_output_directory
            .as_deref()
            .map_or_else(|| target.join("test-classes"), resolve),
    }
}

/// Expands `${...}` expressions: `project.*`/`pom.*` first, then model
/// properties, then system properties. Unknown expressions stay as written.
struct Interpolator {
    project: BTreeMap<String, String>,
    properties: IndexMap<String, String>,
    system: BTreeMap<String, String>,
}

impl Interpolator {
    fn new(merged: &Merged, basedir: &Path, system: &BTreeMap<String, String>) -> Self {
        let mut project = BTreeMap::new();
        let mut set = |key: &str, value: Option<&str>| {
            if let Some(value) = value {
                project.insert(format!("project.{key}"), value.to_string());
                project.insert(format!("pom.{key}"), value.to_string());
            }
        };
        set("groupId", merged.group_id.as_deref());
        set("artifactId", merged.artifact_id.as_deref());
        set("version", merged.version.as_deref());
        set("packaging", Some(merged.packaging.as_deref().unwrap_or("jar")));
        set("basedir", basedir.to_str());
        if let Some(parent) = &merged.parent {
            set("parent.groupId", Some(parent.group_id.as_str()));
            set("parent.artifactId", Some(parent.artifact_id.as_str()));
            set("parent.version", Some(parent.version.as_str()));
        }
        if let Some(dir) = basedir.to_str() {
            project.insert("basedir".to_string(), dir.to_string());
        }
        Self {
            project,
            properties: merged.properties.clone(),
            system: system.clone(),
        }
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.project
            .get(key)
            .or_else(|| self.properties.get(key))
            .or_else(|| self.system.get(key))
            .map(String::as_str)
    }

    fn interpolate(&self, value: &str) -> String {
        self.expand(value, 0)
    }

    fn expand(&self, value: &str, depth: usize) -> String {
        let mut out = String::with_capacity(value.len());
        let mut rest = value;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };
            let key = &after[..end];
            match self.lookup(key) {
                Some(found) if depth < MAX_INTERPOLATION_DEPTH => {
                    out.push_str(&self.expand(found, depth + 1));
                }
                _ => {
                    out.push_str("${");
                    out.push_str(key);
                    out.push('}');
                }
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }

    fn interpolate_opt(&self, value: Option<&String>) -> Option<String> {
        value
            .map(|v| self.interpolate(v))
            .filter(|v| !v.trim().is_empty())
    }

    fn interpolate_dependency(&self, raw: &RawDependency) -> RawDependency {
        RawDependency {
            group_id: self.interpolate(&raw.group_id),
            artifact_id: self.interpolate(&raw.artifact_id),
            version: self.interpolate_opt(raw.version.as_ref()),
            type_name: self.interpolate_opt(raw.type_name.as_ref()),
            classifier: self.interpolate_opt(raw.classifier.as_ref()),
            scope: self.interpolate_opt(raw.scope.as_ref()),
            optional: self.interpolate_opt(raw.optional.as_ref()),
            exclusions: raw
                .exclusions
                .iter()
                .map(|e| Exclusion::new(self.interpolate(&e.group_id), self.interpolate(&e.artifact_id)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_builder::ParentAsDependency;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serves POMs from a fixed map and records added repositories.
    #[derive(Default)]
    struct MapResolver {
        poms: HashMap<String, PathBuf>,
        added: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ModelResolver for MapResolver {
        async fn resolve_pom(&self, coordinate: &Coordinate) -> Result<PathBuf> {
            self.poms
                .get(&coordinate.to_string())
                .cloned()
                .ok_or_else(|| Error::not_found(coordinate.to_string()))
        }

        fn add_repository(&self, repository: RemoteRepository) {
            self.added.lock().unwrap().push(repository.id);
        }
    }

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    async fn build(pom: &Path, resolver: &MapResolver) -> Result<EffectiveModel> {
        let request = ModelBuildingRequest::new(pom, resolver);
        PomModelBuilder::new().build(&request).await
    }

    const PARENT: &str = r"<project>
  <groupId>com.example</groupId>
  <artifactId>parent</artifactId>
  <version>1.0</version>
  <packaging>pom</packaging>
  <properties>
    <lib.version>2.5</lib.version>
    <shared>from-parent</shared>
  </properties>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>com.example</groupId>
        <artifactId>managed</artifactId>
        <version>${lib.version}</version>
        <scope>runtime</scope>
        <exclusions>
          <exclusion><groupId>commons-logging</groupId><artifactId>commons-logging</artifactId></exclusion>
        </exclusions>
      </dependency>
    </dependencies>
  </dependencyManagement>
  <dependencies>
    <dependency>
      <groupId>com.example</groupId>
      <artifactId>inherited</artifactId>
      <version>1.1</version>
    </dependency>
  </dependencies>
  <repositories>
    <repository><id>parent-repo</id><url>https://parent.example.com/repo</url></repository>
  </repositories>
</project>";

    const CHILD: &str = r"<project>
  <parent>
    <groupId>com.example</groupId>
    <artifactId>parent</artifactId>
    <version>1.0</version>
  </parent>
  <artifactId>app</artifactId>
  <properties>
    <shared>from-child</shared>
  </properties>
  <dependencies>
    <dependency>
      <groupId>com.example</groupId>
      <artifactId>managed</artifactId>
    </dependency>
    <dependency>
      <groupId>com.example</groupId>
      <artifactId>tools</artifactId>
      <version>${project.version}-${shared}</version>
      <type>test-jar</type>
      <scope>test</scope>
      <optional>true</optional>
    </dependency>
  </dependencies>
</project>";

    #[tokio::test]
    async fn test_parent_from_relative_path() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "pom.xml", PARENT);
        let pom = write(tmp.path(), "app/pom.xml", CHILD);
        let resolver = MapResolver::default();

        let model = build(&pom, &resolver).await.unwrap();
        assert_eq!(model.coordinate.to_string(), "com.example:app:pom:1.0");
        assert_eq!(model.packaging, "jar");
        assert_eq!(model.properties["shared"], "from-child");
        assert_eq!(resolver.added.lock().unwrap().clone(), vec!["parent-repo"]);

        let coords: Vec<String> = model
            .dependencies
            .iter()
            .map(|d| d.coordinate.to_string())
            .collect();
        assert_eq!(
            coords,
            vec![
                "com.example:managed:jar:2.5",
                "com.example:tools:jar:tests:1.0-from-child",
                "com.example:inherited:jar:1.1",
            ]
        );

        let managed = &model.dependencies[0];
        assert_eq!(managed.scope, Scope::Runtime);
        assert_eq!(
            managed.exclusions,
            vec![Exclusion::new("commons-logging", "commons-logging")]
        );
        let tools = &model.dependencies[1];
        assert_eq!(tools.scope, Scope::Test);
        assert!(tools.optional);

        assert_eq!(model.repositories[0].id, "parent-repo");
        let base = std::path::absolute(tmp.path().join("app")).unwrap();
        assert_eq!(model.build.output_directory, base.join("target").join("classes"));
        assert_eq!(
            model.build.test_output_directory,
            base.join("target").join("test-classes")
        );
    }

    #[tokio::test]
    async fn test_parent_from_resolver_when_not_on_disk() {
        let tmp = TempDir::new().unwrap();
        let parent = write(tmp.path(), "repo/parent-1.0.pom", PARENT);
        let pom = write(tmp.path(), "app/pom.xml", CHILD);
        let mut resolver = MapResolver::default();
        resolver
            .poms
            .insert("com.example:parent:pom:1.0".to_string(), parent);

        let model = build(&pom, &resolver).await.unwrap();
        assert_eq!(model.parent.as_ref().unwrap().artifact_id, "parent");
        assert_eq!(model.dependencies.len(), 3);
    }

    #[tokio::test]
    async fn test_unresolvable_parent_fails() {
        let tmp = TempDir::new().unwrap();
        let pom = write(tmp.path(), "app/pom.xml", CHILD);
        let err = build(&pom, &MapResolver::default()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_bom_import() {
        let tmp = TempDir::new().unwrap();
        let bom = write(
            tmp.path(),
            "repo/bom-3.pom",
            r"<project><groupId>com.example</groupId><artifactId>bom</artifactId><version>3</version>
              <dependencyManagement><dependencies>
                <dependency><groupId>org.lib</groupId><artifactId>a</artifactId><version>3.0</version></dependency>
                <dependency><groupId>org.lib</groupId><artifactId>b</artifactId><version>3.0</version></dependency>
              </dependencies></dependencyManagement></project>",
        );
        let pom = write(
            tmp.path(),
            "app/pom.xml",
            r"<project><groupId>com.example</groupId><artifactId>app</artifactId><version>1</version>
              <dependencyManagement><dependencies>
                <dependency><groupId>org.lib</groupId><artifactId>b</artifactId><version>9.9</version></dependency>
                <dependency><groupId>com.example</groupId><artifactId>bom</artifactId><version>3</version>
                  <type>pom</type><scope>import</scope></dependency>
              </dependencies></dependencyManagement>
              <dependencies>
                <dependency><groupId>org.lib</groupId><artifactId>a</artifactId></dependency>
                <dependency><groupId>org.lib</groupId><artifactId>b</artifactId></dependency>
              </dependencies></project>",
        );
        let mut resolver = MapResolver::default();
        resolver.poms.insert("com.example:bom:pom:3".to_string(), bom);

        let model = build(&pom, &resolver).await.unwrap();
        let versions: Vec<&str> = model
            .dependencies
            .iter()
            .map(|d| d.coordinate.version.as_str())
            .collect();
        assert_eq!(versions, vec!["3.0", "9.9"]);
        assert!(
            model
                .dependency_management
                .iter()
                .all(|d| d.scope != Scope::Import)
        );
    }

    #[tokio::test]
    async fn test_missing_version_fails_unless_lenient() {
        let tmp = TempDir::new().unwrap();
        let pom = write(
            tmp.path(),
            "pom.xml",
            r"<project><groupId>g</groupId><artifactId>a</artifactId><version>1</version>
              <dependencies><dependency><groupId>x</groupId><artifactId>y</artifactId></dependency></dependencies>
              </project>",
        );
        let resolver = MapResolver::default();
        let err = build(&pom, &resolver).await.unwrap_err();
        assert!(matches!(err, Error::ConfigBuild { .. }));
        assert!(err.to_string().contains("x:y:jar"));

        let request = ModelBuildingRequest::new(&pom, &resolver).with_lenient(true);
        let model = PomModelBuilder::new().build(&request).await.unwrap();
        assert!(model.dependencies.is_empty());
    }

    #[tokio::test]
    async fn test_system_properties_and_unknown_expressions() {
        let tmp = TempDir::new().unwrap();
        let pom = write(
            tmp.path(),
            "pom.xml",
            r"<project><groupId>g</groupId><artifactId>a</artifactId><version>${revision}</version>
              <properties><loop>${loop}</loop></properties>
              <dependencies>
                <dependency><groupId>x</groupId><artifactId>y</artifactId><version>${undefined}</version></dependency>
                <dependency><groupId>x</groupId><artifactId>z</artifactId><version>${loop}</version></dependency>
              </dependencies></project>",
        );
        let resolver = MapResolver::default();
        let mut props = BTreeMap::new();
        props.insert("revision".to_string(), "4.2".to_string());
        let request = ModelBuildingRequest::new(&pom, &resolver).with_system_properties(props);
        let model = PomModelBuilder::new().build(&request).await.unwrap();

        assert_eq!(model.coordinate.version, "4.2");
        assert_eq!(model.dependencies[0].coordinate.version, "${undefined}");
        assert!(model.dependencies[1].coordinate.version.contains("${loop}"));
    }

    #[tokio::test]
    async fn test_parent_as_dependency() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "pom.xml", PARENT);
        let pom = write(tmp.path(), "app/pom.xml", CHILD);
        let resolver = MapResolver::default();

        let request = ModelBuildingRequest::new(&pom, &resolver);
        let model = ParentAsDependency::new(PomModelBuilder::new())
            .build(&request)
            .await
            .unwrap();
        let last = model.dependencies.last().unwrap();
        assert_eq!(last.origin, DependencyOrigin::Parent);
        assert_eq!(last.scope, Scope::Compile);
        assert_eq!(last.coordinate.to_string(), "com.example:parent:pom:1.0");
    }
}
