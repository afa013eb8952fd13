//! Raw POM documents, before inheritance and interpolation.

use indexmap::IndexMap;
use roxmltree::Node;
use std::path::Path;

use mavenkit_core::{Error, RemoteRepository, Result};

use crate::model::{Exclusion, ParentRef};
use crate::xml::{child, child_text, elements_at, parse_document};

/// A `<dependency>` element with its values still uninterpolated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub type_name: Option<String>,
    pub classifier: Option<String>,
    pub scope: Option<String>,
    pub optional: Option<String>,
    pub exclusions: Vec<Exclusion>,
}

impl RawDependency {
    /// `groupId:artifactId:type[:classifier]`, the key management matches on.
    pub fn management_key(&self) -> String {
        let mut key = format!(
            "{}:{}:{}",
            self.group_id,
            self.artifact_id,
            self.type_name.as_deref().unwrap_or("jar")
        );
        if let Some(classifier) = &self.classifier {
            key.push(':');
            key.push_str(classifier);
        }
        key
    }
}

/// `<build>` directories as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBuild {
    pub directory: Option<String>,
    pub output_directory: Option<String>,
    pub test_output_directory: Option<String>,
}

/// A POM as written on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawModel {
    pub parent: Option<ParentRef>,
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub properties: IndexMap<String, String>,
    pub dependencies: Vec<RawDependency>,
    pub dependency_management: Vec<RawDependency>,
    pub repositories: Vec<RemoteRepository>,
    pub build: RawBuild,
}

impl RawModel {
    /// Read and parse a POM file.
    pub async fn read(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io(e, Some(path.to_path_buf()), "reading POM"))?;
        Self::parse(&text, path)
    }

    /// Parse POM text. `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let doc = parse_document(text, path)?;
        let project = doc.root_element();
        if !project.has_tag_name("project") {
            return Err(Error::config_build(format!(
                "{} is not a POM: root element is <{}>",
                path.display(),
                project.tag_name().name()
            )));
        }

        let parent = child(project, "parent")
            .map(|p| parse_parent(p, path))
            .transpose()?;

        let properties = child(project, "properties")
            .map(|props| {
                props
                    .children()
                    .filter(Node::is_element)
                    .map(|n| {
                        (
                            n.tag_name().name().to_string(),
                            n.text().map(str::trim).unwrap_or_default().to_string(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        let dependencies = elements_at(project, &["dependencies", "dependency"])
            .into_iter()
            .map(parse_dependency)
            .collect();
        let dependency_management =
            elements_at(project, &["dependencyManagement", "dependencies", "dependency"])
                .into_iter()
                .map(parse_dependency)
                .collect();

        let repositories = elements_at(project, &["repositories", "repository"])
            .into_iter()
            .filter_map(|r| {
                let id = child_text(r, "id")?;
                let url = child_text(r, "url")?;
                let mut repo = RemoteRepository::new(id, url);
                if let Some(layout) = child_text(r, "layout") {
                    repo.layout = layout;
                }
                Some(repo)
            })
            .collect();

        let build = child(project, "build")
            .map(|b| RawBuild {
                directory: child_text(b, "directory"),
                output_directory: child_text(b, "outputDirectory"),
                test_output_directory: child_text(b, "testOutputDirectory"),
            })
            .unwrap_or_default();

        Ok(Self {
            parent,
            group_id: child_text(project, "groupId"),
            artifact_id: child_text(project, "artifactId"),
            version: child_text(project, "version"),
            packaging: child_text(project, "packaging"),
            properties,
            dependencies,
            dependency_management,
            repositories,
            build,
        })
    }

    /// Group, falling back to the parent's.
    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or_else(|| self.parent.as_ref().map(|p| p.group_id.as_str()))
    }

    /// Version, falling back to the parent's.
    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.parent.as_ref().map(|p| p.version.as_str()))
    }
}

fn parse_parent(node: Node<'_, '_>, path: &Path) -> Result<ParentRef> {
    let missing = |field: &str| {
        Error::config_build(format!(
            "{}: parent.{field} is missing",
            path.display()
        ))
    };
    Ok(ParentRef {
        group_id: child_text(node, "groupId").ok_or_else(|| missing("groupId"))?,
        artifact_id: child_text(node, "artifactId").ok_or_else(|| missing("artifactId"))?,
        version: child_text(node, "version").ok_or_else(|| missing("version"))?,
        // An empty <relativePath/> disables the filesystem lookup.
        relative_path: child(node, "relativePath")
            .map(|n| n.text().map(str::trim).unwrap_or_default().to_string()),
    })
}

fn parse_dependency(node: Node<'_, '_>) -> RawDependency {
    let exclusions = elements_at(node, &["exclusions", "exclusion"])
        .into_iter()
        .filter_map(|e| {
            Some(Exclusion::new(
                child_text(e, "groupId")?,
                child_text(e, "artifactId").unwrap_or_else(|| "*".to_string()),
            ))
        })
        .collect();

    RawDependency {
        group_id: child_text(node, "groupId").unwrap_or_default(),
        artifact_id: child_text(node, "artifactId").unwrap_or_default(),
        version: child_text(node, "version"),
        type_name: child_text(node, "type"),
        classifier: child_text(node, "classifier"),
        scope: child_text(node, "scope"),
        optional: child_text(node, "optional"),
        exclusions,
    }
}
