//! Effective project model types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use mavenkit_core::{Coordinate, Error, RemoteRepository};

/// Dependency scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Available everywhere, propagated transitively.
    #[default]
    Compile,
    /// Supplied by the runtime environment.
    Provided,
    /// Needed to run, not to compile.
    Runtime,
    /// Needed only by tests.
    Test,
    /// Supplied from an explicit local path.
    System,
    /// Imports a BOM's dependency management.
    Import,
}

impl Scope {
    /// Rank used when several paths reach the same artifact: wider wins.
    /// `compile > runtime > provided = system > test`.
    #[must_use]
    pub const fn width(self) -> u8 {
        match self {
            Self::Compile => 4,
            Self::Runtime => 3,
            Self::Provided | Self::System => 2,
            Self::Test => 1,
            Self::Import => 0,
        }
    }

    /// The scope a child declared with `child` gets below a node in `self`.
    #[must_use]
    pub const fn derive(self, child: Self) -> Self {
        match (self, child) {
            (_, Self::System | Self::Test) | (Self::Compile, _) => child,
            (Self::Test | Self::Runtime, _) => self,
            (Self::System | Self::Provided, _) => Self::Provided,
            _ => Self::Runtime,
        }
    }

    /// The wider of two scopes.
    #[must_use]
    pub const fn widest(self, other: Self) -> Self {
        if other.width() > self.width() { other } else { self }
    }

    /// Lowercase name as written in a POM.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Provided => "provided",
            Self::Runtime => "runtime",
            Self::Test => "test",
            Self::System => "system",
            Self::Import => "import",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "compile" => Ok(Self::Compile),
            "provided" => Ok(Self::Provided),
            "runtime" => Ok(Self::Runtime),
            "test" => Ok(Self::Test),
            "system" => Ok(Self::System),
            "import" => Ok(Self::Import),
            other => Err(Error::config_build(format!("Unknown dependency scope '{other}'"))),
        }
    }
}

/// A `groupId:artifactId` pattern removed from a dependency's subtree.
/// Either part may be `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exclusion {
    /// Group pattern.
    pub group_id: String,
    /// Artifact pattern.
    pub artifact_id: String,
}

impl Exclusion {
    /// Create an exclusion.
    #[must_use]
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    /// Whether this exclusion removes `coordinate`.
    #[must_use]
    pub fn matches(&self, coordinate: &Coordinate) -> bool {
        (self.group_id == "*" || self.group_id == coordinate.group_id)
            && (self.artifact_id == "*" || self.artifact_id == coordinate.artifact_id)
    }
}

/// Where a dependency entry came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyOrigin {
    /// Declared in the project or inherited from a parent's `<dependencies>`.
    #[default]
    Declared,
    /// Synthesized for the project's parent.
    Parent,
}

/// One dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Target artifact.
    pub coordinate: Coordinate,
    /// Declared scope.
    pub scope: Scope,
    /// Optional dependencies are not followed transitively.
    pub optional: bool,
    /// Artifacts removed from this dependency's subtree.
    pub exclusions: Vec<Exclusion>,
    /// Origin of the entry.
    pub origin: DependencyOrigin,
}

impl Dependency {
    /// A compile-scoped, non-optional dependency.
    #[must_use]
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            scope: Scope::Compile,
            optional: false,
            exclusions: Vec::new(),
            origin: DependencyOrigin::Declared,
        }
    }

    /// Set the scope.
    #[must_use]
    pub const fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Mark optional.
    #[must_use]
    pub const fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Add an exclusion.
    #[must_use]
    pub fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        self.exclusions.push(exclusion);
        self
    }

    /// Whether any of this dependency's exclusions removes `coordinate`.
    #[must_use]
    pub fn excludes(&self, coordinate: &Coordinate) -> bool {
        self.exclusions.iter().any(|e| e.matches(coordinate))
    }
}

/// Reference to a parent project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    /// Parent group.
    pub group_id: String,
    /// Parent artifact.
    pub artifact_id: String,
    /// Parent version.
    pub version: String,
    /// Where to look for the parent on disk before asking repositories.
    pub relative_path: Option<String>,
}

impl ParentRef {
    /// The parent's POM coordinate.
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(&self.group_id, &self.artifact_id, &self.version).with_extension("pom")
    }
}

/// Compiled output locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDirectories {
    /// Main classes, `target/classes` by default.
    pub output_directory: PathBuf,
    /// Test classes, `target/test-classes` by default.
    pub test_output_directory: PathBuf,
}

/// A project model after inheritance, interpolation and BOM import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveModel {
    /// The project's own coordinate (extension `pom`).
    pub coordinate: Coordinate,
    /// Packaging, `jar` by default.
    pub packaging: String,
    /// Parent reference, if any.
    pub parent: Option<ParentRef>,
    /// Dependencies with versions filled in from dependency management.
    pub dependencies: Vec<Dependency>,
    /// Managed dependencies, BOM imports already expanded.
    pub dependency_management: Vec<Dependency>,
    /// Declared repositories, child first.
    pub repositories: Vec<RemoteRepository>,
    /// Merged properties.
    pub properties: IndexMap<String, String>,
    /// Output directories.
    pub build: BuildDirectories,
}

/// Map a dependency `type` to the file extension and implied classifier.
#[must_use]
pub fn artifact_type(type_name: &str) -> (&str, Option<&'static str>) {
    match type_name {
        "" | "jar" | "maven-plugin" | "ejb" | "bundle" => ("jar", None),
        "test-jar" => ("jar", Some("tests")),
        "ejb-client" => ("jar", Some("client")),
        "java-source" => ("jar", Some("sources")),
        "javadoc" => ("jar", Some("javadoc")),
        other => (other, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parse() {
        assert_eq!("".parse::<Scope>().unwrap(), Scope::Compile);
        assert_eq!(" test ".parse::<Scope>().unwrap(), Scope::Test);
        assert_eq!("import".parse::<Scope>().unwrap(), Scope::Import);
        assert_eq!("Runtime".parse::<Scope>().unwrap(), Scope::Runtime);
        assert_eq!("PROVIDED".parse::<Scope>().unwrap(), Scope::Provided);
        assert!("bogus".parse::<Scope>().is_err());
    }

    #[test]
    fn test_scope_derivation() {
        use Scope::{Compile, Provided, Runtime, System, Test};
        assert_eq!(Compile.derive(Compile), Compile);
        assert_eq!(Compile.derive(Runtime), Runtime);
        assert_eq!(Runtime.derive(Compile), Runtime);
        assert_eq!(Test.derive(Compile), Test);
        assert_eq!(Test.derive(Runtime), Test);
        assert_eq!(Provided.derive(Compile), Provided);
        assert_eq!(Provided.derive(Runtime), Provided);
        assert_eq!(System.derive(Compile), Provided);
        assert_eq!(Runtime.derive(System), System);
    }

    #[test]
    fn test_scope_width() {
        assert_eq!(Scope::Runtime.widest(Scope::Compile), Scope::Compile);
        assert_eq!(Scope::Test.widest(Scope::Provided), Scope::Provided);
        assert_eq!(Scope::Runtime.widest(Scope::Test), Scope::Runtime);
        assert_eq!(Scope::Provided.widest(Scope::System), Scope::Provided);
    }

    #[test]
    fn test_exclusion_wildcards() {
        let c = Coordinate::new("org.slf4j", "slf4j-api", "1.0");
        assert!(Exclusion::new("org.slf4j", "slf4j-api").matches(&c));
        assert!(Exclusion::new("org.slf4j", "*").matches(&c));
        assert!(Exclusion::new("*", "*").matches(&c));
        assert!(!Exclusion::new("org.slf4j", "jcl-over-slf4j").matches(&c));
    }

    #[test]
    fn test_artifact_type_mapping() {
        assert_eq!(artifact_type("jar"), ("jar", None));
        assert_eq!(artifact_type("test-jar"), ("jar", Some("tests")));
        assert_eq!(artifact_type("maven-plugin"), ("jar", None));
        assert_eq!(artifact_type("pom"), ("pom", None));
        assert_eq!(artifact_type("war"), ("war", None));
    }
}
