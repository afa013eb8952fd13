//! Remote repository descriptions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// URL of Maven Central.
pub const CENTRAL_URL: &str = "https://repo1.maven.org/maven2/";

/// Id conventionally used for Maven Central.
pub const CENTRAL_ID: &str = "central";

/// Mirror that has stopped serving plain HTTP and should never be contacted.
pub const DEAD_CENTRAL_MIRROR: &str = "http://repo.maven.apache.org/maven2";

/// A named remote artifact repository.
///
/// `id` is the unique key within a resolver's repository list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteRepository {
    /// Repository id (e.g. `central`).
    pub id: String,
    /// Repository layout; only `default` is understood.
    #[serde(default = "default_layout")]
    pub layout: String,
    /// Base URL.
    pub url: String,
}

fn default_layout() -> String {
    "default".to_string()
}

impl RemoteRepository {
    /// Create a repository with the `default` layout.
    #[must_use]
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            layout: default_layout(),
            url: url.into(),
        }
    }

    /// Maven Central.
    #[must_use]
    pub fn central() -> Self {
        Self::new(CENTRAL_ID, CENTRAL_URL)
    }

    /// The URL with exactly one trailing slash, ready to have paths joined.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}/", self.url.trim_end_matches('/'))
    }

    /// Whether this repository stands in for `other` when deciding if a
    /// fallback needs to be added: same id, or both pointing at a Maven
    /// Central host.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        self.id == other.id || (is_central_url(&self.url) && is_central_url(&other.url))
    }

    /// Whether the URL matches one of the given dead mirror URLs, ignoring
    /// trailing slashes and case.
    #[must_use]
    pub fn is_dead(&self, dead_urls: &[String]) -> bool {
        let url = self.url.trim_end_matches('/');
        dead_urls
            .iter()
            .any(|dead| dead.trim_end_matches('/').eq_ignore_ascii_case(url))
    }
}

impl fmt::Display for RemoteRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.url)
    }
}

/// Whether a URL points at a Maven Central host.
#[must_use]
pub fn is_central_url(url: &str) -> bool {
    url.contains(".maven.org/maven2")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_central() {
        let central = RemoteRepository::central();
        assert_eq!(central.id, "central");
        assert_eq!(central.layout, "default");
        assert_eq!(central.base_url(), CENTRAL_URL);
    }

    #[test]
    fn test_base_url_adds_single_slash() {
        let repo = RemoteRepository::new("r", "https://example.com/repo");
        assert_eq!(repo.base_url(), "https://example.com/repo/");
        let repo = RemoteRepository::new("r", "https://example.com/repo//");
        assert_eq!(repo.base_url(), "https://example.com/repo/");
    }

    #[test]
    fn test_equivalence_by_id_or_central_host() {
        let central = RemoteRepository::central();
        let same_id = RemoteRepository::new("central", "https://mirror.example.com/m2");
        let other_central = RemoteRepository::new("maven", "https://repo.maven.org/maven2");
        let unrelated = RemoteRepository::new("internal", "https://nexus.example.com/repo");

        assert!(central.is_equivalent_to(&same_id));
        assert!(central.is_equivalent_to(&other_central));
        assert!(!central.is_equivalent_to(&unrelated));
    }

    #[test]
    fn test_dead_mirror_detection() {
        let dead = vec![DEAD_CENTRAL_MIRROR.to_string()];
        assert!(RemoteRepository::new("x", "http://repo.maven.apache.org/maven2/").is_dead(&dead));
        assert!(!RemoteRepository::central().is_dead(&dead));
    }

    #[test]
    fn test_layout_defaults_when_deserialized() {
        let repo: RemoteRepository =
            toml::from_str("id = \"r\"\nurl = \"https://example.com\"").unwrap();
        assert_eq!(repo.layout, "default");
    }
}
