//! Reading `maven-metadata.xml`.

use mavenkit_core::{Error, Result};

/// The parts of a metadata document lookups care about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactMetadata {
    /// `<release>`, when present and non-blank.
    pub release: Option<String>,
    /// `<latest>`, when present and non-blank.
    pub latest: Option<String>,
    /// Every `<version>` listed, in document order.
    pub versions: Vec<String>,
}

impl ArtifactMetadata {
    /// The release version, falling back to the latest one.
    #[must_use]
    pub fn newest(&self) -> Option<&str> {
        self.release.as_deref().or(self.latest.as_deref())
    }
}

fn first_text(doc: &roxmltree::Document<'_>, tag: &str) -> Option<String> {
    doc.descendants()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Parse a metadata document.
///
/// Documents with a DTD are rejected, so entity declarations are never
/// expanded. Any parse failure is reported as a network error, the document
/// having come off the wire.
pub fn parse_metadata(xml: &str) -> Result<ArtifactMetadata> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| Error::network_with_source("Failed to parse metadata", e))?;

    let versions = doc
        .descendants()
        .filter(|n| n.has_tag_name("version") && n.parent().is_some_and(|p| p.has_tag_name("versions")))
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    Ok(ArtifactMetadata {
        release: first_text(&doc, "release"),
        latest: first_text(&doc, "latest"),
        versions,
    })
}
