//! Small helpers over `roxmltree` for POM and settings documents.

use roxmltree::{Document, Node};
use std::path::Path;

use mavenkit_core::{Error, Result};

/// Parse `text` read from `path`. DTDs are rejected.
pub fn parse_document<'input>(text: &'input str, path: &Path) -> Result<Document<'input>> {
    Document::parse(text)
        .map_err(|e| Error::config_build(format!("Failed to parse {}: {e}", path.display())))
}

/// First child element named `name`.
pub fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.has_tag_name(name))
}

/// Child elements named `name`.
pub fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.has_tag_name(name))
}

/// Trimmed, non-empty text of the child element named `name`.
pub fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Elements found at `path` below `node`, e.g. `["dependencies", "dependency"]`.
pub fn elements_at<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    path: &[&'a str],
) -> Vec<Node<'a, 'input>> {
    let Some((last, parents)) = path.split_last() else {
        return Vec::new();
    };
    let mut current = Some(node);
    for name in parents {
        current = current.and_then(|n| child(n, name));
    }
    current
        .map(|n| children(n, *last).collect())
        .unwrap_or_default()
}
