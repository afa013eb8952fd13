//! Repository search list assembly.

use tracing::debug;

use mavenkit_core::{MavenKitConfig, RemoteRepository};

/// The search list for one resolution: `configured` in order, then
/// `declared` entries whose id is new and whose URL is not known-dead, then
/// the fallback repository unless an equivalent one is already present.
#[must_use]
pub fn build_search_list(
    configured: &[RemoteRepository],
    declared: &[RemoteRepository],
    config: &MavenKitConfig,
) -> Vec<RemoteRepository> {
    let mut list = configured.to_vec();
    merge_repositories(&mut list, declared, &config.dead_repository_urls);

    let fallback = &config.fallback_repository;
    if list.iter().any(|r| r.is_equivalent_to(fallback)) {
        debug!(fallback = %fallback, "Fallback repository already present");
    } else {
        debug!(fallback = %fallback, "Adding fallback repository");
        list.push(fallback.clone());
    }
    list
}

/// Append each of `extra` whose id is not in `list` yet, skipping dead URLs.
pub fn merge_repositories(list: &mut Vec<RemoteRepository>, extra: &[RemoteRepository], dead_urls: &[String]) {
    for repository in extra {
        if repository.is_dead(dead_urls) {
            debug!(repository = %repository, "Discarding dead repository");
            continue;
        }
        if list.iter().all(|r| r.id != repository.id) {
            list.push(repository.clone());
        }
    }
}
