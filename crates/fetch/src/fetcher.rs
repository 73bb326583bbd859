//! Source resolution seam between the orchestrator and the network.

use std::path::Path;

use async_trait::async_trait;
use skillsync_common::Result;
use skillsync_skills::SourceMetadata;

use crate::{
    github::GithubFetcher,
    local::LocalFetcher,
    registry::{RegistryClient, RegistryFetcher},
    source::{ParsedSource, parse_source},
};

/// Materializes skill sources into local directories.
#[async_trait]
pub trait SkillFetcher: Send + Sync {
    /// Copy or download the skill into `dest`, returning its provenance.
    /// The install timestamp is left unset; the metadata store stamps it.
    async fn fetch(&self, dest: &Path) -> Result<SourceMetadata>;

    /// Upstream revision identifier, when the backend has one.
    async fn latest_revision(&self) -> Result<Option<String>>;
}

/// Picks a [`SkillFetcher`] for a raw source string.
///
/// The orchestrator depends on this trait; [`SourceResolver`] is the
/// production implementation.
pub trait ResolveSource: Send + Sync {
    fn resolve(&self, source: &str) -> Result<Box<dyn SkillFetcher>>;
}

/// Turns raw source strings into concrete fetchers.
pub struct SourceResolver {
    registry_url: String,
}

impl SourceResolver {
    #[must_use]
    pub fn new(registry_url: impl Into<String>) -> Self {
        Self {
            registry_url: registry_url.into(),
        }
    }
}

impl ResolveSource for SourceResolver {
    /// Parse `source` and pick the fetcher backend for it.
    fn resolve(&self, source: &str) -> Result<Box<dyn SkillFetcher>> {
        Ok(match parse_source(source)? {
            ParsedSource::Git {
                owner,
                repo,
                subpath,
            } => Box::new(GithubFetcher::new(source, owner, repo, subpath)),
            ParsedSource::Local { path } => Box::new(LocalFetcher::new(source, path)),
            ParsedSource::Registry { name } => Box::new(RegistryFetcher::new(
                RegistryClient::new(self.registry_url.as_str()),
                source,
                name,
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_rejects_malformed_sources() {
        let resolver = SourceResolver::new("https://example.test");
        assert!(resolver.resolve("").is_err());
        assert!(resolver.resolve("https://github.com/only-owner").is_err());
    }

    #[test]
    fn resolver_accepts_each_source_family() {
        let resolver = SourceResolver::new("https://example.test");
        assert!(resolver.resolve("owner/repo").is_ok());
        assert!(resolver.resolve("./local/skill").is_ok());
        assert!(resolver.resolve("pdf").is_ok());
    }
}
