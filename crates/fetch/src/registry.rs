use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skillsync_common::{Error, Result};
use skillsync_skills::{SourceMetadata, SourceType};

use crate::{
    fetcher::SkillFetcher,
    github::GithubFetcher,
    source::{ParsedSource, parse_source},
};

/// One published skill in the registry index.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Git source the registry entry points at.
    pub source: String,
}

/// HTTP client for the skill registry.
#[derive(Clone)]
pub struct RegistryClient {
    base_url: String,
    http: reqwest::Client,
}

impl RegistryClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Look up one entry by name.
    pub async fn entry(&self, name: &str) -> Result<RegistryEntry> {
        let url = format!("{}/skills/{name}.json", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await
            .map_err(|e| Error::source_resolution(name, e))?;
        if !resp.status().is_success() {
            return Err(Error::source_resolution(
                name,
                format!("registry returned HTTP {}", resp.status()),
            ));
        }
        resp.json()
            .await
            .map_err(|e| Error::source_resolution(name, e))
    }

    /// Full published index.
    pub async fn index(&self) -> Result<Vec<RegistryEntry>> {
        let url = format!("{}/index.json", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await
            .map_err(|e| Error::source_resolution("registry", e))?;
        if !resp.status().is_success() {
            return Err(Error::source_resolution(
                "registry",
                format!("registry returned HTTP {}", resp.status()),
            ));
        }
        resp.json()
            .await
            .map_err(|e| Error::source_resolution("registry", e))
    }

    /// Case-insensitive substring search over the index.
    pub async fn search(&self, query: &str) -> Result<Vec<RegistryEntry>> {
        Ok(filter_entries(self.index().await?, query))
    }
}

fn filter_entries(entries: Vec<RegistryEntry>, query: &str) -> Vec<RegistryEntry> {
    let needle = query.to_lowercase();
    entries
        .into_iter()
        .filter(|e| {
            e.name.to_lowercase().contains(&needle)
                || e.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Fetches a registry entry by delegating to its git source.
pub struct RegistryFetcher {
    client: RegistryClient,
    source: String,
    name: String,
}

impl RegistryFetcher {
    #[must_use]
    pub fn new(client: RegistryClient, source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            client,
            source: source.into(),
            name: name.into(),
        }
    }

    fn backing_fetcher(&self, entry: &RegistryEntry) -> Result<GithubFetcher> {
        match parse_source(&entry.source)? {
            ParsedSource::Git {
                owner,
                repo,
                subpath,
            } => Ok(GithubFetcher::new(&self.source, owner, repo, subpath)),
            _ => Err(Error::source_resolution(
                &self.source,
                "registry entry does not point at a git source",
            )),
        }
    }
}

#[async_trait]
impl SkillFetcher for RegistryFetcher {
    async fn fetch(&self, dest: &Path) -> Result<SourceMetadata> {
        let entry = self.client.entry(&self.name).await?;
        let meta = self.backing_fetcher(&entry)?.fetch(dest).await?;
        Ok(SourceMetadata {
            source: self.source.clone(),
            source_type: SourceType::Registry,
            registry_name: Some(self.name.clone()),
            version: entry.version,
            ..meta
        })
    }

    async fn latest_revision(&self) -> Result<Option<String>> {
        Ok(self.client.entry(&self.name).await?.version)
    }
}
