//! Fetching skills from GitHub, local directories, and the registry.

pub mod fetcher;
pub mod github;
pub mod local;
pub mod registry;
pub mod source;

pub(crate) const USER_AGENT: &str = "skillsync";

pub use {
    fetcher::{ResolveSource, SkillFetcher, SourceResolver},
    github::GithubFetcher,
    local::LocalFetcher,
    registry::{RegistryClient, RegistryEntry, RegistryFetcher},
    source::{ParsedSource, parse_source},
};
