//! Skill discovery, manifest parsing, provenance, and dependencies.
//!
//! Skills are directories containing a `SKILL.md` file with front-matter
//! metadata and markdown instructions, shared across coding agents.

pub mod deps;
pub mod discover;
pub mod frontmatter;
pub mod metadata;
pub mod types;

pub use {
    discover::{FsSkillScanner, SkillDiscoverer},
    frontmatter::{Frontmatter, SkillContent, parse_frontmatter, parse_skill},
    metadata::{METADATA_FILENAME, SourceMetadata, SourceType},
    types::{MANIFEST_FILENAME, Skill},
};
