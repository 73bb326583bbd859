//! Skill source locator parsing.

use std::path::PathBuf;

use skillsync_common::{Error, Result};

/// A parsed skill source locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedSource {
    /// GitHub repository, optionally narrowed to a subdirectory.
    Git {
        owner: String,
        repo: String,
        subpath: Option<String>,
    },
    /// Directory on the local filesystem.
    Local { path: PathBuf },
    /// Named entry in the skill registry.
    Registry { name: String },
}

impl ParsedSource {
    /// Skill name implied by the source, used when the fetched manifest
    /// does not carry one: the last subpath segment, the repo name, the
    /// local directory name, or the registry entry name.
    #[must_use]
    pub fn default_name(&self) -> String {
        match self {
            Self::Git { repo, subpath, .. } => subpath
                .as_deref()
                .and_then(|s| s.rsplit('/').next())
                .unwrap_or(repo)
                .to_string(),
            Self::Local { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "skill".to_string()),
            Self::Registry { name } => name.clone(),
        }
    }
}

/// Parse a user-supplied source string.
///
/// Accepted shapes: `owner/repo`, `owner/repo/sub/dir`, GitHub URLs,
/// `github:owner/repo`, filesystem paths (`./x`, `../x`, `/abs`, `~/x`),
/// and bare registry names.
pub fn parse_source(source: &str) -> Result<ParsedSource> {
    let s = source.trim();
    if s.is_empty() {
        return Err(Error::source_resolution(source, "empty source"));
    }

    if s == "." || s == ".." || s.starts_with("./") || s.starts_with("../") || s.starts_with('/') {
        return Ok(ParsedSource::Local {
            path: PathBuf::from(s),
        });
    }
    if s == "~" || s.starts_with("~/") {
        return Ok(ParsedSource::Local {
            path: expand_home(s),
        });
    }

    let stripped = s
        .strip_prefix("github:")
        .or_else(|| s.strip_prefix("https://github.com/"))
        .or_else(|| s.strip_prefix("http://github.com/"))
        .or_else(|| s.strip_prefix("github.com/"));
    if let Some(repo_path) = stripped {
        return parse_git(source, repo_path);
    }
    if s.contains('/') {
        return parse_git(source, s);
    }

    Ok(ParsedSource::Registry {
        name: s.to_string(),
    })
}

fn parse_git(original: &str, repo_path: &str) -> Result<ParsedSource> {
    let mut parts = repo_path.trim_matches('/').split('/').filter(|p| !p.is_empty());
    let owner = parts.next();
    let repo = parts.next().map(|r| r.trim_end_matches(".git"));
    let rest: Vec<&str> = parts.collect();

    match (owner, repo) {
        (Some(owner), Some(repo)) if !repo.is_empty() => Ok(ParsedSource::Git {
            owner: owner.to_string(),
            repo: repo.to_string(),
            subpath: if rest.is_empty() {
                None
            } else {
                Some(rest.join("/"))
            },
        }),
        _ => Err(Error::source_resolution(
            original,
            "expected 'owner/repo' or a GitHub URL",
        )),
    }
}

fn expand_home(path: &str) -> PathBuf {
    match dirs_next::home_dir() {
        Some(home) => home.join(path.trim_start_matches('~').trim_start_matches('/')),
        None => PathBuf::from(path),
    }
}
