use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use skillsync_common::{Context, Error, Result};
use skillsync_skills::{SourceMetadata, SourceType};

use crate::fetcher::SkillFetcher;

/// Fetches skills from GitHub repositories via tarball download.
pub struct GithubFetcher {
    source: String,
    owner: String,
    repo: String,
    subpath: Option<String>,
    http: reqwest::Client,
}

impl GithubFetcher {
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        owner: String,
        repo: String,
        subpath: Option<String>,
    ) -> Self {
        Self {
            source: source.into(),
            owner,
            repo,
            subpath,
            http: reqwest::Client::new(),
        }
    }

    fn repo_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }

    async fn latest_commit_sha(&self) -> Option<String> {
        let url = format!(
            "https://api.github.com/repos/{}/{}/commits?per_page=1",
            self.owner, self.repo
        );
        let response = self
            .http
            .get(url)
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        let value: serde_json::Value = response.json().await.ok()?;
        value
            .as_array()?
            .first()?
            .get("sha")?
            .as_str()
            .filter(|sha| sha.len() == 40)
            .map(ToOwned::to_owned)
    }
}

#[async_trait]
impl SkillFetcher for GithubFetcher {
    async fn fetch(&self, dest: &Path) -> Result<SourceMetadata> {
        let url = format!(
            "https://api.github.com/repos/{}/{}/tarball",
            self.owner, self.repo
        );
        let resp = self
            .http
            .get(&url)
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await
            .map_err(|e| Error::source_resolution(&self.source, e))?;
        if !resp.status().is_success() {
            return Err(Error::source_resolution(
                &self.source,
                format!("HTTP {}", resp.status()),
            ));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::source_resolution(&self.source, e))?;

        let commit_sha = self.latest_commit_sha().await;

        let staging = staging_dir(dest);
        if staging.exists() {
            tokio::fs::remove_dir_all(&staging).await?;
        }
        tokio::fs::create_dir_all(&staging).await?;

        let staging_owned = staging.clone();
        tokio::task::spawn_blocking(move || unpack_tarball(&bytes[..], &staging_owned))
            .await
            .context("unpack task panicked")??;

        let skill_root = match &self.subpath {
            Some(sub) => staging.join(sub),
            None => staging.clone(),
        };
        if !skill_root.is_dir() {
            let _ = tokio::fs::remove_dir_all(&staging).await;
            return Err(Error::source_resolution(
                &self.source,
                "subpath not present in repository",
            ));
        }

        if dest.exists() {
            tokio::fs::remove_dir_all(dest).await?;
        }
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(&skill_root, dest).await?;
        let _ = tokio::fs::remove_dir_all(&staging).await;

        tracing::info!(owner = %self.owner, repo = %self.repo, "fetched skill tarball");
        Ok(SourceMetadata {
            repo_url: Some(self.repo_url()),
            subpath: self.subpath.clone(),
            commit_sha,
            ..SourceMetadata::new(&self.source, SourceType::Git)
        })
    }

    async fn latest_revision(&self) -> Result<Option<String>> {
        Ok(self.latest_commit_sha().await)
    }
}

fn staging_dir(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "skill".to_string());
    dest.with_file_name(format!("{name}.download"))
}

fn unpack_tarball(bytes: &[u8], target: &Path) -> Result<()> {
    let canonical_target = std::fs::canonicalize(target)?;
    let decoder = flate2::read::GzDecoder::new(bytes);
    let mut archive = tar::Archive::new(decoder);
    for entry in archive.entries()? {
        let mut entry = entry?;
        if entry.header().entry_type().is_symlink() || entry.header().entry_type().is_hard_link() {
            tracing::warn!("skipping symlink/hardlink archive entry");
            continue;
        }

        let path = entry.path()?.into_owned();
        let Some(stripped) = sanitize_archive_path(&path)? else {
            continue;
        };

        let dest = target.join(&stripped);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
            let canonical_parent = std::fs::canonicalize(parent)?;
            if !canonical_parent.starts_with(&canonical_target) {
                return Err(Error::message("archive entry escaped extraction directory"));
            }
        }

        if dest.exists() {
            let meta = std::fs::symlink_metadata(&dest)?;
            if meta.file_type().is_symlink() {
                return Err(Error::message("archive entry resolves to symlink destination"));
            }
        }

        if entry.header().entry_type().is_dir() {
            std::fs::create_dir_all(&dest)?;
            continue;
        }

        entry.unpack(&dest)?;
    }
    Ok(())
}

/// Drop the tarball's top-level `repo-sha/` directory and refuse path
/// components that could escape the extraction root.
fn sanitize_archive_path(path: &Path) -> Result<Option<PathBuf>> {
    let stripped: PathBuf = path.components().skip(1).collect();
    if stripped.as_os_str().is_empty() {
        return Ok(None);
    }

    for component in stripped.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {},
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::message(format!(
                    "archive contains unsafe path component: {}",
                    path.display()
                )));
            },
        }
    }

    Ok(Some(stripped))
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Write};

    fn gz_archive(build: impl FnOnce(&mut tar::Builder<Vec<u8>>)) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        build(&mut builder);
        let tar_bytes = builder.into_inner().unwrap();
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tar_bytes).unwrap();
        encoder.finish().unwrap()
    }

    fn file_entry(builder: &mut tar::Builder<Vec<u8>>, path: &str, data: &str) {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, data.as_bytes()).unwrap();
    }

    #[test]
    fn test_sanitize_archive_path_rejects_parent_dir() {
        let path = Path::new("repo-root/../../etc/passwd");
        assert!(sanitize_archive_path(path).is_err());
    }

    #[test]
    fn test_sanitize_archive_path_accepts_normal_path() {
        let path = Path::new("repo-root/skills/demo/SKILL.md");
        let sanitized = sanitize_archive_path(path).unwrap().unwrap();
        assert_eq!(sanitized, PathBuf::from("skills/demo/SKILL.md"));
    }

    #[test]
    fn test_sanitize_archive_path_skips_bare_root() {
        assert!(sanitize_archive_path(Path::new("repo-root")).unwrap().is_none());
        assert!(sanitize_archive_path(Path::new("repo-root/")).unwrap().is_none());
    }

    #[test]
    fn test_unpack_strips_top_level_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let gz = gz_archive(|b| {
            file_entry(b, "repo-abc123/SKILL.md", "---\nname: pdf\n---\nbody\n");
            file_entry(b, "repo-abc123/reference/notes.md", "notes\n");
        });

        unpack_tarball(&gz, tmp.path()).unwrap();

        assert!(tmp.path().join("SKILL.md").is_file());
        assert!(tmp.path().join("reference/notes.md").is_file());
    }

    #[test]
    fn test_unpack_skips_link_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let gz = gz_archive(|b| {
            file_entry(b, "repo-abc123/SKILL.md", "---\nname: pdf\n---\n");
            let mut header = tar::Header::new_gnu();
            header.set_size(0);
            header.set_entry_type(tar::EntryType::Symlink);
            header.set_cksum();
            b.append_link(&mut header, "repo-abc123/evil-link", "/etc/passwd")
                .unwrap();
        });

        unpack_tarball(&gz, tmp.path()).unwrap();

        assert!(tmp.path().join("SKILL.md").is_file());
        assert!(!tmp.path().join("evil-link").exists());
    }

    #[test]
    fn test_staging_dir_sits_beside_destination() {
        let staging = staging_dir(Path::new("/data/staging/pdf"));
        assert_eq!(staging, PathBuf::from("/data/staging/pdf.download"));
    }
}
