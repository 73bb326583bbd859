use std::path::{Path, PathBuf};

use async_trait::async_trait;
use skillsync_common::{Error, Result};
use skillsync_skills::{MANIFEST_FILENAME, SourceMetadata, SourceType, parse_frontmatter};

use crate::fetcher::SkillFetcher;

/// Fetches skills from directories on the local filesystem.
pub struct LocalFetcher {
    source: String,
    path: PathBuf,
}

impl LocalFetcher {
    #[must_use]
    pub fn new(source: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            path: path.into(),
        }
    }
}

#[async_trait]
impl SkillFetcher for LocalFetcher {
    async fn fetch(&self, dest: &Path) -> Result<SourceMetadata> {
        if !self.path.is_dir() {
            return Err(Error::source_resolution(
                &self.source,
                "directory does not exist",
            ));
        }
        let manifest = self.path.join(MANIFEST_FILENAME);
        if !manifest.is_file() {
            return Err(Error::source_resolution(
                &self.source,
                format!("directory has no {MANIFEST_FILENAME}"),
            ));
        }

        copy_dir_recursive(&self.path, dest).await?;

        let version = std::fs::read_to_string(&manifest)
            .ok()
            .and_then(|text| parse_frontmatter(&text).ok())
            .and_then(|fm| fm.version);
        let canonical = std::fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());

        Ok(SourceMetadata {
            local_path: Some(canonical.to_string_lossy().into_owned()),
            version,
            ..SourceMetadata::new(&self.source, SourceType::Local)
        })
    }

    async fn latest_revision(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

pub(crate) async fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dst).await?;
    let mut entries = tokio::fs::read_dir(src).await?;
    while let Some(entry) = entries.next_entry().await? {
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            Box::pin(copy_dir_recursive(&src_path, &dst_path)).await?;
        } else {
            tokio::fs::copy(&src_path, &dst_path).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_fetch_copies_files_and_records_provenance() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("pdf");
        std::fs::create_dir_all(src.join("reference")).unwrap();
        std::fs::write(
            src.join(MANIFEST_FILENAME),
            "---\nname: pdf\nversion: 2.0.1\n---\nbody\n",
        )
        .unwrap();
        std::fs::write(src.join("reference/notes.md"), "extra\n").unwrap();

        let dest = tmp.path().join("staged");
        let meta = LocalFetcher::new("./pdf", &src).fetch(&dest).await.unwrap();

        assert!(dest.join(MANIFEST_FILENAME).is_file());
        assert!(dest.join("reference/notes.md").is_file());
        assert_eq!(meta.source_type, SourceType::Local);
        assert_eq!(meta.version.as_deref(), Some("2.0.1"));
        assert!(meta.local_path.is_some());
        assert!(meta.installed_at_ms.is_none());
    }

    #[tokio::test]
    async fn missing_directory_fails_resolution() {
        let tmp = tempfile::tempdir().unwrap();
        let err = LocalFetcher::new("./gone", tmp.path().join("gone"))
            .fetch(&tmp.path().join("staged"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SourceResolutionFailed { .. }));
    }

    #[tokio::test]
    async fn directory_without_manifest_fails_resolution() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("not-a-skill");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("README.md"), "hello").unwrap();

        let err = LocalFetcher::new("./not-a-skill", &src)
            .fetch(&tmp.path().join("staged"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SourceResolutionFailed { .. }));
    }

    #[tokio::test]
    async fn local_sources_have_no_upstream_revision() {
        let tmp = tempfile::tempdir().unwrap();
        let revision = LocalFetcher::new("./pdf", tmp.path())
            .latest_revision()
            .await
            .unwrap();
        assert!(revision.is_none());
    }
}
