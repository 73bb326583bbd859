//! Plugin discovery, installation, and removal.
//!
//! Plugins live as immediate child directories of a plugins root, each
//! carrying a `plugin.json`. The loaded set is rebuilt from disk on every
//! call; nothing is cached.

use std::path::Path;

use tracing::{info, warn};

use skillsync_common::{Error, Result};

use crate::manifest::{Plugin, read_manifest};

/// Scan `root` and return every valid plugin, sorted by name.
///
/// Child directories without a parseable `plugin.json` are logged and
/// excluded; a missing or unreadable root yields an empty set. This never
/// fails the caller.
#[must_use]
pub fn load_plugins(root: &Path) -> Vec<Plugin> {
    let entries = match std::fs::read_dir(root) {
        Ok(e) => e,
        Err(_) => return Vec::new(),
    };

    let mut plugins = Vec::new();
    for entry in entries.flatten() {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        match read_manifest(&dir) {
            Ok(manifest) => plugins.push(Plugin {
                manifest,
                path: dir,
            }),
            Err(e) => warn!(path = %dir.display(), %e, "skipping invalid plugin directory"),
        }
    }

    plugins.sort_by(|a, b| a.manifest.name.cmp(&b.manifest.name));
    plugins
}

/// Install the plugin at `src_dir` by copying it into `root`.
///
/// The source is validated before anything is written. The destination is
/// `root/<plugin name>`; an existing installation under that name is an
/// error, remove it first.
pub async fn install_plugin(src_dir: &Path, root: &Path) -> Result<Plugin> {
    let manifest = read_manifest(src_dir)?;

    let dest = root.join(&manifest.name);
    if dest.exists() {
        return Err(Error::message(format!(
            "plugin '{}' is already installed at {}",
            manifest.name,
            dest.display()
        )));
    }

    tokio::fs::create_dir_all(root).await?;
    copy_dir_recursive(src_dir, &dest).await?;

    info!(plugin = %manifest.name, kind = %manifest.kind, "installed plugin");
    Ok(Plugin {
        manifest,
        path: dest,
    })
}

/// Remove an installed plugin directory by name.
pub async fn uninstall_plugin(name: &str, root: &Path) -> Result<()> {
    let dir = root.join(name);
    if !dir.is_dir() {
        return Err(Error::message(format!("plugin '{name}' is not installed")));
    }
    tokio::fs::remove_dir_all(&dir).await?;
    info!(plugin = %name, "removed plugin");
    Ok(())
}

async fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
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
