//! Filesystem watcher for skill directories.
//!
//! Watches discovery roots for manifest create/modify/delete events and
//! sends a debounced notification through a channel so `sync --watch` can
//! re-run after edits settle.

use std::{path::PathBuf, time::Duration};

use {
    notify_debouncer_full::{
        DebounceEventResult, Debouncer, RecommendedCache, new_debouncer,
        notify::{EventKind, RecursiveMode},
    },
    skillsync_common::{Context, Result},
    skillsync_skills::MANIFEST_FILENAME,
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

/// Events emitted by the skill watcher.
#[derive(Debug, Clone, Copy)]
pub enum SkillWatchEvent {
    /// At least one skill manifest was created, modified, or deleted.
    Changed,
}

const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Debounced watcher over the tool skill directories.
///
/// Dropping the watcher stops event delivery; hold it for as long as the
/// receiver is being polled.
pub struct SkillWatcher {
    _debouncer: Debouncer<notify_debouncer_full::notify::RecommendedWatcher, RecommendedCache>,
}

impl SkillWatcher {
    /// Start watching `dirs`, skipping those that do not exist yet.
    pub fn start(dirs: &[PathBuf]) -> Result<(Self, mpsc::UnboundedReceiver<SkillWatchEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();

        let debouncer = new_debouncer(DEBOUNCE_WINDOW, None, move |result: DebounceEventResult| {
            let events = match result {
                Ok(events) => events,
                Err(errors) => {
                    for e in errors {
                        warn!(error = %e, "skill watcher error");
                    }
                    return;
                },
            };
            let touched = events.iter().any(|event| {
                matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) && event
                    .paths
                    .iter()
                    .any(|p| p.file_name().is_some_and(|n| n == MANIFEST_FILENAME))
            });
            if touched {
                debug!(events = events.len(), "skill manifest changed");
                let _ = tx.send(SkillWatchEvent::Changed);
            }
        })
        .context("start skill watcher")?;

        let mut watcher = Self {
            _debouncer: debouncer,
        };

        for dir in dirs {
            if dir.is_dir() {
                watcher
                    ._debouncer
                    .watch(dir, RecursiveMode::Recursive)
                    .with_context(|| format!("watch {}", dir.display()))?;
                info!(dir = %dir.display(), "watching skill directory");
            }
        }

        Ok((watcher, rx))
    }
}
