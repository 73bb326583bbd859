//! Shell-based hook handler that executes plugin entry points.
//!
//! The handler spawns a child process per event via `sh -c`, passing the
//! [`HookContext`] as JSON on stdin along with `SKILLSYNC_HOOK` (handler
//! name) and `SKILLSYNC_EVENT` (event wire name) in the environment.
//! Exit 0 is success; anything else is an error the registry logs and
//! swallows.

use std::{collections::HashMap, path::PathBuf, time::Duration};

use {
    async_trait::async_trait,
    tokio::{io::AsyncWriteExt, process::Command},
    tracing::debug,
};

use skillsync_common::{Context, Result};

use crate::{
    hooks::{HookContext, HookEvent, HookHandler},
    manifest::Plugin,
};

/// A hook handler that executes an external shell command.
pub struct ShellHookHandler {
    hook_name: String,
    command: String,
    subscribed_events: Vec<HookEvent>,
    timeout: Duration,
    env: HashMap<String, String>,
    working_dir: Option<PathBuf>,
}

impl ShellHookHandler {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        events: Vec<HookEvent>,
        timeout: Duration,
        env: HashMap<String, String>,
    ) -> Self {
        Self {
            hook_name: name.into(),
            command: command.into(),
            subscribed_events: events,
            timeout,
            env,
            working_dir: None,
        }
    }

    /// Run the command from `dir` instead of the process working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Build a handler for a hook plugin's entry point.
    ///
    /// The command is the absolute entry point path and the working
    /// directory is the plugin root, so entry points can reference their
    /// bundled files relatively.
    #[must_use]
    pub fn from_plugin(plugin: &Plugin) -> Self {
        Self::new(
            plugin.manifest.name.clone(),
            plugin.entry_point().display().to_string(),
            plugin.manifest.hook_events(),
            plugin.manifest.hook_timeout(),
            plugin.manifest.hook_env(),
        )
        .with_working_dir(&plugin.path)
    }
}

#[async_trait]
impl HookHandler for ShellHookHandler {
    fn name(&self) -> &str {
        &self.hook_name
    }

    fn events(&self) -> &[HookEvent] {
        &self.subscribed_events
    }

    async fn handle(&self, event: HookEvent, context: &HookContext) -> Result<()> {
        let context_json =
            serde_json::to_string(context).context("failed to serialize hook context")?;

        debug!(
            hook = %self.hook_name,
            command = %self.command,
            event = %event,
            "spawning shell hook"
        );

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&self.command)
            .envs(&self.env)
            .env("SKILLSYNC_HOOK", &self.hook_name)
            .env("SKILLSYNC_EVENT", event.as_str())
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn hook command: {}", self.command))?;

        // Write the context to stdin (ignore broken pipe if the child
        // never reads it).
        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(context_json.as_bytes()).await
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(e.into());
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .with_context(|| {
                format!(
                    "hook '{}' timed out after {:?}",
                    self.hook_name, self.timeout
                )
            })?
            .with_context(|| format!("hook '{}' failed to complete", self.hook_name))?;

        let exit_code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr);

        debug!(
            hook = %self.hook_name,
            exit_code,
            stdout_len = output.stdout.len(),
            stderr_len = stderr.len(),
            "shell hook completed"
        );

        if exit_code != 0 {
            return Err(skillsync_common::Error::message(format!(
                "hook '{}' exited with code {}: {}",
                self.hook_name,
                exit_code,
                stderr.trim()
            )));
        }
        Ok(())
    }
}
