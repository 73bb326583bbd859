//! Hook events and the dispatch registry.
//!
//! Hooks observe lifecycle events after sync operations. Dispatch is
//! strictly best-effort: a failing handler is logged and skipped, and the
//! operation that fired the event never sees the failure.

use std::{collections::HashMap, fmt, path::PathBuf, sync::Arc};

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
    tracing::{debug, info, warn},
};

use skillsync_common::Result;

use crate::{
    manifest::{Plugin, PluginKind},
    shell_hook::ShellHookHandler,
};

// ── HookEvent ───────────────────────────────────────────────────────────────

/// Lifecycle events that hook plugins can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookEvent {
    PostInstall,
    PostRemove,
    PostSync,
    PostUpdate,
}

impl HookEvent {
    /// All variants, for iteration.
    pub const ALL: &'static [HookEvent] = &[
        Self::PostInstall,
        Self::PostRemove,
        Self::PostSync,
        Self::PostUpdate,
    ];

    /// The wire name used in `plugin.json` event lists and the
    /// `SKILLSYNC_EVENT` variable.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostInstall => "post-install",
            Self::PostRemove => "post-remove",
            Self::PostSync => "post-sync",
            Self::PostUpdate => "post-update",
        }
    }

    /// Inverse of [`HookEvent::as_str`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "post-install" => Some(Self::PostInstall),
            "post-remove" => Some(Self::PostRemove),
            "post-sync" => Some(Self::PostSync),
            "post-update" => Some(Self::PostUpdate),
            _ => None,
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── HookContext ─────────────────────────────────────────────────────────────

/// Payload handed to every handler, and serialized to JSON on a shell
/// hook's stdin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookContext {
    /// Skill the operation acted on, when it acted on a single skill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    /// Tool ids the operation touched.
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Filesystem paths written or removed by the operation.
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

impl HookContext {
    /// Context for an operation centered on one skill.
    #[must_use]
    pub fn for_skill(name: impl Into<String>) -> Self {
        Self {
            skill: Some(name.into()),
            ..Self::default()
        }
    }
}

// ── HookHandler trait ───────────────────────────────────────────────────────

/// One subscriber. Implemented by [`ShellHookHandler`] for plugin entry
/// points and by test doubles.
#[async_trait]
pub trait HookHandler: Send + Sync {
    fn name(&self) -> &str;

    /// Which events this handler subscribes to.
    fn events(&self) -> &[HookEvent];

    async fn handle(&self, event: HookEvent, context: &HookContext) -> Result<()>;
}

// ── HookRegistry ────────────────────────────────────────────────────────────

/// Counts from one dispatch pass, for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub invoked: usize,
    pub failed: usize,
}

/// Holds registered handlers and fans events out to them sequentially.
#[derive(Default)]
pub struct HookRegistry {
    handlers: HashMap<HookEvent, Vec<Arc<dyn HookHandler>>>,
}

impl HookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the hook plugins in `plugins`.
    ///
    /// Non-hook plugins are ignored. Hook plugins that subscribe to no
    /// events are logged and left unregistered.
    #[must_use]
    pub fn from_plugins(plugins: &[Plugin]) -> Self {
        let mut registry = Self::new();
        for plugin in plugins {
            if plugin.manifest.kind != PluginKind::Hook {
                continue;
            }
            let handler = ShellHookHandler::from_plugin(plugin);
            if handler.events().is_empty() {
                warn!(plugin = %plugin.manifest.name, "hook plugin subscribes to no events");
                continue;
            }
            registry.register(Arc::new(handler));
        }
        registry
    }

    /// Register a handler for every event it subscribes to.
    pub fn register(&mut self, handler: Arc<dyn HookHandler>) {
        for &event in handler.events() {
            self.handlers
                .entry(event)
                .or_default()
                .push(Arc::clone(&handler));
        }
        info!(handler = handler.name(), "hook handler registered");
    }

    #[must_use]
    pub fn has_handlers(&self, event: HookEvent) -> bool {
        self.handlers.get(&event).is_some_and(|v| !v.is_empty())
    }

    /// All registered handler names, sorted and deduplicated.
    #[must_use]
    pub fn handler_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .values()
            .flatten()
            .map(|h| h.name().to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Dispatch `event` to every subscribed handler, in registration order.
    ///
    /// Handler failures are logged and counted, never raised. The
    /// triggering operation treats any outcome as success.
    pub async fn dispatch(&self, event: HookEvent, context: &HookContext) -> DispatchOutcome {
        let Some(handlers) = self.handlers.get(&event).filter(|h| !h.is_empty()) else {
            return DispatchOutcome::default();
        };

        debug!(event = %event, count = handlers.len(), "dispatching hook event");

        let mut outcome = DispatchOutcome::default();
        for handler in handlers {
            outcome.invoked += 1;
            if let Err(e) = handler.handle(event, context).await {
                outcome.failed += 1;
                warn!(handler = handler.name(), event = %event, error = %e, "hook handler failed");
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use skillsync_common::Error;

    use super::*;
    use crate::manifest::PluginManifest;

    struct CountingHandler {
        calls: AtomicUsize,
        subscribed: Vec<HookEvent>,
    }

    impl CountingHandler {
        fn new(subscribed: Vec<HookEvent>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                subscribed,
            }
        }
    }

    #[async_trait]
    impl HookHandler for CountingHandler {
        fn name(&self) -> &str {
            "counter"
        }

        fn events(&self) -> &[HookEvent] {
            &self.subscribed
        }

        async fn handle(&self, _event: HookEvent, _context: &HookContext) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingHandler {
        subscribed: Vec<HookEvent>,
    }

    #[async_trait]
    impl HookHandler for FailingHandler {
        fn name(&self) -> &str {
            "failer"
        }

        fn events(&self) -> &[HookEvent] {
            &self.subscribed
        }

        async fn handle(&self, _event: HookEvent, _context: &HookContext) -> Result<()> {
            Err(Error::message("handler failed"))
        }
    }

    #[test]
    fn event_names_roundtrip() {
        for &event in HookEvent::ALL {
            assert_eq!(HookEvent::from_name(event.as_str()), Some(event));
        }
        assert_eq!(HookEvent::from_name("pre-install"), None);
        assert_eq!(HookEvent::PostSync.to_string(), "post-sync");
    }

    #[test]
    fn event_serde_uses_kebab_case() {
        let json = serde_json::to_string(&HookEvent::PostInstall).unwrap();
        assert_eq!(json, "\"post-install\"");
        let parsed: HookEvent = serde_json::from_str("\"post-update\"").unwrap();
        assert_eq!(parsed, HookEvent::PostUpdate);
    }

    #[tokio::test]
    async fn dispatch_with_no_handlers_is_a_noop() {
        let registry = HookRegistry::new();
        let outcome = registry
            .dispatch(HookEvent::PostInstall, &HookContext::default())
            .await;
        assert_eq!(outcome, DispatchOutcome::default());
    }

    #[tokio::test]
    async fn dispatch_reaches_subscribed_handlers_only() {
        let counter = Arc::new(CountingHandler::new(vec![HookEvent::PostInstall]));
        let mut registry = HookRegistry::new();
        registry.register(Arc::clone(&counter) as Arc<dyn HookHandler>);

        registry
            .dispatch(HookEvent::PostRemove, &HookContext::default())
            .await;
        assert_eq!(counter.calls.load(Ordering::SeqCst), 0);

        let outcome = registry
            .dispatch(HookEvent::PostInstall, &HookContext::for_skill("pdf"))
            .await;
        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome, DispatchOutcome { invoked: 1, failed: 0 });
    }

    #[tokio::test]
    async fn dispatch_failure_is_counted_not_raised() {
        let counter = Arc::new(CountingHandler::new(vec![HookEvent::PostSync]));
        let mut registry = HookRegistry::new();
        registry.register(Arc::new(FailingHandler {
            subscribed: vec![HookEvent::PostSync],
        }));
        registry.register(Arc::clone(&counter) as Arc<dyn HookHandler>);

        let outcome = registry
            .dispatch(HookEvent::PostSync, &HookContext::default())
            .await;
        assert_eq!(outcome, DispatchOutcome { invoked: 2, failed: 1 });
        // The handler after the failing one still ran.
        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn has_handlers_tracks_registration() {
        let mut registry = HookRegistry::new();
        assert!(!registry.has_handlers(HookEvent::PostInstall));
        registry.register(Arc::new(CountingHandler::new(vec![HookEvent::PostInstall])));
        assert!(registry.has_handlers(HookEvent::PostInstall));
        assert!(!registry.has_handlers(HookEvent::PostUpdate));
    }

    #[test]
    fn from_plugins_registers_hook_kind_only() {
        let hook_plugin = Plugin {
            manifest: serde_json::from_str::<PluginManifest>(
                r#"{
                    "name": "notify", "version": "1.0.0", "type": "hook", "main": "notify.sh",
                    "config": { "events": ["post-install"] }
                }"#,
            )
            .unwrap(),
            path: PathBuf::from("/plugins/notify"),
        };
        let command_plugin = Plugin {
            manifest: serde_json::from_str::<PluginManifest>(
                r#"{"name": "fmt", "version": "1.0.0", "type": "command", "main": "fmt.sh"}"#,
            )
            .unwrap(),
            path: PathBuf::from("/plugins/fmt"),
        };
        let eventless_hook = Plugin {
            manifest: serde_json::from_str::<PluginManifest>(
                r#"{"name": "idle", "version": "1.0.0", "type": "hook", "main": "idle.sh"}"#,
            )
            .unwrap(),
            path: PathBuf::from("/plugins/idle"),
        };

        let registry = HookRegistry::from_plugins(&[hook_plugin, command_plugin, eventless_hook]);
        assert_eq!(registry.handler_names(), vec!["notify".to_string()]);
        assert!(registry.has_handlers(HookEvent::PostInstall));
        assert!(!registry.has_handlers(HookEvent::PostSync));
    }

    #[test]
    fn context_serializes_for_stdin() {
        let context = HookContext {
            skill: Some("pdf".into()),
            tools: vec!["claude-code".into()],
            scope: Some("project".into()),
            paths: vec![PathBuf::from("/tmp/skills/pdf")],
        };
        let json = serde_json::to_string(&context).unwrap();
        assert!(json.contains("\"skill\":\"pdf\""));
        assert!(json.contains("claude-code"));
    }
}
