//! Plugin system: manifests, loading, and lifecycle hook dispatch.
//!
//! Plugins are directories carrying a `plugin.json`, installed under the
//! plugins root by copy-in. Hook plugins subscribe to sync lifecycle
//! events and run as short-lived subprocesses; their failures never
//! propagate to the operation that fired the event.

pub mod hooks;
pub mod loader;
pub mod manifest;
pub mod shell_hook;

pub use {
    hooks::{DispatchOutcome, HookContext, HookEvent, HookHandler, HookRegistry},
    loader::{install_plugin, load_plugins, uninstall_plugin},
    manifest::{PLUGIN_MANIFEST_FILENAME, Plugin, PluginKind, PluginManifest, read_manifest},
    shell_hook::ShellHookHandler,
};
