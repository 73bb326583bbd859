use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy shared by every skillsync crate.
///
/// Only two variants are ever fatal to a whole operation: [`Error::UnknownTool`]
/// (bad tool id at the entry point) and [`Error::SourceResolutionFailed`]
/// (the skill source could not be materialized at all). Everything else is
/// raised per item inside a bulk operation, logged, and skipped by the caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("invalid skill manifest at {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("unreadable source metadata at {path}")]
    MetadataCorrupt { path: PathBuf },

    #[error("injection for tool '{tool}' failed: {reason}")]
    TargetInjectionFailed { tool: String, reason: String },

    #[error("dependency '{name}' could not be located")]
    DependencyUnresolvable { name: String },

    #[error("invalid plugin at {path}: {reason}")]
    PluginInvalid { path: PathBuf, reason: String },

    #[error("could not resolve skill source '{source_name}': {reason}")]
    SourceResolutionFailed { source_name: String, reason: String },

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    #[must_use]
    pub fn manifest_invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ManifestInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn injection(tool: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::TargetInjectionFailed {
            tool: tool.into(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn plugin_invalid(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::PluginInvalid {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn source_resolution(source: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::SourceResolutionFailed {
            source_name: source.into(),
            reason: reason.to_string(),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// ── Shared context trait ────────────────────────────────────────────────────

/// Trait for error types that can be constructed from a plain message string.
///
/// Implement this for your crate's error type, then invoke [`impl_context!`]
/// in your error module to get `.context()` and `.with_context()` on `Result`
/// and `Option`.
pub trait FromMessage: Sized {
    fn from_message(message: String) -> Self;
}

/// Generate a crate-local `Context` trait with `.context()` and `.with_context()`
/// methods on `Result` and `Option`.
///
/// Invoke inside a module that defines `Error: FromMessage` and
/// `type Result<T> = std::result::Result<T, Error>`.
///
/// ```ignore
/// // in crates/foo/src/error.rs
/// skillsync_common::impl_context!();
/// ```
#[macro_export]
macro_rules! impl_context {
    () => {
        pub trait Context<T> {
            fn context(self, context: impl Into<String>) -> Result<T>;
            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C;
        }

        impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
            fn context(self, context: impl Into<String>) -> Result<T> {
                let ctx = context.into();
                self.map_err(|source| {
                    <Error as $crate::FromMessage>::from_message(format!("{ctx}: {source}"))
                })
            }

            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.map_err(|source| {
                    let ctx = f().into();
                    <Error as $crate::FromMessage>::from_message(format!("{ctx}: {source}"))
                })
            }
        }

        impl<T> Context<T> for Option<T> {
            fn context(self, context: impl Into<String>) -> Result<T> {
                self.ok_or_else(|| <Error as $crate::FromMessage>::from_message(context.into()))
            }

            fn with_context<C, F>(self, f: F) -> Result<T>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.ok_or_else(|| <Error as $crate::FromMessage>::from_message(f().into()))
            }
        }
    };
}

impl_context!();
