//! Supported-tool registry and install-path resolution.
//!
//! Each AI coding tool stores skills under its own directories and
//! advertises them through its own config format. This crate owns the
//! static table describing those conventions and resolves absolute
//! installation paths from (tool, scope, skill name).

mod builtin;
pub mod registry;

pub use registry::{ManifestFormat, Scope, ToolConfig, ToolRegistry};
