//! Format adapters: convert canonical skills into the shapes each
//! supported tool expects, and keep generated sections of tool config
//! files in sync.

pub mod inject;
pub mod prompt;
pub mod section;

pub use {
    inject::{inject_skill, prune_descriptors, remove_skill, sync_tool_doc},
    prompt::generate,
    section::{REMOVED_NOTICE, SECTION_END, SECTION_START, remove_section, replace_section},
};
