//! Idempotent replacement of the generated skills section in tool
//! config files.
//!
//! Two marker conventions are recognized, in priority order: a
//! structured `<skills …>…</skills>` tag pair, and a pair of sentinel
//! comment lines. Removal keeps the markers in place so later syncs
//! have a stable re-insertion point.

/// Sentinel markers wrapping generated Markdown sections.
pub const SECTION_START: &str = "<!-- skillsync:start -->";
pub const SECTION_END: &str = "<!-- skillsync:end -->";

/// Interior left behind when a section is removed.
pub const REMOVED_NOTICE: &str = "<!-- skills removed -->";

const TAG_OPEN: &str = "<skills";
const TAG_CLOSE: &str = "</skills>";

/// Replace the previously injected section with `new_section`, or append
/// it when no markers exist yet.
#[must_use]
pub fn replace_section(content: &str, new_section: &str) -> String {
    if let Some((start, end)) = find_span(content) {
        let mut out = String::with_capacity(content.len() + new_section.len());
        out.push_str(&content[..start]);
        out.push_str(new_section.trim_end());
        out.push_str(&content[end..]);
        return out;
    }

    let trimmed = content.trim_end();
    if trimmed.is_empty() {
        format!("{}\n", new_section.trim_end())
    } else {
        format!("{trimmed}\n\n{}\n", new_section.trim_end())
    }
}

/// Blank the interior of an existing section, keeping its marker pair.
/// Returns `None` when no section is present.
#[must_use]
pub fn remove_section(content: &str) -> Option<String> {
    if let Some(open_start) = find_tag_open(content)
        && let Some(rel_open_end) = content[open_start..].find('>')
        && let Some(rel_close) = content[open_start..].find(TAG_CLOSE)
        && rel_open_end < rel_close
    {
        let interior_start = open_start + rel_open_end + 1;
        let interior_end = open_start + rel_close;
        return Some(splice_notice(content, interior_start, interior_end));
    }

    let start = content.find(SECTION_START)?;
    let rel_close = content[start..].find(SECTION_END)?;
    Some(splice_notice(
        content,
        start + SECTION_START.len(),
        start + rel_close,
    ))
}

fn splice_notice(content: &str, interior_start: usize, interior_end: usize) -> String {
    let mut out = String::with_capacity(content.len());
    out.push_str(&content[..interior_start]);
    out.push('\n');
    out.push_str(REMOVED_NOTICE);
    out.push('\n');
    out.push_str(&content[interior_end..]);
    out
}

/// Full span of an existing section: tag pair first, then sentinels.
fn find_span(content: &str) -> Option<(usize, usize)> {
    if let Some(start) = find_tag_open(content)
        && let Some(rel_close) = content[start..].find(TAG_CLOSE)
    {
        return Some((start, start + rel_close + TAG_CLOSE.len()));
    }
    let start = content.find(SECTION_START)?;
    let rel_close = content[start..].find(SECTION_END)?;
    Some((start, start + rel_close + SECTION_END.len()))
}

/// Position of a real `<skills>` or `<skills …>` opening tag, skipping
/// prefixes like `<skillsets>`.
fn find_tag_open(content: &str) -> Option<usize> {
    for (idx, _) in content.match_indices(TAG_OPEN) {
        let rest = &content[idx + TAG_OPEN.len()..];
        if rest.starts_with(' ') || rest.starts_with('>') {
            return Some(idx);
        }
    }
    None
}
