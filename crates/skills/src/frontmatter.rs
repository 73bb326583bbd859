//! Line-oriented SKILL.md front-matter parsing.
//!
//! A manifest begins with a `---` delimiter line, carries `key: value`
//! pairs (with inline `[a, b]` or block `- item` lists), closes with a
//! second `---` line, and everything after that is free-form body text.
//! Unrecognized keys are preserved verbatim and otherwise ignored; a file
//! without the delimiter pair is not a manifest at all.

use skillsync_common::{Error, Result};

/// Front-matter fields of one skill manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub requires: Vec<String>,
    pub optional: Vec<String>,
    /// Unrecognized keys in file order, with their raw values.
    pub extra: Vec<(String, String)>,
}

/// A parsed manifest: front-matter plus the untouched body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillContent {
    pub frontmatter: Frontmatter,
    pub body: String,
}

/// Parse a complete SKILL.md document.
pub fn parse_skill(text: &str) -> Result<SkillContent> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Err(Error::message("empty manifest"));
    };
    if trim_line(first) != "---" {
        return Err(Error::message("missing opening front-matter delimiter"));
    }

    let mut offset = first.len();
    let mut fm_lines: Vec<&str> = Vec::new();
    let mut closed = false;
    for line in lines {
        offset += line.len();
        if trim_line(line) == "---" {
            closed = true;
            break;
        }
        fm_lines.push(line);
    }
    if !closed {
        return Err(Error::message("missing closing front-matter delimiter"));
    }

    Ok(SkillContent {
        frontmatter: parse_fields(&fm_lines),
        body: text[offset..].to_string(),
    })
}

/// Parse only the front-matter block of a SKILL.md document.
pub fn parse_frontmatter(text: &str) -> Result<Frontmatter> {
    Ok(parse_skill(text)?.frontmatter)
}

fn trim_line(line: &str) -> &str {
    line.trim_end_matches('\n').trim_end_matches('\r').trim_end()
}

fn parse_fields(lines: &[&str]) -> Frontmatter {
    let mut fm = Frontmatter::default();
    let mut i = 0;

    while i < lines.len() {
        let line = trim_line(lines[i]);
        i += 1;

        let trimmed = line.trim_start();
        // Blank lines, comments, and list items with no key line above them.
        if trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.starts_with("- ")
            || trimmed == "-"
        {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            continue;
        }

        // A key with an empty value may introduce a block list.
        let mut block_items: Vec<String> = Vec::new();
        if value.is_empty() {
            while i < lines.len() {
                let item_line = trim_line(lines[i]).trim_start();
                if let Some(item) = item_line.strip_prefix("- ") {
                    block_items.push(unquote(item.trim()).to_string());
                    i += 1;
                } else if item_line == "-" {
                    i += 1;
                } else {
                    break;
                }
            }
        }

        match key {
            "name" => set_scalar(&mut fm.name, value),
            "description" => set_scalar(&mut fm.description, value),
            "version" => set_scalar(&mut fm.version, value),
            "author" => set_scalar(&mut fm.author, value),
            "requires" => fm.requires = list_value(value, block_items),
            "optional" => fm.optional = list_value(value, block_items),
            _ => {
                let raw = if block_items.is_empty() {
                    value.to_string()
                } else {
                    block_items.join(", ")
                };
                fm.extra.push((key.to_string(), raw));
            },
        }
    }

    fm
}

fn set_scalar(slot: &mut Option<String>, value: &str) {
    let value = unquote(value);
    if !value.is_empty() {
        *slot = Some(value.to_string());
    }
}

fn list_value(value: &str, block_items: Vec<String>) -> Vec<String> {
    if !block_items.is_empty() {
        return block_items;
    }
    if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        return inner
            .split(',')
            .map(|item| unquote(item.trim()).to_string())
            .filter(|item| !item.is_empty())
            .collect();
    }
    if value.is_empty() {
        return Vec::new();
    }
    vec![unquote(value).to_string()]
}

/// Strip one matching pair of surrounding quotes.
fn unquote(value: &str) -> &str {
    let v = value.trim();
    if v.len() >= 2 {
        let bytes = v.as_bytes();
        if (bytes[0] == b'"' && bytes[v.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[v.len() - 1] == b'\'')
        {
            return &v[1..v.len() - 1];
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalars_and_body() {
        let content = parse_skill(
            "---\nname: pdf\ndescription: Work with PDF files\nversion: 1.2.0\nauthor: sam\n---\nUse the pdftotext binary.\n",
        )
        .unwrap();
        let fm = &content.frontmatter;
        assert_eq!(fm.name.as_deref(), Some("pdf"));
        assert_eq!(fm.description.as_deref(), Some("Work with PDF files"));
        assert_eq!(fm.version.as_deref(), Some("1.2.0"));
        assert_eq!(fm.author.as_deref(), Some("sam"));
        assert_eq!(content.body, "Use the pdftotext binary.\n");
    }

    #[test]
    fn inline_list_splits_on_commas() {
        let fm = parse_frontmatter("---\nrequires: [pdf, docx]\n---\n").unwrap();
        assert_eq!(fm.requires, vec!["pdf", "docx"]);
    }

    #[test]
    fn block_list_collects_dash_items() {
        let fm =
            parse_frontmatter("---\nrequires:\n  - pdf\n  - docx\noptional:\n  - ocr\n---\n")
                .unwrap();
        assert_eq!(fm.requires, vec!["pdf", "docx"]);
        assert_eq!(fm.optional, vec!["ocr"]);
    }

    #[test]
    fn versioned_items_pass_through_whole() {
        let fm = parse_frontmatter("---\nrequires: [pdf@1.0.0]\n---\n").unwrap();
        assert_eq!(fm.requires, vec!["pdf@1.0.0"]);
    }

    #[test]
    fn scalar_list_value_becomes_single_item() {
        let fm = parse_frontmatter("---\nrequires: pdf\n---\n").unwrap();
        assert_eq!(fm.requires, vec!["pdf"]);
    }

    #[test]
    fn unknown_keys_preserved_in_order() {
        let fm = parse_frontmatter(
            "---\nname: x\nhomepage: https://example.com\nallowed-tools:\n  - bash\n  - read\n---\n",
        )
        .unwrap();
        assert_eq!(
            fm.extra,
            vec![
                ("homepage".to_string(), "https://example.com".to_string()),
                ("allowed-tools".to_string(), "bash, read".to_string()),
            ]
        );
    }

    #[test]
    fn missing_opening_delimiter_rejected() {
        assert!(parse_skill("name: x\n---\nbody\n").is_err());
        assert!(parse_skill("plain text, no front matter\n").is_err());
        assert!(parse_skill("").is_err());
    }

    #[test]
    fn missing_closing_delimiter_rejected() {
        let err = parse_skill("---\nname: x\nbody without close\n").unwrap_err();
        assert!(err.to_string().contains("closing"));
    }

    #[test]
    fn crlf_manifest_parses() {
        let content = parse_skill("---\r\nname: pdf\r\n---\r\nbody\r\n").unwrap();
        assert_eq!(content.frontmatter.name.as_deref(), Some("pdf"));
        assert_eq!(content.body, "body\r\n");
    }

    #[test]
    fn quoted_values_unquoted() {
        let fm = parse_frontmatter(
            "---\nname: \"pdf\"\ndescription: 'Quoted: with colon'\nrequires: ['a', \"b\"]\n---\n",
        )
        .unwrap();
        assert_eq!(fm.name.as_deref(), Some("pdf"));
        assert_eq!(fm.description.as_deref(), Some("Quoted: with colon"));
        assert_eq!(fm.requires, vec!["a", "b"]);
    }

    #[test]
    fn empty_name_value_left_unset() {
        let fm = parse_frontmatter("---\nname:\ndescription: d\n---\n").unwrap();
        assert!(fm.name.is_none());
    }

    #[test]
    fn comments_and_blank_lines_ignored() {
        let fm = parse_frontmatter("---\n# about this skill\n\nname: pdf\n---\n").unwrap();
        assert_eq!(fm.name.as_deref(), Some("pdf"));
        assert!(fm.extra.is_empty());
    }

    #[test]
    fn empty_frontmatter_block_is_valid() {
        let content = parse_skill("---\n---\nbody\n").unwrap();
        assert!(content.frontmatter.name.is_none());
        assert_eq!(content.body, "body\n");
    }

    #[test]
    fn bom_is_tolerated() {
        let fm = parse_frontmatter("\u{feff}---\nname: pdf\n---\n").unwrap();
        assert_eq!(fm.name.as_deref(), Some("pdf"));
    }
}
