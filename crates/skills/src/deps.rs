use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::frontmatter;

/// One edge in the skill requirement graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub name: String,
    /// Carried through for display only; never compared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub optional: bool,
}

impl Dependency {
    /// Parse one list item, either `name` or `name@version`.
    fn from_item(item: &str, optional: bool) -> Self {
        match item.split_once('@') {
            Some((name, version)) if !name.is_empty() && !version.is_empty() => Self {
                name: name.to_string(),
                version: Some(version.to_string()),
                optional,
            },
            _ => Self {
                name: item.to_string(),
                version: None,
                optional,
            },
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{v}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Requirement lists extracted from one manifest.
#[derive(Debug, Clone, Default)]
pub struct ParsedDependencies {
    pub requires: Vec<Dependency>,
    pub optional: Vec<Dependency>,
}

/// Extract requirement edges from manifest text. Invalid manifests have
/// no dependencies.
#[must_use]
pub fn parse(manifest_text: &str) -> ParsedDependencies {
    let Ok(fm) = frontmatter::parse_frontmatter(manifest_text) else {
        return ParsedDependencies::default();
    };
    ParsedDependencies {
        requires: fm
            .requires
            .iter()
            .map(|item| Dependency::from_item(item, false))
            .collect(),
        optional: fm
            .optional
            .iter()
            .map(|item| Dependency::from_item(item, true))
            .collect(),
    }
}

/// Result of checking one skill's requirements against installed names.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyCheck {
    pub satisfied: bool,
    pub missing: Vec<Dependency>,
    pub optional_missing: Vec<Dependency>,
}

/// Check a skill's requirements by case-insensitive name membership in
/// `installed`.
#[must_use]
pub fn check(skill_path: &Path, installed: &[String]) -> DependencyCheck {
    let text = std::fs::read_to_string(skill_path).unwrap_or_default();
    let parsed = parse(&text);
    let have: HashSet<String> = installed.iter().map(|n| n.to_lowercase()).collect();
    let absent = |dep: &Dependency| !have.contains(&dep.name.to_lowercase());

    let missing: Vec<Dependency> = parsed.requires.into_iter().filter(absent).collect();
    let optional_missing: Vec<Dependency> = parsed.optional.into_iter().filter(absent).collect();

    DependencyCheck {
        satisfied: missing.is_empty(),
        missing,
        optional_missing,
    }
}

/// Depth-first walk over `requires` edges starting at `skill_path`.
///
/// `visited` is keyed by the referencing skill's directory basename, so a
/// directory is expanded at most once per call and cyclic graphs
/// terminate. Dependencies the lookup cannot locate stay in the output as
/// unexpandable leaves.
pub fn resolve_transitive(
    skill_path: &Path,
    lookup: &dyn Fn(&str) -> Option<PathBuf>,
    visited: &mut HashSet<String>,
) -> Vec<Dependency> {
    let key = skill_path
        .parent()
        .and_then(|dir| dir.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !visited.insert(key) {
        return Vec::new();
    }

    let text = std::fs::read_to_string(skill_path).unwrap_or_default();

    let mut out = Vec::new();
    for dep in parse(&text).requires {
        let target = lookup(&dep.name);
        out.push(dep);
        if let Some(target_path) = target {
            out.extend(resolve_transitive(&target_path, lookup, visited));
        }
    }
    out
}
