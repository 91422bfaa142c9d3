//! Semantic checks that need the whole manifest.
//!
//! Building a manifest never fails on cross references. These checks run
//! afterwards and produce issues that end up as report rows.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::manifest::TemplateManifest;

static ALIAS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.\-]*$").expect("alias pattern is valid"));

/// Problem found with one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceIssue {
    /// `LayoutTemplate` names no known layout.
    UnresolvedLayout { layout: String },
    /// A layout cannot itself use a layout.
    NestedLayout,
    /// Alias contains characters the server will reject.
    InvalidAlias,
}

impl fmt::Display for ReferenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceIssue::UnresolvedLayout { layout } => {
                write!(f, "Unresolved layout reference: {}", layout)
            }
            ReferenceIssue::NestedLayout => write!(f, "Layouts cannot reference another layout"),
            ReferenceIssue::InvalidAlias => write!(
                f,
                "Alias must start with a letter and contain only letters, numbers, '.', '-' or '_'"
            ),
        }
    }
}

/// An issue attributed to a manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryIssue {
    pub name: String,
    pub alias: String,
    pub issue: ReferenceIssue,
}

impl EntryIssue {
    pub fn message(&self) -> String {
        self.issue.to_string()
    }

    pub fn is_unresolved_layout(&self) -> bool {
        matches!(self.issue, ReferenceIssue::UnresolvedLayout { .. })
    }
}

/// Check layout references and aliases across the manifest.
///
/// `known_layouts` adds layout aliases that exist outside the manifest,
/// such as layouts already on the server.
pub fn check_references<'a>(
    manifest: &'a [TemplateManifest],
    known_layouts: impl IntoIterator<Item = &'a str>,
) -> Vec<EntryIssue> {
    let mut layouts: HashSet<&'a str> = manifest
        .iter()
        .filter(|t| t.is_layout())
        .map(|t| t.alias.as_str())
        .collect();
    layouts.extend(known_layouts);

    let mut issues = Vec::new();

    for entry in manifest {
        let mut push = |issue| {
            issues.push(EntryIssue {
                name: entry.name.clone(),
                alias: entry.alias.clone(),
                issue,
            })
        };

        if !ALIAS_PATTERN.is_match(&entry.alias) {
            push(ReferenceIssue::InvalidAlias);
        }

        if let Some(layout) = entry.layout_reference() {
            if entry.is_layout() {
                push(ReferenceIssue::NestedLayout);
            } else if !layouts.contains(layout) {
                push(ReferenceIssue::UnresolvedLayout {
                    layout: layout.to_string(),
                });
            }
        }
    }

    issues
}
