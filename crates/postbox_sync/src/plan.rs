//! Diffing local manifest entries against remote templates.

use std::collections::{HashMap, HashSet};
use std::fmt;

use postbox_manifest::{TemplateManifest, TemplateStatus};
use postbox_remote::RemoteTemplate;

/// Action computed for one manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// No remote template shares the alias.
    Create,
    /// Remote content differs and overwriting was allowed.
    Update,
    /// Remote content is identical.
    Skip,
    /// Remote content differs and overwriting was not allowed.
    Conflict,
    /// A write was planned but the entry has local reference problems.
    Blocked,
}

impl SyncDecision {
    /// Whether the decision results in a remote write.
    pub fn is_write(&self) -> bool {
        matches!(self, SyncDecision::Create | SyncDecision::Update)
    }
}

impl fmt::Display for SyncDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncDecision::Create => "create",
            SyncDecision::Update => "update",
            SyncDecision::Skip => "skip",
            SyncDecision::Conflict => "conflict",
            SyncDecision::Blocked => "blocked",
        };
        write!(f, "{}", s)
    }
}

/// Options controlling which entries are planned and how.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Overwrite remote templates whose content differs.
    pub force: bool,
    /// Plan every manifest entry, ignoring `include`.
    pub all: bool,
    /// Aliases to plan when `all` is not set.
    pub include: Vec<String>,
}

impl PlanOptions {
    pub fn all() -> Self {
        Self {
            all: true,
            ..Default::default()
        }
    }

    pub fn only<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: aliases.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn selects(&self, alias: &str) -> bool {
        self.all || self.include.iter().any(|a| a == alias)
    }
}

/// A manifest entry with its decision.
#[derive(Debug, Clone)]
pub struct PlannedEntry {
    /// The entry, with `New` and `Status` filled in
    pub entry: TemplateManifest,
    pub decision: SyncDecision,
    /// Id of the matching remote template
    pub remote_id: Option<u64>,
}

/// Result of planning.
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    pub entries: Vec<PlannedEntry>,
    /// Requested aliases that matched no manifest entry
    pub missing: Vec<String>,
}

impl SyncPlan {
    pub fn count(&self, decision: SyncDecision) -> usize {
        self.entries.iter().filter(|e| e.decision == decision).count()
    }

    /// Entries that will be written to the server.
    pub fn writes(&self) -> impl Iterator<Item = &PlannedEntry> {
        self.entries.iter().filter(|e| e.decision.is_write())
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &PlannedEntry> {
        self.entries
            .iter()
            .filter(|e| e.decision == SyncDecision::Conflict)
    }

    /// Hold back planned writes for `aliases`.
    pub fn block<'a>(&mut self, aliases: impl IntoIterator<Item = &'a str>) {
        let aliases: HashSet<&str> = aliases.into_iter().collect();
        for planned in self
            .entries
            .iter_mut()
            .filter(|p| p.decision.is_write() && aliases.contains(p.entry.alias.as_str()))
        {
            planned.decision = SyncDecision::Blocked;
        }
    }

    pub fn is_noop(&self) -> bool {
        self.writes().next().is_none()
    }
}

/// Decide what to do with each selected manifest entry.
///
/// `remote` should hold full templates (with content) for the aliases that
/// exist on the server. Inactive remote templates are ignored.
pub fn plan(manifest: Vec<TemplateManifest>, remote: &[RemoteTemplate], options: &PlanOptions) -> SyncPlan {
    let by_alias: HashMap<&str, &RemoteTemplate> = remote
        .iter()
        .filter(|t| t.active)
        .filter_map(|t| t.alias.as_deref().map(|alias| (alias, t)))
        .collect();

    let missing = if options.all {
        Vec::new()
    } else {
        options
            .include
            .iter()
            .filter(|alias| !manifest.iter().any(|t| &t.alias == *alias))
            .cloned()
            .collect()
    };

    let entries = manifest
        .into_iter()
        .filter(|entry| options.selects(&entry.alias))
        .map(|mut entry| {
            let (decision, remote_id) = match by_alias.get(entry.alias.as_str()) {
                None => (SyncDecision::Create, None),
                Some(remote) if content_matches(&entry, remote) => {
                    (SyncDecision::Skip, Some(remote.template_id))
                }
                Some(remote) if options.force => (SyncDecision::Update, Some(remote.template_id)),
                Some(remote) => (SyncDecision::Conflict, Some(remote.template_id)),
            };

            entry.new = Some(remote_id.is_none());
            entry.status = Some(match decision {
                SyncDecision::Create => TemplateStatus::New,
                SyncDecision::Skip => TemplateStatus::Unchanged,
                SyncDecision::Update | SyncDecision::Conflict | SyncDecision::Blocked => {
                    TemplateStatus::Modified
                }
            });

            PlannedEntry {
                entry,
                decision,
                remote_id,
            }
        })
        .collect();

    SyncPlan { entries, missing }
}

/// Field-by-field content equality between a local entry and a remote template.
///
/// Empty and absent values are equal, and CRLF line endings compare equal to LF.
pub fn content_matches(local: &TemplateManifest, remote: &RemoteTemplate) -> bool {
    local.name == remote.name
        && local.template_type == remote.template_type
        && normalize(&local.subject) == normalize(&remote.subject)
        && normalize(&local.html_body) == normalize(&remote.html_body)
        && normalize(&local.text_body) == normalize(&remote.text_body)
        && normalize(&local.layout_template) == normalize(&remote.layout_template)
}

fn normalize(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("\r\n", "\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use postbox_manifest::TemplateType;

    fn local(alias: &str, html: &str) -> TemplateManifest {
        TemplateManifest::new(alias, alias, TemplateType::Standard).with_html(html)
    }

    fn remote(id: u64, alias: &str, html: &str) -> RemoteTemplate {
        RemoteTemplate {
            template_id: id,
            name: alias.to_string(),
            alias: Some(alias.to_string()),
            subject: None,
            html_body: Some(html.to_string()),
            text_body: None,
            template_type: TemplateType::Standard,
            layout_template: None,
            active: true,
            associated_server_id: None,
        }
    }

    #[test]
    fn test_create_when_alias_unknown() {
        let result = plan(vec![local("welcome", "<p>hi</p>")], &[], &PlanOptions::all());
        let entry = &result.entries[0];
        assert_eq!(entry.decision, SyncDecision::Create);
        assert_eq!(entry.entry.new, Some(true));
        assert_eq!(entry.entry.status, Some(TemplateStatus::New));
    }

    #[test]
    fn test_skip_identical_content() {
        let result = plan(
            vec![local("welcome", "<p>hi</p>\r\n")],
            &[remote(7, "welcome", "<p>hi</p>\n")],
            &PlanOptions::all(),
        );
        assert_eq!(result.entries[0].decision, SyncDecision::Skip);
        assert_eq!(result.entries[0].remote_id, Some(7));
        assert!(result.is_noop());
    }

    #[test]
    fn test_conflict_without_force() {
        let result = plan(
            vec![local("welcome", "<p>new</p>")],
            &[remote(7, "welcome", "<p>old</p>")],
            &PlanOptions::all(),
        );
        assert_eq!(result.entries[0].decision, SyncDecision::Conflict);
        assert_eq!(result.entries[0].entry.status, Some(TemplateStatus::Modified));
        assert_eq!(result.conflicts().count(), 1);
    }

    #[test]
    fn test_update_with_force() {
        let result = plan(
            vec![local("welcome", "<p>new</p>")],
            &[remote(7, "welcome", "<p>old</p>")],
            &PlanOptions::all().force(true),
        );
        assert_eq!(result.entries[0].decision, SyncDecision::Update);
        assert_eq!(result.entries[0].entry.new, Some(false));
    }

    #[test]
    fn test_block_holds_back_writes_only() {
        let mut result = plan(
            vec![local("welcome", "<p>new</p>"), local("receipt", "<p>hi</p>")],
            &[remote(7, "welcome", "<p>old</p>")],
            &PlanOptions::all(),
        );
        result.block(["welcome", "receipt"]);

        assert_eq!(result.entries[0].decision, SyncDecision::Conflict);
        assert_eq!(result.entries[1].decision, SyncDecision::Blocked);
        assert_eq!(result.entries[1].entry.status, Some(TemplateStatus::New));
        assert!(result.is_noop());
    }

    #[test]
    fn test_inactive_remote_ignored() {
        let mut deleted = remote(7, "welcome", "<p>hi</p>");
        deleted.active = false;
        let result = plan(vec![local("welcome", "<p>hi</p>")], &[deleted], &PlanOptions::all());
        assert_eq!(result.entries[0].decision, SyncDecision::Create);
    }

    #[test]
    fn test_include_list_selection() {
        let manifest = vec![local("welcome", "a"), local("receipt", "b")];
        let result = plan(manifest, &[], &PlanOptions::only(["receipt", "nope"]));
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].entry.alias, "receipt");
        assert_eq!(result.missing, vec!["nope".to_string()]);
    }

    #[test]
    fn test_empty_and_absent_fields_match() {
        let mut entry = local("welcome", "<p>hi</p>");
        entry.subject = Some(String::new());
        entry.text_body = Some(String::new());
        assert!(content_matches(&entry, &remote(1, "welcome", "<p>hi</p>")));
    }

    #[test]
    fn test_subject_and_layout_differences() {
        let base = remote(1, "welcome", "<p>hi</p>");
        assert!(!content_matches(&local("welcome", "<p>hi</p>").with_subject("Hi"), &base));
        assert!(!content_matches(&local("welcome", "<p>hi</p>").with_layout("base"), &base));
    }
}
