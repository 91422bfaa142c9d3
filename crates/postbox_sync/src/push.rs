//! Push local templates to the remote server.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use postbox_manifest::{check_references, ManifestBuilder, TemplateManifest};
use postbox_remote::{ListTemplate, TemplatePayload, TemplateService};

use crate::dispatch::{dispatch, DispatchOptions};
use crate::error::{EntryError, SyncError, SyncResult};
use crate::plan::{plan, PlanOptions, PlannedEntry, SyncDecision, SyncPlan};
use crate::report::{AggregateReport, EntryOutcome, Operation, ReportRow};

pub const CONFLICT_MESSAGE: &str = "Remote template differs; use --force to overwrite";
pub const MISSING_MESSAGE: &str = "Not found in manifest";

/// Options for a push.
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    pub plan: PlanOptions,
    pub dispatch: DispatchOptions,
    /// Plan and report without writing anything.
    pub dry_run: bool,
}

/// Plan and report of a push.
#[derive(Debug, Clone)]
pub struct PushOutcome {
    pub plan: SyncPlan,
    pub report: AggregateReport,
}

/// Build the manifest under `root` and push it.
pub async fn push_dir<S>(service: &S, root: impl AsRef<Path>, options: &PushOptions) -> SyncResult<PushOutcome>
where
    S: TemplateService + ?Sized,
{
    let root = root.as_ref();
    let manifest = ManifestBuilder::from_dir(root)?;
    if manifest.is_empty() {
        return Err(SyncError::EmptyManifest(root.to_path_buf()));
    }
    push(service, manifest, options).await
}

/// Reconcile `manifest` with the server and write the differences.
///
/// Only listing the remote templates can fail the whole push. Every other
/// failure lands in the report.
pub async fn push<S>(service: &S, manifest: Vec<TemplateManifest>, options: &PushOptions) -> SyncResult<PushOutcome>
where
    S: TemplateService + ?Sized,
{
    let list = service.list_templates().await?;
    let active: Vec<&ListTemplate> = list.active().collect();
    debug!("Server has {} active templates", active.len());

    let remote_layouts = active
        .iter()
        .filter(|t| t.template_type.is_layout())
        .filter_map(|t| t.alias.as_deref());
    let issues = check_references(&manifest, remote_layouts);
    let blocked: HashSet<String> = issues.iter().map(|i| i.alias.clone()).collect();
    let mut rows: Vec<ReportRow> = issues
        .iter()
        .filter(|i| options.plan.selects(&i.alias))
        .map(ReportRow::from)
        .collect();

    let remote_aliases: HashSet<&str> = active.iter().filter_map(|t| t.alias.as_deref()).collect();
    let to_fetch: Vec<&TemplateManifest> = manifest
        .iter()
        .filter(|t| options.plan.selects(&t.alias) && remote_aliases.contains(t.alias.as_str()))
        .collect();

    let fetched = dispatch(to_fetch, &options.dispatch, |entry| async move {
        (entry, service.get_template(&entry.alias).await)
    })
    .await;

    let mut remote = Vec::with_capacity(fetched.len());
    let mut fetch_failures = Vec::new();
    let mut unreachable = HashSet::new();
    for (entry, result) in fetched {
        match result {
            Ok(template) => remote.push(template),
            Err(e) => {
                warn!("Failed to fetch remote template '{}': {}", entry.alias, e);
                unreachable.insert(entry.alias.clone());
                fetch_failures.push(EntryOutcome::new(
                    &entry.name,
                    &entry.alias,
                    Operation::Fetch,
                    Err(e.into()),
                ));
            }
        }
    }

    let manifest: Vec<TemplateManifest> = manifest
        .into_iter()
        .filter(|t| !unreachable.contains(&t.alias))
        .collect();
    let mut plan = plan(manifest, &remote, &options.plan);
    plan.block(blocked.iter().map(String::as_str));

    rows.extend(
        plan.missing
            .iter()
            .map(|alias| ReportRow::new(alias.as_str(), alias.as_str(), MISSING_MESSAGE)),
    );
    rows.extend(
        plan.conflicts()
            .map(|p| ReportRow::new(p.entry.name.as_str(), p.entry.alias.as_str(), CONFLICT_MESSAGE)),
    );

    let mut report = AggregateReport::new();
    report.record_skipped(plan.count(SyncDecision::Skip));
    report.absorb(fetch_failures);

    if options.dry_run {
        info!("Dry run: {} templates would be pushed", plan.writes().count());
    } else {
        let (layouts, templates): (Vec<&PlannedEntry>, Vec<&PlannedEntry>) = plan
            .writes()
            .partition(|p| p.entry.is_layout());

        info!(
            "Pushing {} layouts and {} templates",
            layouts.len(),
            templates.len()
        );

        // Layouts go first so new templates can reference them.
        for wave in [layouts, templates] {
            let outcomes = dispatch(wave, &options.dispatch, |planned| push_entry(service, planned)).await;
            report.absorb(outcomes);
        }
    }

    report.prepend_rows(rows);
    Ok(PushOutcome { plan, report })
}

async fn push_entry<S>(service: &S, planned: &PlannedEntry) -> EntryOutcome
where
    S: TemplateService + ?Sized,
{
    let entry = &planned.entry;
    let payload = TemplatePayload::from(entry);

    let (operation, result) = match planned.decision {
        SyncDecision::Update => (
            Operation::Update,
            service.update_template(&entry.alias, &payload).await,
        ),
        _ => (Operation::Create, service.create_template(&payload).await),
    };

    match &result {
        Ok(template) => debug!("{} '{}' (id {})", operation, entry.alias, template.template_id),
        Err(e) => warn!("Failed to {} '{}': {}", operation, entry.alias, e),
    }

    let result: Result<Vec<String>, EntryError> = result.map(|_| Vec::new()).map_err(Into::into);
    EntryOutcome::new(entry.name.as_str(), entry.alias.as_str(), operation, result)
}
