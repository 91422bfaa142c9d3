//! Validate a manifest against the remote server.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use postbox_manifest::{check_references, ManifestBuilder, TemplateManifest};
use postbox_remote::{TemplateService, ValidationPayload};

use crate::dispatch::{dispatch, DispatchOptions};
use crate::error::{EntryError, SyncError, SyncResult};
use crate::report::{AggregateReport, EntryOutcome, Operation, ReportRow};

/// Build the manifest under `root` and validate every entry.
pub async fn validate_dir<S>(
    service: &S,
    root: impl AsRef<Path>,
    options: &DispatchOptions,
) -> SyncResult<AggregateReport>
where
    S: TemplateService + ?Sized,
{
    let root = root.as_ref();
    let manifest = ManifestBuilder::from_dir(root)?;
    if manifest.is_empty() {
        return Err(SyncError::EmptyManifest(root.to_path_buf()));
    }
    Ok(validate(service, manifest, options).await)
}

/// Validate manifest entries remotely and combine the results with local
/// reference checks.
pub async fn validate<S>(
    service: &S,
    manifest: Vec<TemplateManifest>,
    options: &DispatchOptions,
) -> AggregateReport
where
    S: TemplateService + ?Sized,
{
    let local_rows: Vec<ReportRow> = check_references(&manifest, [])
        .iter()
        .map(ReportRow::from)
        .collect();

    let layouts: HashMap<&str, &TemplateManifest> = manifest
        .iter()
        .filter(|t| t.is_layout())
        .map(|t| (t.alias.as_str(), t))
        .collect();

    let requests: Vec<(&TemplateManifest, ValidationPayload)> = manifest
        .iter()
        .map(|entry| {
            let layout_content = entry
                .layout_reference()
                .filter(|_| !entry.is_layout())
                .and_then(|alias| layouts.get(alias))
                .and_then(|layout| layout.html_body.clone());
            (entry, ValidationPayload::for_entry(entry, layout_content))
        })
        .collect();

    info!("Validating {} templates", requests.len());

    let outcomes = dispatch(requests, options, |(entry, payload)| async move {
        let result: Result<Vec<String>, EntryError> = service
            .validate_template(&payload)
            .await
            .map(|response| response.errors().map(|e| e.message.clone()).collect())
            .map_err(Into::into);
        EntryOutcome::new(&entry.name, &entry.alias, Operation::Validate, result)
    })
    .await;

    let mut report = AggregateReport::new();
    report.absorb(outcomes);
    report.prepend_rows(local_rows);
    report
}
