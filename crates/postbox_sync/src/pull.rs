//! Pull remote templates into a local directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use postbox_manifest::{expand_home, MetaFile, TemplateType};
use postbox_remote::{ListTemplate, RemoteTemplate, TemplateService};

use crate::dispatch::{dispatch, DispatchOptions};
use crate::error::{EntryError, SyncResult};
use crate::report::{AggregateReport, EntryOutcome, Operation};

/// Options for a pull.
#[derive(Debug, Clone)]
pub struct PullOptions {
    pub output_dir: PathBuf,
    /// Replace unit directories that already exist.
    pub overwrite: bool,
    pub dispatch: DispatchOptions,
}

impl PullOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            overwrite: false,
            dispatch: DispatchOptions::default(),
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Download every active remote template into `options.output_dir`.
pub async fn pull<S>(service: &S, options: &PullOptions) -> SyncResult<AggregateReport>
where
    S: TemplateService + ?Sized,
{
    let output_dir = expand_home(&options.output_dir);
    fs::create_dir_all(&output_dir)?;

    let list = service.list_templates().await?;
    let targets: Vec<&ListTemplate> = list.active().collect();
    info!("Pulling {} templates into {:?}", targets.len(), output_dir);

    let fetched = dispatch(targets, &options.dispatch, |summary| async move {
        (summary, service.get_template(&summary.id_or_alias()).await)
    })
    .await;

    let mut report = AggregateReport::new();
    let mut outcomes = Vec::with_capacity(fetched.len());

    for (summary, result) in fetched {
        let alias = summary
            .alias
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| slug(&summary.name, summary.template_id));

        let result = match result {
            Err(e) => Err(e.into()),
            Ok(template) => {
                let dir = unit_dir(&output_dir, template.template_type, &alias);
                if dir.exists() && !options.overwrite {
                    warn!("Skipping '{}': {:?} already exists", alias, dir);
                    report.record_skipped(1);
                    continue;
                }
                write_unit(&dir, &template, &alias).map(|_| Vec::new())
            }
        };
        outcomes.push(EntryOutcome::new(summary.name.as_str(), alias, Operation::Pull, result));
    }

    report.absorb(outcomes);
    Ok(report)
}

/// Directory a template is stored in, by type.
pub fn unit_dir(root: &Path, template_type: TemplateType, alias: &str) -> PathBuf {
    let group = match template_type {
        TemplateType::Standard => "templates",
        TemplateType::Layout => "layouts",
    };
    root.join(group).join(alias)
}

fn write_unit(dir: &Path, template: &RemoteTemplate, alias: &str) -> Result<(), EntryError> {
    fs::create_dir_all(dir)?;
    write_body(&dir.join("content.html"), &template.html_body)?;
    write_body(&dir.join("content.txt"), &template.text_body)?;

    let meta = MetaFile {
        name: Some(template.name.clone()),
        alias: Some(alias.to_string()),
        template_type: Some(template.template_type.to_string()),
        subject: template.subject.clone(),
        layout_template: template.layout_template.clone(),
        test_render_model: None,
    };
    fs::write(dir.join("meta.json"), serde_json::to_string_pretty(&meta)?)?;
    Ok(())
}

/// Write a body file, removing a stale one when the body is absent.
fn write_body(path: &Path, body: &Option<String>) -> std::io::Result<()> {
    match body.as_deref().filter(|b| !b.is_empty()) {
        Some(body) => fs::write(path, body),
        None if path.exists() => fs::remove_file(path),
        None => Ok(()),
    }
}

/// Directory-safe name for templates without an alias.
fn slug(name: &str, template_id: u64) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        template_id.to_string()
    } else {
        slug.to_string()
    }
}
