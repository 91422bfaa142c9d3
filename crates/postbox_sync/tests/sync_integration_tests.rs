//! Integration tests for validate, push and pull against the mock service.

use std::fs;
use std::path::Path;

use postbox_manifest::{ManifestBuilder, ManifestError, TemplateType};
use postbox_remote::{MockService, RemoteTemplate};
use postbox_sync::{
    pull, push_dir, validate_dir, DispatchOptions, PlanOptions, PullOptions, PushOptions,
    SyncDecision, SyncError, CONFLICT_MESSAGE,
};
use tempfile::tempdir;

fn write_unit(root: &Path, dir: &str, meta: Option<&str>, html: &str) {
    let unit = root.join(dir);
    fs::create_dir_all(&unit).unwrap();
    if let Some(meta) = meta {
        fs::write(unit.join("meta.json"), meta).unwrap();
    }
    fs::write(unit.join("content.html"), html).unwrap();
}

fn remote(alias: &str, html: &str) -> RemoteTemplate {
    RemoteTemplate {
        template_id: 0,
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

fn push_all() -> PushOptions {
    PushOptions {
        plan: PlanOptions::all(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_validate_round_trip_success() {
    let temp = tempdir().unwrap();
    write_unit(
        temp.path(),
        "templates/welcome",
        Some(r#"{"Name": "Welcome", "Alias": "welcome", "TemplateType": "Standard"}"#),
        "<p>hi</p>",
    );
    let service = MockService::new();

    let report = validate_dir(&service, temp.path(), &DispatchOptions::default())
        .await
        .unwrap();

    assert!(report.is_success());
    assert!(report.rows.is_empty());
    assert_eq!(report.success_count, 1);
    assert_eq!(service.get_method_calls("validate_template").len(), 1);
}

#[tokio::test]
async fn test_missing_root_issues_no_remote_calls() {
    let temp = tempdir().unwrap();
    let service = MockService::new();

    let err = validate_dir(&service, temp.path().join("templates"), &DispatchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Manifest(ManifestError::PathNotFound(_))));

    let err = push_dir(&service, temp.path().join("templates"), &push_all())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Manifest(ManifestError::PathNotFound(_))));
    assert_eq!(service.call_count(), 0);
}

#[tokio::test]
async fn test_duplicate_alias_issues_no_remote_calls() {
    let temp = tempdir().unwrap();
    write_unit(temp.path(), "templates/welcome", None, "<p>a</p>");
    write_unit(temp.path(), "templates/other", Some(r#"{"Alias": "welcome"}"#), "<p>b</p>");
    let service = MockService::new();

    let err = push_dir(&service, temp.path(), &push_all()).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Manifest(ManifestError::DuplicateAlias { .. })
    ));
    assert_eq!(service.call_count(), 0);
}

#[tokio::test]
async fn test_empty_manifest() {
    let temp = tempdir().unwrap();
    let service = MockService::new();
    let err = validate_dir(&service, temp.path(), &DispatchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::EmptyManifest(_)));
}

#[tokio::test]
async fn test_unresolved_layout_reported() {
    let temp = tempdir().unwrap();
    write_unit(
        temp.path(),
        "templates/welcome",
        Some(r#"{"Name": "Welcome", "Alias": "welcome", "LayoutTemplate": "missing-layout"}"#),
        "<p>hi</p>",
    );
    let service = MockService::new();

    let report = validate_dir(&service, temp.path(), &DispatchOptions::default())
        .await
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].name, "Welcome");
    assert_eq!(report.rows[0].alias, "welcome");
    assert_eq!(report.rows[0].message, "Unresolved layout reference: missing-layout");
}

#[tokio::test]
async fn test_partial_validation_failure() {
    let temp = tempdir().unwrap();
    write_unit(temp.path(), "templates/a", None, "<p>ok</p>");
    write_unit(temp.path(), "templates/b", None, "{{#broken}}");
    write_unit(temp.path(), "templates/c", None, "<p>ok</p>");
    write_unit(temp.path(), "templates/d", None, "unreachable");
    let service = MockService::new()
        .with_validation_error("{{#broken", "Unclosed block")
        .fail_validation_request("unreachable", "Service unavailable");

    let report = validate_dir(&service, temp.path(), &DispatchOptions::bounded(2))
        .await
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.success_count, 2);
    assert_eq!(report.failed_count, 2);
    assert_eq!(report.rows[0].alias, "b");
    assert_eq!(report.rows[0].message, "Unclosed block");
    assert_eq!(report.rows[1].alias, "d");
}

#[tokio::test]
async fn test_push_creates_then_second_run_is_noop() {
    let temp = tempdir().unwrap();
    write_unit(
        temp.path(),
        "layouts/base",
        Some(r#"{"Name": "Base", "Alias": "base", "TemplateType": "Layout"}"#),
        "<main>{{{@content}}}</main>",
    );
    write_unit(
        temp.path(),
        "templates/welcome",
        Some(r#"{"Name": "Welcome", "Alias": "welcome", "LayoutTemplate": "base", "Subject": "Hi"}"#),
        "<p>hi</p>",
    );
    let service = MockService::new();

    let first = push_dir(&service, temp.path(), &push_all()).await.unwrap();
    assert!(first.report.is_success());
    assert_eq!(first.plan.count(SyncDecision::Create), 2);
    assert_eq!(first.report.success_count, 2);

    // The layout is written before the template that uses it.
    let creates = service.get_method_calls("create_template");
    assert_eq!(creates[0].target.as_deref(), Some("base"));
    assert_eq!(creates[1].target.as_deref(), Some("welcome"));

    let writes_before = service.write_count();
    let second = push_dir(&service, temp.path(), &push_all()).await.unwrap();
    assert!(second.report.is_success());
    assert_eq!(second.plan.count(SyncDecision::Skip), 2);
    assert_eq!(second.report.skipped_count, 2);
    assert_eq!(service.write_count(), writes_before);
}

#[tokio::test]
async fn test_push_conflict_requires_force() {
    let temp = tempdir().unwrap();
    write_unit(temp.path(), "templates/welcome", None, "<p>new</p>");
    let service = MockService::new().with_template(remote("welcome", "<p>old</p>"));

    let outcome = push_dir(&service, temp.path(), &push_all()).await.unwrap();
    assert!(!outcome.report.is_success());
    assert_eq!(outcome.report.rows[0].message, CONFLICT_MESSAGE);
    assert_eq!(service.write_count(), 0);

    let forced = PushOptions {
        plan: PlanOptions::all().force(true),
        ..Default::default()
    };
    let outcome = push_dir(&service, temp.path(), &forced).await.unwrap();
    assert!(outcome.report.is_success());
    assert_eq!(outcome.plan.count(SyncDecision::Update), 1);
    assert_eq!(
        service.template("welcome").unwrap().html_body.as_deref(),
        Some("<p>new</p>")
    );
}

#[tokio::test]
async fn test_push_selected_aliases_only() {
    let temp = tempdir().unwrap();
    write_unit(temp.path(), "templates/welcome", None, "<p>hi</p>");
    write_unit(temp.path(), "templates/receipt", None, "<p>thanks</p>");
    let service = MockService::new();

    let options = PushOptions {
        plan: PlanOptions::only(["receipt", "ghost"]),
        ..Default::default()
    };
    let outcome = push_dir(&service, temp.path(), &options).await.unwrap();

    assert_eq!(outcome.plan.entries.len(), 1);
    assert!(service.template("receipt").is_some());
    assert!(service.template("welcome").is_none());
    assert_eq!(outcome.report.rows.len(), 1);
    assert_eq!(outcome.report.rows[0].alias, "ghost");
}

#[tokio::test]
async fn test_push_failure_is_isolated() {
    let temp = tempdir().unwrap();
    write_unit(temp.path(), "templates/a", None, "<p>a</p>");
    write_unit(temp.path(), "templates/b", None, "<p>b</p>");
    write_unit(temp.path(), "templates/c", None, "<p>c</p>");
    let service = MockService::new().fail_alias("b", "Server error");

    let outcome = push_dir(&service, temp.path(), &push_all()).await.unwrap();

    assert!(!outcome.report.is_success());
    assert_eq!(outcome.report.success_count, 2);
    assert_eq!(outcome.report.failed_count, 1);
    assert_eq!(outcome.report.rows.len(), 1);
    assert!(service.template("a").is_some());
    assert!(service.template("c").is_some());
}

#[tokio::test]
async fn test_push_skips_unresolved_layout() {
    let temp = tempdir().unwrap();
    write_unit(
        temp.path(),
        "templates/welcome",
        Some(r#"{"Alias": "welcome", "LayoutTemplate": "missing-layout"}"#),
        "<p>hi</p>",
    );
    let service = MockService::new();

    let outcome = push_dir(&service, temp.path(), &push_all()).await.unwrap();
    assert_eq!(outcome.report.rows.len(), 1);
    assert_eq!(service.write_count(), 0);

    assert_eq!(outcome.plan.count(SyncDecision::Blocked), 1);
    assert_eq!(outcome.plan.count(SyncDecision::Create), 0);
    assert_eq!(outcome.plan.writes().count(), 0);
    assert!(outcome.plan.is_noop());
}

#[tokio::test]
async fn test_dry_run_does_not_count_blocked_entries() {
    let temp = tempdir().unwrap();
    write_unit(temp.path(), "templates/receipt", None, "<p>thanks</p>");
    write_unit(
        temp.path(),
        "templates/welcome",
        Some(r#"{"Alias": "welcome", "LayoutTemplate": "missing-layout"}"#),
        "<p>hi</p>",
    );
    let service = MockService::new();

    let options = PushOptions {
        dry_run: true,
        ..push_all()
    };
    let outcome = push_dir(&service, temp.path(), &options).await.unwrap();
    let writes: Vec<&str> = outcome
        .plan
        .writes()
        .map(|p| p.entry.alias.as_str())
        .collect();
    assert_eq!(writes, vec!["receipt"]);
    assert_eq!(outcome.plan.count(SyncDecision::Blocked), 1);
    assert!(!outcome.report.is_success());
}

#[tokio::test]
async fn test_push_dry_run_writes_nothing() {
    let temp = tempdir().unwrap();
    write_unit(temp.path(), "templates/welcome", None, "<p>hi</p>");
    let service = MockService::new();

    let options = PushOptions {
        dry_run: true,
        ..push_all()
    };
    let outcome = push_dir(&service, temp.path(), &options).await.unwrap();
    assert_eq!(outcome.plan.count(SyncDecision::Create), 1);
    assert!(outcome.report.is_success());
    assert_eq!(service.write_count(), 0);
}

#[tokio::test]
async fn test_list_failure_aborts_push() {
    let temp = tempdir().unwrap();
    write_unit(temp.path(), "templates/welcome", None, "<p>hi</p>");
    let service = MockService::new().fail_list("Unauthorized");

    let err = push_dir(&service, temp.path(), &push_all()).await.unwrap_err();
    assert!(matches!(err, SyncError::Remote(_)));
    assert_eq!(service.write_count(), 0);
}

#[tokio::test]
async fn test_pull_then_push_is_noop() {
    let mut layout = remote("base", "<main>{{{@content}}}</main>");
    layout.name = "Base".to_string();
    layout.template_type = TemplateType::Layout;
    let mut welcome = remote("welcome", "<p>hi</p>");
    welcome.subject = Some("Hello".to_string());
    welcome.text_body = Some("hi".to_string());
    welcome.layout_template = Some("base".to_string());
    let mut deleted = remote("old", "<p>gone</p>");
    deleted.active = false;

    let service = MockService::new()
        .with_template(layout)
        .with_template(welcome)
        .with_template(deleted);

    let temp = tempdir().unwrap();
    let report = pull(&service, &PullOptions::new(temp.path())).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.success_count, 2);
    assert!(temp.path().join("layouts/base/meta.json").exists());
    assert!(temp.path().join("templates/welcome/content.txt").exists());
    assert!(!temp.path().join("templates/old").exists());

    let manifest = ManifestBuilder::from_dir(temp.path()).unwrap();
    assert_eq!(manifest.len(), 2);

    let outcome = push_dir(&service, temp.path(), &push_all()).await.unwrap();
    assert!(outcome.report.is_success());
    assert!(outcome.plan.is_noop());
    assert_eq!(service.write_count(), 0);
}

#[tokio::test]
async fn test_pull_respects_overwrite() {
    let service = MockService::new().with_template(remote("welcome", "<p>remote</p>"));
    let temp = tempdir().unwrap();
    write_unit(temp.path(), "templates/welcome", None, "<p>local</p>");

    let report = pull(&service, &PullOptions::new(temp.path())).await.unwrap();
    assert_eq!(report.skipped_count, 1);
    let html = fs::read_to_string(temp.path().join("templates/welcome/content.html")).unwrap();
    assert_eq!(html, "<p>local</p>");

    let report = pull(&service, &PullOptions::new(temp.path()).overwrite(true))
        .await
        .unwrap();
    assert_eq!(report.success_count, 1);
    let html = fs::read_to_string(temp.path().join("templates/welcome/content.html")).unwrap();
    assert_eq!(html, "<p>remote</p>");
}
