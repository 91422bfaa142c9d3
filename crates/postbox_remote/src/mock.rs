//! In-memory template service for testing.
//!
//! Holds a set of templates, applies creates and updates to them, and
//! answers validation requests from configurable rules. All calls are
//! captured for verification.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{RemoteError, RemoteResult};
use crate::service::TemplateService;
use crate::types::{
    ContentValidation, ListTemplate, RemoteTemplate, TemplateList, TemplatePayload,
    ValidationMessage, ValidationPayload, ValidationResponse,
};

/// Captured call information for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCall {
    pub method: String,
    pub target: Option<String>,
}

/// Validation rule: any payload whose content contains `needle` yields `message`.
#[derive(Debug, Clone)]
struct ValidationRule {
    needle: String,
    message: String,
    request_fails: bool,
}

/// Mock template service.
#[derive(Clone)]
pub struct MockService {
    templates: Arc<RwLock<Vec<RemoteTemplate>>>,
    next_id: Arc<AtomicU64>,
    rules: Arc<RwLock<Vec<ValidationRule>>>,
    /// Aliases whose get/create/update calls fail.
    failing: Arc<RwLock<Vec<(String, String)>>>,
    list_failure: Arc<RwLock<Option<String>>>,
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockService {
    pub fn new() -> Self {
        Self {
            templates: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            rules: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(Vec::new())),
            list_failure: Arc::new(RwLock::new(None)),
            captured_calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Seed a template that already exists on the server.
    pub fn with_template(self, mut template: RemoteTemplate) -> Self {
        if template.template_id == 0 {
            template.template_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        }
        self.templates.write().push(template);
        self
    }

    /// Report `message` as a validation error for content containing `needle`.
    pub fn with_validation_error(self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.write().push(ValidationRule {
            needle: needle.into(),
            message: message.into(),
            request_fails: false,
        });
        self
    }

    /// Fail the validate request itself for content containing `needle`.
    pub fn fail_validation_request(self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.write().push(ValidationRule {
            needle: needle.into(),
            message: message.into(),
            request_fails: true,
        });
        self
    }

    /// Fail every get, create and update call targeting `alias`.
    pub fn fail_alias(self, alias: impl Into<String>, message: impl Into<String>) -> Self {
        self.failing.write().push((alias.into(), message.into()));
        self
    }

    /// Fail the list call.
    pub fn fail_list(self, message: impl Into<String>) -> Self {
        *self.list_failure.write() = Some(message.into());
        self
    }

    /// Current server-side templates.
    pub fn templates(&self) -> Vec<RemoteTemplate> {
        self.templates.read().clone()
    }

    pub fn template(&self, alias: &str) -> Option<RemoteTemplate> {
        self.templates
            .read()
            .iter()
            .find(|t| t.alias.as_deref() == Some(alias))
            .cloned()
    }

    /// Get all captured calls.
    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    /// Get calls to a specific method.
    pub fn get_method_calls(&self, method: &str) -> Vec<CapturedCall> {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    /// Number of create and update calls.
    pub fn write_count(&self) -> usize {
        self.get_method_calls("create_template").len() + self.get_method_calls("update_template").len()
    }

    fn record_call(&self, method: &str, target: Option<&str>) {
        self.captured_calls.write().push(CapturedCall {
            method: method.to_string(),
            target: target.map(str::to_string),
        });
    }

    fn check_alias(&self, alias: &str) -> RemoteResult<()> {
        if let Some((_, message)) = self.failing.read().iter().find(|(a, _)| a == alias) {
            return Err(RemoteError::api(500, message.clone()));
        }
        Ok(())
    }

    fn find_index(&self, id_or_alias: &str) -> Option<usize> {
        self.templates.read().iter().position(|t| {
            t.alias.as_deref() == Some(id_or_alias) || t.template_id.to_string() == id_or_alias
        })
    }
}

fn apply(template: &mut RemoteTemplate, payload: &TemplatePayload) {
    template.name = payload.name.clone();
    template.alias = Some(payload.alias.clone());
    template.subject = payload.subject.clone();
    template.html_body = payload.html_body.clone();
    template.text_body = payload.text_body.clone();
    template.layout_template = payload.layout_template.clone();
}

#[async_trait]
impl TemplateService for MockService {
    async fn validate_template(&self, payload: &ValidationPayload) -> RemoteResult<ValidationResponse> {
        self.record_call("validate_template", None);

        let content = [&payload.subject, &payload.html_body, &payload.text_body]
            .into_iter()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");

        let mut errors = Vec::new();
        for rule in self.rules.read().iter().filter(|r| content.contains(&r.needle)) {
            if rule.request_fails {
                return Err(RemoteError::api(0, rule.message.clone()));
            }
            errors.push(ValidationMessage::new(rule.message.clone()));
        }

        Ok(ValidationResponse {
            all_content_is_valid: Some(errors.is_empty()),
            html_body: Some(ContentValidation::with_errors(errors)),
            text_body: None,
            subject: None,
        })
    }

    async fn list_templates(&self) -> RemoteResult<TemplateList> {
        self.record_call("list_templates", None);
        if let Some(message) = self.list_failure.read().clone() {
            return Err(RemoteError::api(0, message));
        }

        let templates: Vec<ListTemplate> = self
            .templates
            .read()
            .iter()
            .map(|t| ListTemplate {
                template_id: t.template_id,
                name: t.name.clone(),
                alias: t.alias.clone(),
                template_type: t.template_type,
                layout_template: t.layout_template.clone(),
                active: t.active,
            })
            .collect();

        Ok(TemplateList {
            total_count: templates.len() as u64,
            templates,
        })
    }

    async fn get_template(&self, id_or_alias: &str) -> RemoteResult<RemoteTemplate> {
        self.record_call("get_template", Some(id_or_alias));
        self.check_alias(id_or_alias)?;
        let index = self
            .find_index(id_or_alias)
            .ok_or_else(|| RemoteError::NotFound(id_or_alias.to_string()))?;
        Ok(self.templates.read()[index].clone())
    }

    async fn create_template(&self, payload: &TemplatePayload) -> RemoteResult<RemoteTemplate> {
        self.record_call("create_template", Some(&payload.alias));
        self.check_alias(&payload.alias)?;
        if self.find_index(&payload.alias).is_some() {
            return Err(RemoteError::api(
                1105,
                format!("Template with alias '{}' already exists", payload.alias),
            ));
        }

        let mut template = RemoteTemplate {
            template_id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: String::new(),
            alias: None,
            subject: None,
            html_body: None,
            text_body: None,
            template_type: payload.template_type,
            layout_template: None,
            active: true,
            associated_server_id: None,
        };
        apply(&mut template, payload);
        self.templates.write().push(template.clone());
        Ok(template)
    }

    async fn update_template(
        &self,
        id_or_alias: &str,
        payload: &TemplatePayload,
    ) -> RemoteResult<RemoteTemplate> {
        self.record_call("update_template", Some(id_or_alias));
        self.check_alias(id_or_alias)?;
        let index = self
            .find_index(id_or_alias)
            .ok_or_else(|| RemoteError::NotFound(id_or_alias.to_string()))?;

        let mut templates = self.templates.write();
        apply(&mut templates[index], payload);
        Ok(templates[index].clone())
    }
}
