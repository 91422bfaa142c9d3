//! Template service capability trait.

use async_trait::async_trait;

use crate::error::RemoteResult;
use crate::types::{RemoteTemplate, TemplateList, TemplatePayload, ValidationPayload, ValidationResponse};

/// Operations the sync engine needs from a remote template server.
#[async_trait]
pub trait TemplateService: Send + Sync {
    /// Validate template content without saving it.
    async fn validate_template(&self, payload: &ValidationPayload) -> RemoteResult<ValidationResponse>;

    /// List every template on the server, including inactive ones.
    async fn list_templates(&self) -> RemoteResult<TemplateList>;

    /// Fetch one template with its content.
    async fn get_template(&self, id_or_alias: &str) -> RemoteResult<RemoteTemplate>;

    /// Create a new template.
    async fn create_template(&self, payload: &TemplatePayload) -> RemoteResult<RemoteTemplate>;

    /// Replace an existing template's content.
    async fn update_template(
        &self,
        id_or_alias: &str,
        payload: &TemplatePayload,
    ) -> RemoteResult<RemoteTemplate>;
}
