//! Wire types exchanged with the template service.

use serde::{Deserialize, Serialize};

use postbox_manifest::{TemplateManifest, TemplateType};

fn default_active() -> bool {
    true
}

/// Full template as stored on the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteTemplate {
    pub template_id: u64,
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub html_body: Option<String>,
    #[serde(default)]
    pub text_body: Option<String>,
    #[serde(default)]
    pub template_type: TemplateType,
    #[serde(default)]
    pub layout_template: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub associated_server_id: Option<u64>,
}

/// Summary row returned when listing templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ListTemplate {
    pub template_id: u64,
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub template_type: TemplateType,
    #[serde(default)]
    pub layout_template: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl ListTemplate {
    /// Alias if set, else the numeric id. Usable as an `{idOrAlias}` path segment.
    pub fn id_or_alias(&self) -> String {
        match self.alias.as_deref().filter(|a| !a.is_empty()) {
            Some(alias) => alias.to_string(),
            None => self.template_id.to_string(),
        }
    }
}

/// Response of the list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateList {
    pub total_count: u64,
    #[serde(default)]
    pub templates: Vec<ListTemplate>,
}

impl TemplateList {
    /// Templates that are not soft-deleted.
    pub fn active(&self) -> impl Iterator<Item = &ListTemplate> {
        self.templates.iter().filter(|t| t.active)
    }
}

/// Body for create and update requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TemplatePayload {
    pub name: String,
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,
    pub template_type: TemplateType,
    pub layout_template: Option<String>,
}

impl From<&TemplateManifest> for TemplatePayload {
    fn from(entry: &TemplateManifest) -> Self {
        Self {
            name: entry.name.clone(),
            alias: entry.alias.clone(),
            subject: entry.subject.clone(),
            html_body: entry.html_body.clone(),
            text_body: entry.text_body.clone(),
            template_type: entry.template_type,
            layout_template: entry.layout_reference().map(str::to_string),
        }
    }
}

/// Body for the validate endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ValidationPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,
    pub template_type: TemplateType,
    /// Body of the layout the template renders inside
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_content: Option<String>,
}

impl ValidationPayload {
    pub fn for_entry(entry: &TemplateManifest, layout_content: Option<String>) -> Self {
        Self {
            subject: entry.subject.clone(),
            html_body: entry.html_body.clone(),
            text_body: entry.text_body.clone(),
            template_type: entry.template_type,
            layout_content,
        }
    }
}

/// A single validation message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ValidationMessage {
    pub message: String,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub character_position: Option<u32>,
}

impl ValidationMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            character_position: None,
        }
    }
}

/// Validation outcome for one content section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ContentValidation {
    #[serde(default)]
    pub content_is_valid: Option<bool>,
    #[serde(default)]
    pub validation_errors: Option<Vec<ValidationMessage>>,
    #[serde(default)]
    pub rendered_content: Option<String>,
}

impl ContentValidation {
    pub fn with_errors(errors: Vec<ValidationMessage>) -> Self {
        Self {
            content_is_valid: Some(errors.is_empty()),
            validation_errors: Some(errors),
            rendered_content: None,
        }
    }

    /// Errors in this section. A missing list means none.
    pub fn errors(&self) -> &[ValidationMessage] {
        self.validation_errors.as_deref().unwrap_or_default()
    }
}

/// Response of the validate endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ValidationResponse {
    #[serde(default)]
    pub all_content_is_valid: Option<bool>,
    #[serde(default)]
    pub html_body: Option<ContentValidation>,
    #[serde(default)]
    pub text_body: Option<ContentValidation>,
    #[serde(default)]
    pub subject: Option<ContentValidation>,
}

impl ValidationResponse {
    /// Messages from every section, in subject, HTML, text order.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationMessage> {
        [&self.subject, &self.html_body, &self.text_body]
            .into_iter()
            .flatten()
            .flat_map(|section| section.errors())
    }

    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_empty_errors_are_equivalent() {
        let missing: ValidationResponse =
            serde_json::from_str(r#"{"AllContentIsValid": true, "HtmlBody": {"ContentIsValid": true}}"#)
                .unwrap();
        let empty: ValidationResponse =
            serde_json::from_str(r#"{"HtmlBody": {"ValidationErrors": []}}"#).unwrap();
        let absent: ValidationResponse = serde_json::from_str("{}").unwrap();

        assert!(missing.is_valid());
        assert!(empty.is_valid());
        assert!(absent.is_valid());
    }

    #[test]
    fn test_errors_flatten_sections() {
        let response: ValidationResponse = serde_json::from_str(
            r#"{
                "AllContentIsValid": false,
                "HtmlBody": {"ContentIsValid": false, "ValidationErrors": [
                    {"Message": "Unexpected end of template", "Line": 3, "CharacterPosition": 10}
                ]},
                "Subject": {"ContentIsValid": false, "ValidationErrors": [{"Message": "Bad subject"}]}
            }"#,
        )
        .unwrap();

        let messages: Vec<_> = response.errors().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["Bad subject", "Unexpected end of template"]);
    }

    #[test]
    fn test_list_defaults() {
        let list: TemplateList = serde_json::from_str(
            r#"{"TotalCount": 2, "Templates": [
                {"TemplateId": 1, "Name": "Welcome", "Alias": "welcome", "Active": true, "TemplateType": "Standard", "LayoutTemplate": null},
                {"TemplateId": 2, "Name": "Old", "Alias": null, "Active": false, "TemplateType": "Layout", "LayoutTemplate": null}
            ]}"#,
        )
        .unwrap();

        let active: Vec<_> = list.active().collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id_or_alias(), "welcome");
        assert_eq!(list.templates[1].id_or_alias(), "2");
    }

    #[test]
    fn test_payload_drops_empty_layout() {
        let entry = TemplateManifest::new("Welcome", "welcome", TemplateType::Standard)
            .with_html("<p>hi</p>")
            .with_layout("");
        let payload = TemplatePayload::from(&entry);
        assert!(payload.layout_template.is_none());

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["LayoutTemplate"], serde_json::Value::Null);
        assert!(json.get("TextBody").is_none());
    }
}
