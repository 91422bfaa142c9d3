//! Template manifest definitions.
//!
//! A manifest entry is the local view of one template or layout. Field names
//! serialize in PascalCase so entries and meta files share the wire format of
//! the remote service.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, ManifestResult};

/// Kind of template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TemplateType {
    #[default]
    Standard,
    Layout,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Standard => "Standard",
            TemplateType::Layout => "Layout",
        }
    }

    /// Parse a template type as written in a meta file.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Standard" | "standard" => Some(TemplateType::Standard),
            "Layout" | "layout" => Some(TemplateType::Layout),
            _ => None,
        }
    }

    pub fn is_layout(&self) -> bool {
        matches!(self, TemplateType::Layout)
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sync status of a manifest entry relative to the remote server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TemplateStatus {
    New,
    Modified,
    Unchanged,
}

impl fmt::Display for TemplateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TemplateStatus::New => "New",
            TemplateStatus::Modified => "Modified",
            TemplateStatus::Unchanged => "Unchanged",
        };
        write!(f, "{}", s)
    }
}

/// One template or layout discovered on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateManifest {
    pub name: String,
    pub alias: String,
    pub template_type: TemplateType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,
    #[serde(default)]
    pub layout_template: Option<String>,
    /// Set by planning: true when no remote template shares the alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TemplateStatus>,
    /// Directory the entry was built from.
    #[serde(skip)]
    pub source: PathBuf,
}

impl TemplateManifest {
    pub fn new(name: impl Into<String>, alias: impl Into<String>, template_type: TemplateType) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
            template_type,
            subject: None,
            html_body: None,
            text_body: None,
            layout_template: None,
            new: None,
            status: None,
            source: PathBuf::new(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_body = Some(text.into());
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout_template = Some(layout.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = source.into();
        self
    }

    pub fn is_layout(&self) -> bool {
        self.template_type.is_layout()
    }

    /// A unit needs at least one body to be worth syncing.
    pub fn has_body(&self) -> bool {
        non_empty(&self.html_body).is_some() || non_empty(&self.text_body).is_some()
    }

    /// Referenced layout alias, ignoring empty strings.
    pub fn layout_reference(&self) -> Option<&str> {
        non_empty(&self.layout_template)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Contents of a `meta.json` descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetaFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub template_type: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub layout_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_render_model: Option<serde_json::Value>,
}

impl MetaFile {
    /// Parse a meta descriptor, attributing failures to `path`.
    pub fn parse(path: &std::path::Path, content: &str) -> ManifestResult<Self> {
        serde_json::from_str(content).map_err(|e| ManifestError::InvalidMeta {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve the declared template type, defaulting to `Standard`.
    pub fn template_type(&self, path: &std::path::Path) -> ManifestResult<TemplateType> {
        match self.template_type.as_deref() {
            None | Some("") => Ok(TemplateType::Standard),
            Some(raw) => TemplateType::parse(raw).ok_or_else(|| ManifestError::InvalidMeta {
                path: path.to_path_buf(),
                message: format!("unknown TemplateType '{}'", raw),
            }),
        }
    }
}
