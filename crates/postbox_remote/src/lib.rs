//! # postbox_remote
//!
//! Boundary to the remote template server.
//!
//! The sync engine only talks to [`TemplateService`]. Two implementations
//! ship with this crate:
//!
//! - [`ServerClient`]: the HTTP client for the Postmark templates API
//! - [`MockService`]: an in-memory server for tests

pub mod client;
pub mod config;
pub mod error;
pub mod mock;
pub mod service;
pub mod types;

pub use client::ServerClient;
pub use config::{ClientConfig, DEFAULT_REQUEST_HOST};
pub use error::{RemoteError, RemoteResult};
pub use mock::{CapturedCall, MockService};
pub use service::TemplateService;
pub use types::{
    ContentValidation, ListTemplate, RemoteTemplate, TemplateList, TemplatePayload,
    ValidationMessage, ValidationPayload, ValidationResponse,
};
