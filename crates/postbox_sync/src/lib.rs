//! # postbox_sync
//!
//! Synchronization engine between a local template manifest and a remote
//! template server.
//!
//! # Architecture
//!
//! - **Plan**: diff manifest entries against remote templates (create, update, skip, conflict)
//! - **Dispatch**: fan out one remote call per entry and wait for all of them to settle
//! - **Report**: fold per-entry results into one report of failing rows
//!
//! The [`validate`](validate::validate), [`push`](push::push) and
//! [`pull`](pull::pull) operations compose these stages. They take any
//! [`TemplateService`](postbox_remote::TemplateService), never a concrete client.

pub mod dispatch;
pub mod error;
pub mod plan;
pub mod pull;
pub mod push;
pub mod report;
pub mod validate;

pub use dispatch::{dispatch, DispatchOptions};
pub use error::{EntryError, SyncError, SyncResult};
pub use plan::{content_matches, plan, PlanOptions, PlannedEntry, SyncDecision, SyncPlan};
pub use pull::{pull, PullOptions};
pub use push::{push, push_dir, PushOptions, PushOutcome, CONFLICT_MESSAGE};
pub use report::{aggregate, AggregateReport, EntryOutcome, EntryResult, Operation, ReportRow};
pub use validate::{validate, validate_dir};
