//! # postbox_manifest
//!
//! Local side of template synchronization.
//!
//! This crate turns a directory of email templates into an in-memory
//! manifest:
//!
//! - **Walker**: lists and classifies files under the templates root
//! - **Builder**: merges each directory's meta, HTML and text files into one entry
//! - **References**: deferred checks across entries (layout references, aliases)
//!
//! ## Example
//!
//! ```rust,no_run
//! use postbox_manifest::{check_references, ManifestBuilder};
//!
//! let manifest = ManifestBuilder::from_dir("templates").unwrap();
//! for issue in check_references(&manifest, []) {
//!     println!("{}: {}", issue.alias, issue.message());
//! }
//! ```

pub mod builder;
pub mod error;
pub mod manifest;
pub mod references;
pub mod walker;

pub use builder::ManifestBuilder;
pub use error::{ManifestError, ManifestResult};
pub use manifest::{MetaFile, TemplateManifest, TemplateStatus, TemplateType};
pub use references::{check_references, EntryIssue, ReferenceIssue};
pub use walker::{expand_home, FileEntry, FileKind, TemplateWalker};
