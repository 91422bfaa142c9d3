//! Directory walking and file classification.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{ManifestError, ManifestResult};

/// Role a file plays inside a template unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Meta,
    Html,
    Text,
    Unknown,
}

impl FileKind {
    /// Classify a file by its extension.
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "json" => FileKind::Meta,
            "html" | "htm" => FileKind::Html,
            "txt" => FileKind::Text,
            _ => FileKind::Unknown,
        }
    }
}

/// A file discovered under the templates root.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    /// File name without extension
    pub name: String,
    pub extension: String,
    pub size: u64,
    pub kind: FileKind,
}

impl FileEntry {
    fn from_path(path: &Path, size: u64) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = FileKind::from_extension(&extension);

        Self {
            path: path.to_path_buf(),
            name,
            extension,
            size,
            kind,
        }
    }

    /// Directory that groups this file into a template unit.
    pub fn unit_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Walks a templates directory.
///
/// The walker holds no traversal state, so `walk` may be called any number
/// of times to restart from the root.
#[derive(Debug, Clone)]
pub struct TemplateWalker {
    root: PathBuf,
}

impl TemplateWalker {
    /// Create a walker, failing if `root` does not exist.
    pub fn new(root: impl AsRef<Path>) -> ManifestResult<Self> {
        let root = expand_home(root.as_ref());
        if !root.exists() {
            return Err(ManifestError::PathNotFound(root));
        }
        debug!("Walking templates under {:?}", root);
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily iterate all non-hidden files below the root.
    pub fn walk(&self) -> impl Iterator<Item = FileEntry> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                FileEntry::from_path(entry.path(), size)
            })
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => {
            warn!("Could not determine home directory for {:?}", path);
            path.to_path_buf()
        }
    }
}
