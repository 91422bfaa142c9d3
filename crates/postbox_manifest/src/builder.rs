//! Manifest building from walked files.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ManifestError, ManifestResult};
use crate::manifest::{MetaFile, TemplateManifest};
use crate::walker::{FileEntry, FileKind, TemplateWalker};

const META_FILE: &str = "meta.json";
const HTML_FILE: &str = "content.html";
const TEXT_FILE: &str = "content.txt";

/// File stems that mark a directory as a single template unit.
const UNIT_STEMS: [&str; 2] = ["content", "meta"];

/// Files that make up one template, either a whole directory or a group of
/// sibling files sharing a stem.
#[derive(Debug, Default)]
struct Unit {
    /// Directory path, or `<dir>/<stem>` for file groups
    source: PathBuf,
    /// Identity used when the meta file names none
    default_name: String,
    /// Meta path reported in errors when there is no meta file
    meta_path: PathBuf,
    meta: Vec<FileEntry>,
    html: Vec<FileEntry>,
    text: Vec<FileEntry>,
}

impl Unit {
    fn new(source: PathBuf, default_name: String, meta_path: PathBuf) -> Self {
        Self {
            source,
            default_name,
            meta_path,
            ..Default::default()
        }
    }

    fn add(&mut self, file: FileEntry) {
        match file.kind {
            FileKind::Meta => self.meta.push(file),
            FileKind::Html => self.html.push(file),
            FileKind::Text => self.text.push(file),
            FileKind::Unknown => {}
        }
    }

    fn has_body_files(&self) -> bool {
        !self.html.is_empty() || !self.text.is_empty()
    }
}

/// Builds a manifest from a templates directory.
pub struct ManifestBuilder;

impl ManifestBuilder {
    /// Walk `root` and build its manifest.
    pub fn from_dir(root: impl AsRef<Path>) -> ManifestResult<Vec<TemplateManifest>> {
        let walker = TemplateWalker::new(root)?;
        let manifest = Self::build(walker.walk())?;
        info!(
            "Built manifest with {} entries from {:?}",
            manifest.len(),
            walker.root()
        );
        Ok(manifest)
    }

    /// Merge walked files into manifest entries.
    ///
    /// A directory is one unit when it holds `content.*` or `meta.json`, or
    /// when all its files share one stem. Otherwise each stem in it
    /// (`welcome.html`, `welcome.json`) is a unit of its own.
    ///
    /// Entries come back sorted by source. Units without any body are
    /// dropped. Fails on duplicate aliases.
    pub fn build(files: impl IntoIterator<Item = FileEntry>) -> ManifestResult<Vec<TemplateManifest>> {
        let mut dirs: BTreeMap<PathBuf, Vec<FileEntry>> = BTreeMap::new();
        for file in files {
            if file.kind == FileKind::Unknown {
                debug!("Ignoring {:?}", file.path);
                continue;
            }
            dirs.entry(file.unit_dir().to_path_buf()).or_default().push(file);
        }

        let mut manifest = Vec::new();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();

        for (dir, files) in dirs {
            for unit in split_units(&dir, files) {
                if !unit.has_body_files() {
                    warn!("Skipping {:?}: no HTML or text content found", unit.source);
                    continue;
                }

                let entry = Self::build_unit(unit)?;
                if !entry.has_body() {
                    warn!(
                        "Skipping {:?}: HTML and text content are empty for '{}'",
                        entry.source, entry.alias
                    );
                    continue;
                }

                if let Some(first) = seen.get(&entry.alias) {
                    return Err(ManifestError::DuplicateAlias {
                        alias: entry.alias,
                        first: first.clone(),
                        second: entry.source,
                    });
                }
                seen.insert(entry.alias.clone(), entry.source.clone());
                manifest.push(entry);
            }
        }

        Ok(manifest)
    }

    fn build_unit(unit: Unit) -> ManifestResult<TemplateManifest> {
        let (meta, meta_path) = match pick(&unit.meta, META_FILE) {
            Some(file) => {
                let content = read_file(&file.path)?;
                (MetaFile::parse(&file.path, &content)?, file.path.clone())
            }
            None => (MetaFile::default(), unit.meta_path.clone()),
        };
        let template_type = meta.template_type(&meta_path)?;

        let alias = meta
            .alias
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| unit.default_name.clone());
        let name = meta
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| unit.default_name.clone());

        if alias.is_empty() {
            return Err(ManifestError::InvalidMeta {
                path: meta_path,
                message: "template has no alias".to_string(),
            });
        }

        let html_body = pick(&unit.html, HTML_FILE)
            .map(|f| read_file(&f.path))
            .transpose()?;
        let text_body = pick(&unit.text, TEXT_FILE)
            .map(|f| read_file(&f.path))
            .transpose()?;

        Ok(TemplateManifest {
            name,
            alias,
            template_type,
            subject: meta.subject,
            html_body,
            text_body,
            layout_template: meta.layout_template,
            new: None,
            status: None,
            source: unit.source,
        })
    }
}

/// Split the files of one directory into template units.
fn split_units(dir: &Path, files: Vec<FileEntry>) -> Vec<Unit> {
    let stems: BTreeSet<String> = files.iter().map(|f| f.name.clone()).collect();
    let conventional = stems.iter().any(|s| UNIT_STEMS.contains(&s.as_str()));

    if conventional || stems.len() < 2 {
        let dir_name = dir
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .or_else(|| stems.iter().next().cloned())
            .unwrap_or_default();

        let mut unit = Unit::new(dir.to_path_buf(), dir_name, dir.join(META_FILE));
        for file in files {
            unit.add(file);
        }
        return vec![unit];
    }

    let mut groups: BTreeMap<String, Unit> = BTreeMap::new();
    for file in files {
        let stem = file.name.clone();
        groups
            .entry(stem.clone())
            .or_insert_with(|| {
                Unit::new(dir.join(&stem), stem.clone(), dir.join(format!("{}.json", stem)))
            })
            .add(file);
    }
    groups.into_values().collect()
}

fn read_file(path: &Path) -> ManifestResult<String> {
    fs::read_to_string(path).map_err(|source| ManifestError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Pick the conventional file name if present, else the first file.
fn pick<'a>(files: &'a [FileEntry], preferred: &str) -> Option<&'a FileEntry> {
    let chosen = files
        .iter()
        .find(|f| f.file_name() == preferred)
        .or_else(|| files.first())?;
    for other in files.iter().filter(|f| f.path != chosen.path) {
        warn!("Ignoring {:?}, using {:?}", other.path, chosen.path);
    }
    Some(chosen)
}
