//! Verification of a generated content tree.
//!
//! Walks `<out>/content` and checks it against the layout described in
//! [`crate::plan`]:
//!
//! - every `section<N>/` holds an `_index.md` titled `Title <N>`
//! - flat pages are `section<S>/page<M>.md` titled `Title <M>`
//! - bundles are `section<S>/bundle<M>/` holding exactly one file, `index.md`,
//!   titled `Title <M>`
//! - every section holds at least one page
//!
//! Anything else found in the tree is reported as unexpected.

use crate::plan::front_matter;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("no content directory at {0}")]
    MissingContent(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Counts and problems found in a content tree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TreeStats {
    pub sections: usize,
    pub flat_pages: usize,
    pub bundles: usize,
    /// Sections without an `_index.md`.
    pub missing_index: Vec<PathBuf>,
    /// Sections that received no pages.
    pub empty_sections: Vec<PathBuf>,
    /// Documents whose front-matter title is not their own index.
    pub bad_titles: Vec<PathBuf>,
    /// Bundles not holding exactly one `index.md`.
    pub bad_bundles: Vec<PathBuf>,
    /// Entries that fit no part of the layout.
    pub unexpected: Vec<PathBuf>,
}

impl TreeStats {
    pub fn pages(&self) -> usize {
        self.flat_pages + self.bundles
    }

    /// Total entries in the sense of the run's page budget.
    pub fn entries(&self) -> usize {
        self.sections + self.pages()
    }

    pub fn is_valid(&self) -> bool {
        self.missing_index.is_empty()
            && self.empty_sections.is_empty()
            && self.bad_titles.is_empty()
            && self.bad_bundles.is_empty()
            && self.unexpected.is_empty()
    }
}

/// Parse a numbered entry name like `section12` or `page7.md`.
fn numbered(name: &str, prefix: &str, suffix: &str) -> Option<usize> {
    name.strip_prefix(prefix)?.strip_suffix(suffix)?.parse().ok()
}

/// Whether the document at `path` opens with the front matter for `index`.
fn has_title(path: &Path, index: usize) -> io::Result<bool> {
    let expected = front_matter(index);
    let mut head = Vec::with_capacity(expected.len());
    File::open(path)?
        .take(expected.len() as u64)
        .read_to_end(&mut head)?;
    Ok(head == expected.as_bytes())
}

#[derive(Default)]
struct SectionState {
    has_index: bool,
    pages: usize,
}

#[derive(Default)]
struct BundleState {
    files: usize,
    has_index: bool,
}

/// Walk and verify the tree under `<output_dir>/content`.
pub fn check(output_dir: &Path) -> Result<TreeStats, CheckError> {
    let content_dir = output_dir.join("content");
    if !content_dir.is_dir() {
        return Err(CheckError::MissingContent(content_dir));
    }

    let mut stats = TreeStats::default();
    let mut sections: BTreeMap<PathBuf, SectionState> = BTreeMap::new();
    let mut bundles: BTreeMap<PathBuf, BundleState> = BTreeMap::new();

    for entry in WalkDir::new(&content_dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path().to_path_buf();
        let name = entry.file_name().to_string_lossy();
        let is_dir = entry.file_type().is_dir();

        match entry.depth() {
            1 if is_dir && numbered(&name, "section", "").is_some() => {
                sections.entry(path).or_default();
            }
            2 => {
                let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
                let Some(section) = sections.get_mut(&parent) else {
                    // Contents of an unexpected top-level entry.
                    continue;
                };
                let page = if is_dir {
                    None
                } else {
                    numbered(&name, "page", ".md")
                };
                if !is_dir && name == "_index.md" {
                    section.has_index = true;
                    let n = parent
                        .file_name()
                        .and_then(|s| numbered(&s.to_string_lossy(), "section", ""))
                        .unwrap_or_default();
                    if !has_title(&path, n)? {
                        stats.bad_titles.push(path);
                    }
                } else if let Some(m) = page {
                    section.pages += 1;
                    stats.flat_pages += 1;
                    if !has_title(&path, m)? {
                        stats.bad_titles.push(path);
                    }
                } else if is_dir && numbered(&name, "bundle", "").is_some() {
                    section.pages += 1;
                    stats.bundles += 1;
                    bundles.entry(path).or_default();
                } else {
                    stats.unexpected.push(path);
                }
            }
            3 => {
                let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
                let Some(bundle) = bundles.get_mut(&parent) else {
                    continue;
                };
                bundle.files += 1;
                if !is_dir && name == "index.md" {
                    bundle.has_index = true;
                    let m = parent
                        .file_name()
                        .and_then(|s| numbered(&s.to_string_lossy(), "bundle", ""))
                        .unwrap_or_default();
                    if !has_title(&path, m)? {
                        stats.bad_titles.push(path);
                    }
                }
            }
            1 => stats.unexpected.push(path),
            _ => {}
        }
    }

    stats.sections = sections.len();
    for (path, section) in sections {
        if !section.has_index {
            stats.missing_index.push(path.clone());
        }
        if section.pages == 0 {
            stats.empty_sections.push(path);
        }
    }
    for (path, bundle) in bundles {
        if bundle.files != 1 || !bundle.has_index {
            stats.bad_bundles.push(path);
        }
    }

    Ok(stats)
}
