//! Output layout: where every section and page lands on disk.
//!
//! ## Split
//!
//! The requested page count is a budget for filesystem entries. Sections
//! are carved out of it first, and the remainder become pages:
//!
//! ```text
//! sections = max(num_pages / 500, 5)
//! pages    = num_pages - sections
//! ```
//!
//! ## Layout
//!
//! ```text
//! <out>/content/
//! ├── section0/
//! │   ├── _index.md              # Section index document
//! │   ├── page12.md              # Flat mode
//! │   └── bundle12/index.md      # Bundle mode
//! └── section1/
//!     └── ...
//! ```
//!
//! Every path is derived from an index alone, so concurrent workers never
//! write to the same location.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// One section per this many requested pages.
pub const PAGES_PER_SECTION: usize = 500;

/// Lower bound on the number of sections.
pub const MIN_SECTIONS: usize = 5;

/// Section/page split for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Split {
    pub sections: usize,
    pub pages: usize,
}

impl Split {
    pub fn compute(num_pages: usize) -> Self {
        let sections = (num_pages / PAGES_PER_SECTION).max(MIN_SECTIONS);
        Self {
            sections,
            pages: num_pages.saturating_sub(sections),
        }
    }

    /// Total filesystem entries the run creates.
    pub fn total(&self) -> usize {
        self.sections + self.pages
    }
}

/// Location and front matter of a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDoc {
    /// Directory that must exist before the file is written.
    pub dir: PathBuf,
    pub file: PathBuf,
    pub front_matter: String,
}

/// Render the front-matter block for item `index`.
pub fn front_matter(index: usize) -> String {
    format!("---\ntitle: Title {index}\n---\n\n")
}

pub fn section_dir(content_dir: &Path, section: usize) -> PathBuf {
    content_dir.join(format!("section{section}"))
}

/// `<content>/section<index>/_index.md`
pub fn plan_section(content_dir: &Path, index: usize) -> PlannedDoc {
    let dir = section_dir(content_dir, index);
    PlannedDoc {
        file: dir.join("_index.md"),
        dir,
        front_matter: front_matter(index),
    }
}

/// `<content>/section<section>/page<index>.md`, or
/// `<content>/section<section>/bundle<index>/index.md` in bundle mode.
pub fn plan_page(content_dir: &Path, index: usize, section: usize, bundle: bool) -> PlannedDoc {
    let section_dir = section_dir(content_dir, section);
    let (dir, file) = if bundle {
        let dir = section_dir.join(format!("bundle{index}"));
        let file = dir.join("index.md");
        (dir, file)
    } else {
        let file = section_dir.join(format!("page{index}.md"));
        (section_dir, file)
    };
    PlannedDoc {
        dir,
        file,
        front_matter: front_matter(index),
    }
}

/// Page layout mode, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Flat,
    Bundle,
}

impl Layout {
    pub fn from_bundle(bundle: bool) -> Self {
        if bundle { Layout::Bundle } else { Layout::Flat }
    }
}

/// Dry-run description of a run, printed by the `plan` command.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub content_dir: PathBuf,
    pub layout: Layout,
    #[serde(flatten)]
    pub split: Split,
    pub workers: usize,
    pub seed: u64,
    /// Section index document of the first section, as an example path.
    pub first_section: PathBuf,
    /// First page path, assuming it lands in section 0.
    pub first_page: PathBuf,
}

impl Plan {
    pub fn new(config: &crate::config::RunConfig) -> Self {
        let content_dir = config.content_dir();
        let settings = &config.settings;
        Self {
            layout: Layout::from_bundle(settings.bundle),
            split: Split::compute(settings.num_pages),
            workers: settings.workers,
            seed: settings.seed,
            first_section: plan_section(&content_dir, 0).file,
            first_page: plan_page(&content_dir, 0, 0, settings.bundle).file,
            content_dir,
        }
    }
}
