//! Run configuration.
//!
//! A run is described by a single immutable [`RunConfig`]. Values come from
//! three layers, each overriding the previous one:
//!
//! ```text
//! stock defaults  →  --config run.toml  →  command-line flags
//! ```
//!
//! ## Config File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! num_pages = 1000000       # Total filesystem entries to create
//! bundle = false            # Pages as leaf bundles (bundleN/index.md)
//! workers = 50              # Concurrent writers
//! seed = 32                 # Seed for section assignment and content sizes
//! keep_going = false        # Collect write failures instead of aborting
//!
//! [content]
//! min_kb = 2                # Content size sampled from [min_kb, max_kb)
//! max_kb = 20
//! # size_kb = 4             # ...or a fixed size (replaces min_kb/max_kb)
//! ```
//!
//! The output directory is not part of the file: it is a
//! per-invocation choice and is always passed on the command line.
//!
//! Unknown keys are rejected to catch typos early.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Smallest page count accepted for a run.
pub const MIN_PAGES: usize = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Size of each generated document body, in kB of filler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ContentTable", into = "ContentTable")]
pub enum ContentSize {
    /// Every document gets exactly `size_kb` filler units.
    Fixed { size_kb: usize },
    /// Each document samples its size uniformly from `[min_kb, max_kb)`.
    Range { min_kb: usize, max_kb: usize },
}

impl Default for ContentSize {
    fn default() -> Self {
        ContentSize::Range {
            min_kb: 2,
            max_kb: 20,
        }
    }
}

/// The `[content]` table as written in a config file.
///
/// `size_kb` and the `min_kb`/`max_kb` pair are alternatives; the
/// conversion into [`ContentSize`] rejects any other combination.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ContentTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    size_kb: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_kb: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_kb: Option<usize>,
}

impl TryFrom<ContentTable> for ContentSize {
    type Error = String;

    fn try_from(table: ContentTable) -> Result<Self, Self::Error> {
        match (table.size_kb, table.min_kb, table.max_kb) {
            (Some(size_kb), None, None) => Ok(ContentSize::Fixed { size_kb }),
            (Some(_), _, _) => {
                Err("content.size_kb cannot be combined with content.min_kb/max_kb".into())
            }
            (None, Some(min_kb), Some(max_kb)) => Ok(ContentSize::Range { min_kb, max_kb }),
            (None, Some(_), None) | (None, None, Some(_)) => {
                Err("content.min_kb and content.max_kb must be set together".into())
            }
            (None, None, None) => {
                Err("content needs either size_kb or both min_kb and max_kb".into())
            }
        }
    }
}

impl From<ContentSize> for ContentTable {
    fn from(size: ContentSize) -> Self {
        match size {
            ContentSize::Fixed { size_kb } => ContentTable {
                size_kb: Some(size_kb),
                ..Default::default()
            },
            ContentSize::Range { min_kb, max_kb } => ContentTable {
                min_kb: Some(min_kb),
                max_kb: Some(max_kb),
                ..Default::default()
            },
        }
    }
}

impl ContentSize {
    /// Draw a size in kB. An empty range (`min == max`) yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match *self {
            ContentSize::Fixed { size_kb } => size_kb,
            ContentSize::Range { min_kb, max_kb } if max_kb > min_kb => {
                rng.gen_range(min_kb..max_kb)
            }
            ContentSize::Range { min_kb, .. } => min_kb,
        }
    }

    /// Build from the command-line trio. A fixed size wins over bounds;
    /// a missing bound keeps the value from `base`.
    pub fn from_flags(
        base: ContentSize,
        size_kb: Option<usize>,
        min_kb: Option<usize>,
        max_kb: Option<usize>,
    ) -> ContentSize {
        if let Some(size_kb) = size_kb {
            return ContentSize::Fixed { size_kb };
        }
        if min_kb.is_none() && max_kb.is_none() {
            return base;
        }
        let (base_min, base_max) = match base {
            ContentSize::Fixed { size_kb } => (size_kb, size_kb),
            ContentSize::Range { min_kb, max_kb } => (min_kb, max_kb),
        };
        ContentSize::Range {
            min_kb: min_kb.unwrap_or(base_min),
            max_kb: max_kb.unwrap_or(base_max),
        }
    }
}

/// Values that may appear in a `run.toml`. Everything except the output
/// directory, which only the command line provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSettings {
    /// Total number of filesystem entries (sections + pages) to create.
    pub num_pages: usize,
    /// Body size of each generated document.
    pub content: ContentSize,
    /// Write pages as leaf bundles instead of flat files.
    pub bundle: bool,
    /// Upper bound on concurrently executing work items.
    pub workers: usize,
    /// Run seed from which every per-item generator is derived.
    pub seed: u64,
    /// Keep writing after a failure and report all failures at the end.
    pub keep_going: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            num_pages: 1_000_000,
            content: ContentSize::default(),
            bundle: false,
            workers: 50,
            seed: 32,
            keep_going: false,
        }
    }
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub settings: RunSettings,
    /// Existing directory that receives the `content/` tree.
    pub output_dir: PathBuf,
}

impl RunConfig {
    pub fn new(settings: RunSettings, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            output_dir: output_dir.into(),
        }
    }

    /// Root of the generated tree: `<output_dir>/content`.
    pub fn content_dir(&self) -> PathBuf {
        self.output_dir.join("content")
    }

    /// Validate settings and the output directory. Runs before any work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.settings.validate()?;
        validate_output_dir(&self.output_dir)
    }
}

impl RunSettings {
    /// Validate values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_pages < MIN_PAGES {
            return Err(ConfigError::Validation(format!(
                "num_pages must be at least {MIN_PAGES} (got {})",
                self.num_pages
            )));
        }
        if let ContentSize::Range { min_kb, max_kb } = self.content {
            if min_kb > max_kb {
                return Err(ConfigError::Validation(format!(
                    "content.min_kb ({min_kb}) must not exceed content.max_kb ({max_kb})"
                )));
            }
        }
        if self.workers == 0 {
            return Err(ConfigError::Validation(
                "workers must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn validate_output_dir(path: &Path) -> Result<(), ConfigError> {
    let meta = fs::metadata(path).map_err(|_| {
        ConfigError::Validation(format!("output directory {} does not exist", path.display()))
    })?;
    if !meta.is_dir() {
        return Err(ConfigError::Validation(format!(
            "output directory {} is not a directory",
            path.display()
        )));
    }
    // Permission bits miss ownership and ACLs; creating a file does not.
    tempfile::Builder::new()
        .prefix(".sitefill-")
        .tempfile_in(path)
        .map_err(|e| {
            ConfigError::Validation(format!(
                "output directory {} is not writable: {e}",
                path.display()
            ))
        })?;
    Ok(())
}

// =============================================================================
// Config loading and merging
// =============================================================================

/// Returns the stock default settings as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(RunSettings::default()).expect("default settings must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
/// The `content` table is replaced whole, since `size_kb` and
/// `min_kb`/`max_kb` are alternatives rather than independent keys.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) if key != "content" => merge_toml(base_val, overlay_val),
                    _ => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load settings from a TOML file, layered over the stock defaults.
pub fn load_settings(path: &Path) -> Result<RunSettings, ConfigError> {
    let content = fs::read_to_string(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    resolve_settings(Some(overlay))
}

/// Merge an optional overlay onto the stock defaults and deserialize.
///
/// Range checks are left to [`RunSettings::validate`] so that command-line
/// overrides can still fix a value before validation.
pub fn resolve_settings(overlay: Option<toml::Value>) -> Result<RunSettings, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    Ok(merged.try_into()?)
}

/// Returns a fully-commented stock `run.toml`. Used by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# sitefill run configuration
# ==========================
# All settings are optional. Values shown below are the defaults.
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# Total number of filesystem entries to create. Sections are carved out
# of this budget: max(num_pages / 500, 5) sections, the rest are pages.
num_pages = 1000000

# Write each page as a leaf bundle (sectionN/bundleM/index.md) instead
# of a flat file (sectionN/pageM.md).
bundle = false

# Maximum number of documents written concurrently.
workers = 50

# Seed for content sizes and section assignment. The same seed yields
# the same tree regardless of scheduling.
seed = 32

# Keep writing after a failed document and report every failure at the
# end, instead of aborting on the first one.
keep_going = false

# ---------------------------------------------------------------------------
# Document body size, in kB of filler text
# ---------------------------------------------------------------------------
[content]
# Sampled per document from [min_kb, max_kb).
min_kb = 2
max_kb = 20

# Or use one fixed size for every document (replaces min_kb/max_kb):
# size_kb = 4
"##
}
