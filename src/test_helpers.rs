//! Shared test utilities for the sitefill test suite.
//!
//! Builds small, fast run configurations and inspects generated trees.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let config = small_config(tmp.path(), 120, false);
//! generate(&config, None).unwrap();
//!
//! assert_eq!(section_names(tmp.path()).len(), 5);
//! ```

use std::path::Path;
use walkdir::WalkDir;

use crate::config::{ContentSize, RunConfig, RunSettings};

// =========================================================================
// Configuration
// =========================================================================

/// A run writing 1 kB documents with a handful of workers.
pub fn small_config(output_dir: &Path, num_pages: usize, bundle: bool) -> RunConfig {
    let settings = RunSettings {
        num_pages,
        content: ContentSize::Fixed { size_kb: 1 },
        bundle,
        workers: 4,
        ..Default::default()
    };
    RunConfig::new(settings, output_dir)
}

// =========================================================================
// Tree inspection
// =========================================================================

/// Names of the directories directly under `<out>/content`, sorted.
pub fn section_names(output_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(output_dir.join("content"))
        .unwrap()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().unwrap().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Count files anywhere under `<out>/content` whose name matches `pred`.
pub fn count_files_named(output_dir: &Path, pred: impl Fn(&str) -> bool) -> usize {
    WalkDir::new(output_dir.join("content"))
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .filter(|e| pred(&e.file_name().to_string_lossy()))
        .count()
}

/// Every file under `output_dir`, as sorted `/`-joined relative paths.
pub fn relative_files(output_dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(output_dir)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(output_dir)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    files.sort();
    files
}
