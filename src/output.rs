//! CLI output formatting.
//!
//! Each command has a `format_*` function returning `Vec<String>` for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! Creating 5 sections with 995 pages
//! Cleared /tmp/x/content
//! ==> sections: 5 items
//!     done in 0.01s
//! ==> pages: 995 items
//!     done in 0.42s
//! Wrote 1000 documents (11.2 MB) in 0.44s
//! ```
//!
//! ## Check
//!
//! ```text
//! Sections: 5
//! Pages: 995 (995 flat, 0 bundles)
//! Tree is valid
//! ```

use crate::check::TreeStats;
use crate::generate::{GenerateEvent, RunSummary};
use crate::plan::{Layout, Plan};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Problems listed per category before the rest are elided.
const MAX_LISTED: usize = 10;

fn format_duration(d: Duration) -> String {
    format!("{:.2}s", d.as_secs_f64())
}

/// Format a byte count with a binary-ish unit suffix.
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "kB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

// ============================================================================
// Plan
// ============================================================================

pub fn format_plan(plan: &Plan) -> Vec<String> {
    vec![
        format!(
            "Creating {} sections with {} pages ({})",
            plan.split.sections,
            plan.split.pages,
            layout_name(plan.layout)
        ),
        format!("    Content: {}", plan.content_dir.display()),
        format!("    Workers: {}", plan.workers),
        format!("    Seed: {}", plan.seed),
        format!("    First section: {}", plan.first_section.display()),
        format!("    First page: {}", plan.first_page.display()),
    ]
}

fn layout_name(layout: Layout) -> &'static str {
    match layout {
        Layout::Flat => "flat",
        Layout::Bundle => "bundles",
    }
}

pub fn print_plan(plan: &Plan) {
    for line in format_plan(plan) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Format a single progress event.
pub fn format_generate_event(event: &GenerateEvent) -> Vec<String> {
    match event {
        GenerateEvent::Planned(split) => vec![format!(
            "Creating {} sections with {} pages",
            split.sections, split.pages
        )],
        GenerateEvent::ContentReset(path) => vec![format!("Cleared {}", path.display())],
        GenerateEvent::PhaseStarted { phase, items } => {
            vec![format!("==> {}: {} items", phase, items)]
        }
        GenerateEvent::PhaseFinished { elapsed, .. } => {
            vec![format!("    done in {}", format_duration(*elapsed))]
        }
        GenerateEvent::ItemFailed {
            phase,
            index,
            error,
        } => vec![format!("    FAILED {} #{}: {}", phase, index, error)],
    }
}

pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    vec![format!(
        "Wrote {} documents ({}) in {}",
        summary.sections + summary.pages,
        format_bytes(summary.bytes_written),
        format_duration(summary.elapsed)
    )]
}

pub fn print_summary(summary: &RunSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

fn push_problems(lines: &mut Vec<String>, label: &str, paths: &[PathBuf], root: &Path) {
    if paths.is_empty() {
        return;
    }
    lines.push(format!("{} ({})", label, paths.len()));
    for path in paths.iter().take(MAX_LISTED) {
        let shown = path.strip_prefix(root).unwrap_or(path);
        lines.push(format!("    {}", shown.display()));
    }
    if paths.len() > MAX_LISTED {
        lines.push(format!("    ... and {} more", paths.len() - MAX_LISTED));
    }
}

/// Format check results. Paths are shown relative to `output_dir`.
pub fn format_check(stats: &TreeStats, output_dir: &Path) -> Vec<String> {
    let mut lines = vec![
        format!("Sections: {}", stats.sections),
        format!(
            "Pages: {} ({} flat, {} bundles)",
            stats.pages(),
            stats.flat_pages,
            stats.bundles
        ),
    ];
    push_problems(&mut lines, "Sections without _index.md", &stats.missing_index, output_dir);
    push_problems(&mut lines, "Sections without pages", &stats.empty_sections, output_dir);
    push_problems(&mut lines, "Wrong front-matter title", &stats.bad_titles, output_dir);
    push_problems(&mut lines, "Malformed bundles", &stats.bad_bundles, output_dir);
    push_problems(&mut lines, "Unexpected entries", &stats.unexpected, output_dir);
    lines.push(if stats.is_valid() {
        "Tree is valid".to_string()
    } else {
        "Tree has problems".to_string()
    });
    lines
}

pub fn print_check(stats: &TreeStats, output_dir: &Path) {
    for line in format_check(stats, output_dir) {
        println!("{}", line);
    }
}
