//! End-to-end checks of generated trees through the public library API.
//!
//! Each test writes a small tree into its own temp directory and inspects
//! it with `sitefill::check` and plain filesystem walks.

use sitefill::check::check;
use sitefill::config::{ContentSize, RunConfig, RunSettings};
use sitefill::content::FILLER_UNIT;
use sitefill::generate::generate;
use sitefill::plan::Split;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

fn config(out: &Path, num_pages: usize, bundle: bool) -> RunConfig {
    let settings = RunSettings {
        num_pages,
        content: ContentSize::Fixed { size_kb: 1 },
        bundle,
        workers: 8,
        ..Default::default()
    };
    RunConfig::new(settings, out)
}

fn names_under(root: &Path, pred: impl Fn(&walkdir::DirEntry) -> bool) -> Vec<String> {
    WalkDir::new(root.join("content"))
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| pred(e))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn thousand_page_scenario() {
    let tmp = TempDir::new().unwrap();

    let summary = generate(&config(tmp.path(), 1000, false), None).unwrap();

    assert_eq!((summary.sections, summary.pages), (5, 995));
    for i in 0..5 {
        let index = tmp.path().join(format!("content/section{i}/_index.md"));
        let text = fs::read_to_string(&index).unwrap();
        assert!(text.starts_with(&format!("---\ntitle: Title {i}\n---\n\n")));
    }
    let stats = check(tmp.path()).unwrap();
    assert_eq!(stats.sections, 5);
    assert_eq!(stats.flat_pages, 995);
    assert!(stats.empty_sections.is_empty(), "{:?}", stats.empty_sections);
    assert!(stats.is_valid(), "{stats:?}");
}

#[test]
fn counts_follow_the_split() {
    for num_pages in [100, 2600] {
        let tmp = TempDir::new().unwrap();
        generate(&config(tmp.path(), num_pages, false), None).unwrap();

        let split = Split::compute(num_pages);
        let stats = check(tmp.path()).unwrap();
        assert_eq!(stats.sections, (num_pages / 500).max(5));
        assert_eq!(stats.sections, split.sections);
        assert_eq!(stats.pages(), num_pages - split.sections);
        assert_eq!(stats.entries(), num_pages);
    }
}

#[test]
fn flat_mode_has_no_bundles() {
    let tmp = TempDir::new().unwrap();
    generate(&config(tmp.path(), 300, false), None).unwrap();

    let bundles = names_under(tmp.path(), |e| {
        e.file_type().is_dir() && e.file_name().to_string_lossy().starts_with("bundle")
    });
    assert!(bundles.is_empty());
    let stats = check(tmp.path()).unwrap();
    assert_eq!(stats.flat_pages, 295);
}

#[test]
fn bundle_mode_has_no_flat_pages() {
    let tmp = TempDir::new().unwrap();
    generate(&config(tmp.path(), 300, true), None).unwrap();

    let flat = names_under(tmp.path(), |e| {
        e.file_type().is_file() && e.file_name().to_string_lossy().starts_with("page")
    });
    assert!(flat.is_empty(), "found flat pages: {flat:?}");

    let stats = check(tmp.path()).unwrap();
    assert_eq!(stats.bundles, 295);
    assert!(stats.bad_bundles.is_empty());
    assert!(stats.is_valid(), "{stats:?}");
}

#[test]
fn second_run_replaces_first() {
    let tmp = TempDir::new().unwrap();
    generate(&config(tmp.path(), 3000, true), None).unwrap();
    assert!(tmp.path().join("content/section5").exists());

    generate(&config(tmp.path(), 100, false), None).unwrap();

    let stats = check(tmp.path()).unwrap();
    assert_eq!(stats.sections, 5);
    assert_eq!(stats.bundles, 0);
    assert_eq!(stats.flat_pages, 95);
    assert!(stats.is_valid(), "{stats:?}");
    assert!(!tmp.path().join("content/section5").exists());
}

#[test]
fn files_outside_content_survive() {
    let tmp = TempDir::new().unwrap();
    let keep = tmp.path().join("hugo.toml");
    fs::write(&keep, "baseURL = 'http://example.org/'").unwrap();

    generate(&config(tmp.path(), 100, false), None).unwrap();

    assert!(keep.exists());
}

#[test]
fn titles_match_own_index() {
    let tmp = TempDir::new().unwrap();
    generate(&config(tmp.path(), 150, false), None).unwrap();

    for entry in WalkDir::new(tmp.path().join("content")) {
        let entry = entry.unwrap();
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(n) = name
            .strip_prefix("page")
            .and_then(|s| s.strip_suffix(".md"))
        else {
            continue;
        };
        let text = fs::read_to_string(entry.path()).unwrap();
        let first_block: Vec<&str> = text.lines().take(3).collect();
        let title = format!("title: Title {n}");
        assert_eq!(first_block, ["---", title.as_str(), "---"]);
    }
}

#[test]
fn body_sizes_are_whole_filler_units() {
    let tmp = TempDir::new().unwrap();
    let mut cfg = config(tmp.path(), 100, false);
    cfg.settings.content = ContentSize::Range { min_kb: 1, max_kb: 4 };
    generate(&cfg, None).unwrap();

    for entry in WalkDir::new(tmp.path().join("content")) {
        let entry = entry.unwrap();
        if !entry.file_type().is_file() {
            continue;
        }
        let text = fs::read_to_string(entry.path()).unwrap();
        let body_start = text.find("---\n\n").unwrap() + "---\n\n".len();
        let body = &text[body_start..];
        assert_eq!(body.len() % FILLER_UNIT.len(), 0);
        let units = body.len() / FILLER_UNIT.len();
        assert!((1..4).contains(&units), "{units} units in {:?}", entry.path());
    }
}

#[test]
fn missing_output_dir_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let result = generate(&config(&tmp.path().join("nope"), 100, false), None);
    assert!(result.is_err());
    assert!(!tmp.path().join("nope").exists());
}
