//! Run orchestration: turns a [`RunConfig`] into a content tree on disk.
//!
//! ## Steps
//!
//! ```text
//! 1. Plan      num_pages  →  Split { sections, pages }
//! 2. Reset     rm -rf <out>/content
//! 3. Sections  WorkPool(0..sections)  →  sectionN/_index.md
//! 4. Pages     WorkPool(0..pages)     →  sectionS/pageM.md | sectionS/bundleM/index.md
//! ```
//!
//! Step 4 starts only after every item of step 3 has finished, because
//! pages are written into section directories created by step 3.
//!
//! ## Failures
//!
//! By default the first failed write aborts the run: no new items are
//! started and the error is returned to the caller, leaving a partially
//! populated tree behind. With `keep_going` each phase runs to completion,
//! every failure is reported as a [`GenerateEvent::ItemFailed`], and the run
//! ends with [`GenerateError::Incomplete`]. The pages phase never starts
//! after a sections phase with failures.
//!
//! ## Randomness
//!
//! Each item draws its content size (and, for pages, its section) from its
//! own generator (see [`crate::seed`]), so the tree is a pure function of
//! the configuration.

use crate::config::{ConfigError, RunConfig, RunSettings};
use crate::content;
use crate::plan::{PlannedDoc, Split, plan_page, plan_section};
use crate::pool::{PoolError, WorkPool};
use crate::seed::{Phase, item_rng};
use rand::Rng;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("failed to clear {path}: {source}")]
    Reset { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("{failed} {phase} could not be written")]
    Incomplete { phase: Phase, failed: usize },
}

/// Progress notifications sent while a run executes.
#[derive(Debug, Clone)]
pub enum GenerateEvent {
    Planned(Split),
    ContentReset(PathBuf),
    PhaseStarted {
        phase: Phase,
        items: usize,
    },
    PhaseFinished {
        phase: Phase,
        items: usize,
        elapsed: Duration,
    },
    /// Only sent when `keep_going` is set; otherwise the first failure is
    /// returned as the run's error.
    ItemFailed {
        phase: Phase,
        index: usize,
        error: String,
    },
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub sections: usize,
    pub pages: usize,
    pub bytes_written: u64,
    pub elapsed: Duration,
}

/// Generate the full content tree for `config`.
///
/// Validates the configuration first; nothing on disk is touched when
/// validation fails.
pub fn generate(
    config: &RunConfig,
    events: Option<Sender<GenerateEvent>>,
) -> Result<RunSummary, GenerateError> {
    config.validate()?;
    let started = Instant::now();
    let settings = &config.settings;

    let split = Split::compute(settings.num_pages);
    emit(&events, GenerateEvent::Planned(split));
    tracing::info!(
        sections = split.sections,
        pages = split.pages,
        bundle = settings.bundle,
        "planned run"
    );

    let content_dir = config.content_dir();
    reset_content_dir(&content_dir)?;
    emit(&events, GenerateEvent::ContentReset(content_dir.clone()));

    let pool = WorkPool::new(settings.workers)?;
    let writer = DocWriter::new(content_dir, settings, split);
    write_tree(&pool, &writer, &events)?;

    Ok(RunSummary {
        sections: split.sections,
        pages: split.pages,
        bytes_written: writer.bytes_written(),
        elapsed: started.elapsed(),
    })
}

/// Sections phase, then pages phase. A failed sections phase ends the run.
fn write_tree(
    pool: &WorkPool,
    writer: &DocWriter<'_>,
    events: &Option<Sender<GenerateEvent>>,
) -> Result<(), GenerateError> {
    let keep_going = writer.settings.keep_going;
    run_phase(pool, Phase::Sections, writer.split.sections, keep_going, events, |i| {
        writer.write_section(i)
    })?;
    run_phase(pool, Phase::Pages, writer.split.pages, keep_going, events, |i| {
        writer.write_page(i)
    })
}

fn emit(events: &Option<Sender<GenerateEvent>>, event: GenerateEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is watching.
        let _ = tx.send(event);
    }
}

/// Remove `<out>/content` and everything under it. A missing directory is fine.
fn reset_content_dir(content_dir: &Path) -> Result<(), GenerateError> {
    match fs::remove_dir_all(content_dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(GenerateError::Reset {
            path: content_dir.to_path_buf(),
            source,
        }),
    }
}

/// Run one phase on the pool and wait for it.
fn run_phase<F>(
    pool: &WorkPool,
    phase: Phase,
    items: usize,
    keep_going: bool,
    events: &Option<Sender<GenerateEvent>>,
    action: F,
) -> Result<(), GenerateError>
where
    F: Fn(usize) -> Result<(), GenerateError> + Sync + Send,
{
    emit(events, GenerateEvent::PhaseStarted { phase, items });
    tracing::info!(%phase, items, workers = pool.workers(), "phase started");
    let started = Instant::now();

    if keep_going {
        let failures = pool.run_collecting(0..items, action);
        for failure in &failures {
            tracing::error!(%phase, index = failure.index, error = %failure.error, "item failed");
            emit(
                events,
                GenerateEvent::ItemFailed {
                    phase,
                    index: failure.index,
                    error: failure.error.to_string(),
                },
            );
        }
        if !failures.is_empty() {
            return Err(GenerateError::Incomplete {
                phase,
                failed: failures.len(),
            });
        }
    } else {
        pool.try_run(0..items, action)?;
    }

    let elapsed = started.elapsed();
    tracing::info!(%phase, items, ?elapsed, "phase finished");
    emit(
        events,
        GenerateEvent::PhaseFinished {
            phase,
            items,
            elapsed,
        },
    );
    Ok(())
}

/// Stateless per-item writer shared read-only by all workers.
struct DocWriter<'a> {
    content_dir: PathBuf,
    settings: &'a RunSettings,
    split: Split,
    bytes: AtomicU64,
}

impl<'a> DocWriter<'a> {
    fn new(content_dir: PathBuf, settings: &'a RunSettings, split: Split) -> Self {
        Self {
            content_dir,
            settings,
            split,
            bytes: AtomicU64::new(0),
        }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    fn write_section(&self, index: usize) -> Result<(), GenerateError> {
        let mut rng = item_rng(self.settings.seed, Phase::Sections, index);
        let doc = plan_section(&self.content_dir, index);
        self.write(&doc, self.settings.content.sample(&mut rng))
    }

    fn write_page(&self, index: usize) -> Result<(), GenerateError> {
        let mut rng = item_rng(self.settings.seed, Phase::Pages, index);
        let section = rng.gen_range(0..self.split.sections);
        let doc = plan_page(&self.content_dir, index, section, self.settings.bundle);
        self.write(&doc, self.settings.content.sample(&mut rng))
    }

    fn write(&self, doc: &PlannedDoc, size_kb: usize) -> Result<(), GenerateError> {
        fs::create_dir_all(&doc.dir).map_err(|source| GenerateError::Write {
            path: doc.dir.clone(),
            source,
        })?;
        let text = content::document(&doc.front_matter, size_kb);
        fs::write(&doc.file, &text).map_err(|source| GenerateError::Write {
            path: doc.file.clone(),
            source,
        })?;
        self.bytes.fetch_add(text.len() as u64, Ordering::Relaxed);
        tracing::debug!(path = %doc.file.display(), size_kb, "wrote document");
        Ok(())
    }
}
