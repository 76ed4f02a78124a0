//! # sitefill
//!
//! Generates large synthetic content trees (sections full of markdown pages)
//! for exercising static site builds at scale. A million-page tree is the
//! default.
//!
//! # Architecture: Two-Phase Batch Generation
//!
//! ```text
//! RunConfig ──► Split ──► reset content/ ──► Phase A: sections ──► Phase B: pages
//!                                              (WorkPool)            (WorkPool)
//! ```
//!
//! Each phase is a batch of integer work items executed on a bounded pool of
//! worker threads. The pool call blocks until the batch completes, so pages
//! are only written once every section directory exists.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Run configuration: defaults, `run.toml` layering, validation |
//! | [`plan`] | Section/page split and index-derived output paths |
//! | [`content`] | Filler text bodies and document assembly |
//! | [`seed`] | Per-item random generators derived from the run seed |
//! | [`pool`] | Bounded work pool with abort and keep-going policies |
//! | [`generate`] | Run orchestration: reset, sections phase, pages phase |
//! | [`check`] | Verification of a generated tree |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## No Shared Random Source
//!
//! Workers never touch a common generator. Every item hashes
//! `(seed, phase, index)` into its own generator, which keeps workers free of
//! shared mutable state and makes the tree identical across runs with the
//! same seed, whatever the worker count.
//!
//! ## Paths From Indices
//!
//! Every output path is a function of an item index (plus, for pages, the
//! section drawn from that item's generator). Two items never write the same
//! path, so no locking is needed around the filesystem.
//!
//! ## Fail Fast by Default
//!
//! A failed directory creation or write stops the run: no further items are
//! started and the error is reported. No cleanup is attempted; the next run
//! clears `content/` anyway. `keep_going` trades this for a full report of
//! every failed item.

pub mod check;
pub mod config;
pub mod content;
pub mod generate;
pub mod logging;
pub mod output;
pub mod plan;
pub mod pool;
pub mod seed;

#[cfg(test)]
pub(crate) mod test_helpers;
