//! Diagnostic logging.
//!
//! User-facing progress goes to stdout through [`crate::output`]. Everything
//! else (phase timings, per-item failures, fatal errors) goes through
//! `tracing` to stderr, so the two streams can be redirected separately.
//!
//! The level comes from `RUST_LOG` when set; otherwise `info`, or `debug`
//! with `--verbose`. Per-document writes log at `debug`.

use tracing_subscriber::EnvFilter;

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("sitefill=debug")
        } else {
            EnvFilter::new("sitefill=info")
        }
    })
}

/// Install the global stderr subscriber. Safe to call more than once; only
/// the first call takes effect.
pub fn init_logging(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
