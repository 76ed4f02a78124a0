//! Bounded work pool.
//!
//! Runs a batch of independent work items on a dedicated
//! [rayon](https://docs.rs/rayon) thread pool with exactly `workers` threads,
//! so at most `workers` actions execute at once. Both entry points block
//! the caller until the batch is done, which makes each call a barrier:
//! nothing submitted afterwards can observe a half-finished batch.
//!
//! Two failure policies are offered:
//!
//! - [`WorkPool::try_run`] aborts: once any action fails no further items
//!   are started, in-flight items finish, and the error is returned.
//! - [`WorkPool::run_collecting`] keeps going: every item is attempted
//!   exactly once and the failures are handed back sorted by index.
//!
//! There is no ordering among items, no retry, and no cancellation beyond
//! the abort policy above.

use rayon::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("work pool needs at least one worker")]
    NoWorkers,
    #[error("failed to start worker threads: {0}")]
    Build(#[from] rayon::ThreadPoolBuildError),
}

/// A failed work item and its error.
#[derive(Debug)]
pub struct ItemFailure<E> {
    pub index: usize,
    pub error: E,
}

pub struct WorkPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl WorkPool {
    pub fn new(workers: usize) -> Result<Self, PoolError> {
        if workers == 0 {
            return Err(PoolError::NoWorkers);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("sitefill-worker-{i}"))
            .build()?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `action` for each item, stopping at the first failure.
    pub fn try_run<I, F, E>(&self, items: I, action: F) -> Result<(), E>
    where
        I: IntoParallelIterator<Item = usize> + Send,
        F: Fn(usize) -> Result<(), E> + Sync + Send,
        E: Send,
    {
        self.pool
            .install(|| items.into_par_iter().try_for_each(|index| action(index)))
    }

    /// Run `action` for every item and collect the failures.
    pub fn run_collecting<I, F, E>(&self, items: I, action: F) -> Vec<ItemFailure<E>>
    where
        I: IntoParallelIterator<Item = usize> + Send,
        F: Fn(usize) -> Result<(), E> + Sync + Send,
        E: Send,
    {
        let mut failures: Vec<ItemFailure<E>> = self.pool.install(|| {
            items
                .into_par_iter()
                .filter_map(|index| action(index).err().map(|error| ItemFailure { index, error }))
                .collect()
        });
        failures.sort_by_key(|f| f.index);
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn attempts(k: usize) -> Vec<AtomicUsize> {
        (0..k).map(|_| AtomicUsize::new(0)).collect()
    }

    #[test]
    fn zero_workers_rejected() {
        assert!(matches!(WorkPool::new(0), Err(PoolError::NoWorkers)));
    }

    #[test]
    fn every_item_runs_exactly_once() {
        let pool = WorkPool::new(4).unwrap();
        // K = 0, K < W, K = W, K > W
        for k in [0, 3, 4, 1000] {
            let seen = attempts(k);
            pool.try_run(0..k, |i| {
                seen[i].fetch_add(1, Ordering::SeqCst);
                Ok::<(), ()>(())
            })
            .unwrap();
            assert!(
                seen.iter().all(|n| n.load(Ordering::SeqCst) == 1),
                "K={k}: some item not run exactly once"
            );
        }
    }

    #[test]
    fn accepts_unordered_item_lists() {
        let pool = WorkPool::new(3).unwrap();
        let items = vec![9, 2, 7, 0, 4];
        let seen = Mutex::new(Vec::new());
        pool.try_run(items.clone(), |i| {
            seen.lock().unwrap().push(i);
            Ok::<(), ()>(())
        })
        .unwrap();
        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 2, 4, 7, 9]);
    }

    #[test]
    fn concurrency_is_bounded_by_workers() {
        let workers = 3;
        let pool = WorkPool::new(workers).unwrap();
        let running = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        pool.try_run(0..60, |_| {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(2));
            running.fetch_sub(1, Ordering::SeqCst);
            Ok::<(), ()>(())
        })
        .unwrap();
        let peak = peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= workers, "peak concurrency {peak}");
    }

    #[test]
    fn try_run_returns_failure() {
        let pool = WorkPool::new(2).unwrap();
        let seen = attempts(500);
        let result = pool.try_run(0..500, |i| {
            seen[i].fetch_add(1, Ordering::SeqCst);
            if i == 0 { Err(format!("item {i} failed")) } else { Ok(()) }
        });
        assert_eq!(result, Err("item 0 failed".to_string()));
        assert!(seen.iter().all(|n| n.load(Ordering::SeqCst) <= 1));
    }

    #[test]
    fn run_collecting_attempts_everything() {
        let pool = WorkPool::new(4).unwrap();
        let seen = attempts(100);
        let failures = pool.run_collecting(0..100, |i| {
            seen[i].fetch_add(1, Ordering::SeqCst);
            if i % 25 == 0 { Err(i * 10) } else { Ok(()) }
        });
        assert!(seen.iter().all(|n| n.load(Ordering::SeqCst) == 1));
        let indices: Vec<usize> = failures.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 25, 50, 75]);
        assert_eq!(failures[1].error, 250);
    }

    #[test]
    fn run_collecting_empty_batch() {
        let pool = WorkPool::new(2).unwrap();
        let failures = pool.run_collecting(0..0, |_| Err::<(), _>(()));
        assert!(failures.is_empty());
    }
}
