//! Table generation workflow
//!
//! This module provides the background build coordinator together with
//! synchronous helpers that build a fixed number of chains.

use crate::app::table::RainbowTable;
use crate::domain::chain::build_random_chain;
use crate::error::{RainbowError, Result};
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// Cooperative cancellation flag shared between a caller and build workers
///
/// Workers check it once per completed chain, never mid-chain.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Check whether cancellation was requested
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Handle to a running build
///
/// The table stays marked as building until the handle is joined or
/// dropped, even after cancellation. Dropping the handle cancels the build
/// and waits for the workers.
pub struct BuildHandle {
    cancel: CancelToken,
    workers: Vec<JoinHandle<Result<u64>>>,
    // Dropped after the workers are joined
    slot: BuildSlot,
}

impl BuildHandle {
    /// Request cancellation of all workers
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the workers to exit
    ///
    /// Does not cancel by itself. Returns the number of chains built by
    /// this build, or the first worker error.
    pub fn join(mut self) -> Result<u64> {
        self.join_workers()
    }

    fn join_workers(&mut self) -> Result<u64> {
        let mut built = 0;
        let mut first_error = None;

        for worker in self.workers.drain(..) {
            match worker.join() {
                Ok(Ok(count)) => built += count,
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(built),
        }
    }
}

impl Drop for BuildHandle {
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.cancel();
        // Errors were already logged by the workers
        let _ = self.join_workers();
    }
}

/// Releases the table's build slot once the handle and all workers are done
struct BuildSlot {
    table: RainbowTable,
    active: Arc<AtomicUsize>,
}

impl BuildSlot {
    fn share(&self) -> Self {
        self.active.fetch_add(1, Ordering::AcqRel);
        Self {
            table: self.table.clone(),
            active: Arc::clone(&self.active),
        }
    }
}

impl Drop for BuildSlot {
    fn drop(&mut self) {
        if self.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.table.end_build();
        }
    }
}

/// Start `thread_count` workers that build chains until `cancel` is set
///
/// Returns immediately after spawning. If a worker cannot be spawned, the
/// token is cancelled, the workers already running are joined and the
/// spawn error is returned.
pub fn start_building(table: &RainbowTable, cancel: CancelToken) -> Result<BuildHandle> {
    if !table.try_begin_build() {
        return Err(RainbowError::AlreadyBuilding);
    }

    let params = table.params();
    let thread_count = params.thread_count;
    info!(
        threads = thread_count,
        alphabet = %params.alphabet,
        password_length = params.password_length,
        hash_length = params.hash_length,
        row_length = params.row_length,
        "starting table build"
    );

    let mut handle = BuildHandle {
        cancel: cancel.clone(),
        workers: Vec::with_capacity(thread_count),
        slot: BuildSlot {
            table: table.clone(),
            active: Arc::new(AtomicUsize::new(1)),
        },
    };

    for index in 0..thread_count {
        let slot = handle.slot.share();
        let cancel = cancel.clone();

        let spawned = thread::Builder::new()
            .name(format!("rainbow-build-{}", index))
            .spawn(move || build_until_cancelled(&slot.table, &cancel, index));

        match spawned {
            Ok(worker) => handle.workers.push(worker),
            Err(e) => {
                error!(worker = index, error = %e, "failed to spawn build worker");
                drop(handle);
                return Err(e.into());
            }
        }
    }

    Ok(handle)
}

/// Worker loop: build a chain, insert it, check for cancellation
fn build_until_cancelled(table: &RainbowTable, cancel: &CancelToken, index: usize) -> Result<u64> {
    let params = table.params();
    let mut built = 0u64;

    while !cancel.is_cancelled() {
        let entry = match build_random_chain(params) {
            Ok(entry) => entry,
            Err(e) => {
                error!(worker = index, error = %e, "chain build failed, stopping worker");
                return Err(e);
            }
        };
        table.insert_chain(entry);
        built += 1;
    }

    debug!(worker = index, built, "build worker stopped");
    Ok(built)
}

/// Build `count` chains on the calling thread
///
/// Returns the number of chains accepted by the table.
pub fn build_chains(table: &RainbowTable, count: usize) -> Result<usize> {
    let params = table.params();
    let mut inserted = 0;

    for _ in 0..count {
        if table.insert_chain(build_random_chain(params)?) {
            inserted += 1;
        }
    }

    Ok(inserted)
}

/// Build `count` chains on the rayon pool
///
/// Returns the number of chains accepted by the table.
pub fn build_chains_parallel(table: &RainbowTable, count: usize) -> Result<usize> {
    let params = table.params();

    (0..count)
        .into_par_iter()
        .map(|_| build_random_chain(params).map(|entry| usize::from(table.insert_chain(entry))))
        .try_reduce(|| 0, |a, b| Ok(a + b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain::compute_chain;
    use std::time::Duration;

    fn table(thread_count: usize) -> RainbowTable {
        RainbowTable::configure("abcdefgh", 4, 2, 16, thread_count).unwrap()
    }

    fn wait_for_rows(table: &RainbowTable, rows: usize) {
        while table.row_count() < rows {
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_build_until_cancelled() {
        let table = table(3);
        let cancel = CancelToken::new();
        let handle = table.start_building(cancel.clone()).unwrap();
        assert!(table.is_building());

        wait_for_rows(&table, 20);
        cancel.cancel();
        let built = handle.join().unwrap();

        assert!(built >= 20);
        assert!(table.row_count() >= 20);
        assert!(table.row_count() as u64 <= built);
        assert!(!table.is_building());
    }

    #[test]
    fn test_rejects_second_build() {
        let table = table(1);
        let handle = table.start_building(CancelToken::new()).unwrap();

        assert!(matches!(
            table.start_building(CancelToken::new()),
            Err(RainbowError::AlreadyBuilding)
        ));

        handle.cancel();
        handle.join().unwrap();
    }

    #[test]
    fn test_rejects_build_after_cancel_before_join() {
        let table = table(3);
        let handle = table.start_building(CancelToken::new()).unwrap();
        wait_for_rows(&table, 10);

        handle.cancel();
        // Workers may finish their current chain; the slot stays held until join
        assert!(table.is_building());
        assert!(matches!(
            table.start_building(CancelToken::new()),
            Err(RainbowError::AlreadyBuilding)
        ));

        let built = handle.join().unwrap();
        assert!(!table.is_building());
        assert!(table.row_count() as u64 <= built);
        for entry in table.entries() {
            assert_eq!(compute_chain(table.params(), entry.start.clone()), entry);
        }

        let rows = table.row_count();
        let handle = table.start_building(CancelToken::new()).unwrap();
        handle.cancel();
        handle.join().unwrap();
        assert!(table.row_count() >= rows);
    }

    #[test]
    fn test_restart_after_join() {
        let table = table(2);

        let handle = table.start_building(CancelToken::new()).unwrap();
        wait_for_rows(&table, 5);
        handle.cancel();
        handle.join().unwrap();
        let rows_after_first = table.row_count();

        let handle = table.start_building(CancelToken::new()).unwrap();
        wait_for_rows(&table, rows_after_first + 5);
        drop(handle);

        assert!(!table.is_building());
        assert!(table.row_count() >= rows_after_first + 5);
    }

    #[test]
    fn test_drop_cancels_and_joins() {
        let table = table(2);
        let cancel = CancelToken::new();
        let handle = table.start_building(cancel.clone()).unwrap();
        drop(handle);

        assert!(cancel.is_cancelled());
        assert!(!table.is_building());
    }

    #[test]
    fn test_row_count_non_decreasing() {
        let table = table(2);
        let handle = table.start_building(CancelToken::new()).unwrap();

        let mut previous = 0;
        for _ in 0..200 {
            let rows = table.row_count();
            assert!(rows >= previous);
            previous = rows;
        }

        handle.cancel();
        handle.join().unwrap();
        assert!(table.row_count() >= previous);
    }

    #[test]
    fn test_built_chains_replay() {
        let table = table(2);
        let handle = table.start_building(CancelToken::new()).unwrap();
        wait_for_rows(&table, 30);
        handle.cancel();
        handle.join().unwrap();

        for entry in table.entries() {
            assert_eq!(compute_chain(table.params(), entry.start.clone()), entry);
        }
    }

    #[test]
    fn test_build_chains() {
        let table = table(1);
        let inserted = build_chains(&table, 50).unwrap();
        assert_eq!(inserted, table.row_count());
        assert!(inserted > 0 && inserted <= 50);
    }

    #[test]
    fn test_build_chains_parallel() {
        let table = table(1);
        let inserted = build_chains_parallel(&table, 200).unwrap();
        assert_eq!(inserted, table.row_count());
        assert!(inserted > 0 && inserted <= 200);
    }
}
