//! Shared rainbow table store
//!
//! `RainbowTable` maps chain ends to chain starts. It is cheap to clone
//! (all clones share one store) and safe to use from many threads: inserts
//! take the write lock for a single map operation, lookups take the read lock.
//!
//! Insertion policy is first-wins: a chain whose end is already present is
//! dropped. Merged chains therefore cost one chain of work but no memory,
//! and every lookup is a single O(1) probe.

use crate::app::generator::{self, BuildHandle, CancelToken};
use crate::app::searcher;
use crate::domain::chain::ChainEntry;
use crate::domain::coverage::{CoverageEstimate, estimate_coverage};
use crate::domain::key::HashKey;
use crate::domain::params::{Alphabet, RainbowParameters};
use crate::error::Result;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// End hash → start password
type ChainMap = FxHashMap<HashKey, String>;

struct TableInner {
    params: RainbowParameters,
    rows: RwLock<ChainMap>,
    building: AtomicBool,
}

/// Thread-safe rainbow table
#[derive(Clone)]
pub struct RainbowTable {
    inner: Arc<TableInner>,
}

impl RainbowTable {
    /// Create an empty table for validated parameters
    pub fn new(params: RainbowParameters) -> Self {
        Self {
            inner: Arc::new(TableInner {
                params,
                rows: RwLock::new(ChainMap::default()),
                building: AtomicBool::new(false),
            }),
        }
    }

    /// Validate raw parameters and create an empty table
    pub fn configure(
        alphabet: &str,
        password_length: usize,
        hash_length: usize,
        row_length: u32,
        thread_count: usize,
    ) -> Result<Self> {
        let params = RainbowParameters::new(
            Alphabet::new(alphabet)?,
            password_length,
            hash_length,
            row_length,
            thread_count,
        )?;
        Ok(Self::new(params))
    }

    /// Table parameters
    pub fn params(&self) -> &RainbowParameters {
        &self.inner.params
    }

    /// Insert a chain unless its end is already present
    ///
    /// Returns `true` if the chain was stored.
    pub fn insert_chain(&self, entry: ChainEntry) -> bool {
        let mut rows = self.write_rows();
        if rows.contains_key(&entry.end) {
            return false;
        }
        rows.insert(entry.end, entry.start);
        true
    }

    /// Start password of the chain ending in `end`
    pub fn lookup(&self, end: &HashKey) -> Option<String> {
        self.read_rows().get(end).cloned()
    }

    /// Number of stored chains
    pub fn row_count(&self) -> usize {
        self.read_rows().len()
    }

    /// Check if the table has no chains
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Advisory coverage of the hash domain
    pub fn estimate_coverage(&self) -> CoverageEstimate {
        let params = self.params();
        estimate_coverage(self.row_count(), params.row_length, params.hash_domain_size())
    }

    /// Snapshot of all stored chains, in no particular order
    pub fn entries(&self) -> Vec<ChainEntry> {
        self.read_rows()
            .iter()
            .map(|(end, start)| ChainEntry::new(start.clone(), *end))
            .collect()
    }

    /// Check whether a build holds the table
    pub fn is_building(&self) -> bool {
        self.inner.building.load(Ordering::Acquire)
    }

    /// Start building chains on `thread_count` background threads
    ///
    /// Returns immediately. Fails with `AlreadyBuilding` until the handle
    /// of the previous build has been joined or dropped.
    pub fn start_building(&self, cancel: CancelToken) -> Result<BuildHandle> {
        generator::start_building(self, cancel)
    }

    /// Search a password hashing to `target`
    ///
    /// `Ok(None)` means not found.
    pub fn search_password(&self, target: &HashKey) -> Result<Option<String>> {
        searcher::search_password(self, target)
    }

    /// Claim the build slot; `false` if another build holds it
    pub(crate) fn try_begin_build(&self) -> bool {
        self.inner
            .building
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Release the build slot
    pub(crate) fn end_build(&self) {
        self.inner.building.store(false, Ordering::Release);
    }

    // Every insert is a single map operation, so a poisoned lock still
    // guards a consistent map.
    fn read_rows(&self) -> RwLockReadGuard<'_, ChainMap> {
        self.inner
            .rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_rows(&self) -> RwLockWriteGuard<'_, ChainMap> {
        self.inner
            .rows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RainbowTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RainbowTable")
            .field("params", self.params())
            .field("rows", &self.row_count())
            .field("building", &self.is_building())
            .finish()
    }
}
