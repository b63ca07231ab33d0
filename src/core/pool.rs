//! Pool facade
//!
//! `MemoryPool` wires the allocator and the fault controller together
//! behind one exclusive lock: each operation's table scan, block
//! mutation, journal notification, and fault accounting happen as a
//! single atomic unit, so parallel callers never observe a half-mutated
//! allocation run.

use crate::core::allocator::{BlockAllocator, PoolStatus};
use crate::core::block::{Block, BlockId};
use crate::core::config::PoolConfig;
use crate::core::error::{PoolError, Result};
use crate::core::fault::{FaultController, FaultSnapshot, RecoveryReport};
use crate::core::journal::{JsonJournal, MemoryJournal, PersistenceLog};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

struct Inner {
    allocator: BlockAllocator,
    faults: FaultController,
}

impl Inner {
    /// Route a failure through the controller before returning it.
    fn fault(&mut self, err: PoolError) -> PoolError {
        self.faults.on_fault(&err, &self.allocator);
        err
    }
}

/// Fixed-size block pool with fault escalation
///
/// The pool is an explicit handle — there is no ambient global
/// instance. It is `Send + Sync`; operations serialize on an internal
/// lock.
///
/// # Examples
///
/// ```rust
/// use blockpool_rs::{MemoryPool, Result};
///
/// # fn main() -> Result<()> {
/// let pool = MemoryPool::builder()
///     .total_size(64 * 1024)
///     .block_size(4096)
///     .build()?;
///
/// let blocks = pool.allocate("p1", 10_000)?; // 3 blocks
/// pool.write(blocks[0], b"hello")?;
/// assert_eq!(pool.read(blocks[0], 1)?, b"hello");
///
/// assert_eq!(pool.deallocate("p1")?, 3);
/// # Ok(())
/// # }
/// ```
pub struct MemoryPool {
    inner: Mutex<Inner>,
}

impl MemoryPool {
    /// Create a pool from a configuration.
    ///
    /// Uses a `JsonJournal` in `config.journal_dir` when set, an
    /// in-memory journal otherwise.
    pub fn new(config: PoolConfig) -> Result<Self> {
        config.validate()?;

        let journal: Arc<dyn PersistenceLog> = match &config.journal_dir {
            Some(dir) => Arc::new(JsonJournal::open(dir)?),
            None => Arc::new(MemoryJournal::new()),
        };

        Self::with_journal(config, journal)
    }

    /// Create a pool with a caller-supplied journal.
    pub fn with_journal(config: PoolConfig, journal: Arc<dyn PersistenceLog>) -> Result<Self> {
        config.validate()?;

        let total_blocks = config.block_count() as usize;
        let allocator =
            BlockAllocator::new(total_blocks, config.block_size as usize, Arc::clone(&journal));
        let faults = FaultController::new(config.escalation_threshold, journal);

        info!(
            "pool created: {} block(s) of {} byte(s), escalation threshold {}",
            total_blocks, config.block_size, config.escalation_threshold
        );

        Ok(MemoryPool {
            inner: Mutex::new(Inner { allocator, faults }),
        })
    }

    pub fn builder() -> PoolBuilder {
        PoolBuilder::new()
    }

    /// Allocate a contiguous run of blocks for `owner`.
    pub fn allocate(&self, owner: &str, amount_bytes: u64) -> Result<Vec<BlockId>> {
        let inner = &mut *self.inner.lock();
        inner
            .allocator
            .allocate(owner, amount_bytes)
            .map_err(|err| inner.fault(err))
    }

    /// Free every block owned by `owner`, returning the count.
    pub fn deallocate(&self, owner: &str) -> Result<usize> {
        let inner = &mut *self.inner.lock();
        inner
            .allocator
            .deallocate(owner)
            .map_err(|err| inner.fault(err))
    }

    /// Replace the payload of an allocated block.
    pub fn write(&self, address: BlockId, data: &[u8]) -> Result<()> {
        let inner = &mut *self.inner.lock();
        inner
            .allocator
            .write(address, data)
            .map_err(|err| inner.fault(err))
    }

    /// Read the concatenated payloads of `length` blocks starting at
    /// `address`.
    pub fn read(&self, address: BlockId, length: u64) -> Result<Vec<u8>> {
        let inner = &mut *self.inner.lock();
        inner
            .allocator
            .read(address, length)
            .map_err(|err| inner.fault(err))
    }

    /// Current occupancy counts. Always succeeds.
    pub fn status(&self) -> PoolStatus {
        self.inner.lock().allocator.status()
    }

    /// Trigger recovery immediately, without waiting for escalation.
    pub fn recover(&self) -> RecoveryReport {
        let inner = &mut *self.inner.lock();
        inner.faults.recover(&inner.allocator)
    }

    /// Point-in-time view of the fault state.
    pub fn fault_snapshot(&self) -> FaultSnapshot {
        self.inner.lock().faults.snapshot()
    }

    /// Snapshot of one block, if the address is in range.
    pub fn block(&self, id: BlockId) -> Option<Block> {
        self.inner.lock().allocator.block(id).cloned()
    }

    pub fn block_size(&self) -> usize {
        self.inner.lock().allocator.block_size()
    }

    pub fn total_blocks(&self) -> usize {
        self.inner.lock().allocator.total_blocks()
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.inner.lock().allocator.capacity_bytes()
    }
}

/// Builder for customizing pool creation
///
/// # Examples
///
/// ```rust
/// use blockpool_rs::MemoryPool;
///
/// let pool = MemoryPool::builder()
///     .total_size(1024)
///     .block_size(64)
///     .escalation_threshold(5)
///     .build()
///     .unwrap();
/// assert_eq!(pool.total_blocks(), 16);
/// ```
pub struct PoolBuilder {
    config: PoolConfig,
    journal: Option<Arc<dyn PersistenceLog>>,
}

impl PoolBuilder {
    pub fn new() -> Self {
        PoolBuilder {
            config: PoolConfig::default(),
            journal: None,
        }
    }

    /// Total pool capacity in bytes.
    pub fn total_size(mut self, bytes: u64) -> Self {
        self.config.total_size = bytes;
        self
    }

    /// Size of each block in bytes.
    pub fn block_size(mut self, bytes: u64) -> Self {
        self.config.block_size = bytes;
        self
    }

    /// Consecutive faults tolerated before recovery triggers.
    pub fn escalation_threshold(mut self, faults: u32) -> Self {
        self.config.escalation_threshold = faults;
        self
    }

    /// Keep the journal as JSON files under `dir`.
    pub fn journal_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.journal_dir = Some(dir.into());
        self
    }

    /// Use a caller-supplied journal instead of the configured one.
    pub fn journal(mut self, journal: Arc<dyn PersistenceLog>) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn build(self) -> Result<MemoryPool> {
        match self.journal {
            Some(journal) => MemoryPool::with_journal(self.config, journal),
            None => MemoryPool::new(self.config),
        }
    }
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}
