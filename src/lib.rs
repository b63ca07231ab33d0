//! # Blockpool - Fixed-Block Memory Pool Simulator
//!
//! `blockpool-rs` simulates the memory subsystem of a toy operating
//! system: a fixed-size pool divided into fixed-size blocks, allocated
//! to logical process identifiers, with a fault/recovery state machine
//! triggered by invalid operations or resource exhaustion.
//!
//! - **First-fit contiguous allocation**: every allocation is one
//!   contiguous run of blocks at the lowest sufficient position, so
//!   placement is deterministic and fragmentation is observable.
//! - **Fault escalation**: repeated operation failures escalate to a
//!   recovery pass that reconciles the live table against a durable
//!   per-block journal.
//! - **Pluggable journal**: JSON files on disk, an in-memory map, or
//!   any [`PersistenceLog`] implementation.
//!
//! ## Quick Start
//!
//! ```rust
//! use blockpool_rs::{MemoryPool, Result};
//!
//! # fn main() -> Result<()> {
//! let pool = MemoryPool::builder()
//!     .total_size(64 * 1024)
//!     .block_size(4096)
//!     .build()?;
//!
//! // Allocate 10 KB for process "p1" (rounds up to 3 blocks)
//! let blocks = pool.allocate("p1", 10_000)?;
//! assert_eq!(blocks.len(), 3);
//!
//! // Write and read back a payload
//! pool.write(blocks[0], b"hello")?;
//! assert_eq!(pool.read(blocks[0], 1)?, b"hello");
//!
//! // Occupancy report
//! let status = pool.status();
//! assert_eq!(status.occupied_blocks, 3);
//!
//! // Free everything "p1" holds
//! assert_eq!(pool.deallocate("p1")?, 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Durable journal and recovery
//!
//! ```rust,no_run
//! use blockpool_rs::{MemoryPool, Result};
//!
//! # fn main() -> Result<()> {
//! let pool = MemoryPool::builder()
//!     .total_size(1024)
//!     .block_size(1)
//!     .journal_dir("data/journal")
//!     .build()?;
//!
//! pool.allocate("p1", 16)?; // one JSON record per block
//!
//! // Reconcile the journal against the live table on demand
//! let report = pool.recover();
//! println!("{} record(s) restored", report.restored.len());
//! # Ok(())
//! # }
//! ```

// Core implementation
pub mod core;

// Re-export the types users need
pub use crate::core::{
    allocator::{BlockAllocator, PoolStatus},
    block::{Block, BlockId},
    config::PoolConfig,
    error::{PoolError, Result},
    fault::{FaultController, FaultMode, FaultSnapshot, RecoveryReport},
    journal::{BlockRecord, JsonJournal, MemoryJournal, PersistenceLog},
    pool::{MemoryPool, PoolBuilder},
};
