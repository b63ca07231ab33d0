//! First-fit block allocation over a fixed table
//!
//! The allocator owns the block table and serves the five pool
//! operations. Allocation scans in ascending id order and takes the
//! lowest-id window of consecutive free blocks large enough for the
//! request, so placement is deterministic and reproducible. A pool with
//! enough scattered free blocks but no sufficiently long run reports
//! out-of-memory rather than splitting the allocation: fragmentation is
//! observable, not masked.

use crate::core::block::{Block, BlockId};
use crate::core::error::{PoolError, Result};
use crate::core::journal::PersistenceLog;
use std::sync::Arc;
use tracing::debug;

/// Pool occupancy report
///
/// `free_blocks + occupied_blocks == total_blocks` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub total_blocks: usize,
    pub free_blocks: usize,
    pub occupied_blocks: usize,
}

/// First-fit allocator over a fixed pool of equally sized blocks
///
/// Every allocation produces one contiguous run of blocks for a single
/// owner. The journal is notified of each block record as it is created
/// or erased, in ascending id order.
pub struct BlockAllocator {
    blocks: Vec<Block>,
    block_size: usize,
    journal: Arc<dyn PersistenceLog>,
}

impl BlockAllocator {
    /// Create an allocator with every block free.
    pub fn new(total_blocks: usize, block_size: usize, journal: Arc<dyn PersistenceLog>) -> Self {
        let blocks = (0..total_blocks as u64)
            .map(|id| Block::new(id, block_size))
            .collect();

        BlockAllocator {
            blocks,
            block_size,
            journal,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn total_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Total pool capacity in bytes
    pub fn capacity_bytes(&self) -> u64 {
        self.blocks.len() as u64 * self.block_size as u64
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id as usize)
    }

    pub fn is_allocated(&self, id: BlockId) -> bool {
        self.block(id).is_some_and(Block::is_allocated)
    }

    /// Allocate a contiguous run of blocks for `owner`.
    ///
    /// Rounds `amount_bytes` up to whole blocks and takes the first
    /// sufficient window in ascending id order. Each newly allocated
    /// block is journaled before the next one is marked.
    pub fn allocate(&mut self, owner: &str, amount_bytes: u64) -> Result<Vec<BlockId>> {
        if amount_bytes == 0 || amount_bytes > self.capacity_bytes() {
            return Err(PoolError::InvalidAmount(amount_bytes));
        }

        let block_size = self.block_size as u64;
        let required = ((amount_bytes + block_size - 1) / block_size) as usize;

        let start = self
            .find_first_fit(required)
            .ok_or(PoolError::OutOfMemory(required))?;

        for idx in start..start + required {
            self.blocks[idx].assign(owner);
            self.journal.record_block(idx as BlockId, owner)?;
        }

        debug!(
            "allocated {} block(s) at {} for owner '{}'",
            required, start, owner
        );

        Ok((start..start + required).map(|idx| idx as BlockId).collect())
    }

    /// Lowest-id window of `required` consecutive free blocks.
    fn find_first_fit(&self, required: usize) -> Option<usize> {
        let mut run_start = 0;
        let mut run_len = 0;

        for (idx, block) in self.blocks.iter().enumerate() {
            if block.is_allocated() {
                run_len = 0;
                continue;
            }

            if run_len == 0 {
                run_start = idx;
            }
            run_len += 1;

            if run_len == required {
                return Some(run_start);
            }
        }

        None
    }

    /// Free every block owned by `owner`, returning the count.
    ///
    /// An owner holding no blocks frees zero; that is success, not an
    /// error, so repeated deallocation is idempotent.
    pub fn deallocate(&mut self, owner: &str) -> Result<usize> {
        let mut freed = 0;

        for idx in 0..self.blocks.len() {
            if self.blocks[idx].owner() == Some(owner) {
                self.blocks[idx].clear();
                self.journal.erase_block(idx as BlockId)?;
                freed += 1;
            }
        }

        debug!("deallocated {} block(s) for owner '{}'", freed, owner);

        Ok(freed)
    }

    /// Replace the payload of an allocated block.
    pub fn write(&mut self, address: BlockId, data: &[u8]) -> Result<()> {
        let idx = address as usize;
        if idx >= self.blocks.len() {
            return Err(PoolError::InvalidAddress(address));
        }

        let block = &mut self.blocks[idx];
        if !block.is_allocated() {
            return Err(PoolError::BlockNotAllocated(address));
        }
        if data.len() > self.block_size {
            return Err(PoolError::InvalidAmount(data.len() as u64));
        }

        block.store(data);
        Ok(())
    }

    /// Read the concatenated payloads of `length` blocks starting at
    /// `address`.
    ///
    /// Every covered block is validated before any byte is copied; a
    /// free block anywhere in the range fails the whole read.
    pub fn read(&self, address: BlockId, length: u64) -> Result<Vec<u8>> {
        let start = address as usize;
        let end = start
            .checked_add(length as usize)
            .filter(|&end| end <= self.blocks.len())
            .ok_or(PoolError::InvalidRange { address, length })?;

        for block in &self.blocks[start..end] {
            if !block.is_allocated() {
                return Err(PoolError::BlockNotAllocated(block.id()));
            }
        }

        let mut data = Vec::new();
        for block in &self.blocks[start..end] {
            data.extend_from_slice(block.payload());
        }
        Ok(data)
    }

    /// Current occupancy counts. Pure read, always succeeds.
    pub fn status(&self) -> PoolStatus {
        let occupied = self.blocks.iter().filter(|b| b.is_allocated()).count();

        PoolStatus {
            total_blocks: self.blocks.len(),
            free_blocks: self.blocks.len() - occupied,
            occupied_blocks: occupied,
        }
    }
}
