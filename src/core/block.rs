//! Block data model
//!
//! A block is the fixed-size allocation unit of the pool. It is either
//! free (no owner, empty payload, no timestamp) or allocated to exactly
//! one owner; the three fields change together, so the table can never
//! hold a half-allocated block.

use chrono::{DateTime, Utc};

/// Ordinal position of a block in the pool
pub type BlockId = u64;

/// Fixed-size allocation unit
#[derive(Debug, Clone)]
pub struct Block {
    /// Position in the pool, immutable
    id: BlockId,

    /// Capacity in bytes, equal for every block in the pool
    size: usize,

    /// Owning process identifier, present iff the block is allocated
    owner: Option<String>,

    /// Opaque data, length <= `size`, empty while free
    payload: Vec<u8>,

    /// Set on allocate/write, cleared on deallocate
    last_modified: Option<DateTime<Utc>>,
}

impl Block {
    pub(crate) fn new(id: BlockId, size: usize) -> Self {
        Block {
            id,
            size,
            owner: None,
            payload: Vec::new(),
            last_modified: None,
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_allocated(&self) -> bool {
        self.owner.is_some()
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    /// Assign the block to an owner, stamping the modification time.
    pub(crate) fn assign(&mut self, owner: &str) {
        self.owner = Some(owner.to_string());
        self.last_modified = Some(Utc::now());
    }

    /// Reset the block to the free state.
    ///
    /// Owner, payload, and timestamp are cleared together.
    pub(crate) fn clear(&mut self) {
        self.owner = None;
        self.payload.clear();
        self.last_modified = None;
    }

    /// Replace the payload, stamping the modification time.
    ///
    /// The caller has already verified that the block is allocated and
    /// the data fits.
    pub(crate) fn store(&mut self, data: &[u8]) {
        self.payload.clear();
        self.payload.extend_from_slice(data);
        self.last_modified = Some(Utc::now());
    }
}
