//! Durable per-block journal
//!
//! One record per allocated block, keyed by block id and erased on
//! deallocation. The journal is the recovery evidence consulted by the
//! fault controller: presence or absence of a record signals allocation
//! state. The pool talks to it through a narrow interface and never
//! depends on the storage format.

use crate::core::block::BlockId;
use crate::core::error::{PoolError, Result};
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Durable record for one allocated block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    /// Block id, unique per record
    pub block_id: BlockId,

    /// Owning process identifier
    pub owner: String,

    /// Creation timestamp (RFC 3339)
    pub created_at: String,

    /// CRC32 over block id, owner, and creation timestamp
    pub checksum: u32,
}

impl BlockRecord {
    /// Create a record stamped with the current time.
    pub fn new(block_id: BlockId, owner: &str) -> Self {
        let created_at = Utc::now().to_rfc3339();
        let checksum = Self::checksum_of(block_id, owner, &created_at);

        BlockRecord {
            block_id,
            owner: owner.to_string(),
            created_at,
            checksum,
        }
    }

    fn checksum_of(block_id: BlockId, owner: &str, created_at: &str) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&block_id.to_le_bytes());
        hasher.update(owner.as_bytes());
        hasher.update(created_at.as_bytes());
        hasher.finalize()
    }

    /// Verify the stored checksum against the record fields.
    pub fn verify(&self) -> Result<()> {
        if self.checksum != Self::checksum_of(self.block_id, &self.owner, &self.created_at) {
            return Err(PoolError::ChecksumMismatch(self.block_id));
        }
        Ok(())
    }

    /// Recompute the checksum from the record fields.
    fn reseal(&mut self) {
        self.checksum = Self::checksum_of(self.block_id, &self.owner, &self.created_at);
    }
}

/// Durable record store for allocated blocks
///
/// Implementations must tolerate repeated erasure and treat restore as
/// best-effort; recovery never propagates a restore failure.
pub trait PersistenceLog: Send + Sync {
    /// Persist a record for a newly allocated block.
    fn record_block(&self, id: BlockId, owner: &str) -> Result<()>;

    /// Erase the record for a deallocated block.
    ///
    /// Erasing an absent record is a no-op.
    fn erase_block(&self, id: BlockId) -> Result<()>;

    /// Ids of every block the journal currently holds a record for.
    fn list_records(&self) -> Result<BTreeSet<BlockId>>;

    /// Rewrite the durable form of the journal's own record for `id`.
    ///
    /// Repairs a damaged encoding (stale checksum, partial write) from
    /// the stored fields. Returns whether a record was rewritten: a
    /// journal without a record for `id` treats this as a no-op, and a
    /// record too damaged to re-encode is skipped with a warning.
    fn restore_block(&self, id: BlockId) -> Result<bool>;
}

/// Journal keeping one JSON file per allocated block
///
/// Records live in a flat directory as `block_<id>.json`; the file name
/// carries the key, so a record whose body has been damaged is still
/// listable and repairable.
pub struct JsonJournal {
    dir: PathBuf,
}

impl JsonJournal {
    /// Open a journal directory, creating it if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(JsonJournal {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: BlockId) -> PathBuf {
        self.dir.join(format!("block_{}.json", id))
    }

    fn id_from_name(name: &str) -> Option<BlockId> {
        name.strip_prefix("block_")?
            .strip_suffix(".json")?
            .parse()
            .ok()
    }

    /// Read and verify the record for `id`, if present.
    pub fn read_record(&self, id: BlockId) -> Result<Option<BlockRecord>> {
        let bytes = match fs::read(self.record_path(id)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let record: BlockRecord = serde_json::from_slice(&bytes)?;
        record.verify()?;
        Ok(Some(record))
    }

    fn write_record(&self, record: &BlockRecord) -> Result<()> {
        let json = serde_json::to_vec_pretty(record)?;
        fs::write(self.record_path(record.block_id), json)?;
        Ok(())
    }
}

impl PersistenceLog for JsonJournal {
    fn record_block(&self, id: BlockId, owner: &str) -> Result<()> {
        self.write_record(&BlockRecord::new(id, owner))?;
        debug!("journaled block {} for owner '{}'", id, owner);
        Ok(())
    }

    fn erase_block(&self, id: BlockId) -> Result<()> {
        match fs::remove_file(self.record_path(id)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn list_records(&self) -> Result<BTreeSet<BlockId>> {
        let mut ids = BTreeSet::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(id) = entry.file_name().to_str().and_then(Self::id_from_name) {
                ids.insert(id);
            }
        }

        Ok(ids)
    }

    fn restore_block(&self, id: BlockId) -> Result<bool> {
        let bytes = match fs::read(self.record_path(id)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_slice::<BlockRecord>(&bytes) {
            Ok(mut record) => {
                // The file name is the key; the body is re-sealed to it.
                record.block_id = id;
                record.reseal();
                self.write_record(&record)?;
                debug!("rewrote journal record for block {}", id);
                Ok(true)
            }
            Err(err) => {
                warn!("journal record for block {} is not restorable: {}", id, err);
                Ok(false)
            }
        }
    }
}

/// In-memory journal for tests and ephemeral pools
#[derive(Default)]
pub struct MemoryJournal {
    records: Mutex<BTreeMap<BlockId, BlockRecord>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current record for `id`, if any.
    pub fn record(&self, id: BlockId) -> Option<BlockRecord> {
        self.records.lock().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl PersistenceLog for MemoryJournal {
    fn record_block(&self, id: BlockId, owner: &str) -> Result<()> {
        self.records.lock().insert(id, BlockRecord::new(id, owner));
        Ok(())
    }

    fn erase_block(&self, id: BlockId) -> Result<()> {
        self.records.lock().remove(&id);
        Ok(())
    }

    fn list_records(&self) -> Result<BTreeSet<BlockId>> {
        Ok(self.records.lock().keys().copied().collect())
    }

    fn restore_block(&self, id: BlockId) -> Result<bool> {
        match self.records.lock().get_mut(&id) {
            Some(record) => {
                record.reseal();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
