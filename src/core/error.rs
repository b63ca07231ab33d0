use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Invalid amount: {0} bytes")]
    InvalidAmount(u64),

    #[error("Out of memory: no contiguous run of {0} free blocks")]
    OutOfMemory(usize),

    #[error("Invalid address: {0}")]
    InvalidAddress(u64),

    #[error("Invalid range: {length} block(s) at address {address} exceeds pool bounds")]
    InvalidRange { address: u64, length: u64 },

    #[error("Block {0} is not allocated")]
    BlockNotAllocated(u64),

    #[error("Record checksum verification failed for block {0}")]
    ChecksumMismatch(u64),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PoolError {
    /// Stable kind tag for user-facing reporting.
    ///
    /// Messages may change between releases; these tags do not.
    pub fn kind(&self) -> &'static str {
        match self {
            PoolError::InvalidAmount(_) => "invalid-amount",
            PoolError::OutOfMemory(_) => "out-of-memory",
            PoolError::InvalidAddress(_) => "invalid-address",
            PoolError::InvalidRange { .. } => "invalid-range",
            PoolError::BlockNotAllocated(_) => "block-not-allocated",
            PoolError::ChecksumMismatch(_) => "checksum-mismatch",
            PoolError::Config(_) => "config",
            PoolError::Io(_) => "io",
            PoolError::Serialization(_) => "serialization",
        }
    }
}

pub type Result<T> = std::result::Result<T, PoolError>;
