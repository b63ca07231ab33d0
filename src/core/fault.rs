//! Fault tracking and recovery
//!
//! Two states only: Normal and Recovering. Every failed pool operation
//! is counted; reaching the escalation threshold (or a manual trigger)
//! runs one synchronous reconciliation pass against the journal, after
//! which the controller returns to Normal and the fault count resets.
//! There are no intermediate states, retries, or backoff.

use crate::core::allocator::BlockAllocator;
use crate::core::block::BlockId;
use crate::core::error::PoolError;
use crate::core::journal::PersistenceLog;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Controller mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultMode {
    Normal,
    Recovering,
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Journal records rewritten because the live table does not hold
    /// their block as allocated
    pub restored: Vec<BlockId>,
}

/// Point-in-time view of the fault state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultSnapshot {
    pub fault_count: u32,
    pub mode: FaultMode,
    pub recoveries: u64,
    /// Synthetic code of the most recent fault, e.g. `FAULT-7`
    pub last_code: Option<String>,
}

/// Fault counter and two-state recovery machine
///
/// Recovery is one-directional by design: the journal's records are
/// repaired from their own stored fields, and the live block table is
/// left untouched. The journal is recovery evidence, not a restore
/// source for live state — callers should not expect a recovery pass to
/// resurrect table entries.
pub struct FaultController {
    fault_count: u32,
    mode: FaultMode,
    escalation_threshold: u32,
    recoveries: u64,
    /// Lifetime fault counter, feeds the synthetic codes; never resets
    faults_seen: u64,
    last_code: Option<String>,
    journal: Arc<dyn PersistenceLog>,
}

impl FaultController {
    pub fn new(escalation_threshold: u32, journal: Arc<dyn PersistenceLog>) -> Self {
        FaultController {
            fault_count: 0,
            mode: FaultMode::Normal,
            escalation_threshold,
            recoveries: 0,
            faults_seen: 0,
            last_code: None,
            journal,
        }
    }

    pub fn mode(&self) -> FaultMode {
        self.mode
    }

    pub fn fault_count(&self) -> u32 {
        self.fault_count
    }

    pub fn snapshot(&self) -> FaultSnapshot {
        FaultSnapshot {
            fault_count: self.fault_count,
            mode: self.mode,
            recoveries: self.recoveries,
            last_code: self.last_code.clone(),
        }
    }

    /// Record a failed operation, escalating at the threshold.
    ///
    /// Returns the recovery report when this fault triggered
    /// reconciliation, `None` while below the threshold.
    pub fn on_fault(
        &mut self,
        err: &PoolError,
        allocator: &BlockAllocator,
    ) -> Option<RecoveryReport> {
        self.fault_count += 1;
        self.faults_seen += 1;

        let code = format!("FAULT-{}", self.faults_seen);
        error!("{} [{}] {}", code, err.kind(), err);
        self.last_code = Some(code);

        if self.fault_count >= self.escalation_threshold {
            Some(self.recover(allocator))
        } else {
            None
        }
    }

    /// Enter Recovering, reconcile once, return to Normal.
    ///
    /// Also serves as the manual trigger. Recovery cannot fail: the
    /// reconciliation pass is best-effort and always completes.
    pub fn recover(&mut self, allocator: &BlockAllocator) -> RecoveryReport {
        self.mode = FaultMode::Recovering;
        warn!("entering recovery mode");

        let report = self.reconcile(allocator);

        self.mode = FaultMode::Normal;
        self.fault_count = 0;
        self.recoveries += 1;
        info!(
            "recovery complete, {} record(s) restored, returning to normal mode",
            report.restored.len()
        );

        report
    }

    /// Rewrite journal records for ids the live table does not hold.
    fn reconcile(&self, allocator: &BlockAllocator) -> RecoveryReport {
        let ids = match self.journal.list_records() {
            Ok(ids) => ids,
            Err(err) => {
                warn!("journal unreadable during recovery: {}", err);
                return RecoveryReport::default();
            }
        };

        let mut restored = Vec::new();
        for id in ids {
            if allocator.is_allocated(id) {
                continue;
            }
            match self.journal.restore_block(id) {
                Ok(true) => restored.push(id),
                Ok(false) => {}
                Err(err) => warn!("restore of block {} record failed: {}", id, err),
            }
        }

        RecoveryReport { restored }
    }
}
