//! Fault escalation and recovery behavior through the pool facade

use blockpool_rs::{FaultMode, MemoryJournal, MemoryPool, PersistenceLog, PoolError};
use std::sync::Arc;

fn pool_with_journal(total_blocks: u64) -> (MemoryPool, Arc<MemoryJournal>) {
    let journal = Arc::new(MemoryJournal::new());
    let pool = MemoryPool::builder()
        .total_size(total_blocks)
        .block_size(1)
        .journal(journal.clone())
        .build()
        .unwrap();
    (pool, journal)
}

#[test]
fn test_two_faults_stay_normal() {
    let (pool, _journal) = pool_with_journal(10);

    assert!(pool.write(50, b"x").is_err());
    assert!(pool.read(50, 1).is_err());

    let snapshot = pool.fault_snapshot();
    assert_eq!(snapshot.mode, FaultMode::Normal);
    assert_eq!(snapshot.fault_count, 2);
    assert_eq!(snapshot.recoveries, 0);
}

#[test]
fn test_third_fault_recovers_within_the_call() {
    let (pool, _journal) = pool_with_journal(10);

    for _ in 0..3 {
        assert!(pool.write(50, b"x").is_err());
    }

    let snapshot = pool.fault_snapshot();
    assert_eq!(snapshot.mode, FaultMode::Normal);
    assert_eq!(snapshot.fault_count, 0);
    assert_eq!(snapshot.recoveries, 1);
}

#[test]
fn test_counting_restarts_after_recovery() {
    let (pool, _journal) = pool_with_journal(10);

    for _ in 0..3 {
        let _ = pool.write(50, b"x");
    }
    assert_eq!(pool.fault_snapshot().fault_count, 0);

    let _ = pool.write(50, b"x");
    let snapshot = pool.fault_snapshot();
    assert_eq!(snapshot.fault_count, 1);
    assert_eq!(snapshot.recoveries, 1);
}

#[test]
fn test_mixed_fault_kinds_all_count() {
    let (pool, _journal) = pool_with_journal(4);

    pool.allocate("p1", 4).unwrap();

    // OutOfMemory, InvalidAmount, InvalidAddress -> three faults
    assert!(matches!(
        pool.allocate("p2", 1),
        Err(PoolError::OutOfMemory(_))
    ));
    assert!(matches!(
        pool.allocate("p2", 0),
        Err(PoolError::InvalidAmount(0))
    ));
    assert!(matches!(
        pool.write(9, b"x"),
        Err(PoolError::InvalidAddress(9))
    ));

    assert_eq!(pool.fault_snapshot().recoveries, 1);
}

#[test]
fn test_successful_operations_do_not_count() {
    let (pool, _journal) = pool_with_journal(10);

    let _ = pool.write(50, b"x");
    pool.allocate("p1", 2).unwrap();
    pool.deallocate("p1").unwrap();
    let _ = pool.status();

    assert_eq!(pool.fault_snapshot().fault_count, 1);
}

#[test]
fn test_manual_recovery_restores_ghost_record() {
    let (pool, journal) = pool_with_journal(10);

    pool.allocate("p1", 2).unwrap();
    // A record the table knows nothing about
    journal.record_block(8, "ghost").unwrap();

    let report = pool.recover();
    assert_eq!(report.restored, vec![8]);

    // The journal keeps the record; the live table is untouched
    assert_eq!(journal.record(8).unwrap().owner, "ghost");
    assert!(!pool.block(8).unwrap().is_allocated());
    assert_eq!(pool.status().occupied_blocks, 2);
}

#[test]
fn test_escalated_recovery_also_reconciles() {
    let (pool, journal) = pool_with_journal(10);

    journal.record_block(9, "ghost").unwrap();

    for _ in 0..3 {
        let _ = pool.write(50, b"x");
    }

    // Recovery ran on the third fault and swept the ghost record
    assert_eq!(pool.fault_snapshot().recoveries, 1);
    assert!(journal.record(9).is_some());
    assert!(!pool.block(9).unwrap().is_allocated());
}

#[test]
fn test_recovery_ignores_records_matching_the_table() {
    let (pool, _journal) = pool_with_journal(10);

    pool.allocate("p1", 3).unwrap();

    let report = pool.recover();
    assert!(report.restored.is_empty());
    assert_eq!(pool.status().occupied_blocks, 3);
}

#[test]
fn test_deallocate_missing_owner_is_not_a_fault() {
    let (pool, _journal) = pool_with_journal(10);

    assert_eq!(pool.deallocate("nobody").unwrap(), 0);
    assert_eq!(pool.fault_snapshot().fault_count, 0);
}

#[test]
fn test_custom_threshold() {
    let journal = Arc::new(MemoryJournal::new());
    let pool = MemoryPool::builder()
        .total_size(10)
        .block_size(1)
        .escalation_threshold(5)
        .journal(journal)
        .build()
        .unwrap();

    for _ in 0..4 {
        let _ = pool.write(50, b"x");
    }
    assert_eq!(pool.fault_snapshot().fault_count, 4);
    assert_eq!(pool.fault_snapshot().recoveries, 0);

    let _ = pool.write(50, b"x");
    assert_eq!(pool.fault_snapshot().fault_count, 0);
    assert_eq!(pool.fault_snapshot().recoveries, 1);
}
