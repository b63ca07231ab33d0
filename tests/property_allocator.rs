//! Property-based tests for pool allocation invariants
//!
//! Uses proptest to verify allocator invariants hold across many random
//! operation sequences.

use blockpool_rs::{MemoryPool, PoolError};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

const POOL_BLOCKS: u64 = 256;

fn pool() -> MemoryPool {
    MemoryPool::builder()
        .total_size(POOL_BLOCKS)
        .block_size(1)
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn prop_no_double_allocation(sizes in prop::collection::vec(1u64..40, 1..30)) {
        let pool = pool();
        let mut seen = HashSet::new();

        for (i, size) in sizes.iter().enumerate() {
            match pool.allocate(&format!("p{}", i), *size) {
                Ok(ids) => {
                    for id in ids {
                        prop_assert!(seen.insert(id), "block {} allocated twice", id);
                    }
                }
                Err(PoolError::OutOfMemory(_)) => break,
                Err(err) => prop_assert!(false, "unexpected error: {}", err),
            }
        }
    }

    #[test]
    fn prop_each_allocation_is_one_contiguous_run(sizes in prop::collection::vec(1u64..40, 1..30)) {
        let pool = pool();

        for (i, size) in sizes.iter().enumerate() {
            let Ok(ids) = pool.allocate(&format!("p{}", i), *size) else {
                break;
            };

            prop_assert_eq!(ids.len() as u64, *size);
            for pair in ids.windows(2) {
                prop_assert_eq!(pair[1], pair[0] + 1, "run not contiguous");
            }
        }
    }

    #[test]
    fn prop_status_is_conserved(
        sizes in prop::collection::vec(1u64..40, 1..20),
        free_every in 2usize..5
    ) {
        let pool = pool();

        for (i, size) in sizes.iter().enumerate() {
            let _ = pool.allocate(&format!("p{}", i), *size);
            if i % free_every == 0 {
                let _ = pool.deallocate(&format!("p{}", i));
            }

            let status = pool.status();
            prop_assert_eq!(status.total_blocks as u64, POOL_BLOCKS);
            prop_assert_eq!(
                status.free_blocks + status.occupied_blocks,
                status.total_blocks
            );
        }
    }

    #[test]
    fn prop_deallocate_returns_exactly_what_was_allocated(
        sizes in prop::collection::vec(1u64..40, 1..10)
    ) {
        let pool = pool();
        let mut held: HashMap<String, usize> = HashMap::new();

        for (i, size) in sizes.iter().enumerate() {
            let owner = format!("p{}", i);
            if let Ok(ids) = pool.allocate(&owner, *size) {
                held.insert(owner, ids.len());
            }
        }

        for (owner, count) in held {
            prop_assert_eq!(pool.deallocate(&owner).unwrap(), count);
            prop_assert_eq!(pool.deallocate(&owner).unwrap(), 0);
        }

        prop_assert_eq!(pool.status().free_blocks as u64, POOL_BLOCKS);
    }

    #[test]
    fn prop_write_read_round_trip(data in prop::collection::vec(any::<u8>(), 1..64)) {
        let pool = MemoryPool::builder()
            .total_size(16 * 64)
            .block_size(64)
            .build()
            .unwrap();

        let ids = pool.allocate("p1", 64).unwrap();
        pool.write(ids[0], &data).unwrap();

        prop_assert_eq!(pool.read(ids[0], 1).unwrap(), data);
    }
}
