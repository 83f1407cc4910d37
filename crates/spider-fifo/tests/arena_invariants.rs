// SPDX-License-Identifier: Apache-2.0
#![allow(clippy::unwrap_used)]
use proptest::prelude::*;
use spider_fifo::FifoArena;

proptest! {
    #[test]
    fn sequential_regions_never_overlap(lens in prop::collection::vec(1usize..256, 0..32)) {
        let mut arena = FifoArena::new(1 << 20, 8);
        let mut prev_end = 0usize;
        for len in lens {
            let region = arena.alloc(len).unwrap();
            prop_assert!(region.offset() >= prev_end);
            prop_assert_eq!(region.offset() % 8, 0);
            prev_end = region.end();
        }
        prop_assert_eq!(arena.used(), prev_end);
    }

    #[test]
    fn reset_always_returns_capacity_to_zero_used(lens in prop::collection::vec(1usize..64, 0..16)) {
        let mut arena = FifoArena::new(4096, 4);
        for len in &lens {
            let _ = arena.alloc(*len);
        }
        arena.reset();
        prop_assert_eq!(arena.used(), 0);
    }
}
