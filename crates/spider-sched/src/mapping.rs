// SPDX-License-Identifier: Apache-2.0
//! PE selection among a firing's candidate processing elements.

use crate::policy::MappingPolicy;

/// Picks one PE out of `candidates` (non-empty) according to `policy`.
///
/// `projected_end(pe)` must return the end time the firing would finish at
/// if mapped onto `pe`; `BestFit` calls it once per candidate and keeps the
/// minimum. `round_robin_counter` is read-modify-written only by
/// `RoundRobin` and should persist across calls for a stable rotation.
pub fn pick_pe(
    policy: MappingPolicy,
    candidates: &[usize],
    round_robin_counter: &mut usize,
    mut projected_end: impl FnMut(usize) -> u64,
) -> usize {
    debug_assert!(!candidates.is_empty());
    match policy {
        MappingPolicy::BestFit => {
            let mut best = candidates[0];
            let mut best_end = projected_end(best);
            for &pe in &candidates[1..] {
                let end = projected_end(pe);
                if end < best_end {
                    best = pe;
                    best_end = end;
                }
            }
            best
        }
        MappingPolicy::RoundRobin => {
            let pe = candidates[*round_robin_counter % candidates.len()];
            *round_robin_counter += 1;
            pe
        }
    }
}
