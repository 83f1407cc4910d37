// SPDX-License-Identifier: Apache-2.0
//! A platform-agnostic view of execution and communication cost.
//!
//! The scheduler and mapper never reach into `spider-platform` directly;
//! they ask a [`CostModel`] implementation for the numbers they need,
//! addressing processing elements by the raw `usize` ids that
//! [`spider_srt::Firing::allowed_pes`] already carries.

use spider_srt::{DagEdge, Firing};

/// Supplies execution and communication costs to the scheduler.
///
/// Implementors typically wrap a platform description (PE clock rates,
/// interconnect bandwidth) that lives outside this crate.
pub trait CostModel {
    /// Time to execute `firing` on `pe`, in the same time unit the
    /// scheduler reports start/end times in.
    fn execution_time(&self, firing: &Firing, pe: usize) -> u64;

    /// Time to move `edge`'s tokens from its producing PE to `snk_pe`, given
    /// that the edge's source firing ran on `src_pe`. Zero when
    /// `src_pe == snk_pe`, since same-PE transfers need no communication.
    fn communication_cost(&self, edge: &DagEdge, src_pe: usize, snk_pe: usize) -> u64;
}

/// A [`CostModel`] for tests and examples: fixed per-firing execution time,
/// fixed per-token communication cost, free on-PE transfers.
#[derive(Debug, Clone, Copy)]
pub struct UniformCostModel {
    pub execution_time: u64,
    pub cost_per_token: u64,
}

impl CostModel for UniformCostModel {
    fn execution_time(&self, _firing: &Firing, _pe: usize) -> u64 {
        self.execution_time
    }

    fn communication_cost(&self, edge: &DagEdge, src_pe: usize, snk_pe: usize) -> u64 {
        if src_pe == snk_pe {
            0
        } else {
            edge.rate() as u64 * self.cost_per_token
        }
    }
}
