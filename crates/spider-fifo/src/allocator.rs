// SPDX-License-Identifier: Apache-2.0
//! Walks a firing DAG's edges and reserves a [`FifoRegion`] for each one.

use spider_sched::Schedule;
use spider_srt::{DagEdge, FifoAllocatorKind, FiringDag};
use tracing::instrument;

use crate::arena::FifoArena;
use crate::error::FifoError;
use crate::region::FifoRegion;

/// Per-edge FIFO regions for one firing-DAG generation. Indexed by
/// [`DagEdge::index`]; `None` marks a zero-rate edge, which the scheduler
/// routes as a `void` firing pair and which never touches memory (§8).
#[derive(Debug, Clone, Default)]
pub struct FifoTable {
    regions: Vec<Option<FifoRegion>>,
}

impl FifoTable {
    pub fn region(&self, edge: usize) -> Option<FifoRegion> {
        self.regions.get(edge).copied().flatten()
    }

    pub fn regions(&self) -> &[Option<FifoRegion>] {
        &self.regions
    }
}

/// Reserves a region for every non-zero-rate edge of `dag` in `arena`,
/// sizing each region as `edge.rate() * token_bytes(edge)`.
///
/// `Default-no-sync` additionally requires the edge's source and sink
/// firings to be mapped to the same PE by `schedule` — cross-PE coherence
/// beyond that is a platform concern this crate does not model.
#[instrument(skip(dag, schedule, token_bytes, arena))]
pub fn allocate(
    dag: &FiringDag,
    schedule: &Schedule,
    token_bytes: impl Fn(&DagEdge) -> usize,
    kind: FifoAllocatorKind,
    arena: &mut FifoArena,
) -> Result<FifoTable, FifoError> {
    let mut regions = vec![None; dag.edges().len()];
    for edge in dag.edges() {
        if edge.rate() == 0 {
            continue;
        }
        if kind == FifoAllocatorKind::DefaultNoSync {
            let src_pe = schedule.record(edge.src_firing()).map(|r| r.pe());
            let snk_pe = schedule.record(edge.snk_firing()).map(|r| r.pe());
            if src_pe != snk_pe {
                return Err(FifoError::UnsynchronizedCrossPe { edge: edge.index() });
            }
        }
        let len = edge.rate() as usize * token_bytes(edge);
        regions[edge.index()] = Some(arena.alloc(len)?);
    }
    Ok(FifoTable { regions })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    use super::*;
    use spider_sched::{list_schedule, MappingPolicy, UniformCostModel};
    use spider_srt::{BoundaryContext, SrtConfig};

    /// A two-actor pipeline scheduled with `RoundRobin` mapping, which
    /// deterministically lands the producer and consumer on different PEs:
    /// the producer is the only ready firing and claims PE 0, then the
    /// consumer becomes ready and the rotation has advanced to PE 1.
    fn cross_pe_pipeline() -> (FiringDag, Schedule) {
        let mut g = spider_model::Graph::new("g", 2, 1, 0, 0, 0, 0);
        let a = g.add_vertex("A", 0, 1);
        let b = g.add_vertex("B", 1, 0);
        g.set_allowed_pes(a, vec![0, 1]).unwrap();
        g.set_allowed_pes(b, vec![0, 1]).unwrap();
        g.add_edge(a, 0, "4", b, 0, "4").unwrap();
        let out = spider_srt::transform(&g, &vec![], &BoundaryContext::default(), &SrtConfig::default(), 0).unwrap();
        let cost = UniformCostModel { execution_time: 1, cost_per_token: 1 };
        let schedule = list_schedule(&out.dag, &[0, 1], &cost, MappingPolicy::RoundRobin).unwrap();
        (out.dag, schedule)
    }

    #[test]
    fn default_allocator_ignores_pe_placement() {
        let (dag, schedule) = cross_pe_pipeline();
        let mut arena = FifoArena::new(4096, 1);
        let table = allocate(&dag, &schedule, |_| 1, FifoAllocatorKind::Default, &mut arena).unwrap();
        let edge = dag.edges().first().unwrap();
        let region = table.region(edge.index()).unwrap();
        assert_eq!(region.len(), 4);
    }

    #[test]
    fn no_sync_allocator_rejects_cross_pe_edge() {
        let (dag, schedule) = cross_pe_pipeline();
        let edge = dag.edges().first().unwrap();
        assert_ne!(schedule.record(edge.src_firing()).unwrap().pe(), schedule.record(edge.snk_firing()).unwrap().pe());
        let mut arena = FifoArena::new(4096, 1);
        let err = allocate(&dag, &schedule, |_| 1, FifoAllocatorKind::DefaultNoSync, &mut arena).unwrap_err();
        assert_eq!(err, FifoError::UnsynchronizedCrossPe { edge: edge.index() });
    }

    #[test]
    fn zero_rate_edge_reserves_no_region() {
        let mut g = spider_model::Graph::new("g", 2, 1, 0, 0, 0, 0);
        let a = g.add_vertex("A", 0, 1);
        let b = g.add_vertex("B", 1, 0);
        g.set_allowed_pes(a, vec![0]).unwrap();
        g.set_allowed_pes(b, vec![0]).unwrap();
        g.add_edge(a, 0, "0", b, 0, "0").unwrap();
        let out = spider_srt::transform(&g, &vec![], &BoundaryContext::default(), &SrtConfig::default(), 0).unwrap();
        let cost = UniformCostModel { execution_time: 1, cost_per_token: 1 };
        let schedule = list_schedule(&out.dag, &[0], &cost, MappingPolicy::BestFit).unwrap();
        let mut arena = FifoArena::new(4096, 1);
        let table = allocate(&out.dag, &schedule, |_| 1, FifoAllocatorKind::Default, &mut arena).unwrap();
        for edge in out.dag.edges() {
            assert!(table.region(edge.index()).is_none());
        }
    }
}
