// SPDX-License-Identifier: Apache-2.0
//! LIST and GREEDY construction of a [`Schedule`] from a firing DAG.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use spider_srt::{Firing, FiringDag};

use crate::cost::CostModel;
use crate::depth::critical_path_remaining;
use crate::error::SchedError;
use crate::mapping::pick_pe;
use crate::policy::MappingPolicy;

/// The final placement and timing of one firing.
#[derive(Debug, Clone)]
pub struct FiringRecord {
    firing: usize,
    pe: usize,
    start: u64,
    end: u64,
    output_fifo_bytes: Vec<u64>,
    dependencies: Vec<usize>,
}

impl FiringRecord {
    pub fn firing(&self) -> usize {
        self.firing
    }

    pub fn pe(&self) -> usize {
        self.pe
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Token count produced per output port this iteration, one entry per
    /// port, used to size the FIFO regions that back each edge.
    pub fn output_fifo_bytes(&self) -> &[u64] {
        &self.output_fifo_bytes
    }

    /// Firing indices this firing directly depends on.
    pub fn dependencies(&self) -> &[usize] {
        &self.dependencies
    }
}

/// A complete placement of every firing in a [`FiringDag`] onto PEs.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    records: Vec<FiringRecord>,
}

impl Schedule {
    /// Records indexed by firing index, in the same order as
    /// [`FiringDag::firings`].
    pub fn records(&self) -> &[FiringRecord] {
        &self.records
    }

    pub fn record(&self, firing: usize) -> Option<&FiringRecord> {
        self.records.get(firing)
    }

    /// The end time of the last-finishing firing, or 0 for an empty
    /// schedule.
    pub fn makespan(&self) -> u64 {
        self.records.iter().map(FiringRecord::end).max().unwrap_or(0)
    }
}

fn predecessors(dag: &FiringDag) -> Vec<Vec<usize>> {
    let mut preds = vec![Vec::new(); dag.firings().len()];
    for edge in dag.edges() {
        preds[edge.snk_firing()].push(edge.src_firing());
    }
    preds
}

fn successors(dag: &FiringDag) -> Vec<Vec<usize>> {
    let mut succs = vec![Vec::new(); dag.firings().len()];
    for edge in dag.edges() {
        succs[edge.src_firing()].push(edge.snk_firing());
    }
    succs
}

fn output_fifo_bytes(dag: &FiringDag, firing: &Firing) -> Vec<u64> {
    let mut bytes = vec![0u64; firing.output_count()];
    for edge in dag.edges() {
        if edge.src_firing() == firing.index() {
            if let Some(slot) = bytes.get_mut(edge.src_port()) {
                *slot += edge.rate() as u64;
            }
        }
    }
    bytes
}

/// The PEs a firing may legally run on. An empty `allowed_pes` is only
/// valid for a runtime-inserted firing (FORK/JOIN/REPEAT/TAIL/...), which
/// has no kernel to place and may run on any supplied PE.
fn candidate_pes(firing: &Firing, pe_ids: &[usize]) -> Result<Vec<usize>, SchedError> {
    if firing.allowed_pes().is_empty() {
        if firing.subtype().is_runtime_inserted() {
            return Ok(pe_ids.to_vec());
        }
        return Err(SchedError::EmptyAllowedPeSet { firing: firing.index() });
    }
    let candidates: Vec<usize> = firing.allowed_pes().iter().copied().filter(|pe| pe_ids.contains(pe)).collect();
    if candidates.is_empty() {
        return Err(SchedError::NoProcessingElements);
    }
    Ok(candidates)
}

#[allow(clippy::too_many_arguments)]
fn schedule_firing(
    dag: &FiringDag,
    firing: &Firing,
    pe_ids: &[usize],
    cost: &impl CostModel,
    mapping_policy: MappingPolicy,
    rr_counter: &mut usize,
    avail_after: &mut FxHashMap<usize, u64>,
    finished: &FxHashMap<usize, (usize, u64)>,
    preds: &[Vec<usize>],
) -> Result<FiringRecord, SchedError> {
    let candidates = candidate_pes(firing, pe_ids)?;

    let dep_ready_at = |pe: usize| -> u64 {
        preds[firing.index()]
            .iter()
            .map(|dep| {
                let &(dep_pe, dep_end) = &finished[dep];
                let comm = dag
                    .edges()
                    .iter()
                    .filter(|e| e.src_firing() == *dep && e.snk_firing() == firing.index())
                    .map(|e| cost.communication_cost(e, dep_pe, pe))
                    .sum::<u64>();
                dep_end + comm
            })
            .max()
            .unwrap_or(0)
    };
    let projected_end = |pe: usize| -> u64 {
        let start = avail_after.get(&pe).copied().unwrap_or(0).max(dep_ready_at(pe));
        start + cost.execution_time(firing, pe)
    };

    let pe = pick_pe(mapping_policy, &candidates, rr_counter, projected_end);
    let start = avail_after.get(&pe).copied().unwrap_or(0).max(dep_ready_at(pe));
    let end = start + cost.execution_time(firing, pe);
    avail_after.insert(pe, end);

    Ok(FiringRecord {
        firing: firing.index(),
        pe,
        start,
        end,
        output_fifo_bytes: output_fifo_bytes(dag, firing),
        dependencies: preds[firing.index()].clone(),
    })
}

/// Schedules every firing in topological order, breaking ties among
/// simultaneously ready firings by descending critical-path-remaining
/// (highest-level-first).
///
/// # Panics
/// Panics if `dag` contains a cycle, which would leave some firing's
/// indegree never reaching zero; `spider-srt` never produces such a DAG.
#[allow(clippy::expect_used)]
pub fn list_schedule(dag: &FiringDag, pe_ids: &[usize], cost: &impl CostModel, mapping_policy: MappingPolicy) -> Result<Schedule, SchedError> {
    if pe_ids.is_empty() {
        return Err(SchedError::NoProcessingElements);
    }
    let preds = predecessors(dag);
    let succs = successors(dag);
    let mut indegree: Vec<usize> = preds.iter().map(Vec::len).collect();
    let priority = critical_path_remaining(dag, &|i| cost.execution_time(&dag.firings()[i], pe_ids[0]));

    let mut ready: Vec<usize> = (0..dag.firings().len()).filter(|&i| indegree[i] == 0).collect();
    let mut avail_after = FxHashMap::default();
    let mut finished = FxHashMap::default();
    let mut rr_counter = 0usize;
    let mut records: Vec<Option<FiringRecord>> = vec![None; dag.firings().len()];

    while !ready.is_empty() {
        ready.sort_by(|&a, &b| priority[b].cmp(&priority[a]).then(a.cmp(&b)));
        let next = ready.remove(0);
        let firing = &dag.firings()[next];
        let record = schedule_firing(dag, firing, pe_ids, cost, mapping_policy, &mut rr_counter, &mut avail_after, &finished, &preds)?;
        finished.insert(next, (record.pe, record.end));
        records[next] = Some(record);
        for &succ in &succs[next] {
            indegree[succ] -= 1;
            if indegree[succ] == 0 {
                ready.push(succ);
            }
        }
    }

    Ok(Schedule {
        records: records.into_iter().map(|r| r.expect("DAG is acyclic, every firing reaches zero indegree")).collect(),
    })
}

/// Schedules firings in the order they become ready, with no lookahead
/// priority: first-ready, first-mapped.
///
/// # Panics
/// Panics if `dag` contains a cycle, which would leave some firing's
/// indegree never reaching zero; `spider-srt` never produces such a DAG.
#[allow(clippy::expect_used)]
pub fn greedy_schedule(dag: &FiringDag, pe_ids: &[usize], cost: &impl CostModel, mapping_policy: MappingPolicy) -> Result<Schedule, SchedError> {
    if pe_ids.is_empty() {
        return Err(SchedError::NoProcessingElements);
    }
    let preds = predecessors(dag);
    let succs = successors(dag);
    let mut indegree: Vec<usize> = preds.iter().map(Vec::len).collect();

    let mut ready: VecDeque<usize> = (0..dag.firings().len()).filter(|&i| indegree[i] == 0).collect();
    let mut avail_after = FxHashMap::default();
    let mut finished = FxHashMap::default();
    let mut rr_counter = 0usize;
    let mut records: Vec<Option<FiringRecord>> = vec![None; dag.firings().len()];

    while let Some(next) = ready.pop_front() {
        let firing = &dag.firings()[next];
        let record = schedule_firing(dag, firing, pe_ids, cost, mapping_policy, &mut rr_counter, &mut avail_after, &finished, &preds)?;
        finished.insert(next, (record.pe, record.end));
        records[next] = Some(record);
        for &succ in &succs[next] {
            indegree[succ] -= 1;
            if indegree[succ] == 0 {
                ready.push_back(succ);
            }
        }
    }

    Ok(Schedule {
        records: records.into_iter().map(|r| r.expect("DAG is acyclic, every firing reaches zero indegree")).collect(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    use super::*;
    use crate::cost::UniformCostModel;
    use spider_srt::{BoundaryContext, SrtConfig};

    fn pipeline_dag() -> FiringDag {
        let mut g = spider_model::Graph::new("g", 3, 2, 0, 0, 0, 0);
        let a = g.add_vertex("A", 0, 1);
        let b = g.add_vertex("B", 1, 1);
        let c = g.add_vertex("C", 1, 0);
        g.set_allowed_pes(a, vec![0]).unwrap();
        g.set_allowed_pes(b, vec![0]).unwrap();
        g.set_allowed_pes(c, vec![0]).unwrap();
        g.add_edge(a, 0, "1", b, 0, "1").unwrap();
        g.add_edge(b, 0, "1", c, 0, "1").unwrap();
        spider_srt::transform(&g, &vec![], &BoundaryContext::default(), &SrtConfig::default(), 0)
            .unwrap()
            .dag
    }

    #[test]
    fn rejects_empty_pe_set() {
        let dag = pipeline_dag();
        let cost = UniformCostModel { execution_time: 1, cost_per_token: 1 };
        let err = list_schedule(&dag, &[], &cost, MappingPolicy::BestFit).unwrap_err();
        assert_eq!(err, SchedError::NoProcessingElements);
    }

    #[test]
    fn single_pe_runs_everything_sequentially_in_dependency_order() {
        let dag = pipeline_dag();
        let cost = UniformCostModel { execution_time: 5, cost_per_token: 0 };
        let schedule = list_schedule(&dag, &[0], &cost, MappingPolicy::BestFit).unwrap();
        assert_eq!(schedule.makespan(), 15);
        for record in schedule.records() {
            assert_eq!(record.pe(), 0);
            for &dep in record.dependencies() {
                assert!(schedule.record(dep).unwrap().end() <= record.start());
            }
        }
    }

    #[test]
    fn two_pes_let_independent_firings_overlap() {
        let mut g = spider_model::Graph::new("g", 2, 0, 0, 0, 0, 0);
        let a = g.add_vertex("A", 0, 0);
        let b = g.add_vertex("B", 0, 0);
        g.set_allowed_pes(a, vec![0, 1]).unwrap();
        g.set_allowed_pes(b, vec![0, 1]).unwrap();
        let out = spider_srt::transform(&g, &vec![], &BoundaryContext::default(), &SrtConfig::default(), 0).unwrap();
        let cost = UniformCostModel { execution_time: 4, cost_per_token: 1 };
        let schedule = greedy_schedule(&out.dag, &[0, 1], &cost, MappingPolicy::RoundRobin).unwrap();
        assert_eq!(schedule.makespan(), 4);
        let pes: std::collections::HashSet<usize> = schedule.records().iter().map(|r| r.pe()).collect();
        assert_eq!(pes.len(), 2);
        let _ = (a, b);
    }

    #[test]
    fn output_fifo_bytes_match_edge_rate() {
        let dag = pipeline_dag();
        let cost = UniformCostModel { execution_time: 1, cost_per_token: 1 };
        let schedule = list_schedule(&dag, &[0], &cost, MappingPolicy::BestFit).unwrap();
        let a_record = schedule
            .records()
            .iter()
            .find(|r| dag.firing(r.firing()).unwrap().source_vertex() != usize::MAX && dag.firing(r.firing()).unwrap().input_count() == 0)
            .unwrap();
        assert_eq!(a_record.output_fifo_bytes(), &[1]);
    }
}
