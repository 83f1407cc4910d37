// SPDX-License-Identifier: Apache-2.0
//! Topological-depth and critical-path-remaining heuristics used by the
//! LIST scheduling policy.

use spider_srt::FiringDag;

/// For every firing, the length (in edges) of the longest path reaching it
/// from a source firing, computed via Kahn's algorithm.
pub fn topological_depths(dag: &FiringDag) -> Vec<usize> {
    let n = dag.firings().len();
    let mut indegree = vec![0usize; n];
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for edge in dag.edges() {
        adj[edge.src_firing()].push(edge.snk_firing());
        indegree[edge.snk_firing()] += 1;
    }

    let mut depth = vec![0usize; n];
    let mut queue: std::collections::VecDeque<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut remaining = indegree.clone();

    while let Some(u) = queue.pop_front() {
        for &v in &adj[u] {
            depth[v] = depth[v].max(depth[u] + 1);
            remaining[v] -= 1;
            if remaining[v] == 0 {
                queue.push_back(v);
            }
        }
    }
    depth
}

/// For every firing, the sum of execution times along the longest path from
/// it to a sink firing (inclusive of its own execution time).
pub fn critical_path_remaining(dag: &FiringDag, exec_time: &impl Fn(usize) -> u64) -> Vec<u64> {
    let n = dag.firings().len();
    let mut outdegree = vec![0usize; n];
    let mut rev_adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for edge in dag.edges() {
        outdegree[edge.src_firing()] += 1;
        rev_adj[edge.snk_firing()].push(edge.src_firing());
    }

    let mut remaining = vec![0u64; n];
    let mut queue: std::collections::VecDeque<usize> = (0..n).filter(|&i| outdegree[i] == 0).collect();
    let mut pending_outdegree = outdegree.clone();
    for &i in &queue {
        remaining[i] = exec_time(i);
    }

    while let Some(v) = queue.pop_front() {
        for &u in &rev_adj[v] {
            remaining[u] = remaining[u].max(exec_time(u) + remaining[v]);
            pending_outdegree[u] -= 1;
            if pending_outdegree[u] == 0 {
                queue.push_back(u);
            }
        }
    }
    remaining
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    use super::*;
    use spider_model::VertexSubtype;
    use spider_srt::FiringDag;

    fn chain_dag(len: usize) -> FiringDag {
        // Build via the public transform API is overkill here; spider-srt
        // doesn't expose raw firing/edge constructors outside the crate, so
        // these tests exercise depth/critical-path math against a DAG built
        // through a trivial pipeline transform instead.
        let _ = len;
        FiringDag::new()
    }

    #[test]
    fn empty_dag_has_no_depths() {
        let dag = chain_dag(0);
        assert!(topological_depths(&dag).is_empty());
        assert!(critical_path_remaining(&dag, &|_| 1).is_empty());
    }

    #[test]
    fn linear_pipeline_depth_increases_by_one() {
        let mut g = spider_model::Graph::new("g", 3, 2, 0, 0, 0, 0);
        let a = g.add_vertex("A", 0, 1);
        let b = g.add_vertex("B", 1, 1);
        let c = g.add_vertex("C", 1, 0);
        g.add_edge(a, 0, "1", b, 0, "1").unwrap();
        g.add_edge(b, 0, "1", c, 0, "1").unwrap();
        let out = spider_srt::transform(
            &g,
            &vec![],
            &spider_srt::BoundaryContext::default(),
            &spider_srt::SrtConfig::default(),
            0,
        )
        .unwrap();

        let depths = topological_depths(&out.dag);
        let a_idx = out.dag.firings().iter().position(|f| f.source_vertex() == a && f.subtype() == VertexSubtype::Normal).unwrap();
        let b_idx = out.dag.firings().iter().position(|f| f.source_vertex() == b).unwrap();
        let c_idx = out.dag.firings().iter().position(|f| f.source_vertex() == c).unwrap();
        assert_eq!(depths[a_idx], 0);
        assert_eq!(depths[b_idx], 1);
        assert_eq!(depths[c_idx], 2);

        let remaining = critical_path_remaining(&out.dag, &|_| 1);
        assert_eq!(remaining[c_idx], 1);
        assert_eq!(remaining[b_idx], 2);
        assert_eq!(remaining[a_idx], 3);
    }
}
