// SPDX-License-Identifier: Apache-2.0
#![allow(clippy::unwrap_used)]
use proptest::prelude::*;
use spider_model::Graph;
use spider_srt::{transform, BoundaryContext, SrtConfig};

proptest! {
    #[test]
    fn two_stage_pipeline_conserves_total_tokens(src_rate in 1i64..16, snk_rate in 1i64..16) {
        let mut g = Graph::new("g", 2, 1, 0, 0, 0, 0);
        let a = g.add_vertex("A", 0, 1);
        let b = g.add_vertex("B", 1, 0);
        g.add_edge(a, 0, &src_rate.to_string(), b, 0, &snk_rate.to_string()).unwrap();

        let out = transform(&g, &vec![], &BoundaryContext::default(), &SrtConfig::default(), 0).unwrap();

        let a_instances: std::collections::HashSet<usize> = out.dag.firings().iter()
            .filter(|f| f.source_vertex() == a)
            .map(|f| f.index())
            .collect();
        let b_instances: std::collections::HashSet<usize> = out.dag.firings().iter()
            .filter(|f| f.source_vertex() == b)
            .map(|f| f.index())
            .collect();

        let produced: i64 = out.dag.edges().iter()
            .filter(|e| a_instances.contains(&e.src_firing()))
            .map(|e| e.rate())
            .sum();
        let consumed: i64 = out.dag.edges().iter()
            .filter(|e| b_instances.contains(&e.snk_firing()))
            .map(|e| e.rate())
            .sum();

        let a_count = a_instances.len() as i64;
        let b_count = b_instances.len() as i64;
        prop_assert_eq!(produced, src_rate * a_count);
        prop_assert_eq!(consumed, snk_rate * b_count);
        prop_assert_eq!(produced, consumed);
    }
}
