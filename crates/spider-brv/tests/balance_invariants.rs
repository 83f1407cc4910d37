// SPDX-License-Identifier: Apache-2.0
#![allow(clippy::unwrap_used)]
use proptest::prelude::*;
use spider_brv::solve;
use spider_model::Graph;

proptest! {
    #[test]
    fn linear_chain_balances_every_edge(rates in prop::collection::vec(1i64..32, 2..8)) {
        let stage_count = rates.len() + 1;
        let mut g = Graph::new("g", stage_count, rates.len(), 0, 0, 0, 0);
        let mut vertices = Vec::with_capacity(stage_count);
        vertices.push(g.add_vertex("v0", 0, 1));
        for i in 1..rates.len() {
            vertices.push(g.add_vertex(format!("v{i}"), 1, 1));
        }
        vertices.push(g.add_vertex(format!("v{}", rates.len()), 1, 0));

        for (i, rate) in rates.iter().enumerate() {
            g.add_edge(vertices[i], 0, "1", vertices[i + 1], 0, &rate.to_string()).unwrap();
        }

        let brv = solve(&g).unwrap();
        let values = g.resolved_values();
        for edge in g.live_edges() {
            let src_rate = edge.src_rate().evaluate(&values).unwrap() as i64;
            let snk_rate = edge.snk_rate().evaluate(&values).unwrap() as i64;
            prop_assert_eq!(brv[&edge.src_vertex()] * src_rate, brv[&edge.snk_vertex()] * snk_rate);
        }
    }
}
