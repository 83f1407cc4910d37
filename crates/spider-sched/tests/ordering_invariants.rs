// SPDX-License-Identifier: Apache-2.0
#![allow(clippy::unwrap_used)]
use proptest::prelude::*;
use spider_model::Graph;
use spider_sched::{list_schedule, MappingPolicy, UniformCostModel};
use spider_srt::{transform, BoundaryContext, SrtConfig};

proptest! {
    #[test]
    fn a_firing_never_starts_before_its_dependencies_finish(stage_count in 2usize..10) {
        let mut g = Graph::new("g", stage_count, stage_count - 1, 0, 0, 0, 0);
        let mut vertices = Vec::with_capacity(stage_count);
        vertices.push(g.add_vertex("v0", 0, 1));
        for i in 1..stage_count - 1 {
            vertices.push(g.add_vertex(format!("v{i}"), 1, 1));
        }
        vertices.push(g.add_vertex(format!("v{}", stage_count - 1), 1, 0));
        for i in 0..stage_count - 1 {
            g.add_edge(vertices[i], 0, "1", vertices[i + 1], 0, "1").unwrap();
        }

        let out = transform(&g, &vec![], &BoundaryContext::default(), &SrtConfig::default(), 0).unwrap();
        let cost = UniformCostModel { execution_time: 1, cost_per_token: 1 };
        let schedule = list_schedule(&out.dag, &[0, 1], &cost, MappingPolicy::RoundRobin).unwrap();

        for record in schedule.records() {
            for &dep in record.dependencies() {
                let dep_record = schedule.record(dep).unwrap();
                prop_assert!(dep_record.end() <= record.start());
            }
        }
    }
}
