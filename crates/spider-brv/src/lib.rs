// SPDX-License-Identifier: Apache-2.0
//! Repetition-vector (BRV) solver: assigns every non-interface vertex of a
//! PiSDF (sub)graph an integer firing count that balances every edge.

mod error;
mod rational;
mod solve;

pub use error::BrvError;
pub use rational::Rational;
pub use solve::solve;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    use super::*;
    use spider_model::Graph;

    #[test]
    fn simple_pipeline_balances() {
        let mut g = Graph::new("g", 2, 1, 0, 0, 0, 0);
        let a = g.add_vertex("A", 0, 1);
        let b = g.add_vertex("B", 1, 0);
        g.add_edge(a, 0, "2", b, 0, "1").unwrap();

        let brv = solve(&g).unwrap();
        assert_eq!(brv[&a], 1);
        assert_eq!(brv[&b], 2);
    }

    #[test]
    fn three_stage_pipeline_finds_minimal_solution() {
        let mut g = Graph::new("g", 3, 2, 0, 0, 0, 0);
        let a = g.add_vertex("A", 0, 1);
        let b = g.add_vertex("B", 1, 1);
        let c = g.add_vertex("C", 1, 0);
        g.add_edge(a, 0, "4", b, 0, "2").unwrap();
        g.add_edge(b, 0, "3", c, 0, "4").unwrap();

        let brv = solve(&g).unwrap();
        assert_eq!(brv[&a], 2);
        assert_eq!(brv[&b], 4);
        assert_eq!(brv[&c], 3);

        for edge in g.live_edges() {
            let values = g.resolved_values();
            let src_rate = edge.src_rate().evaluate(&values).unwrap() as i64;
            let snk_rate = edge.snk_rate().evaluate(&values).unwrap() as i64;
            assert_eq!(brv[&edge.src_vertex()] * src_rate, brv[&edge.snk_vertex()] * snk_rate);
        }
    }

    #[test]
    fn isolated_actor_defaults_to_one() {
        let mut g = Graph::new("g", 1, 0, 0, 0, 0, 0);
        let a = g.add_vertex("A", 0, 0);
        let brv = solve(&g).unwrap();
        assert_eq!(brv[&a], 1);
    }

    #[test]
    fn config_actor_is_pinned_at_one() {
        let mut g = Graph::new("g", 2, 1, 0, 0, 0, 1);
        let cfg = g.add_config_actor("cfg", 0, 1);
        let worker = g.add_vertex("worker", 1, 0);
        g.add_edge(cfg, 0, "3", worker, 0, "1").unwrap();

        let brv = solve(&g).unwrap();
        assert_eq!(brv[&cfg], 1);
        assert_eq!(brv[&worker], 3);
    }

    #[test]
    fn inconsistent_component_is_reported() {
        let mut g = Graph::new("g", 2, 1, 0, 0, 0, 1);
        let cfg1 = g.add_config_actor("cfg1", 0, 1);
        let cfg2 = g.add_config_actor("cfg2", 1, 0);
        // Both config actors are pinned to r=1, but the edge's rates force
        // a 2:1 ratio between them, which is unsatisfiable.
        g.add_edge(cfg1, 0, "2", cfg2, 0, "1").unwrap();

        let err = solve(&g).unwrap_err();
        assert!(matches!(err, BrvError::Inconsistent { .. }));
    }

    #[test]
    fn negative_rate_is_rejected() {
        let mut g = Graph::new("g", 2, 1, 0, 0, 0, 0);
        let a = g.add_vertex("A", 0, 1);
        let b = g.add_vertex("B", 1, 0);
        g.add_edge(a, 0, "-1", b, 0, "1").unwrap();

        let err = solve(&g).unwrap_err();
        assert!(matches!(err, BrvError::NegativeRate { .. }));
    }
}
