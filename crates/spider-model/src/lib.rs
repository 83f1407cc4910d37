// SPDX-License-Identifier: Apache-2.0
//! The PiSDF graph model: vertices, edges, delays, parameters, and the
//! two construction-time rewrite passes (broadcast balancing and
//! dynamic-subgraph splitting) that run before the repetition-vector
//! solver sees the graph.

mod edge;
mod error;
mod graph;
mod param;
mod rewrite;
mod split;
mod subtype;
mod vertex;

pub use edge::{Delay, Edge};
pub use error::ModelError;
pub use graph::Graph;
pub use param::{ParamKind, Parameter};
pub use rewrite::apply_broadcast_rewrite;
pub use split::split_dynamic_subgraph;
pub use subtype::VertexSubtype;
pub use vertex::Vertex;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn construction_rejects_bad_port_index() {
        let mut g = Graph::new("g", 1, 1, 0, 0, 0, 0);
        let a = g.add_vertex("a", 1, 1);
        let b = g.add_vertex("b", 1, 1);
        let err = g.add_edge(a, 5, "1", b, 0, "1").unwrap_err();
        assert!(matches!(err, ModelError::PortIndexOutOfRange { .. }));
    }

    #[test]
    fn construction_rejects_duplicate_kernel_binding() {
        let mut g = Graph::new("g", 1, 0, 0, 0, 0, 0);
        let a = g.add_vertex("a", 0, 0);
        g.bind_kernel(a, 1).unwrap();
        let err = g.bind_kernel(a, 2).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateRuntimeKernel { .. }));
    }

    #[test]
    fn tombstoned_vertex_is_not_visible() {
        let mut g = Graph::new("g", 1, 0, 0, 0, 0, 0);
        let a = g.add_vertex("a", 0, 0);
        g.remove_vertex(a).unwrap();
        assert!(g.vertex(a).is_none());
        assert_eq!(g.vertices().count(), 0);
    }

    #[test]
    fn removing_vertex_twice_errors() {
        let mut g = Graph::new("g", 1, 0, 0, 0, 0, 0);
        let a = g.add_vertex("a", 0, 0);
        g.remove_vertex(a).unwrap();
        assert!(g.remove_vertex(a).is_err());
    }

    #[test]
    fn graph_with_config_actor_is_dynamic() {
        let mut g = Graph::new("g", 1, 0, 0, 0, 0, 1);
        g.add_config_actor("c", 0, 1);
        assert!(g.is_dynamic());
    }

    #[test]
    fn graph_without_config_actor_is_not_dynamic() {
        let mut g = Graph::new("g", 1, 0, 0, 0, 0, 0);
        g.add_vertex("a", 0, 0);
        assert!(!g.is_dynamic());
    }

    #[test]
    fn static_expr_param_evaluates_against_earlier_params() {
        let mut g = Graph::new("g", 0, 0, 2, 0, 0, 0);
        g.add_static_param("N", 4);
        let m = g.add_static_expr_param("M", "N * 2").unwrap();
        assert_eq!(g.param(m).unwrap().resolved(), Some(8));
    }

    #[test]
    fn dynamic_param_reevaluates_dependants() {
        let mut g = Graph::new("g", 0, 0, 2, 0, 0, 0);
        let n = g.add_dynamic_param("N");
        let m = g.add_dynamic_dependant_param("M", "N * 3").unwrap();
        g.set_dynamic_param(n, 5).unwrap();
        assert_eq!(g.param(m).unwrap().resolved(), Some(15));
    }

    #[test]
    fn splitting_mixed_subgraph_separates_config_from_run() {
        let mut inner = Graph::new("inner", 3, 2, 1, 1, 0, 1);
        let config = inner.add_config_actor("cfg", 0, 1);
        let n = inner.add_dynamic_param("N");
        inner.add_vertex("worker", 1, 0);
        let worker = inner.vertices().find(|v| v.name() == "worker").unwrap().index();
        inner.add_edge(config, 0, "1", worker, 0, "1").unwrap();
        let _ = n;

        let mut outer = Graph::new("outer", 1, 0, 0, 0, 0, 0);
        let graph_vertex = outer.add_subgraph("inner", 0, 0, inner);

        split_dynamic_subgraph(&mut outer, graph_vertex).unwrap();

        let sub_index = outer.vertex(graph_vertex).unwrap().subgraph().unwrap();
        let init_half = &outer.subgraphs()[sub_index];
        assert!(init_half.vertex(config).is_some());
        assert!(init_half.vertex(worker).is_none());
        assert!(init_half.vertices().any(|v| v.subtype() == VertexSubtype::Graph));
    }

    #[test]
    fn splitting_is_a_noop_without_mixed_actors() {
        let mut inner = Graph::new("inner", 1, 0, 0, 0, 0, 1);
        inner.add_config_actor("cfg", 0, 1);

        let mut outer = Graph::new("outer", 1, 0, 0, 0, 0, 0);
        let graph_vertex = outer.add_subgraph("inner", 0, 0, inner);

        split_dynamic_subgraph(&mut outer, graph_vertex).unwrap();

        let sub_index = outer.vertex(graph_vertex).unwrap().subgraph().unwrap();
        assert_eq!(outer.subgraphs()[sub_index].vertices().count(), 1);
    }

    #[test]
    fn output_param_requires_a_config_actor() {
        let mut g = Graph::new("g", 1, 0, 1, 0, 0, 0);
        let a = g.add_vertex("a", 0, 1);
        let w = g.add_dynamic_param("W");
        let err = g.add_output_param_to_vertex(a, w).unwrap_err();
        assert!(matches!(err, ModelError::OutputParamOnNonConfigActor { vertex } if vertex == a));
    }

    #[test]
    fn config_actor_output_params_accumulate_in_call_order() {
        let mut g = Graph::new("g", 0, 0, 2, 0, 0, 1);
        let c = g.add_config_actor("c", 0, 2);
        let w = g.add_dynamic_param("W");
        let h = g.add_dynamic_param("H");
        g.add_output_param_to_vertex(c, w).unwrap();
        g.add_output_param_to_vertex(c, h).unwrap();
        assert_eq!(g.vertex(c).unwrap().output_params(), &[w, h]);
    }

    #[test]
    fn local_persistent_delay_records_its_level_count() {
        let mut g = Graph::new("g", 2, 1, 0, 0, 0, 0);
        let a = g.add_vertex("a", 0, 1);
        let b = g.add_vertex("b", 1, 0);
        let e = g.add_edge(a, 0, "1", b, 0, "1").unwrap();
        g.add_local_persistent_delay(e, 2, 3).unwrap();
        let delay = g.edge(e).unwrap().delay().unwrap();
        assert!(delay.is_persistent());
        assert_eq!(delay.level_count(), 3);
    }
}
