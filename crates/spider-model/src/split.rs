// SPDX-License-Identifier: Apache-2.0
//! Dynamic-subgraph splitting: separating configuration from execution.
//!
//! A subgraph that mixes configuration actors with ordinary actors cannot
//! have its repetition vector computed until the configuration actors have
//! fired, because downstream rates may depend on the parameters they
//! produce. This pass rewrites such a subgraph into an outer "init" half
//! holding the configuration actors and an inner "run" subgraph holding
//! everything else, so the coordinator can gate the run subgraph's BRV/SRT
//! on the init half's completion.

use std::collections::HashMap;

use crate::edge::Edge;
use crate::error::ModelError;
use crate::graph::Graph;
use crate::subtype::VertexSubtype;

/// Splits the subgraph owned by `graph_vertex_index` of `parent`, if it
/// mixes configuration actors with other actors. A no-op if the subgraph
/// has no configuration actors, or consists only of configuration actors
/// and interfaces.
///
/// # Panics
/// Panics if a vertex index just collected from `g.vertices()` is no
/// longer live by the time it's looked up, which would indicate the two
/// passes over the same `Graph` disagree with each other.
#[allow(clippy::expect_used)]
pub fn split_dynamic_subgraph(parent: &mut Graph, graph_vertex_index: usize) -> Result<(), ModelError> {
    let sub_index = parent
        .vertex(graph_vertex_index)
        .and_then(|v| v.subgraph())
        .ok_or(ModelError::UnknownIndex {
            kind: "vertex",
            index: graph_vertex_index,
        })?;

    let placeholder = Graph::new("", 0, 0, 0, 0, 0, 0);
    let mut g = parent.replace_subgraph(sub_index, placeholder);

    let should_split = !g.config_actors().is_empty()
        && g.vertices()
            .any(|v| !v.subtype().is_interface() && v.subtype() != VertexSubtype::Config);

    if !should_split {
        parent.replace_subgraph(sub_index, g);
        return Ok(());
    }

    let stays_outer = |subtype: VertexSubtype| subtype == VertexSubtype::Config || subtype.is_interface();

    let run_indices: Vec<usize> = g
        .vertices()
        .filter(|v| !stays_outer(v.subtype()))
        .map(|v| v.index())
        .collect();

    let mut run = Graph::new(format!("{}__run", g.name()), run_indices.len(), 0, g.params().count(), 0, 0, 0);

    // Every parameter of the init half is visible, unchanged in meaning,
    // to the run half as an INHERITED reference at the same index — so
    // compiled expressions that reference it by index keep working after
    // their owning vertex moves.
    for p in g.params() {
        run.add_inherited_param(p.name().to_string(), p.index());
    }

    let mut old_to_run: HashMap<usize, usize> = HashMap::new();
    for &old_index in &run_indices {
        let v = g.vertex(old_index).expect("collected from live vertices");
        let new_index = run.clone_vertex_into(v);
        old_to_run.insert(old_index, new_index);
        if let Some(sub) = v.subgraph() {
            let moved_sub = g.replace_subgraph(sub, Graph::new("", 0, 0, 0, 0, 0, 0));
            let new_sub_index = run.push_subgraph(moved_sub);
            run.bind_vertex_subgraph(new_index, new_sub_index);
        }
    }

    let edges: Vec<Edge> = g.live_edges().cloned().collect();
    let mut run_out_port_for_graph_vertex = 0usize;
    let mut run_in_port_for_graph_vertex = 0usize;
    let mut outer_edges_to_graph_vertex: Vec<(usize, usize, Edge, bool)> = Vec::new();

    for edge in &edges {
        let src_in_run = old_to_run.contains_key(&edge.src_vertex());
        let snk_in_run = old_to_run.contains_key(&edge.snk_vertex());

        match (src_in_run, snk_in_run) {
            (true, true) => {
                let new_src = old_to_run[&edge.src_vertex()];
                let new_snk = old_to_run[&edge.snk_vertex()];
                run.add_edge_raw(
                    new_src,
                    edge.src_port(),
                    edge.src_rate().clone(),
                    new_snk,
                    edge.snk_port(),
                    edge.snk_rate().clone(),
                );
            }
            (true, false) => {
                let new_src = old_to_run[&edge.src_vertex()];
                let iface = run.add_interface(format!("out{run_out_port_for_graph_vertex}"), false);
                run.add_edge_raw(new_src, edge.src_port(), edge.src_rate().clone(), iface, 0, edge.src_rate().clone());
                outer_edges_to_graph_vertex.push((run_out_port_for_graph_vertex, edge.snk_vertex(), edge.clone(), false));
                run_out_port_for_graph_vertex += 1;
            }
            (false, true) => {
                let new_snk = old_to_run[&edge.snk_vertex()];
                let iface = run.add_interface(format!("in{run_in_port_for_graph_vertex}"), true);
                run.add_edge_raw(iface, 0, edge.snk_rate().clone(), new_snk, edge.snk_port(), edge.snk_rate().clone());
                outer_edges_to_graph_vertex.push((run_in_port_for_graph_vertex, edge.src_vertex(), edge.clone(), true));
                run_in_port_for_graph_vertex += 1;
            }
            (false, false) => {
                // Both endpoints stay in the init half; nothing to move.
            }
        }
    }

    for &old_index in &run_indices {
        g.remove_vertex(old_index)?;
    }

    let run_vertex = g.add_subgraph(
        format!("{}__run_graph", g.name()),
        run_in_port_for_graph_vertex,
        run_out_port_for_graph_vertex,
        run,
    );

    for (port, other_endpoint, original_edge, is_input_side) in outer_edges_to_graph_vertex {
        if is_input_side {
            g.add_edge_raw(
                other_endpoint,
                original_edge.src_port(),
                original_edge.src_rate().clone(),
                run_vertex,
                port,
                original_edge.snk_rate().clone(),
            );
        } else {
            g.add_edge_raw(
                run_vertex,
                port,
                original_edge.src_rate().clone(),
                other_endpoint,
                original_edge.snk_port(),
                original_edge.snk_rate().clone(),
            );
        }
    }

    parent.replace_subgraph(sub_index, g);
    Ok(())
}
