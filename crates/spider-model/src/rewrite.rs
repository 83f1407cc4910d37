// SPDX-License-Identifier: Apache-2.0
//! Post-construction rewrite of DUPLICATE vertices with unbalanced rates.

use crate::edge::Edge;
use crate::error::ModelError;
use crate::graph::Graph;
use crate::subtype::VertexSubtype;

/// Rewrites every `DUPLICATE` vertex in `graph` (and recursively in its
/// subgraphs) whose output rates are not all equal to its input rate into
/// an equivalent `REPEAT -> FORK` pair, preserving total token balance.
///
/// Idempotent: a `DUPLICATE` vertex that has already been rewritten no
/// longer exists in the graph, so a second pass finds nothing to do.
pub fn apply_broadcast_rewrite(graph: &mut Graph) -> Result<(), ModelError> {
    let duplicate_indices: Vec<usize> = graph
        .vertices()
        .filter(|v| v.subtype() == VertexSubtype::Duplicate)
        .map(|v| v.index())
        .collect();

    for vertex_index in duplicate_indices {
        rewrite_one(graph, vertex_index)?;
    }

    for i in 0..graph.subgraphs().len() {
        if let Some(sub) = graph.subgraph_mut(i) {
            apply_broadcast_rewrite(sub)?;
        }
    }

    Ok(())
}

fn rewrite_one(graph: &mut Graph, vertex_index: usize) -> Result<(), ModelError> {
    let values = graph.resolved_values();

    let input_edge: Option<Edge> = graph
        .live_edges()
        .find(|e| e.snk_vertex() == vertex_index && e.snk_port() == 0)
        .cloned();
    let Some(input_edge) = input_edge else {
        return Ok(());
    };
    let Ok(input_rate) = input_edge.snk_rate().evaluate(&values) else {
        return Ok(()); // not yet statically evaluable; SRT will re-check
    };

    let output_edges: Vec<Edge> = graph
        .live_edges()
        .filter(|e| e.src_vertex() == vertex_index)
        .cloned()
        .collect();

    let all_balanced = output_edges.iter().all(|e| {
        e.src_rate()
            .evaluate(&values)
            .map(|r| r == input_rate)
            .unwrap_or(false)
    });
    if all_balanced {
        return Ok(());
    }

    let name = graph
        .vertex(vertex_index)
        .map(|v| v.name().to_string())
        .unwrap_or_default();
    let repeat_index = graph.add_runtime_vertex(format!("{name}__repeat"), VertexSubtype::Repeat, 1, 1);
    let fork_index = graph.add_runtime_vertex(format!("{name}__fork"), VertexSubtype::Fork, 1, output_edges.len());

    let total_rate: f64 = output_edges
        .iter()
        .filter_map(|e| e.src_rate().evaluate(&values).ok())
        .sum();

    graph.add_edge(
        input_edge.src_vertex(),
        input_edge.src_port(),
        &format_rate(input_rate),
        repeat_index,
        0,
        &format_rate(input_rate),
    )?;
    graph.add_edge(
        repeat_index,
        0,
        &format_rate(total_rate),
        fork_index,
        0,
        &format_rate(total_rate),
    )?;

    for (port, edge) in output_edges.iter().enumerate() {
        let rate = edge.src_rate().evaluate(&values).unwrap_or(0.0);
        graph.add_edge(
            fork_index,
            port,
            &format_rate(rate),
            edge.snk_vertex(),
            edge.snk_port(),
            &format_rate(rate),
        )?;
    }

    graph.remove_vertex(vertex_index)
}

fn format_rate(rate: f64) -> String {
    format!("{}", rate as i64)
}
