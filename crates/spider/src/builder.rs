// SPDX-License-Identifier: Apache-2.0
//! Thin free-function wrappers over [`spider_model::Graph`] and
//! [`spider_platform::Platform`]'s inherent construction methods, named
//! after the host construction API a driver calls before invoking
//! [`crate::Spider::run`].

use spider_model::{Graph, VertexSubtype};
use spider_platform::{MemoryInterface, PeRole, Platform};

use crate::error::SpiderError;

pub fn create_platform(cluster_count: usize, pe_count: usize) -> Platform {
    Platform::new(cluster_count, pe_count)
}

pub fn create_cluster(platform: &mut Platform, pe_count: usize, memory_interface: MemoryInterface) -> usize {
    platform.create_cluster(pe_count, memory_interface)
}

#[allow(clippy::too_many_arguments)]
pub fn create_processing_element(
    platform: &mut Platform,
    hw_type: impl Into<String>,
    hw_id: usize,
    cluster: usize,
    name: impl Into<String>,
    role: PeRole,
    affinity: usize,
) -> Result<usize, SpiderError> {
    Ok(platform.create_processing_element(hw_type, hw_id, cluster, name, role, affinity)?)
}

pub fn set_global_runtime_pe(platform: &mut Platform, pe: usize) -> Result<(), SpiderError> {
    Ok(platform.set_global_runtime_pe(pe)?)
}

pub fn create_runtime_kernel(
    platform: &mut Platform,
    graph: &mut Graph,
    vertex: usize,
    name: impl Into<String>,
    function: impl Fn(&[i64], &mut [i64], &[&[u8]], &mut [&mut [u8]]) + Send + Sync + 'static,
) -> Result<usize, SpiderError> {
    let kernel = platform.kernels_mut().register(name, function);
    graph.bind_kernel(vertex, kernel)?;
    Ok(kernel)
}

/// Same as [`create_runtime_kernel`] but binds a kernel already present in
/// `platform`'s table, for sharing one registered function across vertices.
pub fn bind_runtime_kernel(graph: &mut Graph, vertex: usize, kernel: usize) -> Result<(), SpiderError> {
    Ok(graph.bind_kernel(vertex, kernel)?)
}

#[allow(clippy::too_many_arguments)]
pub fn create_graph(
    name: impl Into<String>,
    actor_count: usize,
    edge_count: usize,
    param_count: usize,
    input_interface_count: usize,
    output_interface_count: usize,
    config_actor_count: usize,
) -> Graph {
    Graph::new(name, actor_count, edge_count, param_count, input_interface_count, output_interface_count, config_actor_count)
}

pub fn create_subgraph(parent: &mut Graph, name: impl Into<String>, in_count: usize, out_count: usize, subgraph: Graph) -> usize {
    parent.add_subgraph(name, in_count, out_count, subgraph)
}

pub fn create_vertex(graph: &mut Graph, name: impl Into<String>, in_count: usize, out_count: usize) -> usize {
    graph.add_vertex(name, in_count, out_count)
}

pub fn create_config_actor(graph: &mut Graph, name: impl Into<String>, in_count: usize, out_count: usize) -> usize {
    graph.add_config_actor(name, in_count, out_count)
}

fn create_runtime_helper(graph: &mut Graph, name: impl Into<String>, subtype: VertexSubtype, in_count: usize, out_count: usize) -> usize {
    graph.add_runtime_vertex(name, subtype, in_count, out_count)
}

pub fn create_fork(graph: &mut Graph, name: impl Into<String>, out_count: usize) -> usize {
    create_runtime_helper(graph, name, VertexSubtype::Fork, 1, out_count)
}

pub fn create_join(graph: &mut Graph, name: impl Into<String>, in_count: usize) -> usize {
    create_runtime_helper(graph, name, VertexSubtype::Join, in_count, 1)
}

pub fn create_repeat(graph: &mut Graph, name: impl Into<String>, out_count: usize) -> usize {
    create_runtime_helper(graph, name, VertexSubtype::Repeat, 1, out_count)
}

pub fn create_tail(graph: &mut Graph, name: impl Into<String>, in_count: usize) -> usize {
    create_runtime_helper(graph, name, VertexSubtype::Tail, in_count, 1)
}

pub fn create_head(graph: &mut Graph, name: impl Into<String>, in_count: usize) -> usize {
    create_runtime_helper(graph, name, VertexSubtype::Head, in_count, 1)
}

pub fn create_duplicate(graph: &mut Graph, name: impl Into<String>, out_count: usize) -> usize {
    create_runtime_helper(graph, name, VertexSubtype::Duplicate, 1, out_count)
}

pub fn create_init(graph: &mut Graph, name: impl Into<String>, out_count: usize) -> usize {
    create_runtime_helper(graph, name, VertexSubtype::Init, 0, out_count)
}

pub fn create_end(graph: &mut Graph, name: impl Into<String>, in_count: usize) -> usize {
    create_runtime_helper(graph, name, VertexSubtype::End, in_count, 0)
}

pub fn create_extern_input_interface(graph: &mut Graph, name: impl Into<String>, port_count: usize) -> usize {
    graph.add_extern(name, true, port_count)
}

pub fn create_extern_output_interface(graph: &mut Graph, name: impl Into<String>, port_count: usize) -> usize {
    graph.add_extern(name, false, port_count)
}

pub fn create_input_interface(graph: &mut Graph, name: impl Into<String>) -> usize {
    graph.add_interface(name, true)
}

pub fn create_output_interface(graph: &mut Graph, name: impl Into<String>) -> usize {
    graph.add_interface(name, false)
}

pub fn create_static_param(graph: &mut Graph, name: impl Into<String>, value: i64) -> usize {
    graph.add_static_param(name, value)
}

pub fn create_static_expr_param(graph: &mut Graph, name: impl Into<String>, expr: &str) -> Result<usize, SpiderError> {
    Ok(graph.add_static_expr_param(name, expr)?)
}

pub fn create_dynamic_param(graph: &mut Graph, name: impl Into<String>) -> usize {
    graph.add_dynamic_param(name)
}

pub fn create_dynamic_dependant_param(graph: &mut Graph, name: impl Into<String>, expr: &str) -> Result<usize, SpiderError> {
    Ok(graph.add_dynamic_dependant_param(name, expr)?)
}

pub fn create_inherited_param(graph: &mut Graph, name: impl Into<String>, parent_index: usize) -> usize {
    graph.add_inherited_param(name, parent_index)
}

pub fn add_input_param_to_vertex(graph: &mut Graph, vertex: usize, param: usize) -> Result<(), SpiderError> {
    Ok(graph.add_input_param_to_vertex(vertex, param)?)
}

pub fn add_input_refinement_param_to_vertex(graph: &mut Graph, vertex: usize, param: usize) -> Result<(), SpiderError> {
    Ok(graph.add_input_refinement_param_to_vertex(vertex, param)?)
}

pub fn add_output_param_to_vertex(graph: &mut Graph, vertex: usize, param: usize) -> Result<(), SpiderError> {
    Ok(graph.add_output_param_to_vertex(vertex, param)?)
}

#[allow(clippy::too_many_arguments)]
pub fn create_edge(
    graph: &mut Graph,
    src_vertex: usize,
    src_port: usize,
    src_rate: &str,
    snk_vertex: usize,
    snk_port: usize,
    snk_rate: &str,
) -> Result<usize, SpiderError> {
    Ok(graph.add_edge(src_vertex, src_port, src_rate, snk_vertex, snk_port, snk_rate)?)
}

pub fn create_local_delay(
    graph: &mut Graph,
    edge: usize,
    value: i64,
    setter: Option<(usize, usize)>,
    getter: Option<(usize, usize)>,
) -> Result<(), SpiderError> {
    Ok(graph.add_local_delay(edge, value, setter, getter)?)
}

pub fn create_persistent_delay(graph: &mut Graph, edge: usize, value: i64) -> Result<(), SpiderError> {
    Ok(graph.add_persistent_delay(edge, value)?)
}

pub fn create_local_persistent_delay(graph: &mut Graph, edge: usize, value: i64, level_count: usize) -> Result<(), SpiderError> {
    Ok(graph.add_local_persistent_delay(edge, value, level_count)?)
}

pub fn set_allowed_pes(graph: &mut Graph, vertex: usize, pes: Vec<usize>) -> Result<(), SpiderError> {
    Ok(graph.set_allowed_pes(vertex, pes)?)
}

/// A registered-but-unbound kernel function, for sharing one callable
/// across several `create_runtime_kernel` calls without re-registering it.
pub fn register_kernel(platform: &mut Platform, name: impl Into<String>, function: impl Fn(&[i64], &mut [i64], &[&[u8]], &mut [&mut [u8]]) + Send + Sync + 'static) -> usize {
    platform.kernels_mut().register(name, function)
}
