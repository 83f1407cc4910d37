// SPDX-License-Identifier: Apache-2.0
//! The single-rate transformer: expands one transformation job's reference
//! graph into a firing DAG.

use std::collections::BTreeMap;

use spider_model::{Graph, Vertex, VertexSubtype};
use tracing::instrument;

use crate::config::SrtConfig;
use crate::dag::FiringDag;
use crate::error::SrtError;
use crate::job::{BoundaryContext, BoundaryPort, FutureJob, InterfaceLink, ParamOverrides, SrtOutput};
use crate::linking::{compute_producers, invert_to_consumers, tail_segments};

/// Runs the single-rate transformer over `graph`'s current instance.
///
/// `overrides` carries the job's frozen parameter snapshot (step 1, applied
/// here against a throwaway clone of `graph` so the reference graph itself
/// is never mutated). `boundary` supplies the outer-rate context for every
/// declared interface (step 2). `depth` is this graph's distance from the
/// top graph, used to bound persistent-delay hoisting.
///
/// `GRAPH` vertices are cloned into ordinary firing blocks like any other
/// vertex as long as `graph` itself has no unresolved dynamic parameter
/// left gating them; the caller is then responsible for recursing into
/// each subgraph instance (via the `static_jobs` this call returns) and
/// splicing the result in with [`splice_subgraph`]. When `graph` is still
/// gated, `GRAPH` vertices are left uncloned and surface as
/// `dynamic_jobs` instead, to be retried once their gating configuration
/// actor has produced a value.
#[instrument(skip(graph, overrides, boundary, config))]
pub fn transform(
    graph: &Graph,
    overrides: &ParamOverrides,
    boundary: &BoundaryContext,
    config: &SrtConfig,
    depth: usize,
) -> Result<SrtOutput, SrtError> {
    // Step 1: parameter freezing.
    let mut frozen = graph.clone();
    frozen.apply_frozen_params(overrides)?;
    let values = frozen.resolved_values();
    let gated = frozen.has_unresolved_dynamic();

    // Repetition vector, computed against the frozen snapshot so interface
    // transparency (step 2) and vertex cloning (step 3) see concrete rates.
    let brv = spider_brv::solve(&frozen)?;
    let rep = |v: usize| -> i64 { brv.get(&v).copied().unwrap_or(1) };

    let mut dag = FiringDag::new();
    let mut base: BTreeMap<usize, usize> = BTreeMap::new();

    // Step 3 runs ahead of step 2 here: interface replacement needs its
    // inner neighbor's clone block to already exist, so every non-interface
    // vertex is cloned into r(v) firings first. A `GRAPH` vertex clones
    // exactly like a `NORMAL` one once it is no longer gated, which lets
    // the edge-linkage pass below wire it with zero special-casing; while
    // gated it is left out, same as an interface.
    for v in frozen.vertices() {
        if v.subtype().is_interface() {
            continue;
        }
        if v.subtype() == VertexSubtype::Graph && gated {
            continue;
        }
        let count = rep(v.index());
        let first = dag.firings().len();
        base.insert(v.index(), first);
        for instance in 0..count {
            dag.push_firing(
                v.index(),
                v.subtype(),
                instance,
                v.kernel(),
                v.allowed_pes().to_vec(),
                v.input_count(),
                v.output_count(),
            );
        }
    }

    // Step 2: interface replacement.
    let input_links = resolve_input_interfaces(&frozen, &mut dag, &mut base, &rep, boundary)?;
    let output_links = resolve_output_interfaces(&frozen, &mut dag, &mut base, &rep, boundary)?;

    // Step 4/5/6: edge linkage, null-edge handling, delay validation.
    for edge in frozen.live_edges() {
        let src_v = frozen.vertex(edge.src_vertex()).ok_or(SrtError::MissingBoundaryRate { vertex: edge.src_vertex() })?;
        let snk_v = frozen.vertex(edge.snk_vertex()).ok_or(SrtError::MissingBoundaryRate { vertex: edge.snk_vertex() })?;
        if src_v.subtype().is_interface() || snk_v.subtype().is_interface() {
            // Interfaces were already folded into firing blocks above; the
            // edges touching them were consumed while building those links.
            continue;
        }
        if gated && (src_v.subtype() == VertexSubtype::Graph || snk_v.subtype() == VertexSubtype::Graph) {
            // Neither endpoint was cloned above; this edge is re-linked
            // once the subgraph vertex's gating parameter resolves and the
            // caller retries this job as part of `dynamic_jobs`.
            continue;
        }

        let src_rate = edge.src_rate().evaluate(&values)? as i64;
        let snk_rate = edge.snk_rate().evaluate(&values)? as i64;

        if edge.is_self_loop() {
            let delay = edge.delay().map(spider_model::Delay::value).unwrap_or(0);
            if edge.delay().is_none() {
                return Err(SrtError::SelfLoopWithoutDelay { edge: edge.index() });
            }
            if delay < snk_rate {
                return Err(SrtError::DelayTooSmall {
                    edge: edge.index(),
                    delay,
                    rate: snk_rate,
                });
            }
        }

        // Null edge: both sides idle, nothing to wire (step 5).
        if src_rate == 0 && snk_rate == 0 {
            continue;
        }

        let delay = edge.delay().map(spider_model::Delay::value).unwrap_or(0);
        if delay > 0 && edge.delay().map(spider_model::Delay::is_persistent).unwrap_or(false) && depth >= config.max_delay_hoist_depth {
            return Err(SrtError::HoistDepthExhausted {
                edge: edge.index(),
                depth: config.max_delay_hoist_depth,
            });
        }

        let setter = edge.delay().and_then(spider_model::Delay::setter);
        let getter = edge.delay().and_then(spider_model::Delay::getter);

        let r_src = rep(edge.src_vertex());
        let r_snk = rep(edge.snk_vertex());
        link_edge(
            &mut dag,
            &base,
            edge.src_vertex(),
            edge.src_port(),
            r_src,
            src_rate,
            edge.snk_vertex(),
            edge.snk_port(),
            r_snk,
            snk_rate,
            delay,
            setter,
            getter,
        );
    }

    // Step 7: future-job production.
    let (static_jobs, dynamic_jobs) = produce_future_jobs(&frozen, &rep, &base, &values, gated)?;

    // Step 8: instance removal is implicit — an ungated `GRAPH` vertex was
    // cloned like any other above and is spliced over by the caller; a
    // gated one was never cloned in the first place.

    Ok(SrtOutput {
        dag,
        input_links,
        output_links,
        static_jobs,
        dynamic_jobs,
    })
}

#[allow(clippy::too_many_arguments)]
fn link_edge(
    dag: &mut FiringDag,
    base: &BTreeMap<usize, usize>,
    src_vertex: usize,
    src_port: usize,
    r_src: i64,
    src_rate: i64,
    snk_vertex: usize,
    snk_port: usize,
    r_snk: i64,
    snk_rate: i64,
    delay: i64,
    setter: Option<(usize, usize)>,
    getter: Option<(usize, usize)>,
) {
    let producers = compute_producers(r_src, src_rate, r_snk, snk_rate, delay);
    let consumers = invert_to_consumers(&producers, r_src);
    let tail = tail_segments(r_src, src_rate, delay);

    let src_base = base.get(&src_vertex).copied().unwrap_or(0);
    let snk_base = base.get(&snk_vertex).copied().unwrap_or(0);

    // `dests[s]` is the ordered list of destinations source firing `s`
    // feeds: `Some(k)` for real sink firing `k`, `None` for the tail (the
    // span that seeds the *next* iteration's leading delay buffer rather
    // than being claimed by any sink this iteration). A source firing can
    // straddle both.
    let mut dests: Vec<Vec<(Option<i64>, i64)>> =
        consumers.iter().map(|outs| outs.iter().map(|&(k, rate)| (Some(k), rate)).collect()).collect();
    for &(s, rate) in &tail {
        dests[s as usize].push((None, rate));
    }

    // Pre-create one FORK per source firing that feeds more than one
    // destination, and remember which fork output port serves which key.
    let mut fork_firing: BTreeMap<i64, usize> = BTreeMap::new();
    let mut fork_port_for: BTreeMap<(i64, Option<i64>), usize> = BTreeMap::new();
    for (s, outs) in dests.iter().enumerate() {
        if outs.len() > 1 {
            let total: i64 = outs.iter().map(|(_, r)| *r).sum();
            let fork = dag.push_firing(usize::MAX, VertexSubtype::Fork, s as i64, None, Vec::new(), 1, outs.len());
            dag.push_edge(src_base + s, src_port, fork, 0, total);
            for (port, (key, _)) in outs.iter().enumerate() {
                fork_port_for.insert((s as i64, *key), port);
            }
            fork_firing.insert(s as i64, fork);
        }
    }
    let source_output = |s: i64, key: Option<i64>| -> (usize, usize) {
        if dests[s as usize].len() == 1 {
            (src_base + s as usize, src_port)
        } else {
            (fork_firing[&s], fork_port_for[&(s, key)])
        }
    };

    for (k, entries) in producers.iter().enumerate() {
        let real: Vec<(i64, i64)> = entries.iter().copied().filter(|(s, _)| *s >= 0).collect();
        if real.is_empty() {
            // Fully delay-fed this iteration; wired from the INIT block
            // below instead.
            continue;
        }
        fan_in(dag, &real, |s| source_output(s, Some(k as i64)), snk_base + k, snk_port);
    }

    // INIT: the leading span of every sink that still needs delay-buffer
    // tokens this iteration.
    let buffer_consumers: Vec<(i64, i64)> = producers
        .iter()
        .enumerate()
        .filter_map(|(k, entries)| entries.iter().find(|(s, _)| *s == -1).map(|&(_, rate)| (k as i64, rate)))
        .collect();
    if !buffer_consumers.is_empty() {
        match setter {
            Some((setter_vertex, setter_port)) => {
                let setter_firing = base.get(&setter_vertex).copied().unwrap_or(0);
                fan_out(dag, setter_firing, setter_port, &buffer_consumers, snk_base, snk_port);
            }
            None => {
                let init = dag.push_firing(usize::MAX, VertexSubtype::Init, 0, None, Vec::new(), 0, buffer_consumers.len());
                for (port, &(k, rate)) in buffer_consumers.iter().enumerate() {
                    dag.push_edge(init, port, snk_base + k as usize, snk_port, rate);
                }
            }
        }
    }

    // END: the trailing span of every source firing whose production seeds
    // next iteration's buffer rather than being claimed by a sink here.
    if !tail.is_empty() {
        match getter {
            Some((getter_vertex, getter_port)) => {
                let getter_firing = base.get(&getter_vertex).copied().unwrap_or(0);
                fan_in(dag, &tail, |s| source_output(s, None), getter_firing, getter_port);
            }
            None => {
                let end = dag.push_firing(usize::MAX, VertexSubtype::End, 0, None, Vec::new(), tail.len(), 0);
                for (port, &(s, rate)) in tail.iter().enumerate() {
                    let (firing, fport) = source_output(s, None);
                    dag.push_edge(firing, fport, end, port, rate);
                }
            }
        }
    }
}

/// Wires `entries` (source id, rate pairs) into one existing sink port,
/// inserting a JOIN only when more than one entry feeds it.
fn fan_in(dag: &mut FiringDag, entries: &[(i64, i64)], source_of: impl Fn(i64) -> (usize, usize), snk_firing: usize, snk_port: usize) {
    if entries.len() == 1 {
        let (s, rate) = entries[0];
        let (firing, port) = source_of(s);
        dag.push_edge(firing, port, snk_firing, snk_port, rate);
        return;
    }
    let total: i64 = entries.iter().map(|(_, r)| *r).sum();
    let join = dag.push_firing(usize::MAX, VertexSubtype::Join, 0, None, Vec::new(), entries.len(), 1);
    for (port, &(s, rate)) in entries.iter().enumerate() {
        let (firing, fport) = source_of(s);
        dag.push_edge(firing, fport, join, port, rate);
    }
    dag.push_edge(join, 0, snk_firing, snk_port, total);
}

/// Wires one existing source port out to `dests` (sink id, rate pairs),
/// inserting a FORK only when more than one destination draws from it.
fn fan_out(dag: &mut FiringDag, src_firing: usize, src_port: usize, dests: &[(i64, i64)], snk_base: usize, snk_port: usize) {
    if dests.len() == 1 {
        let (k, rate) = dests[0];
        dag.push_edge(src_firing, src_port, snk_base + k as usize, snk_port, rate);
        return;
    }
    let total: i64 = dests.iter().map(|(_, r)| *r).sum();
    let fork = dag.push_firing(usize::MAX, VertexSubtype::Fork, 0, None, Vec::new(), 1, dests.len());
    dag.push_edge(src_firing, src_port, fork, 0, total);
    for (port, &(k, rate)) in dests.iter().enumerate() {
        dag.push_edge(fork, port, snk_base + k as usize, snk_port, rate);
    }
}

fn resolve_input_interfaces(
    graph: &Graph,
    dag: &mut FiringDag,
    base: &mut BTreeMap<usize, usize>,
    rep: &impl Fn(usize) -> i64,
    boundary: &BoundaryContext,
) -> Result<Vec<InterfaceLink>, SrtError> {
    let values = graph.resolved_values();
    let mut links = Vec::new();
    for (pos, &iface) in graph.input_interfaces().iter().enumerate() {
        let port = boundary.inputs.get(pos).copied().ok_or(SrtError::MissingBoundaryRate { vertex: iface })?;
        let Some(edge) = graph.live_edges().find(|e| e.src_vertex() == iface) else {
            return Err(SrtError::DisconnectedInterface { vertex: iface });
        };
        let inner = edge.snk_vertex();
        let inner_port = edge.snk_port();
        let inner_rate = edge.snk_rate().evaluate(&values)? as i64;
        let r_inner = rep(inner);
        let transparent = !port.already_scheduled && r_inner * inner_rate == port.outer_rate;

        if transparent {
            let inner_base = *base.entry(inner).or_insert_with(|| dag.firings().len());
            links.push(InterfaceLink {
                vertex: iface,
                firing_base: inner_base,
                port: inner_port,
                count: r_inner,
                rate: inner_rate,
                transparent: true,
            });
        } else {
            let repeat = dag.push_firing(iface, VertexSubtype::Repeat, 0, None, Vec::new(), 1, r_inner.max(1) as usize);
            let inner_base = base.get(&inner).copied().unwrap_or(0);
            for instance in 0..r_inner {
                dag.push_edge(repeat, instance as usize, inner_base + instance as usize, inner_port, inner_rate);
            }
            links.push(InterfaceLink {
                vertex: iface,
                firing_base: repeat,
                port: 0,
                count: 1,
                rate: port.outer_rate,
                transparent: false,
            });
        }
    }
    Ok(links)
}

fn resolve_output_interfaces(
    graph: &Graph,
    dag: &mut FiringDag,
    base: &mut BTreeMap<usize, usize>,
    rep: &impl Fn(usize) -> i64,
    boundary: &BoundaryContext,
) -> Result<Vec<InterfaceLink>, SrtError> {
    let values = graph.resolved_values();
    let mut links = Vec::new();
    for (pos, &iface) in graph.output_interfaces().iter().enumerate() {
        let port = boundary.outputs.get(pos).copied().ok_or(SrtError::MissingBoundaryRate { vertex: iface })?;
        let Some(edge) = graph.live_edges().find(|e| e.snk_vertex() == iface) else {
            return Err(SrtError::DisconnectedInterface { vertex: iface });
        };
        let inner = edge.src_vertex();
        let inner_port = edge.src_port();
        let inner_rate = edge.src_rate().evaluate(&values)? as i64;
        let r_inner = rep(inner);
        let transparent = !port.already_scheduled && r_inner * inner_rate == port.outer_rate;

        if transparent {
            let inner_base = *base.entry(inner).or_insert_with(|| dag.firings().len());
            links.push(InterfaceLink {
                vertex: iface,
                firing_base: inner_base,
                port: inner_port,
                count: r_inner,
                rate: inner_rate,
                transparent: true,
            });
        } else {
            let tail = dag.push_firing(iface, VertexSubtype::Tail, 0, None, Vec::new(), r_inner.max(1) as usize, 1);
            let inner_base = base.get(&inner).copied().unwrap_or(0);
            for instance in 0..r_inner {
                dag.push_edge(inner_base + instance as usize, inner_port, tail, instance as usize, inner_rate);
            }
            links.push(InterfaceLink {
                vertex: iface,
                firing_base: tail,
                port: 0,
                count: 1,
                rate: port.outer_rate,
                transparent: false,
            });
        }
    }
    Ok(links)
}

/// A `GRAPH` vertex's boundary context, derived from the outer edges wired
/// to its ports in `graph`. Used to seed the recursive `transform` call a
/// hierarchy driver makes for each of its instances.
fn graph_vertex_boundary(graph: &Graph, v: &Vertex, values: &[f64]) -> Result<BoundaryContext, SrtError> {
    let mut inputs = Vec::with_capacity(v.input_count());
    for port in 0..v.input_count() {
        let edge = graph
            .live_edges()
            .find(|e| e.snk_vertex() == v.index() && e.snk_port() == port)
            .ok_or(SrtError::UnwiredGraphPort { vertex: v.index(), port })?;
        let rate = edge.snk_rate().evaluate(values)? as i64;
        inputs.push(BoundaryPort { outer_rate: rate, already_scheduled: false });
    }
    let mut outputs = Vec::with_capacity(v.output_count());
    for port in 0..v.output_count() {
        let edge = graph
            .live_edges()
            .find(|e| e.src_vertex() == v.index() && e.src_port() == port)
            .ok_or(SrtError::UnwiredGraphPort { vertex: v.index(), port })?;
        let rate = edge.src_rate().evaluate(values)? as i64;
        outputs.push(BoundaryPort { outer_rate: rate, already_scheduled: false });
    }
    Ok(BoundaryContext { inputs, outputs })
}

/// Step 7: for each `GRAPH` vertex of `graph`, produce one future job per
/// instance, split between the static and dynamic job stacks depending on
/// whether `graph` itself still has unresolved dynamic parameters.
///
/// A static job's `placeholder_firing` names the firing `splice_subgraph`
/// should replace and its `boundary` is already resolved from `graph`'s
/// live edges; a dynamic job carries neither, since its vertex was never
/// cloned into a firing this call and its boundary can't be read until it
/// stops being gated.
fn produce_future_jobs(
    graph: &Graph,
    rep: &impl Fn(usize) -> i64,
    base: &BTreeMap<usize, usize>,
    values: &[f64],
    gated: bool,
) -> Result<(Vec<FutureJob>, Vec<FutureJob>), SrtError> {
    let mut static_jobs = Vec::new();
    let mut dynamic_jobs = Vec::new();

    for v in graph.vertices() {
        if v.subtype() != VertexSubtype::Graph {
            continue;
        }
        let count = rep(v.index());
        let boundary = if gated { BoundaryContext::default() } else { graph_vertex_boundary(graph, v, values)? };
        let placeholder_base = base.get(&v.index()).copied();
        for instance in 0..count {
            let overrides: ParamOverrides = graph.params().map(|p| p.resolved()).collect();
            let placeholder_firing = match placeholder_base {
                Some(b) if !gated => b + instance as usize,
                _ => usize::MAX,
            };
            let job = FutureJob {
                subgraph_vertex: v.index(),
                instance,
                param_overrides: overrides,
                placeholder_firing,
                boundary: boundary.clone(),
            };
            if gated {
                dynamic_jobs.push(job);
            } else {
                static_jobs.push(job);
            }
        }
    }
    Ok((static_jobs, dynamic_jobs))
}

/// Splices `sub_dag` (the firing DAG produced by transforming a `GRAPH`
/// vertex's subgraph) into `dag` in place of `placeholder`, the firing that
/// was cloned for that vertex instance. Redirects `placeholder`'s existing
/// boundary edges to the matching firings `input_links`/`output_links`
/// name in `sub_dag`, inserting a FORK/JOIN only where a boundary port
/// fans out to, or joins in from, more than one spliced firing. Returns
/// the firing-index offset `sub_dag` was spliced in at (see
/// [`FiringDag::splice`]), so the caller can remap any indices — such as a
/// nested `FutureJob::placeholder_firing` — that referred to `sub_dag`'s
/// own firing numbering. `placeholder` itself is retired to a zero-port
/// no-op once every boundary edge it used to own has been redirected.
pub fn splice_subgraph(
    dag: &mut FiringDag,
    placeholder: usize,
    sub_dag: FiringDag,
    input_links: &[InterfaceLink],
    output_links: &[InterfaceLink],
) -> Result<usize, SrtError> {
    let offset = dag.splice(sub_dag);

    for (port, link) in input_links.iter().enumerate() {
        let edge = dag
            .edges_into(placeholder)
            .into_iter()
            .find(|&e| dag.edges()[e].snk_port() == port)
            .ok_or(SrtError::MissingSplicePort { firing: placeholder, port })?;
        let base = offset + link.firing_base;
        if link.count == 1 {
            dag.redirect_snk(edge, base, link.port);
        } else {
            let fork = dag.push_firing(usize::MAX, VertexSubtype::Fork, 0, None, Vec::new(), 1, link.count as usize);
            dag.redirect_snk(edge, fork, 0);
            for instance in 0..link.count {
                dag.push_edge(fork, instance as usize, base + instance as usize, link.port, link.rate);
            }
        }
    }

    for (port, link) in output_links.iter().enumerate() {
        let edge = dag
            .edges_out_of(placeholder)
            .into_iter()
            .find(|&e| dag.edges()[e].src_port() == port)
            .ok_or(SrtError::MissingSplicePort { firing: placeholder, port })?;
        let base = offset + link.firing_base;
        if link.count == 1 {
            dag.redirect_src(edge, base, link.port);
        } else {
            let join = dag.push_firing(usize::MAX, VertexSubtype::Join, 0, None, Vec::new(), link.count as usize, 1);
            dag.redirect_src(edge, join, 0);
            for instance in 0..link.count {
                dag.push_edge(base + instance as usize, link.port, join, instance as usize, link.rate);
            }
        }
    }

    dag.neutralize(placeholder);

    Ok(offset)
}
