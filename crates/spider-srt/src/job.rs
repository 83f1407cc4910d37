// SPDX-License-Identifier: Apache-2.0
//! Transformation jobs: the inputs and outputs of one [`crate::transform`]
//! call.

use crate::dag::FiringDag;

/// Per-parameter-index overrides applied during parameter freezing (step 1):
/// `Some(value)` rewrites an `INHERITED` reference or a resolved
/// `DYNAMIC_DEPENDANT`; `None` leaves the parameter's own stored value
/// (symbolic for a still-ungated `DYNAMIC` parameter).
pub type ParamOverrides = Vec<Option<i64>>;

/// A boundary port's rate context, supplied by whatever owns the outer edge
/// feeding or draining one of this graph's interfaces.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryPort {
    /// The outer edge's rate at this interface, already evaluated.
    pub outer_rate: i64,
    /// Disables the transparent-interface shortcut even when rates match,
    /// per the edge case where the outer source/sink is already scheduled.
    pub already_scheduled: bool,
}

/// Boundary context for one subgraph instance, aligned with
/// `Graph::input_interfaces()`/`Graph::output_interfaces()` declaration
/// order.
#[derive(Debug, Clone, Default)]
pub struct BoundaryContext {
    pub inputs: Vec<BoundaryPort>,
    pub outputs: Vec<BoundaryPort>,
}

/// Describes what a graph-boundary interface resolved to after step 2: a
/// block of firings the hierarchy driver can wire into exactly as it would
/// any ordinary vertex clone block.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceLink {
    /// The interface vertex this link replaces.
    pub vertex: usize,
    /// First firing index of the block presented at the boundary.
    pub firing_base: usize,
    /// The fixed port every firing in the block exposes at the boundary.
    pub port: usize,
    /// Number of firings in the block: `r(v)` when the interface dissolved
    /// transparently, `1` when a REPEAT/TAIL adapter was spliced in.
    pub count: i64,
    /// Per-firing rate presented at the boundary.
    pub rate: i64,
    pub transparent: bool,
}

/// A pending expansion of one subgraph instance, produced by step 7. The
/// runtime coordinator re-invokes [`crate::transform`] for dynamic jobs once
/// their gating configuration-actor parameters are known.
#[derive(Debug, Clone)]
pub struct FutureJob {
    /// The `GRAPH` vertex, in the graph just transformed, whose subgraph
    /// this job expands.
    pub subgraph_vertex: usize,
    /// Which instance of that subgraph vertex's `r(v)` firings this is.
    pub instance: i64,
    pub param_overrides: ParamOverrides,
    /// The firing this instance's clone block occupies in the parent DAG,
    /// ready for [`crate::splice_subgraph`] to replace. `usize::MAX` when
    /// the `GRAPH` vertex was still gated and so was never cloned; the
    /// driver re-derives this once the job is retried as part of a later,
    /// ungated transform.
    pub placeholder_firing: usize,
    /// This instance's boundary rate context, already resolved from the
    /// parent graph's live edges. Empty when the vertex was still gated.
    pub boundary: BoundaryContext,
}

/// Everything [`crate::transform`] produces for one transformation job.
#[derive(Debug, Clone)]
pub struct SrtOutput {
    pub dag: FiringDag,
    pub input_links: Vec<InterfaceLink>,
    pub output_links: Vec<InterfaceLink>,
    pub static_jobs: Vec<FutureJob>,
    pub dynamic_jobs: Vec<FutureJob>,
}
