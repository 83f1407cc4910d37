// SPDX-License-Identifier: Apache-2.0
//! Construction-time errors raised while building or mutating a [`crate::Graph`].

use thiserror::Error;

/// Errors raised by the PiSDF model's construction API.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// An operation targeted a graph that does not exist.
    #[error("null graph reference")]
    NullGraph,
    /// A parameter lookup by name found nothing in scope.
    #[error("parameter not found: {name}")]
    ParameterNotFound {
        /// The name that failed to resolve.
        name: String,
    },
    /// A port index exceeded the vertex's declared port count.
    #[error("port index {port} out of range for vertex {vertex} ({direction}, {count} ports declared)")]
    PortIndexOutOfRange {
        /// The offending vertex's stable index.
        vertex: usize,
        /// The offending port index.
        port: usize,
        /// `"input"` or `"output"`.
        direction: &'static str,
        /// Number of ports actually declared.
        count: usize,
    },
    /// Two edges were attached to the same (vertex, port, direction).
    #[error("duplicate {direction} port {port} on vertex {vertex}")]
    DuplicatePort {
        /// The offending vertex's stable index.
        vertex: usize,
        /// The offending port index.
        port: usize,
        /// `"input"` or `"output"`.
        direction: &'static str,
    },
    /// A NORMAL or CONFIG vertex has no bound runtime kernel at build time.
    #[error("vertex {vertex} has no runtime kernel bound")]
    MissingRuntimeKernel {
        /// The offending vertex's stable index.
        vertex: usize,
    },
    /// `createRuntimeKernel` was called more than once for the same vertex.
    ///
    /// The source implementation accepts this silently and keeps the last
    /// binding; this is treated as an explicit error here.
    #[error("vertex {vertex} already has a bound runtime kernel")]
    DuplicateRuntimeKernel {
        /// The offending vertex's stable index.
        vertex: usize,
    },
    /// A vertex's allowed-PE set was empty.
    #[error("vertex {vertex} has an empty allowed-PE set")]
    EmptyAllowedPeSet {
        /// The offending vertex's stable index.
        vertex: usize,
    },
    /// A vertex or edge index did not exist or was removed.
    #[error("unknown {kind} index {index}")]
    UnknownIndex {
        /// `"vertex"`, `"edge"`, or `"parameter"`.
        kind: &'static str,
        /// The offending index.
        index: usize,
    },
    /// An interface count mismatched between an outer GRAPH vertex and its
    /// subgraph's declared boundary.
    #[error("mismatched interface count: outer vertex {vertex} declares {outer} ports, subgraph declares {inner}")]
    MismatchedInterfaceCount {
        /// The outer GRAPH vertex's stable index.
        vertex: usize,
        /// Port count declared on the outer vertex.
        outer: usize,
        /// Interface count declared on the subgraph.
        inner: usize,
    },
    /// A delay carried a dynamic (non-literal) value.
    #[error("delay on edge {edge} has a dynamic value, which is rejected")]
    DynamicDelayValue {
        /// The offending edge's stable index.
        edge: usize,
    },
    /// An expression compiled fine but failed during evaluation.
    #[error(transparent)]
    Expr(#[from] spider_expr::ExprError),
    /// An output parameter was attached to a vertex that is not a
    /// configuration actor.
    #[error("vertex {vertex} is not a configuration actor and cannot produce output parameters")]
    OutputParamOnNonConfigActor {
        /// The offending vertex's stable index.
        vertex: usize,
    },
}
