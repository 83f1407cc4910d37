// SPDX-License-Identifier: Apache-2.0
//! Errors raised while expanding a PiSDF graph instance into a firing DAG.

use thiserror::Error;

/// Errors raised by [`crate::transform`].
#[derive(Debug, Error)]
pub enum SrtError {
    /// An edge loops a vertex back onto itself without a delay; per §4.D
    /// this is a construction error rather than a zero-delay self loop.
    #[error("edge {edge} self-loops without a delay")]
    SelfLoopWithoutDelay { edge: usize },
    /// A self-looping edge's delay holds fewer tokens than its own sink
    /// needs for a single firing.
    #[error("edge {edge} has a delay of {delay} tokens, smaller than its own sink rate {rate}")]
    DelayTooSmall { edge: usize, delay: i64, rate: i64 },
    /// A persistent delay could not be hoisted to the top graph within the
    /// configured depth budget.
    #[error("persistent delay on edge {edge} exhausted its hoist-depth budget of {depth}")]
    HoistDepthExhausted { edge: usize, depth: usize },
    /// An interface vertex was presented to [`crate::transform`] without a
    /// matching entry in the caller-supplied boundary context.
    #[error("interface vertex {vertex} has no boundary rate supplied for it")]
    MissingBoundaryRate { vertex: usize },
    /// An interface vertex had no edge wiring it to an inner neighbor.
    #[error("interface vertex {vertex} is not connected to an inner vertex")]
    DisconnectedInterface { vertex: usize },
    /// A `GRAPH` vertex's boundary port had no edge wiring it to an outer
    /// neighbor, so its subgraph instances' boundary context cannot be
    /// computed.
    #[error("graph vertex {vertex}'s boundary port {port} is not connected to an outer edge")]
    UnwiredGraphPort { vertex: usize, port: usize },
    /// [`crate::splice_subgraph`] could not find the spliced-in firing's
    /// counterpart edge at the placeholder firing's port.
    #[error("firing {firing} has no spliced edge at port {port}")]
    MissingSplicePort { firing: usize, port: usize },
    #[error(transparent)]
    Model(#[from] spider_model::ModelError),
    #[error(transparent)]
    Brv(#[from] spider_brv::BrvError),
    #[error(transparent)]
    Expr(#[from] spider_expr::ExprError),
}
