// SPDX-License-Identifier: Apache-2.0
//! Errors raised while solving a graph's repetition vector.

use thiserror::Error;

/// Errors raised by [`crate::solve`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BrvError {
    /// A connected component of the rate graph admits no consistent
    /// integer repetition vector (two paths to the same vertex disagree).
    #[error("inconsistent repetition vector over component containing vertices {component:?}")]
    Inconsistent {
        /// Vertex indices belonging to the offending component.
        component: Vec<usize>,
    },
    /// An edge's rate evaluated to a negative number.
    #[error("edge {edge} evaluated to a negative rate")]
    NegativeRate {
        /// The offending edge's stable index.
        edge: usize,
    },
    /// An edge's sink rate evaluated to zero while its source rate did not,
    /// making the balance equation for that edge unsolvable.
    #[error("edge {edge} has a zero rate on one side and a non-zero rate on the other")]
    ZeroSeed {
        /// The offending edge's stable index.
        edge: usize,
    },
    /// An expression failed to evaluate against the current parameter
    /// snapshot (e.g. a dynamic parameter not yet resolved).
    #[error(transparent)]
    Expr(#[from] spider_expr::ExprError),
}
