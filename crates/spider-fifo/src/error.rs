// SPDX-License-Identifier: Apache-2.0
//! Errors raised while allocating FIFO regions for a firing DAG generation.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FifoError {
    #[error("fifo arena exhausted: requested offset {requested} exceeds capacity {available}")]
    OutOfMemory { requested: usize, available: usize },
    /// `Default-no-sync` was requested for an edge whose producing and
    /// consuming firings are mapped to different PEs.
    #[error("edge {edge} crosses processing elements under the no-sync allocator")]
    UnsynchronizedCrossPe { edge: usize },
}
