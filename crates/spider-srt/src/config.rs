// SPDX-License-Identifier: Apache-2.0
//! Tunables for the single-rate transformer.

/// The FIFO strategy the runtime has been configured with, needed by the
/// transformer only to decide whether a null edge still reserves a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FifoAllocatorKind {
    #[default]
    Default,
    DefaultNoSync,
}

/// Knobs threaded through [`crate::transform`].
#[derive(Debug, Clone)]
pub struct SrtConfig {
    /// How many hierarchical levels a persistent delay may be hoisted
    /// through before the transform gives up and reports
    /// [`crate::SrtError::HoistDepthExhausted`]. `usize::MAX` (the default)
    /// means "until the top graph is reached".
    pub max_delay_hoist_depth: usize,
    pub fifo_allocator: FifoAllocatorKind,
}

impl Default for SrtConfig {
    fn default() -> Self {
        Self {
            max_delay_hoist_depth: usize::MAX,
            fifo_allocator: FifoAllocatorKind::default(),
        }
    }
}
