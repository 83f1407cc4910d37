// SPDX-License-Identifier: Apache-2.0
//! Memory region allocation for the FIFOs backing a firing DAG's edges.
//!
//! A [`FifoArena`] is a per-cluster-memory-interface bump allocator scoped
//! to one firing-DAG generation; [`allocate`] walks a
//! [`spider_srt::FiringDag`]'s edges and reserves a [`FifoRegion`] in an
//! arena for each one, sized by a caller-supplied per-token byte count.

mod allocator;
mod arena;
mod error;
mod region;

pub use allocator::{allocate, FifoTable};
pub use arena::FifoArena;
pub use error::FifoError;
pub use region::FifoRegion;
pub use spider_srt::FifoAllocatorKind;
