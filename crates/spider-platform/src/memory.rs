// SPDX-License-Identifier: Apache-2.0
//! A cluster's main memory interface.

/// Size and alignment of the region a [`crate::Cluster`]'s FIFOs are
/// carved out of; consumed by `spider-fifo`'s arena when a cluster's
/// allocator is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryInterface {
    pub size: usize,
    pub alignment: usize,
}
