// SPDX-License-Identifier: Apache-2.0
//! Execution-time backing storage for one firing-DAG edge.
//!
//! `spider-fifo` decides where an edge's region *would* live in a cluster's
//! memory interface and enforces the allocator-mode placement rules; this
//! module gives each edge an actual byte buffer to read and write during a
//! run. Modeling it as an independently owned `RwLock<Vec<u8>>` rather than
//! a shared arena slice keeps every read/write safe without `unsafe`
//! pointer splitting, at the cost of not literally reusing the arena's
//! backing bytes — acceptable since this crate's concern is protocol
//! correctness, not zero-copy performance.

use std::sync::{Arc, RwLock};

use crate::error::RuntimeError;

/// A single edge's FIFO: one writer firing, any number of reader firings.
#[derive(Debug, Clone)]
pub struct Fifo {
    bytes: Arc<RwLock<Vec<u8>>>,
}

impl Fifo {
    pub fn new(len: usize) -> Self {
        Self { bytes: Arc::new(RwLock::new(vec![0u8; len])) }
    }

    pub fn len(&self) -> Result<usize, RuntimeError> {
        Ok(self.bytes.read().map_err(|_| RuntimeError::FifoLockPoisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RuntimeError> {
        Ok(self.len()? == 0)
    }

    pub(crate) fn handle(&self) -> Arc<RwLock<Vec<u8>>> {
        Arc::clone(&self.bytes)
    }
}
