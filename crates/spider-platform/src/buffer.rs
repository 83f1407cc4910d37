// SPDX-License-Identifier: Apache-2.0
//! Buffers owned by the host rather than carved from a cluster's FIFO
//! arena, used by `EXTERN_IN`/`EXTERN_OUT` vertices.

#[derive(Debug, Clone)]
pub struct ExternalBuffer {
    name: String,
    size: usize,
}

impl ExternalBuffer {
    pub(crate) fn new(name: String, size: usize) -> Self {
        Self { name, size }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }
}
