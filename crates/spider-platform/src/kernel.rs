// SPDX-License-Identifier: Apache-2.0
//! The ordered runtime-kernel table.
//!
//! Index 0 is reserved for the first built-in subtype kernel and so on
//! through [`RESERVED_PREFIX_LEN`]; user kernels registered via
//! [`KernelTable::register`] start immediately after that prefix. A
//! built-in slot's entry carries no callable, since the runtime executes
//! those subtypes directly rather than through a registered function.

use std::sync::Arc;

use spider_model::VertexSubtype;

use crate::error::PlatformError;

/// `(inputParams, outputParams, inputBuffers, outputBuffers)`, matching
/// `createRuntimeKernel`'s documented function signature.
pub type KernelFn = dyn Fn(&[i64], &mut [i64], &[&[u8]], &mut [&mut [u8]]) + Send + Sync;

const RESERVED_KERNEL_NAMES: [&str; 10] =
    ["fork", "join", "repeat", "tail", "head", "duplicate", "init", "end", "extern_in", "extern_out"];

pub const RESERVED_PREFIX_LEN: usize = RESERVED_KERNEL_NAMES.len();

/// The reserved kernel-table index for a runtime-inserted or extern-I/O
/// subtype, or `None` for subtypes that bind a user kernel.
pub fn reserved_kernel_id(subtype: VertexSubtype) -> Option<usize> {
    match subtype {
        VertexSubtype::Fork => Some(0),
        VertexSubtype::Join => Some(1),
        VertexSubtype::Repeat => Some(2),
        VertexSubtype::Tail => Some(3),
        VertexSubtype::Head => Some(4),
        VertexSubtype::Duplicate => Some(5),
        VertexSubtype::Init => Some(6),
        VertexSubtype::End => Some(7),
        VertexSubtype::ExternIn => Some(8),
        VertexSubtype::ExternOut => Some(9),
        _ => None,
    }
}

#[derive(Clone)]
pub struct KernelEntry {
    name: String,
    function: Option<Arc<KernelFn>>,
}

impl std::fmt::Debug for KernelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelEntry")
            .field("name", &self.name)
            .field("function", &self.function.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl KernelEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function(&self) -> Option<&KernelFn> {
        self.function.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct KernelTable {
    entries: Vec<KernelEntry>,
}

impl KernelTable {
    pub fn new() -> Self {
        let entries = RESERVED_KERNEL_NAMES
            .iter()
            .map(|name| KernelEntry { name: (*name).to_string(), function: None })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&KernelEntry> {
        self.entries.get(index)
    }

    /// Appends a user kernel and returns its table index.
    pub fn register(&mut self, name: impl Into<String>, function: impl Fn(&[i64], &mut [i64], &[&[u8]], &mut [&mut [u8]]) + Send + Sync + 'static) -> usize {
        let index = self.entries.len();
        self.entries.push(KernelEntry { name: name.into(), function: Some(Arc::new(function)) });
        index
    }

    pub fn resolve(&self, index: usize) -> Result<&KernelEntry, PlatformError> {
        self.entry(index).ok_or(PlatformError::UnknownKernel { index })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn reserved_prefix_is_populated_without_callables() {
        let table = KernelTable::new();
        assert_eq!(table.len(), RESERVED_PREFIX_LEN);
        assert_eq!(table.entry(0).unwrap().name(), "fork");
        assert!(table.entry(0).unwrap().function().is_none());
    }

    #[test]
    fn user_kernels_register_after_the_prefix() {
        let mut table = KernelTable::new();
        let id = table.register("double", |_in, _out, _inb, _outb| {});
        assert_eq!(id, RESERVED_PREFIX_LEN);
        assert!(table.entry(id).unwrap().function().is_some());
    }

    #[test]
    fn reserved_ids_match_subtypes() {
        assert_eq!(reserved_kernel_id(VertexSubtype::Fork), Some(0));
        assert_eq!(reserved_kernel_id(VertexSubtype::ExternOut), Some(9));
        assert_eq!(reserved_kernel_id(VertexSubtype::Normal), None);
    }
}
