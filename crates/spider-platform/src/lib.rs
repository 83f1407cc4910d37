// SPDX-License-Identifier: Apache-2.0
//! The hardware platform description: clusters, processing elements, the
//! ordered kernel table, and host-registered external buffers.

mod buffer;
mod cluster;
mod error;
mod kernel;
mod memory;
mod pe;
mod platform;

pub use buffer::ExternalBuffer;
pub use cluster::Cluster;
pub use error::PlatformError;
pub use kernel::{reserved_kernel_id, KernelEntry, KernelFn, KernelTable, RESERVED_PREFIX_LEN};
pub use memory::MemoryInterface;
pub use pe::{PeRole, ProcessingElement};
pub use platform::Platform;
