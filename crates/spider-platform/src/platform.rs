// SPDX-License-Identifier: Apache-2.0
//! The top-level platform description: clusters, PEs, the kernel table and
//! external buffers.

use tracing::instrument;

use crate::buffer::ExternalBuffer;
use crate::cluster::Cluster;
use crate::error::PlatformError;
use crate::kernel::KernelTable;
use crate::memory::MemoryInterface;
use crate::pe::{PeRole, ProcessingElement};

#[derive(Debug, Clone)]
pub struct Platform {
    clusters: Vec<Cluster>,
    pes: Vec<ProcessingElement>,
    kernels: KernelTable,
    external_buffers: Vec<ExternalBuffer>,
    global_runtime_pe: Option<usize>,
}

impl Platform {
    pub fn new(cluster_count: usize, pe_count: usize) -> Self {
        Self {
            clusters: Vec::with_capacity(cluster_count),
            pes: Vec::with_capacity(pe_count),
            kernels: KernelTable::new(),
            external_buffers: Vec::new(),
            global_runtime_pe: None,
        }
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn cluster(&self, index: usize) -> Option<&Cluster> {
        self.clusters.get(index)
    }

    pub fn pes(&self) -> &[ProcessingElement] {
        &self.pes
    }

    pub fn pe(&self, index: usize) -> Option<&ProcessingElement> {
        self.pes.get(index)
    }

    pub fn kernels(&self) -> &KernelTable {
        &self.kernels
    }

    pub fn kernels_mut(&mut self) -> &mut KernelTable {
        &mut self.kernels
    }

    pub fn external_buffers(&self) -> &[ExternalBuffer] {
        &self.external_buffers
    }

    pub fn global_runtime_pe(&self) -> Option<usize> {
        self.global_runtime_pe
    }

    pub fn create_cluster(&mut self, pe_count: usize, memory_interface: MemoryInterface) -> usize {
        let index = self.clusters.len();
        self.clusters.push(Cluster::new(index, memory_interface, pe_count));
        index
    }

    #[instrument(skip(self, hw_type, name))]
    #[allow(clippy::too_many_arguments)]
    pub fn create_processing_element(
        &mut self,
        hw_type: impl Into<String>,
        hw_id: usize,
        cluster: usize,
        name: impl Into<String>,
        role: PeRole,
        affinity: usize,
    ) -> Result<usize, PlatformError> {
        if cluster >= self.clusters.len() {
            return Err(PlatformError::UnknownCluster { index: cluster });
        }
        let index = self.pes.len();
        self.pes.push(ProcessingElement::new(index, hw_type.into(), hw_id, cluster, name.into(), role, affinity));
        self.clusters[cluster].push_pe(index);
        Ok(index)
    }

    pub fn set_global_runtime_pe(&mut self, pe: usize) -> Result<(), PlatformError> {
        if pe >= self.pes.len() {
            return Err(PlatformError::UnknownPe { index: pe });
        }
        self.global_runtime_pe = Some(pe);
        Ok(())
    }

    pub fn register_external_buffer(&mut self, name: impl Into<String>, size: usize) -> usize {
        let index = self.external_buffers.len();
        self.external_buffers.push(ExternalBuffer::new(name.into(), size));
        index
    }

    pub fn external_buffer(&self, index: usize) -> Result<&ExternalBuffer, PlatformError> {
        self.external_buffers.get(index).ok_or(PlatformError::UnknownExternalBuffer { index })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn creating_a_pe_on_an_unknown_cluster_is_an_error() {
        let mut platform = Platform::new(1, 1);
        let err = platform.create_processing_element("cpu", 0, 3, "pe0", PeRole::Lrt, 0).unwrap_err();
        assert_eq!(err, PlatformError::UnknownCluster { index: 3 });
    }

    #[test]
    fn pe_registration_links_back_to_its_cluster() {
        let mut platform = Platform::new(1, 2);
        let cluster = platform.create_cluster(2, MemoryInterface { size: 4096, alignment: 8 });
        let pe0 = platform.create_processing_element("cpu", 0, cluster, "pe0", PeRole::Lrt, 0).unwrap();
        let pe1 = platform.create_processing_element("cpu", 1, cluster, "pe1", PeRole::Lrt, 1).unwrap();
        assert_eq!(platform.cluster(cluster).unwrap().pes(), &[pe0, pe1]);
        platform.set_global_runtime_pe(pe0).unwrap();
        assert_eq!(platform.global_runtime_pe(), Some(pe0));
    }

    #[test]
    fn setting_an_unknown_global_runtime_pe_is_an_error() {
        let mut platform = Platform::new(0, 0);
        let err = platform.set_global_runtime_pe(0).unwrap_err();
        assert_eq!(err, PlatformError::UnknownPe { index: 0 });
    }

    #[test]
    fn external_buffers_are_addressed_by_index() {
        let mut platform = Platform::new(0, 0);
        let index = platform.register_external_buffer("frame_in", 1920 * 1080 * 3);
        assert_eq!(platform.external_buffer(index).unwrap().name(), "frame_in");
        assert_eq!(platform.external_buffer(index + 1).unwrap_err(), PlatformError::UnknownExternalBuffer { index: index + 1 });
    }
}
