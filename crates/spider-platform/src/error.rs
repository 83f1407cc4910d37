// SPDX-License-Identifier: Apache-2.0
//! Errors raised while building a platform description.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("cluster index {index} is out of range")]
    UnknownCluster { index: usize },
    #[error("processing element index {index} is out of range")]
    UnknownPe { index: usize },
    #[error("kernel index {index} is out of range")]
    UnknownKernel { index: usize },
    #[error("external buffer index {index} is out of range")]
    UnknownExternalBuffer { index: usize },
}
