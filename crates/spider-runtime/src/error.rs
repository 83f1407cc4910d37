// SPDX-License-Identifier: Apache-2.0
//! Runtime errors: failures detected once the coordinator and workers are
//! actually running, as opposed to construction or model-solving errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to dispatch task {task_id} to LRT on pe {pe}")]
    DispatchFailed { task_id: usize, pe: usize },
    #[error("lost the completion channel while awaiting firing {firing}")]
    CompletionChannelClosed { firing: usize },
    #[error("kernel for firing {firing} panicked")]
    KernelPanicked { firing: usize },
    #[error("firing {firing} references unknown kernel index {kernel}")]
    UnknownKernel { firing: usize, kernel: usize },
    #[error("a fifo's lock was poisoned by a panicked holder")]
    FifoLockPoisoned,
    #[error(transparent)]
    Fifo(#[from] spider_fifo::FifoError),
    #[error(transparent)]
    Platform(#[from] spider_platform::PlatformError),
}
