// SPDX-License-Identifier: Apache-2.0
//! Errors raised while scheduling or mapping a firing DAG.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedError {
    /// A user-kernel firing declared no allowed processing elements.
    #[error("firing {firing} has an empty allowed-PE set")]
    EmptyAllowedPeSet { firing: usize },
    #[error("firing index {index} is out of range")]
    UnknownFiring { index: usize },
    #[error("no processing elements were supplied to the scheduler")]
    NoProcessingElements,
}
