// SPDX-License-Identifier: Apache-2.0
//! The GRT/LRT coordinator protocol: dispatches firing-DAG tasks to OS
//! threads, waits on completions, and feeds configuration-actor outputs
//! back to the caller.

mod coordinator;
mod error;
mod fifo;
mod lrt;
mod message;
mod notification;

pub use coordinator::{build_fifos, Grt};
pub use error::RuntimeError;
pub use fifo::Fifo;
pub use lrt::{Lrt, LrtState};
pub use message::{FifoHandle, TaskMessage};
pub use notification::Notification;
