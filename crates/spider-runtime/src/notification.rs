// SPDX-License-Identifier: Apache-2.0
//! The four notification kinds exchanged between GRT and LRTs.

use crate::message::TaskMessage;

#[derive(Debug, Clone)]
pub enum Notification {
    /// GRT → LRT: run this task next.
    Dispatch(TaskMessage),
    /// LRT → GRT: a firing finished; its output FIFOs are signaled ready.
    Complete { task_id: usize, firing: usize, pe: usize },
    /// LRT → GRT: one output parameter a configuration-actor firing
    /// produced, sent immediately after that firing's `Complete`.
    Param { task_id: usize, param: usize, value: i64 },
    /// GRT → LRT: drain the current task, then stop.
    Terminate,
}
