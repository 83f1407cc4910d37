// SPDX-License-Identifier: Apache-2.0
//! The per-firing task message GRT builds and hands off to an LRT.

use std::sync::{Arc, RwLock};

/// One FIFO endpoint as seen by the firing that will read or write it.
#[derive(Debug, Clone)]
pub struct FifoHandle {
    pub edge: usize,
    pub bytes: Arc<RwLock<Vec<u8>>>,
}

/// Everything an LRT needs to invoke one firing's kernel.
#[derive(Debug, Clone)]
pub struct TaskMessage {
    pub task_id: usize,
    pub firing: usize,
    pub kernel: usize,
    pub inputs: Vec<FifoHandle>,
    pub outputs: Vec<FifoHandle>,
    pub input_params: Vec<i64>,
    pub output_param_count: usize,
}
