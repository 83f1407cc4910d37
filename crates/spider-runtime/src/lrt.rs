// SPDX-License-Identifier: Apache-2.0
//! The local runtime thread: pops dispatched tasks, runs their kernel, and
//! reports completion.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

use spider_platform::KernelTable;
use tracing::{error, instrument, trace};

use crate::error::RuntimeError;
use crate::message::TaskMessage;
use crate::notification::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LrtState {
    Idle,
    Dispatching,
    Executing,
    Notifying,
    Terminated,
}

/// Moves all bytes of `inputs`, concatenated in order, into `outputs`,
/// chunked by each output's declared length. This is the uniform
/// passthrough behavior of every runtime-inserted subtype (FORK, JOIN,
/// REPEAT, TAIL, HEAD, DUPLICATE, EXTERN_IN, EXTERN_OUT): each one only
/// ever reshapes a token stream, never transforms it. INIT/END firings
/// carry no input or output respectively and so degrade to a no-op, which
/// leaves a freshly allocated (zero-filled) FIFO in place of a persistent
/// delay's seed value.
fn run_builtin_copy(inputs: &[&[u8]], outputs: &mut [&mut [u8]]) {
    let flat: Vec<u8> = inputs.iter().flat_map(|s| s.iter().copied()).collect();
    let mut cursor = 0usize;
    for output in outputs.iter_mut() {
        let len = output.len();
        let end = (cursor + len).min(flat.len());
        let n = end.saturating_sub(cursor);
        output[..n].copy_from_slice(&flat[cursor..end]);
        cursor = end;
    }
}

pub struct Lrt {
    pe: usize,
    dispatch_rx: Receiver<Notification>,
    completion_tx: Sender<Notification>,
    kernels: Arc<KernelTable>,
}

impl Lrt {
    pub fn new(pe: usize, dispatch_rx: Receiver<Notification>, completion_tx: Sender<Notification>, kernels: Arc<KernelTable>) -> Self {
        Self { pe, dispatch_rx, completion_tx, kernels }
    }

    /// Runs until a `Terminate` notification arrives or the dispatch
    /// channel is dropped. Returns an error if a kernel panicked; the
    /// caller (GRT) is responsible for logging and winding the platform
    /// down via `Terminate` to the remaining LRTs.
    #[instrument(skip(self), fields(pe = self.pe))]
    pub fn run(mut self) -> Result<(), RuntimeError> {
        let mut state = LrtState::Idle;
        loop {
            let Ok(notification) = self.dispatch_rx.recv() else {
                break;
            };
            match notification {
                Notification::Dispatch(task) => {
                    state = LrtState::Dispatching;
                    state = LrtState::Executing;
                    let outcome = self.execute(&task);
                    state = LrtState::Notifying;

                    let task_id = task.task_id;
                    let firing = task.firing;
                    let _ = self.completion_tx.send(Notification::Complete { task_id, firing, pe: self.pe });

                    match outcome {
                        Ok(config_outputs) => {
                            for (param, value) in config_outputs {
                                let _ = self.completion_tx.send(Notification::Param { task_id, param, value });
                            }
                        }
                        Err(err) => {
                            error!(firing, "kernel execution failed: {err}");
                            state = LrtState::Terminated;
                            return Err(err);
                        }
                    }
                    state = LrtState::Idle;
                }
                Notification::Terminate => {
                    state = LrtState::Terminated;
                    break;
                }
                Notification::Complete { .. } | Notification::Param { .. } => {
                    // These only ever travel LRT -> GRT; never arrive here.
                }
            }
        }
        trace!(?state, "lrt stopped");
        Ok(())
    }

    fn execute(&self, task: &TaskMessage) -> Result<Vec<(usize, i64)>, RuntimeError> {
        let input_guards: Vec<_> = task
            .inputs
            .iter()
            .map(|h| h.bytes.read().map_err(|_| RuntimeError::FifoLockPoisoned))
            .collect::<Result<Vec<_>, _>>()?;
        let input_slices: Vec<&[u8]> = input_guards.iter().map(|g| g.as_slice()).collect();
        let mut output_guards: Vec<_> = task
            .outputs
            .iter()
            .map(|h| h.bytes.write().map_err(|_| RuntimeError::FifoLockPoisoned))
            .collect::<Result<Vec<_>, _>>()?;
        let mut output_slices: Vec<&mut [u8]> = output_guards.iter_mut().map(|g| g.as_mut_slice()).collect();

        if task.kernel < spider_platform::RESERVED_PREFIX_LEN {
            run_builtin_copy(&input_slices, &mut output_slices);
            return Ok(Vec::new());
        }

        let entry = self.kernels.resolve(task.kernel)?;
        let Some(function) = entry.function() else {
            return Err(RuntimeError::UnknownKernel { firing: task.firing, kernel: task.kernel });
        };
        let mut output_params = vec![0i64; task.output_param_count];

        let call = AssertUnwindSafe(|| function(&task.input_params, &mut output_params, &input_slices, &mut output_slices));
        if catch_unwind(call).is_err() {
            return Err(RuntimeError::KernelPanicked { firing: task.firing });
        }

        Ok(output_params.into_iter().enumerate().collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn copies_a_single_input_into_a_single_output_of_the_same_length() {
        let input: [u8; 4] = [1, 2, 3, 4];
        let mut out = [0u8; 4];
        {
            let mut outputs: Vec<&mut [u8]> = vec![&mut out];
            run_builtin_copy(&[&input], &mut outputs);
        }
        assert_eq!(out, input);
    }

    #[test]
    fn fans_one_input_out_to_several_shorter_outputs() {
        let input: [u8; 6] = [1, 2, 3, 4, 5, 6];
        let mut a = [0u8; 2];
        let mut b = [0u8; 4];
        {
            let mut outputs: Vec<&mut [u8]> = vec![&mut a, &mut b];
            run_builtin_copy(&[&input], &mut outputs);
        }
        assert_eq!(a, [1, 2]);
        assert_eq!(b, [3, 4, 5, 6]);
    }

    #[test]
    fn joins_several_inputs_into_one_output() {
        let a: [u8; 2] = [1, 2];
        let b: [u8; 2] = [3, 4];
        let mut out = [0u8; 4];
        {
            let mut outputs: Vec<&mut [u8]> = vec![&mut out];
            run_builtin_copy(&[&a, &b], &mut outputs);
        }
        assert_eq!(out, [1, 2, 3, 4]);
    }

    #[test]
    fn no_outputs_is_a_no_op() {
        let input: [u8; 2] = [9, 9];
        run_builtin_copy(&[&input], &mut []);
    }
}
