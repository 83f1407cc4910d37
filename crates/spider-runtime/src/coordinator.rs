// SPDX-License-Identifier: Apache-2.0
//! The global runtime thread: builds task messages, dispatches them once
//! dependencies are satisfied, and collects completions.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use spider_platform::{KernelTable, ProcessingElement};
use spider_sched::Schedule;
use spider_srt::{DagEdge, FiringDag};
use tracing::instrument;

use crate::error::RuntimeError;
use crate::fifo::Fifo;
use crate::lrt::Lrt;
use crate::message::{FifoHandle, TaskMessage};
use crate::notification::Notification;

/// Allocates one execution-time [`Fifo`] per edge of `dag`, sized
/// `edge.rate() * token_bytes(edge)`; zero-rate (void) edges get an empty
/// buffer and never touch the token count in `token_bytes`.
pub fn build_fifos(dag: &FiringDag, token_bytes: impl Fn(&DagEdge) -> usize) -> Vec<Fifo> {
    dag.edges()
        .iter()
        .map(|edge| {
            if edge.rate() == 0 {
                Fifo::new(0)
            } else {
                Fifo::new(edge.rate() as usize * token_bytes(edge))
            }
        })
        .collect()
}

fn kernel_id_for(firing: &spider_srt::Firing) -> Option<usize> {
    spider_platform::reserved_kernel_id(firing.subtype()).or_else(|| firing.kernel())
}

fn predecessors_and_successors(dag: &FiringDag) -> (Vec<Vec<usize>>, Vec<Vec<usize>>) {
    let n = dag.firings().len();
    let mut preds = vec![Vec::new(); n];
    let mut succs = vec![Vec::new(); n];
    for edge in dag.edges() {
        preds[edge.snk_firing()].push(edge.src_firing());
        succs[edge.src_firing()].push(edge.snk_firing());
    }
    (preds, succs)
}

pub struct Grt {
    dispatch_txs: Vec<Sender<Notification>>,
    completion_rx: Receiver<Notification>,
    handles: Vec<JoinHandle<Result<(), RuntimeError>>>,
}

impl Grt {
    /// Spawns one LRT OS thread per PE in `pes`.
    pub fn spawn(pes: &[ProcessingElement], kernels: Arc<KernelTable>) -> Self {
        let (completion_tx, completion_rx) = mpsc::channel();
        let mut dispatch_txs = Vec::with_capacity(pes.len());
        let mut handles = Vec::with_capacity(pes.len());
        for pe in pes {
            let (dispatch_tx, dispatch_rx) = mpsc::channel();
            let lrt = Lrt::new(pe.index(), dispatch_rx, completion_tx.clone(), Arc::clone(&kernels));
            handles.push(std::thread::spawn(move || lrt.run()));
            dispatch_txs.push(dispatch_tx);
        }
        Self { dispatch_txs, completion_rx, handles }
    }

    /// Dispatches every firing of `dag` to its mapped PE (per `schedule`)
    /// as soon as its dependencies complete, and blocks until the whole
    /// generation is done. Returns the configuration-actor output
    /// parameters produced, keyed by firing index.
    #[instrument(skip(self, dag, schedule, fifos, firing_params, output_param_count))]
    pub fn run_generation(
        &self,
        dag: &FiringDag,
        schedule: &Schedule,
        fifos: &[Fifo],
        firing_params: impl Fn(usize) -> Vec<i64>,
        output_param_count: impl Fn(usize) -> usize,
    ) -> Result<HashMap<usize, Vec<(usize, i64)>>, RuntimeError> {
        let n = dag.firings().len();
        let (preds, succs) = predecessors_and_successors(dag);
        let mut indegree: Vec<usize> = preds.iter().map(Vec::len).collect();

        let mut port_inputs: Vec<Vec<Option<FifoHandle>>> = dag.firings().iter().map(|f| vec![None; f.input_count()]).collect();
        let mut port_outputs: Vec<Vec<Option<FifoHandle>>> = dag.firings().iter().map(|f| vec![None; f.output_count()]).collect();
        for edge in dag.edges() {
            let bytes = fifos[edge.index()].handle();
            if let Some(slot) = port_outputs[edge.src_firing()].get_mut(edge.src_port()) {
                *slot = Some(FifoHandle { edge: edge.index(), bytes: bytes.clone() });
            }
            if let Some(slot) = port_inputs[edge.snk_firing()].get_mut(edge.snk_port()) {
                *slot = Some(FifoHandle { edge: edge.index(), bytes });
            }
        }
        let finish = |slots: Vec<Option<FifoHandle>>| -> Vec<FifoHandle> {
            slots
                .into_iter()
                .map(|slot| slot.unwrap_or_else(|| FifoHandle { edge: usize::MAX, bytes: Fifo::new(0).handle() }))
                .collect()
        };

        let mut dispatched = vec![false; n];
        let mut completed = 0usize;
        let mut collected: HashMap<usize, Vec<(usize, i64)>> = HashMap::new();

        let mut dispatch = |firing_index: usize| -> Result<(), RuntimeError> {
            let firing = &dag.firings()[firing_index];
            let record = schedule.record(firing_index).ok_or(RuntimeError::DispatchFailed { task_id: firing_index, pe: usize::MAX })?;
            let kernel = kernel_id_for(firing).ok_or(RuntimeError::UnknownKernel { firing: firing_index, kernel: usize::MAX })?;
            let task = TaskMessage {
                task_id: firing_index,
                firing: firing_index,
                kernel,
                inputs: finish(std::mem::take(&mut port_inputs[firing_index])),
                outputs: finish(std::mem::take(&mut port_outputs[firing_index])),
                input_params: firing_params(firing_index),
                output_param_count: output_param_count(firing_index),
            };
            let pe = record.pe();
            self.dispatch_txs
                .get(pe)
                .ok_or(RuntimeError::DispatchFailed { task_id: firing_index, pe })?
                .send(Notification::Dispatch(task))
                .map_err(|_| RuntimeError::DispatchFailed { task_id: firing_index, pe })?;
            Ok(())
        };

        for firing_index in 0..n {
            if indegree[firing_index] == 0 {
                dispatch(firing_index)?;
                dispatched[firing_index] = true;
            }
        }

        while completed < n {
            let notification = self.completion_rx.recv().map_err(|_| RuntimeError::CompletionChannelClosed { firing: usize::MAX })?;
            match notification {
                Notification::Complete { task_id, firing, .. } => {
                    let _ = task_id;
                    completed += 1;
                    for &succ in &succs[firing] {
                        indegree[succ] -= 1;
                        if indegree[succ] == 0 && !dispatched[succ] {
                            dispatch(succ)?;
                            dispatched[succ] = true;
                        }
                    }
                }
                Notification::Param { task_id, param, value } => {
                    collected.entry(task_id).or_default().push((param, value));
                }
                Notification::Dispatch(_) | Notification::Terminate => {
                    // These only ever travel GRT -> LRT; never arrive here.
                }
            }
        }

        Ok(collected)
    }

    /// Broadcasts `Terminate` to every LRT and joins their threads,
    /// returning the first error any of them reported.
    pub fn shutdown(self) -> Result<(), RuntimeError> {
        for tx in &self.dispatch_txs {
            let _ = tx.send(Notification::Terminate);
        }
        let mut first_err = None;
        for handle in self.handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) if first_err.is_none() => first_err = Some(err),
                _ => {}
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    use std::sync::Mutex;

    use spider_platform::{MemoryInterface, PeRole, Platform};
    use spider_sched::{list_schedule, MappingPolicy, UniformCostModel};
    use spider_srt::{BoundaryContext, SrtConfig};

    use super::*;

    #[test]
    fn runs_a_two_kernel_pipeline_end_to_end() {
        let mut g = spider_model::Graph::new("g", 0, 0, 0, 0, 0, 0);
        let a = g.add_vertex("source", 0, 1);
        let b = g.add_vertex("sink", 1, 0);
        g.set_allowed_pes(a, vec![0]).unwrap();
        g.set_allowed_pes(b, vec![0]).unwrap();
        g.add_edge(a, 0, "4", b, 0, "4").unwrap();

        let mut platform = Platform::new(1, 1);
        let cluster = platform.create_cluster(1, MemoryInterface { size: 4096, alignment: 8 });
        let pe0 = platform.create_processing_element("cpu", 0, cluster, "pe0", PeRole::Lrt, 0).unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = Arc::clone(&received);
        let source_kernel = platform.kernels_mut().register("source", |_in_params, _out_params, _inputs, outputs| {
            outputs[0].copy_from_slice(&[1, 2, 3, 4]);
        });
        let sink_kernel = platform.kernels_mut().register("sink", move |_in_params, _out_params, inputs, _outputs| {
            *received_clone.lock().expect("test lock poisoned") = inputs[0].to_vec();
        });
        g.bind_kernel(a, source_kernel).unwrap();
        g.bind_kernel(b, sink_kernel).unwrap();

        let out = spider_srt::transform(&g, &vec![], &BoundaryContext::default(), &SrtConfig::default(), 0).unwrap();
        let cost = UniformCostModel { execution_time: 1, cost_per_token: 0 };
        let schedule = list_schedule(&out.dag, &[pe0], &cost, MappingPolicy::BestFit).unwrap();
        let fifos = build_fifos(&out.dag, |_edge| 1);

        let grt = Grt::spawn(platform.pes(), Arc::new(platform.kernels().clone()));
        grt.run_generation(&out.dag, &schedule, &fifos, |_| Vec::new(), |_| 0).unwrap();
        grt.shutdown().unwrap();

        assert_eq!(*received.lock().expect("test lock poisoned"), vec![1, 2, 3, 4]);
    }

    #[test]
    fn a_missing_pe_record_is_a_dispatch_error() {
        let dag = spider_srt::FiringDag::new();
        let schedule = spider_sched::Schedule::default();
        let platform = Platform::new(0, 0);
        let grt = Grt::spawn(platform.pes(), Arc::new(platform.kernels().clone()));
        let result = grt.run_generation(&dag, &schedule, &[], |_| Vec::new(), |_| 0);
        grt.shutdown().unwrap();
        assert!(result.is_ok());
    }
}
