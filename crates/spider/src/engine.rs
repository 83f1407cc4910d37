// SPDX-License-Identifier: Apache-2.0
//! The entry point: transforms the top graph into a firing DAG, schedules
//! and maps it, validates FIFO placement, and drives a generation through
//! the GRT/LRT coordinator.

use std::collections::HashMap;
use std::sync::Arc;

use spider_fifo::FifoArena;
use spider_model::Graph;
use spider_platform::Platform;
use spider_runtime::{build_fifos, Grt};
use spider_sched::{greedy_schedule, list_schedule, CostModel, Schedule, SchedulingPolicy};
use spider_srt::{splice_subgraph, transform, BoundaryContext, FiringDag, FutureJob, SrtConfig};
use tracing::instrument;

use crate::config::RuntimeConfig;
use crate::error::SpiderError;
use crate::export::{GanttExporter, GraphExporter, NullGanttExporter, NullGraphExporter};

/// Bytes a single token occupies in a FIFO. The model only ever carries
/// integer token counts; this runtime backs every token with one `i64`.
const TOKEN_BYTES: usize = std::mem::size_of::<i64>();

/// What one top-graph generation produced.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub dag: FiringDag,
    pub schedule: Schedule,
    /// Output-parameter values configuration-actor firings produced this
    /// generation, keyed by firing index, each pair being
    /// `(vertex output_params() slot, value)`.
    pub collected_params: HashMap<usize, Vec<(usize, i64)>>,
}

/// The full record of a [`Spider::run`] call.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub generations: Vec<GenerationReport>,
}

/// Owns the graph and platform for one run and drives the coordinator
/// across however many top-graph generations the configuration calls for.
///
/// Each generation transforms the top graph, then recursively expands every
/// `GRAPH` vertex `spider_srt::transform` left as a `static_jobs` entry:
/// re-running the transformer on that vertex's subgraph instance and
/// splicing the result into the generation's firing DAG in its place. A
/// `GRAPH` vertex still gated by an unresolved dynamic parameter produces no
/// firing this generation; it is retried automatically once a
/// configuration-actor firing resolves that parameter and the next
/// generation's transform sees it as ungated.
pub struct Spider {
    platform: Platform,
    graph: Graph,
    config: RuntimeConfig,
    graph_exporter: Box<dyn GraphExporter>,
    gantt_exporter: Box<dyn GanttExporter>,
}

impl Spider {
    pub fn new(platform: Platform, graph: Graph, config: RuntimeConfig) -> Self {
        Self {
            platform,
            graph,
            config,
            graph_exporter: Box::new(NullGraphExporter),
            gantt_exporter: Box::new(NullGanttExporter),
        }
    }

    pub fn with_graph_exporter(mut self, exporter: impl GraphExporter + 'static) -> Self {
        self.graph_exporter = Box::new(exporter);
        self
    }

    pub fn with_gantt_exporter(mut self, exporter: impl GanttExporter + 'static) -> Self {
        self.gantt_exporter = Box::new(exporter);
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Runs the configured number of top-graph generations against `cost`,
    /// feeding configuration-actor outputs collected in one generation back
    /// into the graph's dynamic parameters before the next.
    #[instrument(skip(self, cost))]
    pub fn run<C: CostModel>(&mut self, cost: &C) -> Result<RunReport, SpiderError> {
        let pe_ids: Vec<usize> = self.platform.pes().iter().map(|pe| pe.index()).collect();
        let grt = Grt::spawn(self.platform.pes(), Arc::new(self.platform.kernels().clone()));

        let mut report = RunReport::default();
        let generation_count = self.config.generation_count();
        for _ in 0..generation_count {
            let srt_config = SrtConfig { fifo_allocator: self.config.fifo_allocator, ..SrtConfig::default() };
            let top = transform(&self.graph, &Vec::new(), &BoundaryContext::default(), &srt_config, 0)?;
            let (dag, owner_path) = self.expand_hierarchy(top, &srt_config)?;

            let schedule = match self.config.scheduling_policy {
                SchedulingPolicy::List => list_schedule(&dag, &pe_ids, cost, self.config.mapping_policy)?,
                SchedulingPolicy::Greedy => greedy_schedule(&dag, &pe_ids, cost, self.config.mapping_policy)?,
            };

            self.validate_fifo_placement(&dag, &schedule)?;

            let fifos = build_fifos(&dag, |_edge| TOKEN_BYTES);
            let firing_params = |firing_index: usize| self.firing_input_params(&dag, &owner_path, firing_index);
            let output_param_count = |firing_index: usize| self.firing_output_param_count(&dag, &owner_path, firing_index);
            let collected = grt.run_generation(&dag, &schedule, &fifos, firing_params, output_param_count)?;

            self.apply_collected_params(&dag, &owner_path, &collected)?;

            if self.config.export_dot {
                self.graph_exporter.export(&dag);
            }
            if self.config.export_gantt {
                self.gantt_exporter.export(&schedule);
            }

            report.generations.push(GenerationReport { dag, schedule, collected_params: collected });
        }

        grt.shutdown()?;
        Ok(report)
    }

    /// Recursively expands every `GRAPH`-vertex `static_jobs` entry `top`
    /// produced, splicing each subgraph instance's own firing DAG in place
    /// of the placeholder firing `spider_srt::transform` cloned for it.
    /// Returns the fully spliced DAG alongside, for every firing in it, the
    /// path of subgraph-vertex indices (from the top graph down) locating
    /// the [`Graph`] that firing's source vertex actually lives in.
    fn expand_hierarchy(&self, top: spider_srt::SrtOutput, srt_config: &SrtConfig) -> Result<(FiringDag, Vec<Vec<usize>>), SpiderError> {
        let mut dag = top.dag;
        let mut owner_path = vec![Vec::new(); dag.firings().len()];
        let mut stack: Vec<(Vec<usize>, FutureJob)> = top.static_jobs.into_iter().map(|job| (Vec::new(), job)).collect();

        while let Some((path, job)) = stack.pop() {
            let Some(subgraph) = self.resolve_subgraph(&path, job.subgraph_vertex) else {
                continue;
            };
            let mut child_path = path;
            child_path.push(job.subgraph_vertex);
            let depth = child_path.len();

            let sub_out = transform(subgraph, &job.param_overrides, &job.boundary, srt_config, depth)?;
            let added = sub_out.dag.firings().len();
            let offset = splice_subgraph(&mut dag, job.placeholder_firing, sub_out.dag, &sub_out.input_links, &sub_out.output_links)?;
            owner_path.extend(std::iter::repeat(child_path.clone()).take(added));

            for mut nested in sub_out.static_jobs {
                if nested.placeholder_firing != usize::MAX {
                    nested.placeholder_firing += offset;
                }
                stack.push((child_path.clone(), nested));
            }
        }

        Ok((dag, owner_path))
    }

    /// Walks `path` (a sequence of `GRAPH`-vertex indices, shallowest
    /// first) from the top graph down to the [`Graph`] owning
    /// `subgraph_vertex`, and returns that vertex's bound subgraph.
    fn resolve_subgraph(&self, path: &[usize], subgraph_vertex: usize) -> Option<&Graph> {
        let mut g = &self.graph;
        for &v in path {
            let sub_index = g.vertex(v)?.subgraph()?;
            g = g.subgraphs().get(sub_index)?;
        }
        let sub_index = g.vertex(subgraph_vertex)?.subgraph()?;
        g.subgraphs().get(sub_index)
    }

    fn resolve_graph(&self, path: &[usize]) -> Option<&Graph> {
        let mut g = &self.graph;
        for &v in path {
            let sub_index = g.vertex(v)?.subgraph()?;
            g = g.subgraphs().get(sub_index)?;
        }
        Some(g)
    }

    fn resolve_graph_mut(&mut self, path: &[usize]) -> Option<&mut Graph> {
        let mut g = &mut self.graph;
        for &v in path {
            let sub_index = g.vertex(v)?.subgraph()?;
            g = g.subgraph_mut(sub_index)?;
        }
        Some(g)
    }

    fn validate_fifo_placement(&self, dag: &FiringDag, schedule: &Schedule) -> Result<(), SpiderError> {
        let Some(cluster) = self.platform.cluster(0) else {
            return Ok(());
        };
        let memory = cluster.memory_interface();
        let mut arena = FifoArena::new(memory.size, memory.alignment);
        spider_fifo::allocate(dag, schedule, |_edge| TOKEN_BYTES, self.config.fifo_allocator, &mut arena)?;
        Ok(())
    }

    fn firing_input_params(&self, dag: &FiringDag, owner_path: &[Vec<usize>], firing_index: usize) -> Vec<i64> {
        let Some(firing) = dag.firing(firing_index) else {
            return Vec::new();
        };
        let Some(owner) = owner_path.get(firing_index).and_then(|path| self.resolve_graph(path)) else {
            return Vec::new();
        };
        let Some(vertex) = owner.vertex(firing.source_vertex()) else {
            return Vec::new();
        };
        vertex.input_params().iter().filter_map(|&param| owner.param(param).and_then(|p| p.resolved())).collect()
    }

    fn firing_output_param_count(&self, dag: &FiringDag, owner_path: &[Vec<usize>], firing_index: usize) -> usize {
        let Some(firing) = dag.firing(firing_index) else { return 0 };
        let Some(owner) = owner_path.get(firing_index).and_then(|path| self.resolve_graph(path)) else {
            return 0;
        };
        owner.vertex(firing.source_vertex()).map_or(0, |vertex| vertex.output_params().len())
    }

    fn apply_collected_params(
        &mut self,
        dag: &FiringDag,
        owner_path: &[Vec<usize>],
        collected: &HashMap<usize, Vec<(usize, i64)>>,
    ) -> Result<(), SpiderError> {
        for (&firing_index, values) in collected {
            let Some(firing) = dag.firing(firing_index) else { continue };
            let Some(path) = owner_path.get(firing_index) else { continue };
            let Some(owner) = self.resolve_graph_mut(path) else { continue };
            let Some(vertex) = owner.vertex(firing.source_vertex()) else { continue };
            let output_params = vertex.output_params().to_vec();
            for &(slot, value) in values {
                if let Some(&param) = output_params.get(slot) {
                    owner.set_dynamic_param(param, value)?;
                }
            }
        }
        Ok(())
    }
}
