// SPDX-License-Identifier: Apache-2.0
//! Spider: a PiSDF dataflow runtime.
//!
//! A host builds a [`spider_model::Graph`] and a [`spider_platform::Platform`]
//! through the free functions in [`builder`], wraps them in a [`Spider`]
//! with a [`RuntimeConfig`], and calls [`Spider::run`]. The run transforms
//! the graph into a firing DAG (`spider-srt`), schedules and maps it
//! (`spider-sched`), validates FIFO placement (`spider-fifo`), and drives
//! the firings to completion over a GRT/LRT coordinator (`spider-runtime`).

pub mod builder;
mod config;
mod engine;
mod error;
mod export;

pub use config::{ExecutionPolicy, FifoAllocatorKind, MappingPolicy, RunMode, RuntimeConfig, RuntimeType, SchedulingPolicy};
pub use engine::{GenerationReport, RunReport, Spider};
pub use error::SpiderError;
pub use export::{GanttExporter, GraphExporter, NullGanttExporter, NullGraphExporter};
