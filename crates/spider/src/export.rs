// SPDX-License-Identifier: Apache-2.0
//! DOT graph and Gantt-chart export hooks.
//!
//! Formats are cosmetic and not part of the runtime's contract; only the
//! enable/disable flags on [`crate::RuntimeConfig`] are. The default
//! exporters are no-ops so a host that never asked for artifacts pays
//! nothing for them.

use spider_sched::Schedule;
use spider_srt::FiringDag;

/// Writes a DOT-format rendering of a firing DAG.
pub trait GraphExporter {
    fn export(&self, dag: &FiringDag);
}

/// Writes an SVG Gantt chart of a computed schedule.
pub trait GanttExporter {
    fn export(&self, schedule: &Schedule);
}

/// The default [`GraphExporter`]: does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGraphExporter;

impl GraphExporter for NullGraphExporter {
    fn export(&self, _dag: &FiringDag) {}
}

/// The default [`GanttExporter`]: does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGanttExporter;

impl GanttExporter for NullGanttExporter {
    fn export(&self, _schedule: &Schedule) {}
}
