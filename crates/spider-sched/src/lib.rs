// SPDX-License-Identifier: Apache-2.0
//! Firing-DAG scheduling: ordering firings in time and placing them on
//! processing elements.
//!
//! Takes the [`spider_srt::FiringDag`] produced by the single-rate
//! transformer and produces a [`Schedule`]: a start time, end time and
//! mapped PE for every firing. Two scheduling policies decide firing order
//! ([`SchedulingPolicy`]) and two mapping policies decide PE placement
//! among a firing's candidates ([`MappingPolicy`]); [`CostModel`] supplies
//! the execution and communication cost numbers both rely on.

mod cost;
mod depth;
mod error;
mod mapping;
mod policy;
mod schedule;

pub use cost::{CostModel, UniformCostModel};
pub use depth::{critical_path_remaining, topological_depths};
pub use error::SchedError;
pub use mapping::pick_pe;
pub use policy::{MappingPolicy, SchedulingPolicy};
pub use schedule::{greedy_schedule, list_schedule, FiringRecord, Schedule};
