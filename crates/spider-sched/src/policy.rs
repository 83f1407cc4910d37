// SPDX-License-Identifier: Apache-2.0
//! The scheduling and mapping policy enumerations.

/// How the scheduler orders ready firings onto PEs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulingPolicy {
    /// Prioritize by topological depth, tie-broken by descending
    /// critical-path-remaining.
    #[default]
    List,
    /// First-ready, first-mapped.
    Greedy,
}

/// How the mapper chooses among a firing's allowed PEs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingPolicy {
    /// Minimize projected end time including queue tail and communication.
    #[default]
    BestFit,
    /// Cycle through the allowed PEs in declaration order.
    RoundRobin,
}
