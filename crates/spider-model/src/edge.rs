// SPDX-License-Identifier: Apache-2.0
//! Edges and the delays attached to them.

use spider_expr::Expression;

/// A non-negative-integer-valued initial-tokens attachment on an [`Edge`].
#[derive(Debug, Clone)]
pub struct Delay {
    value: i64,
    setter: Option<(usize, usize)>,
    getter: Option<(usize, usize)>,
    persistent: bool,
    /// Number of past iteration generations this delay's buffer keeps
    /// alive at once. `1` for an ordinary persistent delay; a
    /// local-persistent delay declares a higher count to window across
    /// several iterations.
    level_count: usize,
}

impl Delay {
    pub(crate) fn new(
        value: i64,
        setter: Option<(usize, usize)>,
        getter: Option<(usize, usize)>,
        persistent: bool,
    ) -> Self {
        Self::with_level_count(value, setter, getter, persistent, 1)
    }

    pub(crate) fn with_level_count(
        value: i64,
        setter: Option<(usize, usize)>,
        getter: Option<(usize, usize)>,
        persistent: bool,
        level_count: usize,
    ) -> Self {
        Self {
            value,
            setter,
            getter,
            persistent,
            level_count,
        }
    }

    /// Number of iteration generations this delay's buffer windows across.
    pub fn level_count(&self) -> usize {
        self.level_count
    }

    /// Number of initial tokens this delay materializes.
    pub fn value(&self) -> i64 {
        self.value
    }

    /// The (vertex, port) that supplies this delay's initial tokens, if any.
    pub fn setter(&self) -> Option<(usize, usize)> {
        self.setter
    }

    /// The (vertex, port) that consumes this delay's final tokens, if any.
    pub fn getter(&self) -> Option<(usize, usize)> {
        self.getter
    }

    /// `true` if this delay's buffer survives across top-graph iterations.
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }
}

/// A directed connection between two vertex ports, carrying rate
/// expressions evaluated against the owning graph's parameters.
#[derive(Debug, Clone)]
pub struct Edge {
    index: usize,
    src_vertex: usize,
    src_port: usize,
    src_rate: Expression,
    snk_vertex: usize,
    snk_port: usize,
    snk_rate: Expression,
    delay: Option<Delay>,
}

impl Edge {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        index: usize,
        src_vertex: usize,
        src_port: usize,
        src_rate: Expression,
        snk_vertex: usize,
        snk_port: usize,
        snk_rate: Expression,
    ) -> Self {
        Self {
            index,
            src_vertex,
            src_port,
            src_rate,
            snk_vertex,
            snk_port,
            snk_rate,
            delay: None,
        }
    }

    /// This edge's stable index within its owner graph.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Source vertex index.
    pub fn src_vertex(&self) -> usize {
        self.src_vertex
    }

    /// Source port index.
    pub fn src_port(&self) -> usize {
        self.src_port
    }

    /// The compiled source-rate expression.
    pub fn src_rate(&self) -> &Expression {
        &self.src_rate
    }

    /// Sink vertex index.
    pub fn snk_vertex(&self) -> usize {
        self.snk_vertex
    }

    /// Sink port index.
    pub fn snk_port(&self) -> usize {
        self.snk_port
    }

    /// The compiled sink-rate expression.
    pub fn snk_rate(&self) -> &Expression {
        &self.snk_rate
    }

    /// This edge's delay, if any.
    pub fn delay(&self) -> Option<&Delay> {
        self.delay.as_ref()
    }

    /// `true` iff source and sink vertex indices are equal.
    pub fn is_self_loop(&self) -> bool {
        self.src_vertex == self.snk_vertex
    }

    pub(crate) fn attach_delay(&mut self, delay: Delay) {
        self.delay = Some(delay);
    }
}
