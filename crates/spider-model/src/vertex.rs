// SPDX-License-Identifier: Apache-2.0
//! Vertices: user actors, runtime-inserted helpers, interfaces and subgraphs.

use crate::subtype::VertexSubtype;

/// A vertex inside a [`crate::Graph`], identified by its stable index.
#[derive(Debug, Clone)]
pub struct Vertex {
    index: usize,
    name: String,
    subtype: VertexSubtype,
    input_count: usize,
    output_count: usize,
    kernel: Option<usize>,
    allowed_pes: Vec<usize>,
    /// Index into the owning graph's `subgraphs` vector, set only for
    /// `VertexSubtype::Graph` vertices.
    subgraph: Option<usize>,
    /// Parameter indices this vertex consumes as concrete input values at
    /// firing time, in the order the runtime kernel expects them.
    input_params: Vec<usize>,
    /// Parameter indices this vertex consumes only to refine its own port
    /// rates (never passed to the kernel's input-parameter array).
    input_refinement_params: Vec<usize>,
    /// Parameter indices this vertex produces, in output-parameter-array
    /// order. Only meaningful for `CONFIG` vertices.
    output_params: Vec<usize>,
}

impl Vertex {
    pub(crate) fn new(
        index: usize,
        name: String,
        subtype: VertexSubtype,
        input_count: usize,
        output_count: usize,
    ) -> Self {
        Self {
            index,
            name,
            subtype,
            input_count,
            output_count,
            kernel: None,
            allowed_pes: Vec::new(),
            subgraph: None,
            input_params: Vec::new(),
            input_refinement_params: Vec::new(),
            output_params: Vec::new(),
        }
    }

    /// This vertex's stable index within its owner graph.
    pub fn index(&self) -> usize {
        self.index
    }

    /// This vertex's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This vertex's subtype.
    pub fn subtype(&self) -> VertexSubtype {
        self.subtype
    }

    /// Declared input port count.
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Declared output port count.
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// The registered runtime-kernel id bound to this vertex, if any.
    pub fn kernel(&self) -> Option<usize> {
        self.kernel
    }

    /// The set of PE indices this vertex is allowed to be mapped onto.
    /// Empty means unconstrained until the mapper enforces §4.F's rule that
    /// an explicit empty set (as opposed to "never configured") is an error.
    pub fn allowed_pes(&self) -> &[usize] {
        &self.allowed_pes
    }

    /// The subgraph this vertex represents, for `VertexSubtype::Graph`.
    pub fn subgraph(&self) -> Option<usize> {
        self.subgraph
    }

    /// Parameter indices consumed as this vertex's kernel input-parameter
    /// array, in order.
    pub fn input_params(&self) -> &[usize] {
        &self.input_params
    }

    /// Parameter indices this vertex's own port rates depend on, without
    /// being passed to the kernel.
    pub fn input_refinement_params(&self) -> &[usize] {
        &self.input_refinement_params
    }

    /// Parameter indices this `CONFIG` vertex produces, in
    /// output-parameter-array order.
    pub fn output_params(&self) -> &[usize] {
        &self.output_params
    }

    pub(crate) fn push_input_param(&mut self, param: usize) {
        self.input_params.push(param);
    }

    pub(crate) fn push_input_refinement_param(&mut self, param: usize) {
        self.input_refinement_params.push(param);
    }

    pub(crate) fn push_output_param(&mut self, param: usize) {
        self.output_params.push(param);
    }

    pub(crate) fn bind_kernel(&mut self, kernel: usize) {
        self.kernel = Some(kernel);
    }

    pub(crate) fn set_allowed_pes(&mut self, pes: Vec<usize>) {
        self.allowed_pes = pes;
    }

    pub(crate) fn bind_subgraph(&mut self, subgraph_index: usize) {
        self.subgraph = Some(subgraph_index);
    }

    pub(crate) fn set_output_count(&mut self, count: usize) {
        self.output_count = count;
    }

    pub(crate) fn set_input_count(&mut self, count: usize) {
        self.input_count = count;
    }
}
