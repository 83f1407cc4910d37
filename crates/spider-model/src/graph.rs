// SPDX-License-Identifier: Apache-2.0
//! The PiSDF graph: vertices, edges, parameters and nested subgraphs.

use spider_expr::{Expression, ParamResolver};
use tracing::instrument;

use crate::edge::{Delay, Edge};
use crate::error::ModelError;
use crate::param::{ParamKind, Parameter};
use crate::subtype::VertexSubtype;
use crate::vertex::Vertex;

/// A hierarchical, parameterized dataflow graph.
///
/// Vertices, edges and parameters live in dense arenas addressed by stable
/// index; removing a vertex tombstones its slot in `removed` rather than
/// shifting later indices, so an index handed out once remains valid for
/// the graph's lifetime.
#[derive(Debug, Clone)]
pub struct Graph {
    name: String,
    vertices: Vec<Vertex>,
    removed: Vec<bool>,
    edges: Vec<Edge>,
    params: Vec<Parameter>,
    input_interfaces: Vec<usize>,
    output_interfaces: Vec<usize>,
    config_actors: Vec<usize>,
    subgraphs: Vec<Graph>,
}

struct ParamNameResolver<'a>(&'a [Parameter]);

impl ParamResolver for ParamNameResolver<'_> {
    fn resolve(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|p| p.name() == name)
    }
}

impl Graph {
    /// Creates an empty graph, reserving arena capacity for the expected
    /// actor, edge, parameter, interface and config-actor counts.
    pub fn new(
        name: impl Into<String>,
        actor_count: usize,
        edge_count: usize,
        param_count: usize,
        input_interface_count: usize,
        output_interface_count: usize,
        config_actor_count: usize,
    ) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::with_capacity(actor_count + input_interface_count + output_interface_count),
            removed: Vec::with_capacity(actor_count),
            edges: Vec::with_capacity(edge_count),
            params: Vec::with_capacity(param_count),
            input_interfaces: Vec::with_capacity(input_interface_count),
            output_interfaces: Vec::with_capacity(output_interface_count),
            config_actors: Vec::with_capacity(config_actor_count),
            subgraphs: Vec::new(),
        }
    }

    /// This graph's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterates over the vertices that have not been removed.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices
            .iter()
            .enumerate()
            .filter(move |(i, _)| !self.removed[*i])
            .map(|(_, v)| v)
    }

    /// Looks up a vertex by stable index.
    pub fn vertex(&self, index: usize) -> Option<&Vertex> {
        if self.removed.get(index).copied().unwrap_or(true) {
            return None;
        }
        self.vertices.get(index)
    }

    /// Iterates over all edges, including ones touching a removed vertex.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Iterates over edges whose source and sink vertices have not been
    /// removed. Removing a vertex tombstones only its own slot (§4.B), so
    /// any edge that referenced it must be filtered out here rather than at
    /// removal time.
    pub fn live_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(move |e| self.vertex(e.src_vertex()).is_some() && self.vertex(e.snk_vertex()).is_some())
    }

    /// Looks up an edge by stable index.
    pub fn edge(&self, index: usize) -> Option<&Edge> {
        self.edges.get(index)
    }

    /// Iterates over this graph's parameters.
    pub fn params(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// Looks up a parameter by stable index.
    pub fn param(&self, index: usize) -> Option<&Parameter> {
        self.params.get(index)
    }

    /// Input-interface vertex indices, in declaration order.
    pub fn input_interfaces(&self) -> &[usize] {
        &self.input_interfaces
    }

    /// Output-interface vertex indices, in declaration order.
    pub fn output_interfaces(&self) -> &[usize] {
        &self.output_interfaces
    }

    /// Config-actor vertex indices, in declaration order.
    pub fn config_actors(&self) -> &[usize] {
        &self.config_actors
    }

    /// This graph's nested subgraphs, indexed by `Vertex::subgraph`.
    pub fn subgraphs(&self) -> &[Graph] {
        &self.subgraphs
    }

    /// Mutable access to a nested subgraph, for the SRT and splitting pass.
    pub fn subgraph_mut(&mut self, index: usize) -> Option<&mut Graph> {
        self.subgraphs.get_mut(index)
    }

    /// A graph is dynamic iff it owns at least one configuration actor or
    /// any of its subgraphs is dynamic.
    pub fn is_dynamic(&self) -> bool {
        !self.config_actors.is_empty() || self.subgraphs.iter().any(Graph::is_dynamic)
    }

    /// Looks up a parameter by name in the local list, walking outward
    /// through `INHERITED` chains is the caller's responsibility since this
    /// graph has no handle to its parent; see [`Self::resolve_inherited`].
    pub fn param_by_name(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name() == name)
    }

    fn next_vertex_index(&self) -> usize {
        self.vertices.len()
    }

    fn push_vertex(&mut self, vertex: Vertex) -> usize {
        let index = vertex.index();
        self.vertices.push(vertex);
        self.removed.push(false);
        index
    }

    /// Adds a user-authored actor vertex (`NORMAL` subtype).
    pub fn add_vertex(&mut self, name: impl Into<String>, in_count: usize, out_count: usize) -> usize {
        let index = self.next_vertex_index();
        self.push_vertex(Vertex::new(index, name.into(), VertexSubtype::Normal, in_count, out_count))
    }

    /// Adds a configuration-actor vertex, recording it in the fast-lookup list.
    pub fn add_config_actor(&mut self, name: impl Into<String>, in_count: usize, out_count: usize) -> usize {
        let index = self.next_vertex_index();
        let idx = self.push_vertex(Vertex::new(index, name.into(), VertexSubtype::Config, in_count, out_count));
        self.config_actors.push(idx);
        idx
    }

    /// Adds a runtime-inserted helper vertex of the given subtype.
    ///
    /// # Panics
    /// Panics if `subtype` is not one of the runtime-inserted kinds; host
    /// code should use [`Self::add_vertex`]/[`Self::add_config_actor`]/
    /// [`Self::add_interface`]/[`Self::add_subgraph`] for the others.
    pub fn add_runtime_vertex(
        &mut self,
        name: impl Into<String>,
        subtype: VertexSubtype,
        in_count: usize,
        out_count: usize,
    ) -> usize {
        assert!(
            subtype.is_runtime_inserted(),
            "add_runtime_vertex called with a non-runtime subtype"
        );
        let index = self.next_vertex_index();
        self.push_vertex(Vertex::new(index, name.into(), subtype, in_count, out_count))
    }

    /// Adds an `EXTERN_IN` or `EXTERN_OUT` boundary vertex.
    pub fn add_extern(&mut self, name: impl Into<String>, is_input: bool, port_count: usize) -> usize {
        let subtype = if is_input {
            VertexSubtype::ExternIn
        } else {
            VertexSubtype::ExternOut
        };
        let index = self.next_vertex_index();
        let (in_count, out_count) = if is_input { (0, port_count) } else { (port_count, 0) };
        self.push_vertex(Vertex::new(index, name.into(), subtype, in_count, out_count))
    }

    /// Adds a graph-boundary interface (`INPUT` or `OUTPUT`), recording it
    /// in the matching interface list.
    pub fn add_interface(&mut self, name: impl Into<String>, is_input: bool) -> usize {
        let subtype = if is_input { VertexSubtype::Input } else { VertexSubtype::Output };
        let (in_count, out_count) = if is_input { (0, 1) } else { (1, 0) };
        let index = self.next_vertex_index();
        let idx = self.push_vertex(Vertex::new(index, name.into(), subtype, in_count, out_count));
        if is_input {
            self.input_interfaces.push(idx);
        } else {
            self.output_interfaces.push(idx);
        }
        idx
    }

    /// Adds a nested subgraph, installing a `GRAPH` vertex that represents
    /// it from the outside.
    pub fn add_subgraph(&mut self, name: impl Into<String>, in_count: usize, out_count: usize, subgraph: Graph) -> usize {
        let index = self.next_vertex_index();
        let idx = self.push_vertex(Vertex::new(index, name.into(), VertexSubtype::Graph, in_count, out_count));
        let sub_index = self.subgraphs.len();
        self.subgraphs.push(subgraph);
        self.vertices[idx].bind_subgraph(sub_index);
        idx
    }

    /// Adds a vertex that is a structural copy of `other` (subtype, port
    /// counts, kernel binding, allowed-PE set), at a fresh index in this
    /// graph. Used when the dynamic-subgraph splitting pass relocates a
    /// vertex from one graph to another.
    pub(crate) fn clone_vertex_into(&mut self, other: &Vertex) -> usize {
        let index = self.next_vertex_index();
        let mut v = Vertex::new(index, other.name().to_string(), other.subtype(), other.input_count(), other.output_count());
        if let Some(kernel) = other.kernel() {
            v.bind_kernel(kernel);
        }
        v.set_allowed_pes(other.allowed_pes().to_vec());
        self.push_vertex(v)
    }

    /// Removes a vertex. Its slot is tombstoned, not compacted; every other
    /// index remains valid.
    pub fn remove_vertex(&mut self, index: usize) -> Result<(), ModelError> {
        if self.removed.get(index).copied().unwrap_or(true) {
            return Err(ModelError::UnknownIndex { kind: "vertex", index });
        }
        self.removed[index] = true;
        Ok(())
    }

    /// Binds a runtime kernel id to a `NORMAL` or `CONFIG` vertex.
    ///
    /// Per the model's design, a second call for the same vertex is a
    /// [`ModelError::DuplicateRuntimeKernel`] rather than silently replacing
    /// the first binding.
    pub fn bind_kernel(&mut self, vertex: usize, kernel: usize) -> Result<(), ModelError> {
        let v = self
            .vertices
            .get_mut(vertex)
            .filter(|_| !self.removed.get(vertex).copied().unwrap_or(true))
            .ok_or(ModelError::UnknownIndex { kind: "vertex", index: vertex })?;
        if v.kernel().is_some() {
            return Err(ModelError::DuplicateRuntimeKernel { vertex });
        }
        v.bind_kernel(kernel);
        Ok(())
    }

    /// Attaches a parameter as one of `vertex`'s concrete kernel input
    /// values, appended to its input-parameter array in call order.
    pub fn add_input_param_to_vertex(&mut self, vertex: usize, param: usize) -> Result<(), ModelError> {
        self.param(param).ok_or(ModelError::UnknownIndex { kind: "parameter", index: param })?;
        let v = self.vertex_mut(vertex)?;
        v.push_input_param(param);
        Ok(())
    }

    /// Attaches a parameter `vertex` depends on only to refine its own port
    /// rates, without passing it through to the kernel's input-parameter
    /// array.
    pub fn add_input_refinement_param_to_vertex(&mut self, vertex: usize, param: usize) -> Result<(), ModelError> {
        self.param(param).ok_or(ModelError::UnknownIndex { kind: "parameter", index: param })?;
        let v = self.vertex_mut(vertex)?;
        v.push_input_refinement_param(param);
        Ok(())
    }

    /// Declares that `vertex` (which must be a `CONFIG` actor) produces
    /// `param` as one of its outputs, appended to its output-parameter
    /// array in call order.
    pub fn add_output_param_to_vertex(&mut self, vertex: usize, param: usize) -> Result<(), ModelError> {
        self.param(param).ok_or(ModelError::UnknownIndex { kind: "parameter", index: param })?;
        let v = self.vertex_mut(vertex)?;
        if v.subtype() != VertexSubtype::Config {
            return Err(ModelError::OutputParamOnNonConfigActor { vertex });
        }
        v.push_output_param(param);
        Ok(())
    }

    fn vertex_mut(&mut self, vertex: usize) -> Result<&mut Vertex, ModelError> {
        self.vertices
            .get_mut(vertex)
            .filter(|_| !self.removed.get(vertex).copied().unwrap_or(true))
            .ok_or(ModelError::UnknownIndex { kind: "vertex", index: vertex })
    }

    /// Sets the allowed-PE set for a vertex's mapping decision.
    pub fn set_allowed_pes(&mut self, vertex: usize, pes: Vec<usize>) -> Result<(), ModelError> {
        let v = self
            .vertices
            .get_mut(vertex)
            .ok_or(ModelError::UnknownIndex { kind: "vertex", index: vertex })?;
        v.set_allowed_pes(pes);
        Ok(())
    }

    fn push_param(&mut self, name: String, kind: ParamKind, resolved: Option<i64>) -> usize {
        let index = self.params.len();
        self.params.push(Parameter::new(index, name, kind, resolved));
        index
    }

    /// Adds a `STATIC` parameter holding a literal integer.
    pub fn add_static_param(&mut self, name: impl Into<String>, value: i64) -> usize {
        self.push_param(name.into(), ParamKind::Static(value), Some(value))
    }

    /// Adds a `STATIC_EXPR` parameter, compiling `expr` against the
    /// parameters already declared on this graph.
    #[instrument(skip(self, name, expr))]
    pub fn add_static_expr_param(&mut self, name: impl Into<String>, expr: &str) -> Result<usize, ModelError> {
        let resolver = ParamNameResolver(&self.params);
        let compiled = Expression::parse(expr, &resolver)?;
        let value = compiled.evaluate(&self.resolved_values())?;
        let name = name.into();
        Ok(self.push_param(name, ParamKind::StaticExpr(compiled), Some(value as i64)))
    }

    /// Adds a `DYNAMIC` parameter, whose value is set at run time by a
    /// configuration actor's output.
    pub fn add_dynamic_param(&mut self, name: impl Into<String>) -> usize {
        self.push_param(name.into(), ParamKind::Dynamic, None)
    }

    /// Adds a `DYNAMIC_DEPENDANT` parameter: an expression that references
    /// at least one dynamic parameter and must be re-evaluated every
    /// iteration.
    pub fn add_dynamic_dependant_param(&mut self, name: impl Into<String>, expr: &str) -> Result<usize, ModelError> {
        let resolver = ParamNameResolver(&self.params);
        let compiled = Expression::parse(expr, &resolver)?;
        Ok(self.push_param(name.into(), ParamKind::DynamicDependant(compiled), None))
    }

    /// Adds an `INHERITED` parameter referring to `parent_index` in the
    /// containing graph's parameter list.
    pub fn add_inherited_param(&mut self, name: impl Into<String>, parent_index: usize) -> usize {
        self.push_param(name.into(), ParamKind::Inherited { parent_index }, None)
    }

    /// Snapshot of every parameter's currently resolved value (0 where
    /// unresolved), in index order — the vector shape [`spider_expr`]
    /// expects for evaluating `StaticExpr`/`DynamicDependant` expressions.
    pub fn resolved_values(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.resolved().unwrap_or(0) as f64).collect()
    }

    /// Records a freshly delivered value for a `DYNAMIC` parameter, then
    /// re-evaluates every `DYNAMIC_DEPENDANT` parameter that follows it.
    pub fn set_dynamic_param(&mut self, index: usize, value: i64) -> Result<(), ModelError> {
        {
            let p = self
                .params
                .get_mut(index)
                .ok_or(ModelError::UnknownIndex { kind: "parameter", index })?;
            if !matches!(p.kind(), ParamKind::Dynamic) {
                return Err(ModelError::ParameterNotFound { name: p.name().to_string() });
            }
            p.set_resolved(value);
        }
        self.reevaluate_dependants()
    }

    /// Overwrites the resolved value of every parameter for which
    /// `overrides` carries `Some`, then re-evaluates every `DYNAMIC_DEPENDANT`
    /// parameter against the new snapshot. Used by the single-rate
    /// transformer to freeze `INHERITED` parameters to their enclosing
    /// instance's concrete values before expanding a subgraph.
    pub fn apply_frozen_params(&mut self, overrides: &[Option<i64>]) -> Result<(), ModelError> {
        for (index, value) in overrides.iter().enumerate() {
            if let (Some(value), Some(p)) = (value, self.params.get_mut(index)) {
                p.set_resolved(*value);
            }
        }
        self.reevaluate_dependants()
    }

    /// `true` if any `DYNAMIC`/`DYNAMIC_DEPENDANT` parameter has no resolved
    /// value yet, i.e. still awaits a configuration-actor completion.
    pub fn has_unresolved_dynamic(&self) -> bool {
        self.params.iter().any(|p| p.is_dynamic() && p.resolved().is_none())
    }

    fn reevaluate_dependants(&mut self) -> Result<(), ModelError> {
        for i in 0..self.params.len() {
            let (expr, values) = match self.params[i].kind() {
                ParamKind::DynamicDependant(e) => (e.clone(), self.resolved_values()),
                _ => continue,
            };
            let value = expr.evaluate(&values)?;
            self.params[i].set_resolved(value as i64);
        }
        Ok(())
    }

    /// Connects `(src_vertex, src_port)` to `(snk_vertex, snk_port)`, with
    /// rate expressions compiled against this graph's parameters.
    #[instrument(skip(self, src_rate, snk_rate))]
    pub fn add_edge(
        &mut self,
        src_vertex: usize,
        src_port: usize,
        src_rate: &str,
        snk_vertex: usize,
        snk_port: usize,
        snk_rate: &str,
    ) -> Result<usize, ModelError> {
        self.check_port(src_vertex, src_port, true)?;
        self.check_port(snk_vertex, snk_port, false)?;
        let resolver = ParamNameResolver(&self.params);
        let src_expr = Expression::parse(src_rate, &resolver)?;
        let snk_expr = Expression::parse(snk_rate, &resolver)?;
        let index = self.edges.len();
        self.edges
            .push(Edge::new(index, src_vertex, src_port, src_expr, snk_vertex, snk_port, snk_expr));
        Ok(index)
    }

    fn check_port(&self, vertex: usize, port: usize, is_output_side: bool) -> Result<(), ModelError> {
        let v = self
            .vertex(vertex)
            .ok_or(ModelError::UnknownIndex { kind: "vertex", index: vertex })?;
        let (count, direction) = if is_output_side {
            (v.output_count(), "output")
        } else {
            (v.input_count(), "input")
        };
        if port >= count {
            return Err(ModelError::PortIndexOutOfRange {
                vertex,
                port,
                direction,
                count,
            });
        }
        let duplicate = self.edges.iter().any(|e| {
            if is_output_side {
                e.src_vertex() == vertex && e.src_port() == port
            } else {
                e.snk_vertex() == vertex && e.snk_port() == port
            }
        });
        if duplicate {
            return Err(ModelError::DuplicatePort { vertex, port, direction });
        }
        Ok(())
    }

    /// Attaches a local (non-persistent) delay to `edge`.
    pub fn add_local_delay(
        &mut self,
        edge: usize,
        value: i64,
        setter: Option<(usize, usize)>,
        getter: Option<(usize, usize)>,
    ) -> Result<(), ModelError> {
        self.attach_delay(edge, value, setter, getter, false)
    }

    /// Attaches a persistent delay to `edge`, whose tokens survive a
    /// top-graph iteration.
    pub fn add_persistent_delay(&mut self, edge: usize, value: i64) -> Result<(), ModelError> {
        self.attach_delay(edge, value, None, None, true)
    }

    /// Attaches a persistent delay that windows across `level_count` past
    /// iteration generations rather than just the previous one.
    pub fn add_local_persistent_delay(&mut self, edge: usize, value: i64, level_count: usize) -> Result<(), ModelError> {
        if value < 0 {
            return Err(ModelError::DynamicDelayValue { edge });
        }
        let e = self
            .edges
            .get_mut(edge)
            .ok_or(ModelError::UnknownIndex { kind: "edge", index: edge })?;
        e.attach_delay(Delay::with_level_count(value, None, None, true, level_count));
        Ok(())
    }

    /// Connects a port pair using already-compiled rate expressions,
    /// bypassing string parsing. Used by the rewrite passes when moving an
    /// edge whose rate expression was compiled against a parameter list
    /// that the destination graph preserves index-for-index (e.g. via
    /// [`Self::add_inherited_param`]).
    pub(crate) fn add_edge_raw(
        &mut self,
        src_vertex: usize,
        src_port: usize,
        src_rate: Expression,
        snk_vertex: usize,
        snk_port: usize,
        snk_rate: Expression,
    ) -> usize {
        let index = self.edges.len();
        self.edges
            .push(Edge::new(index, src_vertex, src_port, src_rate, snk_vertex, snk_port, snk_rate));
        index
    }

    /// Swaps in `new_graph` at `index` within this graph's subgraph list,
    /// returning the graph that was there. Used by the dynamic-subgraph
    /// splitting pass to take a subgraph out for restructuring.
    pub(crate) fn replace_subgraph(&mut self, index: usize, new_graph: Graph) -> Graph {
        std::mem::replace(&mut self.subgraphs[index], new_graph)
    }

    /// Appends a subgraph without creating a `GRAPH` vertex for it,
    /// returning its index in this graph's subgraph list. Paired with
    /// [`Vertex::bind_subgraph`] (via [`Self::bind_vertex_subgraph`]) when a
    /// vertex migrates between graphs along with the subgraph it owns.
    pub(crate) fn push_subgraph(&mut self, g: Graph) -> usize {
        let index = self.subgraphs.len();
        self.subgraphs.push(g);
        index
    }

    pub(crate) fn bind_vertex_subgraph(&mut self, vertex: usize, subgraph_index: usize) {
        if let Some(v) = self.vertices.get_mut(vertex) {
            v.bind_subgraph(subgraph_index);
        }
    }

    pub(crate) fn grow_output_ports(&mut self, vertex: usize, new_count: usize) {
        if let Some(v) = self.vertices.get_mut(vertex) {
            v.set_output_count(new_count);
        }
    }

    pub(crate) fn grow_input_ports(&mut self, vertex: usize, new_count: usize) {
        if let Some(v) = self.vertices.get_mut(vertex) {
            v.set_input_count(new_count);
        }
    }

    fn attach_delay(
        &mut self,
        edge: usize,
        value: i64,
        setter: Option<(usize, usize)>,
        getter: Option<(usize, usize)>,
        persistent: bool,
    ) -> Result<(), ModelError> {
        if value < 0 {
            return Err(ModelError::DynamicDelayValue { edge });
        }
        let e = self
            .edges
            .get_mut(edge)
            .ok_or(ModelError::UnknownIndex { kind: "edge", index: edge })?;
        e.attach_delay(Delay::new(value, setter, getter, persistent));
        Ok(())
    }
}
