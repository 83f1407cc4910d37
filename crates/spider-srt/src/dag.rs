// SPDX-License-Identifier: Apache-2.0
//! The firing DAG: the single-rate, directly schedulable graph produced by
//! [`crate::transform`].

use spider_model::VertexSubtype;

/// One concrete instance of a reference-graph vertex.
#[derive(Debug, Clone)]
pub struct Firing {
    index: usize,
    source_vertex: usize,
    subtype: VertexSubtype,
    instance: i64,
    kernel: Option<usize>,
    allowed_pes: Vec<usize>,
    input_count: usize,
    output_count: usize,
}

impl Firing {
    /// This firing's index within its [`FiringDag`].
    pub fn index(&self) -> usize {
        self.index
    }

    /// The reference-graph vertex this firing was cloned from. `usize::MAX`
    /// for firings with no single reference vertex: inserted REPEAT/TAIL
    /// interface adapters, and FORK/JOIN firings inserted during edge
    /// linkage.
    pub fn source_vertex(&self) -> usize {
        self.source_vertex
    }

    pub fn subtype(&self) -> VertexSubtype {
        self.subtype
    }

    /// This firing's instance number within its source vertex's clone block.
    pub fn instance(&self) -> i64 {
        self.instance
    }

    pub fn kernel(&self) -> Option<usize> {
        self.kernel
    }

    pub fn allowed_pes(&self) -> &[usize] {
        &self.allowed_pes
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn output_count(&self) -> usize {
        self.output_count
    }
}

/// A single-rate edge of the firing DAG, carrying a bit-exact token count.
#[derive(Debug, Clone, Copy)]
pub struct DagEdge {
    index: usize,
    src_firing: usize,
    src_port: usize,
    snk_firing: usize,
    snk_port: usize,
    rate: i64,
}

impl DagEdge {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn src_firing(&self) -> usize {
        self.src_firing
    }

    pub fn src_port(&self) -> usize {
        self.src_port
    }

    pub fn snk_firing(&self) -> usize {
        self.snk_firing
    }

    pub fn snk_port(&self) -> usize {
        self.snk_port
    }

    /// The exact number of tokens this edge carries per firing-DAG
    /// iteration.
    pub fn rate(&self) -> i64 {
        self.rate
    }
}

/// The firing DAG produced by expanding one transformation job: every
/// vertex has been cloned into its repetition-vector-many instances and
/// every edge has been split down to single-rate connections.
#[derive(Debug, Clone, Default)]
pub struct FiringDag {
    firings: Vec<Firing>,
    edges: Vec<DagEdge>,
}

impl FiringDag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn firings(&self) -> &[Firing] {
        &self.firings
    }

    pub fn edges(&self) -> &[DagEdge] {
        &self.edges
    }

    pub fn firing(&self, index: usize) -> Option<&Firing> {
        self.firings.get(index)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn push_firing(
        &mut self,
        source_vertex: usize,
        subtype: VertexSubtype,
        instance: i64,
        kernel: Option<usize>,
        allowed_pes: Vec<usize>,
        input_count: usize,
        output_count: usize,
    ) -> usize {
        let index = self.firings.len();
        self.firings.push(Firing {
            index,
            source_vertex,
            subtype,
            instance,
            kernel,
            allowed_pes,
            input_count,
            output_count,
        });
        index
    }

    pub(crate) fn push_edge(&mut self, src_firing: usize, src_port: usize, snk_firing: usize, snk_port: usize, rate: i64) -> usize {
        let index = self.edges.len();
        self.edges.push(DagEdge {
            index,
            src_firing,
            src_port,
            snk_firing,
            snk_port,
            rate,
        });
        index
    }

    /// Indices of every edge whose sink is `firing`.
    pub(crate) fn edges_into(&self, firing: usize) -> Vec<usize> {
        self.edges.iter().filter(|e| e.snk_firing == firing).map(|e| e.index).collect()
    }

    /// Indices of every edge whose source is `firing`.
    pub(crate) fn edges_out_of(&self, firing: usize) -> Vec<usize> {
        self.edges.iter().filter(|e| e.src_firing == firing).map(|e| e.index).collect()
    }

    /// Redirects `edge`'s sink to `(firing, port)`, leaving its rate and
    /// source untouched.
    pub(crate) fn redirect_snk(&mut self, edge: usize, firing: usize, port: usize) {
        self.edges[edge].snk_firing = firing;
        self.edges[edge].snk_port = port;
    }

    /// Redirects `edge`'s source to `(firing, port)`, leaving its rate and
    /// sink untouched.
    pub(crate) fn redirect_src(&mut self, edge: usize, firing: usize, port: usize) {
        self.edges[edge].src_firing = firing;
        self.edges[edge].src_port = port;
    }

    /// Turns `firing` into a zero-port no-op once every edge that used to
    /// touch it has been redirected elsewhere. Used to retire a `GRAPH`
    /// vertex's placeholder firing after [`crate::splice_subgraph`] has
    /// spliced its subgraph in and rewired its boundary edges: the
    /// placeholder itself cannot be removed (firing indices are positional),
    /// so it is reclassified to `JOIN` with no ports instead, which the
    /// scheduler treats as runtime-inserted and the LRT dispatches to the
    /// builtin copy kernel, a no-op over empty input/output slices.
    pub(crate) fn neutralize(&mut self, firing: usize) {
        let f = &mut self.firings[firing];
        f.subtype = VertexSubtype::Join;
        f.kernel = None;
        f.allowed_pes.clear();
        f.input_count = 0;
        f.output_count = 0;
    }

    /// Appends another DAG's firings and edges, offsetting every index by
    /// this DAG's current size, and returns the firing-index offset that
    /// was applied (so the caller can remap any indices it held onto, such
    /// as [`crate::InterfaceLink`] firing bases).
    pub(crate) fn splice(&mut self, other: FiringDag) -> usize {
        let offset = self.firings.len();
        for mut firing in other.firings {
            firing.index += offset;
            self.firings.push(firing);
        }
        for mut edge in other.edges {
            edge.src_firing += offset;
            edge.snk_firing += offset;
            self.edges.push(edge);
        }
        offset
    }
}
