// SPDX-License-Identifier: Apache-2.0
//! The closed set of vertex subtypes a PiSDF graph can contain.

/// Tag distinguishing what a [`crate::Vertex`] represents and who inserted it.
///
/// `NORMAL` and `CONFIG` are user-supplied and bound to a runtime kernel.
/// `FORK`/`JOIN`/`REPEAT`/`TAIL`/`HEAD`/`DUPLICATE`/`INIT`/`END` are special
/// vertices the single-rate transformer inserts. `INPUT`/`OUTPUT` are
/// graph-boundary interfaces. `GRAPH` is a nested subgraph acting as a
/// vertex from the outside. `DELAY` materializes an edge's initial tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexSubtype {
    Normal,
    Config,
    Fork,
    Join,
    Repeat,
    Tail,
    Head,
    Duplicate,
    Init,
    End,
    ExternIn,
    ExternOut,
    Delay,
    Input,
    Output,
    Graph,
}

impl VertexSubtype {
    /// Runtime-inserted subtypes never carry a user-bound kernel; they are
    /// implemented directly by the executor.
    pub fn is_runtime_inserted(self) -> bool {
        matches!(
            self,
            VertexSubtype::Fork
                | VertexSubtype::Join
                | VertexSubtype::Repeat
                | VertexSubtype::Tail
                | VertexSubtype::Head
                | VertexSubtype::Duplicate
                | VertexSubtype::Init
                | VertexSubtype::End
        )
    }

    /// Whether this subtype is a graph-boundary interface pseudo-vertex.
    pub fn is_interface(self) -> bool {
        matches!(self, VertexSubtype::Input | VertexSubtype::Output)
    }

    /// Whether a vertex of this subtype requires a bound runtime kernel.
    pub fn requires_kernel(self) -> bool {
        matches!(self, VertexSubtype::Normal | VertexSubtype::Config)
    }
}
