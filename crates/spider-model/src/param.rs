// SPDX-License-Identifier: Apache-2.0
//! Graph parameters and their five-way classification.

use spider_expr::Expression;

/// The kind-specific payload of a [`Parameter`].
#[derive(Debug, Clone)]
pub enum ParamKind {
    /// A literal integer fixed at construction time.
    Static(i64),
    /// A compiled expression over earlier static parameters of the same
    /// graph; its value is folded once and never changes.
    StaticExpr(Expression),
    /// Set at run time by a configuration actor's output; holds no
    /// expression, only whatever value the last completion delivered.
    Dynamic,
    /// An expression whose inputs include at least one dynamic parameter;
    /// re-evaluated every iteration against the current snapshot.
    DynamicDependant(Expression),
    /// Refers to a parameter of the containing graph by stable index.
    Inherited {
        /// The parent graph's parameter index.
        parent_index: usize,
    },
}

/// A named, indexed parameter of a [`crate::Graph`].
#[derive(Debug, Clone)]
pub struct Parameter {
    index: usize,
    name: String,
    kind: ParamKind,
    /// The last known concrete value, if any. Populated eagerly for
    /// `Static`/`StaticExpr` at construction, and by the coordinator for
    /// `Dynamic`/`DynamicDependant` once resolvable.
    resolved: Option<i64>,
}

impl Parameter {
    pub(crate) fn new(index: usize, name: String, kind: ParamKind, resolved: Option<i64>) -> Self {
        Self {
            index,
            name,
            kind,
            resolved,
        }
    }

    /// This parameter's stable index within its owning graph.
    pub fn index(&self) -> usize {
        self.index
    }

    /// This parameter's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This parameter's classification.
    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    /// The last known concrete value, if one has been resolved.
    pub fn resolved(&self) -> Option<i64> {
        self.resolved
    }

    /// `true` for `Static` and `StaticExpr`, which never change after
    /// construction.
    pub fn is_static(&self) -> bool {
        matches!(self.kind, ParamKind::Static(_) | ParamKind::StaticExpr(_))
    }

    /// `true` for `Dynamic` and `DynamicDependant`, which require a
    /// configuration-actor completion before they hold a value.
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self.kind,
            ParamKind::Dynamic | ParamKind::DynamicDependant(_)
        )
    }

    /// Records a freshly delivered value for a dynamic parameter.
    pub(crate) fn set_resolved(&mut self, value: i64) {
        self.resolved = Some(value);
    }
}
