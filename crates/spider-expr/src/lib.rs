// SPDX-License-Identifier: Apache-2.0
//! Parameter expression parsing and evaluation.
//!
//! A Spider parameter may carry a static literal or an expression over the
//! other parameters visible at its scope. This crate compiles such
//! expressions once, ahead of any firing, into a postfix instruction stream
//! that is evaluated cheaply on every subsequent parameter update.

mod error;
mod eval;
mod fold;
mod shunting_yard;
mod token;

pub use error::ExprError;
pub use shunting_yard::ParamResolver;
pub use token::{BinOp, Func, PostfixOp};

use fold::{fold_constants, is_fully_static};

/// A compiled parameter expression.
///
/// Either a fixed value known at construction time, or a postfix program
/// that must be re-evaluated whenever its referenced parameters change.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A value fixed at compile time (a bare literal, or a sub-expression
    /// that folded to a constant because it referenced no parameter).
    Static(f64),
    /// A postfix program over one or more parameters.
    Dynamic(Vec<PostfixOp>),
}

impl Expression {
    /// Builds a static expression from an integer literal.
    pub fn new_literal_int(value: i64) -> Self {
        Expression::Static(value as f64)
    }

    /// Builds a static expression from a floating-point literal.
    pub fn new_literal_float(value: f64) -> Self {
        Expression::Static(value)
    }

    /// Parses and compiles `src`, resolving identifiers against `resolver`.
    ///
    /// Performs shunting-yard parsing followed by constant folding; an
    /// expression referencing no parameter compiles directly to
    /// [`Expression::Static`].
    pub fn parse(src: &str, resolver: &impl ParamResolver) -> Result<Self, ExprError> {
        let postfix = shunting_yard::parse_to_postfix(src, resolver)?;
        if is_fully_static(&postfix) {
            let value = eval::evaluate(&postfix, &[])?;
            return Ok(Expression::Static(value));
        }
        let folded = fold_constants(&postfix);
        if is_fully_static(&folded) {
            let value = eval::evaluate(&folded, &[])?;
            return Ok(Expression::Static(value));
        }
        Ok(Expression::Dynamic(folded))
    }

    /// Returns `true` if this expression requires no parameter vector to
    /// evaluate.
    pub fn is_static(&self) -> bool {
        matches!(self, Expression::Static(_))
    }

    /// Returns the expression's value if it is [`Expression::Static`], or
    /// `None` for a [`Expression::Dynamic`] value. Callers that can supply a
    /// parameter vector should prefer [`Self::evaluate`] instead.
    pub fn value(&self) -> Option<f64> {
        match self {
            Expression::Static(v) => Some(*v),
            Expression::Dynamic(_) => None,
        }
    }

    /// Evaluates the expression against `params`, the current values of the
    /// graph's parameters indexed the same way they were during [`Self::parse`].
    pub fn evaluate(&self, params: &[f64]) -> Result<f64, ExprError> {
        match self {
            Expression::Static(v) => Ok(*v),
            Expression::Dynamic(program) => eval::evaluate(program, params),
        }
    }
}
