// SPDX-License-Identifier: Apache-2.0
//! Expression parse/evaluate errors (spec.md §4.A, §7 "Expression errors").

use thiserror::Error;

/// Errors raised while parsing or evaluating a parameter [`crate::Expression`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    /// Parentheses did not balance.
    #[error("unbalanced parentheses in expression: {text}")]
    UnbalancedParens {
        /// The offending source text.
        text: String,
    },
    /// An identifier did not resolve to a parameter of the enclosing graph.
    #[error("unknown identifier `{name}` in expression")]
    UnknownIdentifier {
        /// The unresolved identifier.
        name: String,
    },
    /// The expression string was empty.
    #[error("empty expression")]
    EmptyExpression,
    /// An operator was missing one of its operands.
    #[error("operator `{op}` without operand in: {text}")]
    OperatorWithoutOperand {
        /// The operator missing an operand.
        op: String,
        /// The offending source text.
        text: String,
    },
    /// Division (or modulo) by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// A function received an input outside its domain (e.g. `log` of a
    /// negative number).
    #[error("undefined input for function `{func}`")]
    UndefinedFunctionInput {
        /// The function whose domain was violated.
        func: &'static str,
    },
    /// An intermediate computation overflowed the representable integer range.
    #[error("integer overflow evaluating expression")]
    IntegerOverflow,
    /// A function token in the input was not recognized.
    #[error("unknown function `{name}`")]
    UnknownFunction {
        /// The unrecognized function name.
        name: String,
    },
    /// A parameter index referenced by a compiled expression is out of range
    /// for the parameter vector supplied to [`crate::Expression::evaluate`].
    #[error("parameter index {index} out of range ({len} parameters supplied)")]
    ParamIndexOutOfRange {
        /// The out-of-range index.
        index: usize,
        /// Number of parameters actually supplied.
        len: usize,
    },
}
