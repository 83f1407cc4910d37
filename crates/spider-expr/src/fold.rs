// SPDX-License-Identifier: Apache-2.0
//! Constant folding over a compiled postfix sequence.
//!
//! A sub-expression that touches no [`PostfixOp::Param`] evaluates to the
//! same value on every call, so it is collapsed to a single literal at
//! compile time rather than re-executed on every firing.

use crate::eval::{apply_binop, apply_func};
use crate::token::PostfixOp;

/// Returns `true` if `program` references no parameter and can therefore be
/// reduced to a single literal.
pub fn is_fully_static(program: &[PostfixOp]) -> bool {
    !program.iter().any(|op| matches!(op, PostfixOp::Param(_)))
}

/// A value tracked during the folding pass: either a literal already
/// resolved, or a dynamic subtree that was copied verbatim into the output
/// stream and spans the last `emitted_len` items of it.
enum Slot {
    Const(f64),
    Dynamic { emitted_len: usize },
}

/// Emits `slot` into `out` (a constant becomes a fresh literal op; a dynamic
/// subtree is already present) and returns how many output items it spans.
fn flush(out: &mut Vec<PostfixOp>, slot: Slot) -> usize {
    match slot {
        Slot::Const(v) => {
            out.push(PostfixOp::Literal(v));
            1
        }
        Slot::Dynamic { emitted_len } => emitted_len,
    }
}

/// Folds every constant sub-expression of `program` into a literal,
/// preserving evaluation order and the remaining dynamic structure.
///
/// Runs a single stack-machine pass over the postfix stream: whenever an
/// operator's operands are both already-folded constants, it is evaluated
/// immediately instead of being copied to the output.
pub fn fold_constants(program: &[PostfixOp]) -> Vec<PostfixOp> {
    let mut stack: Vec<Slot> = Vec::new();
    let mut out: Vec<PostfixOp> = Vec::new();

    for op in program {
        match *op {
            PostfixOp::Literal(v) => stack.push(Slot::Const(v)),
            PostfixOp::Param(idx) => {
                out.push(PostfixOp::Param(idx));
                stack.push(Slot::Dynamic { emitted_len: 1 });
            }
            PostfixOp::Neg => {
                let operand = stack.pop().unwrap_or(Slot::Dynamic { emitted_len: 0 });
                match operand {
                    Slot::Const(v) => stack.push(Slot::Const(-v)),
                    dynamic => {
                        let len = flush(&mut out, dynamic);
                        out.push(PostfixOp::Neg);
                        stack.push(Slot::Dynamic {
                            emitted_len: len + 1,
                        });
                    }
                }
            }
            PostfixOp::BinOp(bin) => {
                let rhs = stack.pop().unwrap_or(Slot::Dynamic { emitted_len: 0 });
                let lhs = stack.pop().unwrap_or(Slot::Dynamic { emitted_len: 0 });
                match (lhs, rhs) {
                    (Slot::Const(a), Slot::Const(b)) => match apply_binop(bin, a, b) {
                        Ok(v) => stack.push(Slot::Const(v)),
                        Err(_) => {
                            flush(&mut out, Slot::Const(a));
                            flush(&mut out, Slot::Const(b));
                            out.push(PostfixOp::BinOp(bin));
                            stack.push(Slot::Dynamic { emitted_len: 3 });
                        }
                    },
                    (lhs, rhs) => {
                        let lhs_len = flush(&mut out, lhs);
                        let rhs_len = flush(&mut out, rhs);
                        out.push(PostfixOp::BinOp(bin));
                        stack.push(Slot::Dynamic {
                            emitted_len: lhs_len + rhs_len + 1,
                        });
                    }
                }
            }
            PostfixOp::Func(func) => {
                let arity = func.arity();
                let mut args = Vec::with_capacity(arity);
                for _ in 0..arity {
                    args.push(stack.pop().unwrap_or(Slot::Dynamic { emitted_len: 0 }));
                }
                args.reverse();

                let all_const = args.iter().all(|a| matches!(a, Slot::Const(_)));
                if all_const {
                    let values: Vec<f64> = args
                        .iter()
                        .map(|a| match a {
                            Slot::Const(v) => *v,
                            Slot::Dynamic { .. } => unreachable!("checked all_const above"),
                        })
                        .collect();
                    if let Ok(v) = apply_func(func, &values) {
                        stack.push(Slot::Const(v));
                        continue;
                    }
                }

                let mut total_len = 0;
                for arg in args {
                    total_len += flush(&mut out, arg);
                }
                out.push(PostfixOp::Func(func));
                stack.push(Slot::Dynamic {
                    emitted_len: total_len + 1,
                });
            }
        }
    }

    match stack.pop() {
        Some(Slot::Const(v)) if out.is_empty() => vec![PostfixOp::Literal(v)],
        Some(Slot::Const(v)) => {
            out.push(PostfixOp::Literal(v));
            out
        }
        _ => out,
    }
}
