// SPDX-License-Identifier: Apache-2.0
//! Postfix stack-machine evaluation.

use crate::error::ExprError;
use crate::token::{BinOp, Func, PostfixOp};

/// Evaluates a compiled postfix program against a parameter vector.
pub fn evaluate(program: &[PostfixOp], params: &[f64]) -> Result<f64, ExprError> {
    let mut stack: Vec<f64> = Vec::with_capacity(program.len());

    for op in program {
        match *op {
            PostfixOp::Literal(v) => stack.push(v),
            PostfixOp::Param(idx) => {
                let v = *params
                    .get(idx)
                    .ok_or(ExprError::ParamIndexOutOfRange {
                        index: idx,
                        len: params.len(),
                    })?;
                stack.push(v);
            }
            PostfixOp::Neg => {
                let a = pop(&mut stack)?;
                stack.push(-a);
            }
            PostfixOp::BinOp(bin) => {
                let b = pop(&mut stack)?;
                let a = pop(&mut stack)?;
                stack.push(apply_binop(bin, a, b)?);
            }
            PostfixOp::Func(func) => {
                let arity = func.arity();
                if stack.len() < arity {
                    return Err(ExprError::UndefinedFunctionInput { func: func.name() });
                }
                let args: Vec<f64> = stack.split_off(stack.len() - arity);
                stack.push(apply_func(func, &args)?);
            }
        }
    }

    pop(&mut stack)
}

fn pop(stack: &mut Vec<f64>) -> Result<f64, ExprError> {
    stack.pop().ok_or(ExprError::EmptyExpression)
}

/// Applies a binary operator, checking for integer-overflow on operands that
/// are both exact integers (per the parameter-expression integer semantics).
pub(crate) fn apply_binop(op: BinOp, a: f64, b: f64) -> Result<f64, ExprError> {
    if let (Some(ia), Some(ib)) = (as_exact_i64(a), as_exact_i64(b)) {
        let result = match op {
            BinOp::Add => ia.checked_add(ib),
            BinOp::Sub => ia.checked_sub(ib),
            BinOp::Mul => ia.checked_mul(ib),
            BinOp::Div => {
                if ib == 0 {
                    return Err(ExprError::DivisionByZero);
                }
                ia.checked_div(ib)
            }
            BinOp::Mod => {
                if ib == 0 {
                    return Err(ExprError::DivisionByZero);
                }
                ia.checked_rem(ib)
            }
            BinOp::Pow => return Ok(a.powf(b)),
        };
        return result
            .map(|v| v as f64)
            .ok_or(ExprError::IntegerOverflow);
    }

    match op {
        BinOp::Add => Ok(a + b),
        BinOp::Sub => Ok(a - b),
        BinOp::Mul => Ok(a * b),
        BinOp::Div => {
            if b == 0.0 {
                Err(ExprError::DivisionByZero)
            } else {
                Ok(a / b)
            }
        }
        BinOp::Mod => {
            if b == 0.0 {
                Err(ExprError::DivisionByZero)
            } else {
                Ok(a % b)
            }
        }
        BinOp::Pow => Ok(a.powf(b)),
    }
}

pub(crate) fn apply_func(func: Func, args: &[f64]) -> Result<f64, ExprError> {
    let v = |i: usize| args[i];
    let result = match func {
        Func::Cos => v(0).cos(),
        Func::Sin => v(0).sin(),
        Func::Tan => v(0).tan(),
        Func::Exp => v(0).exp(),
        Func::Log => {
            if v(0) <= 0.0 {
                return Err(ExprError::UndefinedFunctionInput { func: "log" });
            }
            v(0).ln()
        }
        Func::Log2 => {
            if v(0) <= 0.0 {
                return Err(ExprError::UndefinedFunctionInput { func: "log2" });
            }
            v(0).log2()
        }
        Func::Ceil => v(0).ceil(),
        Func::Floor => v(0).floor(),
        Func::Sqrt => {
            if v(0) < 0.0 {
                return Err(ExprError::UndefinedFunctionInput { func: "sqrt" });
            }
            v(0).sqrt()
        }
        Func::Abs => v(0).abs(),
        Func::Min => v(0).min(v(1)),
        Func::Max => v(0).max(v(1)),
        Func::Pow => v(0).powf(v(1)),
    };
    if result.is_nan() || result.is_infinite() {
        return Err(ExprError::UndefinedFunctionInput { func: func.name() });
    }
    Ok(result)
}

/// Returns `v` as an `i64` if it is exactly representable (no fractional
/// part, within range), used to decide whether an operation should use
/// checked integer arithmetic instead of floating point.
fn as_exact_i64(v: f64) -> Option<i64> {
    if v.fract() != 0.0 || !v.is_finite() {
        return None;
    }
    if v < i64::MIN as f64 || v > i64::MAX as f64 {
        return None;
    }
    Some(v as i64)
}
