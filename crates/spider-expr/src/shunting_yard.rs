// SPDX-License-Identifier: Apache-2.0
//! Infix -> postfix compilation via the shunting-yard algorithm.

use crate::error::ExprError;
use crate::token::{BinOp, Func, PostfixOp};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Lexeme<'a> {
    Number(f64),
    Ident(&'a str),
    Op(BinOp),
    LParen,
    RParen,
    Comma,
}

fn lex(text: &str) -> Result<Vec<Lexeme<'_>>, ExprError> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '+' => {
                out.push(Lexeme::Op(BinOp::Add));
                i += 1;
            }
            '-' => {
                out.push(Lexeme::Op(BinOp::Sub));
                i += 1;
            }
            '*' => {
                out.push(Lexeme::Op(BinOp::Mul));
                i += 1;
            }
            '/' => {
                out.push(Lexeme::Op(BinOp::Div));
                i += 1;
            }
            '%' => {
                out.push(Lexeme::Op(BinOp::Mod));
                i += 1;
            }
            '^' => {
                out.push(Lexeme::Op(BinOp::Pow));
                i += 1;
            }
            '(' => {
                out.push(Lexeme::LParen);
                i += 1;
            }
            ')' => {
                out.push(Lexeme::RParen);
                i += 1;
            }
            ',' => {
                out.push(Lexeme::Comma);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < bytes.len()
                    && ((bytes[i] as char).is_ascii_digit() || bytes[i] as char == '.')
                {
                    i += 1;
                }
                let slice = &text[start..i];
                let value: f64 = slice
                    .parse()
                    .map_err(|_| ExprError::UnbalancedParens { text: text.into() })?;
                out.push(Lexeme::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < bytes.len()
                    && ((bytes[i] as char).is_alphanumeric() || bytes[i] as char == '_')
                {
                    i += 1;
                }
                out.push(Lexeme::Ident(&text[start..i]));
            }
            other => {
                return Err(ExprError::UnknownIdentifier {
                    name: other.to_string(),
                })
            }
        }
    }
    Ok(out)
}

/// Resolves a bare identifier to a parameter's stable index within the
/// enclosing graph's parameter list.
pub trait ParamResolver {
    /// Returns the stable index of `name`, or `None` if unresolved.
    fn resolve(&self, name: &str) -> Option<usize>;
}

impl ParamResolver for &[String] {
    fn resolve(&self, name: &str) -> Option<usize> {
        self.iter().position(|n| n == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ShuntItem {
    Op(BinOp),
    Neg,
    Func(Func),
    LParen,
    /// Marks the start of a function's argument list so arity can be
    /// checked when its matching `)` is reached.
    FuncMarker,
}

/// Parses `text` into postfix form, resolving parameter identifiers via
/// `resolver`. Pure syntax/identifier errors only; constant folding happens
/// separately (see [`crate::fold`]).
pub fn parse_to_postfix(
    text: &str,
    resolver: &impl ParamResolver,
) -> Result<Vec<PostfixOp>, ExprError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ExprError::EmptyExpression);
    }
    let lexemes = lex(trimmed)?;

    let mut output: Vec<PostfixOp> = Vec::new();
    let mut ops: Vec<ShuntItem> = Vec::new();
    // One counter per open function-argument list, tracking how many
    // arguments have been seen so far (commas increment it).
    let mut arg_counts: Vec<usize> = Vec::new();

    let mut prev_was_operand = false;

    for lex_tok in &lexemes {
        match *lex_tok {
            Lexeme::Number(v) => {
                output.push(PostfixOp::Literal(v));
                prev_was_operand = true;
            }
            Lexeme::Ident(name) => {
                if let Some(func) = Func::from_name(name) {
                    ops.push(ShuntItem::Func(func));
                    prev_was_operand = false;
                } else {
                    let index = resolver.resolve(name).ok_or_else(|| {
                        ExprError::UnknownIdentifier {
                            name: name.to_string(),
                        }
                    })?;
                    output.push(PostfixOp::Param(index));
                    prev_was_operand = true;
                }
            }
            Lexeme::Op(op) => {
                if op == BinOp::Sub && !prev_was_operand {
                    // Unary minus binds tighter than any binary operator and
                    // is left-associative with itself (`--x` negates twice),
                    // so nothing needs popping before pushing it.
                    ops.push(ShuntItem::Neg);
                    continue;
                }
                if !prev_was_operand {
                    return Err(ExprError::OperatorWithoutOperand {
                        op: op.symbol().to_string(),
                        text: trimmed.to_string(),
                    });
                }
                while let Some(&top) = ops.last() {
                    let should_pop = match top {
                        ShuntItem::Neg => true,
                        ShuntItem::Op(top_op) => {
                            top_op.precedence() > op.precedence()
                                || (top_op.precedence() == op.precedence() && !op.right_assoc())
                        }
                        _ => false,
                    };
                    if should_pop {
                        pop_into_output(&mut ops, &mut output);
                    } else {
                        break;
                    }
                }
                ops.push(ShuntItem::Op(op));
                prev_was_operand = false;
            }
            Lexeme::LParen => {
                match ops.last() {
                    Some(ShuntItem::Func(_)) => {
                        arg_counts.push(1);
                        ops.push(ShuntItem::FuncMarker);
                    }
                    _ => ops.push(ShuntItem::LParen),
                }
                prev_was_operand = false;
            }
            Lexeme::Comma => {
                if let Some(count) = arg_counts.last_mut() {
                    *count += 1;
                }
                loop {
                    match ops.last() {
                        Some(ShuntItem::LParen) | Some(ShuntItem::FuncMarker) | None => break,
                        _ => pop_into_output(&mut ops, &mut output),
                    }
                }
                prev_was_operand = false;
            }
            Lexeme::RParen => {
                loop {
                    match ops.pop() {
                        Some(ShuntItem::LParen) => break,
                        Some(ShuntItem::FuncMarker) => {
                            let arity_seen = arg_counts.pop().unwrap_or(1);
                            match ops.pop() {
                                Some(ShuntItem::Func(f)) => {
                                    if arity_seen != f.arity() {
                                        return Err(ExprError::UnknownFunction {
                                            name: f.name().to_string(),
                                        });
                                    }
                                    output.push(PostfixOp::Func(f));
                                }
                                _ => {
                                    return Err(ExprError::UnbalancedParens {
                                        text: trimmed.to_string(),
                                    })
                                }
                            }
                            break;
                        }
                        Some(item) => output_from_item(item, &mut output),
                        None => {
                            return Err(ExprError::UnbalancedParens {
                                text: trimmed.to_string(),
                            })
                        }
                    }
                }
                prev_was_operand = true;
            }
        }
    }

    while let Some(item) = ops.pop() {
        match item {
            ShuntItem::LParen | ShuntItem::FuncMarker => {
                return Err(ExprError::UnbalancedParens {
                    text: trimmed.to_string(),
                })
            }
            other => output_from_item(other, &mut output),
        }
    }

    if output.is_empty() {
        return Err(ExprError::EmptyExpression);
    }

    Ok(output)
}

fn pop_into_output(ops: &mut Vec<ShuntItem>, output: &mut Vec<PostfixOp>) {
    if let Some(item) = ops.pop() {
        output_from_item(item, output);
    }
}

fn output_from_item(item: ShuntItem, output: &mut Vec<PostfixOp>) {
    match item {
        ShuntItem::Op(op) => output.push(PostfixOp::BinOp(op)),
        ShuntItem::Neg => output.push(PostfixOp::Neg),
        ShuntItem::Func(f) => output.push(PostfixOp::Func(f)),
        ShuntItem::LParen | ShuntItem::FuncMarker => {}
    }
}
