//! Restricted arithmetic evaluator.
//!
//! Grammar: signed decimal literals, `+ - * /`, parentheses. There are no
//! identifiers, calls or any other way to reach host code; anything outside
//! the grammar is rejected before evaluation starts.
//!
//! Strategies, first success wins:
//! 1. plain decimal literal
//! 2. expression (tokens -> RPN via shunting-yard -> stack evaluation)
//! 3. strip ASCII punctuation except `-` and `.`, then plain decimal again
//!
//! When all three fail, text made only of arithmetic characters is an
//! [`EvalError::UnsupportedExpression`]; anything else is not a number.

use tracing::trace;

use crate::numeral::is_plain_decimal;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// Only arithmetic characters, but neither a well-formed expression nor
    /// a number once punctuation is stripped.
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),
    #[error("not a number")]
    NotANumber,
}

/// ASCII punctuation removed by the last-resort cleanup.
const STRIPPED_PUNCTUATION: &str = "!\"#$%&'()*+,/:;<=>?@[\\]^_`{|}~";

/// Evaluate normalized text to a finite number.
pub fn evaluate(text: &str) -> Result<f64, EvalError> {
    let text = translate_symbols(text);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EvalError::NotANumber);
    }

    if let Some(v) = parse_literal(trimmed) {
        return Ok(v);
    }

    let expression = match lex(trimmed) {
        Some(tokens) => match to_rpn(&tokens).and_then(|rpn| eval_rpn(&rpn)) {
            Ok(v) => return Ok(v),
            Err(e) => {
                trace!(text = trimmed, error = %e, "expression rejected");
                Some(e)
            }
        },
        None => None,
    };

    let cleaned: String = trimmed
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(*c))
        .collect();
    if let Some(v) = parse_literal(cleaned.trim()) {
        return Ok(v);
    }
    Err(expression.unwrap_or(EvalError::NotANumber))
}

/// Symbol aliases accepted in place of ASCII operators.
fn translate_symbols(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '×' => '*',
            '÷' | '⁄' => '/',
            '−' => '-',
            '٫' => '.',
            other => other,
        })
        .collect()
}

fn parse_literal(s: &str) -> Option<f64> {
    if !is_plain_decimal(s) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Tok {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LPar,
    RPar,
}

/// `None` as soon as a character outside the arithmetic alphabet shows up.
fn lex(s: &str) -> Option<Vec<Tok>> {
    let mut out = Vec::new();
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let tok = match b {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'+' => Tok::Plus,
            b'-' => Tok::Minus,
            b'*' => Tok::Star,
            b'/' => Tok::Slash,
            b'(' => Tok::LPar,
            b')' => Tok::RPar,
            b'0'..=b'9' | b'.' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                let lit = &s[start..i];
                out.push(Tok::Num(parse_literal(lit)?));
                continue;
            }
            _ => return None,
        };
        out.push(tok);
        i += 1;
    }
    Some(out)
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Neg,
}

impl Op {
    fn precedence(self) -> u8 {
        match self {
            Op::Add | Op::Sub => 1,
            Op::Mul | Op::Div => 2,
            Op::Neg => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Rpn {
    Num(f64),
    Op(Op),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Stacked {
    Op(Op),
    LPar,
}

fn unsupported(reason: &str) -> EvalError {
    EvalError::UnsupportedExpression(reason.to_string())
}

/// Shunting-yard with unary signs. Structure is validated while converting,
/// so a successful RPN is always evaluable.
fn to_rpn(tokens: &[Tok]) -> Result<Vec<Rpn>, EvalError> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut ops: Vec<Stacked> = Vec::new();
    let mut expect_operand = true;

    for &tok in tokens {
        if expect_operand {
            match tok {
                Tok::Num(v) => {
                    out.push(Rpn::Num(v));
                    expect_operand = false;
                }
                Tok::LPar => ops.push(Stacked::LPar),
                Tok::Minus => ops.push(Stacked::Op(Op::Neg)),
                Tok::Plus => {}
                Tok::Star | Tok::Slash | Tok::RPar => {
                    return Err(unsupported("operand expected"));
                }
            }
            continue;
        }

        match tok {
            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash => {
                let op = match tok {
                    Tok::Plus => Op::Add,
                    Tok::Minus => Op::Sub,
                    Tok::Star => Op::Mul,
                    _ => Op::Div,
                };
                while let Some(&Stacked::Op(top)) = ops.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    out.push(Rpn::Op(top));
                    ops.pop();
                }
                ops.push(Stacked::Op(op));
                expect_operand = true;
            }
            Tok::RPar => loop {
                match ops.pop() {
                    Some(Stacked::Op(op)) => out.push(Rpn::Op(op)),
                    Some(Stacked::LPar) => break,
                    None => return Err(unsupported("unbalanced ')'")),
                }
            },
            Tok::Num(_) | Tok::LPar => return Err(unsupported("operator expected")),
        }
    }

    if expect_operand {
        return Err(unsupported(if tokens.is_empty() {
            "empty expression"
        } else {
            "dangling operator"
        }));
    }
    while let Some(s) = ops.pop() {
        match s {
            Stacked::Op(op) => out.push(Rpn::Op(op)),
            Stacked::LPar => return Err(unsupported("unbalanced '('")),
        }
    }
    Ok(out)
}

fn eval_rpn(rpn: &[Rpn]) -> Result<f64, EvalError> {
    let mut st: Vec<f64> = Vec::new();
    let pop = |st: &mut Vec<f64>| st.pop().ok_or_else(|| unsupported("missing operand"));

    for item in rpn {
        let v = match *item {
            Rpn::Num(v) => v,
            Rpn::Op(Op::Neg) => -pop(&mut st)?,
            Rpn::Op(op) => {
                let b = pop(&mut st)?;
                let a = pop(&mut st)?;
                match op {
                    Op::Add => a + b,
                    Op::Sub => a - b,
                    Op::Mul => a * b,
                    Op::Div if b == 0.0 => return Err(unsupported("division by zero")),
                    Op::Div => a / b,
                    Op::Neg => unreachable!("handled above"),
                }
            }
        };
        if !v.is_finite() {
            return Err(unsupported("result out of range"));
        }
        st.push(v);
    }

    match st.as_slice() {
        [v] => Ok(*v),
        _ => Err(unsupported("malformed expression")),
    }
}
