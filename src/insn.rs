use crate::{error::TranslateError, segment::Segment};

pub type Symbol<'a> = &'a str;

#[derive(Debug)]
pub struct Instruction<'source> {
    pub kind: InsnKind<'source>,
    pub line: usize,
    // hold original code
    #[cfg(debug_assertions)]
    pub lexeme: &'source str,
}

#[derive(Debug)]
pub enum InsnKind<'source> {
    Arithmetic(ArithOp),
    // Stack
    Push(Segment, u16),
    Pop(Segment, u16),
    // Program Flow
    Label(Symbol<'source>),
    Goto(Symbol<'source>),
    IfGoto(Symbol<'source>),
    // Function call
    // Function definition(name, num of local variables)
    DefFn(Symbol<'source>, u16),
    // Function call(name, num of arguments)
    CallFn(Symbol<'source>, u16),
    Return,
}

/// The nine arithmetic/logical mnemonics, and what shape of code each one
/// needs: rewrite the top cell in place (`Unary`), pop one operand and
/// rewrite the new top (`Binary`), or pop one operand and branch on the
/// comparison (`Compare`). Kept as a table instead of a per-mnemonic match
/// in the generator so adding/adjusting an operator only touches one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithKind {
    /// `M = <symbol>M`
    Unary(&'static str),
    /// pop into D, `M = M <symbol> D`
    Binary(&'static str),
    /// pop into D, compute `M - D`, jump on `<symbol>`
    Compare(&'static str),
}

#[rustfmt::skip]
const ARITH_TABLE: [(ArithOp, &str, ArithKind); 9] = {
    use ArithKind::*;
    use ArithOp::*;

    [
        (Add, "add", Binary("+")),
        (Sub, "sub", Binary("-")),
        (And, "and", Binary("&")),
        (Or,  "or",  Binary("|")),
        (Neg, "neg", Unary("-")),
        (Not, "not", Unary("!")),
        (Eq,  "eq",  Compare("JEQ")),
        (Gt,  "gt",  Compare("JGT")),
        (Lt,  "lt",  Compare("JLT")),
    ]
};

fn lookup_mnemonic(mnemonic: &str) -> Option<ArithOp> {
    ARITH_TABLE
        .iter()
        .find(|(_, m, _)| *m == mnemonic)
        .map(|(op, ..)| *op)
}

impl ArithOp {
    pub fn kind(self) -> ArithKind {
        ARITH_TABLE
            .iter()
            .find(|(op, ..)| *op == self)
            .map(|(_, _, kind)| *kind)
            .expect("every ArithOp has a table entry")
    }

    pub fn mnemonic(self) -> &'static str {
        ARITH_TABLE
            .iter()
            .find(|(op, ..)| *op == self)
            .map(|(_, m, _)| *m)
            .expect("every ArithOp has a table entry")
    }
}

impl<'s> Instruction<'s> {
    pub fn parse(code: &'s str, unit: &str, line: usize) -> Result<Self, TranslateError> {
        use InsnKind::*;

        let bad = |text: &str, source: anyhow::Error| {
            TranslateError::malformed(unit, line, text, source)
        };

        let mut ops = code.split_whitespace();
        let mnemonic = ops.next().ok_or_else(|| TranslateError::UnknownCommand {
            unit: unit.to_string(),
            line,
            text: code.to_string(),
        })?;

        let kind = if let Some(op) = lookup_mnemonic(mnemonic) {
            Arithmetic(op)
        } else {
            match mnemonic {
                "push" | "pop" => {
                    let segment = ops
                        .next()
                        .ok_or_else(|| bad(code, anyhow::anyhow!("expect target segment")))?;
                    let segment: Segment = segment
                        .try_into()
                        .map_err(|e| bad(code, e))?;
                    let index: u16 = ops
                        .next()
                        .ok_or_else(|| bad(code, anyhow::anyhow!("expect index of the segment")))?
                        .parse()
                        .map_err(|e: std::num::ParseIntError| bad(code, e.into()))?;
                    segment.validate_index(index).map_err(|e| bad(code, e))?;

                    match mnemonic {
                        "push" => Push(segment, index),
                        "pop" => Pop(segment, index),
                        _ => unreachable!(),
                    }
                }
                "label" | "goto" | "if-goto" => {
                    let symbol = ops
                        .next()
                        .ok_or_else(|| bad(code, anyhow::anyhow!("expect label symbol")))?;
                    if !validate(symbol) {
                        return Err(bad(code, anyhow::anyhow!("invalid label symbol: {symbol}")));
                    }

                    match mnemonic {
                        "label" => Label(symbol),
                        "goto" => Goto(symbol),
                        "if-goto" => IfGoto(symbol),
                        _ => unreachable!(),
                    }
                }
                "function" => {
                    let name = ops
                        .next()
                        .ok_or_else(|| bad(code, anyhow::anyhow!("expect function name")))?;
                    if !validate(name) {
                        return Err(bad(code, anyhow::anyhow!("invalid function name: {name}")));
                    }

                    let n_locals = ops
                        .next()
                        .ok_or_else(|| bad(code, anyhow::anyhow!("expect num of local variables")))?
                        .parse()
                        .map_err(|e: std::num::ParseIntError| bad(code, e.into()))?;

                    DefFn(name, n_locals)
                }
                "call" => {
                    let name = ops
                        .next()
                        .ok_or_else(|| bad(code, anyhow::anyhow!("expect function name")))?;
                    let n_args = ops
                        .next()
                        .ok_or_else(|| bad(code, anyhow::anyhow!("expect num of arguments")))?
                        .parse()
                        .map_err(|e: std::num::ParseIntError| bad(code, e.into()))?;

                    CallFn(name, n_args)
                }
                "return" => Return,
                _ => {
                    return Err(TranslateError::UnknownCommand {
                        unit: unit.to_string(),
                        line,
                        text: code.to_string(),
                    })
                }
            }
        };

        Ok(Instruction {
            kind,
            line,
            #[cfg(debug_assertions)]
            lexeme: code,
        })
    }
}

fn validate(symbol: &str) -> bool {
    !symbol.starts_with(|c: char| c.is_ascii_digit())
        && symbol
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | ':'))
}
