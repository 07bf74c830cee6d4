//! Tokenizer: strips comments/whitespace from one source unit and yields
//! one command record per non-empty line.
use crate::{error::TranslateError, insn::Instruction};

pub const COMMENT: &str = "//";

pub type ParseResult<'s> = (Vec<Instruction<'s>>, Vec<TranslateError>);

/// Parse a whole source unit's text into commands, collecting (rather than
/// failing fast on) per-line errors so a caller can report every malformed
/// line in one pass before aborting.
pub fn parse<'s>(unit: &str, program: &'s str) -> ParseResult<'s> {
    let mut instructions = Vec::new();
    let mut errors = Vec::new();

    for (row, line) in program.lines().enumerate() {
        let valid_code_range = line.find(COMMENT).unwrap_or(line.len());
        let vmcode = line[..valid_code_range].trim();
        if vmcode.is_empty() {
            continue;
        }

        match Instruction::parse(vmcode, unit, row + 1) {
            Ok(insn) => instructions.push(insn),
            Err(e) => errors.push(e),
        }
    }

    (instructions, errors)
}
