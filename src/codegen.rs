//! Emitter primitives and the four generators (arithmetic/logical,
//! memory-access, control-flow, call/return) that turn one [`Instruction`]
//! into a fragment of Hack assembly.
use std::io::{self, Write as _};

use crate::{
    error::TranslateError,
    insn::{ArithKind, ArithOp, InsnKind, Instruction},
    segment::Segment,
    symbol::SymbolTable,
};

struct Context<'s> {
    symbols: SymbolTable<'s>,
    current_unit: Option<&'s str>,
    current_fn_name: Option<&'s str>,
}

/// Owns the output sink and all translation-wide mutable state (label
/// counters, current unit, current function). Created once at driver entry
/// and passed explicitly through every call; nothing here is ambient.
///
/// `'s` is the lifetime of the VM source text (labels/names borrow from
/// it); `'w` is the (independent) lifetime of the output sink.
pub struct CodeWriter<'s, 'w, W: io::Write> {
    w: &'w mut W,
    ctx: Context<'s>,
}

/// Where a resolved segment address lives.
enum Address {
    /// A fixed symbol whose cell itself holds the value (`@THIS`, `@R7`,
    /// `@Foo.3`) — safe to pop into directly, no computed offset involved.
    Direct(String),
    /// A fragment that leaves the resolved address in `D`. Needs spilling to
    /// a scratch cell before a `pop` can safely read the stack afterward.
    Computed(String),
}

impl<'s, 'w, W: io::Write> CodeWriter<'s, 'w, W> {
    pub fn new(writer: &'w mut W) -> Self {
        let ctx = Context {
            symbols: SymbolTable::new(),
            current_unit: None,
            current_fn_name: None,
        };

        CodeWriter { w: writer, ctx }
    }

    /// Translate every command of one source unit, in order.
    pub fn translate_unit(
        &mut self,
        unit: &'s str,
        instructions: &[Instruction<'s>],
    ) -> Result<(), TranslateError> {
        self.ctx.current_unit = Some(unit);

        for insn in instructions {
            #[cfg(debug_assertions)]
            writeln!(self.w, "// {}", insn.lexeme)?;

            self.translate(insn)?;
        }

        Ok(())
    }

    fn translate(&mut self, insn: &Instruction<'s>) -> Result<(), TranslateError> {
        use InsnKind::*;

        match &insn.kind {
            Arithmetic(op) => self.arithmetic(*op)?,
            Push(segment, index) => self.push(*segment, *index, insn.line)?,
            Pop(segment, index) => self.pop(*segment, *index, insn.line)?,
            Label(label) => writeln!(self.w, "({label})")?,
            Goto(label) => self.goto(label)?,
            IfGoto(label) => self.if_goto(label)?,
            DefFn(name, n_locals) => self.define_fn(name, *n_locals)?,
            CallFn(name, n_args) => self.call_fn(name, *n_args)?,
            Return => self.ret_fn()?,
        }

        Ok(())
    }

    /// `SP = 256; call Sys.init 0`. Emitted before any unit is processed, in
    /// multi-unit mode only. The current function is still unset at this
    /// point, so the minted return label is `$ret.0`  unreachable, since
    /// `Sys.init` never returns  but kept as-is rather than special-cased.
    pub fn bootstrap(&mut self) -> Result<(), TranslateError> {
        writeln!(self.w, "@256\nD=A\n@SP\nM=D")?;
        self.call_fn("Sys.init", 0)?;
        Ok(())
    }

    /// Self-looping halt, appended in single-unit mode so the program stops
    /// deterministically instead of falling off the end of memory.
    pub fn terminate(&mut self) -> Result<(), TranslateError> {
        writeln!(self.w, "(END)\n@END\n0;JMP")?;
        Ok(())
    }

    fn static_variable(&self, index: u16) -> Result<String, TranslateError> {
        let unit = self.ctx.current_unit.ok_or_else(|| {
            TranslateError::ArgumentError("current unit is not set".to_string())
        })?;
        Ok(format!("{unit}.{index}"))
    }

    /// Resolve `segment[index]` for the segments whose base is a runtime
    /// register (`local`/`argument`/`this`/`that`) or a fixed cell
    /// (`temp`/`pointer`). `constant` and `static` are handled by the
    /// caller, since neither fits the `Address` shape (constant has no
    /// address at all; static's symbol already IS the value).
    fn address(&self, segment: Segment, index: u16) -> Address {
        use Segment::*;

        let computed = |base: &str| Address::Computed(format!("@{index}\nD=A\n@{base}\nD=D+M"));

        match segment {
            Local => computed("LCL"),
            Argument => computed("ARG"),
            This => computed("THIS"),
            That => computed("THAT"),
            Temp => Address::Direct(format!("@R{}", index + 5)),
            Pointer if index == 0 => Address::Direct("@THIS".to_string()),
            Pointer => Address::Direct("@THAT".to_string()),
            Static | Constant => unreachable!("handled by push/pop directly"),
        }
    }

    pub fn push(&mut self, segment: Segment, index: u16, line: usize) -> Result<(), TranslateError> {
        use Segment::*;

        segment
            .validate_index(index)
            .map_err(|e| TranslateError::malformed(self.unit_name(), line, "push", e))?;

        match segment {
            Constant => writeln!(self.w, "@{index}\nD=A\n{PUSH}")?,
            Static => {
                let sym = self.static_variable(index)?;
                writeln!(self.w, "@{sym}\nD=M\n{PUSH}")?;
            }
            _ => match self.address(segment, index) {
                Address::Direct(sym) => writeln!(self.w, "{sym}\nD=M\n{PUSH}")?,
                Address::Computed(code) => writeln!(self.w, "{code}\nA=D\nD=M\n{PUSH}")?,
            },
        }

        Ok(())
    }

    pub fn pop(&mut self, segment: Segment, index: u16, line: usize) -> Result<(), TranslateError> {
        use Segment::*;

        segment
            .validate_index(index)
            .map_err(|e| TranslateError::malformed(self.unit_name(), line, "pop", e))?;

        match segment {
            Constant => {
                return Err(TranslateError::malformed(
                    self.unit_name(),
                    line,
                    "pop constant",
                    anyhow::anyhow!("cannot pop into the constant segment"),
                ))
            }
            Static => {
                let sym = self.static_variable(index)?;
                writeln!(self.w, "{POP}\n@{sym}\nM=D")?;
            }
            _ => match self.address(segment, index) {
                Address::Direct(sym) => writeln!(self.w, "{POP}\n{sym}\nM=D")?,
                Address::Computed(code) => {
                    // resolve the address and spill it *before* popping
                    // popping first would clobber D with the stack value
                    // before the address is safely tucked away.
                    let scratch = self.ctx.symbols.next_scratch_label();
                    writeln!(self.w, "{code}\n@{scratch}\nM=D\n{POP}\n@{scratch}\nA=M\nM=D")?;
                }
            },
        }

        Ok(())
    }

    fn unit_name(&self) -> &str {
        self.ctx.current_unit.unwrap_or("")
    }

    /// Define the function with the given name: emit its entry label, set
    /// it as the current function (so subsequent `call`s mint return labels
    /// prefixed with it), and zero-initialize `n_locals` local slots.
    pub fn define_fn(&mut self, name: &'s str, n_locals: u16) -> Result<(), TranslateError> {
        self.ctx.current_fn_name = Some(name);

        writeln!(self.w, "({name})")?;
        if n_locals > 0 {
            writeln!(self.w, "D=0")?;
            for _ in 0..n_locals {
                write!(self.w, "{PUSH}")?;
            }
        }

        Ok(())
    }

    /// Pushes the five-cell call frame (return address, saved LCL/ARG/THIS/
    /// THAT), repositions ARG/LCL, and jumps into `name`.
    pub fn call_fn(&mut self, name: &str, n_args: u16) -> Result<(), TranslateError> {
        let prefix = self.ctx.current_fn_name.unwrap_or("");
        let ret_index = self.ctx.symbols.next_call_index();
        let ret_label = format!("{prefix}$ret.{ret_index}");

        writeln!(self.w, "@{ret_label}\nD=A\n{PUSH}")?;
        for reg in ["LCL", "ARG", "THIS", "THAT"] {
            writeln!(self.w, "@{reg}\nD=M\n{PUSH}")?;
        }

        // ARG = SP - 5 - n_args
        writeln!(
            self.w,
            "@{}\nD=A\n@SP\nD=M-D\n@ARG\nM=D",
            n_args as u32 + 5
        )?;
        // LCL = SP
        writeln!(self.w, "@SP\nD=M\n@LCL\nM=D")?;

        self.goto(name)?;
        writeln!(self.w, "({ret_label})")?;

        Ok(())
    }

    /// Restores the caller's frame and jumps back through the saved return
    /// address. `frame` and `retAddr` are well-known scratch cells (the
    /// 16-bit machine only has two general registers, both busy during this
    /// sequence), so they can't live in D/A.
    pub fn ret_fn(&mut self) -> Result<(), TranslateError> {
        writeln!(
            self.w,
            "\
@LCL
D=M
@frame
M=D
@5
A=D-A
D=M
@retAddr
M=D
@SP
AM=M-1
D=M
@ARG
A=M
M=D
@ARG
D=M+1
@SP
M=D
@frame
AM=M-1
D=M
@THAT
M=D
@frame
AM=M-1
D=M
@THIS
M=D
@frame
AM=M-1
D=M
@ARG
M=D
@frame
AM=M-1
D=M
@LCL
M=D
@retAddr
A=M
0;JMP"
        )?;

        Ok(())
    }

    pub fn arithmetic(&mut self, op: ArithOp) -> Result<(), TranslateError> {
        match op.kind() {
            ArithKind::Unary(sym) => self.unary_calc(sym),
            ArithKind::Binary(sym) => self.binary_calc(sym),
            ArithKind::Compare(jump) => self.compare(op.mnemonic(), jump),
        }
    }

    /// Rewrite the topmost cell in place with `<sym>M` (`neg`/`not`).
    fn unary_calc(&mut self, sym: &str) -> Result<(), TranslateError> {
        writeln!(self.w, "@SP\nA=M-1\nM={sym}M")?;
        Ok(())
    }

    /// Pop the top into `D`, rewrite the new top with `M <sym> D`
    /// (`add`/`sub`/`and`/`or`). Operand order is fixed: the deeper cell is
    /// `M`, the popped cell is `D`  `sub` computes `M - D`.
    fn binary_calc(&mut self, sym: &str) -> Result<(), TranslateError> {
        writeln!(self.w, "{POP}\n@SP\nA=M-1\nM=M{sym}D")?;
        Ok(())
    }

    /// `eq`/`gt`/`lt`: pop the top into `D`, compute `M - D`, and jump to a
    /// freshly-minted "true" label on the comparison; fall through to
    /// `false`, then merge at a "continue" label just past it. Both labels
    /// share one counter value and differ only by the `cont` suffix.
    fn compare(&mut self, op: &'static str, jump: &str) -> Result<(), TranslateError> {
        let (true_label, cont_label) = self.ctx.symbols.compare_labels(op);

        writeln!(
            self.w,
            "\
{POP}
@SP
A=M-1
D=M-D
@{true_label}
D;{jump}
@SP
A=M-1
M=0
@{cont_label}
0;JMP
({true_label})
@SP
A=M-1
M=-1
({cont_label})"
        )?;

        Ok(())
    }

    /// Unconditional jump.
    pub fn goto(&mut self, label: &str) -> Result<(), TranslateError> {
        writeln!(self.w, "@{label}\n0;JMP")?;
        Ok(())
    }

    /// Pop the top into `D` (regardless of outcome) and jump to `label` iff
    /// it was nonzero (true).
    pub fn if_goto(&mut self, label: &str) -> Result<(), TranslateError> {
        writeln!(self.w, "{POP}\n@{label}\nD;JNE")?;
        Ok(())
    }
}

/// Push the value in `D` to the top of the stack and advance `SP`.
#[doc(hidden)]
static PUSH: &str = "\
@SP
A=M
M=D
@SP
M=M+1
";

/// Retreat `SP` and load the (former) top of stack into `D`.
#[doc(hidden)]
static POP: &str = "\
@SP
AM=M-1
D=M
";
