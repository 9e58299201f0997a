// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable rendering of decoded records.
//!
//! Operands print in assembler style (`$1`, `sym+8(SB)`, `local<>+0(SB)`, `x+8(FP)`,
//! `$"text"`, `$(1.5)`, `(R3*4)` index suffix). Records print one per line; a [`Listing`] adds
//! the stream offset and the resolved `file:line` of each instruction.
//!
//! Only the pseudo-instructions have mnemonics; other opcodes print as `op#N`.

#![allow(clippy::module_name_repetitions, reason = "public API module")]

use core::fmt;

use crate::history::HistoryOp;
use crate::layout::{Layout, OperandType};
use crate::operand::Operand;
use crate::record::{Record, RecordBody};

fn sym_off(f: &mut fmt::Formatter<'_>, sym: &str, static_: bool, off: i64) -> fmt::Result {
    if sym.is_empty() {
        return write!(f, "{off}");
    }
    f.write_str(sym)?;
    if static_ {
        f.write_str("<>")?;
    }
    if off < 0 {
        write!(f, "{off}")
    } else {
        write!(f, "+{off}")
    }
}

fn write_sconst(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    // Trailing NULs are padding to the fixed width.
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    f.write_str("$\"")?;
    for &b in &bytes[..end] {
        match b {
            b'"' => f.write_str("\\\"")?,
            b'\\' => f.write_str("\\\\")?,
            0x20..=0x7e => write!(f, "{}", char::from(b))?,
            _ => write!(f, "\\x{b:02x}")?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            OperandType::None => {
                if self.offset != 0 || self.has_symbol() {
                    sym_off(f, &self.symbol, false, self.offset)?;
                }
            }
            OperandType::FConst => match self.float {
                Some(v) => write!(f, "$({v})")?,
                None => f.write_str("$(?)")?,
            },
            OperandType::SConst => {
                let bytes = self.string.as_ref().map(|s| &s[..]).unwrap_or_default();
                write_sconst(f, bytes)?;
            }
            OperandType::Const => {
                f.write_str("$")?;
                sym_off(f, &self.symbol, false, self.offset)?;
            }
            OperandType::Addr => {
                f.write_str("$")?;
                sym_off(f, &self.symbol, false, self.offset)?;
                f.write_str("(SB)")?;
            }
            OperandType::Extern => {
                sym_off(f, &self.symbol, false, self.offset)?;
                f.write_str("(SB)")?;
            }
            OperandType::Static => {
                sym_off(f, &self.symbol, true, self.offset)?;
                f.write_str("(SB)")?;
            }
            OperandType::Auto => {
                sym_off(f, &self.symbol, false, self.offset)?;
                f.write_str("(SP)")?;
            }
            OperandType::Param => {
                sym_off(f, &self.symbol, false, self.offset)?;
                f.write_str("(FP)")?;
            }
            OperandType::Branch => write!(f, "{}(PC)", self.offset)?,
            OperandType::File | OperandType::File1 => f.write_str(&self.symbol)?,
            OperandType::Other(reg) => {
                if self.offset != 0 || self.has_symbol() {
                    sym_off(f, &self.symbol, false, self.offset)?;
                    write!(f, "(R{reg})")?;
                } else {
                    write!(f, "R{reg}")?;
                }
            }
        }
        if let Some(ix) = self.index {
            write!(f, "(R{}*{})", ix.reg, ix.scale)?;
        }
        Ok(())
    }
}

/// A record paired with the layout that names its opcode.
#[derive(Copy, Clone, Debug)]
pub struct RecordDisplay<'a> {
    record: &'a Record,
    layout: &'a Layout,
}

impl Record {
    /// Returns a [`fmt::Display`] adapter for this record.
    #[must_use]
    pub fn display<'a>(&'a self, layout: &'a Layout) -> RecordDisplay<'a> {
        RecordDisplay {
            record: self,
            layout,
        }
    }
}

impl fmt::Display for RecordDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.record;
        match self.layout.mnemonic(r.opcode) {
            Some(m) => write!(f, "{m:<8}")?,
            None => write!(f, "{:<8}", alloc::format!("op#{}", r.opcode))?,
        }
        match &r.body {
            RecordBody::Symbol(decl) => {
                write!(f, " {:<3} {:?} {:?}", decl.handle, decl.kind, decl.name)?;
                if let Some(sig) = decl.signature {
                    write!(f, " sig={sig:#010x}")?;
                }
                Ok(())
            }
            RecordBody::Instr(instr) => {
                write!(f, " {}, {}", instr.from, instr.to)?;
                if let Some(pos) = &instr.pos {
                    write!(f, "\t// {pos}")?;
                }
                Ok(())
            }
            RecordBody::History { op, .. } => match op {
                HistoryOp::Enter { file, line, base } => {
                    write!(f, " {line} enter {file:?}")?;
                    if *base != 0 {
                        write!(f, " at {base}")?;
                    }
                    Ok(())
                }
                HistoryOp::Exit { line } => write!(f, " {line} exit"),
                HistoryOp::Import { line, library } => write!(f, " {line} import {library:?}"),
            },
        }
    }
}

/// A printable listing of decoded records.
#[derive(Copy, Clone, Debug)]
pub struct Listing<'a> {
    records: &'a [Record],
    layout: &'a Layout,
}

impl<'a> Listing<'a> {
    /// Creates a listing over `records`.
    #[must_use]
    pub fn new(records: &'a [Record], layout: &'a Layout) -> Self {
        Self { records, layout }
    }

    /// Returns the number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in self.records {
            writeln!(f, "{:08x}  {}", r.offset, r.display(self.layout))?;
        }
        Ok(())
    }
}
