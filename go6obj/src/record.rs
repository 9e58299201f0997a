// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decoded records.

use alloc::string::String;

use crate::history::{HistoryOp, Position};
use crate::layout::{Opcode, OperandType};
use crate::operand::Operand;

/// A symbol declaration (`NAME` / `SIGNAME`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolDecl {
    /// Symbol kind, e.g. [`OperandType::Extern`] or [`OperandType::File`].
    pub kind: OperandType,
    /// Handle the name was assigned to.
    pub handle: u8,
    /// Declared name, terminator stripped.
    pub name: String,
    /// Signature hash of a signed declaration.
    pub signature: Option<u32>,
}

/// The shared body of instruction and history records.
#[derive(Clone, Debug, PartialEq)]
pub struct Instr {
    /// Virtual line, `0` for none.
    pub line: u32,
    /// Source position of `line`, if the history covers it.
    pub pos: Option<Position>,
    /// Source operand.
    pub from: Operand,
    /// Destination operand.
    pub to: Operand,
}

/// Record payload by record shape.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordBody {
    /// Symbol declaration.
    Symbol(SymbolDecl),
    /// Ordinary instruction.
    Instr(Instr),
    /// History marker and the update it caused.
    History {
        /// Raw record fields. `pos` is always `None`.
        instr: Instr,
        /// The history update.
        op: HistoryOp,
    },
}

/// One decoded record.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Record opcode.
    pub opcode: Opcode,
    /// Stream offset of the opcode.
    pub offset: u64,
    /// Shape-specific payload.
    pub body: RecordBody,
}

impl Record {
    /// Returns the declared name of a symbol declaration.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.body {
            RecordBody::Symbol(decl) => Some(&decl.name),
            _ => None,
        }
    }

    /// Returns the symbol declaration, if this is one.
    #[must_use]
    pub fn symbol(&self) -> Option<&SymbolDecl> {
        match &self.body {
            RecordBody::Symbol(decl) => Some(decl),
            _ => None,
        }
    }

    fn instr(&self) -> Option<&Instr> {
        match &self.body {
            RecordBody::Symbol(_) => None,
            RecordBody::Instr(instr) | RecordBody::History { instr, .. } => Some(instr),
        }
    }

    /// Returns the virtual line of an instruction or history record.
    #[must_use]
    pub fn line(&self) -> Option<u32> {
        self.instr().map(|i| i.line)
    }

    /// Returns the resolved source position, if any.
    #[must_use]
    pub fn pos(&self) -> Option<&Position> {
        self.instr()?.pos.as_ref()
    }

    /// Returns the source operand.
    #[must_use]
    pub fn from(&self) -> Option<&Operand> {
        self.instr().map(|i| &i.from)
    }

    /// Returns the destination operand.
    #[must_use]
    pub fn to(&self) -> Option<&Operand> {
        self.instr().map(|i| &i.to)
    }

    /// Returns the history update of a history record.
    #[must_use]
    pub fn history_op(&self) -> Option<&HistoryOp> {
        match &self.body {
            RecordBody::History { op, .. } => Some(op),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn accessors_follow_shape() {
        let decl = Record {
            opcode: Opcode(1),
            offset: 0,
            body: RecordBody::Symbol(SymbolDecl {
                kind: OperandType::Extern,
                handle: 1,
                name: "x".to_string(),
                signature: None,
            }),
        };
        assert_eq!(decl.name(), Some("x"));
        assert_eq!(decl.line(), None);
        assert!(decl.from().is_none());
        assert!(decl.history_op().is_none());

        let instr = Record {
            opcode: Opcode(2),
            offset: 10,
            body: RecordBody::Instr(Instr {
                line: 4,
                pos: Some(Position {
                    file: "a.go".into(),
                    line: 4,
                }),
                from: Operand::empty(),
                to: Operand::empty(),
            }),
        };
        assert_eq!(instr.name(), None);
        assert_eq!(instr.line(), Some(4));
        assert_eq!(instr.pos().map(|p| p.line), Some(4));
        assert!(instr.to().is_some());
    }
}
