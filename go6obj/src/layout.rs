// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Numeric tables of one toolchain revision.
//!
//! The record encoding is shared across revisions, but opcode numbers and operand type codes are
//! assigned by each revision's instruction header. A [`Layout`] pins those numbers down; the
//! decoder consults it to bound-check opcodes, recognize the pseudo-instructions that drive symbol
//! and history bookkeeping, and name operand types.

use core::fmt;

/// A raw 2-byte opcode as read from the stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Opcode(pub u16);

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the decoder treats an opcode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpcodeClass {
    /// Symbol declaration.
    Name,
    /// Symbol declaration preceded by a 4-byte signature.
    SigName,
    /// Source-position history marker.
    History,
    /// Any other instruction.
    Instruction,
}

/// Operand type tag.
///
/// Codes not covered by the layout's named entries (registers, indirections, ...) are kept raw in
/// [`OperandType::Other`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperandType {
    /// No operand.
    None,
    /// Branch target.
    Branch,
    /// Externally visible symbol.
    Extern,
    /// File-local symbol.
    Static,
    /// Local (stack) variable.
    Auto,
    /// Function parameter.
    Param,
    /// Integer constant.
    Const,
    /// Floating-point constant.
    FConst,
    /// Fixed-width string constant.
    SConst,
    /// Address-of.
    Addr,
    /// Source path fragment.
    File,
    /// Secondary file marker.
    File1,
    /// Any other code.
    Other(u8),
}

/// Opcode numbers and operand type codes for one toolchain revision.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Layout {
    /// Lower opcode sentinel; valid opcodes are strictly greater.
    pub op_xxx: u16,
    /// Upper opcode sentinel; valid opcodes are strictly smaller.
    pub op_last: u16,
    /// Symbol declaration.
    pub op_name: u16,
    /// Signed symbol declaration.
    pub op_signame: u16,
    /// History marker.
    pub op_history: u16,

    /// Type code for "no operand".
    pub d_none: u8,
    /// Type code for branch targets.
    pub d_branch: u8,
    /// Type code for external symbols.
    pub d_extern: u8,
    /// Type code for static symbols.
    pub d_static: u8,
    /// Type code for locals.
    pub d_auto: u8,
    /// Type code for parameters.
    pub d_param: u8,
    /// Type code for integer constants.
    pub d_const: u8,
    /// Type code for float constants.
    pub d_fconst: u8,
    /// Type code for string constants.
    pub d_sconst: u8,
    /// Type code for address-of.
    pub d_addr: u8,
    /// Type code for path fragments.
    pub d_file: u8,
    /// Type code for secondary file markers.
    pub d_file1: u8,
}

impl Layout {
    /// The amd64 (`6.out.h`) layout.
    pub const AMD64: Self = Self {
        op_xxx: 0,
        op_last: 567,
        op_name: 132,
        op_signame: 566,
        op_history: 56,

        d_none: 111,
        d_branch: 112,
        d_extern: 113,
        d_static: 114,
        d_auto: 115,
        d_param: 116,
        d_const: 117,
        d_fconst: 118,
        d_sconst: 119,
        d_addr: 120,
        d_file: 121,
        d_file1: 122,
    };

    /// Returns `true` if `op` lies strictly between the sentinels.
    #[must_use]
    pub fn in_range(&self, op: Opcode) -> bool {
        op.0 > self.op_xxx && op.0 < self.op_last
    }

    /// Classifies an in-range opcode.
    #[must_use]
    pub fn classify(&self, op: Opcode) -> OpcodeClass {
        match op.0 {
            o if o == self.op_name => OpcodeClass::Name,
            o if o == self.op_signame => OpcodeClass::SigName,
            o if o == self.op_history => OpcodeClass::History,
            _ => OpcodeClass::Instruction,
        }
    }

    /// Returns the pseudo-instruction mnemonic for `op`, if it has one.
    #[must_use]
    pub fn mnemonic(&self, op: Opcode) -> Option<&'static str> {
        match self.classify(op) {
            OpcodeClass::Name => Some("NAME"),
            OpcodeClass::SigName => Some("SIGNAME"),
            OpcodeClass::History => Some("HISTORY"),
            OpcodeClass::Instruction => None,
        }
    }

    /// Maps a raw type code to an [`OperandType`].
    #[must_use]
    pub fn operand_type(&self, code: u8) -> OperandType {
        match code {
            c if c == self.d_none => OperandType::None,
            c if c == self.d_branch => OperandType::Branch,
            c if c == self.d_extern => OperandType::Extern,
            c if c == self.d_static => OperandType::Static,
            c if c == self.d_auto => OperandType::Auto,
            c if c == self.d_param => OperandType::Param,
            c if c == self.d_const => OperandType::Const,
            c if c == self.d_fconst => OperandType::FConst,
            c if c == self.d_sconst => OperandType::SConst,
            c if c == self.d_addr => OperandType::Addr,
            c if c == self.d_file => OperandType::File,
            c if c == self.d_file1 => OperandType::File1,
            c => OperandType::Other(c),
        }
    }

    /// Maps an [`OperandType`] back to its raw code.
    #[must_use]
    pub fn type_code(&self, ty: OperandType) -> u8 {
        match ty {
            OperandType::None => self.d_none,
            OperandType::Branch => self.d_branch,
            OperandType::Extern => self.d_extern,
            OperandType::Static => self.d_static,
            OperandType::Auto => self.d_auto,
            OperandType::Param => self.d_param,
            OperandType::Const => self.d_const,
            OperandType::FConst => self.d_fconst,
            OperandType::SConst => self.d_sconst,
            OperandType::Addr => self.d_addr,
            OperandType::File => self.d_file,
            OperandType::File1 => self.d_file1,
            OperandType::Other(c) => c,
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::AMD64
    }
}
