// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Operand decoding.
//!
//! An operand starts with one flag byte. Each bit enables an optional field, and the enabled fields
//! follow in a fixed order:
//!
//! | flag      | payload                                              |
//! |-----------|------------------------------------------------------|
//! | `INDEX`   | index register (1 byte), scale (1 byte)              |
//! | `OFFSET`  | 4-byte offset, sign-extended, or 8 bytes with `WIDE` |
//! | `SYM`     | symbol handle (1 byte)                               |
//! | `FCONST`  | IEEE-754 double (8 bytes)                            |
//! | `SCONST`  | string constant ([`SCONST_WIDTH`] bytes)             |
//! | `TYPE`    | type code (1 byte)                                   |
//! | `GOTYPE`  | type symbol handle (1 byte)                          |
//!
//! `FCONST` and `SCONST` are exclusive; when both are set only the float is read.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::fmt;

use crate::format::{ByteSource, ReadError};
use crate::layout::{Layout, OperandType};
use crate::symtab::SymbolTable;

/// Width of a string-constant payload.
pub const SCONST_WIDTH: usize = 8;

/// The flag byte that opens every operand.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OperandFlags(u8);

impl core::ops::BitOr for OperandFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl OperandFlags {
    /// No optional fields.
    pub const NONE: Self = Self(0);
    /// A type code follows.
    pub const TYPE: Self = Self(1 << 0);
    /// An index register and scale follow.
    pub const INDEX: Self = Self(1 << 1);
    /// An offset follows.
    pub const OFFSET: Self = Self(1 << 2);
    /// A float constant follows.
    pub const FCONST: Self = Self(1 << 3);
    /// A symbol handle follows.
    pub const SYM: Self = Self(1 << 4);
    /// A string constant follows.
    pub const SCONST: Self = Self(1 << 5);
    /// The offset is 8 bytes wide.
    pub const WIDE: Self = Self(1 << 6);
    /// A type symbol handle follows.
    pub const GOTYPE: Self = Self(1 << 7);

    /// Wraps a raw flag byte.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Returns the raw flag byte.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if all bits of `other` are set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

/// Indexed addressing: `(reg*scale)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Index {
    /// Index register code.
    pub reg: u8,
    /// Scale factor.
    pub scale: u8,
}

/// A decoded operand.
///
/// Fields whose flag was clear keep their defaults: no type, zero offset, no index, empty symbol,
/// and `None` for the payloads.
#[derive(Clone, Debug, PartialEq)]
pub struct Operand {
    /// Operand type.
    pub ty: OperandType,
    /// Offset or integer constant.
    pub offset: i64,
    /// Index register and scale, if indexed.
    pub index: Option<Index>,
    /// Referenced symbol name, `""` if none.
    pub symbol: String,
    /// Float constant payload.
    pub float: Option<f64>,
    /// String constant payload.
    pub string: Option<[u8; SCONST_WIDTH]>,
    /// Type symbol name, present when the operand carried a type reference.
    pub go_type: Option<String>,
}

impl Operand {
    /// Returns an operand with every field at its default.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            ty: OperandType::None,
            offset: 0,
            index: None,
            symbol: String::new(),
            float: None,
            string: None,
            go_type: None,
        }
    }

    /// Returns `true` if the operand names a symbol.
    #[must_use]
    pub fn has_symbol(&self) -> bool {
        !self.symbol.is_empty()
    }
}

impl Default for Operand {
    fn default() -> Self {
        Self::empty()
    }
}

/// Operand decoding failure.
///
/// Carries whatever was decoded before the failing read. The partial value is diagnostic only.
#[derive(Clone, Debug, PartialEq)]
pub struct OperandError {
    /// Fields decoded before the failure.
    pub partial: Box<Operand>,
    /// The failed read.
    pub source: ReadError,
}

impl fmt::Display for OperandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "truncated operand: {}", self.source)
    }
}

impl core::error::Error for OperandError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Decodes one operand from `src`, resolving symbol handles through `symbols`.
pub fn read_operand<S: ByteSource + ?Sized>(
    src: &mut S,
    symbols: &SymbolTable,
    layout: &Layout,
) -> Result<Operand, OperandError> {
    let mut a = Operand::empty();
    match read_fields(src, symbols, layout, &mut a) {
        Ok(()) => Ok(a),
        Err(source) => Err(OperandError {
            partial: Box::new(a),
            source,
        }),
    }
}

fn read_fields<S: ByteSource + ?Sized>(
    src: &mut S,
    symbols: &SymbolTable,
    layout: &Layout,
    a: &mut Operand,
) -> Result<(), ReadError> {
    let flags = OperandFlags::from_bits(src.read_u8()?);

    if flags.contains(OperandFlags::INDEX) {
        let reg = src.read_u8()?;
        let scale = src.read_u8()?;
        a.index = Some(Index { reg, scale });
    }
    if flags.contains(OperandFlags::OFFSET) {
        a.offset = if flags.contains(OperandFlags::WIDE) {
            src.read_u64_le()? as i64
        } else {
            i64::from(src.read_u32_le()? as i32)
        };
    }
    if flags.contains(OperandFlags::SYM) {
        a.symbol = read_symbol(src, symbols)?;
    }

    if flags.contains(OperandFlags::FCONST) {
        a.ty = OperandType::FConst;
        a.float = Some(f64::from_bits(src.read_u64_le()?));
    } else if flags.contains(OperandFlags::SCONST) {
        a.ty = OperandType::SConst;
        let mut s = [0; SCONST_WIDTH];
        src.read_exact(&mut s)?;
        a.string = Some(s);
    }

    // An explicit type code overrides the one implied by a constant payload.
    if flags.contains(OperandFlags::TYPE) {
        a.ty = layout.operand_type(src.read_u8()?);
    }
    if flags.contains(OperandFlags::GOTYPE) {
        a.go_type = Some(read_symbol(src, symbols)?);
    }
    Ok(())
}

fn read_symbol<S: ByteSource + ?Sized>(
    src: &mut S,
    symbols: &SymbolTable,
) -> Result<String, ReadError> {
    let handle = src.read_u8()?;
    Ok(symbols.resolve(handle).to_string())
}
