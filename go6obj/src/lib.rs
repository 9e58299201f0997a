// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `go6obj`: a decoder for the 6g intermediate object record stream.
//!
//! The stream is a flat sequence of opcode-tagged records: symbol declarations that bind names
//! to 8-bit handles, instructions with two operands each, and history markers that describe which
//! source file every virtual line belongs to. [`reader::ObjReader`] decodes it one record at a
//! time, resolving symbol handles and source positions as it goes.
//!
//! ## Example
//!
//! ```
//! use go6obj::format::{Reader, Writer};
//! use go6obj::layout::Layout;
//! use go6obj::operand::OperandFlags;
//! use go6obj::reader::ObjReader;
//!
//! let l = Layout::AMD64;
//! let mut w = Writer::new();
//! // NAME: handle 3 is "x".
//! w.write_u16_le(l.op_name);
//! w.write_u8(l.d_extern);
//! w.write_u8(3);
//! w.write_cstr("x");
//! // An instruction whose source operand refers to handle 3.
//! w.write_u16_le(114);
//! w.write_u32_le(0);
//! w.write_bytes(&[OperandFlags::SYM.bits(), 3]);
//! w.write_u8(0);
//!
//! let mut rd = ObjReader::new(Reader::new(w.as_slice()));
//! let decl = rd.next_record()?.unwrap();
//! assert_eq!(decl.name(), Some("x"));
//! let instr = rd.next_record()?.unwrap();
//! assert_eq!(instr.from().unwrap().symbol, "x");
//! assert!(rd.next_record()?.is_none());
//! # Ok::<(), go6obj::reader::DecodeError>(())
//! ```

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod disasm;
pub mod filename;
pub mod format;
pub mod history;
pub mod layout;
pub mod operand;
pub mod reader;
pub mod record;
pub mod symtab;
pub mod trace;
