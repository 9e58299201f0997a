// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Disassembler example.
//!
//! Run with:
//! `cargo run -p go6obj --example disasm`

use go6obj::disasm::Listing;
use go6obj::format::Writer;
use go6obj::layout::Layout;
use go6obj::operand::OperandFlags;
use go6obj::reader::decode_all;

const MOVL: u16 = 114;

fn main() {
    let l = Layout::AMD64;
    let mut w = Writer::new();

    // main.go opens at virtual line 1.
    for (handle, frag) in [(1, "</"), (2, "<src"), (3, "<main.go")] {
        w.write_u16_le(l.op_name);
        w.write_u8(l.d_file);
        w.write_u8(handle);
        w.write_cstr(frag);
    }
    w.write_u16_le(l.op_history);
    w.write_u32_le(1);
    w.write_bytes(&[0, 0]);

    // MOVL $42, main.counter+0(SB) on local line 3.
    w.write_u16_le(l.op_name);
    w.write_u8(l.d_extern);
    w.write_u8(4);
    w.write_cstr("main.counter");
    w.write_u16_le(MOVL);
    w.write_u32_le(4);
    w.write_u8((OperandFlags::OFFSET | OperandFlags::TYPE).bits());
    w.write_u32_le(42);
    w.write_u8(l.d_const);
    w.write_u8((OperandFlags::SYM | OperandFlags::TYPE).bits());
    w.write_u8(4);
    w.write_u8(l.d_extern);

    // main.go closes.
    w.write_u16_le(l.op_history);
    w.write_u32_le(10);
    w.write_bytes(&[0, 0]);

    let decoded = decode_all(w.as_slice()).unwrap();
    print!("{}", Listing::new(&decoded.records, &l));
    println!("files: {:?}", decoded.history.files());
}
