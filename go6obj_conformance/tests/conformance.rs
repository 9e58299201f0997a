// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(missing_docs, reason = "integration test crate")]

use std::io::Cursor;

use go6obj::filename::FilenameAssembler;
use go6obj::format::{IoSource, ReadError, Reader, Writer};
use go6obj::history::{HistoryOp, LineHistory, Position};
use go6obj::layout::{Layout, Opcode, OperandType};
use go6obj::operand::{OperandFlags, read_operand};
use go6obj::reader::{DecodeError, Field, ObjReader, decode_all};
use go6obj::record::RecordBody;
use go6obj::symtab::SymbolTable;

const L: Layout = Layout::AMD64;
const MOVL: u16 = 114;
const RET: u16 = 200;

fn pos(file: &str, line: u32) -> Option<Position> {
    Some(Position {
        file: file.into(),
        line,
    })
}

/// Appends stream records.
struct Stream(Writer);

impl Stream {
    fn new() -> Self {
        Self(Writer::new())
    }

    fn name(&mut self, kind: u8, handle: u8, name: &str) -> &mut Self {
        self.0.write_u16_le(L.op_name);
        self.0.write_u8(kind);
        self.0.write_u8(handle);
        self.0.write_cstr(name);
        self
    }

    fn path(&mut self, fragments: &[&str]) -> &mut Self {
        for (i, frag) in fragments.iter().enumerate() {
            let handle = u8::try_from(i + 1).unwrap();
            self.name(L.d_file, handle, &format!("<{frag}"));
        }
        self
    }

    fn instr(&mut self, op: u16, line: u32, from: &[u8], to: &[u8]) -> &mut Self {
        self.0.write_u16_le(op);
        self.0.write_u32_le(line);
        self.0.write_bytes(from);
        self.0.write_bytes(to);
        self
    }

    fn history(&mut self, line: u32, to_offset: i32) -> &mut Self {
        let mut to = vec![OperandFlags::OFFSET.bits()];
        to.extend_from_slice(&to_offset.to_le_bytes());
        self.instr(L.op_history, line, &[0], &to)
    }

    fn bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

#[test]
fn golden_declaration_then_reference() {
    // NAME extern handle=3 "x"; MOVL x+0(SB), $0 at no line.
    let expected: &[u8] = &[
        // opcode NAME (132)
        0x84, 0x00, //
        // kind=D_EXTERN(113), handle=3, "x\0"
        0x71, 0x03, b'x', 0x00, //
        // opcode MOVL (114), line 0
        0x72, 0x00, 0x00, 0x00, 0x00, 0x00, //
        // from: T_SYM|T_TYPE, handle 3, type D_EXTERN
        0x11, 0x03, 0x71, //
        // to: T_TYPE, D_CONST(117)
        0x01, 0x75,
    ];

    let mut s = Stream::new();
    s.name(L.d_extern, 3, "x");
    s.instr(
        MOVL,
        0,
        &[(OperandFlags::SYM | OperandFlags::TYPE).bits(), 3, L.d_extern],
        &[OperandFlags::TYPE.bits(), L.d_const],
    );
    assert_eq!(s.bytes(), expected);

    let d = decode_all(expected).unwrap();
    assert_eq!(d.records.len(), 2);
    assert_eq!(d.records[0].name(), Some("x"));
    assert_eq!(d.records[0].from(), None);
    let from = d.records[1].from().unwrap();
    assert_eq!(from.symbol, "x");
    assert_eq!(from.ty, OperandType::Extern);
    assert_eq!(d.records[1].to().unwrap().ty, OperandType::Const);
    assert_eq!(d.records[1].offset, 6);
}

#[test]
fn every_out_of_range_opcode_is_rejected_after_two_bytes() {
    let bad = [0, L.op_last, L.op_last + 1, 0x7fff, u16::MAX];
    for op in bad {
        let mut w = Writer::new();
        w.write_u16_le(op);
        w.write_bytes(&[0xaa; 16]);
        let mut r = Reader::new(w.as_slice());
        let mut rd = ObjReader::new(&mut r);
        assert_eq!(
            rd.next_record(),
            Err(DecodeError::OpcodeOutOfRange { opcode: op })
        );
        drop(rd);
        assert_eq!(r.offset(), 2, "opcode {op}");
    }
}

#[test]
fn symbol_table_register_resolve() {
    let mut t = SymbolTable::new();
    t.register(3, "foo".into());
    assert_eq!(t.resolve(3), "foo");
    assert_eq!(t.resolve(200), "");
}

#[test]
fn filename_fragments_join_once() {
    let mut a = FilenameAssembler::new();
    a.push_fragment("a");
    a.push_fragment("b.go");
    assert_eq!(a.drain_and_join(), "a/b.go");
    assert_eq!(a.drain_and_join(), "");
}

#[test]
fn operand_offsets() {
    let syms = SymbolTable::new();
    let wide = (OperandFlags::OFFSET | OperandFlags::WIDE).bits();
    let a = read_operand(
        &mut Reader::new(&[wide, 1, 0, 0, 0, 0, 0, 0, 0]),
        &syms,
        &L,
    )
    .unwrap();
    assert_eq!(a.offset, 1);

    let narrow = OperandFlags::OFFSET.bits();
    let a = read_operand(
        &mut Reader::new(&[narrow, 0xff, 0xff, 0xff, 0xff]),
        &syms,
        &L,
    )
    .unwrap();
    assert_eq!(a.offset, -1);
}

#[test]
fn history_enter_and_exit() {
    let mut h = LineHistory::new();
    h.enter("main.c", 10);
    assert_eq!(h.position(12), pos("main.c", 2));

    let mut h = LineHistory::new();
    h.enter("outer.c", 0);
    h.enter("main.c", 10);
    h.exit(20);
    assert_eq!(h.position(25), pos("outer.c", 15));
}

#[test]
fn import_populates_map_without_touching_stack() {
    let mut s = Stream::new();
    s.path(&["main.go"]).history(1, 0);
    s.path(&["fmt"]).history(5, -1);
    s.instr(MOVL, 7, &[0], &[0]);

    let d = decode_all(s.bytes()).unwrap();
    let imports: Vec<(u32, &str)> = d
        .history
        .imports()
        .iter()
        .map(|(l, n)| (*l, &**n))
        .collect();
    assert_eq!(imports, [(5, "fmt")]);
    assert_eq!(d.history.depth(), 1);
    assert_eq!(d.records.last().unwrap().pos(), pos("main.go", 6).as_ref());
}

#[test]
fn nested_includes_resolve_per_instruction() {
    let mut s = Stream::new();
    s.path(&["/", "src", "a.c"]).history(1, 0);
    s.instr(MOVL, 2, &[0], &[0]);
    s.path(&["/", "src", "a.h"]).history(3, 0);
    s.instr(MOVL, 5, &[0], &[0]);
    s.history(9, 0);
    s.instr(RET, 10, &[0], &[0]);
    s.history(12, 0);

    let d = decode_all(s.bytes()).unwrap();
    let positions: Vec<_> = d
        .records
        .iter()
        .filter(|r| matches!(r.body, RecordBody::Instr(_)))
        .map(|r| r.pos().cloned())
        .collect();
    assert_eq!(
        positions,
        [pos("/src/a.c", 1), pos("/src/a.h", 2), pos("/src/a.c", 3)]
    );
    let ops: Vec<_> = d.records.iter().filter_map(|r| r.history_op()).collect();
    assert!(matches!(ops[0], HistoryOp::Enter { line: 1, .. }));
    assert!(matches!(ops[1], HistoryOp::Enter { line: 3, .. }));
    assert_eq!(ops[2], &HistoryOp::Exit { line: 9 });
    assert_eq!(ops[3], &HistoryOp::Exit { line: 12 });
    assert_eq!(d.history.depth(), 0);
    assert_eq!(d.history.files(), ["/src/a.c", "/src/a.h"]);
}

#[test]
fn handle_reuse_is_resolved_at_point_of_use() {
    let sym = [OperandFlags::SYM.bits(), 9];
    let mut s = Stream::new();
    s.name(L.d_extern, 9, "first");
    s.instr(MOVL, 0, &sym, &sym);
    s.name(L.d_static, 9, "second");
    s.instr(MOVL, 0, &sym, &[0]);

    let d = decode_all(s.bytes()).unwrap();
    assert_eq!(d.records[1].to().unwrap().symbol, "first");
    assert_eq!(d.records[3].from().unwrap().symbol, "second");
}

#[test]
fn io_source_matches_slice_source() {
    let mut s = Stream::new();
    s.path(&["pkg", "x.go"]).history(1, 0);
    s.name(L.d_extern, 4, "pkg.F");
    s.instr(MOVL, 2, &[OperandFlags::SYM.bits(), 4], &[0]);

    let from_slice = decode_all(s.bytes()).unwrap().records;
    let from_io: Vec<_> = ObjReader::new(IoSource::new(Cursor::new(s.bytes().to_vec())))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(from_slice, from_io);
}

#[test]
fn truncation_at_every_byte_is_reported() {
    let mut s = Stream::new();
    s.name(L.d_extern, 1, "sym");
    s.instr(
        MOVL,
        4,
        &[
            (OperandFlags::INDEX | OperandFlags::OFFSET | OperandFlags::SYM).bits(),
            1,
            2,
            8,
            0,
            0,
            0,
            1,
        ],
        &[OperandFlags::SCONST.bits(), b'a', b'b', b'c', b'd', b'e', b'f', b'g', b'h'],
    );
    let full = s.bytes();
    assert!(decode_all(full).is_ok());

    for cut in 1..full.len() {
        if cut == 8 {
            // Record boundary: the first record decodes and the stream ends cleanly.
            assert_eq!(decode_all(&full[..cut]).unwrap().records.len(), 1);
            continue;
        }
        let (field, source) = match decode_all(&full[..cut]) {
            Err(DecodeError::TruncatedField { field, source }) => (field, source),
            other => panic!("cut {cut}: unexpected {other:?}"),
        };
        assert_eq!(source, ReadError::UnexpectedEof, "cut {cut}");
        let expected = match cut {
            1 | 9 => Field::Opcode,
            2 => Field::SymbolKind,
            3 => Field::SymbolHandle,
            4..=7 => Field::SymbolName,
            10..=13 => Field::LineNumber,
            14..=21 => Field::FromAddress,
            _ => Field::ToAddress,
        };
        assert_eq!(field, expected, "cut {cut}");
    }
}

#[test]
fn custom_layout_changes_pseudo_opcodes() {
    let layout = Layout {
        op_name: 7,
        op_history: 8,
        op_last: 50,
        ..Layout::AMD64
    };
    let mut w = Writer::new();
    w.write_u16_le(7);
    w.write_u8(layout.d_extern);
    w.write_u8(0);
    w.write_cstr("y");
    w.write_u16_le(132);
    let mut rd = ObjReader::with_layout(Reader::new(w.as_slice()), layout);
    assert_eq!(rd.next_record().unwrap().unwrap().opcode, Opcode(7));
    assert_eq!(
        rd.next_record(),
        Err(DecodeError::OpcodeOutOfRange { opcode: 132 })
    );
}
