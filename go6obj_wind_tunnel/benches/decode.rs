// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(missing_docs, reason = "benchmark harness")]

use std::io::Cursor;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use go6obj::format::{IoSource, Reader, Writer};
use go6obj::history::{Anomaly, HistoryOp};
use go6obj::layout::Layout;
use go6obj::operand::OperandFlags;
use go6obj::reader::{ObjReader, decode_all};
use go6obj::record::{Record, SymbolDecl};
use go6obj::trace::{TraceMask, TraceSink};

const MOVL: u16 = 114;
const SIZES: [u32; 4] = [100, 1_000, 10_000, 50_000];

fn bench_decode(c: &mut Criterion) {
    bench_decode_slice(c);
    bench_decode_io(c);
    bench_decode_traced(c);
    bench_include_heavy(c);
}

fn bench_decode_slice(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_slice");
    for &n in &SIZES {
        let bytes = build_stream(n, 0);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &bytes, |b, bytes| {
            b.iter(|| {
                let d = decode_all(bytes).unwrap();
                black_box(d);
            });
        });
    }
    group.finish();
}

fn bench_decode_io(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_io");
    for &n in &SIZES[..3] {
        let bytes = build_stream(n, 0);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &bytes, |b, bytes| {
            b.iter(|| {
                let rd = ObjReader::new(IoSource::new(Cursor::new(bytes.as_slice())));
                let count = rd.map(|r| r.unwrap()).count();
                black_box(count);
            });
        });
    }
    group.finish();
}

fn bench_decode_traced(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_traced_all");
    for &n in &SIZES[..3] {
        let bytes = build_stream(n, 0);
        let mut sink = Counting::default();
        group.bench_with_input(BenchmarkId::from_parameter(n), &bytes, |b, bytes| {
            b.iter(|| {
                let mut rd = ObjReader::new(Reader::new(bytes));
                while let Some(r) = rd.next_record_traced(Some(&mut sink)).unwrap() {
                    black_box(r);
                }
            });
        });
        black_box(sink.events);
    }
    group.finish();
}

fn bench_include_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_include_every");
    for &every in &[2_u32, 16, 128] {
        let bytes = build_stream(10_000, every);
        group.bench_with_input(BenchmarkId::from_parameter(every), &bytes, |b, bytes| {
            b.iter(|| {
                let d = decode_all(bytes).unwrap();
                black_box(d.history.files().len());
            });
        });
    }
    group.finish();
}

#[derive(Default)]
struct Counting {
    events: u64,
}

impl TraceSink for Counting {
    fn mask(&self) -> TraceMask {
        TraceMask::ALL
    }

    fn record(&mut self, _record: &Record) {
        self.events += 1;
    }

    fn symbol(&mut self, _decl: &SymbolDecl) {
        self.events += 1;
    }

    fn history(&mut self, _op: &HistoryOp, _depth: usize) {
        self.events += 1;
    }

    fn anomaly(&mut self, _anomaly: Anomaly) {
        self.events += 1;
    }
}

/// Builds a stream of `n` instructions in one file.
///
/// With `include_every > 0`, every that many instructions a header is entered and left again.
fn build_stream(n: u32, include_every: u32) -> Vec<u8> {
    let l = Layout::AMD64;
    let mut w = Writer::new();

    file(&mut w, &l, &["/", "src", "bench", "main.go"]);
    history(&mut w, &l, 1, 0);

    for h in 1..=64_u8 {
        w.write_u16_le(l.op_name);
        w.write_u8(l.d_extern);
        w.write_u8(h);
        w.write_cstr(&format!("bench.sym{h}"));
    }

    let mut line = 2;
    for i in 0..n {
        if include_every > 0 && i % include_every == include_every - 1 {
            file(&mut w, &l, &["/", "src", "bench", "inc.h"]);
            history(&mut w, &l, line, 0);
            line += 3;
            history(&mut w, &l, line, 0);
        }
        let h = u8::try_from(i % 64).unwrap() + 1;
        w.write_u16_le(MOVL);
        w.write_u32_le(line);
        w.write_u8((OperandFlags::OFFSET | OperandFlags::TYPE).bits());
        w.write_u32_le(i);
        w.write_u8(l.d_const);
        w.write_u8((OperandFlags::SYM | OperandFlags::OFFSET | OperandFlags::TYPE).bits());
        w.write_u32_le(8);
        w.write_u8(h);
        w.write_u8(l.d_extern);
        line += 1;
    }

    history(&mut w, &l, line, 0);
    w.into_vec()
}

fn file(w: &mut Writer, l: &Layout, fragments: &[&str]) {
    for (i, frag) in fragments.iter().enumerate() {
        w.write_u16_le(l.op_name);
        w.write_u8(l.d_file);
        w.write_u8(u8::try_from(i + 1).unwrap());
        w.write_cstr(&format!("<{frag}"));
    }
}

fn history(w: &mut Writer, l: &Layout, line: u32, to_offset: u32) {
    w.write_u16_le(l.op_history);
    w.write_u32_le(line);
    w.write_u8(0);
    w.write_u8(OperandFlags::OFFSET.bits());
    w.write_u32_le(to_offset);
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .warm_up_time(std::time::Duration::from_millis(300))
        .measurement_time(std::time::Duration::from_millis(1200))
        .sample_size(60);
    targets = bench_decode
}
criterion_main!(benches);
