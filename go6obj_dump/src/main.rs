// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![doc = "Dumps a 6g object stream.\n\n\
          Prints one line per record, then the files recorded by the history and the imports.\n\
          Usage: `go6obj_dump <object> [layout.json]`. Set `GO6OBJ_TRACE=1` to log every\n\
          symbol and history event to stderr.\n"]

use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use go6obj::format::IoSource;
use go6obj::history::{Anomaly, HistoryOp};
use go6obj::layout::Layout;
use go6obj::reader::ObjReader;
use go6obj::record::SymbolDecl;
use go6obj::trace::{TraceMask, TraceSink};

/// Logs decoder events to stderr.
struct StderrSink {
    mask: TraceMask,
}

impl StderrSink {
    fn from_env() -> Self {
        let verbose = std::env::var_os("GO6OBJ_TRACE").is_some_and(|v| v != "0");
        let mask = if verbose {
            TraceMask::SYMBOL | TraceMask::HISTORY | TraceMask::ANOMALY
        } else {
            TraceMask::ANOMALY
        };
        Self { mask }
    }
}

impl TraceSink for StderrSink {
    fn mask(&self) -> TraceMask {
        self.mask
    }

    fn symbol(&mut self, decl: &SymbolDecl) {
        eprintln!("go6obj: symbol {} = {:?} ({:?})", decl.handle, decl.name, decl.kind);
    }

    fn history(&mut self, op: &HistoryOp, depth: usize) {
        eprintln!("go6obj: history {op:?} depth={depth}");
    }

    fn anomaly(&mut self, anomaly: Anomaly) {
        eprintln!("go6obj: warning: {anomaly}");
    }
}

fn load_layout(path: &Path) -> Result<Layout> {
    let json = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_layout(&json).with_context(|| format!("parse {}", path.display()))
}

fn parse_layout(json: &str) -> Result<Layout> {
    let layout: Layout = serde_json::from_str(json)?;
    if layout.op_xxx >= layout.op_last {
        bail!(
            "empty opcode range: op_xxx={} op_last={}",
            layout.op_xxx,
            layout.op_last
        );
    }
    Ok(layout)
}

fn dump<R: BufRead, W: Write>(
    src: R,
    layout: &Layout,
    sink: &mut dyn TraceSink,
    out: &mut W,
) -> Result<()> {
    let mut rd = ObjReader::with_layout(IoSource::new(src), layout.clone());
    loop {
        let at = rd.position();
        let record = match rd.next_record_traced(Some(&mut *sink)) {
            Ok(Some(record)) => record,
            Ok(None) => break,
            Err(e) => {
                out.flush()?;
                return Err(e).with_context(|| format!("record at byte {at}"));
            }
        };
        writeln!(out, "{:08x}  {}", record.offset, record.display(layout))?;
    }

    let (history, imports) = rd.files();
    writeln!(out)?;
    writeln!(out, "files:")?;
    for file in history.files() {
        writeln!(out, "  {file}")?;
    }
    writeln!(out, "imports:")?;
    for (line, lib) in imports {
        writeln!(out, "  {line}: {lib}")?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let usage = "usage: go6obj_dump <object> [layout.json]";
    let mut args = std::env::args().skip(1);
    let obj_path: PathBuf = args.next().map(PathBuf::from).context(usage)?;
    let layout = match args.next() {
        Some(p) => load_layout(Path::new(&p))?,
        None => Layout::AMD64,
    };
    if args.next().is_some() {
        bail!(usage);
    }

    let file =
        fs::File::open(&obj_path).with_context(|| format!("open {}", obj_path.display()))?;
    let mut sink = StderrSink::from_env();
    let mut out = BufWriter::new(io::stdout().lock());
    dump(BufReader::new(file), &layout, &mut sink, &mut out)
        .with_context(|| format!("decode {}", obj_path.display()))
}
