// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Record stream decoder.
//!
//! [`ObjReader`] pulls one record per call. Each record starts with a 2-byte opcode:
//!
//! - `NAME`: symbol kind (1 byte), handle (1 byte), NUL-terminated name.
//! - `SIGNAME`: a 4-byte signature, then the `NAME` layout.
//! - anything else: virtual line (4 bytes), then the `from` and `to` operands.
//!
//! Declarations update the symbol table (and, for file markers, the pending path). `HISTORY`
//! records update the source-position history. Every other instruction with a nonzero line gets
//! its position resolved against the history as it stands at that point in the stream.
//!
//! Decoding state only moves forward. After an error or the end of input the reader is fused and
//! yields nothing further.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;

use crate::filename::FilenameAssembler;
use crate::format::{ByteSource, ReadError, Reader};
use crate::history::{Anomaly, HistoryOp, LineHistory};
use crate::layout::{Layout, Opcode, OpcodeClass, OperandType};
use crate::operand::read_operand;
use crate::record::{Instr, Record, RecordBody, SymbolDecl};
use crate::symtab::SymbolTable;
use crate::trace::{TraceMask, TraceSink};

/// The field being read when a record was cut short.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    /// Record opcode.
    Opcode,
    /// Signature of a signed declaration.
    Signature,
    /// Symbol kind of a declaration.
    SymbolKind,
    /// Handle of a declaration.
    SymbolHandle,
    /// Name of a declaration.
    SymbolName,
    /// Virtual line of an instruction.
    LineNumber,
    /// Source operand.
    FromAddress,
    /// Destination operand.
    ToAddress,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Opcode => "opcode",
            Self::Signature => "signature",
            Self::SymbolKind => "symbol kind",
            Self::SymbolHandle => "symbol handle",
            Self::SymbolName => "symbol name",
            Self::LineNumber => "line number",
            Self::FromAddress => "from address",
            Self::ToAddress => "to address",
        })
    }
}

/// Decoding failure. Always fatal for the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// Opcode outside the layout's sentinels. Only the opcode bytes were consumed.
    OpcodeOutOfRange {
        /// The raw opcode.
        opcode: u16,
    },
    /// A read failed partway through a record.
    TruncatedField {
        /// The field being read.
        field: Field,
        /// Underlying cause.
        source: ReadError,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpcodeOutOfRange { opcode } => write!(f, "opcode {opcode} out of range"),
            Self::TruncatedField { field, source } => {
                write!(f, "error while reading {field}: {source}")
            }
        }
    }
}

impl core::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::OpcodeOutOfRange { .. } => None,
            Self::TruncatedField { source, .. } => Some(source),
        }
    }
}

fn truncated(field: Field) -> impl FnOnce(ReadError) -> DecodeError {
    move |source| DecodeError::TruncatedField { field, source }
}

/// Mask-filtered view of an optional sink.
struct Tracer<'a> {
    sink: Option<&'a mut dyn TraceSink>,
    mask: TraceMask,
}

impl<'a> Tracer<'a> {
    fn new(sink: Option<&'a mut dyn TraceSink>) -> Self {
        let mask = sink.as_ref().map_or(TraceMask::NONE, |s| s.mask());
        Self { sink, mask }
    }

    fn sink(&mut self, want: TraceMask) -> Option<&mut (dyn TraceSink + 'a)> {
        if self.mask.contains(want) {
            self.sink.as_deref_mut()
        } else {
            None
        }
    }

    fn record(&mut self, record: &Record) {
        if let Some(s) = self.sink(TraceMask::RECORD) {
            s.record(record);
        }
    }

    fn symbol(&mut self, decl: &SymbolDecl) {
        if let Some(s) = self.sink(TraceMask::SYMBOL) {
            s.symbol(decl);
        }
    }

    fn history(&mut self, op: &HistoryOp, depth: usize) {
        if let Some(s) = self.sink(TraceMask::HISTORY) {
            s.history(op, depth);
        }
    }

    fn anomaly(&mut self, anomaly: Anomaly) {
        if let Some(s) = self.sink(TraceMask::ANOMALY) {
            s.anomaly(anomaly);
        }
    }
}

/// Pull-based decoder over one object stream.
#[derive(Debug)]
pub struct ObjReader<S> {
    src: S,
    layout: Layout,
    symbols: SymbolTable,
    filenames: FilenameAssembler,
    history: LineHistory,
    name_buf: Vec<u8>,
    done: bool,
}

impl<S: ByteSource> ObjReader<S> {
    /// Creates a decoder using [`Layout::AMD64`].
    pub fn new(src: S) -> Self {
        Self::with_layout(src, Layout::AMD64)
    }

    /// Creates a decoder with an explicit layout.
    pub fn with_layout(src: S, layout: Layout) -> Self {
        Self {
            src,
            layout,
            symbols: SymbolTable::new(),
            filenames: FilenameAssembler::new(),
            history: LineHistory::new(),
            name_buf: Vec::new(),
            done: false,
        }
    }

    /// Returns the layout in use.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Returns the symbol table as of the last decoded record.
    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Returns the source-position history accumulated so far.
    #[must_use]
    pub fn history(&self) -> &LineHistory {
        &self.history
    }

    /// Returns the imports recorded so far, by virtual line.
    #[must_use]
    pub fn imports(&self) -> &BTreeMap<u32, Arc<str>> {
        self.history.imports()
    }

    /// Returns the history together with the imports.
    #[must_use]
    pub fn files(&self) -> (&LineHistory, &BTreeMap<u32, Arc<str>>) {
        (&self.history, self.history.imports())
    }

    /// Returns the number of bytes consumed.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.src.position()
    }

    /// Returns `true` once the stream ended or failed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Consumes the decoder and returns its history.
    #[must_use]
    pub fn into_history(self) -> LineHistory {
        self.history
    }

    /// Decodes the next record.
    ///
    /// Returns `Ok(None)` at a clean end of input.
    pub fn next_record(&mut self) -> Result<Option<Record>, DecodeError> {
        self.next_record_traced(None)
    }

    /// Decodes the next record, reporting events to `sink`.
    pub fn next_record_traced(
        &mut self,
        sink: Option<&mut dyn TraceSink>,
    ) -> Result<Option<Record>, DecodeError> {
        if self.done {
            return Ok(None);
        }
        let mut tracer = Tracer::new(sink);
        let res = self.decode(&mut tracer);
        if !matches!(res, Ok(Some(_))) {
            self.done = true;
        }
        res
    }

    fn decode(&mut self, t: &mut Tracer<'_>) -> Result<Option<Record>, DecodeError> {
        let offset = self.src.position();
        if self.src.at_end().map_err(truncated(Field::Opcode))? {
            return Ok(None);
        }
        let opcode = Opcode(self.src.read_u16_le().map_err(truncated(Field::Opcode))?);
        if !self.layout.in_range(opcode) {
            return Err(DecodeError::OpcodeOutOfRange { opcode: opcode.0 });
        }

        let body = match self.layout.classify(opcode) {
            OpcodeClass::Name => RecordBody::Symbol(self.read_decl(false, t)?),
            OpcodeClass::SigName => RecordBody::Symbol(self.read_decl(true, t)?),
            OpcodeClass::History => {
                let instr = self.read_instr()?;
                let op = self.history_op(&instr);
                if let Some(anomaly) = self.history.apply(&op) {
                    t.anomaly(anomaly);
                }
                t.history(&op, self.history.depth());
                RecordBody::History { instr, op }
            }
            OpcodeClass::Instruction => {
                let mut instr = self.read_instr()?;
                if instr.line != 0 {
                    instr.pos = self.history.position(instr.line);
                }
                RecordBody::Instr(instr)
            }
        };

        let record = Record {
            opcode,
            offset,
            body,
        };
        t.record(&record);
        Ok(Some(record))
    }

    fn read_decl(&mut self, signed: bool, t: &mut Tracer<'_>) -> Result<SymbolDecl, DecodeError> {
        let signature = if signed {
            Some(self.src.read_u32_le().map_err(truncated(Field::Signature))?)
        } else {
            None
        };
        let kind = self.src.read_u8().map_err(truncated(Field::SymbolKind))?;
        let handle = self.src.read_u8().map_err(truncated(Field::SymbolHandle))?;
        self.name_buf.clear();
        self.src
            .read_cstr(&mut self.name_buf)
            .map_err(truncated(Field::SymbolName))?;
        let name = String::from_utf8_lossy(&self.name_buf).into_owned();

        let kind = self.layout.operand_type(kind);
        if kind == OperandType::File {
            // Path elements carry a one-character prefix.
            let mut rest = name.chars();
            rest.next();
            self.filenames.push_fragment(rest.as_str());
        }
        self.symbols.register(handle, name.clone());

        let decl = SymbolDecl {
            kind,
            handle,
            name,
            signature,
        };
        t.symbol(&decl);
        Ok(decl)
    }

    fn read_instr(&mut self) -> Result<Instr, DecodeError> {
        let line = self
            .src
            .read_u32_le()
            .map_err(truncated(Field::LineNumber))?;
        let from = read_operand(&mut self.src, &self.symbols, &self.layout)
            .map_err(|e| truncated(Field::FromAddress)(e.source))?;
        let to = read_operand(&mut self.src, &self.symbols, &self.layout)
            .map_err(|e| truncated(Field::ToAddress)(e.source))?;
        Ok(Instr {
            line,
            pos: None,
            from,
            to,
        })
    }

    /// Decides what a history record does.
    ///
    /// A `to` offset of `-1` marks an import. Otherwise a pending path opens that file and no
    /// path closes the innermost one. A positive offset alongside a path is a line directive: the
    /// line after the record is local line `offset`.
    fn history_op(&mut self, instr: &Instr) -> HistoryOp {
        let path = self.filenames.drain_and_join();
        let line = instr.line;
        match instr.to.offset {
            -1 => HistoryOp::Import {
                line,
                library: path.into(),
            },
            _ if path.is_empty() => HistoryOp::Exit { line },
            off => HistoryOp::Enter {
                file: path.into(),
                line,
                base: if off > 0 {
                    u32::try_from(off - 1).unwrap_or(u32::MAX)
                } else {
                    0
                },
            },
        }
    }
}

impl<S: ByteSource> Iterator for ObjReader<S> {
    type Item = Result<Record, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

impl<S: ByteSource> FusedIterator for ObjReader<S> {}

/// A fully decoded stream.
#[derive(Clone, Debug)]
pub struct Decoded {
    /// Records in stream order.
    pub records: Vec<Record>,
    /// Final history, imports included.
    pub history: LineHistory,
}

/// Decodes every record in `bytes` using [`Layout::AMD64`].
pub fn decode_all(bytes: &[u8]) -> Result<Decoded, DecodeError> {
    decode_all_with_layout(bytes, Layout::AMD64)
}

/// Decodes every record in `bytes` using `layout`.
pub fn decode_all_with_layout(bytes: &[u8], layout: Layout) -> Result<Decoded, DecodeError> {
    let mut rd = ObjReader::with_layout(Reader::new(bytes), layout);
    let mut records = Vec::new();
    while let Some(record) = rd.next_record()? {
        records.push(record);
    }
    Ok(Decoded {
        records,
        history: rd.into_history(),
    })
}
