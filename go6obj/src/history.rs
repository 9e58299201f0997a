// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Virtual line to source position mapping.
//!
//! The stream numbers lines with one global counter across every file fed to the compiler. History
//! records push a file when it is entered and pop it when it ends, so the files form a stack. This
//! module replays those pushes and pops and answers, for any virtual line already covered, which
//! file and which local line it belongs to.
//!
//! Internally the replay is flattened into a timeline of segments. A segment starts at a virtual
//! line and says "from here on, virtual line `L` is line `L - start + base` of `file`". Entering a
//! file starts a segment for it; leaving resumes the enclosing file at the line where it was left.
//! Because the virtual counter never decreases, the timeline stays sorted and lookups are a binary
//! search.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

/// A resolved source position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    /// Source file name.
    pub file: Arc<str>,
    /// Line within `file`.
    pub line: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One history update, as decided from a history record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryOp {
    /// A file begins at `line`; `line` itself is local line `base`.
    Enter {
        /// File being entered.
        file: Arc<str>,
        /// Virtual line of the history record.
        line: u32,
        /// Local line number assigned to `line`.
        base: u32,
    },
    /// The innermost file ends at `line`.
    Exit {
        /// Virtual line of the history record.
        line: u32,
    },
    /// An imported unit named `library` starts at `line`.
    Import {
        /// Virtual line of the history record.
        line: u32,
        /// Imported library path.
        library: Arc<str>,
    },
}

impl HistoryOp {
    /// Returns the virtual line the operation applies at.
    #[must_use]
    pub fn line(&self) -> u32 {
        match self {
            Self::Enter { line, .. } | Self::Exit { line } | Self::Import { line, .. } => *line,
        }
    }
}

/// A well-formedness problem that the history tolerates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Anomaly {
    /// An exit arrived with no file on the stack; it was ignored.
    PopOnEmptyHistory {
        /// Virtual line of the exit.
        line: u32,
    },
    /// A history line was lower than an earlier one; it was raised to `last`.
    LineWentBackwards {
        /// Line as recorded.
        line: u32,
        /// Highest line seen before.
        last: u32,
    },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PopOnEmptyHistory { line } => {
                write!(f, "history exit at line {line} with no open file")
            }
            Self::LineWentBackwards { line, last } => {
                write!(f, "history line {line} precedes earlier line {last}")
            }
        }
    }
}

/// An active file on the history stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// File name.
    pub file: Arc<str>,
    /// Virtual line at which the file was entered.
    pub start: u32,
    /// Local line assigned to `start`.
    pub base: u32,
    /// Local line of the enclosing file when this one was entered.
    resume: Option<u32>,
}

#[derive(Clone, Debug)]
struct Segment {
    start: u32,
    file: Option<Arc<str>>,
    base: u32,
}

/// Source-position history of one stream.
#[derive(Clone, Debug, Default)]
pub struct LineHistory {
    stack: Vec<Frame>,
    segments: Vec<Segment>,
    imports: BTreeMap<u32, Arc<str>>,
}

impl LineHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `file` starting at virtual line `line`, where `line` is local line 0.
    pub fn enter(&mut self, file: impl Into<Arc<str>>, line: u32) -> Option<Anomaly> {
        self.enter_at(file.into(), line, 0)
    }

    /// Pushes `file` starting at virtual line `line`, where `line` is local line `base`.
    pub fn enter_at(&mut self, file: Arc<str>, line: u32, base: u32) -> Option<Anomaly> {
        let (line, anomaly) = self.clamp(line);
        let resume = self.position(line).map(|p| p.line);
        self.push_segment(Segment {
            start: line,
            file: Some(file.clone()),
            base,
        });
        self.stack.push(Frame {
            file,
            start: line,
            base,
            resume,
        });
        anomaly
    }

    /// Pops the innermost file at virtual line `line`; the enclosing file resumes where it left off.
    pub fn exit(&mut self, line: u32) -> Option<Anomaly> {
        let (line, anomaly) = self.clamp(line);
        let Some(frame) = self.stack.pop() else {
            return Some(Anomaly::PopOnEmptyHistory { line });
        };
        let seg = match self.stack.last() {
            Some(parent) => Segment {
                start: line,
                file: Some(parent.file.clone()),
                base: frame.resume.unwrap_or(0),
            },
            None => Segment {
                start: line,
                file: None,
                base: 0,
            },
        };
        self.push_segment(seg);
        anomaly
    }

    /// Records that an imported unit named `library` starts at `line`.
    ///
    /// Imports are kept apart from the file stack and do not change positions.
    pub fn record_import(&mut self, line: u32, library: impl Into<Arc<str>>) {
        self.imports.insert(line, library.into());
    }

    /// Applies a decoded history operation.
    pub fn apply(&mut self, op: &HistoryOp) -> Option<Anomaly> {
        match op {
            HistoryOp::Enter { file, line, base } => self.enter_at(file.clone(), *line, *base),
            HistoryOp::Exit { line } => self.exit(*line),
            HistoryOp::Import { line, library } => {
                self.record_import(*line, library.clone());
                None
            }
        }
    }

    /// Resolves virtual line `line` to a file and local line.
    ///
    /// Returns `None` before the first file is entered and after the outermost file exits.
    #[must_use]
    pub fn position(&self, line: u32) -> Option<Position> {
        let ix = self.segments.partition_point(|s| s.start <= line);
        let seg = self.segments.get(ix.checked_sub(1)?)?;
        let file = seg.file.clone()?;
        Some(Position {
            file,
            line: (line - seg.start).saturating_add(seg.base),
        })
    }

    /// Returns the number of open files.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns the open files, outermost first.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.stack
    }

    /// Returns the recorded imports by virtual line.
    #[must_use]
    pub fn imports(&self) -> &BTreeMap<u32, Arc<str>> {
        &self.imports
    }

    /// Returns every file that appears in the history, in first-entered order.
    #[must_use]
    pub fn files(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for seg in &self.segments {
            if let Some(f) = &seg.file {
                if !out.iter().any(|o| **o == **f) {
                    out.push(String::from(&**f));
                }
            }
        }
        out
    }

    fn last_line(&self) -> Option<u32> {
        self.segments.last().map(|s| s.start)
    }

    fn clamp(&self, line: u32) -> (u32, Option<Anomaly>) {
        match self.last_line() {
            Some(last) if line < last => (last, Some(Anomaly::LineWentBackwards { line, last })),
            _ => (line, None),
        }
    }

    fn push_segment(&mut self, seg: Segment) {
        // A later segment at the same line supersedes the earlier one.
        if self.segments.last().is_some_and(|s| s.start == seg.start) {
            self.segments.pop();
        }
        self.segments.push(seg);
    }
}
