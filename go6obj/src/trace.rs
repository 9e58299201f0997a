// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing hooks for the record decoder.
//!
//! Tracing is optional and `no_std` friendly. The decoder only emits events requested by a
//! [`TraceMask`].
//!
//! To enable tracing, pass a [`TraceSink`] to [`ObjReader::next_record_traced`].

#[cfg(doc)]
use crate::reader::ObjReader;

use crate::history::{Anomaly, HistoryOp};
use crate::record::{Record, SymbolDecl};

/// A set of trace events requested by a [`TraceSink`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TraceMask(u32);

impl core::ops::BitOr for TraceMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for TraceMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl TraceMask {
    /// No tracing.
    pub const NONE: Self = Self(0);
    /// Trace every decoded record.
    ///
    /// Enables [`TraceSink::record`].
    pub const RECORD: Self = Self(1 << 0);
    /// Trace symbol registrations.
    ///
    /// Enables [`TraceSink::symbol`].
    pub const SYMBOL: Self = Self(1 << 1);
    /// Trace history updates.
    ///
    /// Enables [`TraceSink::history`].
    pub const HISTORY: Self = Self(1 << 2);
    /// Trace tolerated malformations.
    ///
    /// Enables [`TraceSink::anomaly`].
    pub const ANOMALY: Self = Self(1 << 3);
    /// Everything.
    pub const ALL: Self = Self(0b1111);

    /// Returns `true` if this mask includes all bits in `other`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

/// A trace sink that can receive decoder events.
pub trait TraceSink {
    /// Returns the set of events the sink wants.
    fn mask(&self) -> TraceMask {
        TraceMask::NONE
    }

    /// Called once per successfully decoded record, after all side effects were applied.
    ///
    /// Called only if `mask()` includes [`TraceMask::RECORD`].
    fn record(&mut self, _record: &Record) {}

    /// Called when a declaration assigns a handle.
    ///
    /// Called only if `mask()` includes [`TraceMask::SYMBOL`].
    fn symbol(&mut self, _decl: &SymbolDecl) {}

    /// Called after a history update.
    ///
    /// Called only if `mask()` includes [`TraceMask::HISTORY`].
    ///
    /// - `op`: the applied update
    /// - `depth`: open files after the update
    fn history(&mut self, _op: &HistoryOp, _depth: usize) {}

    /// Called when the decoder tolerates a malformed history sequence.
    ///
    /// Called only if `mask()` includes [`TraceMask::ANOMALY`].
    fn anomaly(&mut self, _anomaly: Anomaly) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_contains() {
        let m = TraceMask::RECORD | TraceMask::ANOMALY;
        assert!(m.contains(TraceMask::RECORD));
        assert!(!m.contains(TraceMask::SYMBOL));
        assert!(TraceMask::ALL.contains(m));
        assert!(m.contains(TraceMask::NONE));

        let mut n = TraceMask::NONE;
        n |= TraceMask::HISTORY;
        assert_eq!(n, TraceMask::HISTORY);
    }
}
