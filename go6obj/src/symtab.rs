// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handle-to-name table.
//!
//! Declarations assign names to 8-bit handles and later operands refer to them by handle. The
//! stream reuses handles freely, so a handle must be resolved when it is used: a later
//! declaration overwrites the slot and does not affect operands already decoded.

use alloc::string::String;

/// Number of symbol slots (one per 8-bit handle).
pub const SYMBOL_SLOTS: usize = 256;

/// Fixed-size table of symbol names indexed by handle.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    slots: [Option<String>; SYMBOL_SLOTS],
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [const { None }; SYMBOL_SLOTS],
        }
    }

    /// Stores `name` at `handle`, replacing whatever was there.
    pub fn register(&mut self, handle: u8, name: String) {
        self.slots[usize::from(handle)] = Some(name);
    }

    /// Returns the name currently held by `handle`, or `""` if the slot was never written.
    #[must_use]
    pub fn resolve(&self, handle: u8) -> &str {
        self.slots[usize::from(handle)].as_deref().unwrap_or("")
    }

    /// Returns `true` if `handle` has been assigned.
    #[must_use]
    pub fn is_registered(&self, handle: u8) -> bool {
        self.slots[usize::from(handle)].is_some()
    }

    /// Iterates over assigned handles and their current names.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> + '_ {
        (0..=u8::MAX).filter_map(|h| Some((h, self.slots[usize::from(h)].as_deref()?)))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
