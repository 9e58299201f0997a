// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path assembly from file-marker declarations.
//!
//! A source path is emitted as a run of file-marker symbol declarations, one path element each.
//! The elements are buffered here until the next history record joins them.

use alloc::string::String;
use alloc::vec::Vec;

/// Pending path fragments.
#[derive(Clone, Debug, Default)]
pub struct FilenameAssembler {
    fragments: Vec<String>,
}

impl FilenameAssembler {
    /// Creates an empty assembler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one path fragment.
    pub fn push_fragment(&mut self, text: impl Into<String>) {
        self.fragments.push(text.into());
    }

    /// Returns `true` if no fragments are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Joins the pending fragments into one path and clears them.
    ///
    /// Empty fragments are ignored; with nothing to join the result is `""`.
    pub fn drain_and_join(&mut self) -> String {
        let mut joined = String::new();
        for frag in self.fragments.drain(..).filter(|f| !f.is_empty()) {
            if !joined.is_empty() {
                joined.push('/');
            }
            joined.push_str(&frag);
        }
        if joined.is_empty() {
            return joined;
        }
        clean(&joined)
    }
}

/// Lexically normalizes a slash-separated path.
///
/// Repeated separators collapse, `.` elements drop, and `..` removes the preceding element (or is
/// kept when there is nothing to remove in a relative path).
fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for elem in path.split('/') {
        match elem {
            "" | "." => {}
            ".." => match parts.last().copied() {
                Some(last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            e => parts.push(e),
        }
    }

    let mut out = String::new();
    if rooted {
        out.push('/');
    }
    for (i, p) in parts.iter().enumerate() {
        if i > 0 {
            out.push('/');
        }
        out.push_str(p);
    }
    if out.is_empty() {
        out.push('.');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_in_order_and_clears() {
        let mut a = FilenameAssembler::new();
        a.push_fragment("a");
        a.push_fragment("b.go");
        assert_eq!(a.drain_and_join(), "a/b.go");
        assert!(a.is_empty());
        assert_eq!(a.drain_and_join(), "");
    }

    #[test]
    fn rooted_first_fragment() {
        let mut a = FilenameAssembler::new();
        a.push_fragment("/");
        a.push_fragment("usr");
        a.push_fragment("go");
        a.push_fragment("src");
        a.push_fragment("x.go");
        assert_eq!(a.drain_and_join(), "/usr/go/src/x.go");
    }

    #[test]
    fn empty_fragments_are_ignored() {
        let mut a = FilenameAssembler::new();
        a.push_fragment("");
        assert_eq!(a.drain_and_join(), "");
        a.push_fragment("");
        a.push_fragment("main.go");
        assert_eq!(a.drain_and_join(), "main.go");
    }

    #[test]
    fn clean_normalizes() {
        assert_eq!(clean("a//b/./c"), "a/b/c");
        assert_eq!(clean("a/b/../c"), "a/c");
        assert_eq!(clean("../x"), "../x");
        assert_eq!(clean("/../x"), "/x");
        assert_eq!(clean("a/.."), ".");
    }
}
