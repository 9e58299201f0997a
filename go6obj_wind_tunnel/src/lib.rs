// Copyright 2026 the Go6obj Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `go6obj`. See `benches/decode.rs`.
