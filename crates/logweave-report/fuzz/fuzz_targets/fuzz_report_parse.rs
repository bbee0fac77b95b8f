// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the report artifact reader
//!
//! Arbitrary bytes are rarely a well-formed artifact; the reader may error
//! but must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

use logweave_report::junit::read_cases;

fuzz_target!(|data: &[u8]| {
    let _ = read_cases(data);
});
