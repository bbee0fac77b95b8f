// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the recorder event feed
//!
//! Drives the `Recorder` state machine line-by-line with arbitrary input;
//! it may reject lines but must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

use logweave_report::recorder::Recorder;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut recorder = Recorder::new(Vec::new(), Vec::new());

        for line in input.lines() {
            let _ = recorder.process_line(line);
        }

        // Finalize should never panic.
        let _ = recorder.finalize();
    }
});
