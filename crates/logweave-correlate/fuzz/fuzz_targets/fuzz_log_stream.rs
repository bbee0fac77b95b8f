// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the streaming correlator
//!
//! Feeds arbitrary bytes through the correlator against a small interval
//! set; decode errors are expected, panics are not.

#![no_main]

use libfuzzer_sys::fuzz_target;

use chrono::{TimeZone, Utc};
use logweave_correlate::correlator::Correlator;
use logweave_correlate::interval::Interval;

fuzz_target!(|data: &[u8]| {
    let intervals = vec![
        Interval::new(
            "Fuzz one",
            Utc.timestamp_millis_opt(0).unwrap(),
            Utc.timestamp_millis_opt(10_000).unwrap(),
        ),
        Interval::new(
            "Fuzz two",
            Utc.timestamp_millis_opt(5_000).unwrap(),
            Utc.timestamp_millis_opt(15_000).unwrap(),
        ),
    ];

    // The iterator may yield an error and stop; it must never panic.
    for item in Correlator::new(intervals, data) {
        if item.is_err() {
            break;
        }
    }
});
