// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! logweave-correlate: log-to-test-window correlation
//!
//! This library crate reads the timing windows out of a logweave report
//! artifact and assigns each line of a structured log stream to the test
//! case(s) whose execution window contains it, normalizing every emitted
//! copy for human review.
//!
//! # Example
//!
//! ```no_run
//! use logweave_correlate::correlator::Correlator;
//! use logweave_correlate::interval;
//!
//! let intervals =
//!     interval::load_intervals(std::path::Path::new("report.xml"), "adds").unwrap();
//! let stdin = std::io::stdin();
//! for tagged in Correlator::new(intervals, stdin.lock()) {
//!     let tagged = tagged.unwrap();
//!     println!("{}", serde_json::to_string(&tagged).unwrap());
//! }
//! ```

pub mod correlator;
pub mod error;
pub mod interval;
pub mod record;

pub use correlator::Correlator;
pub use error::CorrelateError;
pub use interval::{Interval, load_intervals};
pub use record::{DateValue, LogInstant, LogRecord, TaggedRecord};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::correlator::Correlator;
    pub use crate::error::CorrelateError;
    pub use crate::interval::{Interval, load_intervals};
    pub use crate::record::{LogRecord, TaggedRecord};
}
