// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Streaming log correlation
//!
//! [`Correlator`] walks a log stream one line at a time, testing every
//! record against the full interval set and lazily yielding one normalized
//! copy per (record, matching interval) pair — line order outer, interval
//! order inner. Memory is bounded by the interval set plus the current
//! line's matches, never by the length of the log.
//!
//! A line that fails to decode (or carries an unparseable timestamp) is
//! fatal: the iterator yields the error once and terminates. Records already
//! yielded stay yielded; nothing after the bad line is processed.
//!
//! # Example
//!
//! ```
//! use logweave_correlate::correlator::Correlator;
//! use logweave_correlate::interval::Interval;
//! use chrono::{TimeZone, Utc};
//!
//! let intervals = vec![Interval::new(
//!     "Math adds",
//!     Utc.timestamp_millis_opt(1000).unwrap(),
//!     Utc.timestamp_millis_opt(1500).unwrap(),
//! )];
//! let log = r#"{"t":{"$date":1100},"msg":"in the window"}"#;
//! let matches: Vec<_> = Correlator::new(intervals, log.as_bytes())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].test, "Math adds");
//! ```

use crate::error::CorrelateError;
use crate::interval::Interval;
use crate::record::{LogRecord, TaggedRecord};
use std::collections::VecDeque;
use std::io::BufRead;
use tracing::debug;

/// Lazy (record × interval) matcher over a log stream
pub struct Correlator<R: BufRead> {
    intervals: Vec<Interval>,
    input: R,
    line: String,
    lines_read: usize,
    pending: VecDeque<TaggedRecord>,
    done: bool,
}

impl<R: BufRead> Correlator<R> {
    /// Create a correlator over the given intervals and log stream
    pub fn new(intervals: Vec<Interval>, input: R) -> Self {
        Self {
            intervals,
            input,
            line: String::new(),
            lines_read: 0,
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// Number of log lines consumed so far
    #[must_use]
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Read lines until one produces at least one match or the stream ends
    ///
    /// Returns `Ok(false)` on end of stream.
    fn advance(&mut self) -> Result<bool, CorrelateError> {
        loop {
            self.line.clear();
            if self.input.read_line(&mut self.line)? == 0 {
                return Ok(false);
            }
            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }
            self.lines_read += 1;

            let record = LogRecord::parse(line)?;
            let at = record.instant()?;

            for interval in &self.intervals {
                if interval.contains(at) {
                    let mut copy = record.clone();
                    copy.normalize(at);
                    self.pending.push_back(TaggedRecord {
                        test: interval.name.clone(),
                        record: copy,
                    });
                }
            }

            if self.pending.is_empty() {
                debug!(line = self.lines_read, "no matching window");
                continue;
            }
            return Ok(true);
        }
    }
}

impl<R: BufRead> Iterator for Correlator<R> {
    type Item = Result<TaggedRecord, CorrelateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(record) = self.pending.pop_front() {
            return Some(Ok(record));
        }
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(true) => self.pending.pop_front().map(Ok),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
