// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for logweave-correlate

use thiserror::Error;

/// Errors that can occur while correlating a log stream
#[derive(Debug, Error)]
pub enum CorrelateError {
    /// A log line is not valid structured data
    #[error("log decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Error reading the log stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reading the report artifact
    #[error("report error: {0}")]
    Report(#[from] logweave_report::ReportError),

    /// A log record carries an unparseable timestamp
    #[error("invalid log timestamp: {value}")]
    Timestamp {
        /// The timestamp value that failed to parse
        value: String,
    },
}
