// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for logweave-report

use thiserror::Error;

/// Errors that can occur while recording a run or encoding/decoding the
/// report artifact
#[derive(Debug, Error)]
pub enum ReportError {
    /// Error decoding a line of the runner event feed
    #[error("event decode error: {0}")]
    EventDecode(#[from] serde_json::Error),

    /// Error reading or writing the report artifact
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error in the XML layer of the report artifact
    #[error("report XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute in the report artifact
    #[error("report attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Unparseable timestamp attribute in the report artifact
    #[error("invalid timestamp in report: {value}")]
    Timestamp {
        /// The attribute value that failed to parse
        value: String,
    },

    /// The event source violated the lifecycle contract
    #[error("lifecycle protocol violation: {message}")]
    Protocol {
        /// Description of the violation
        message: String,
    },
}
