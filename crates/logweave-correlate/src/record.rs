// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Structured log records
//!
//! One [`LogRecord`] per log line: a nested `t.$date` timestamp, an optional
//! `msg` message template, an optional `attr` attribute mapping, and every
//! remaining field preserved verbatim. Normalization interpolates attributes
//! into the message and rewrites the timestamp to canonical ISO-8601.

use crate::error::CorrelateError;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timestamp envelope of a log record (`{"$date": ...}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogInstant {
    /// ISO-8601 string or epoch milliseconds
    #[serde(rename = "$date")]
    pub date: DateValue,
}

/// The two timestamp encodings log sources emit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    /// ISO-8601 / RFC 3339 string
    Iso(String),
    /// Milliseconds since the Unix epoch
    Millis(i64),
}

/// One decoded log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Record timestamp
    pub t: LogInstant,
    /// Message template, possibly containing `{key}` placeholders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    /// Attribute mapping feeding the placeholders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attr: Option<Map<String, Value>>,
    /// All remaining fields, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogRecord {
    /// Decode a single log line
    ///
    /// # Errors
    ///
    /// Returns `CorrelateError::Decode` if the line is not a structured
    /// record with a `t.$date` field.
    pub fn parse(line: &str) -> Result<Self, CorrelateError> {
        serde_json::from_str(line).map_err(CorrelateError::from)
    }

    /// The record's instant
    ///
    /// # Errors
    ///
    /// Returns `CorrelateError::Timestamp` if the `t.$date` value does not
    /// parse.
    pub fn instant(&self) -> Result<DateTime<Utc>, CorrelateError> {
        match &self.t.date {
            DateValue::Iso(text) => DateTime::parse_from_rfc3339(text)
                .map(|at| at.with_timezone(&Utc))
                .map_err(|_| CorrelateError::Timestamp {
                    value: text.clone(),
                }),
            DateValue::Millis(ms) => {
                Utc.timestamp_millis_opt(*ms)
                    .single()
                    .ok_or(CorrelateError::Timestamp {
                        value: ms.to_string(),
                    })
            }
        }
    }

    /// Normalize the record for human review
    ///
    /// Every attribute whose `{key}` placeholder occurs in the message is
    /// substituted (strings verbatim, other values in compact JSON) and
    /// removed from the mapping; untouched attributes remain, and an emptied
    /// mapping is dropped. Any literal `"` left in the final message becomes
    /// `'` — a display normalization, not semantically lossless. The
    /// timestamp is rewritten to canonical ISO-8601 milliseconds, UTC.
    pub fn normalize(&mut self, at: DateTime<Utc>) {
        if let Some(msg) = self.msg.as_mut() {
            if let Some(attr) = self.attr.take() {
                let mut remaining = Map::new();
                for (key, value) in attr {
                    let token = format!("{{{key}}}");
                    if msg.contains(&token) {
                        *msg = msg.replace(&token, &compact(&value));
                    } else {
                        remaining.insert(key, value);
                    }
                }
                if !remaining.is_empty() {
                    self.attr = Some(remaining);
                }
            }
            if msg.contains('"') {
                *msg = msg.replace('"', "'");
            }
        }
        self.t = LogInstant {
            date: DateValue::Iso(at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        };
    }
}

/// A normalized record copy, tagged with the test window it matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedRecord {
    /// Fully-qualified name of the matching test case
    pub test: String,
    /// The normalized record
    #[serde(flatten)]
    pub record: LogRecord,
}

/// Compact textual rendering of an attribute value
fn compact(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
