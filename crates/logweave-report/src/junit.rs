// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Report artifact codec
//!
//! Encodes a [`Report`] as a JUnit-style XML document and decodes the same
//! document back into the per-case timing windows the correlator consumes.
//!
//! The artifact carries, per suite: the package classifier, a sequential id,
//! name, creation timestamp, host marker, test/failure counts (the `errors`
//! count is always `"0"`; no error/failure distinction is tracked), total
//! time, a `<properties/>` placeholder, one `<testcase>` per case with its
//! `start`/`end` window (the literal `0` when the test never started or
//! ended), and CDATA blocks with the suite's captured output. Captured text
//! is scrubbed of ANSI color escapes and non-printable control characters,
//! and any literal CDATA terminator is split across sections so re-parsing
//! recovers the original text.

use crate::error::ReportError;
use crate::model::{CaseStatus, Report, TestSuite};
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

/// Fixed on-disk name of the report artifact
pub const REPORT_FILE: &str = "report.xml";

/// Host marker embedded in every suite element
const HOSTNAME: &str = "localhost";

/// Schema referenced by the xml-model processing instruction
const SCHEMA_HREF: &str = "https://windyroad.com.au/dl/Open%20Source/JUnit.xsd";

static TESTSUITES_TAG: &str = "testsuites";
static TESTSUITE_TAG: &str = "testsuite";
static TESTCASE_TAG: &str = "testcase";
static PROPERTIES_TAG: &str = "properties";
static FAILURE_TAG: &str = "failure";
static SKIPPED_TAG: &str = "skipped";
static SYSTEM_OUT_TAG: &str = "system-out";
static SYSTEM_ERR_TAG: &str = "system-err";

// ============================================================================
// Serialization
// ============================================================================

/// Serialize a report to the given writer
///
/// # Errors
///
/// Returns `ReportError::Io`/`ReportError::Xml` if the underlying writer
/// fails.
pub fn write_report<W: io::Write>(report: &Report, writer: W) -> Result<(), ReportError> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped(TESTSUITES_TAG)))?;
    writer.write_event(Event::PI(BytesText::from_escaped(format!(
        r#"xml-model href="{SCHEMA_HREF}""#
    ))))?;

    let mut root = BytesStart::new(TESTSUITES_TAG);
    root.extend_attributes([
        ("name", "logweave"),
        ("tests", report.tests().to_string().as_str()),
        ("failures", report.failures().to_string().as_str()),
        ("errors", "0"),
        ("time", secs_attr(report.time()).as_str()),
    ]);
    writer.write_event(Event::Start(root))?;

    for (id, suite) in report.suites.iter().enumerate() {
        write_suite(suite, id, &mut writer)?;
    }

    writer.write_event(Event::End(BytesEnd::new(TESTSUITES_TAG)))?;
    Ok(())
}

/// Serialize a report to a string
///
/// # Errors
///
/// See [`write_report`].
pub fn report_to_string(report: &Report) -> Result<String, ReportError> {
    let mut buf: Vec<u8> = Vec::new();
    write_report(report, &mut buf)?;
    String::from_utf8(buf).map_err(|err| ReportError::Protocol {
        message: format!("serialized report is not UTF-8: {err}"),
    })
}

/// Write the report artifact as a single atomic overwrite
///
/// Both the normal and the interrupt-triggered run-end paths funnel through
/// this; last writer wins, without torn artifacts.
///
/// # Errors
///
/// Returns `ReportError::Io` if the temp file or rename fails, or any
/// serialization error.
pub fn write_report_file(report: &Report, path: &Path) -> Result<(), ReportError> {
    let file = atomicwrites::AtomicFile::new(path, atomicwrites::OverwriteBehavior::AllowOverwrite);
    file.write(|f| write_report(report, f)).map_err(|err| match err {
        atomicwrites::Error::Internal(e) => ReportError::Io(e),
        atomicwrites::Error::User(e) => e,
    })
}

fn write_suite<W: io::Write>(
    suite: &TestSuite,
    id: usize,
    writer: &mut Writer<W>,
) -> Result<(), ReportError> {
    let mut suite_tag = BytesStart::new(TESTSUITE_TAG);
    suite_tag.extend_attributes([
        ("package", suite.package().as_str()),
        ("id", id.to_string().as_str()),
        ("name", suite.name.as_str()),
        (
            "timestamp",
            suite
                .created_at
                .to_rfc3339_opts(SecondsFormat::Secs, true)
                .as_str(),
        ),
        ("hostname", HOSTNAME),
        ("tests", suite.tests().to_string().as_str()),
        ("failures", suite.failures().to_string().as_str()),
        ("errors", "0"),
        ("time", secs_attr(suite.time()).as_str()),
    ]);
    writer.write_event(Event::Start(suite_tag))?;

    writer.write_event(Event::Empty(BytesStart::new(PROPERTIES_TAG)))?;

    for case in &suite.cases {
        let mut case_tag = BytesStart::new(TESTCASE_TAG);
        case_tag.extend_attributes([
            ("name", case.name.as_str()),
            ("classname", suite.name.as_str()),
            ("time", secs_attr(case.elapsed()).as_str()),
            ("start", instant_attr(case.started_at).as_str()),
            ("end", instant_attr(case.finished_at).as_str()),
        ]);

        let failure = (case.status == CaseStatus::Failed)
            .then_some(case.failure.as_ref())
            .flatten();
        if failure.is_none() && !case.skipped {
            writer.write_event(Event::Empty(case_tag))?;
            continue;
        }

        writer.write_event(Event::Start(case_tag))?;
        if let Some(failure) = failure {
            let mut failure_tag = BytesStart::new(FAILURE_TAG);
            failure_tag.push_attribute(("type", failure.kind.as_str()));
            writer.write_event(Event::Start(failure_tag))?;
            let text = if failure.message.is_empty() {
                failure.stack.clone()
            } else if failure.stack.is_empty() {
                failure.message.clone()
            } else {
                format!("{}\n{}", failure.message, failure.stack)
            };
            writer.write_event(Event::CData(BytesCData::new(cdata_payload(&text))))?;
            writer.write_event(Event::End(BytesEnd::new(FAILURE_TAG)))?;
        }
        if case.skipped {
            writer.write_event(Event::Empty(BytesStart::new(SKIPPED_TAG)))?;
        }
        writer.write_event(Event::End(BytesEnd::new(TESTCASE_TAG)))?;
    }

    write_output_block(SYSTEM_OUT_TAG, &suite.system_out, writer)?;
    write_output_block(SYSTEM_ERR_TAG, &suite.system_err, writer)?;

    writer.write_event(Event::End(BytesEnd::new(TESTSUITE_TAG)))?;
    Ok(())
}

fn write_output_block<W: io::Write>(
    tag: &'static str,
    text: &str,
    writer: &mut Writer<W>,
) -> Result<(), ReportError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::CData(BytesCData::new(cdata_payload(text))))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Prepare free text for embedding in a CDATA block
///
/// ANSI color escapes and non-printable control characters are stripped, and
/// any literal `]]>` terminator is split across two CDATA sections so the
/// payload re-parses to the original text.
fn cdata_payload(text: &str) -> String {
    let stripped = strip_ansi_escapes::strip_str(text);
    let stripped: String = stripped
        .chars()
        .filter(|c| !matches!(c, '\x00'..='\x08' | '\x0b' | '\x0c' | '\x0e'..='\x1f'))
        .collect();
    stripped.replace("]]>", "]]]]><![CDATA[>")
}

/// Seconds with 3 decimal places, as the artifact's time attributes expect
fn secs_attr(time: Duration) -> String {
    format!("{:.3}", time.as_secs_f64())
}

/// ISO-8601 instant, or the literal `0` sentinel when absent
fn instant_attr(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => "0".to_string(),
    }
}

// ============================================================================
// Deserialization
// ============================================================================

/// One test case's timing window, read back from the report artifact
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCase {
    /// Suite the case belongs to
    pub suite: String,
    /// Test name within the suite
    pub name: String,
    /// Start instant; `None` for the `0` sentinel or an epoch-zero stamp
    pub started_at: Option<DateTime<Utc>>,
    /// End instant; `None` for the `0` sentinel or an epoch-zero stamp
    pub finished_at: Option<DateTime<Utc>>,
}

impl RecordedCase {
    /// Fully-qualified name: suite name and test name, space-joined
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{} {}", self.suite, self.name)
    }
}

/// Read the timing windows of every test case in a report artifact
///
/// # Errors
///
/// Returns `ReportError::Xml` on malformed XML and
/// `ReportError::Timestamp` on an unparseable `start`/`end` attribute; the
/// artifact is a machine-written contract, so both are fatal.
pub fn read_cases<R: BufRead>(reader: R) -> Result<Vec<RecordedCase>, ReportError> {
    let mut reader = Reader::from_reader(reader);
    let mut buf = Vec::new();
    let mut cases = Vec::new();
    let mut current_suite = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) | Event::Empty(element) => {
                match element.name().as_ref() {
                    b"testsuite" => {
                        for attr in element.attributes() {
                            let attr = attr?;
                            if attr.key.as_ref() == b"name" {
                                current_suite = attr.unescape_value()?.into_owned();
                            }
                        }
                    }
                    b"testcase" => {
                        let mut name = String::new();
                        let mut classname = None;
                        let mut started_at = None;
                        let mut finished_at = None;
                        for attr in element.attributes() {
                            let attr = attr?;
                            let value = attr.unescape_value()?;
                            match attr.key.as_ref() {
                                b"name" => name = value.into_owned(),
                                b"classname" => classname = Some(value.into_owned()),
                                b"start" => started_at = parse_instant_attr(&value)?,
                                b"end" => finished_at = parse_instant_attr(&value)?,
                                _ => {}
                            }
                        }
                        cases.push(RecordedCase {
                            suite: classname.unwrap_or_else(|| current_suite.clone()),
                            name,
                            started_at,
                            finished_at,
                        });
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(cases)
}

/// Read the timing windows from the report artifact on disk
///
/// # Errors
///
/// Returns `ReportError::Io` if the artifact is missing or unreadable, plus
/// any error from [`read_cases`].
pub fn read_cases_file(path: &Path) -> Result<Vec<RecordedCase>, ReportError> {
    let file = File::open(path)?;
    read_cases(BufReader::new(file))
}

/// Parse a `start`/`end` attribute into an instant
///
/// The literal `0` sentinel and epoch-zero timestamps both mean "never".
fn parse_instant_attr(value: &str) -> Result<Option<DateTime<Utc>>, ReportError> {
    if value == "0" {
        return Ok(None);
    }
    let at = DateTime::parse_from_rfc3339(value)
        .map_err(|_| ReportError::Timestamp {
            value: value.to_string(),
        })?
        .with_timezone(&Utc);
    if at == DateTime::UNIX_EPOCH {
        return Ok(None);
    }
    Ok(Some(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TestCase, TestFailure};
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).single().expect("valid millis")
    }

    fn sample_report() -> Report {
        let mut suite = TestSuite::new(
            "Math",
            Some("spec/functional/math.spec.js".to_string()),
            at(1_000_000),
        );

        let mut adds = TestCase::new("adds");
        adds.status = CaseStatus::Passed;
        adds.started_at = Some(at(1_000_000));
        adds.finished_at = Some(at(1_000_500));

        let mut subs = TestCase::new("subs");
        subs.status = CaseStatus::Failed;
        subs.started_at = Some(at(1_000_200));
        subs.finished_at = Some(at(1_000_800));
        subs.failure = Some(TestFailure {
            kind: "AssertionError".to_string(),
            message: "expected 1 to equal 2".to_string(),
            stack: "at subs (math.spec.js:9)".to_string(),
        });

        let mut later = TestCase::new("later");
        later.status = CaseStatus::Pending;
        later.skipped = true;

        suite.cases.push(adds);
        suite.cases.push(subs);
        suite.cases.push(later);
        suite.system_out = "  \u{2713} adds\n".to_string();
        suite.system_err = "  \u{2717} subs\n".to_string();

        Report {
            suites: vec![suite],
        }
    }

    #[test]
    fn test_serialized_report_structure() {
        let xml = report_to_string(&sample_report()).expect("serialize");

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<!DOCTYPE testsuites>"));
        assert!(xml.contains(r#"<?xml-model href="https://windyroad.com.au/dl/Open%20Source/JUnit.xsd"?>"#));
        assert!(xml.contains(r#"package="Functional""#));
        assert!(xml.contains(r#"id="0""#));
        assert!(xml.contains(r#"hostname="localhost""#));
        assert!(xml.contains(r#"tests="3""#));
        assert!(xml.contains(r#"failures="1""#));
        assert!(xml.contains(r#"errors="0""#));
        assert!(xml.contains("<properties/>"));
        assert!(xml.contains(r#"classname="Math""#));
        assert!(xml.contains(r#"start="1970-01-01T00:16:40.000Z""#));
        assert!(xml.contains(r#"<failure type="AssertionError">"#));
        assert!(xml.contains("<skipped/>"));
        assert!(xml.contains("<system-out>"));
        assert!(xml.contains("<system-err>"));
    }

    #[test]
    fn test_never_started_case_serializes_zero_sentinel() {
        let mut report = sample_report();
        report.suites[0].cases[2].started_at = None;
        let xml = report_to_string(&report).expect("serialize");
        assert!(xml.contains(r#"start="0" end="0""#));
    }

    #[test]
    fn test_attribute_quotes_are_escaped() {
        let mut report = sample_report();
        report.suites[0].cases[0].name = r#"handles "quoted" input"#.to_string();
        let xml = report_to_string(&report).expect("serialize");
        assert!(xml.contains("handles &quot;quoted&quot; input"));
    }

    #[test]
    fn test_cdata_payload_splits_terminator() {
        assert_eq!(cdata_payload("a]]>b"), "a]]]]><![CDATA[>b");
        assert_eq!(cdata_payload("plain"), "plain");
    }

    #[test]
    fn test_cdata_payload_strips_ansi_and_control() {
        assert_eq!(cdata_payload("\x1b[32mok\x1b[0m"), "ok");
        assert_eq!(cdata_payload("a\x00b\x07c\nd\te"), "abc\nd\te");
    }

    #[test]
    fn test_round_trip_windows() {
        let report = sample_report();
        let xml = report_to_string(&report).expect("serialize");
        let cases = read_cases(xml.as_bytes()).expect("parse");

        assert_eq!(cases.len(), 3);
        assert_eq!(cases[0].suite, "Math");
        assert_eq!(cases[0].name, "adds");
        assert_eq!(cases[0].started_at, Some(at(1_000_000)));
        assert_eq!(cases[0].finished_at, Some(at(1_000_500)));
        assert_eq!(cases[1].qualified_name(), "Math subs");
        // The skipped case never ran.
        assert_eq!(cases[2].started_at, None);
        assert_eq!(cases[2].finished_at, None);
    }

    #[test]
    fn test_parse_instant_attr_sentinels() {
        assert_eq!(parse_instant_attr("0").expect("sentinel"), None);
        assert_eq!(
            parse_instant_attr("1970-01-01T00:00:00.000Z").expect("epoch"),
            None
        );
        assert_eq!(
            parse_instant_attr("1970-01-01T00:16:40.000Z").expect("instant"),
            Some(at(1_000_000))
        );
    }

    #[test]
    fn test_parse_instant_attr_rejects_garbage() {
        let result = parse_instant_attr("yesterday");
        assert!(matches!(result, Err(ReportError::Timestamp { .. })));
    }

    #[test]
    fn test_read_cases_rejects_malformed_xml() {
        let result = read_cases("<testsuites><testcase".as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_write_report_file_overwrites_atomically() {
        let dir = std::env::temp_dir().join("logweave-junit-test");
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join(REPORT_FILE);

        write_report_file(&sample_report(), &path).expect("first write");
        write_report_file(&sample_report(), &path).expect("overwrite");

        let cases = read_cases_file(&path).expect("read back");
        assert_eq!(cases.len(), 3);

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }
}
