// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for the logweave CLI
//!
//! This module provides the command-line surface: the `record` and
//! `correlate` subcommands, the report artifact location, and the
//! diagnostics toggles.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// logweave - record test runs, correlate logs against their windows
#[derive(Parser, Debug, Clone)]
#[command(name = "logweave")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Path to the report artifact
    ///
    /// Written by `record`, read by `correlate`.
    #[arg(
        short,
        long,
        env = "LOGWEAVE_REPORT",
        default_value = logweave_report::REPORT_FILE
    )]
    pub report: PathBuf,

    /// Show data-quality warnings on stderr
    ///
    /// Surfaces diagnostics for duplicate suite begins and for test cases
    /// excluded from correlation because they never ran.
    #[arg(short, long, default_value = "false")]
    pub warnings: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Record a test run from a runner lifecycle event feed
    ///
    /// The feed is newline-delimited JSON, one lifecycle event per line.
    /// On end of feed (or interrupt) the report artifact is written.
    ///
    /// Example:
    ///   runner --reporter feed | logweave record
    Record {
        /// Event feed path, or `-` for standard input
        #[arg(default_value = "-")]
        events: String,
    },

    /// Correlate a structured log stream against recorded test windows
    ///
    /// Emits one enriched JSON record per (line, matching test) pair on
    /// standard output.
    ///
    /// Example:
    ///   logweave correlate "Math adds" server.log
    Correlate {
        /// Case-insensitive substring filter on "<suite> <test>" names
        filter: String,

        /// Log file path, or `-` for standard input
        log: String,
    },
}

impl Config {
    /// Get the log level based on the verbose/warnings flags
    ///
    /// The default is error-only so stdout pipelines stay quiet;
    /// `--warnings` surfaces data-quality diagnostics, `--verbose`
    /// everything.
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.warnings {
            tracing::Level::WARN
        } else {
            tracing::Level::ERROR
        }
    }
}

/// Open a line source: a file path, or `-` for standard input
///
/// # Errors
///
/// Returns an IO error if the path cannot be opened.
pub fn open_line_source(spec: &str) -> io::Result<Box<dyn BufRead>> {
    if spec == "-" {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(File::open(spec)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(args).expect("args should parse")
    }

    #[test]
    fn test_default_report_path() {
        let config = parse(&["logweave", "correlate", "adds", "-"]);
        assert_eq!(config.report, PathBuf::from("report.xml"));
        assert!(!config.warnings);
        assert!(!config.verbose);
    }

    #[test]
    fn test_report_path_override() {
        let config = parse(&[
            "logweave",
            "--report",
            "/tmp/run-7.xml",
            "correlate",
            "adds",
            "-",
        ]);
        assert_eq!(config.report, PathBuf::from("/tmp/run-7.xml"));
    }

    #[test]
    fn test_record_defaults_to_stdin() {
        let config = parse(&["logweave", "record"]);
        match config.command {
            Command::Record { ref events } => assert_eq!(events, "-"),
            _ => panic!("expected record subcommand"),
        }
    }

    #[test]
    fn test_correlate_positionals() {
        let config = parse(&["logweave", "correlate", "Math adds", "server.log"]);
        match config.command {
            Command::Correlate {
                ref filter,
                ref log,
            } => {
                assert_eq!(filter, "Math adds");
                assert_eq!(log, "server.log");
            }
            _ => panic!("expected correlate subcommand"),
        }
    }

    #[test]
    fn test_correlate_requires_both_positionals() {
        let result = Config::try_parse_from(["logweave", "correlate", "adds"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level_default() {
        let config = parse(&["logweave", "record"]);
        assert_eq!(config.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_warnings() {
        let config = parse(&["logweave", "--warnings", "record"]);
        assert_eq!(config.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_log_level_verbose_wins() {
        let config = parse(&["logweave", "-v", "-w", "record"]);
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_open_line_source_file() {
        let path = std::env::temp_dir().join("logweave-config-test.ndjson");
        let mut file = File::create(&path).expect("create temp file");
        writeln!(file, "one line").expect("write");
        drop(file);

        let mut reader = open_line_source(path.to_str().expect("utf8 path")).expect("open");
        let mut line = String::new();
        reader.read_line(&mut line).expect("read");
        assert_eq!(line, "one line\n");

        std::fs::remove_file(&path).expect("cleanup");
    }

    #[test]
    fn test_open_line_source_missing_file() {
        assert!(open_line_source("/nonexistent/path/12345.log").is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
