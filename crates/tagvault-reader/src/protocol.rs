// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reader's line protocol.
//!
//! The device prints ASCII lines. A tag report looks like
//! `Card UID: 67 AE 7B B4`; everything else is chatter and is skipped.

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::time::{Duration, Instant};

use tagvault_core::ScanOutcome;
use tracing::{debug, warn};

/// Extract the identifier from one line, if it is a tag report.
///
/// Surrounding whitespace is ignored. Non-UTF-8 lines, lines without the
/// prefix and reports with an empty identifier yield `None`.
pub fn parse_tag_line(line: &[u8], prefix: &str) -> Option<String> {
    let text = std::str::from_utf8(line).ok()?.trim();
    let identifier = text.strip_prefix(prefix)?.trim();
    if identifier.is_empty() {
        None
    } else {
        Some(identifier.to_string())
    }
}

/// Read lines from `port` until a tag report arrives or `timeout` elapses.
///
/// Per-read timeouts are expected while the reader is idle and are skipped.
/// Bytes already received stay buffered across them, so a report split over
/// several reads is still recognized. Blank and unrecognized lines are
/// skipped.
///
/// A zero-byte read is not treated as an empty line to skip: serialport
/// reports an idle port as `TimedOut`, so `Ok(0)` only happens on hang-up.
/// End of stream, like any other I/O error, yields
/// [`ScanOutcome::Unreadable`].
pub fn read_tag<R: Read>(port: R, prefix: &str, timeout: Duration) -> ScanOutcome {
    let started = Instant::now();
    let mut reader = BufReader::new(port);
    let mut line = Vec::new();

    while started.elapsed() < timeout {
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => {
                debug!("serial stream closed");
                return ScanOutcome::Unreadable;
            }
            Ok(_) => {
                // without a trailing newline this is the tail before end of stream
                if let Some(identifier) = parse_tag_line(&line, prefix) {
                    return ScanOutcome::Scanned(identifier);
                }
                line.clear();
            }
            Err(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {}
            Err(err) => {
                warn!(error = %err, "serial read failed");
                return ScanOutcome::Unreadable;
            }
        }
    }

    ScanOutcome::TimedOut
}
