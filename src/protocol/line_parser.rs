// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser for lines received from the matrix control interface.
//!
//! The matrix answers commands with one-line acknowledgements and answers
//! `STATUS` with a multi-line report:
//!
//! ```text
//! Power   IR      Key     Beep    LCD
//! On      On      On      Off     On
//!
//! Output  FromIn  HDMIcon  OutputEn  OSP   OutScaler
//! 01      02      Off      Yes       SNK   Bypass
//! 02      01      On       Yes       SNK   Bypass
//! ```
//!
//! The parser keeps track of which section of a status report it is in, so
//! lines must be fed in the order they were received.

use crate::event::SessionEvent;
use crate::types::{InputId, OutputId};

const SUCCESS_PREFIX: &str = "[SUCCESS]";
const ERROR_PREFIXES: [&str; 2] = ["[ERROR]", "[FAILED]"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Section {
    #[default]
    None,
    /// The next non-empty line holds the power value, unless it is an
    /// acknowledgement.
    PowerValue,
    /// Rows of the output routing table.
    OutputTable,
}

/// Turns raw matrix output into session events, one line at a time.
#[derive(Debug, Default)]
pub struct LineParser {
    section: Section,
}

impl LineParser {
    /// Creates a parser at the start of a stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets any partially parsed status report.
    pub fn reset(&mut self) {
        self.section = Section::None;
    }

    /// Parses one received line.
    ///
    /// Returns `None` for lines that carry no event, including malformed
    /// lines and lines naming ports outside the valid id range.
    pub fn parse_line(&mut self, line: &str) -> Option<SessionEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match self.section {
            Section::PowerValue => {
                self.section = Section::None;
                if !line.starts_with('[') {
                    let value = line.split_whitespace().next()?;
                    return Some(SessionEvent::power_changed(value.to_ascii_uppercase()));
                }
            }
            Section::OutputTable => {
                if let Some(event) = parse_table_row(line) {
                    return Some(event);
                }
                self.section = Section::None;
            }
            Section::None => {}
        }

        self.parse_standalone(line)
    }

    fn parse_standalone(&mut self, line: &str) -> Option<SessionEvent> {
        if let Some(rest) = strip_prefix_ignore_case(line, SUCCESS_PREFIX) {
            return parse_success(rest);
        }

        for prefix in ERROR_PREFIXES {
            if let Some(rest) = strip_prefix_ignore_case(line, prefix) {
                let rest = rest.trim();
                let message = if rest.is_empty() { line } else { rest };
                return Some(SessionEvent::error(message));
            }
        }

        let mut tokens = line.split_whitespace();
        let first = tokens.next().unwrap_or_default();

        if first.eq_ignore_ascii_case("power") {
            self.section = Section::PowerValue;
            return None;
        }

        if first.eq_ignore_ascii_case("output")
            && tokens
                .next()
                .is_some_and(|second| second.eq_ignore_ascii_case("fromin"))
        {
            self.section = Section::OutputTable;
            return None;
        }

        if let Some(event) = parse_route_echo(line) {
            return Some(event);
        }

        tracing::trace!(line = %line, "Ignoring matrix output");
        None
    }
}

/// Parses the text after `[SUCCESS]`.
fn parse_success(rest: &str) -> Option<SessionEvent> {
    let normalized = rest.trim().trim_end_matches('.').to_ascii_lowercase();
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    match tokens.as_slice() {
        ["set", "output", output, "connect", "from", "input", input, ..] => {
            let (output, input) = parse_ports(output, input)?;
            Some(SessionEvent::source_changed(output, input))
        }
        ["set", "system", "power", value, ..] => {
            Some(SessionEvent::power_changed(value.to_ascii_uppercase()))
        }
        _ => {
            tracing::trace!(response = %rest, "Ignoring acknowledgement");
            None
        }
    }
}

/// Parses a routing command echoed by the matrix, such as `OUT01FR02`.
fn parse_route_echo(line: &str) -> Option<SessionEvent> {
    let upper = line.to_ascii_uppercase();
    let rest = upper.strip_prefix("OUT")?;
    let (output, input) = rest.split_once("FR")?;
    let (output, input) = parse_ports(output, input)?;
    Some(SessionEvent::SourceChangeRequested { output, input })
}

/// Parses a row of the output routing table: `oo ii ...`.
fn parse_table_row(line: &str) -> Option<SessionEvent> {
    let mut tokens = line.split_whitespace();
    let output = tokens.next()?;
    let input = tokens.next()?;
    let (output, input) = parse_ports(output, input)?;
    Some(SessionEvent::source_changed(output, input))
}

fn parse_ports(output: &str, input: &str) -> Option<(OutputId, InputId)> {
    let output = parse_port(output)?;
    let input = parse_port(input)?;
    match (OutputId::new(output), InputId::new(input)) {
        (Ok(output), Ok(input)) => Some((output, input)),
        _ => {
            tracing::debug!(output, input, "Port id out of range in matrix output");
            None
        }
    }
}

fn parse_port(token: &str) -> Option<u8> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        line.get(prefix.len()..)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(output: u8, input: u8) -> SessionEvent {
        SessionEvent::source_changed(OutputId::new(output).unwrap(), InputId::new(input).unwrap())
    }

    fn parse_all(lines: &[&str]) -> Vec<SessionEvent> {
        let mut parser = LineParser::new();
        lines.iter().filter_map(|l| parser.parse_line(l)).collect()
    }

    #[test]
    fn source_change_acknowledgement() {
        let events = parse_all(&["[SUCCESS]Set output 01 connect from input 02."]);
        assert_eq!(events, vec![route(1, 2)]);
    }

    #[test]
    fn system_power_acknowledgement_is_upper_cased() {
        let events = parse_all(&["[SUCCESS]Set system power on", "[SUCCESS]Set system power OFF."]);
        assert_eq!(
            events,
            vec![
                SessionEvent::power_changed("ON"),
                SessionEvent::power_changed("OFF")
            ]
        );
    }

    #[test]
    fn error_lines() {
        let events = parse_all(&["[ERROR]Invalid command", "[FAILED]", "[error] lower"]);
        assert_eq!(
            events,
            vec![
                SessionEvent::error("Invalid command"),
                SessionEvent::error("[FAILED]"),
                SessionEvent::error("lower"),
            ]
        );
    }

    #[test]
    fn echoed_route_command() {
        let events = parse_all(&["OUT03FR04", "out1fr2"]);
        assert_eq!(
            events,
            vec![
                SessionEvent::SourceChangeRequested {
                    output: OutputId::new(3).unwrap(),
                    input: InputId::new(4).unwrap(),
                },
                SessionEvent::SourceChangeRequested {
                    output: OutputId::new(1).unwrap(),
                    input: InputId::new(2).unwrap(),
                },
            ]
        );
    }

    #[test]
    fn status_report() {
        let events = parse_all(&[
            "================================================",
            "Power   IR      Key     Beep    LCD",
            "On      On      On      Off     On",
            "",
            "Input   Edid    HDMIcon",
            "01      Default On",
            "",
            "Output  FromIn  HDMIcon  OutputEn  OSP   OutScaler",
            "01      02      Off      Yes       SNK   Bypass",
            "",
            "02      01      On       Yes       SNK   Bypass",
            "================================================",
            "03      03      On       Yes       SNK   Bypass",
        ]);

        assert_eq!(
            events,
            vec![SessionEvent::power_changed("ON"), route(1, 2), route(2, 1)]
        );
    }

    #[test]
    fn unrecognized_power_value_is_passed_through() {
        let events = parse_all(&["Power", "Standby"]);
        assert_eq!(events, vec![SessionEvent::power_changed("STANDBY")]);
    }

    #[test]
    fn acknowledgement_after_power_header_is_not_a_power_value() {
        let events = parse_all(&[
            "Power   IR      Key     Beep    LCD",
            "[SUCCESS]Set output 02 connect from input 01.",
            "[ERROR]Busy",
            "On      On      On      Off     On",
        ]);
        assert_eq!(events, vec![route(2, 1), SessionEvent::error("Busy")]);
    }

    #[test]
    fn out_of_range_ports_are_dropped() {
        let events = parse_all(&["[SUCCESS]Set output 00 connect from input 02.", "OUT100FR01"]);
        assert!(events.is_empty());
    }

    #[test]
    fn unrelated_lines_are_ignored() {
        let events = parse_all(&["Welcome to the matrix", "[SUCCESS]Set IR on", "Telnet>"]);
        assert!(events.is_empty());
    }

    #[test]
    fn reset_drops_pending_section() {
        let mut parser = LineParser::new();
        assert!(parser.parse_line("Power IR").is_none());
        parser.reset();
        assert!(parser.parse_line("On On").is_none());
    }
}
