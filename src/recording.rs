//! evemu text recordings
//!
//! Lets a session be replayed from a file produced by `evemu-record`:
//!
//! ```text
//! # EVEMU 1.3
//! N: bcm5974
//! A: 30 0 2048 0 0 0
//! E: 0.000001 0003 0039 0150	# EV_ABS / ABS_MT_TRACKING_ID 150
//! E: 0.000001 0000 0000 0000	# ------------ SYN_REPORT (0) ----------
//! ```
//!
//! `A:` lines give the absolute axes (code in hex); `E:` lines give
//! `<sec>.<usec> <type hex> <code hex> <value decimal>`. Everything after a
//! `#` is a comment. Other header lines are skipped.

use crate::capabilities::AxisCapabilities;
use crate::error::MeasureError;
use crate::event::InputEvent;
use crate::source::EventSource;
use std::io::BufRead;

/// Streaming reader over an evemu recording
pub struct RecordingSource<R> {
    reader: R,
    line_no: usize,
    name: Option<String>,
    abs_codes: Vec<u16>,
    first_event: Option<InputEvent>,
}

impl<R: BufRead> RecordingSource<R> {
    /// Read the header (everything up to the first `E:` line)
    pub fn open(reader: R) -> Result<Self, MeasureError> {
        let mut source = Self {
            reader,
            line_no: 0,
            name: None,
            abs_codes: Vec::new(),
            first_event: None,
        };

        while let Some(line) = source.read_line()? {
            match parse_line(&line, source.line_no)? {
                Line::Name(name) => source.name = Some(name),
                Line::Axis(code) => source.abs_codes.push(code),
                Line::Event(event) => {
                    source.first_event = Some(event);
                    break;
                }
                Line::Skip => {}
            }
        }

        Ok(source)
    }

    /// Device name from the `N:` header line
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn capabilities(&self) -> AxisCapabilities {
        AxisCapabilities::from_abs_codes(self.abs_codes.iter().copied())
    }

    fn read_line(&mut self) -> Result<Option<String>, MeasureError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some(line))
    }
}

impl<R: BufRead> EventSource for RecordingSource<R> {
    fn next_event(&mut self) -> Result<Option<InputEvent>, MeasureError> {
        if let Some(event) = self.first_event.take() {
            return Ok(Some(event));
        }

        while let Some(line) = self.read_line()? {
            if let Line::Event(event) = parse_line(&line, self.line_no)? {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Name(String),
    Axis(u16),
    Event(InputEvent),
    Skip,
}

fn parse_line(raw: &str, line_no: usize) -> Result<Line, MeasureError> {
    let content = match raw.split_once('#') {
        Some((before, _)) => before,
        None => raw,
    };
    let content = content.trim();

    let Some((tag, rest)) = content.split_once(':') else {
        return Ok(Line::Skip);
    };
    let rest = rest.trim();

    let err = |message: String| MeasureError::RecordingParse {
        line: line_no,
        message,
    };

    match tag {
        "N" => Ok(Line::Name(rest.to_string())),
        "A" => {
            let code = rest
                .split_whitespace()
                .next()
                .ok_or_else(|| err("axis line without a code".to_string()))?;
            let code = u16::from_str_radix(code, 16)
                .map_err(|e| err(format!("invalid axis code {:?}: {}", code, e)))?;
            Ok(Line::Axis(code))
        }
        "E" => {
            let fields: Vec<&str> = rest.split_whitespace().collect();
            let [_time, event_type, code, value] = fields.as_slice() else {
                return Err(err(format!(
                    "expected 4 fields in event line, found {}",
                    fields.len()
                )));
            };
            let event_type = u16::from_str_radix(event_type, 16)
                .map_err(|e| err(format!("invalid event type {:?}: {}", event_type, e)))?;
            let code = u16::from_str_radix(code, 16)
                .map_err(|e| err(format!("invalid event code {:?}: {}", code, e)))?;
            let value = value
                .parse::<i32>()
                .map_err(|e| err(format!("invalid event value {:?}: {}", value, e)))?;
            Ok(Line::Event(InputEvent::from_raw(event_type, code, value)))
        }
        _ => Ok(Line::Skip),
    }
}
