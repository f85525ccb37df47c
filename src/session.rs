//! Session controller
//!
//! Turns the raw event stream into sequence operations:
//!
//! - `ABS_MT_TRACKING_ID >= 0` starts a new sequence, `-1` finalizes the current one
//! - `ABS_MT_TOUCH_MAJOR` / `_MINOR` / `ABS_MT_ORIENTATION` update the pending sample
//! - `SYN_REPORT` flushes the pending sample into the current sequence if it is dirty
//! - `BTN_TOOL_DOUBLETAP` and friends raise a multi-finger advisory
//!
//! Only one contact is tracked at a time. With more than one finger on the
//! device, data from different contacts is attributed to whichever sequence
//! started last.

use crate::capabilities::AxisCapabilities;
use crate::config::Thresholds;
use crate::error::MeasureError;
use crate::event::{
    abs_code_name, EventCategory, InputEvent, ABS_MT_ORIENTATION, ABS_MT_TOUCH_MAJOR,
    ABS_MT_TOUCH_MINOR, ABS_MT_TRACKING_ID, MULTI_FINGER_TOOLS,
};
use crate::sample::TouchSample;
use crate::sequence::{SequenceState, SequenceSummary, SequenceTracker};
use crate::TOUCHSIZE_VERSION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Something the presentation layer should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// A frame was appended to the active sequence
    Frame(SequenceState),
    /// A sequence was finalized
    Finished(SequenceSummary),
    /// A multi-finger tool key was pressed; results are unreliable
    MultiFinger { code: u16 },
}

/// Demultiplexes events into touch samples and sequences
#[derive(Debug)]
pub struct SessionController {
    thresholds: Thresholds,
    capabilities: AxisCapabilities,
    sequences: Vec<SequenceTracker>,
    current: Option<usize>,
    pending: TouchSample,
    session_id: String,
    started_at: DateTime<Utc>,
}

impl SessionController {
    /// Create a controller for a source with the given axes.
    ///
    /// Fails if the source does not report the major axis.
    pub fn new(thresholds: Thresholds, capabilities: AxisCapabilities) -> Result<Self, MeasureError> {
        let capabilities = capabilities.require_major()?;
        Ok(Self {
            thresholds,
            capabilities,
            sequences: Vec::new(),
            current: None,
            pending: TouchSample::new(),
            session_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
        })
    }

    /// Handle one event, returning what (if anything) changed
    pub fn handle(&mut self, event: &InputEvent) -> Result<Option<SessionUpdate>, MeasureError> {
        match event.category {
            EventCategory::Abs => Ok(self.handle_abs(event.code, event.value)),
            EventCategory::Key => Ok(self.handle_key(event.code, event.value)),
            EventCategory::Syn if event.is_frame_end() => self.handle_frame_end(),
            _ => Ok(None),
        }
    }

    fn handle_abs(&mut self, code: u16, value: i32) -> Option<SessionUpdate> {
        match code {
            ABS_MT_TRACKING_ID if value >= 0 => {
                self.start_sequence(value);
                None
            }
            ABS_MT_TRACKING_ID => self.finish_sequence(),
            ABS_MT_TOUCH_MAJOR => {
                self.pending.set_major(value);
                None
            }
            ABS_MT_TOUCH_MINOR if self.capabilities.has_minor => {
                self.pending.set_minor(value);
                None
            }
            ABS_MT_ORIENTATION if self.capabilities.has_orientation => {
                self.pending.set_orientation(value);
                None
            }
            ABS_MT_TOUCH_MINOR | ABS_MT_ORIENTATION => {
                debug!(
                    axis = abs_code_name(code).unwrap_or("unknown"),
                    value, "ignoring axis the device does not advertise"
                );
                None
            }
            _ => None,
        }
    }

    fn handle_key(&mut self, code: u16, value: i32) -> Option<SessionUpdate> {
        if MULTI_FINGER_TOOLS.contains(&code) && value > 0 {
            warn!(code, "multiple fingers detected, output will be invalid");
            return Some(SessionUpdate::MultiFinger { code });
        }
        None
    }

    fn handle_frame_end(&mut self) -> Result<Option<SessionUpdate>, MeasureError> {
        if !self.pending.is_dirty() {
            return Ok(None);
        }

        let staged = self.pending;
        self.pending = staged.clone_carrying_forward();

        let Some(index) = self.current else {
            if self.sequences.is_empty() {
                return Err(MeasureError::NoActiveSequence);
            }
            debug!("discarding touch data received after the contact was lifted");
            return Ok(None);
        };

        let Some(point) = staged.to_point() else {
            debug!("discarding frame without a known major value");
            return Ok(None);
        };

        let sequence = &mut self.sequences[index];
        sequence.append(point);
        Ok(sequence.state().map(SessionUpdate::Frame))
    }

    fn start_sequence(&mut self, tracking_id: i32) {
        if let Some(previous) = self.current_sequence() {
            debug!(
                previous = previous.tracking_id(),
                tracking_id, "new tracking id while previous sequence is still active"
            );
        }
        info!(tracking_id, "sequence started");
        self.sequences
            .push(SequenceTracker::new(tracking_id, self.thresholds));
        self.current = Some(self.sequences.len() - 1);
    }

    fn finish_sequence(&mut self) -> Option<SessionUpdate> {
        let Some(index) = self.current.take() else {
            // finger was already down when the session started
            debug!("tracking id ended without an active sequence");
            return None;
        };

        let sequence = &mut self.sequences[index];
        sequence.finalize();
        let summary = sequence.summary();
        info!(
            tracking_id = summary.tracking_id,
            samples = summary.samples,
            "sequence finished"
        );
        Some(SessionUpdate::Finished(summary))
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn capabilities(&self) -> AxisCapabilities {
        self.capabilities
    }

    pub fn sequences(&self) -> &[SequenceTracker] {
        &self.sequences
    }

    /// The sequence currently receiving samples, if a contact is active
    pub fn current_sequence(&self) -> Option<&SequenceTracker> {
        self.current.map(|index| &self.sequences[index])
    }

    pub fn pending_sample(&self) -> &TouchSample {
        &self.pending
    }

    /// Summaries of every finalized sequence. In-flight sequences are left out.
    pub fn report(&self) -> SessionReport {
        SessionReport {
            version: TOUCHSIZE_VERSION.to_string(),
            session_id: self.session_id.clone(),
            started_at: self.started_at,
            finished_at: Utc::now(),
            thresholds: self.thresholds,
            capabilities: self.capabilities,
            sequences: self
                .sequences
                .iter()
                .filter(|s| !s.is_active())
                .map(SequenceTracker::summary)
                .collect(),
        }
    }
}

/// End-of-session summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub version: String,
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub thresholds: Thresholds,
    pub capabilities: AxisCapabilities,
    pub sequences: Vec<SequenceSummary>,
}

impl SessionReport {
    pub fn to_json(&self) -> Result<String, MeasureError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, MeasureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
