//! touchsize - Touch size diagnostics for multitouch digitizers
//!
//! Consumes a stream of raw absolute-axis events and classifies each physical
//! contact by its reported size: event demultiplexing → per-frame touch
//! samples → per-contact sequences → hysteresis down/up and palm tagging.
//!
//! ## Modules
//!
//! - **Engine**: [`sample`], [`sequence`], [`range`] and the [`session`] controller
//! - **Inputs**: [`event`] vocabulary, [`source`] loop, evemu [`recording`] replay
//! - **Setup**: threshold [`config`] and source [`capabilities`]
//!
//! Only one concurrent contact is supported. Multi-finger tool keys raise an
//! advisory but the data is not separated per contact.

pub mod capabilities;
pub mod config;
pub mod error;
pub mod event;
pub mod range;
pub mod recording;
pub mod sample;
pub mod sequence;
pub mod session;
pub mod source;

pub use capabilities::AxisCapabilities;
pub use config::{DeviceQuirks, ThresholdConfig, Thresholds, TouchRange};
pub use error::MeasureError;
pub use event::{EventCategory, InputEvent};
pub use recording::RecordingSource;
pub use sequence::{SequenceState, SequenceSummary, SequenceTracker};
pub use session::{SessionController, SessionReport, SessionUpdate};
pub use source::{run_session, EventList, EventSource};

/// touchsize version embedded in session reports
pub const TOUCHSIZE_VERSION: &str = env!("CARGO_PKG_VERSION");
