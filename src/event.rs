//! Raw input event vocabulary
//!
//! Only the event types and codes the session controller acts on are named
//! here; everything else passes through as [`EventCategory::Other`] or an
//! uninteresting code and is ignored.

use serde::{Deserialize, Serialize};

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_ABS: u16 = 0x03;

pub const SYN_REPORT: u16 = 0x00;

pub const ABS_MT_TOUCH_MAJOR: u16 = 0x30;
pub const ABS_MT_TOUCH_MINOR: u16 = 0x31;
pub const ABS_MT_ORIENTATION: u16 = 0x34;
pub const ABS_MT_TRACKING_ID: u16 = 0x39;

pub const BTN_TOOL_QUINTTAP: u16 = 0x148;
pub const BTN_TOOL_DOUBLETAP: u16 = 0x14d;
pub const BTN_TOOL_TRIPLETAP: u16 = 0x14e;
pub const BTN_TOOL_QUADTAP: u16 = 0x14f;

/// Key codes that indicate more than one finger on the device
pub const MULTI_FINGER_TOOLS: [u16; 4] = [
    BTN_TOOL_DOUBLETAP,
    BTN_TOOL_TRIPLETAP,
    BTN_TOOL_QUADTAP,
    BTN_TOOL_QUINTTAP,
];

/// Event type of a raw input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Syn,
    Key,
    Abs,
    Other(u16),
}

impl EventCategory {
    pub fn from_raw(event_type: u16) -> Self {
        match event_type {
            EV_SYN => EventCategory::Syn,
            EV_KEY => EventCategory::Key,
            EV_ABS => EventCategory::Abs,
            other => EventCategory::Other(other),
        }
    }

    pub fn as_raw(&self) -> u16 {
        match self {
            EventCategory::Syn => EV_SYN,
            EventCategory::Key => EV_KEY,
            EventCategory::Abs => EV_ABS,
            EventCategory::Other(raw) => *raw,
        }
    }
}

/// One `{category, code, value}` record from the event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub category: EventCategory,
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    pub fn new(category: EventCategory, code: u16, value: i32) -> Self {
        Self {
            category,
            code,
            value,
        }
    }

    pub fn from_raw(event_type: u16, code: u16, value: i32) -> Self {
        Self::new(EventCategory::from_raw(event_type), code, value)
    }

    pub fn abs(code: u16, value: i32) -> Self {
        Self::new(EventCategory::Abs, code, value)
    }

    pub fn key(code: u16, value: i32) -> Self {
        Self::new(EventCategory::Key, code, value)
    }

    /// `SYN_REPORT` frame boundary
    pub fn syn_report() -> Self {
        Self::new(EventCategory::Syn, SYN_REPORT, 0)
    }

    pub fn is_frame_end(&self) -> bool {
        self.category == EventCategory::Syn && self.code == SYN_REPORT
    }
}

/// Human-readable name for the axes this tool cares about
pub fn abs_code_name(code: u16) -> Option<&'static str> {
    match code {
        ABS_MT_TOUCH_MAJOR => Some("ABS_MT_TOUCH_MAJOR"),
        ABS_MT_TOUCH_MINOR => Some("ABS_MT_TOUCH_MINOR"),
        ABS_MT_ORIENTATION => Some("ABS_MT_ORIENTATION"),
        ABS_MT_TRACKING_ID => Some("ABS_MT_TRACKING_ID"),
        _ => None,
    }
}
