//! Per-frame touch samples
//!
//! The kernel reports contact size as independent axis updates, one event per
//! axis, and only for axes whose value changed. [`TouchSample`] stages those
//! updates until the frame boundary; at that point it is mirrored into an
//! immutable [`TouchPoint`] and a fresh sample is seeded with the last known
//! values so axes that were not re-reported keep their value.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Fields written since the sample was created
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Fields: u8 {
        const MAJOR = 1;
        const MINOR = 1 << 1;
        const ORIENTATION = 1 << 2;
    }
}

/// In-progress reading for the current frame.
///
/// An axis that has never been reported is `None`, which is distinct from a
/// reported value of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchSample {
    major: Option<i32>,
    minor: Option<i32>,
    orientation: Option<i32>,
    updated: Fields,
}

impl TouchSample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_major(&mut self, value: i32) {
        self.major = Some(value);
        self.updated |= Fields::MAJOR;
    }

    pub fn set_minor(&mut self, value: i32) {
        self.minor = Some(value);
        self.updated |= Fields::MINOR;
    }

    pub fn set_orientation(&mut self, value: i32) {
        self.orientation = Some(value);
        self.updated |= Fields::ORIENTATION;
    }

    /// True if any field was written since this sample was created
    pub fn is_dirty(&self) -> bool {
        !self.updated.is_empty()
    }

    pub fn updated_fields(&self) -> Fields {
        self.updated
    }

    pub fn major(&self) -> Option<i32> {
        self.major
    }

    pub fn minor(&self) -> Option<i32> {
        self.minor
    }

    pub fn orientation(&self) -> Option<i32> {
        self.orientation
    }

    /// Seed for the next frame: same values, nothing marked as updated
    pub fn clone_carrying_forward(&self) -> Self {
        Self {
            updated: Fields::empty(),
            ..*self
        }
    }

    /// Freeze the staged values. Returns `None` while the major axis is still unknown.
    pub fn to_point(&self) -> Option<TouchPoint> {
        self.major.map(|major| TouchPoint {
            major,
            minor: self.minor,
            orientation: self.orientation,
        })
    }
}

/// Immutable, classified-ready reading appended to a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub major: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<i32>,
}

impl TouchPoint {
    pub fn new(major: i32) -> Self {
        Self {
            major,
            minor: None,
            orientation: None,
        }
    }

    pub fn with_minor(mut self, minor: i32) -> Self {
        self.minor = Some(minor);
        self
    }

    pub fn with_orientation(mut self, orientation: i32) -> Self {
        self.orientation = Some(orientation);
        self
    }
}

impl fmt::Display for TouchPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "major: {:3}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ", minor: {:3}", minor)?;
        }
        if let Some(orientation) = self.orientation {
            write!(f, ", orientation: {:+3}", orientation)?;
        }
        Ok(())
    }
}
