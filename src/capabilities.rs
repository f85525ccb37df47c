//! Which contact size axes a source reports

use crate::error::MeasureError;
use crate::event::{ABS_MT_ORIENTATION, ABS_MT_TOUCH_MAJOR, ABS_MT_TOUCH_MINOR};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisCapabilities {
    pub has_major: bool,
    pub has_minor: bool,
    pub has_orientation: bool,
}

impl AxisCapabilities {
    /// Build from the list of absolute axis codes a device advertises
    pub fn from_abs_codes<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        let mut caps = Self::default();
        for code in codes {
            match code {
                ABS_MT_TOUCH_MAJOR => caps.has_major = true,
                ABS_MT_TOUCH_MINOR => caps.has_minor = true,
                ABS_MT_ORIENTATION => caps.has_orientation = true,
                _ => {}
            }
        }
        caps
    }

    /// A session cannot start without the major axis
    pub fn require_major(self) -> Result<Self, MeasureError> {
        if self.has_major {
            Ok(self)
        } else {
            Err(MeasureError::MissingAxis("ABS_MT_TOUCH_MAJOR"))
        }
    }
}
