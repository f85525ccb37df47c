//! Threshold configuration
//!
//! Thresholds come from three places, in order of precedence: explicit values
//! (command line or a JSON config file), the device quirks libinput applies to
//! the device, and finally built-in defaults of zero (unset).

use crate::error::MeasureError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quirk key holding the `down:up` touch size pair
pub const QUIRK_TOUCH_SIZE_RANGE: &str = "AttrTouchSizeRange";

/// Quirk key holding the palm size threshold
pub const QUIRK_PALM_SIZE_THRESHOLD: &str = "AttrPalmSizeThreshold";

/// Down/up hysteresis pair. A contact counts as down once it grows above
/// `down` and as up once it shrinks below `up`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchRange {
    pub down: i32,
    pub up: i32,
}

impl TouchRange {
    pub fn new(down: i32, up: i32) -> Result<Self, MeasureError> {
        if down < up {
            return Err(MeasureError::InvalidThresholds(format!(
                "down threshold {} is below up threshold {}",
                down, up
            )));
        }
        Ok(Self { down, up })
    }
}

impl FromStr for TouchRange {
    type Err = MeasureError;

    /// Parses `"down:up"`, e.g. `"10:8"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || {
            MeasureError::InvalidThresholds(format!("expected \"down:up\", got {:?}", s))
        };

        let (down, up) = s.trim().split_once(':').ok_or_else(malformed)?;
        let down = down.trim().parse::<i32>().map_err(|_| malformed())?;
        let up = up.trim().parse::<i32>().map_err(|_| malformed())?;
        Self::new(down, up)
    }
}

impl fmt::Display for TouchRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.down, self.up)
    }
}

/// Validated thresholds used by the classifier.
///
/// Only constructible through [`Thresholds::new`] (or deserialization, which
/// runs the same checks), so `down >= up` and `palm >= 0` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdValues")]
pub struct Thresholds {
    down: i32,
    up: i32,
    palm: i32,
}

/// Unchecked wire form of [`Thresholds`]
#[derive(Deserialize)]
struct ThresholdValues {
    down: i32,
    up: i32,
    palm: i32,
}

impl TryFrom<ThresholdValues> for Thresholds {
    type Error = MeasureError;

    fn try_from(values: ThresholdValues) -> Result<Self, Self::Error> {
        Thresholds::new(values.down, values.up, values.palm)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            down: 0,
            up: 0,
            palm: 0,
        }
    }
}

impl Thresholds {
    /// Create thresholds, rejecting `down < up` and negative palm sizes
    pub fn new(down: i32, up: i32, palm: i32) -> Result<Self, MeasureError> {
        Self::from_parts(TouchRange { down, up }, palm)
    }

    pub fn from_parts(range: TouchRange, palm: i32) -> Result<Self, MeasureError> {
        // TouchRange has public fields, so check the pair again
        let range = TouchRange::new(range.down, range.up)?;
        if palm < 0 {
            return Err(MeasureError::InvalidThresholds(format!(
                "palm threshold must not be negative, got {}",
                palm
            )));
        }
        Ok(Self {
            down: range.down,
            up: range.up,
            palm,
        })
    }

    pub fn down(&self) -> i32 {
        self.down
    }

    pub fn up(&self) -> i32 {
        self.up
    }

    pub fn palm(&self) -> i32 {
        self.palm
    }

    pub fn touch_range(&self) -> TouchRange {
        TouchRange {
            down: self.down,
            up: self.up,
        }
    }

    /// True when no touch size range was configured from any source
    pub fn is_unset(&self) -> bool {
        self.down == 0 && self.up == 0
    }

    /// True when the palm threshold is zero, which tags every contact as a palm
    pub fn palm_is_unset(&self) -> bool {
        self.palm == 0
    }
}

/// Per-device threshold metadata, as listed by `libinput quirks list`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceQuirks {
    pub touch_range: Option<TouchRange>,
    pub palm: Option<i32>,
}

impl DeviceQuirks {
    /// Parse `Key=value` lines. Unknown keys are ignored; a known key with a
    /// malformed value is an error.
    pub fn parse(text: &str) -> Result<Self, MeasureError> {
        let mut quirks = Self::default();

        for line in text.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            match key.trim() {
                QUIRK_TOUCH_SIZE_RANGE => {
                    quirks.touch_range = Some(value.parse()?);
                }
                QUIRK_PALM_SIZE_THRESHOLD => {
                    let palm = value.trim().parse::<i32>().map_err(|_| {
                        MeasureError::InvalidThresholds(format!(
                            "{} has invalid value {:?}",
                            QUIRK_PALM_SIZE_THRESHOLD, value
                        ))
                    })?;
                    quirks.palm = Some(palm);
                }
                _ => {}
            }
        }

        Ok(quirks)
    }
}

/// Explicit threshold overrides. Either part may be left out to fall back
/// to device quirks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touch_range: Option<TouchRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palm: Option<i32>,
}

impl ThresholdConfig {
    /// Resolve final thresholds: explicit values, then quirks, then defaults
    pub fn resolve(&self, quirks: &DeviceQuirks) -> Result<Thresholds, MeasureError> {
        let defaults = Thresholds::default();
        let range = self
            .touch_range
            .or(quirks.touch_range)
            .unwrap_or_else(|| defaults.touch_range());
        let palm = self.palm.or(quirks.palm).unwrap_or(defaults.palm);

        // Deserialized configs bypass TouchRange::new, so re-check here.
        Thresholds::new(range.down, range.up, palm)
    }

    /// Load config from JSON
    pub fn from_json(json: &str) -> Result<Self, MeasureError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize config to JSON
    pub fn to_json(&self) -> Result<String, MeasureError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_touch_range_parse() {
        let range: TouchRange = "10:8".parse().unwrap();
        assert_eq!(range, TouchRange { down: 10, up: 8 });

        let range: TouchRange = " 5 : 5 ".parse().unwrap();
        assert_eq!(range, TouchRange { down: 5, up: 5 });
    }

    #[test]
    fn test_touch_range_rejects_inverted_pair() {
        let err = "3:8".parse::<TouchRange>().unwrap_err();
        assert!(matches!(err, MeasureError::InvalidThresholds(_)));
    }

    #[test]
    fn test_touch_range_rejects_malformed_text() {
        for text in ["", "10", "10:", ":8", "a:b", "10-8"] {
            assert!(text.parse::<TouchRange>().is_err(), "accepted {:?}", text);
        }
    }

    #[test]
    fn test_thresholds_reject_negative_palm() {
        assert!(Thresholds::new(10, 8, -1).is_err());
        assert!(Thresholds::new(10, 8, 0).is_ok());
    }

    #[test]
    fn test_thresholds_deserialize_validates() {
        let ok: Thresholds = serde_json::from_str(r#"{"down":50,"up":30,"palm":80}"#).unwrap();
        assert_eq!(ok, Thresholds::new(50, 30, 80).unwrap());

        let inverted = serde_json::from_str::<Thresholds>(r#"{"down":1,"up":9,"palm":3}"#);
        assert!(inverted.is_err());

        let negative_palm = serde_json::from_str::<Thresholds>(r#"{"down":9,"up":1,"palm":-3}"#);
        assert!(negative_palm.is_err());
    }

    #[test]
    fn test_from_parts_rechecks_range() {
        let inverted = TouchRange { down: 10, up: 50 };
        assert!(matches!(
            Thresholds::from_parts(inverted, 5),
            Err(MeasureError::InvalidThresholds(_))
        ));
    }

    #[test]
    fn test_palm_unset() {
        assert!(!Thresholds::new(50, 30, 80).unwrap().palm_is_unset());
        assert!(Thresholds::new(50, 30, 0).unwrap().palm_is_unset());
    }

    #[test]
    fn test_quirks_parse() {
        let text = "\
AttrSizeHint=100x60
AttrTouchSizeRange=20:10
AttrPalmSizeThreshold=40
ModelAppleTouchpad=1
";
        let quirks = DeviceQuirks::parse(text).unwrap();
        assert_eq!(quirks.touch_range, Some(TouchRange { down: 20, up: 10 }));
        assert_eq!(quirks.palm, Some(40));
    }

    #[test]
    fn test_quirks_parse_rejects_bad_value() {
        assert!(DeviceQuirks::parse("AttrPalmSizeThreshold=big").is_err());
        assert!(DeviceQuirks::parse("AttrTouchSizeRange=1:9").is_err());
    }

    #[test]
    fn test_resolve_precedence() {
        let quirks = DeviceQuirks {
            touch_range: Some(TouchRange { down: 20, up: 10 }),
            palm: Some(40),
        };

        let none = ThresholdConfig::default();
        assert_eq!(
            none.resolve(&quirks).unwrap(),
            Thresholds::new(20, 10, 40).unwrap()
        );

        let explicit = ThresholdConfig {
            touch_range: Some(TouchRange { down: 50, up: 30 }),
            palm: None,
        };
        assert_eq!(
            explicit.resolve(&quirks).unwrap(),
            Thresholds::new(50, 30, 40).unwrap()
        );

        let resolved = none.resolve(&DeviceQuirks::default()).unwrap();
        assert_eq!(resolved, Thresholds::default());
        assert!(resolved.is_unset());
        assert!(resolved.palm_is_unset());
    }

    #[test]
    fn test_resolve_revalidates_deserialized_config() {
        let config = ThresholdConfig::from_json(r#"{"touch_range":{"down":1,"up":9}}"#).unwrap();
        assert!(config.resolve(&DeviceQuirks::default()).is_err());
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = ThresholdConfig {
            touch_range: Some(TouchRange { down: 50, up: 30 }),
            palm: Some(80),
        };
        let json = config.to_json().unwrap();
        assert_eq!(ThresholdConfig::from_json(&json).unwrap(), config);
    }
}
