//! Noise filtering for raw slider readings
//!
//! Sliders report noisy analog values. Readings are truncated to two decimal
//! places and only forwarded when they move far enough from the last accepted
//! value, with the extremes (0.0 and 1.0) always reachable.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Tolerance used when checking whether a reading sits on an extreme
const SNAP_EPSILON: f64 = 0.000_001;

/// Noise reduction level selected in the config (`noise_reduction`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseProfile {
    High,
    Low,
    #[default]
    Default,
}

impl NoiseProfile {
    /// Parse a config value. Unknown values fall back to [`NoiseProfile::Default`].
    pub fn from_config(value: &str) -> Self {
        match value.trim() {
            "high" => NoiseProfile::High,
            "low" => NoiseProfile::Low,
            _ => NoiseProfile::Default,
        }
    }

    /// Minimum delta between two readings that counts as a real move.
    ///
    /// Each value sits between two round percentages, e.g. 0.025 lets the
    /// volume move in 3% steps.
    pub fn threshold(self) -> f64 {
        match self {
            NoiseProfile::High => 0.035,
            NoiseProfile::Low => 0.015,
            NoiseProfile::Default => 0.025,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoiseProfile::High => "high",
            NoiseProfile::Low => "low",
            NoiseProfile::Default => "default",
        }
    }
}

impl fmt::Display for NoiseProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NoiseProfile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(NoiseProfile::from_config(&raw))
    }
}

impl Serialize for NoiseProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Truncate a reading to two decimal places (0.15442 -> 0.15).
///
/// Floors instead of rounding, so the result never exceeds a non-negative input.
pub fn normalize(reading: f32) -> f32 {
    ((reading as f64 * 100.0).floor() / 100.0) as f32
}

/// Whether `candidate` differs enough from `previous` to be acted upon.
pub fn is_significant(previous: f32, candidate: f32, profile: NoiseProfile) -> bool {
    if ((previous - candidate) as f64).abs() >= profile.threshold() {
        return true;
    }

    // Snap to the edges so full mute and full volume stay reachable
    (almost_equals(candidate, 1.0) && previous != 1.0)
        || (almost_equals(candidate, 0.0) && previous != 0.0)
}

fn almost_equals(a: f32, b: f32) -> bool {
    ((a - b) as f64).abs() < SNAP_EPSILON
}
