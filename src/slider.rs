//! Slider state tracking
//!
//! Turns raw readings from the hardware into move events. Lines come in as
//! `|`-separated 10-bit values, one per slider (e.g. `512|1023|0`).

use thiserror::Error;
use tracing::debug;

use crate::filter::{self, NoiseProfile};

/// Largest raw value reported by the hardware
pub const MAX_RAW_READING: u16 = 1023;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadingError {
    #[error("Empty reading line")]
    Empty,
    #[error("Invalid reading '{0}'")]
    InvalidValue(String),
    #[error("Expected {expected} sliders, got {actual}")]
    SliderCountChanged { expected: usize, actual: usize },
}

/// A slider moved far enough to act on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderMoveEvent {
    pub index: usize,
    pub percent: f32,
}

pub struct SliderTracker {
    profile: NoiseProfile,
    invert: bool,
    /// Last accepted value per slider, `None` until the first reading
    last: Vec<Option<f32>>,
}

impl SliderTracker {
    pub fn new(profile: NoiseProfile, invert: bool) -> Self {
        Self {
            profile,
            invert,
            last: Vec::new(),
        }
    }

    /// Swap the noise profile and inversion, keeping the last accepted values.
    pub fn reconfigure(&mut self, profile: NoiseProfile, invert: bool) {
        self.profile = profile;
        self.invert = invert;
    }

    pub fn slider_count(&self) -> usize {
        self.last.len()
    }

    /// Parse a line of raw readings into normalized fractions.
    pub fn parse_line(&self, line: &str) -> Result<Vec<f32>, ReadingError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ReadingError::Empty);
        }

        line.split('|')
            .map(|field| {
                let raw: u16 = field
                    .trim()
                    .parse()
                    .map_err(|_| ReadingError::InvalidValue(field.to_string()))?;
                if raw > MAX_RAW_READING {
                    return Err(ReadingError::InvalidValue(field.to_string()));
                }

                let value = filter::normalize(raw as f32 / MAX_RAW_READING as f32);
                Ok(if self.invert { 1.0 - value } else { value })
            })
            .collect()
    }

    /// Feed one line of readings and collect the sliders that moved.
    pub fn handle_line(&mut self, line: &str) -> Result<Vec<SliderMoveEvent>, ReadingError> {
        let values = self.parse_line(line)?;
        self.apply(&values)
    }

    /// Compare normalized values against the last accepted ones.
    ///
    /// The first set of values fixes the slider count and reports every slider.
    pub fn apply(&mut self, values: &[f32]) -> Result<Vec<SliderMoveEvent>, ReadingError> {
        if self.last.is_empty() {
            self.last = vec![None; values.len()];
        } else if self.last.len() != values.len() {
            return Err(ReadingError::SliderCountChanged {
                expected: self.last.len(),
                actual: values.len(),
            });
        }

        let mut events = Vec::new();
        for (index, (&value, last)) in values.iter().zip(self.last.iter_mut()).enumerate() {
            let moved = match *last {
                None => true,
                Some(previous) => filter::is_significant(previous, value, self.profile),
            };

            if moved {
                *last = Some(value);
                debug!("Slider {} moved to {:.2}", index, value);
                events.push(SliderMoveEvent {
                    index,
                    percent: value,
                });
            }
        }

        Ok(events)
    }
}
