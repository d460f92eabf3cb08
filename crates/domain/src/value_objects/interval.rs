//! Pacing interval between emitted replay events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::DomainError;

/// Seconds to wait between two emitted events of a replay.
///
/// Requests must supply a strictly positive value that fits in a
/// [`Duration`]. Zero is accepted only through [`ReplayInterval::immediate`],
/// which exists for tooling and tests that want a replay to run without pacing.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ReplayInterval(f64);

impl ReplayInterval {
    pub fn from_secs(seconds: f64) -> Result<Self, DomainError> {
        if !seconds.is_finite() {
            return Err(DomainError::validation("intervalSeconds must be a finite number"));
        }
        if seconds <= 0.0 {
            return Err(DomainError::validation("intervalSeconds must be greater than zero"));
        }
        if Duration::try_from_secs_f64(seconds).is_err() {
            return Err(DomainError::validation("intervalSeconds is too large"));
        }
        Ok(Self(seconds))
    }

    /// An interval of zero seconds.
    pub fn immediate() -> Self {
        Self(0.0)
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        // Construction guarantees the value fits.
        Duration::try_from_secs_f64(self.0).unwrap_or(Duration::MAX)
    }
}

impl Default for ReplayInterval {
    fn default() -> Self {
        Self(20.0)
    }
}

impl fmt::Display for ReplayInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl TryFrom<f64> for ReplayInterval {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        // Stored records may carry the zero interval written by tooling.
        if value == 0.0 {
            return Ok(Self::immediate());
        }
        Self::from_secs(value)
    }
}

impl From<ReplayInterval> for f64 {
    fn from(interval: ReplayInterval) -> f64 {
        interval.0
    }
}
