use std::str::FromStr;

use crate::foundation::error::{EditError, EditResult};

/// Frame positions and clip lengths at or past this are rejected.
pub const MAX_FRAME: u64 = 1 << 40;

/// Half-open frame range `[start, end)` on a timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameRange {
    /// First frame inside the range.
    pub start: u64,
    /// First frame after the range.
    pub end: u64, // exclusive
}

impl FrameRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: u64, end: u64) -> EditResult<Self> {
        if start > end {
            return Err(EditError::invalid_range(format!(
                "frame range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Range of `len` frames beginning at `start`.
    pub fn with_len(start: u64, len: u64) -> Self {
        Self {
            start,
            end: start.saturating_add(len),
        }
    }

    /// Number of frames covered.
    pub fn len_frames(self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// `true` when the range covers no frames.
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// `true` when `frame` lies inside the range.
    pub fn contains(self, frame: u64) -> bool {
        self.start <= frame && frame < self.end
    }

    /// `true` when both ranges share at least one frame.
    pub fn overlaps(self, other: FrameRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Move the range by `delta` frames, saturating at zero.
    pub fn shift(self, delta: i64) -> Self {
        Self {
            start: shift_frame(self.start, delta),
            end: shift_frame(self.end, delta),
        }
    }
}

/// Apply a signed delta to a frame position, saturating at both ends.
pub fn shift_frame(v: u64, delta: i64) -> u64 {
    if delta >= 0 {
        v.saturating_add(delta as u64)
    } else {
        v.saturating_sub(delta.unsigned_abs())
    }
}

/// Rational frame rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator.
    pub num: u32,
    /// Denominator, must be > 0.
    pub den: u32,
}

impl Fps {
    /// Create a frame rate, rejecting zero numerator or denominator.
    pub fn new(num: u32, den: u32) -> EditResult<Self> {
        if den == 0 {
            return Err(EditError::validation("fps den must be > 0"));
        }
        if num == 0 {
            return Err(EditError::validation("fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert a frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to whole frames, rounding down.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}

impl FromStr for Fps {
    type Err = EditError;

    /// Parses `"25"` or `"30000/1001"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (num, den) = match s.split_once('/') {
            Some((n, d)) => (n.trim(), d.trim()),
            None => (s, "1"),
        };
        let num = num
            .parse::<u32>()
            .map_err(|e| EditError::validation(format!("invalid fps numerator '{num}': {e}")))?;
        let den = den
            .parse::<u32>()
            .map_err(|e| EditError::validation(format!("invalid fps denominator '{den}': {e}")))?;
        Self::new(num, den)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
