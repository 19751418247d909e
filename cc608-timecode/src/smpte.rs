//! SMPTE timecode representation.
//!
//! A timecode identifies a frame as `HH:MM:SS:FF` (non-drop) or
//! `HH:MM:SS;FF` (drop-frame). The final separator carries the
//! drop-frame flag, following the SMPTE convention used by caption
//! authoring tools.

use crate::error::{Result, TimecodeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An SMPTE timecode.
///
/// Hours are signed so that pre-roll material (before the zero point)
/// can be addressed; minutes and seconds are reduced modulo 60 on
/// construction. The frames component is interpreted against a frame
/// rate supplied at conversion time, not stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Timecode {
    /// Hours component. May be negative for pre-roll timecodes.
    pub hours: i16,
    /// Minutes component (0-59).
    pub minutes: u8,
    /// Seconds component (0-59).
    pub seconds: u8,
    /// Frames component (0 to one below the nominal frame rate).
    pub frames: u8,
    /// Whether this timecode counts in NTSC drop-frame mode.
    pub drop_frame: bool,
}

impl Timecode {
    /// Create a new timecode. Minutes and seconds wrap modulo 60.
    pub fn new(hours: i16, minutes: u8, seconds: u8, frames: u8, drop_frame: bool) -> Self {
        Self {
            hours,
            minutes: minutes % 60,
            seconds: seconds % 60,
            frames,
            drop_frame,
        }
    }

    /// The all-zero non-drop timecode, used as an "unset" sentinel by
    /// codec options.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Whether every component is zero (the unset sentinel).
    pub fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0 && self.seconds == 0 && self.frames == 0
    }

    /// The separator character printed before the frames component.
    pub fn separator(&self) -> char {
        if self.drop_frame {
            ';'
        } else {
            ':'
        }
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}{}{:02}",
            self.hours,
            self.minutes,
            self.seconds,
            self.separator(),
            self.frames
        )
    }
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    /// Parse `HH:MM:SS:FF` or `HH:MM:SS;FF`. The third separator
    /// selects the drop-frame flag; hours may carry a leading minus.
    fn from_str(s: &str) -> Result<Self> {
        let separators: Vec<char> = s.chars().filter(|c| *c == ':' || *c == ';').collect();
        if separators.len() != 3 {
            return Err(TimecodeError::invalid_format(s));
        }
        if separators[0] != ':' || separators[1] != ':' {
            return Err(TimecodeError::invalid_format(s));
        }

        let parts: Vec<&str> = s.split([':', ';']).collect();
        if parts.len() != 4 {
            return Err(TimecodeError::invalid_format(s));
        }

        let hours: i16 = parts[0]
            .trim()
            .parse()
            .map_err(|_| TimecodeError::invalid_format(s))?;
        let minutes: u8 = parts[1]
            .parse()
            .map_err(|_| TimecodeError::invalid_format(s))?;
        let seconds: u8 = parts[2]
            .parse()
            .map_err(|_| TimecodeError::invalid_format(s))?;
        let frames: u8 = parts[3]
            .parse()
            .map_err(|_| TimecodeError::invalid_format(s))?;

        if minutes > 59 {
            return Err(TimecodeError::invalid_component("minutes", minutes as i32, 59));
        }
        if seconds > 59 {
            return Err(TimecodeError::invalid_component("seconds", seconds as i32, 59));
        }
        // Frames are bounded by the frame rate, which is not known
        // here; 127 is the widest value a packed timestamp can carry.
        if frames > 127 {
            return Err(TimecodeError::invalid_component(
                "frames",
                frames as i32,
                127,
            ));
        }

        Ok(Self {
            hours,
            minutes,
            seconds,
            frames,
            drop_frame: separators[2] == ';',
        })
    }
}
