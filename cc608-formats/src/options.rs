//! Caller configuration for the caption codecs.

use cc608_timecode::Timecode;
use serde::{Deserialize, Serialize};

/// Which of the two line-21 fields a stream carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Field {
    /// Field 1 (channels 1 and 2).
    #[default]
    One,
    /// Field 2 (channels 3 and 4).
    Two,
}

impl Field {
    /// Zero-based field index (0 or 1).
    pub fn index(&self) -> u8 {
        match self {
            Field::One => 0,
            Field::Two => 1,
        }
    }

    /// Field from a zero-based index.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Field::One),
            1 => Some(Field::Two),
            _ => None,
        }
    }
}

/// Options shared by the caption codecs.
///
/// Defaults match the reference tools: NTSC 29.97 fps, zero (unset)
/// start and end timecodes, non-drop counting, a null-run limit of 2,
/// native byte order and field 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CodecOptions {
    /// Frame rate of the target stream.
    pub fps: f64,
    /// Timecode of the stream's first frame.
    pub start: Timecode,
    /// Timecode to pad the stream out to on write; the zero sentinel
    /// disables end padding.
    pub end: Timecode,
    /// Whether timecodes count in drop-frame mode.
    pub drop_frame: bool,
    /// Longest run of null words kept inside a caption record before
    /// the record is closed.
    pub null_run_limit: u32,
    /// Write containers byte-swapped relative to their native order.
    pub byte_swap: bool,
    /// Which line-21 field the stream carries.
    pub field: Field,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            fps: 30000.0 / 1001.0,
            start: Timecode::zero(),
            end: Timecode::zero(),
            drop_frame: false,
            null_run_limit: 2,
            byte_swap: false,
            field: Field::One,
        }
    }
}

impl CodecOptions {
    /// Create options with the reference tool defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frame rate.
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Set the start timecode.
    pub fn with_start(mut self, start: Timecode) -> Self {
        self.start = start;
        self
    }

    /// Set the end timecode.
    pub fn with_end(mut self, end: Timecode) -> Self {
        self.end = end;
        self
    }

    /// Set drop-frame counting.
    pub fn with_drop_frame(mut self, drop_frame: bool) -> Self {
        self.drop_frame = drop_frame;
        self
    }

    /// Set the null-run limit for the raw demultiplexer.
    pub fn with_null_run_limit(mut self, limit: u32) -> Self {
        self.null_run_limit = limit;
        self
    }

    /// Set byte-swapped container output.
    pub fn with_byte_swap(mut self, byte_swap: bool) -> Self {
        self.byte_swap = byte_swap;
        self
    }

    /// Set the line-21 field.
    pub fn with_field(mut self, field: Field) -> Self {
        self.field = field;
        self
    }
}
