//! SMPTE timecode arithmetic for EIA-608 caption processing.
//!
//! This crate provides the [`Timecode`] type and conversions between
//! timecodes and absolute frame indices at real (possibly fractional)
//! frame rates, including the NTSC drop-frame correction.
//!
//! # Overview
//!
//! Caption files address frames by SMPTE timecode (`HH:MM:SS:FF`, or
//! `HH:MM:SS;FF` in drop-frame mode), while raw caption streams are a
//! flat sequence of frames. Converting between the two at the NTSC
//! rate of 30000/1001 fps requires the drop-frame correction: two
//! frame *numbers* (not frames) are skipped at the start of every
//! minute except every tenth minute.
//!
//! # Examples
//!
//! ```
//! use cc608_timecode::{clock, Timecode};
//!
//! let tc: Timecode = "00:01:00;02".parse().unwrap();
//! assert!(tc.drop_frame);
//!
//! // At a nominal 30 fps, 00:01:00;02 is frame 1800.
//! assert_eq!(clock::frame_index(&tc, 30.0), 1800);
//! assert_eq!(clock::timecode(1800, 30.0, true), tc);
//! ```
//!
//! Negative frame indices are supported for pre-roll material and map
//! to timecodes with negative hours:
//!
//! ```
//! use cc608_timecode::clock;
//!
//! let tc = clock::timecode(-30, 30.0, false);
//! assert_eq!(tc.to_string(), "-1:59:59:00");
//! ```

#![warn(missing_docs)]

pub mod clock;
pub mod error;
pub mod smpte;

pub use error::{Result, TimecodeError};
pub use smpte::Timecode;
