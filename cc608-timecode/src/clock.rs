//! Conversions between timecodes and absolute frame indices.
//!
//! The conversions work against a real (possibly fractional) frame
//! rate such as the NTSC 30000/1001, with the NTSC drop-frame
//! correction applied when requested: two frame numbers are skipped at
//! the start of every minute except every tenth minute, which works
//! out to 108 skipped numbers per hour and 18 per ten-minute block.
//!
//! Frame indices are signed; a negative index maps to a timecode with
//! negative hours and in-range minutes, seconds and frames, so
//! pre-roll material stays addressable.

use crate::smpte::Timecode;
use tracing::trace;

/// Frame numbers skipped at the start of each non-tenth minute.
const DROP_FRAMES_PER_MINUTE: i64 = 2;

/// Convert a timecode to an absolute frame index.
///
/// Uses the half-up bias of the reference caption tools: the real
/// result is offset by 0.5 and floored, so fractional NTSC rates land
/// on the conventional integer frame numbers. Flooring rather than
/// truncating keeps the bias pointing the same way for negative
/// timecodes.
pub fn frame_index(tc: &Timecode, fps: f64) -> i64 {
    let hours = f64::from(tc.hours);
    let seconds = f64::from(tc.seconds);
    let frames = f64::from(tc.frames);

    let real = if tc.drop_frame {
        let tens = f64::from(tc.minutes / 10);
        let ones = f64::from(tc.minutes % 10);
        (3600.0 * fps - 108.0) * hours
            + (600.0 * fps - 18.0) * tens
            + (60.0 * fps - 2.0) * ones
            + fps * seconds
            + frames
    } else {
        let minutes = f64::from(tc.minutes);
        fps * (3600.0 * hours + 60.0 * minutes + seconds) + frames
    };

    let index = (real + 0.5).floor() as i64;
    trace!(%tc, fps, index, "timecode to frame index");
    index
}

/// Convert an absolute frame index back to a timecode.
///
/// Hours are peeled off by flooring division so the remainder is
/// never negative (a negative index yields negative hours and
/// in-range lower components); the lower components then peel by
/// truncating division against the drop-adjusted frame counts and
/// carry against the nominal integer rate. In drop-frame mode a
/// result landing on a skipped frame number (frames 0 or 1 at the
/// start of a non-tenth minute) is forced onto the first frame that
/// exists.
pub fn timecode(index: i64, fps: f64, drop_frame: bool) -> Timecode {
    let nominal = fps.round() as i64;
    let (per_hour, per_ten_minutes, per_minute, minute_offset) = if drop_frame {
        (
            3600.0 * fps - 108.0,
            600.0 * fps - 18.0,
            60.0 * fps - 2.0,
            DROP_FRAMES_PER_MINUTE as f64,
        )
    } else {
        (3600.0 * fps, 600.0 * fps, 60.0 * fps, 0.0)
    };

    let mut remainder = index as f64;

    // Floor, not truncate: the remainder must stay in [0, per_hour)
    // so the lower components come out in range for any index sign.
    let mut hours = (remainder / per_hour).floor() as i64;
    remainder -= hours as f64 * per_hour;

    let tens = (remainder / per_ten_minutes).trunc() as i64;
    remainder -= tens as f64 * per_ten_minutes;

    // Non-tenth minutes start at frame `minute_offset` of the minute,
    // so the boundary for the ones digit is shifted by that much.
    let ones = ((remainder - minute_offset) / per_minute).trunc() as i64;
    remainder -= ones as f64 * per_minute;
    let mut minutes = tens * 10 + ones;

    let mut seconds = (remainder / fps).trunc() as i64;
    remainder -= seconds as f64 * fps;

    let mut frames = (remainder + 0.5).floor() as i64;

    // Carry pass.
    if frames >= nominal {
        frames -= nominal;
        seconds += 1;
    }
    if seconds >= 60 {
        seconds -= 60;
        minutes += 1;
    }
    if minutes >= 60 {
        minutes -= 60;
        hours += 1;
    }

    // Frames 0 and 1 do not exist at the start of a non-tenth minute.
    if drop_frame && seconds == 0 && minutes % 10 != 0 && frames < DROP_FRAMES_PER_MINUTE {
        frames = DROP_FRAMES_PER_MINUTE;
    }

    let tc = Timecode {
        hours: hours as i16,
        minutes: minutes as u8,
        seconds: seconds as u8,
        frames: frames as u8,
        drop_frame,
    };
    trace!(index, fps, %tc, "frame index to timecode");
    tc
}

/// Shift a timecode by a signed number of frames.
pub fn shift(tc: &Timecode, delta: i64, fps: f64) -> Timecode {
    timecode(frame_index(tc, fps) + delta, fps, tc.drop_frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NTSC_FPS: f64 = 30000.0 / 1001.0;

    fn tc(h: i16, m: u8, s: u8, f: u8, drop: bool) -> Timecode {
        Timecode::new(h, m, s, f, drop)
    }

    #[test]
    fn test_frame_index_non_drop_integral_rate() {
        assert_eq!(frame_index(&tc(0, 0, 0, 0, false), 30.0), 0);
        assert_eq!(frame_index(&tc(0, 0, 1, 0, false), 30.0), 30);
        assert_eq!(frame_index(&tc(0, 1, 0, 0, false), 30.0), 1800);
        assert_eq!(frame_index(&tc(1, 0, 0, 0, false), 30.0), 108_000);
        assert_eq!(frame_index(&tc(0, 0, 59, 29, false), 30.0), 1799);
    }

    #[test]
    fn test_frame_index_drop_frame_constants() {
        // Drop-frame at a nominal 30 fps matches the conventional
        // frame numbering: 2 dropped per minute, 18 per ten minutes,
        // 108 per hour.
        assert_eq!(frame_index(&tc(0, 1, 0, 2, true), 30.0), 1800);
        assert_eq!(frame_index(&tc(0, 10, 0, 0, true), 30.0), 17_982);
        assert_eq!(frame_index(&tc(1, 0, 0, 0, true), 30.0), 107_892);
        assert_eq!(frame_index(&tc(0, 0, 59, 29, true), 30.0), 1799);
    }

    #[test]
    fn test_frame_index_ntsc_half_up_bias() {
        // 00:01:00;02 at 29.97: (60*fps - 2) + 2 + 0.5 truncates to 1798.
        assert_eq!(frame_index(&tc(0, 1, 0, 2, true), NTSC_FPS), 1798);
        // One hour non-drop at 29.97.
        assert_eq!(frame_index(&tc(1, 0, 0, 0, false), NTSC_FPS), 107_892);
    }

    #[test]
    fn test_frame_index_negative_hours() {
        assert_eq!(frame_index(&tc(-1, 59, 59, 0, false), 30.0), -30);
        assert_eq!(frame_index(&tc(-1, 0, 0, 0, false), 30.0), -108_000);
    }

    #[test]
    fn test_timecode_non_drop_integral_rate() {
        assert_eq!(timecode(0, 30.0, false), tc(0, 0, 0, 0, false));
        assert_eq!(timecode(1799, 30.0, false), tc(0, 0, 59, 29, false));
        assert_eq!(timecode(1800, 30.0, false), tc(0, 1, 0, 0, false));
        assert_eq!(timecode(108_000, 30.0, false), tc(1, 0, 0, 0, false));
    }

    #[test]
    fn test_timecode_drop_frame_skips_first_two_frames() {
        assert_eq!(timecode(1799, 30.0, true), tc(0, 0, 59, 29, true));
        assert_eq!(timecode(1800, 30.0, true), tc(0, 1, 0, 2, true));
        assert_eq!(timecode(1801, 30.0, true), tc(0, 1, 0, 3, true));
        // Tenth minutes keep frames 0 and 1.
        assert_eq!(timecode(17_982, 30.0, true), tc(0, 10, 0, 0, true));
    }

    #[test]
    fn test_timecode_ntsc_boundaries() {
        assert_eq!(timecode(1797, NTSC_FPS, true), tc(0, 0, 59, 29, true));
        assert_eq!(timecode(1798, NTSC_FPS, true), tc(0, 1, 0, 2, true));
        assert_eq!(timecode(17_964, NTSC_FPS, true), tc(0, 10, 0, 0, true));
        assert_eq!(timecode(107_784, NTSC_FPS, true), tc(1, 0, 0, 0, true));
        // Non-drop at 29.97 carries cleanly across the minute.
        assert_eq!(timecode(1797, NTSC_FPS, false), tc(0, 0, 59, 29, false));
        assert_eq!(timecode(1798, NTSC_FPS, false), tc(0, 1, 0, 0, false));
    }

    #[test]
    fn test_timecode_negative_indices() {
        assert_eq!(timecode(-1, 30.0, false), tc(-1, 59, 59, 29, false));
        assert_eq!(timecode(-30, 30.0, false), tc(-1, 59, 59, 0, false));
        assert_eq!(timecode(-31, 30.0, false), tc(-1, 59, 58, 29, false));
        assert_eq!(timecode(-120_000, 30.0, false), tc(-2, 53, 20, 0, false));
        assert_eq!(timecode(-1, NTSC_FPS, false), tc(-1, 59, 59, 29, false));
        assert_eq!(timecode(-30, NTSC_FPS, false), tc(-1, 59, 59, 0, false));
    }

    #[test]
    fn test_timecode_negative_indices_drop_frame() {
        assert_eq!(timecode(-1, 30.0, true), tc(-1, 59, 59, 29, true));
        // A whole hour back is still on a tenth-minute boundary.
        assert_eq!(timecode(-107_892, 30.0, true), tc(-1, 0, 0, 0, true));
        // Minute boundaries keep skipping frames 0 and 1.
        assert_eq!(timecode(-3596, 30.0, true), tc(-1, 58, 0, 2, true));
        assert_eq!(timecode(-3597, 30.0, true), tc(-1, 57, 59, 29, true));
        assert_eq!(timecode(-3592, NTSC_FPS, true), tc(-1, 58, 0, 2, true));
        assert_eq!(timecode(-3593, NTSC_FPS, true), tc(-1, 57, 59, 29, true));
    }

    #[test]
    fn test_roundtrip_exhaustive_integral_rate() {
        for index in (0..200_000).step_by(7) {
            for drop in [false, true] {
                let back = frame_index(&timecode(index, 30.0, drop), 30.0);
                assert_eq!(back, index, "index {index} drop {drop}");
            }
        }
    }

    #[test]
    fn test_roundtrip_ntsc() {
        for index in (0..200_000).step_by(11) {
            for drop in [false, true] {
                let back = frame_index(&timecode(index, NTSC_FPS, drop), NTSC_FPS);
                assert_eq!(back, index, "index {index} drop {drop}");
            }
        }
    }

    #[test]
    fn test_roundtrip_negative_non_drop() {
        for index in (-200_000..0).step_by(13) {
            for fps in [30.0, NTSC_FPS] {
                let back = frame_index(&timecode(index, fps, false), fps);
                assert_eq!(back, index, "index {index} fps {fps}");
            }
        }
    }

    #[test]
    fn test_roundtrip_negative_drop_frame() {
        for index in (-200_000..0).step_by(13) {
            for fps in [30.0, NTSC_FPS] {
                let back = frame_index(&timecode(index, fps, true), fps);
                assert_eq!(back, index, "index {index} fps {fps}");
            }
        }
    }

    #[test]
    fn test_shift() {
        let start = tc(0, 0, 59, 29, false);
        assert_eq!(shift(&start, 1, 30.0), tc(0, 1, 0, 0, false));
        assert_eq!(shift(&start, -1770, 30.0), tc(0, 0, 0, 29, false));
        // Shifting past zero lands in pre-roll.
        assert_eq!(shift(&start, -1800, 30.0), tc(-1, 59, 59, 29, false));
    }
}
