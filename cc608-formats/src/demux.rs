//! Demultiplexer for raw line-21 word streams.
//!
//! A raw stream carries exactly one 16-bit word per frame; most frames
//! are null padding. The demultiplexer walks the stream once, groups
//! consecutive caption words into [`CaptionRecord`]s stamped with the
//! timecode of their first frame, and drops the padding in between.
//!
//! Records close on any of: a null run longer than the configured
//! limit (the run is trimmed off), a control code for a different
//! channel, a control code arriving after more than two plain words, a
//! terminator code, or a carriage return repeated twice in a row.
//! Terminators seen between records are consumed without opening one.

use crate::options::CodecOptions;
use crate::parity::strip_parity;
use crate::store::{CaptionRecord, CaptionStore};
use cc608_timecode::clock;
use tracing::{debug, trace};

/// High bytes of the miscellaneous control-code pairs, all channels.
const CONTROL_PREFIXES: [u8; 4] = [0x14, 0x15, 0x1c, 0x1d];

/// Single-pass raw stream demultiplexer.
///
/// Feed parity-carrying words with [`push`](Self::push), one per
/// frame, then collect the grouped records with
/// [`finish`](Self::finish).
#[derive(Debug)]
pub struct Demuxer {
    fps: f64,
    drop_frame: bool,
    null_run_limit: u32,
    frame: i64,
    channel: u8,
    open: Option<OpenRecord>,
    store: CaptionStore,
}

#[derive(Debug)]
struct OpenRecord {
    start_frame: i64,
    channel: u8,
    words: Vec<u16>,
    zero_run: u32,
    since_control: u32,
    last_control: Option<u16>,
}

impl Demuxer {
    /// Create a demultiplexer whose first word lands on the options'
    /// start timecode.
    pub fn new(options: &CodecOptions) -> Self {
        Self {
            fps: options.fps,
            drop_frame: options.drop_frame,
            null_run_limit: options.null_run_limit,
            frame: clock::frame_index(&options.start, options.fps),
            channel: 1,
            open: None,
            store: CaptionStore::new(),
        }
    }

    /// Consume one frame's word. Parity is stripped internally.
    pub fn push(&mut self, raw: u16) {
        let word = strip_parity(raw);
        match self.open.take() {
            None => self.push_idle(word),
            Some(record) => self.push_capturing(record, word),
        }
        self.frame += 1;
    }

    /// Finalize any open record and return the collected store.
    pub fn finish(mut self) -> CaptionStore {
        if let Some(record) = self.open.take() {
            self.finalize(record, true);
        }
        self.store
    }

    fn push_idle(&mut self, word: u16) {
        if word == 0 {
            return;
        }
        if is_terminator(word) {
            trace!(frame = self.frame, word, "terminator between records");
            if let Some(channel) = decode_channel(word) {
                self.channel = channel;
            }
            return;
        }
        let channel = decode_channel(word).unwrap_or(self.channel);
        self.begin(word, channel);
        self.channel = channel;
    }

    fn push_capturing(&mut self, mut record: OpenRecord, word: u16) {
        if word == 0 {
            record.words.push(0);
            record.zero_run += 1;
            record.since_control += 1;
            if record.zero_run > self.null_run_limit {
                self.finalize(record, true);
            } else {
                self.open = Some(record);
            }
            return;
        }

        record.zero_run = 0;
        let Some(channel) = decode_channel(word) else {
            record.words.push(word);
            record.since_control += 1;
            self.open = Some(record);
            return;
        };

        // A terminator still belongs to the burst it ends, so it
        // bypasses the stale-burst cap; a channel change never does.
        let switches_channel = record.words.len() > 1 && channel != record.channel;
        let terminator = is_terminator(word);
        let stale = !terminator && record.since_control > 2;
        if switches_channel || stale {
            self.finalize(record, true);
            self.push_idle(word);
            return;
        }

        let repeated_cr = is_carriage_return(word) && record.last_control == Some(word);
        record.words.push(word);
        record.since_control = 0;
        record.last_control = Some(word);
        if terminator || repeated_cr {
            self.finalize(record, false);
        } else {
            self.open = Some(record);
        }
        self.channel = channel;
    }

    fn begin(&mut self, word: u16, channel: u8) {
        let is_control = decode_channel(word).is_some();
        self.open = Some(OpenRecord {
            start_frame: self.frame,
            channel,
            words: vec![word],
            zero_run: 0,
            since_control: u32::from(!is_control),
            last_control: is_control.then_some(word),
        });
    }

    fn finalize(&mut self, mut record: OpenRecord, trim_nulls: bool) {
        if trim_nulls {
            while record.words.last() == Some(&0) {
                record.words.pop();
            }
        }
        if record.words.is_empty() {
            return;
        }
        let timecode = clock::timecode(record.start_frame, self.fps, self.drop_frame);
        debug!(
            %timecode,
            words = record.words.len(),
            channel = record.channel,
            "caption record"
        );
        self.store
            .push(CaptionRecord::with_words(timecode, record.words));
    }
}

/// Decode the caption channel from a control or XDS word, if it is one.
fn decode_channel(word: u16) -> Option<u8> {
    let hi = (word >> 8) as u8;
    match hi {
        0x01..=0x1f => Some(1 + ((hi >> 3) & 1) + 2 * (hi & 1)),
        _ => None,
    }
}

/// Whether the word ends a caption (EOC, erase, or XDS terminator).
fn is_terminator(word: u16) -> bool {
    let hi = (word >> 8) as u8;
    let lo = (word & 0xff) as u8;
    if (0x01..=0x0f).contains(&hi) {
        return hi == 0x0f;
    }
    CONTROL_PREFIXES.contains(&hi) && matches!(lo, 0x29 | 0x2c | 0x2f)
}

/// Whether the word is a carriage-return control code.
fn is_carriage_return(word: u16) -> bool {
    let hi = (word >> 8) as u8;
    CONTROL_PREFIXES.contains(&hi) && (word & 0xff) == 0x2d
}
