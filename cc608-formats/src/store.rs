//! In-memory caption data model.
//!
//! A [`CaptionRecord`] is one burst of caption words stamped with the
//! timecode of its first frame; a [`CaptionStore`] is the ordered,
//! append-only collection every codec reads into and writes from.
//! Caption words are stored parity-stripped; writers restore parity.

use cc608_timecode::Timecode;
use serde::{Deserialize, Serialize};

/// One caption burst: a start timecode and its 16-bit caption words.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptionRecord {
    /// Timecode of the frame carrying the first word.
    pub timecode: Timecode,
    /// Parity-stripped caption words, one per frame.
    pub words: Vec<u16>,
}

impl CaptionRecord {
    /// Create an empty record at the given timecode.
    pub fn new(timecode: Timecode) -> Self {
        Self {
            timecode,
            words: Vec::new(),
        }
    }

    /// Create a record with the given words.
    pub fn with_words(timecode: Timecode, words: Vec<u16>) -> Self {
        Self { timecode, words }
    }

    /// Number of caption words (one per frame).
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the record carries no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Ordered collection of caption records.
///
/// Records are appended in chronological order and addressed by their
/// stable insertion index; the backing storage is never exposed for
/// mutation, so indices handed out by [`push`](Self::push) stay valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptionStore {
    records: Vec<CaptionRecord>,
}

impl CaptionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, returning its stable index.
    pub fn push(&mut self, record: CaptionRecord) -> usize {
        self.records.push(record);
        self.records.len() - 1
    }

    /// Look up a record by index.
    pub fn get(&self, index: usize) -> Option<&CaptionRecord> {
        self.records.get(index)
    }

    /// Iterate over the records in chronological order.
    pub fn iter(&self) -> std::slice::Iter<'_, CaptionRecord> {
        self.records.iter()
    }

    /// The records as a slice.
    pub fn records(&self) -> &[CaptionRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The earliest record, if any.
    pub fn first(&self) -> Option<&CaptionRecord> {
        self.records.first()
    }

    /// The latest record, if any.
    pub fn last(&self) -> Option<&CaptionRecord> {
        self.records.last()
    }
}

impl<'a> IntoIterator for &'a CaptionStore {
    type Item = &'a CaptionRecord;
    type IntoIter = std::slice::Iter<'a, CaptionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<CaptionRecord> for CaptionStore {
    fn from_iter<I: IntoIterator<Item = CaptionRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Pack a timecode into the 32-bit container timestamp word.
///
/// Layout: bits 0-11 hours (two's complement), 12-17 minutes, 18-23
/// seconds, 24-30 frames, 31 the drop-frame flag.
pub fn pack_timecode(tc: &Timecode) -> u32 {
    let mut packed = (tc.hours as u32) & 0x0fff;
    packed |= u32::from(tc.minutes & 0x3f) << 12;
    packed |= u32::from(tc.seconds & 0x3f) << 18;
    packed |= u32::from(tc.frames & 0x7f) << 24;
    if tc.drop_frame {
        packed |= 0x8000_0000;
    }
    packed
}

/// Unpack a 32-bit container timestamp word into a timecode.
pub fn unpack_timecode(packed: u32) -> Timecode {
    // Sign-extend the 12-bit hours field.
    let hours = (((packed & 0x0fff) as i16) << 4) >> 4;
    Timecode {
        hours,
        minutes: ((packed >> 12) & 0x3f) as u8,
        seconds: ((packed >> 18) & 0x3f) as u8,
        frames: ((packed >> 24) & 0x7f) as u8,
        drop_frame: packed & 0x8000_0000 != 0,
    }
}
