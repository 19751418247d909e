//! The raw line-21 bitstream format.
//!
//! A raw file is a 4-byte `FF FF FF FF` magic followed by one
//! big-endian 16-bit caption word per frame. Frames with no caption
//! payload carry the null word `0x8080` (zero with odd parity). The
//! reader feeds every frame through the [`Demuxer`](crate::demux::Demuxer)
//! to recover timestamped caption records; the writer lays records
//! back out at their frame positions, padding the gaps.

use crate::demux::Demuxer;
use crate::error::{FormatError, Result};
use crate::options::CodecOptions;
use crate::parity::fix_parity;
use crate::store::CaptionStore;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use cc608_timecode::clock;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use tracing::{debug, warn};

/// Magic bytes prefixing a raw caption stream.
pub const RAW_MAGIC: [u8; 4] = [0xff, 0xff, 0xff, 0xff];

/// Check whether the reader starts with the raw stream magic.
///
/// The stream position is restored; any I/O failure reads as "no".
pub fn is_raw_file<R: Read + Seek>(reader: &mut R) -> bool {
    let Ok(position) = reader.stream_position() else {
        return false;
    };
    let mut magic = [0u8; 4];
    let matched = matches!(reader.read_exact(&mut magic), Ok(())) && magic == RAW_MAGIC;
    if reader.seek(SeekFrom::Start(position)).is_err() {
        return false;
    }
    matched
}

/// Read a raw caption stream into a caption store.
///
/// The first word is stamped with the options' start timecode. An I/O
/// error after the magic returns the records demultiplexed so far.
pub fn read_raw<R: Read>(reader: &mut R, options: &CodecOptions) -> Result<CaptionStore> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != RAW_MAGIC {
        return Err(FormatError::bad_magic("raw", &magic));
    }

    let mut demuxer = Demuxer::new(options);
    let mut frames = 0u64;
    loop {
        match reader.read_u16::<BigEndian>() {
            Ok(word) => {
                demuxer.push(word);
                frames += 1;
            }
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => break,
            Err(err) => {
                warn!("Read failed after {frames} frames: {err}");
                break;
            }
        }
    }

    let store = demuxer.finish();
    debug!(frames, records = store.len(), "read raw stream");
    Ok(store)
}

/// Write a caption store as a raw stream, returning the bytes written.
///
/// Records land at the frame their timecode names; the gaps are filled
/// with null words. The stream runs from the options' start timecode
/// to its end timecode, or one null word past the last record when no
/// end is set. A record timed before the current write position is a
/// fatal [`FormatError::OutOfOrder`].
pub fn write_raw<W: Write>(
    store: &CaptionStore,
    writer: &mut W,
    options: &CodecOptions,
) -> Result<usize> {
    let null_word = fix_parity(0);
    let mut current = clock::frame_index(&options.start, options.fps);
    let mut last = clock::frame_index(&options.end, options.fps);

    if last < current {
        if !options.end.is_zero() {
            warn!(
                "End timecode {} precedes start timecode {}, ignoring it",
                options.end, options.start
            );
        }
        last = current;
    }
    if let Some(first) = store.first() {
        let first_frame = clock::frame_index(&first.timecode, options.fps);
        if first_frame < current {
            warn!(
                "First caption at {} precedes start timecode {}, starting there",
                first.timecode, options.start
            );
            current = first_frame;
        }
    }

    writer.write_all(&RAW_MAGIC)?;
    let mut written = RAW_MAGIC.len();

    for record in store {
        let frame = clock::frame_index(&record.timecode, options.fps);
        if frame < current {
            return Err(FormatError::out_of_order(record.timecode));
        }
        for _ in current..frame {
            writer.write_u16::<BigEndian>(null_word)?;
        }
        for &word in &record.words {
            writer.write_u16::<BigEndian>(fix_parity(word))?;
        }
        written += 2 * (frame - current) as usize + 2 * record.words.len();
        current = frame + record.words.len() as i64;
    }

    if last > current {
        for _ in current..last {
            writer.write_u16::<BigEndian>(null_word)?;
        }
        written += 2 * (last - current) as usize;
    } else {
        // One trailing null word so hardware sees the stream close.
        writer.write_u16::<BigEndian>(null_word)?;
        written += 2;
    }

    debug!(records = store.len(), bytes = written, "wrote raw stream");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CaptionRecord;
    use cc608_timecode::Timecode;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn options_30fps() -> CodecOptions {
        CodecOptions::default().with_fps(30.0)
    }

    fn sample_store() -> CaptionStore {
        let mut store = CaptionStore::new();
        store.push(CaptionRecord::with_words(
            Timecode::new(0, 0, 0, 2, false),
            vec![0x1420, 0x1420, 0x142f],
        ));
        store
    }

    #[test]
    fn test_is_raw_file() {
        let mut cursor = Cursor::new(vec![0xff, 0xff, 0xff, 0xff, 0x80, 0x80]);
        assert!(is_raw_file(&mut cursor));
        assert_eq!(cursor.position(), 0);

        let mut cursor = Cursor::new(vec![0xff, 0xff, 0xff]);
        assert!(!is_raw_file(&mut cursor));

        let mut cursor = Cursor::new(b"Scenarist_SCC V1.0".to_vec());
        assert!(!is_raw_file(&mut cursor));
    }

    #[test]
    fn test_write_raw_layout() {
        let mut buffer = Vec::new();
        let written = write_raw(&sample_store(), &mut buffer, &options_30fps()).unwrap();

        assert_eq!(written, buffer.len());
        // Magic, 2 null frames, 3 caption words, 1 trailing null.
        assert_eq!(buffer.len(), 4 + 2 * 6);
        assert_eq!(&buffer[..4], &RAW_MAGIC);
        assert_eq!(&buffer[4..8], &[0x80, 0x80, 0x80, 0x80]);
        assert_eq!(&buffer[8..14], &[0x94, 0x20, 0x94, 0x20, 0x94, 0x2f]);
        assert_eq!(&buffer[14..], &[0x80, 0x80]);
    }

    #[test]
    fn test_write_raw_pads_to_end_timecode() {
        let options = options_30fps().with_end(Timecode::new(0, 0, 0, 10, false));
        let mut buffer = Vec::new();
        write_raw(&sample_store(), &mut buffer, &options).unwrap();

        // Frames 0..10: 2 nulls, 3 words, 5 trailing nulls.
        assert_eq!(buffer.len(), 4 + 2 * 10);
        assert_eq!(&buffer[buffer.len() - 2..], &[0x80, 0x80]);
    }

    #[test]
    fn test_write_raw_rejects_out_of_order_records() {
        let mut store = sample_store();
        store.push(CaptionRecord::with_words(
            Timecode::new(0, 0, 0, 1, false),
            vec![0x1420],
        ));

        let mut buffer = Vec::new();
        let result = write_raw(&store, &mut buffer, &options_30fps());
        assert_eq!(
            result,
            Err(FormatError::out_of_order(Timecode::new(0, 0, 0, 1, false)))
        );
    }

    #[test]
    fn test_read_raw_rejects_bad_magic() {
        let mut cursor = Cursor::new(vec![0x00, 0x00, 0x00, 0x00]);
        let result = read_raw(&mut cursor, &options_30fps());
        assert!(matches!(result, Err(FormatError::BadMagic { .. })));
    }

    #[test]
    fn test_read_raw_demultiplexes() {
        let mut buffer = Vec::new();
        write_raw(&sample_store(), &mut buffer, &options_30fps()).unwrap();

        let mut cursor = Cursor::new(buffer);
        let store = read_raw(&mut cursor, &options_30fps()).unwrap();

        assert_eq!(store, sample_store());
    }

    #[test]
    fn test_raw_roundtrip_preserves_canonical_bytes() {
        let mut buffer = Vec::new();
        write_raw(&sample_store(), &mut buffer, &options_30fps()).unwrap();

        let mut cursor = Cursor::new(buffer.clone());
        let store = read_raw(&mut cursor, &options_30fps()).unwrap();
        let mut rewritten = Vec::new();
        write_raw(&store, &mut rewritten, &options_30fps()).unwrap();

        assert_eq!(rewritten, buffer);
    }

    #[test]
    fn test_read_raw_with_start_offset() {
        let start = Timecode::new(0, 0, 1, 0, false);
        let options = options_30fps().with_start(start);

        let mut buffer = Vec::new();
        buffer.extend_from_slice(&RAW_MAGIC);
        buffer.extend_from_slice(&[0x80, 0x80, 0x94, 0x20, 0x94, 0x2f]);

        let mut cursor = Cursor::new(buffer);
        let store = read_raw(&mut cursor, &options).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.first().unwrap().timecode,
            Timecode::new(0, 0, 1, 1, false)
        );
        assert_eq!(store.first().unwrap().words, vec![0x1420, 0x142f]);
    }

    #[test]
    fn test_write_raw_warns_but_recovers_on_early_first_record() {
        let options = options_30fps().with_start(Timecode::new(0, 0, 1, 0, false));
        let mut buffer = Vec::new();
        // First record at frame 2, start at frame 30: writer backs up
        // to the record, then pads out to the start frame.
        write_raw(&sample_store(), &mut buffer, &options).unwrap();
        assert_eq!(&buffer[..4], &RAW_MAGIC);
        assert_eq!(buffer.len(), 4 + 2 * 28);
    }

    #[test]
    fn test_empty_store_writes_single_null() {
        let store = CaptionStore::new();
        let mut buffer = Vec::new();
        write_raw(&store, &mut buffer, &options_30fps()).unwrap();
        assert_eq!(buffer, vec![0xff, 0xff, 0xff, 0xff, 0x80, 0x80]);
    }
}
