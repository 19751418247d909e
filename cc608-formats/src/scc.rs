//! The Scenarist SCC caption text format.
//!
//! An SCC file starts with a `Scenarist_SCC V1.0` signature line; each
//! caption thereafter is a blank line, then a timecode, a tab, and the
//! caption words as space-separated 4-digit hex with parity applied:
//!
//! ```text
//! Scenarist_SCC V1.0
//!
//! 00:00:01:00	9420 9420 94ae 94ae
//! ```
//!
//! The reader is deliberately forgiving: malformed lines are reported
//! and skipped, and the drop-frame flag implied by the first
//! timecode's final separator applies to the whole file.

use crate::error::{FormatError, Result};
use crate::parity::{fix_parity, strip_parity};
use crate::store::{CaptionRecord, CaptionStore};
use cc608_timecode::Timecode;
use std::io::{BufRead, Read, Seek, SeekFrom, Write};
use tracing::{debug, warn};

/// Signature prefix of every SCC file, up to the version number.
pub const SCC_SIGNATURE: &str = "Scenarist_SCC V";

/// The SCC version this codec writes.
pub const SCC_VERSION: (u8, u8) = (1, 0);

/// Check whether the reader starts with an SCC signature line.
///
/// The stream position is restored; any I/O failure reads as "no".
pub fn is_scc_file<R: Read + Seek>(reader: &mut R) -> bool {
    let Ok(position) = reader.stream_position() else {
        return false;
    };
    let mut signature = [0u8; 18];
    let matched = match reader.read_exact(&mut signature) {
        Ok(()) => {
            signature.starts_with(SCC_SIGNATURE.as_bytes())
                && signature[15].is_ascii_digit()
                && signature[16] == b'.'
                && signature[17].is_ascii_digit()
        }
        Err(_) => false,
    };
    if reader.seek(SeekFrom::Start(position)).is_err() {
        return false;
    }
    matched
}

/// Read an SCC file into a caption store.
///
/// Fails only when the signature line is missing. Malformed caption
/// lines are skipped with a diagnostic; an I/O error mid-file returns
/// the records decoded so far.
pub fn read_scc<R: BufRead>(reader: &mut R) -> Result<CaptionStore> {
    let mut header = String::new();
    reader.read_line(&mut header)?;
    let header = header.trim_end();
    let version = parse_signature(header)
        .ok_or_else(|| FormatError::bad_magic("SCC", header.as_bytes()))?;
    if version != SCC_VERSION {
        warn!(
            "Unknown SCC version {}.{}, proceeding as 1.0",
            version.0, version.1
        );
    }

    let mut store = CaptionStore::new();
    let mut file_drop_frame: Option<bool> = None;
    let mut line = String::new();
    let mut line_number = 1usize;

    loop {
        line.clear();
        line_number += 1;
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                warn!("Read failed on line {line_number}: {err}");
                break;
            }
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            continue;
        }

        let (timestamp, data) = match trimmed.split_once('\t') {
            Some((timestamp, data)) => (timestamp, data),
            None => (trimmed, ""),
        };
        let mut timecode: Timecode = match timestamp.trim().parse() {
            Ok(tc) => tc,
            Err(_) => {
                warn!("Malformed timecode on line {line_number} (ignoring)");
                continue;
            }
        };

        // The first valid timecode's separator fixes the drop-frame
        // flag for the whole file.
        match file_drop_frame {
            None => file_drop_frame = Some(timecode.drop_frame),
            Some(drop_frame) => {
                if drop_frame != timecode.drop_frame {
                    warn!(
                        "Inconsistent drop-frame separator on line {line_number}, \
                         keeping the file's first"
                    );
                }
                timecode.drop_frame = drop_frame;
            }
        }

        let mut words = Vec::new();
        for token in data.split_whitespace() {
            match parse_word(token) {
                Some(word) => words.push(strip_parity(word)),
                None => {
                    warn!("Malformed caption data on line {line_number} (ignoring)");
                    break;
                }
            }
        }
        store.push(CaptionRecord::with_words(timecode, words));
    }

    debug!(records = store.len(), "read SCC file");
    Ok(store)
}

/// Write a caption store as an SCC file, returning the bytes written.
pub fn write_scc<W: Write>(store: &CaptionStore, writer: &mut W) -> Result<usize> {
    let mut line = format!("Scenarist_SCC V{}.{}\n", SCC_VERSION.0, SCC_VERSION.1);
    let mut written = 0;

    for record in store {
        line.push_str(&format!("\n{}\t", record.timecode));
        for (index, &word) in record.words.iter().enumerate() {
            if index > 0 {
                line.push(' ');
            }
            line.push_str(&format!("{:04x}", fix_parity(word)));
        }
        if !record.words.is_empty() {
            line.push('\n');
        }
        writer.write_all(line.as_bytes())?;
        written += line.len();
        line.clear();
    }

    debug!(records = store.len(), bytes = written, "wrote SCC file");
    Ok(written)
}

fn parse_signature(header: &str) -> Option<(u8, u8)> {
    let rest = header.strip_prefix(SCC_SIGNATURE)?;
    let mut parts = rest.splitn(2, '.');
    let major: u8 = parts.next()?.trim().parse().ok()?;
    let minor: u8 = parts.next()?.trim().parse().ok()?;
    Some((major, minor))
}

fn parse_word(token: &str) -> Option<u16> {
    if token.len() != 4 {
        return None;
    }
    u16::from_str_radix(token, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    const SAMPLE: &str = "Scenarist_SCC V1.0\n\
                          \n\
                          00:00:01:00\t9420 9420 94ae 94ae\n\
                          \n\
                          00:00:02:15\t942c 942c\n";

    #[test]
    fn test_is_scc_file() {
        let mut cursor = Cursor::new(SAMPLE.as_bytes());
        assert!(is_scc_file(&mut cursor));
        // Position restored.
        assert_eq!(cursor.position(), 0);

        let mut cursor = Cursor::new(&b"not captions"[..]);
        assert!(!is_scc_file(&mut cursor));

        let mut cursor = Cursor::new(&b""[..]);
        assert!(!is_scc_file(&mut cursor));
    }

    #[test]
    fn test_read_scc() {
        let mut cursor = Cursor::new(SAMPLE.as_bytes());
        let store = read_scc(&mut cursor).unwrap();

        assert_eq!(store.len(), 2);
        let first = store.get(0).unwrap();
        assert_eq!(first.timecode, Timecode::new(0, 0, 1, 0, false));
        // Words are stored parity-stripped.
        assert_eq!(first.words, vec![0x1420, 0x1420, 0x142e, 0x142e]);
        let second = store.get(1).unwrap();
        assert_eq!(second.timecode, Timecode::new(0, 0, 2, 15, false));
        assert_eq!(second.words, vec![0x142c, 0x142c]);
    }

    #[test]
    fn test_read_rejects_missing_signature() {
        let mut cursor = Cursor::new(&b"00:00:01:00\t9420\n"[..]);
        let result = read_scc(&mut cursor);
        assert!(matches!(result, Err(FormatError::BadMagic { .. })));
    }

    #[test]
    fn test_read_skips_malformed_lines() {
        let input = "Scenarist_SCC V1.0\n\
                     \n\
                     99:99:99:99\tZZZZ\n\
                     \n\
                     00:00:01:00\t9420\n";
        let mut cursor = Cursor::new(input.as_bytes());
        let store = read_scc(&mut cursor).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.first().unwrap().words, vec![0x1420]);
    }

    #[test]
    fn test_read_keeps_words_before_bad_token() {
        let input = "Scenarist_SCC V1.0\n\n00:00:01:00\t9420 94xx 94ae\n";
        let mut cursor = Cursor::new(input.as_bytes());
        let store = read_scc(&mut cursor).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.first().unwrap().words, vec![0x1420]);
    }

    #[test]
    fn test_read_drop_frame_flag_is_sticky() {
        let input = "Scenarist_SCC V1.0\n\
                     \n\
                     00:00:01;00\t9420\n\
                     \n\
                     00:00:02:00\t942c\n";
        let mut cursor = Cursor::new(input.as_bytes());
        let store = read_scc(&mut cursor).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get(0).unwrap().timecode.drop_frame);
        assert!(store.get(1).unwrap().timecode.drop_frame);
    }

    #[test]
    fn test_read_warns_on_future_version() {
        let input = "Scenarist_SCC V2.3\n\n00:00:01:00\t9420\n";
        let mut cursor = Cursor::new(input.as_bytes());
        let store = read_scc(&mut cursor).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_write_scc() {
        let mut store = CaptionStore::new();
        store.push(CaptionRecord::with_words(
            Timecode::new(0, 0, 1, 0, false),
            vec![0x1420, 0x1420, 0x142e, 0x142e],
        ));
        store.push(CaptionRecord::with_words(
            Timecode::new(0, 0, 2, 15, false),
            vec![0x142c, 0x142c],
        ));

        let mut buffer = Vec::new();
        let written = write_scc(&store, &mut buffer).unwrap();

        assert_eq!(written, buffer.len());
        assert_eq!(String::from_utf8(buffer).unwrap(), SAMPLE);
    }

    #[test]
    fn test_write_read_roundtrip() {
        let mut store = CaptionStore::new();
        store.push(CaptionRecord::with_words(
            Timecode::new(0, 1, 0, 2, true),
            vec![0x1420, 0x4142],
        ));
        store.push(CaptionRecord::with_words(
            Timecode::new(0, 1, 5, 10, true),
            vec![0x142f],
        ));

        let mut buffer = Vec::new();
        write_scc(&store, &mut buffer).unwrap();
        let mut cursor = Cursor::new(buffer);
        let back = read_scc(&mut cursor).unwrap();

        assert_eq!(back, store);
    }

    #[test]
    fn test_read_write_preserves_bytes() {
        let mut cursor = Cursor::new(SAMPLE.as_bytes());
        let store = read_scc(&mut cursor).unwrap();
        let mut buffer = Vec::new();
        write_scc(&store, &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), SAMPLE);
    }

    #[test]
    fn test_parse_signature() {
        assert_eq!(parse_signature("Scenarist_SCC V1.0"), Some((1, 0)));
        assert_eq!(parse_signature("Scenarist_SCC V2.3"), Some((2, 3)));
        assert_eq!(parse_signature("Scenarist_SCC"), None);
        assert_eq!(parse_signature(""), None);
    }
}
