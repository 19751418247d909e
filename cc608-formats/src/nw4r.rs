//! The NW4R binary caption container.
//!
//! The container is a 0x40-byte header followed by sections named in
//! the header's section table; caption data lives in a `DATA` section:
//!
//! - magic `BCC1` (field 1) or `BCC2` (field 2)
//! - byte-order mark `0xFEFF` (native little-endian) or `0xFFFE`
//!   (byte-swapped), read before any wider field is trusted
//! - version bytes, total file size, header size (0x40), section
//!   count, then (offset, size) section table entries
//! - each `DATA` section: 4-byte magic, 32-bit size, 8 reserved bytes,
//!   then records of `packed timecode | word count | words`
//!
//! The packed timecode layout is described at
//! [`pack_timecode`](crate::store::pack_timecode).

use crate::bytes::{swap16, swap32};
use crate::error::{FormatError, Result};
use crate::options::{CodecOptions, Field};
use crate::parity::strip_parity;
use crate::store::{pack_timecode, unpack_timecode, CaptionRecord, CaptionStore};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use tracing::{debug, warn};

/// Container magic for a field-1 caption file.
pub const NW4R_MAGIC_FIELD_ONE: &[u8; 4] = b"BCC1";

/// Container magic for a field-2 caption file.
pub const NW4R_MAGIC_FIELD_TWO: &[u8; 4] = b"BCC2";

/// Magic of the caption data section.
pub const NW4R_DATA_MAGIC: &[u8; 4] = b"DATA";

/// Byte-order mark of a native (little-endian) file.
pub const NW4R_BOM_NATIVE: u16 = 0xfeff;

/// Byte-order mark of a byte-swapped file.
pub const NW4R_BOM_SWAPPED: u16 = 0xfffe;

/// Container version written by this codec.
pub const NW4R_VERSION: (u8, u8) = (1, 0);

/// Fixed size of the container header.
pub const NW4R_HEADER_SIZE: u16 = 0x40;

/// Fixed size of a section sub-header.
pub const NW4R_DATA_HEADER_SIZE: u32 = 0x10;

// The fixed header holds the section table between the count at
// offset 0x0e and the end of the header.
const MAX_SECTIONS: u16 = 6;

/// One entry of the container's section table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nw4rSection {
    /// Section offset from the start of the container.
    pub offset: u32,
    /// Section size including its sub-header.
    pub size: u32,
}

/// Parsed NW4R container header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nw4rHeader {
    /// Which line-21 field the container carries.
    pub field: Field,
    /// Whether multi-byte fields are byte-swapped relative to native.
    pub swapped: bool,
    /// Container version bytes.
    pub version: (u8, u8),
    /// Declared total file size.
    pub size: u32,
    /// Declared header size.
    pub header_size: u16,
    /// Section table.
    pub sections: Vec<Nw4rSection>,
}

impl Nw4rHeader {
    /// Parse the fixed 0x40-byte header from a reader.
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let mut header = [0u8; NW4R_HEADER_SIZE as usize];
        reader.read_exact(&mut header).map_err(|err| {
            if err.kind() == ErrorKind::UnexpectedEof {
                FormatError::truncated_header("NW4R")
            } else {
                FormatError::from(err)
            }
        })?;

        let field = match &header[0..4] {
            magic if magic == NW4R_MAGIC_FIELD_ONE => Field::One,
            magic if magic == NW4R_MAGIC_FIELD_TWO => Field::Two,
            magic => return Err(FormatError::bad_magic("NW4R", magic)),
        };
        let bom = u16::from_le_bytes([header[4], header[5]]);
        let swapped = match bom {
            NW4R_BOM_NATIVE => false,
            NW4R_BOM_SWAPPED => true,
            other => return Err(FormatError::InvalidByteOrderMark(other)),
        };
        let fix16 = |v: u16| if swapped { swap16(v) } else { v };
        let fix32 = |v: u32| if swapped { swap32(v) } else { v };

        let version = (header[6], header[7]);
        let size = fix32(u32::from_le_bytes([
            header[8], header[9], header[10], header[11],
        ]));
        let header_size = fix16(u16::from_le_bytes([header[12], header[13]]));
        let mut section_count = fix16(u16::from_le_bytes([header[14], header[15]]));
        if section_count > MAX_SECTIONS {
            warn!("Section count {section_count} exceeds the header's table, capping");
            section_count = MAX_SECTIONS;
        }

        let mut sections = Vec::with_capacity(section_count as usize);
        for index in 0..section_count as usize {
            let at = 0x10 + 8 * index;
            sections.push(Nw4rSection {
                offset: fix32(u32::from_le_bytes([
                    header[at],
                    header[at + 1],
                    header[at + 2],
                    header[at + 3],
                ])),
                size: fix32(u32::from_le_bytes([
                    header[at + 4],
                    header[at + 5],
                    header[at + 6],
                    header[at + 7],
                ])),
            });
        }

        Ok(Self {
            field,
            swapped,
            version,
            size,
            header_size,
            sections,
        })
    }
}

/// Check whether the reader holds an NW4R caption container.
///
/// Requires a parseable header and at least one `DATA` section. The
/// stream position is restored; any I/O failure reads as "no".
pub fn is_nw4r_file<R: Read + Seek>(reader: &mut R) -> bool {
    let Ok(position) = reader.stream_position() else {
        return false;
    };
    let matched = probe(reader, position).unwrap_or(false);
    if reader.seek(SeekFrom::Start(position)).is_err() {
        return false;
    }
    matched
}

fn probe<R: Read + Seek>(reader: &mut R, base: u64) -> Result<bool> {
    let header = match Nw4rHeader::parse(reader) {
        Ok(header) => header,
        Err(_) => return Ok(false),
    };
    for section in &header.sections {
        if reader
            .seek(SeekFrom::Start(base + u64::from(section.offset)))
            .is_err()
        {
            continue;
        }
        let mut magic = [0u8; 4];
        if reader.read_exact(&mut magic).is_ok() && &magic == NW4R_DATA_MAGIC {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Report which field a container carries from its magic alone.
///
/// The stream position is restored. Returns `None` when the magic is
/// not an NW4R caption magic.
pub fn nw4r_field<R: Read + Seek>(reader: &mut R) -> Option<Field> {
    let position = reader.stream_position().ok()?;
    let mut magic = [0u8; 4];
    let result = reader.read_exact(&mut magic);
    reader.seek(SeekFrom::Start(position)).ok()?;
    result.ok()?;
    match &magic {
        m if m == NW4R_MAGIC_FIELD_ONE => Some(Field::One),
        m if m == NW4R_MAGIC_FIELD_TWO => Some(Field::Two),
        _ => None,
    }
}

/// Read an NW4R container into a caption store.
///
/// Header problems (magic, byte-order mark, truncation) are fatal, as
/// is the absence of a `DATA` section. A version mismatch or a
/// disagreement between the section table and the sub-chunk size is
/// only a diagnostic; the smaller size wins. Payload truncation
/// returns the records decoded so far.
pub fn read_nw4r<R: Read + Seek>(reader: &mut R) -> Result<CaptionStore> {
    let base = reader.stream_position()?;
    let header = Nw4rHeader::parse(reader)?;
    if header.version != NW4R_VERSION {
        warn!(
            "Unknown NW4R version {}.{}, proceeding as {}.{}",
            header.version.0, header.version.1, NW4R_VERSION.0, NW4R_VERSION.1
        );
    }

    for section in &header.sections {
        reader.seek(SeekFrom::Start(base + u64::from(section.offset)))?;
        let mut sub = [0u8; NW4R_DATA_HEADER_SIZE as usize];
        if reader.read_exact(&mut sub).is_err() {
            warn!(offset = section.offset, "Unreadable section, skipping");
            continue;
        }
        if &sub[0..4] != NW4R_DATA_MAGIC {
            continue;
        }
        let mut chunk_size = u32::from_le_bytes([sub[4], sub[5], sub[6], sub[7]]);
        if header.swapped {
            chunk_size = swap32(chunk_size);
        }
        if chunk_size != section.size {
            warn!(
                "DATA section declares {chunk_size} bytes, table says {}, taking the smaller",
                section.size
            );
        }
        let payload = chunk_size
            .min(section.size)
            .saturating_sub(NW4R_DATA_HEADER_SIZE);
        return decode_payload(reader, payload, header.swapped);
    }

    Err(FormatError::MissingDataSection)
}

fn decode_payload<R: Read>(reader: &mut R, payload: u32, swapped: bool) -> Result<CaptionStore> {
    let mut store = CaptionStore::new();
    let mut remaining = u64::from(payload);

    'records: while remaining >= 8 {
        let (packed, count) = match (
            reader.read_u32::<LittleEndian>(),
            reader.read_u32::<LittleEndian>(),
        ) {
            (Ok(packed), Ok(count)) => {
                if swapped {
                    (swap32(packed), swap32(count))
                } else {
                    (packed, count)
                }
            }
            _ => {
                warn!("Truncated record header, keeping {} records", store.len());
                break;
            }
        };
        remaining -= 8;

        let mut words_left = u64::from(count);
        if 2 * words_left > remaining {
            warn!(
                "Record claims {count} words with {remaining} payload bytes left, truncating"
            );
            words_left = remaining / 2;
        }

        let mut words = Vec::with_capacity(words_left as usize);
        for _ in 0..words_left {
            match reader.read_u16::<LittleEndian>() {
                Ok(word) => {
                    let word = if swapped { swap16(word) } else { word };
                    words.push(strip_parity(word));
                }
                Err(err) => {
                    warn!("Truncated record payload: {err}");
                    remaining -= 2 * words.len() as u64;
                    store.push(CaptionRecord::with_words(unpack_timecode(packed), words));
                    break 'records;
                }
            }
        }
        remaining -= 2 * words_left;
        store.push(CaptionRecord::with_words(unpack_timecode(packed), words));
    }

    if remaining > 0 {
        warn!("Ignoring {remaining} trailing payload bytes");
    }
    debug!(records = store.len(), "read NW4R container");
    Ok(store)
}

/// Write a caption store as an NW4R container, returning the bytes
/// written.
///
/// `options.field` selects the magic and `options.byte_swap` the byte
/// order of every multi-byte field (the byte-order mark records the
/// choice for readers).
pub fn write_nw4r<W: Write>(
    store: &CaptionStore,
    writer: &mut W,
    options: &CodecOptions,
) -> Result<usize> {
    let swap = options.byte_swap;
    let fix16 = |v: u16| if swap { swap16(v) } else { v };
    let fix32 = |v: u32| if swap { swap32(v) } else { v };

    let payload: u32 = store
        .iter()
        .map(|record| 8 + 2 * record.words.len() as u32)
        .sum();
    let section_size = NW4R_DATA_HEADER_SIZE + payload;
    let total = u32::from(NW4R_HEADER_SIZE) + section_size;

    let magic = match options.field {
        Field::One => NW4R_MAGIC_FIELD_ONE,
        Field::Two => NW4R_MAGIC_FIELD_TWO,
    };
    writer.write_all(magic)?;
    writer.write_u16::<LittleEndian>(if swap { NW4R_BOM_SWAPPED } else { NW4R_BOM_NATIVE })?;
    writer.write_u8(NW4R_VERSION.0)?;
    writer.write_u8(NW4R_VERSION.1)?;
    writer.write_u32::<LittleEndian>(fix32(total))?;
    writer.write_u16::<LittleEndian>(fix16(NW4R_HEADER_SIZE))?;
    writer.write_u16::<LittleEndian>(fix16(1))?;
    writer.write_u32::<LittleEndian>(fix32(u32::from(NW4R_HEADER_SIZE)))?;
    writer.write_u32::<LittleEndian>(fix32(section_size))?;
    writer.write_all(&[0u8; 0x28])?;

    writer.write_all(NW4R_DATA_MAGIC)?;
    writer.write_u32::<LittleEndian>(fix32(section_size))?;
    writer.write_all(&[0u8; 8])?;

    for record in store {
        writer.write_u32::<LittleEndian>(fix32(pack_timecode(&record.timecode)))?;
        writer.write_u32::<LittleEndian>(fix32(record.words.len() as u32))?;
        // Payload words stay in their parity-stripped in-memory form;
        // parity is a transmission concern of the SCC and raw codecs.
        for &word in &record.words {
            writer.write_u16::<LittleEndian>(fix16(word))?;
        }
    }

    let written = total as usize;
    debug!(records = store.len(), bytes = written, "wrote NW4R container");
    Ok(written)
}
