//! Caption file format auto-detection.
//!
//! The probes run in the order the reference tools use: the NW4R
//! container first (its magic is the most specific), then the raw
//! stream, then SCC text. Every probe restores the stream position, so
//! detection can be followed directly by a read.

use crate::error::{FormatError, Result};
use crate::nw4r::{is_nw4r_file, read_nw4r};
use crate::options::CodecOptions;
use crate::raw::{is_raw_file, read_raw};
use crate::scc::{is_scc_file, read_scc};
use crate::store::CaptionStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{BufRead, Seek};
use tracing::debug;

/// A recognized caption file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptionFormat {
    /// The NW4R binary container.
    Nw4r,
    /// The magic-prefixed raw line-21 stream.
    Raw,
    /// Scenarist SCC text.
    Scc,
}

impl fmt::Display for CaptionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaptionFormat::Nw4r => "NW4R",
            CaptionFormat::Raw => "raw",
            CaptionFormat::Scc => "SCC",
        };
        f.write_str(name)
    }
}

/// Identify the caption format a reader holds, if any.
pub fn detect<R: BufRead + Seek>(reader: &mut R) -> Option<CaptionFormat> {
    let format = if is_nw4r_file(reader) {
        CaptionFormat::Nw4r
    } else if is_raw_file(reader) {
        CaptionFormat::Raw
    } else if is_scc_file(reader) {
        CaptionFormat::Scc
    } else {
        return None;
    };
    debug!(%format, "detected caption format");
    Some(format)
}

/// Detect the format and read the whole file with the matching codec.
pub fn read_captions<R: BufRead + Seek>(
    reader: &mut R,
    options: &CodecOptions,
) -> Result<(CaptionFormat, CaptionStore)> {
    let format = detect(reader).ok_or(FormatError::UnknownFormat)?;
    let store = match format {
        CaptionFormat::Nw4r => read_nw4r(reader)?,
        CaptionFormat::Raw => read_raw(reader, options)?,
        CaptionFormat::Scc => read_scc(reader)?,
    };
    Ok((format, store))
}
