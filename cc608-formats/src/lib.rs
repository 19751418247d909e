//! EIA-608 caption file codecs.
//!
//! This crate converts "line 21" closed-caption data between three
//! on-disk representations and a common in-memory model:
//!
//! | Format | Module | Shape |
//! |--------|--------|-------|
//! | SCC    | [`scc`]  | `Scenarist_SCC V1.0` text, hex words per timecode |
//! | Raw    | [`raw`]  | `FF FF FF FF` magic, one big-endian word per frame |
//! | NW4R   | [`nw4r`] | `BCC1`/`BCC2` binary container with a `DATA` section |
//!
//! The in-memory model is a [`CaptionStore`] of timestamped
//! [`CaptionRecord`]s holding parity-stripped caption words; see
//! [`parity`] for the odd-parity encoder and [`demux`] for the state
//! machine that recovers records from a raw frame stream.
//!
//! # Examples
//!
//! Transcode a raw stream to SCC:
//!
//! ```no_run
//! use cc608_formats::{read_captions, write_scc, CodecOptions};
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! # fn main() -> cc608_formats::Result<()> {
//! let options = CodecOptions::default();
//! let mut input = BufReader::new(File::open("captions.bin")?);
//! let (format, store) = read_captions(&mut input, &options)?;
//! println!("read {} records from a {format} file", store.len());
//!
//! let mut output = File::create("captions.scc")?;
//! write_scc(&store, &mut output)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod bytes;
pub mod demux;
pub mod error;
pub mod nw4r;
pub mod options;
pub mod parity;
pub mod raw;
pub mod scc;
pub mod sniff;
pub mod store;

pub use demux::Demuxer;
pub use error::{FormatError, Result};
pub use nw4r::{nw4r_field, read_nw4r, write_nw4r};
pub use options::{CodecOptions, Field};
pub use parity::{fix_parity, strip_parity};
pub use raw::{read_raw, write_raw};
pub use scc::{read_scc, write_scc};
pub use sniff::{detect, read_captions, CaptionFormat};
pub use store::{CaptionRecord, CaptionStore};

use serde::Serialize;

/// Static library version metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    /// Major version.
    pub major: u16,
    /// Minor version.
    pub minor: u16,
    /// Patch revision.
    pub revision: u16,
    /// Build identifier string.
    pub build_id: &'static str,
}

/// Version of this library.
pub const LIBRARY_VERSION: VersionInfo = VersionInfo {
    major: 0,
    minor: 1,
    revision: 0,
    build_id: env!("CARGO_PKG_VERSION"),
};
