//! Error types for the caption file codecs.

use cc608_timecode::Timecode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading or writing caption files.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum FormatError {
    /// The file did not start with the expected magic bytes.
    #[error("Invalid {format} magic: {found}")]
    BadMagic {
        /// The format whose magic was expected.
        format: String,
        /// What was found instead, rendered for diagnostics.
        found: String,
    },

    /// A container header ended before all of its fields.
    #[error("Truncated {format} header")]
    TruncatedHeader {
        /// The format whose header was truncated.
        format: String,
    },

    /// The container declared no DATA section.
    #[error("No DATA section found in container")]
    MissingDataSection,

    /// The container's byte-order mark was neither of the two valid values.
    #[error("Unsupported byte order mark {0:#06x}")]
    InvalidByteOrderMark(u16),

    /// A record's timecode precedes the current write position.
    #[error("Timecode {timecode} is out of order")]
    OutOfOrder {
        /// The offending timecode.
        timecode: Timecode,
    },

    /// No supported caption format was recognized.
    #[error("Unrecognized caption file format")]
    UnknownFormat,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl FormatError {
    /// Create a bad magic error from the bytes actually found.
    pub fn bad_magic(format: impl Into<String>, found: &[u8]) -> Self {
        let rendered: Vec<String> = found.iter().map(|b| format!("{b:02x}")).collect();
        Self::BadMagic {
            format: format.into(),
            found: rendered.join(" "),
        }
    }

    /// Create a truncated header error.
    pub fn truncated_header(format: impl Into<String>) -> Self {
        Self::TruncatedHeader {
            format: format.into(),
        }
    }

    /// Create an out-of-order timecode error.
    pub fn out_of_order(timecode: Timecode) -> Self {
        Self::OutOfOrder { timecode }
    }
}

impl From<std::io::Error> for FormatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, FormatError>;
