//! Odd parity for EIA-608 caption bytes.
//!
//! Each caption byte carries 7 data bits; bit 7 is set so that the
//! total number of set bits is odd. Decoders strip the parity bit,
//! encoders restore it.

/// Whether a 7-bit value needs bit 7 set to reach odd parity.
/// Indexed by the low 7 bits of a caption byte.
const NEEDS_PARITY_BIT: [u8; 128] = [
    1, 0, 0, 1, 0, 1, 1, 0, 0, 1, 1, 0, 1, 0, 0, 1, //
    0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0, //
    0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0, //
    1, 0, 0, 1, 0, 1, 1, 0, 0, 1, 1, 0, 1, 0, 0, 1, //
    0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0, //
    1, 0, 0, 1, 0, 1, 1, 0, 0, 1, 1, 0, 1, 0, 0, 1, //
    1, 0, 0, 1, 0, 1, 1, 0, 0, 1, 1, 0, 1, 0, 0, 1, //
    0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0, //
];

/// Recompute odd parity for both bytes of a caption word.
///
/// Existing parity bits are discarded first, so the operation is
/// idempotent and never changes the 7 data bits of either byte.
pub fn fix_parity(word: u16) -> u16 {
    let mut fixed = word & 0x7f7f;
    if NEEDS_PARITY_BIT[(fixed & 0x7f) as usize] != 0 {
        fixed |= 0x0080;
    }
    if NEEDS_PARITY_BIT[((fixed >> 8) & 0x7f) as usize] != 0 {
        fixed |= 0x8000;
    }
    fixed
}

/// Remove the parity bit from both bytes of a caption word.
pub fn strip_parity(word: u16) -> u16 {
    word & 0x7f7f
}
