//! Byte-order swapping for container fields.
//!
//! Containers carry a byte-order mark; when it disagrees with the
//! order a field was read in, these routines reverse the field's
//! bytes. The 24- and 48-bit variants operate on the low bytes of the
//! next-larger integer type.

/// Reverse the bytes of a 16-bit value.
pub fn swap16(value: u16) -> u16 {
    value.swap_bytes()
}

/// Reverse the low 3 bytes of a 32-bit value.
pub fn swap24(value: u32) -> u32 {
    ((value & 0x0000_00ff) << 16) | (value & 0x0000_ff00) | ((value >> 16) & 0x0000_00ff)
}

/// Reverse the bytes of a 32-bit value.
pub fn swap32(value: u32) -> u32 {
    value.swap_bytes()
}

/// Reverse the low 6 bytes of a 64-bit value.
pub fn swap48(value: u64) -> u64 {
    ((value & 0x0000_0000_0000_00ff) << 40)
        | ((value & 0x0000_0000_0000_ff00) << 24)
        | ((value & 0x0000_0000_00ff_0000) << 8)
        | ((value >> 8) & 0x0000_0000_00ff_0000)
        | ((value >> 24) & 0x0000_0000_0000_ff00)
        | ((value >> 40) & 0x0000_0000_0000_00ff)
}

/// Reverse the bytes of a 64-bit value.
pub fn swap64(value: u64) -> u64 {
    value.swap_bytes()
}
