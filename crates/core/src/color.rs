//! Packed RGB helpers.
//!
//! Colors are stored on disk as a single 4-byte value laid out as
//! `0x00RRGGBB`, the same packing PCL uses for its `rgb` field. PCL
//! historically declares that field as a float and reinterprets the bits,
//! so readers should go through [`f32::to_bits`] before unpacking.

/// Packs three 8-bit channels into `0x00RRGGBB`.
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Splits a packed `0x00RRGGBB` value into its channels. The top byte is ignored.
pub fn unpack_rgb(packed: u32) -> [u8; 3] {
    [(packed >> 16) as u8, (packed >> 8) as u8, packed as u8]
}
