//! Pixel coordinate to framebuffer location mapping
//!
//! Graphics panels store pixels column-major inside each block: one byte
//! holds eight vertically stacked pixels, least significant bit on top.
//! Blocks are numbered row-major, `row * zones + zone`, where a zone is a
//! 32 pixel wide vertical strip and a row is an 8 pixel tall band.
//!
//! These functions are total and never fail. Out-of-range coordinates
//! produce out-of-range indices and callers decide what to do with them.
//!
//! ## Example
//!
//! ```
//! use picolcd::{addressing::locate, PICOLCD_256X64};
//!
//! let addr = locate(&PICOLCD_256X64, 255, 63).unwrap();
//! assert_eq!(addr.block, 63);
//! assert_eq!(addr.byte, 31);
//! assert_eq!(addr.bit, 7);
//! assert!(locate(&PICOLCD_256X64, 256, 0).is_none());
//! ```

use crate::config::GraphicsProfile;

/// Physical location of one pixel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelAddress {
    /// Block index, `row * zones + zone`
    pub block: usize,
    /// Zone (vertical strip) index
    pub zone: usize,
    /// Row (horizontal band) index
    pub row: usize,
    /// Byte offset inside the block
    pub byte: usize,
    /// Bit inside the byte
    pub bit: u8,
}

impl PixelAddress {
    /// Mask selecting this pixel's bit
    pub fn mask(&self) -> u8 {
        1 << self.bit
    }
}

/// Zone containing column `x`
pub fn zone_of(profile: &GraphicsProfile, x: i32) -> i64 {
    i64::from(x).div_euclid(i64::from(profile.zone_width()))
}

/// Row band containing line `y`
pub fn row_of(profile: &GraphicsProfile, y: i32) -> i64 {
    i64::from(y).div_euclid(i64::from(profile.pixels_per_byte))
}

/// Block index holding pixel (x, y); may be out of range for off-panel input
pub fn block_index_of(profile: &GraphicsProfile, x: i32, y: i32) -> i64 {
    row_of(profile, y) * i64::from(profile.zones) + zone_of(profile, x)
}

/// Byte offset inside the block for column `x`
pub fn byte_offset_of(profile: &GraphicsProfile, x: i32) -> usize {
    i64::from(x).rem_euclid(profile.block_size as i64) as usize
}

/// Bit position inside the byte for line `y`
pub fn bit_offset_of(profile: &GraphicsProfile, y: i32) -> u8 {
    i64::from(y).rem_euclid(i64::from(profile.pixels_per_byte)) as u8
}

/// Whether (x, y) lies on the panel
pub fn contains(profile: &GraphicsProfile, x: i32, y: i32) -> bool {
    (0..i32::from(profile.width)).contains(&x) && (0..i32::from(profile.height)).contains(&y)
}

/// Full location of pixel (x, y), or `None` when it is off the panel
pub fn locate(profile: &GraphicsProfile, x: i32, y: i32) -> Option<PixelAddress> {
    if !contains(profile, x, y) {
        return None;
    }
    let zone = zone_of(profile, x) as usize;
    let row = row_of(profile, y) as usize;
    Some(PixelAddress {
        block: row * profile.zones as usize + zone,
        zone,
        row,
        byte: byte_offset_of(profile, x),
        bit: bit_offset_of(profile, y),
    })
}
