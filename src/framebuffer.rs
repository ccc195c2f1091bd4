//! Host-side mirror of graphics panel memory
//!
//! The framebuffer is a grid of `rows x zones` independent byte blocks.
//! Bit operations report whether they changed anything so callers can skip
//! redundant transfers.

use crate::config::GraphicsProfile;
use crate::error::FramebufferError;

/// Block storage for a graphics panel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    blocks: Vec<Vec<u8>>,
    rows: usize,
    zones: usize,
    block_size: usize,
}

impl Framebuffer {
    /// Allocate a zeroed framebuffer
    ///
    /// # Errors
    ///
    /// Returns [`FramebufferError`] if any dimension is zero or if two blocks
    /// end up sharing storage.
    pub fn new(rows: usize, zones: usize, block_size: usize) -> Result<Self, FramebufferError> {
        if rows == 0 || zones == 0 || block_size == 0 {
            return Err(FramebufferError::EmptyGeometry);
        }
        let mut framebuffer = Self {
            blocks: Vec::new(),
            rows,
            zones,
            block_size,
        };
        framebuffer.reset_all()?;
        Ok(framebuffer)
    }

    /// Allocate a framebuffer matching a panel
    pub fn for_profile(profile: &GraphicsProfile) -> Result<Self, FramebufferError> {
        Self::new(
            profile.block_rows as usize,
            profile.zones as usize,
            profile.block_size,
        )
    }

    /// Replace every block with fresh zeroed storage and verify independence
    pub fn reset_all(&mut self) -> Result<(), FramebufferError> {
        self.blocks = (0..self.rows * self.zones)
            .map(|_| vec![0; self.block_size])
            .collect();
        self.verify_independent()
    }

    fn verify_independent(&self) -> Result<(), FramebufferError> {
        let mut starts: Vec<(usize, usize)> = self
            .blocks
            .iter()
            .enumerate()
            .map(|(index, block)| (block.as_ptr() as usize, index))
            .collect();
        starts.sort_unstable();
        for pair in starts.windows(2) {
            if let [(a, first), (b, second)] = pair {
                if a == b {
                    return Err(FramebufferError::AliasedBlocks {
                        first: *first.min(second),
                        second: *first.max(second),
                    });
                }
            }
        }
        Ok(())
    }

    /// Number of block rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of zones per row
    pub fn zones(&self) -> usize {
        self.zones
    }

    /// Bytes per block
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Total number of blocks
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Block index for a (row, zone) pair
    pub fn index(&self, row: usize, zone: usize) -> Option<usize> {
        (row < self.rows && zone < self.zones).then_some(row * self.zones + zone)
    }

    /// Contents of one block
    pub fn block(&self, index: usize) -> Option<&[u8]> {
        self.blocks.get(index).map(Vec::as_slice)
    }

    /// Read one byte
    pub fn get_byte(&self, block: usize, offset: usize) -> Option<u8> {
        self.blocks.get(block)?.get(offset).copied()
    }

    /// Write one byte, returning whether it changed
    pub fn set_byte(&mut self, block: usize, offset: usize, value: u8) -> Option<bool> {
        let slot = self.blocks.get_mut(block)?.get_mut(offset)?;
        let changed = *slot != value;
        *slot = value;
        Some(changed)
    }

    /// Read one bit
    pub fn get_bit(&self, block: usize, offset: usize, bit: u8) -> Option<bool> {
        self.get_byte(block, offset)
            .map(|byte| byte & (1 << bit) != 0)
    }

    /// Set one bit, returning whether it changed
    pub fn set_bit(&mut self, block: usize, offset: usize, bit: u8) -> Option<bool> {
        let byte = self.get_byte(block, offset)?;
        self.set_byte(block, offset, byte | (1 << bit))
    }

    /// Clear one bit, returning whether it changed
    pub fn clear_bit(&mut self, block: usize, offset: usize, bit: u8) -> Option<bool> {
        let byte = self.get_byte(block, offset)?;
        self.set_byte(block, offset, byte & !(1 << bit))
    }

    /// Move every block of row `src` into row `dst` and zero `src`
    ///
    /// Returns false and leaves the framebuffer untouched when either row is
    /// out of range.
    pub fn transfer_row(&mut self, dst: usize, src: usize) -> bool {
        if dst >= self.rows || src >= self.rows {
            return false;
        }
        if dst == src {
            return true;
        }
        for zone in 0..self.zones {
            let moved = core::mem::replace(
                &mut self.blocks[src * self.zones + zone],
                vec![0; self.block_size],
            );
            self.blocks[dst * self.zones + zone] = moved;
        }
        true
    }

    /// Zero every block of `row`
    pub fn reset_row(&mut self, row: usize) -> bool {
        if row >= self.rows {
            return false;
        }
        for zone in 0..self.zones {
            self.blocks[row * self.zones + zone].fill(0);
        }
        true
    }
}
