//! Device characteristics and session configuration
//!
//! Every supported panel is described by an immutable [`DeviceProfile`]
//! selected once at connection time with [`lookup`]. Session-wide knobs that
//! do not depend on the panel live in [`Config`], built with [`Builder`].

pub use crate::error::BuilderError;

/// USB vendor id shared by every picoLCD model
pub const PICOLCD_VENDOR_ID: u16 = 0x04d8;

/// Product id of the 20x4 character panel
pub const PICOLCD_20X4_PRODUCT_ID: u16 = 0xc001;

/// Product id of the 256x64 graphics panel
pub const PICOLCD_256X64_PRODUCT_ID: u16 = 0xc002;

/// Character-cell panel driven by text commands
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextProfile {
    /// Human readable model name
    pub name: &'static str,
    /// Characters per row
    pub columns: u16,
    /// Number of character rows
    pub rows: u16,
    /// Size of the on-device character memory in bytes
    pub block_size: usize,
}

/// Bitplane panel addressed through per-chip memory blocks
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GraphicsProfile {
    /// Human readable model name
    pub name: &'static str,
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Number of horizontal block rows
    pub block_rows: u16,
    /// Number of vertical zones per block row
    pub zones: u16,
    /// Bytes per block (one byte per pixel column of a zone)
    pub block_size: usize,
    /// Number of physical memory chips
    pub chip_count: u8,
    /// Vertical pixels packed into one byte
    pub pixels_per_byte: u16,
    /// Whether the panel shows set bits as light pixels
    pub inverted: bool,
}

impl GraphicsProfile {
    /// Width of one zone in pixels
    pub fn zone_width(&self) -> u16 {
        self.width / self.zones
    }

    /// Total number of framebuffer blocks
    pub fn block_count(&self) -> usize {
        self.block_rows as usize * self.zones as usize
    }

    /// Bytes of memory on one chip
    pub fn chip_size(&self) -> usize {
        self.block_count() * self.block_size / self.chip_count as usize
    }
}

/// The two shapes of panel the protocol knows about
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeviceProfile {
    /// Character panel
    Text(TextProfile),
    /// Graphics panel
    Graphics(GraphicsProfile),
}

/// Discriminant of [`DeviceProfile`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayKind {
    /// Character-cell addressing
    Text,
    /// Pixel addressing
    Graphics,
}

impl DeviceProfile {
    /// Model name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text(profile) => profile.name,
            Self::Graphics(profile) => profile.name,
        }
    }

    /// Which addressing scheme the panel uses
    pub fn kind(&self) -> DisplayKind {
        match self {
            Self::Text(_) => DisplayKind::Text,
            Self::Graphics(_) => DisplayKind::Graphics,
        }
    }

    /// Width in characters (text) or pixels (graphics)
    pub fn width(&self) -> u16 {
        match self {
            Self::Text(profile) => profile.columns,
            Self::Graphics(profile) => profile.width,
        }
    }

    /// Height in characters (text) or pixels (graphics)
    pub fn height(&self) -> u16 {
        match self {
            Self::Text(profile) => profile.rows,
            Self::Graphics(profile) => profile.height,
        }
    }

    /// The graphics geometry, if this is a graphics panel
    pub fn graphics(&self) -> Option<&GraphicsProfile> {
        match self {
            Self::Graphics(profile) => Some(profile),
            Self::Text(_) => None,
        }
    }
}

/// picoLCD 20x4 character panel
pub const PICOLCD_20X4: TextProfile = TextProfile {
    name: "picoLCD 20x4",
    columns: 20,
    rows: 4,
    block_size: 80,
};

/// picoLCD 256x64 graphics panel: four 64x64 chips, each split into two
/// 32-column zones of eight 32-byte blocks.
pub const PICOLCD_256X64: GraphicsProfile = GraphicsProfile {
    name: "picoLCD 256x64",
    width: 256,
    height: 64,
    block_rows: 8,
    zones: 8,
    block_size: 32,
    chip_count: 4,
    pixels_per_byte: 8,
    inverted: true,
};

/// Supported (product id, profile) pairs under [`PICOLCD_VENDOR_ID`]
pub const SUPPORTED_DEVICES: [(u16, DeviceProfile); 2] = [
    (PICOLCD_20X4_PRODUCT_ID, DeviceProfile::Text(PICOLCD_20X4)),
    (
        PICOLCD_256X64_PRODUCT_ID,
        DeviceProfile::Graphics(PICOLCD_256X64),
    ),
];

/// Find the profile for a USB identity, or `None` for unknown hardware
pub fn lookup(vendor_id: u16, product_id: u16) -> Option<DeviceProfile> {
    if vendor_id != PICOLCD_VENDOR_ID {
        return None;
    }
    SUPPORTED_DEVICES
        .iter()
        .find(|(id, _)| *id == product_id)
        .map(|(_, profile)| *profile)
}

/// Session configuration
///
/// Use [`Builder`] to create a Config. Values never change after the
/// session has been opened.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Backlight level applied after every connect
    pub backlight: u8,
    /// Contrast level applied after every connect, if any
    pub contrast: Option<u8>,
    /// Clear device and framebuffer on the first connect
    pub clear_on_connect: bool,
    /// Alpha threshold used for text when the font has no tuned default
    pub default_text_threshold: f32,
    /// Tab stop spacing for incremental text, in pixels
    pub tab_width: u16,
    /// Horizontal cell size for row/column text placement, in pixels
    pub glyph_cell_width: u16,
    /// Width of a space relative to the font size
    pub space_width_ratio: f32,
    /// Backlight change per flash step
    pub flash_step: u8,
    /// Pause between flash steps in milliseconds
    pub flash_step_delay_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Builder::default().values()
    }
}

/// Builder for constructing session configuration
///
/// # Example
///
/// ```
/// use picolcd::Builder;
///
/// let config = Builder::new().backlight(128).tab_width(16).build();
/// assert!(config.is_ok());
/// ```
#[must_use]
pub struct Builder {
    backlight: u8,
    contrast: Option<u8>,
    clear_on_connect: bool,
    default_text_threshold: f32,
    tab_width: u16,
    glyph_cell_width: u16,
    space_width_ratio: f32,
    flash_step: u8,
    flash_step_delay_ms: u32,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            backlight: 0xFF,
            contrast: None,
            clear_on_connect: true,
            default_text_threshold: 0.5,
            tab_width: 32,
            // 5x7 glyphs plus one column of spacing
            glyph_cell_width: 6,
            space_width_ratio: 0.4,
            flash_step: 10,
            flash_step_delay_ms: 10,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backlight level applied after connecting
    pub fn backlight(mut self, level: u8) -> Self {
        self.backlight = level;
        self
    }

    /// Set a contrast level applied after connecting
    pub fn contrast(mut self, level: u8) -> Self {
        self.contrast = Some(level);
        self
    }

    /// Whether to clear the panel on the first connect
    pub fn clear_on_connect(mut self, value: bool) -> Self {
        self.clear_on_connect = value;
        self
    }

    /// Set the fallback text alpha threshold (0.0-1.0)
    pub fn default_text_threshold(mut self, value: f32) -> Self {
        self.default_text_threshold = value;
        self
    }

    /// Set the tab stop spacing in pixels
    pub fn tab_width(mut self, value: u16) -> Self {
        self.tab_width = value;
        self
    }

    /// Set the cell width used by row/column text placement
    pub fn glyph_cell_width(mut self, value: u16) -> Self {
        self.glyph_cell_width = value;
        self
    }

    /// Set the width of a space as a fraction of the font size
    pub fn space_width_ratio(mut self, value: f32) -> Self {
        self.space_width_ratio = value;
        self
    }

    /// Set the backlight change per flash step
    pub fn flash_step(mut self, value: u8) -> Self {
        self.flash_step = value;
        self
    }

    /// Set the pause between flash steps
    pub fn flash_step_delay_ms(mut self, value: u32) -> Self {
        self.flash_step_delay_ms = value;
        self
    }

    fn values(self) -> Config {
        Config {
            backlight: self.backlight,
            contrast: self.contrast,
            clear_on_connect: self.clear_on_connect,
            default_text_threshold: self.default_text_threshold,
            tab_width: self.tab_width,
            glyph_cell_width: self.glyph_cell_width,
            space_width_ratio: self.space_width_ratio,
            flash_step: self.flash_step,
            flash_step_delay_ms: self.flash_step_delay_ms,
        }
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns a [`BuilderError`] when a value is outside its valid range.
    pub fn build(self) -> Result<Config, BuilderError> {
        if !(0.0..=1.0).contains(&self.default_text_threshold) {
            return Err(BuilderError::InvalidThreshold {
                value: self.default_text_threshold,
            });
        }
        if !(0.0..=1.0).contains(&self.space_width_ratio) {
            return Err(BuilderError::InvalidSpaceWidth {
                value: self.space_width_ratio,
            });
        }
        if self.tab_width == 0 {
            return Err(BuilderError::ZeroTabWidth);
        }
        if self.glyph_cell_width == 0 {
            return Err(BuilderError::ZeroGlyphCellWidth);
        }
        if self.flash_step == 0 {
            return Err(BuilderError::ZeroFlashStep);
        }
        Ok(self.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_products() {
        let text = lookup(PICOLCD_VENDOR_ID, PICOLCD_20X4_PRODUCT_ID).unwrap();
        assert_eq!(text.kind(), DisplayKind::Text);
        assert_eq!((text.width(), text.height()), (20, 4));

        let graphics = lookup(PICOLCD_VENDOR_ID, PICOLCD_256X64_PRODUCT_ID).unwrap();
        assert_eq!(graphics.kind(), DisplayKind::Graphics);
        assert_eq!((graphics.width(), graphics.height()), (256, 64));
    }

    #[test]
    fn test_lookup_unknown_product_has_no_profile() {
        assert!(lookup(PICOLCD_VENDOR_ID, 0xc003).is_none());
        assert!(lookup(0x1209, PICOLCD_256X64_PRODUCT_ID).is_none());
    }

    #[test]
    fn test_graphics_geometry() {
        assert_eq!(PICOLCD_256X64.zone_width(), 32);
        assert_eq!(PICOLCD_256X64.block_count(), 64);
        // 64x64 one-bit pixels per chip
        assert_eq!(PICOLCD_256X64.chip_size(), 64 * 64 / 8);
    }

    #[test]
    fn test_builder_defaults() {
        let config = Builder::new().build().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.backlight, 0xFF);
        assert_eq!(config.tab_width, 32);
        assert!(config.clear_on_connect);
    }

    #[test]
    fn test_builder_rejects_out_of_range_threshold() {
        let result = Builder::new().default_text_threshold(1.5).build();
        assert!(matches!(result, Err(BuilderError::InvalidThreshold { .. })));
    }

    #[test]
    fn test_builder_rejects_zero_tab_width() {
        let result = Builder::new().tab_width(0).build();
        assert!(matches!(result, Err(BuilderError::ZeroTabWidth)));
    }

    #[test]
    fn test_builder_rejects_zero_flash_step() {
        let result = Builder::new().flash_step(0).build();
        assert!(matches!(result, Err(BuilderError::ZeroFlashStep)));
    }
}
