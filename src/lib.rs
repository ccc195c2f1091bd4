//! picoLCD USB Display Driver
//!
//! A driver for picoLCD USB HID panels that talks the raw report protocol
//! directly, with no kernel driver.
//!
//! ## Features
//!
//! - 256x64 graphics panels and 20x4 character panels
//! - Host framebuffer with per-block dirty tracking, so a refresh only sends
//!   the bytes that changed
//! - Automatic reconnect and replay when the device drops off the bus
//! - Rectangles, dithered or thresholded images, positioned text and a
//!   scrolling terminal-style text mode
//! - `embedded-graphics` integration (with `graphics` feature)
//! - hidapi transport (with `usb` feature) and PNG loading (with `png`
//!   feature)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use picolcd::{Builder, MonoFontRasterizer, PicoLcd, PushTextOptions, Rect, UsbConnector};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Builder::new().backlight(0x80).build()?;
//! let mut lcd = PicoLcd::open(UsbConnector::new(), config)?;
//!
//! lcd.draw_rect(Rect::new((0, 0), (256, 64)), true, false)?;
//!
//! let mut fonts = MonoFontRasterizer::default();
//! lcd.push_text(&mut fonts, "hello\\nworld", PushTextOptions::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! Other transports plug in by implementing [`Connector`] and
//! [`DisplayInterface`].

/// Pixel to framebuffer address mapping
pub mod addressing;
/// picoLCD report ids and controller instructions
pub mod command;
/// Device profiles, session configuration and builder
pub mod config;
/// Connection lifecycle and reconnect
pub mod connection;
/// Per-block dirty tracking
pub mod dirty;
/// Core display operations
pub mod display;
/// Rectangle and image drawing
pub mod draw;
/// Error types for the driver
pub mod error;
/// Output report builders
pub mod frame;
/// Host mirror of graphics memory
pub mod framebuffer;
/// Glyph rasterization seam and font catalog
pub mod glyph;
/// Transport abstraction
pub mod interface;
/// Still-image sources
pub mod raster;
/// Text rendering
pub mod text;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

/// hidapi transport (requires `usb` feature)
#[cfg(feature = "usb")]
pub mod usb;

#[cfg(test)]
mod mock;

pub use config::{
    Builder, Config, DeviceProfile, DisplayKind, GraphicsProfile, PICOLCD_20X4,
    PICOLCD_20X4_PRODUCT_ID, PICOLCD_256X64, PICOLCD_256X64_PRODUCT_ID, PICOLCD_VENDOR_ID,
    SUPPORTED_DEVICES, TextProfile, lookup,
};
pub use connection::{Connection, ConnectionState, Sent};
pub use dirty::{DirtyMark, DirtyState};
pub use display::{LcdResult, PicoLcd};
pub use draw::{ImageOptions, Rect};
pub use error::{BuilderError, Error, FontError, FramebufferError};
pub use framebuffer::Framebuffer;
pub use glyph::{AlphaMask, FontCatalog, FontFace, FontSpec, GlyphRasterizer};
pub use interface::{ConnectError, Connected, Connector, DEFAULT_WRITE_TIMEOUT_MS, DisplayInterface};
pub use raster::{RasterSource, RgbImage};
pub use text::{GlyphCache, PushTextOptions, TextOptions};

#[cfg(feature = "png")]
pub use raster::{decode_png, load_png};

#[cfg(feature = "graphics")]
pub use graphics::MonoFontRasterizer;

#[cfg(feature = "usb")]
pub use usb::{StdDelay, UsbConnector, UsbInterface};
