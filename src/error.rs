//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`]),
//! framebuffer allocation ([`FramebufferError`]), font resolution
//! ([`FontError`]) and display operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors during display operations
//! - [`ConnectError`](crate::interface::ConnectError) - Device discovery and claim failures
//!
//! ## Example
//!
//! ```
//! use picolcd::{Builder, BuilderError};
//!
//! let result = Builder::new().tab_width(0).build();
//! assert!(matches!(result, Err(BuilderError::ZeroTabWidth)));
//! ```

use std::path::PathBuf;

use crate::interface::{ConnectError, DisplayInterface};

/// Errors that can occur when interacting with the display
///
/// Generic over the interface type to preserve the specific transport error.
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// No supported device is attached
    NoDeviceFound,
    /// A device was found but could not be claimed
    PermissionDenied {
        /// Vendor id of the refused device
        vendor_id: u16,
        /// Product id of the refused device
        product_id: u16,
        /// Remediation text for the user
        message: String,
    },
    /// The USB subsystem could not be queried
    Enumeration(String),
    /// Transport error
    ///
    /// Wraps the underlying error from the [`DisplayInterface`] implementation
    /// when a write failed even after reconnecting.
    Transport(I::Error),
    /// The device went away and could not be reacquired
    Disconnected,
    /// Pixel or character cell outside the panel
    InvalidAddress {
        /// X coordinate
        x: i32,
        /// Y coordinate
        y: i32,
    },
    /// Block index outside the framebuffer
    InvalidBlock {
        /// Requested block
        block: usize,
        /// Number of blocks
        blocks: usize,
    },
    /// Font name not present in the catalog
    UnknownFont {
        /// Requested name
        name: String,
    },
    /// Font resolved to a file that does not exist
    FontFileMissing {
        /// Resolved path
        path: PathBuf,
    },
    /// The operation needs a different kind of panel
    UnsupportedProfile {
        /// Name of the refused operation
        operation: &'static str,
    },
    /// Backlight fraction outside 0.0-1.0
    InvalidBacklight {
        /// Requested fraction
        value: f32,
    },
    /// Framebuffer allocation failed its integrity check
    Framebuffer(FramebufferError),
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoDeviceFound => write!(f, "No picoLCD device found"),
            Self::PermissionDenied {
                vendor_id,
                product_id,
                message,
            } => write!(
                f,
                "Cannot claim device {vendor_id:04x}:{product_id:04x}: {message}"
            ),
            Self::Enumeration(message) => write!(f, "USB enumeration failed: {message}"),
            Self::Transport(err) => write!(f, "Transport error: {err:?}"),
            Self::Disconnected => write!(f, "Device disconnected"),
            Self::InvalidAddress { x, y } => write!(f, "Address ({x}, {y}) is off the panel"),
            Self::InvalidBlock { block, blocks } => {
                write!(f, "Block {block} out of range (0..{blocks})")
            }
            Self::UnknownFont { name } => write!(f, "Unknown font: {name}"),
            Self::FontFileMissing { path } => {
                write!(f, "Font file not found: {}", path.display())
            }
            Self::UnsupportedProfile { operation } => {
                write!(f, "{operation} is not supported by this panel")
            }
            Self::InvalidBacklight { value } => {
                write!(f, "Backlight fraction {value} outside 0.0-1.0")
            }
            Self::Framebuffer(err) => write!(f, "{err}"),
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

impl<I: DisplayInterface> From<ConnectError> for Error<I> {
    fn from(err: ConnectError) -> Self {
        match err {
            ConnectError::NoDeviceFound => Self::NoDeviceFound,
            ConnectError::PermissionDenied {
                vendor_id,
                product_id,
                detail,
            } => Self::PermissionDenied {
                vendor_id,
                product_id,
                message: detail,
            },
            ConnectError::Enumeration(message) => Self::Enumeration(message),
        }
    }
}

impl<I: DisplayInterface> From<FontError> for Error<I> {
    fn from(err: FontError) -> Self {
        match err {
            FontError::UnknownFont { name } => Self::UnknownFont { name },
            FontError::FontFileMissing { path } => Self::FontFileMissing { path },
        }
    }
}

impl<I: DisplayInterface> From<FramebufferError> for Error<I> {
    fn from(err: FramebufferError) -> Self {
        Self::Framebuffer(err)
    }
}

/// Errors raised while allocating block storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramebufferError {
    /// Two blocks share the same storage
    AliasedBlocks {
        /// First block index
        first: usize,
        /// Second block index
        second: usize,
    },
    /// Geometry with a zero dimension
    EmptyGeometry,
}

impl core::fmt::Display for FramebufferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AliasedBlocks { first, second } => {
                write!(f, "Framebuffer blocks {first} and {second} share storage")
            }
            Self::EmptyGeometry => write!(f, "Framebuffer geometry has a zero dimension"),
        }
    }
}

impl core::error::Error for FramebufferError {}

/// Errors raised while resolving a font
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontError {
    /// Name not present in the catalog
    UnknownFont {
        /// Requested name
        name: String,
    },
    /// Catalog entry points at a missing file
    FontFileMissing {
        /// Resolved path
        path: PathBuf,
    },
}

impl core::fmt::Display for FontError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownFont { name } => write!(f, "Unknown font: {name}"),
            Self::FontFileMissing { path } => {
                write!(f, "Font file not found: {}", path.display())
            }
        }
    }
}

impl core::error::Error for FontError {}

/// Errors that can occur when building configuration
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderError {
    /// Text threshold outside 0.0-1.0
    InvalidThreshold {
        /// Rejected value
        value: f32,
    },
    /// Space width ratio outside 0.0-1.0
    InvalidSpaceWidth {
        /// Rejected value
        value: f32,
    },
    /// Tab stops must be at least one pixel apart
    ZeroTabWidth,
    /// Character cells must be at least one pixel wide
    ZeroGlyphCellWidth,
    /// Flashing needs a non-zero step
    ZeroFlashStep,
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidThreshold { value } => {
                write!(f, "Text threshold {value} outside 0.0-1.0")
            }
            Self::InvalidSpaceWidth { value } => {
                write!(f, "Space width ratio {value} outside 0.0-1.0")
            }
            Self::ZeroTabWidth => write!(f, "Tab width must be non-zero"),
            Self::ZeroGlyphCellWidth => write!(f, "Glyph cell width must be non-zero"),
            Self::ZeroFlashStep => write!(f, "Flash step must be non-zero"),
        }
    }
}

impl core::error::Error for BuilderError {}
