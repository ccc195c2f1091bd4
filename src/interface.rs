//! Transport abstraction
//!
//! The driver talks to hardware through two small traits:
//!
//! - [`DisplayInterface`] writes one output report to an open device.
//! - [`Connector`] finds a supported device and opens it.
//!
//! The `usb` feature provides hidapi-backed implementations of both in
//! [`crate::usb`]. Tests and alternative transports implement them
//! directly.

use core::fmt::Debug;

use crate::config::DeviceProfile;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Write timeout the transports are expected to honor, in milliseconds
pub const DEFAULT_WRITE_TIMEOUT_MS: u32 = 1_000;

/// Trait for an open connection to a panel
///
/// ## Implementing
///
/// A write must deliver the whole report as one HID output report, or fail.
/// Failures are treated as a lost device by [`crate::Connection`].
pub trait DisplayInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Write one output report, returning the number of bytes accepted
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejected the write or went away.
    fn write_report(&mut self, report: &[u8]) -> InterfaceResult<usize, Self::Error>;
}

/// A freshly opened device
#[derive(Debug)]
pub struct Connected<I> {
    /// Open transport
    pub interface: I,
    /// USB vendor id of the device
    pub vendor_id: u16,
    /// USB product id of the device
    pub product_id: u16,
    /// Geometry selected for the product id
    pub profile: DeviceProfile,
}

/// Trait for discovering and opening a panel
pub trait Connector {
    /// Transport produced by a successful connect
    type Interface: DisplayInterface;

    /// Find the first supported device and open it
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::NoDeviceFound`] when nothing supported is
    /// attached and [`ConnectError::PermissionDenied`] when a device exists
    /// but cannot be claimed.
    fn connect(&mut self) -> InterfaceResult<Connected<Self::Interface>, ConnectError>;
}

/// Errors that can occur while connecting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// No device with a known profile is attached
    NoDeviceFound,
    /// A device was found but refused to be opened
    PermissionDenied {
        /// Vendor id of the device
        vendor_id: u16,
        /// Product id of the device
        product_id: u16,
        /// Transport-specific reason
        detail: String,
    },
    /// The device list could not be read
    Enumeration(String),
}

impl core::fmt::Display for ConnectError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoDeviceFound => write!(f, "No picoLCD device found"),
            Self::PermissionDenied {
                vendor_id,
                product_id,
                detail,
            } => write!(
                f,
                "Cannot open device {vendor_id:04x}:{product_id:04x}: {detail}"
            ),
            Self::Enumeration(message) => write!(f, "USB enumeration failed: {message}"),
        }
    }
}

impl core::error::Error for ConnectError {}
