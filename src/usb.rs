//! USB HID transport over hidapi

use core::fmt;
use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use hidapi::{HidApi, HidDevice, HidError};
use log::{debug, warn};

use crate::config::lookup;
use crate::interface::{ConnectError, Connected, Connector, DisplayInterface};

/// Finds and opens picoLCD panels through hidapi
///
/// The hidapi context is created on the first connect and reused, and the
/// device list is re-read on every connect so replugged panels are found.
#[derive(Default)]
pub struct UsbConnector {
    api: Option<HidApi>,
}

impl UsbConnector {
    /// Connector without an hidapi context yet
    pub fn new() -> Self {
        Self::default()
    }

    fn api(&mut self) -> Result<&HidApi, ConnectError> {
        let enumeration = |err: HidError| ConnectError::Enumeration(err.to_string());
        let api = match self.api.take() {
            Some(mut api) => {
                api.refresh_devices().map_err(enumeration)?;
                api
            }
            None => HidApi::new().map_err(enumeration)?,
        };
        Ok(self.api.insert(api))
    }
}

impl fmt::Debug for UsbConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsbConnector")
            .field("initialized", &self.api.is_some())
            .finish()
    }
}

impl Connector for UsbConnector {
    type Interface = UsbInterface;

    fn connect(&mut self) -> Result<Connected<UsbInterface>, ConnectError> {
        let api = self.api()?;
        let mut candidates = api.device_list().filter_map(|info| {
            lookup(info.vendor_id(), info.product_id()).map(|profile| (info, profile))
        });
        let Some((info, profile)) = candidates.next() else {
            return Err(ConnectError::NoDeviceFound);
        };
        let others = candidates.count();
        if others > 0 {
            warn!("{others} more picoLCD device(s) attached, using the first");
        }

        let (vendor_id, product_id) = (info.vendor_id(), info.product_id());
        debug!("Opening {:?}", info.path());
        let device = info
            .open_device(api)
            .map_err(|err| ConnectError::PermissionDenied {
                vendor_id,
                product_id,
                detail: err.to_string(),
            })?;
        Ok(Connected {
            interface: UsbInterface { device },
            vendor_id,
            product_id,
            profile,
        })
    }
}

/// An open picoLCD HID device
///
/// Writes are blocking; hidapi bounds them with the operating system's
/// USB timeout rather than [`crate::interface::DEFAULT_WRITE_TIMEOUT_MS`].
pub struct UsbInterface {
    device: HidDevice,
}

impl fmt::Debug for UsbInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsbInterface").finish_non_exhaustive()
    }
}

impl DisplayInterface for UsbInterface {
    type Error = HidError;

    fn write_report(&mut self, report: &[u8]) -> Result<usize, Self::Error> {
        self.device.write(report)
    }
}

/// [`DelayNs`] backed by [`thread::sleep`]
#[derive(Clone, Copy, Debug, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_std_delay_sleeps() {
        let start = Instant::now();
        StdDelay.delay_ms(5);
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_connector_starts_uninitialized() {
        let connector = UsbConnector::new();
        assert_eq!(format!("{connector:?}"), "UsbConnector { initialized: false }");
    }
}
