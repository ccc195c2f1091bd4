//! Connection lifecycle
//!
//! [`Connection`] owns the [`Connector`] and the currently open interface.
//! A failed write drops the handle, reconnects once and resends the same
//! report. Callers learn about the reconnect through [`Sent::reconnected`]
//! so they can resynchronise panel state.

use log::{debug, error, info, warn};

use crate::config::DeviceProfile;
use crate::error::Error;
use crate::interface::{ConnectError, Connector, DisplayInterface};

type ConnectionResult<T, C> = core::result::Result<T, Error<<C as Connector>::Interface>>;

/// Whether a device handle is currently held
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// No handle; the next send attempts a reconnect
    Disconnected,
    /// A device is open
    Connected,
}

/// Outcome of a successful send
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sent {
    /// Bytes accepted by the transport
    pub bytes: usize,
    /// Whether the device had to be reopened first
    pub reconnected: bool,
}

/// Identity of the open device
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceInfo {
    /// USB vendor id
    pub vendor_id: u16,
    /// USB product id
    pub product_id: u16,
    /// Selected geometry
    pub profile: DeviceProfile,
}

/// Device handle with automatic single-retry reconnect
pub struct Connection<C: Connector> {
    connector: C,
    interface: Option<C::Interface>,
    device: Option<DeviceInfo>,
    last_error: Option<String>,
    permission_hint_shown: bool,
}

impl<C: Connector> Connection<C> {
    /// Create a disconnected connection
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            interface: None,
            device: None,
            last_error: None,
            permission_hint_shown: false,
        }
    }

    /// Open the first supported device, replacing any current handle
    pub fn connect(&mut self) -> ConnectionResult<DeviceProfile, C> {
        self.interface = None;
        match self.connector.connect() {
            Ok(connected) => {
                info!(
                    "Connected to {} ({:04x}:{:04x})",
                    connected.profile.name(),
                    connected.vendor_id,
                    connected.product_id
                );
                self.permission_hint_shown = false;
                self.last_error = None;
                self.device = Some(DeviceInfo {
                    vendor_id: connected.vendor_id,
                    product_id: connected.product_id,
                    profile: connected.profile,
                });
                self.interface = Some(connected.interface);
                Ok(connected.profile)
            }
            Err(ConnectError::PermissionDenied {
                vendor_id,
                product_id,
                detail,
            }) => {
                let message = format!(
                    "{detail}\n{}",
                    permission_help(vendor_id, product_id, &current_user())
                );
                if !self.permission_hint_shown {
                    error!("{message}");
                    self.permission_hint_shown = true;
                } else {
                    debug!("Device {vendor_id:04x}:{product_id:04x} still refuses access");
                }
                self.last_error = Some(detail);
                Err(Error::PermissionDenied {
                    vendor_id,
                    product_id,
                    message,
                })
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Drop the device handle
    pub fn disconnect(&mut self) {
        if self.interface.take().is_some() {
            info!("Disconnected");
        }
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        if self.interface.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Whether a handle is held
    pub fn is_connected(&self) -> bool {
        self.interface.is_some()
    }

    /// Profile of the most recently opened device
    pub fn profile(&self) -> Option<&DeviceProfile> {
        self.device.as_ref().map(|device| &device.profile)
    }

    /// Identity of the most recently opened device
    pub fn device(&self) -> Option<&DeviceInfo> {
        self.device.as_ref()
    }

    /// Description of the most recent failure, cleared by a successful connect
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The underlying connector
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Write one report, reconnecting and retrying once on failure
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disconnected`] when the device cannot be reopened and
    /// [`Error::Transport`] when the resend after a reconnect fails too. In
    /// both cases the connection is left disconnected.
    pub fn send(&mut self, report: &[u8]) -> ConnectionResult<Sent, C> {
        let mut reconnected = false;
        if self.interface.is_none() {
            self.reacquire()?;
            reconnected = true;
        }
        match self.write(report) {
            Some(Ok(bytes)) => Ok(Sent { bytes, reconnected }),
            Some(Err(err)) => {
                self.note_write_failure(&err);
                if reconnected {
                    return Err(Error::Transport(err));
                }
                self.reacquire()?;
                match self.write(report) {
                    Some(Ok(bytes)) => Ok(Sent {
                        bytes,
                        reconnected: true,
                    }),
                    Some(Err(err)) => {
                        self.note_write_failure(&err);
                        Err(Error::Transport(err))
                    }
                    None => Err(Error::Disconnected),
                }
            }
            None => Err(Error::Disconnected),
        }
    }

    fn write(
        &mut self,
        report: &[u8],
    ) -> Option<Result<usize, <C::Interface as DisplayInterface>::Error>> {
        self.interface
            .as_mut()
            .map(|interface| interface.write_report(report))
    }

    fn note_write_failure(&mut self, err: &<C::Interface as DisplayInterface>::Error) {
        error!("Report write failed: {err:?}");
        self.last_error = Some(format!("{err:?}"));
        self.interface = None;
    }

    fn reacquire(&mut self) -> ConnectionResult<(), C> {
        match self.connect() {
            Ok(_) => Ok(()),
            Err(err) => {
                warn!("Reconnect failed: {err}");
                Err(Error::Disconnected)
            }
        }
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| String::from("$USER"))
}

/// Remediation text for a device that refused to be opened
pub fn permission_help(vendor_id: u16, product_id: u16, user: &str) -> String {
    if user == "root" {
        return format!(
            "Access to {vendor_id:04x}:{product_id:04x} was refused even as root. \
             Another process or a kernel driver may hold the device; unplug it and try again."
        );
    }
    format!(
        "User {user} may not open {vendor_id:04x}:{product_id:04x}. \
         Create /etc/udev/rules.d/99-picolcd.rules containing:\n\
         SUBSYSTEM==\"usb\", ATTRS{{idVendor}}==\"{vendor_id:04x}\", ATTRS{{idProduct}}==\"{product_id:04x}\", MODE=\"0660\", GROUP=\"plugdev\"\n\
         KERNEL==\"hidraw*\", ATTRS{{idVendor}}==\"{vendor_id:04x}\", ATTRS{{idProduct}}==\"{product_id:04x}\", MODE=\"0660\", GROUP=\"plugdev\"\n\
         then run: sudo usermod -aG plugdev {user} && sudo udevadm control --reload-rules && sudo udevadm trigger\n\
         and log in again before replugging the device."
    )
}
