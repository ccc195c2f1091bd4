//! Core display operations
//!
//! [`PicoLcd`] is one session with one panel. It owns the connection, the
//! framebuffer mirror of graphics memory and the dirty marks, and turns
//! pixel edits into the smallest set of block writes.

use embedded_hal::delay::DelayNs;
use log::{debug, info, trace, warn};

use crate::addressing::{self, PixelAddress};
use crate::command::TEXT_CLEAR_DISPLAY;
use crate::config::{Config, DeviceProfile, GraphicsProfile};
use crate::connection::{Connection, ConnectionState};
use crate::dirty::{DirtyMark, DirtyState};
use crate::error::Error;
use crate::frame;
use crate::framebuffer::Framebuffer;
use crate::interface::Connector;
use crate::text::GlyphCache;

/// Result type of every session operation
pub type LcdResult<T, C> = core::result::Result<T, Error<<C as Connector>::Interface>>;

/// Framebuffer and dirty marks, always created together
#[derive(Clone, Debug)]
pub(crate) struct Canvas {
    pub(crate) framebuffer: Framebuffer,
    pub(crate) dirty: DirtyState,
}

impl Canvas {
    fn new(profile: &GraphicsProfile) -> Result<Self, crate::error::FramebufferError> {
        Ok(Self {
            framebuffer: Framebuffer::for_profile(profile)?,
            dirty: DirtyState::new(profile.block_rows as usize, profile.zones as usize),
        })
    }
}

/// Session with one picoLCD panel
///
/// Graphics drawing only touches the host framebuffer until a refresh sends
/// the dirty blocks. Every operation that talks to the device reconnects
/// once on failure and replays the framebuffer afterwards.
pub struct PicoLcd<C>
where
    C: Connector,
{
    /// Device handle
    connection: Connection<C>,
    /// Session configuration
    pub(crate) config: Config,
    /// Geometry of the connected panel
    profile: Option<DeviceProfile>,
    /// Present for graphics panels only
    pub(crate) canvas: Option<Canvas>,
    /// Last backlight level sent
    backlight: u8,
    /// Last contrast level sent
    contrast: Option<u8>,
    /// Incremental text position in pixels
    pub(crate) cursor: (i32, i32),
    /// Rasterized glyph stripes
    pub(crate) glyphs: GlyphCache,
    /// Set when a send had to reconnect
    reconnected: bool,
}

impl<C> PicoLcd<C>
where
    C: Connector,
{
    /// Create a session without connecting
    ///
    /// The first operation that needs the device connects on demand.
    pub fn new(connector: C, config: Config) -> Self {
        Self {
            connection: Connection::new(connector),
            backlight: config.backlight,
            contrast: config.contrast,
            config,
            profile: None,
            canvas: None,
            cursor: (0, 0),
            glyphs: GlyphCache::default(),
            reconnected: false,
        }
    }

    /// Create a session and connect to the first supported device
    pub fn open(connector: C, config: Config) -> LcdResult<Self, C> {
        let mut lcd = Self::new(connector, config);
        lcd.connect()?;
        Ok(lcd)
    }

    /// Connect, rebuild the framebuffer and apply the configured settings
    ///
    /// Clears the panel when [`Config::clear_on_connect`] is set.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoDeviceFound` or `Error::PermissionDenied` if no
    /// supported device can be opened, or `Error::Transport` if the
    /// settings cannot be written.
    pub fn connect(&mut self) -> LcdResult<(), C> {
        let profile = self.connection.connect()?;
        self.adopt(profile, true)?;
        self.apply_settings()?;
        if self.config.clear_on_connect {
            self.clear()?;
        }
        Ok(())
    }

    /// Drop the device handle; the next device operation reconnects
    pub fn disconnect(&mut self) {
        self.connection.disconnect();
    }

    fn adopt(&mut self, profile: DeviceProfile, reset: bool) -> LcdResult<(), C> {
        let keep = !reset && self.profile == Some(profile) && self.canvas.is_some();
        if keep {
            if let Some(canvas) = self.canvas.as_mut() {
                canvas.dirty.mark_all();
            }
            debug!("Kept framebuffer for {}", profile.name());
        } else {
            self.canvas = match profile.graphics() {
                Some(geometry) => {
                    let mut canvas = Canvas::new(geometry)?;
                    if !reset {
                        canvas.dirty.mark_all();
                    }
                    Some(canvas)
                }
                None => None,
            };
            self.cursor = (0, 0);
            info!(
                "Using {} ({}x{})",
                profile.name(),
                profile.width(),
                profile.height()
            );
        }
        self.profile = Some(profile);
        Ok(())
    }

    fn apply_settings(&mut self) -> LcdResult<(), C> {
        self.connection.send(&frame::backlight(self.backlight))?;
        if let Some(level) = self.contrast {
            self.connection.send(&frame::contrast(level))?;
        }
        Ok(())
    }

    fn reacquire(&mut self) -> LcdResult<(), C> {
        match self.connection.connect() {
            Ok(profile) => {
                self.adopt(profile, false)?;
                self.apply_settings()
            }
            Err(err) => {
                warn!("Reconnect failed: {err}");
                Err(Error::Disconnected)
            }
        }
    }

    /// Send one report, resynchronising after a reconnect
    pub(crate) fn transmit(&mut self, report: &[u8]) -> LcdResult<usize, C> {
        let sent = self.connection.send(report)?;
        if sent.reconnected {
            self.reconnected = true;
            let profile = self.connection.profile().copied().ok_or(Error::Disconnected)?;
            self.adopt(profile, false)?;
            self.apply_settings()?;
        }
        Ok(sent.bytes)
    }

    pub(crate) fn active_profile(&mut self) -> LcdResult<DeviceProfile, C> {
        if self.profile.is_none() {
            self.reacquire()?;
        }
        self.profile.ok_or(Error::Disconnected)
    }

    pub(crate) fn require_graphics(&mut self, operation: &'static str) -> LcdResult<GraphicsProfile, C> {
        match self.active_profile()? {
            DeviceProfile::Graphics(profile) if self.canvas.is_some() => Ok(profile),
            DeviceProfile::Graphics(_) => Err(Error::Disconnected),
            DeviceProfile::Text(_) => Err(Error::UnsupportedProfile { operation }),
        }
    }

    pub(crate) fn canvas_mut(&mut self) -> LcdResult<&mut Canvas, C> {
        self.canvas.as_mut().ok_or(Error::Disconnected)
    }

    /// Blank the panel and the framebuffer
    ///
    /// The incremental text position returns to the top left corner.
    pub fn clear(&mut self) -> LcdResult<(), C> {
        self.cursor = (0, 0);
        match self.active_profile()? {
            DeviceProfile::Text(_) => {
                self.transmit(&frame::text_instruction(TEXT_CLEAR_DISPLAY))?;
            }
            DeviceProfile::Graphics(_) => {
                let canvas = self.canvas_mut()?;
                canvas.framebuffer.reset_all()?;
                canvas.dirty.mark_all();
                self.refresh()?;
            }
        }
        debug!("Cleared");
        Ok(())
    }

    /// Send one block, or one block plus its even partner for odd zones
    ///
    /// At least `extent` bytes are sent, more if the block already has
    /// wider pending changes. The block is marked clean afterwards.
    ///
    /// # Arguments
    ///
    /// * `row` - Block row, one per 8 pixel lines
    /// * `zone` - Zone within the row
    /// * `extent` - Minimum span to send; [`DirtyMark::Clean`] sends only
    ///   what is already pending
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBlock` if (row, zone) is off the panel,
    /// `Error::UnsupportedProfile` on a character panel and
    /// `Error::Disconnected` if the device could not be reopened.
    ///
    /// If the device is reopened between the two reports of an odd zone,
    /// the pair is sent again from the start. Should that pair be cut off
    /// too, the blocks stay dirty for the next refresh.
    pub fn refresh_block(&mut self, row: usize, zone: usize, extent: DirtyMark) -> LcdResult<(), C> {
        self.require_graphics("refresh_block")?;
        let canvas = self.canvas_mut()?;
        let framebuffer = &canvas.framebuffer;
        let (Some(index), Some(even)) = (framebuffer.index(row, zone), framebuffer.index(row, zone & !1)) else {
            return Err(Error::InvalidBlock {
                block: row * framebuffer.zones() + zone,
                blocks: framebuffer.block_count(),
            });
        };
        let mark = canvas.dirty.mark(index).merge(extent);
        let reports = frame::block_reports(
            zone,
            row,
            framebuffer.block(index).unwrap_or_default(),
            framebuffer.block(even).unwrap_or_default(),
            mark,
        );
        if reports.is_empty() {
            return Ok(());
        }
        trace!("Refreshing row {row} zone {zone} ({mark:?})");
        let mut interrupted = self.send_reports(&reports)?;
        if interrupted && reports.len() > 1 {
            debug!("Restarting row {row} zone {zone} on the reopened device");
            interrupted = self.send_reports(&reports)?;
        }
        if interrupted && reports.len() > 1 {
            return Ok(());
        }
        let canvas = self.canvas_mut()?;
        canvas.dirty.mark_clean(index);
        if zone % 2 == 1 {
            canvas.dirty.mark_clean(even);
        }
        Ok(())
    }

    /// Send reports in order, returning whether the device was reopened
    /// along the way
    fn send_reports(&mut self, reports: &[Vec<u8>]) -> LcdResult<bool, C> {
        let earlier = core::mem::take(&mut self.reconnected);
        let mut result = Ok(());
        for report in reports {
            if let Err(err) = self.transmit(report) {
                result = Err(err);
                break;
            }
        }
        let reopened = self.reconnected;
        self.reconnected |= earlier;
        result.map(|()| reopened)
    }

    /// Send every dirty block
    ///
    /// If the device had to be reopened during the pass, the whole
    /// framebuffer is marked dirty again and a second pass replays it.
    /// Does nothing on a character panel.
    ///
    /// # Errors
    ///
    /// Returns `Error::Disconnected` if the device is gone and cannot be
    /// reopened. Blocks not yet sent stay dirty.
    pub fn refresh(&mut self) -> LcdResult<(), C> {
        if let DeviceProfile::Text(_) = self.active_profile()? {
            return Ok(());
        }
        self.reconnected = false;
        self.refresh_pass()?;
        if core::mem::take(&mut self.reconnected) {
            debug!("Replaying framebuffer after reconnect");
            self.refresh_pass()?;
        }
        Ok(())
    }

    fn refresh_pass(&mut self) -> LcdResult<(), C> {
        let mut index = 0;
        loop {
            let Some(canvas) = self.canvas.as_ref() else {
                break;
            };
            if index >= canvas.dirty.len() {
                break;
            }
            let zones = canvas.framebuffer.zones();
            let (row, zone) = (index / zones, index % zones);
            let mark = canvas.dirty.mark(index);
            index += 1;
            if !mark.is_dirty() {
                continue;
            }
            // The odd partner's refresh resends this block
            if zone % 2 == 0 && zone + 1 < zones && canvas.dirty.is_dirty(index) {
                continue;
            }
            self.refresh_block(row, zone, mark)?;
        }
        Ok(())
    }

    fn locate(&mut self, x: i32, y: i32, operation: &'static str) -> LcdResult<PixelAddress, C> {
        let profile = self.require_graphics(operation)?;
        addressing::locate(&profile, x, y).ok_or_else(|| {
            warn!("{operation}: ({x}, {y}) is off the panel");
            Error::InvalidAddress { x, y }
        })
    }

    fn commit(&mut self, addr: PixelAddress, changed: bool, refresh_now: bool, force: bool) -> LcdResult<bool, C> {
        if !changed && !force {
            return Ok(false);
        }
        let stop = DirtyMark::Prefix(addr.byte + 1);
        self.canvas_mut()?.dirty.mark_dirty(addr.block, stop);
        if refresh_now {
            self.refresh_block(addr.row, addr.zone, stop)?;
        }
        Ok(changed)
    }

    /// Turn one pixel on or off, returning whether it changed
    ///
    /// Unchanged pixels are not marked dirty unless `force` is set. With
    /// `refresh_now` the containing block is sent immediately.
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - Pixel position, origin top left
    /// * `on` - New pixel state
    /// * `refresh_now` - Send the containing block before returning
    /// * `force` - Mark the block dirty even if the pixel already had this state
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidAddress` if the pixel is off the panel and
    /// `Error::UnsupportedProfile` on a character panel.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use picolcd::{Builder, PicoLcd, UsbConnector};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut lcd = PicoLcd::open(UsbConnector::new(), Builder::new().build()?)?;
    /// lcd.set_pixel(10, 20, true, false, false)?;
    /// lcd.refresh()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool, refresh_now: bool, force: bool) -> LcdResult<bool, C> {
        let addr = self.locate(x, y, "set_pixel")?;
        let framebuffer = &mut self.canvas_mut()?.framebuffer;
        let changed = if on {
            framebuffer.set_bit(addr.block, addr.byte, addr.bit)
        } else {
            framebuffer.clear_bit(addr.block, addr.byte, addr.bit)
        }
        .unwrap_or(false);
        self.commit(addr, changed, refresh_now, force)
    }

    /// Read one pixel from the framebuffer
    pub fn get_pixel(&mut self, x: i32, y: i32) -> LcdResult<bool, C> {
        let addr = self.locate(x, y, "get_pixel")?;
        Ok(self
            .canvas_mut()?
            .framebuffer
            .get_bit(addr.block, addr.byte, addr.bit)
            .unwrap_or(false))
    }

    /// Write the eight vertically stacked pixels containing (x, y)
    ///
    /// Bit 0 of `value` is the top pixel of the byte, which starts at the
    /// multiple of 8 at or above `y`. Returns whether the byte changed.
    ///
    /// # Errors
    ///
    /// Same as [`PicoLcd::set_pixel`].
    pub fn set_byte(&mut self, x: i32, y: i32, value: u8, refresh_now: bool, force: bool) -> LcdResult<bool, C> {
        let addr = self.locate(x, y, "set_byte")?;
        let changed = self
            .canvas_mut()?
            .framebuffer
            .set_byte(addr.block, addr.byte, value)
            .unwrap_or(false);
        self.commit(addr, changed, refresh_now, force)
    }

    /// Mark a region dirty without sending anything
    ///
    /// `None` selects every zone or row. The last (row, zone) pair visited
    /// is marked through `stop` bytes, every other pair in full. An even
    /// zone whose odd partner is listed is skipped.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedProfile` on a character panel.
    pub fn invalidate(&mut self, zones: Option<&[usize]>, rows: Option<&[usize]>, stop: Option<usize>) -> LcdResult<(), C> {
        self.require_graphics("invalidate")?;
        self.canvas_mut()?
            .dirty
            .mark_region(rows, zones, DirtyMark::through(stop));
        Ok(())
    }

    /// Set the backlight level
    pub fn set_backlight(&mut self, level: u8) -> LcdResult<(), C> {
        self.transmit(&frame::backlight(level))?;
        self.backlight = level;
        Ok(())
    }

    /// Set the backlight as a fraction of full brightness
    pub fn set_backlight_fraction(&mut self, fraction: f32) -> LcdResult<(), C> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(Error::InvalidBacklight { value: fraction });
        }
        self.set_backlight((fraction * 255.0).round() as u8)
    }

    /// Last backlight level sent
    pub fn backlight(&self) -> u8 {
        self.backlight
    }

    /// Fade the backlight out, up to full and back to its previous level
    ///
    /// # Arguments
    ///
    /// * `delay` - Waits [`Config::flash_step_delay_ms`] between levels
    pub fn flash<D: DelayNs>(&mut self, delay: &mut D) -> LcdResult<(), C> {
        let previous = self.backlight;
        let step = usize::from(self.config.flash_step.max(1));
        let fade_out = (1..=u16::from(previous)).rev().step_by(step);
        let fade_in = (0..0xFF_u16).step_by(step);
        let settle = (u16::from(previous) + 1..=0xFF).rev().step_by(step);
        for level in fade_out.chain(fade_in).chain(settle) {
            self.set_backlight(level as u8)?;
            delay.delay_ms(self.config.flash_step_delay_ms);
        }
        self.set_backlight(previous)
    }

    /// Set the front panel LEDs, one bit per LED
    pub fn set_leds(&mut self, state: u8) -> LcdResult<(), C> {
        self.transmit(&frame::leds(state))?;
        Ok(())
    }

    /// Set the contrast level
    pub fn set_contrast(&mut self, level: u8) -> LcdResult<(), C> {
        self.transmit(&frame::contrast(level))?;
        self.contrast = Some(level);
        Ok(())
    }

    /// Geometry of the connected panel
    pub fn profile(&self) -> Option<&DeviceProfile> {
        self.profile.as_ref()
    }

    /// Width in pixels (graphics) or characters (text)
    pub fn width(&self) -> Option<u16> {
        self.profile.map(|profile| profile.width())
    }

    /// Height in pixels (graphics) or characters (text)
    pub fn height(&self) -> Option<u16> {
        self.profile.map(|profile| profile.height())
    }

    /// Whether a device handle is held
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Connection state
    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Most recent connection or transport failure
    pub fn last_error(&self) -> Option<&str> {
        self.connection.last_error()
    }

    /// The connection
    pub fn connection(&self) -> &Connection<C> {
        &self.connection
    }

    /// Session configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Host mirror of graphics memory
    pub fn framebuffer(&self) -> Option<&Framebuffer> {
        self.canvas.as_ref().map(|canvas| &canvas.framebuffer)
    }

    /// Pending dirty marks
    pub fn dirty(&self) -> Option<&DirtyState> {
        self.canvas.as_ref().map(|canvas| &canvas.dirty)
    }

    /// Incremental text position in pixels
    pub fn cursor(&self) -> (i32, i32) {
        self.cursor
    }

    /// Move the incremental text position
    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = (x, y);
    }
}
