//! Test doubles shared by the unit tests

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

use crate::config::{PICOLCD_20X4_PRODUCT_ID, PICOLCD_256X64_PRODUCT_ID, PICOLCD_VENDOR_ID, lookup};
use crate::error::FontError;
use crate::glyph::{AlphaMask, FontCatalog, FontSpec, GlyphRasterizer};
use crate::interface::{ConnectError, Connected, Connector, DisplayInterface};

#[derive(Debug)]
pub struct MockError;

#[derive(Debug, Default)]
struct MockBus {
    reports: Vec<Vec<u8>>,
    connects: usize,
    failing_writes: usize,
    fail_after: Option<usize>,
    unplugged: bool,
    deny_permission: bool,
    product_id: u16,
}

/// Connector whose bus state stays inspectable after being moved into a driver
#[derive(Clone, Debug)]
pub struct MockConnector {
    bus: Rc<RefCell<MockBus>>,
}

impl MockConnector {
    fn with_product(product_id: u16) -> Self {
        Self {
            bus: Rc::new(RefCell::new(MockBus {
                product_id,
                ..MockBus::default()
            })),
        }
    }

    pub fn graphics() -> Self {
        Self::with_product(PICOLCD_256X64_PRODUCT_ID)
    }

    pub fn text() -> Self {
        Self::with_product(PICOLCD_20X4_PRODUCT_ID)
    }

    pub fn reports(&self) -> Vec<Vec<u8>> {
        self.bus.borrow().reports.clone()
    }

    pub fn take_reports(&self) -> Vec<Vec<u8>> {
        core::mem::take(&mut self.bus.borrow_mut().reports)
    }

    pub fn connects(&self) -> usize {
        self.bus.borrow().connects
    }

    pub fn fail_next_writes(&self, count: usize) {
        self.bus.borrow_mut().failing_writes = count;
    }

    /// Let `count` writes through, then fail the next one
    pub fn fail_after(&self, count: usize) {
        self.bus.borrow_mut().fail_after = Some(count);
    }

    pub fn unplug(&self) {
        self.bus.borrow_mut().unplugged = true;
    }

    pub fn deny_permission(&self, deny: bool) {
        self.bus.borrow_mut().deny_permission = deny;
    }

    pub fn set_product(&self, product_id: u16) {
        self.bus.borrow_mut().product_id = product_id;
    }
}

impl Connector for MockConnector {
    type Interface = MockInterface;

    fn connect(&mut self) -> Result<Connected<MockInterface>, ConnectError> {
        let mut bus = self.bus.borrow_mut();
        if bus.unplugged {
            return Err(ConnectError::NoDeviceFound);
        }
        let profile = lookup(PICOLCD_VENDOR_ID, bus.product_id).ok_or(ConnectError::NoDeviceFound)?;
        if bus.deny_permission {
            return Err(ConnectError::PermissionDenied {
                vendor_id: PICOLCD_VENDOR_ID,
                product_id: bus.product_id,
                detail: String::from("access denied"),
            });
        }
        bus.connects += 1;
        Ok(Connected {
            interface: MockInterface {
                bus: Rc::clone(&self.bus),
            },
            vendor_id: PICOLCD_VENDOR_ID,
            product_id: bus.product_id,
            profile,
        })
    }
}

#[derive(Debug)]
pub struct MockInterface {
    bus: Rc<RefCell<MockBus>>,
}

impl DisplayInterface for MockInterface {
    type Error = MockError;

    fn write_report(&mut self, report: &[u8]) -> Result<usize, Self::Error> {
        let mut bus = self.bus.borrow_mut();
        if bus.failing_writes > 0 {
            bus.failing_writes -= 1;
            return Err(MockError);
        }
        match bus.fail_after {
            Some(0) => {
                bus.fail_after = None;
                return Err(MockError);
            }
            Some(count) => bus.fail_after = Some(count - 1),
            None => {}
        }
        bus.reports.push(report.to_vec());
        Ok(report.len())
    }
}

#[derive(Debug, Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

/// Draws each character as one column whose lit rows spell its code point
#[derive(Debug, Default)]
pub struct MockRasterizer {
    pub calls: usize,
}

impl GlyphRasterizer for MockRasterizer {
    fn resolve(&self, name: Option<&str>, size: Option<u32>) -> Result<FontSpec, FontError> {
        match name {
            None | Some("mock") => Ok(FontSpec {
                name: String::from("mock"),
                path: None,
                size: size.unwrap_or(8),
                is_default: name.is_none(),
            }),
            Some(other) => Err(FontError::UnknownFont {
                name: other.to_string(),
            }),
        }
    }

    fn rasterize(&mut self, _font: &FontSpec, text: &str, origin: (i32, i32), mask: &mut AlphaMask) {
        self.calls += 1;
        for (i, ch) in text.chars().enumerate() {
            let x = origin.0 + 2 * i as i32;
            let code = u32::from(ch);
            for bit in 0..8 {
                if (code >> bit) & 1 == 1 {
                    mask.set(x, origin.1 + bit, 0xFF);
                }
            }
        }
    }
}

/// Resolves names through a [`FontCatalog`] and draws like [`MockRasterizer`]
#[derive(Debug)]
pub struct CatalogRasterizer {
    pub catalog: FontCatalog,
    pub inner: MockRasterizer,
}

impl CatalogRasterizer {
    pub fn new(catalog: FontCatalog) -> Self {
        Self {
            catalog,
            inner: MockRasterizer::default(),
        }
    }
}

impl GlyphRasterizer for CatalogRasterizer {
    fn resolve(&self, name: Option<&str>, size: Option<u32>) -> Result<FontSpec, FontError> {
        self.catalog.resolve(name, size)
    }

    fn rasterize(&mut self, font: &FontSpec, text: &str, origin: (i32, i32), mask: &mut AlphaMask) {
        self.inner.rasterize(font, text, origin, mask);
    }
}
