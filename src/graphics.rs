//! embedded-graphics support
//!
//! [`PicoLcd`] is a [`DrawTarget`] for [`BinaryColor`] on graphics panels,
//! so the embedded-graphics primitives, images and fonts draw straight into
//! the framebuffer. Drawing never sends anything; call
//! [`PicoLcd::refresh`] afterwards.
//!
//! [`MonoFontRasterizer`] uses the embedded-graphics bitmap fonts for the
//! text operations, so text works without any font files.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_graphics::{
//!     pixelcolor::BinaryColor,
//!     prelude::*,
//!     primitives::{Circle, PrimitiveStyle},
//! };
//! use picolcd::{Config, PicoLcd, UsbConnector};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut lcd = PicoLcd::open(UsbConnector::new(), Config::default())?;
//! Circle::new(Point::new(100, 10), 40)
//!     .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
//!     .draw(&mut lcd)?;
//! lcd.refresh()?;
//! # Ok(())
//! # }
//! ```

use core::convert::Infallible;

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, ascii};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::BinaryColor,
    prelude::Pixel,
};

use crate::addressing;
use crate::display::PicoLcd;
use crate::error::{Error, FontError};
use crate::glyph::{AlphaMask, FontSpec, GlyphRasterizer};
use crate::interface::Connector;

impl<C> DrawTarget for PicoLcd<C>
where
    C: Connector,
{
    type Color = BinaryColor;
    type Error = Error<C::Interface>;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let profile = self.require_graphics("draw_iter")?;
        for Pixel(Point { x, y }, color) in pixels {
            if !addressing::contains(&profile, x, y) {
                continue;
            }
            self.set_pixel(x, y, color.is_on(), false, false)?;
        }
        Ok(())
    }
}

impl<C> OriginDimensions for PicoLcd<C>
where
    C: Connector,
{
    /// Panel size; zero before the first connection and for text panels
    fn size(&self) -> Size {
        match self.profile().and_then(|profile| profile.graphics()) {
            Some(profile) => Size::new(u32::from(profile.width), u32::from(profile.height)),
            None => Size::zero(),
        }
    }
}

/// Draw target that records lit pixels as full coverage
struct MaskTarget<'a> {
    mask: &'a mut AlphaMask,
}

impl DrawTarget for MaskTarget<'_> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if color.is_on() {
                self.mask.set(x, y, u8::MAX);
            }
        }
        Ok(())
    }
}

impl OriginDimensions for MaskTarget<'_> {
    fn size(&self) -> Size {
        Size::new(self.mask.width(), self.mask.height())
    }
}

const MONO_FACES: &[(&str, &MonoFont<'static>)] = &[
    ("4x6", &ascii::FONT_4X6),
    ("5x7", &ascii::FONT_5X7),
    ("5x8", &ascii::FONT_5X8),
    ("6x9", &ascii::FONT_6X9),
    ("6x10", &ascii::FONT_6X10),
    ("6x12", &ascii::FONT_6X12),
    ("6x13", &ascii::FONT_6X13),
    ("7x13", &ascii::FONT_7X13),
    ("7x14", &ascii::FONT_7X14),
    ("8x13", &ascii::FONT_8X13),
    ("9x15", &ascii::FONT_9X15),
    ("10x20", &ascii::FONT_10X20),
];

/// Glyph rasterizer over the embedded-graphics ASCII bitmap fonts
///
/// Faces are named by cell size (`"5x8"`, `"6x10"`, ...). The default face
/// is `5x8`, which fits one framebuffer row.
#[derive(Clone, Copy, Debug)]
pub struct MonoFontRasterizer {
    default_face: &'static str,
}

impl Default for MonoFontRasterizer {
    fn default() -> Self {
        Self { default_face: "5x8" }
    }
}

impl MonoFontRasterizer {
    /// Rasterizer whose default face is `default_face`
    ///
    /// # Errors
    ///
    /// Returns [`FontError::UnknownFont`] if no face has that name.
    pub fn with_default(default_face: &str) -> Result<Self, FontError> {
        let (name, _) = Self::lookup(default_face).ok_or_else(|| FontError::UnknownFont {
            name: default_face.to_string(),
        })?;
        Ok(Self { default_face: name })
    }

    /// Names of every available face
    pub fn faces() -> impl Iterator<Item = &'static str> {
        MONO_FACES.iter().map(|(name, _)| *name)
    }

    fn lookup(name: &str) -> Option<(&'static str, &'static MonoFont<'static>)> {
        let name = name.to_lowercase();
        MONO_FACES
            .iter()
            .find(|(face, _)| *face == name)
            .map(|(face, font)| (*face, *font))
    }
}

impl GlyphRasterizer for MonoFontRasterizer {
    fn resolve(&self, name: Option<&str>, size: Option<u32>) -> Result<FontSpec, FontError> {
        let requested = name.unwrap_or(self.default_face);
        let (face, font) = Self::lookup(requested).ok_or_else(|| FontError::UnknownFont {
            name: requested.to_string(),
        })?;
        Ok(FontSpec {
            name: face.to_string(),
            path: None,
            size: size.unwrap_or(font.character_size.height),
            is_default: face == self.default_face,
        })
    }

    fn rasterize(&mut self, font: &FontSpec, text: &str, origin: (i32, i32), mask: &mut AlphaMask) {
        let Some((_, face)) = Self::lookup(&font.name) else {
            return;
        };
        let style = MonoTextStyle::new(face, BinaryColor::On);
        let mut target = MaskTarget { mask };
        let _ = Text::with_baseline(text, Point::new(origin.0, origin.1), style, Baseline::Top)
            .draw(&mut target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Config};
    use crate::mock::MockConnector;
    use crate::text::{PushTextOptions, TextOptions};
    use embedded_graphics::primitives::{Line, Primitive, PrimitiveStyle, Rectangle};

    fn test_display() -> (PicoLcd<MockConnector>, MockConnector) {
        let connector = MockConnector::graphics();
        let config = Builder::new().clear_on_connect(false).build().unwrap();
        let lcd = PicoLcd::open(connector.clone(), config).unwrap();
        connector.take_reports();
        (lcd, connector)
    }

    #[test]
    fn test_size_follows_profile() {
        let (lcd, _) = test_display();
        assert_eq!(lcd.size(), Size::new(256, 64));

        let unconnected = PicoLcd::new(MockConnector::graphics(), Config::default());
        assert_eq!(unconnected.size(), Size::zero());
    }

    #[test]
    fn test_primitives_draw_into_framebuffer() {
        let (mut lcd, connector) = test_display();
        Rectangle::new(Point::new(4, 4), Size::new(3, 2))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut lcd)
            .unwrap();
        assert!(lcd.get_pixel(4, 4).unwrap());
        assert!(lcd.get_pixel(6, 5).unwrap());
        assert!(!lcd.get_pixel(7, 5).unwrap());
        assert!(connector.reports().is_empty());

        lcd.refresh().unwrap();
        assert!(!connector.reports().is_empty());
    }

    #[test]
    fn test_off_panel_pixels_are_skipped() {
        let (mut lcd, _) = test_display();
        Line::new(Point::new(250, 63), Point::new(270, 63))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut lcd)
            .unwrap();
        assert!(lcd.get_pixel(255, 63).unwrap());
    }

    #[test]
    fn test_clear_target() {
        let (mut lcd, _) = test_display();
        DrawTarget::clear(&mut lcd, BinaryColor::On).unwrap();
        assert!(lcd.get_pixel(0, 0).unwrap());
        assert!(lcd.get_pixel(255, 63).unwrap());
        assert_eq!(lcd.dirty().unwrap().dirty_blocks().count(), 64);
    }

    #[test]
    fn test_mono_resolve() {
        let fonts = MonoFontRasterizer::default();
        let font = fonts.resolve(None, None).unwrap();
        assert_eq!(font.name, "5x8");
        assert_eq!(font.size, 8);
        assert!(font.is_default);

        let font = fonts.resolve(Some("6X10"), None).unwrap();
        assert_eq!(font.name, "6x10");
        assert!(!font.is_default);

        assert_eq!(
            fonts.resolve(Some("ninepin"), None),
            Err(FontError::UnknownFont {
                name: String::from("ninepin")
            })
        );
        assert!(MonoFontRasterizer::with_default("3x3").is_err());
    }

    #[test]
    fn test_mono_rasterize_stays_in_cell() {
        let mut fonts = MonoFontRasterizer::default();
        let font = fonts.resolve(None, None).unwrap();
        let mut mask = AlphaMask::new(32, 16);
        fonts.rasterize(&font, "H", (10, 2), &mut mask);
        let lit: Vec<(i32, i32)> = mask.lit(0.5).collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(x, y)| (10..15).contains(&x) && (2..10).contains(&y)));
    }

    #[test]
    fn test_mono_text_on_display() {
        let (mut lcd, _) = test_display();
        let mut fonts = MonoFontRasterizer::default();
        let options = TextOptions {
            erase_behind: true,
            ..TextOptions::default()
        };
        let erased = lcd
            .draw_text_at(&mut fonts, (0, 0), "Hi", &options)
            .unwrap()
            .unwrap();
        assert!(erased.x0 >= 0 && erased.x1 <= 10);
        assert!(erased.y1 <= 8);

        lcd.push_text(&mut fonts, "Hello", PushTextOptions::default())
            .unwrap();
        assert!(lcd.cursor().0 > 5);
        assert_eq!(lcd.cursor().1, 0);
    }
}
