//! Text rendering
//!
//! Three entry points:
//!
//! - [`PicoLcd::draw_text_at`] rasterizes a string at a pixel position.
//! - [`PicoLcd::draw_text`] places text on a row/column grid and is the only
//!   text operation character panels support.
//! - [`PicoLcd::push_text`] appends text terminal-style at a cursor, with
//!   wrapping, escapes and scrolling, using cached one-byte glyph stripes.
//!
//! ## Escapes understood by `push_text`
//!
//! | Input            | Effect                         |
//! |------------------|--------------------------------|
//! | `\n` or `\\n`    | start of the next 8 pixel row  |
//! | `\r` or `\\r`    | start of the current row       |
//! | `\t` or `\\t`    | next tab stop                  |
//! | `\\` + any other | that character, literally      |

use std::collections::HashMap;

use log::{debug, warn};

use crate::addressing;
use crate::config::{DeviceProfile, GraphicsProfile, TextProfile};
use crate::dirty::DirtyMark;
use crate::display::{LcdResult, PicoLcd};
use crate::draw::Rect;
use crate::error::Error;
use crate::frame;
use crate::glyph::{AlphaMask, FontSpec, GlyphRasterizer, default_threshold};
use crate::interface::Connector;

/// Options for [`PicoLcd::draw_text_at`] and [`PicoLcd::draw_text`]
#[derive(Clone, Debug, PartialEq)]
pub struct TextOptions {
    /// Font name; `None` selects the rasterizer's default face
    pub font: Option<String>,
    /// Font size; `None` selects the face's default size
    pub size: Option<u32>,
    /// Minimum coverage for a pixel to turn on
    pub threshold: Option<f32>,
    /// Clear the text's bounding box before drawing
    pub erase_behind: bool,
    /// Clear this rectangle before drawing; implies `erase_behind`
    pub erase_rect: Option<Rect>,
    /// Send dirty blocks when done
    pub refresh: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            font: None,
            size: None,
            threshold: None,
            erase_behind: false,
            erase_rect: None,
            refresh: true,
        }
    }
}

/// Options for [`PicoLcd::push_text`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PushTextOptions {
    /// Blank columns after each glyph
    pub spacing_x: u16,
    /// Rows to scroll when the cursor runs off the bottom
    pub scroll_count: u16,
    /// Send dirty blocks when done
    pub refresh: bool,
}

impl Default for PushTextOptions {
    fn default() -> Self {
        Self {
            spacing_x: 1,
            scroll_count: 1,
            refresh: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct GlyphKey {
    font: String,
    size: u32,
    ch: char,
}

/// Rasterized glyph stripes keyed by font, size and character
///
/// Each stripe is one column of eight pixels, least significant bit on top.
#[derive(Clone, Debug, Default)]
pub struct GlyphCache {
    stripes: HashMap<GlyphKey, Vec<u8>>,
}

impl GlyphCache {
    fn key(font: &FontSpec, ch: char) -> GlyphKey {
        GlyphKey {
            font: font.name.clone(),
            size: font.size,
            ch,
        }
    }

    /// Cached stripes for a character
    pub fn get(&self, font: &FontSpec, ch: char) -> Option<&[u8]> {
        self.stripes.get(&Self::key(font, ch)).map(Vec::as_slice)
    }

    /// Store stripes for a character
    pub fn insert(&mut self, font: &FontSpec, ch: char, stripes: Vec<u8>) {
        self.stripes.insert(Self::key(font, ch), stripes);
    }

    /// Number of cached glyphs
    pub fn len(&self) -> usize {
        self.stripes.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.stripes.is_empty()
    }

    /// Forget every glyph
    pub fn clear(&mut self) {
        self.stripes.clear();
    }
}

/// Cut the first glyph in an 8 pixel tall mask into column stripes
///
/// Leading empty columns are skipped; the glyph ends at the first empty
/// column after it started.
pub fn extract_stripes(mask: &AlphaMask, threshold: f32) -> Vec<u8> {
    let mut stripes = Vec::new();
    let rows = mask.height().min(8) as i32;
    for x in 0..mask.width() as i32 {
        let stripe = (0..rows)
            .filter(|&y| mask.coverage(x, y) > threshold)
            .fold(0_u8, |acc, y| acc | (1 << y));
        if stripe != 0 {
            stripes.push(stripe);
        } else if !stripes.is_empty() {
            break;
        }
    }
    stripes
}

fn bounding_box(points: &[(i32, i32)]) -> Option<Rect> {
    let (first, rest) = points.split_first()?;
    let (mut x0, mut y0, mut x1, mut y1) = (first.0, first.1, first.0, first.1);
    for &(x, y) in rest {
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    Some(Rect::new((x0, y0), (x1 + 1, y1 + 1)))
}

impl<C> PicoLcd<C>
where
    C: Connector,
{
    /// Draw text with its top-left corner at `pos`
    ///
    /// On graphics panels the font is resolved before anything is drawn, so
    /// an unknown font leaves the panel untouched. With `erase_behind` and
    /// no `erase_rect`, returns the bounding box that was cleared, in
    /// half-open form. On character panels `pos` is (column, row) and the
    /// font options are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownFont` or `Error::FontFileMissing` when the
    /// rasterizer cannot resolve `options.font`, and `Error::InvalidAddress`
    /// when text on a character panel does not fit its row.
    pub fn draw_text_at<R>(
        &mut self,
        rasterizer: &mut R,
        pos: (i32, i32),
        text: &str,
        options: &TextOptions,
    ) -> LcdResult<Option<Rect>, C>
    where
        R: GlyphRasterizer + ?Sized,
    {
        let profile = match self.active_profile()? {
            DeviceProfile::Text(profile) => {
                self.write_cells(&profile, pos.1, pos.0, text)?;
                return Ok(None);
            }
            DeviceProfile::Graphics(profile) => profile,
        };
        let font = rasterizer.resolve(options.font.as_deref(), options.size)?;
        let threshold = options
            .threshold
            .unwrap_or_else(|| default_threshold(&font, self.config.default_text_threshold));
        self.require_graphics("draw_text_at")?;

        if let Some(rect) = options.erase_rect {
            self.paint_rect(rect, false, true)?;
        }
        let mut mask = AlphaMask::new(u32::from(profile.width), u32::from(profile.height));
        rasterizer.rasterize(&font, text, pos, &mut mask);
        let lit: Vec<(i32, i32)> = mask.lit(threshold).collect();
        if lit.is_empty() {
            warn!("draw_text_at: {text:?} produced no pixels at threshold {threshold}");
        }

        let erased = if options.erase_behind && options.erase_rect.is_none() {
            match bounding_box(&lit) {
                Some(rect) => {
                    self.paint_rect(rect, false, true)?;
                    Some(rect)
                }
                None => None,
            }
        } else {
            None
        };
        for (x, y) in lit {
            self.set_pixel(x, y, true, false, false)?;
        }
        if options.refresh {
            self.refresh()?;
        }
        Ok(erased)
    }

    /// Draw text in grid cells: 6x8 pixel cells on graphics panels,
    /// character cells on text panels
    ///
    /// # Errors
    ///
    /// Same as [`PicoLcd::draw_text_at`].
    pub fn draw_text<R>(
        &mut self,
        rasterizer: &mut R,
        row: i32,
        column: i32,
        text: &str,
        options: &TextOptions,
    ) -> LcdResult<Option<Rect>, C>
    where
        R: GlyphRasterizer + ?Sized,
    {
        let pos = match self.active_profile()? {
            DeviceProfile::Graphics(profile) => (
                column * i32::from(self.config.glyph_cell_width),
                row * i32::from(profile.pixels_per_byte),
            ),
            DeviceProfile::Text(_) => (column, row),
        };
        self.draw_text_at(rasterizer, pos, text, options)
    }

    fn write_cells(&mut self, profile: &TextProfile, row: i32, column: i32, text: &str) -> LcdResult<(), C> {
        let invalid = Error::InvalidAddress { x: column, y: row };
        let (Ok(row_index), Ok(column_index)) = (usize::try_from(row), usize::try_from(column)) else {
            return Err(invalid);
        };
        let bytes: Vec<u8> = text
            .chars()
            .map(|ch| if ch.is_ascii() { ch as u8 } else { b'?' })
            .collect();
        if row_index >= usize::from(profile.rows) || column_index + bytes.len() > usize::from(profile.columns) {
            warn!("draw_text: {text:?} does not fit at row {row}, column {column}");
            return Err(invalid);
        }
        let address = frame::text_set_address(row_index, column_index).ok_or(invalid)?;
        self.transmit(&address)?;
        self.transmit(&frame::text_write(&bytes))?;
        Ok(())
    }

    /// Append text at the cursor, wrapping and scrolling as needed
    ///
    /// Uses the rasterizer's default face, which must be at most 8 pixels
    /// tall. Glyphs are rasterized once per session and cached.
    ///
    /// `\n`, `\r` and `\t` act on the cursor whether they arrive as control
    /// characters or as backslash escapes; `\\` draws a backslash. Each
    /// time the cursor runs off the bottom the panel scrolls up by
    /// `scroll_count` rows, until the line fits. A scroll wider than the
    /// glyph being placed clears the panel and starts again at the top.
    ///
    /// # Arguments
    ///
    /// * `rasterizer` - Source of glyph masks
    /// * `text` - Text to append
    /// * `options` - Spacing, scroll amount and whether to refresh
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedProfile` on a character panel, a font
    /// error if the rasterizer has no default face, or `Error::Disconnected`
    /// if a refresh could not reach the device.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use picolcd::{Builder, MonoFontRasterizer, PicoLcd, PushTextOptions, UsbConnector};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut lcd = PicoLcd::open(UsbConnector::new(), Builder::new().build()?)?;
    /// let mut fonts = MonoFontRasterizer::default();
    /// lcd.push_text(&mut fonts, "uptime 3d\\n", PushTextOptions::default())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn push_text<R>(&mut self, rasterizer: &mut R, text: &str, options: PushTextOptions) -> LcdResult<(), C>
    where
        R: GlyphRasterizer + ?Sized,
    {
        let profile = self.require_graphics("push_text")?;
        let font = rasterizer.resolve(None, None)?;
        let width = i32::from(profile.width);
        let height = i32::from(profile.height);
        let band = i32::from(profile.pixels_per_byte);
        let tab = i32::from(self.config.tab_width.max(1));
        let scroll = i32::from(options.scroll_count.max(1));

        let (mut x, mut y) = self.cursor;
        let mut escaped = false;
        for ch in text.chars() {
            if ch == '\\' && !escaped {
                escaped = true;
                continue;
            }
            let (ch, is_escape) = match ch {
                '\n' => ('n', true),
                '\r' => ('r', true),
                '\t' => ('t', true),
                other => (other, escaped),
            };
            escaped = false;
            if is_escape {
                match ch {
                    'n' => {
                        x = 0;
                        y += band;
                        continue;
                    }
                    'r' => {
                        x = 0;
                        continue;
                    }
                    't' => {
                        x = (x + tab) / tab * tab;
                        continue;
                    }
                    _ => {}
                }
            }

            let stripes = self.glyph_stripes(rasterizer, &font, ch, &profile);
            let glyph_width = stripes.len() as i32;
            if x + glyph_width > width {
                x = 0;
                y += band;
            }
            while y + band > height {
                if self.scroll_up(scroll, glyph_width)? {
                    y = 0;
                    break;
                }
                y = (y - scroll * band).max(0);
            }
            let drawn = self.write_stripes(&profile, x, y, &stripes)?;
            x += drawn + i32::from(options.spacing_x);
        }
        self.cursor = (x, y);
        if options.refresh {
            self.refresh()?;
        }
        Ok(())
    }

    fn glyph_stripes<R>(&mut self, rasterizer: &mut R, font: &FontSpec, ch: char, profile: &GraphicsProfile) -> Vec<u8>
    where
        R: GlyphRasterizer + ?Sized,
    {
        if let Some(stripes) = self.glyphs.get(font, ch) {
            return stripes.to_vec();
        }
        let stripes = if ch.is_whitespace() {
            vec![0; (font.size as f32 * self.config.space_width_ratio) as usize]
        } else {
            let mut mask = AlphaMask::new(u32::from(profile.width), u32::from(profile.pixels_per_byte));
            rasterizer.rasterize(font, ch.encode_utf8(&mut [0; 4]), (0, 0), &mut mask);
            extract_stripes(&mask, self.config.default_text_threshold)
        };
        debug!("Cached glyph {ch:?} ({} columns)", stripes.len());
        self.glyphs.insert(font, ch, stripes.clone());
        stripes
    }

    /// Shift the framebuffer up by `count` rows, returning whether the
    /// panel was cleared instead
    fn scroll_up(&mut self, count: i32, glyph_width: i32) -> LcdResult<bool, C> {
        if count > glyph_width {
            self.clear()?;
            return Ok(true);
        }
        let canvas = self.canvas_mut()?;
        let rows = canvas.framebuffer.rows();
        for dst in 0..rows {
            let src = dst + count as usize;
            if src >= rows {
                canvas.framebuffer.reset_row(dst);
            } else {
                canvas.framebuffer.transfer_row(dst, src);
            }
        }
        canvas.dirty.mark_all();
        Ok(false)
    }

    fn write_stripes(&mut self, profile: &GraphicsProfile, x: i32, y: i32, stripes: &[u8]) -> LcdResult<i32, C> {
        let width = i32::from(profile.width);
        let band = i32::from(profile.pixels_per_byte);
        let canvas = self.canvas_mut()?;
        let Ok(row) = usize::try_from(y / band) else {
            return Ok(0);
        };
        let mut zones: Vec<usize> = Vec::new();
        let mut drawn = 0;
        for (i, stripe) in stripes.iter().enumerate() {
            let column = x + i as i32;
            if !(0..width).contains(&column) {
                break;
            }
            let zone = addressing::zone_of(profile, column) as usize;
            let Some(block) = canvas.framebuffer.index(row, zone) else {
                break;
            };
            canvas
                .framebuffer
                .set_byte(block, addressing::byte_offset_of(profile, column), *stripe);
            if !zones.contains(&zone) {
                zones.push(zone);
            }
            drawn += 1;
        }
        canvas
            .dirty
            .mark_region(Some(&[row]), Some(&zones), DirtyMark::Full);
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Config};
    use crate::glyph::FontCatalog;
    use crate::mock::{CatalogRasterizer, MockConnector, MockRasterizer};

    fn test_display() -> (PicoLcd<MockConnector>, MockConnector) {
        let connector = MockConnector::graphics();
        let config = Builder::new().clear_on_connect(false).build().unwrap();
        let lcd = PicoLcd::open(connector.clone(), config).unwrap();
        connector.take_reports();
        (lcd, connector)
    }

    fn byte_at(lcd: &PicoLcd<MockConnector>, row: usize, x: usize) -> u8 {
        let fb = lcd.framebuffer().unwrap();
        fb.get_byte(fb.index(row, x / 32).unwrap(), x % 32).unwrap()
    }

    #[test]
    fn test_extract_stripes_skips_leading_blank_columns() {
        let mut mask = AlphaMask::new(16, 8);
        mask.set(3, 0, 255);
        mask.set(4, 7, 255);
        mask.set(4, 2, 100);
        mask.set(9, 0, 255);
        assert_eq!(extract_stripes(&mask, 0.5), vec![0x01, 0x80]);
    }

    #[test]
    fn test_push_text_writes_stripes() {
        let (mut lcd, connector) = test_display();
        let mut font = MockRasterizer::default();
        lcd.push_text(&mut font, "A", PushTextOptions::default()).unwrap();
        assert_eq!(byte_at(&lcd, 0, 0), b'A');
        assert_eq!(lcd.cursor(), (2, 0));
        assert!(!connector.reports().is_empty());
    }

    #[test]
    fn test_push_text_caches_glyphs() {
        let (mut lcd, _) = test_display();
        let mut font = MockRasterizer::default();
        lcd.push_text(&mut font, "AAA", PushTextOptions::default()).unwrap();
        lcd.push_text(&mut font, "A", PushTextOptions::default()).unwrap();
        assert_eq!(font.calls, 1);
        assert_eq!(lcd.glyphs.len(), 1);
    }

    #[test]
    fn test_push_text_wraps_at_right_edge() {
        let (mut lcd, _) = test_display();
        let mut font = MockRasterizer::default();
        let line = "A".repeat(128);
        lcd.push_text(&mut font, &line, PushTextOptions::default()).unwrap();
        assert_eq!(lcd.cursor(), (256, 0));
        assert_eq!(byte_at(&lcd, 0, 254), b'A');

        lcd.push_text(&mut font, "B", PushTextOptions::default()).unwrap();
        assert_eq!(byte_at(&lcd, 1, 0), b'B');
        assert_eq!(lcd.cursor(), (2, 8));
    }

    #[test]
    fn test_push_text_scrolls_oldest_row_away() {
        let (mut lcd, _) = test_display();
        let mut font = MockRasterizer::default();
        lcd.push_text(&mut font, "A\nB\nC\nD\nE\nF\nG\nH", PushTextOptions::default())
            .unwrap();
        assert_eq!(byte_at(&lcd, 0, 0), b'A');
        assert_eq!(byte_at(&lcd, 7, 0), b'H');

        lcd.push_text(&mut font, "\nI", PushTextOptions::default()).unwrap();
        assert_eq!(byte_at(&lcd, 0, 0), b'B');
        assert_eq!(byte_at(&lcd, 6, 0), b'H');
        assert_eq!(byte_at(&lcd, 7, 0), b'I');
        assert_eq!(lcd.cursor(), (2, 56));
        assert!(lcd.dirty().unwrap().dirty_blocks().next().is_none());
    }

    fn fill_rows(lcd: &mut PicoLcd<MockConnector>, font: &mut MockRasterizer) {
        lcd.push_text(font, "A\nB\nC\nD\nE\nF\nG\nH", PushTextOptions::default())
            .unwrap();
    }

    #[test]
    fn test_push_text_scrolls_until_line_fits() {
        let (mut lcd, _) = test_display();
        let mut font = MockRasterizer::default();
        fill_rows(&mut lcd, &mut font);

        lcd.push_text(&mut font, "\n\nX", PushTextOptions::default()).unwrap();
        assert_eq!(byte_at(&lcd, 0, 0), b'C');
        assert_eq!(byte_at(&lcd, 5, 0), b'H');
        assert_eq!(byte_at(&lcd, 6, 0), 0);
        assert_eq!(byte_at(&lcd, 7, 0), b'X');
        assert_eq!(lcd.cursor(), (2, 56));

        lcd.push_text(&mut font, "\n\n\n\nY", PushTextOptions::default()).unwrap();
        assert_eq!(byte_at(&lcd, 3, 0), b'X');
        assert_eq!(byte_at(&lcd, 7, 0), b'Y');
        assert_eq!(lcd.cursor(), (2, 56));
    }

    #[test]
    fn test_push_text_scrolls_several_rows() {
        let (mut lcd, _) = test_display();
        let mut font = MockRasterizer::default();
        fill_rows(&mut lcd, &mut font);

        let options = PushTextOptions {
            scroll_count: 2,
            ..PushTextOptions::default()
        };
        // A space is three columns wide, enough to scroll two rows
        lcd.push_text(&mut font, "\n ", options).unwrap();
        assert_eq!(byte_at(&lcd, 0, 0), b'C');
        assert_eq!(byte_at(&lcd, 5, 0), b'H');
        assert_eq!(byte_at(&lcd, 6, 0), 0);
        assert_eq!(byte_at(&lcd, 7, 0), 0);
        assert_eq!(lcd.cursor(), (4, 48));
        assert!(lcd.dirty().unwrap().dirty_blocks().next().is_none());
    }

    #[test]
    fn test_push_text_clears_when_scroll_exceeds_glyph() {
        let (mut lcd, connector) = test_display();
        let mut font = MockRasterizer::default();
        fill_rows(&mut lcd, &mut font);
        connector.take_reports();

        let options = PushTextOptions {
            scroll_count: 2,
            ..PushTextOptions::default()
        };
        lcd.push_text(&mut font, "\nI", options).unwrap();
        assert_eq!(byte_at(&lcd, 0, 0), b'I');
        for row in 1..8 {
            assert_eq!(byte_at(&lcd, row, 0), 0);
        }
        assert_eq!(lcd.cursor(), (2, 0));
        // The clear sent every block
        assert!(connector.reports().len() >= 32);
    }

    #[test]
    fn test_push_text_after_clear_starts_at_top() {
        let (mut lcd, _) = test_display();
        let mut font = MockRasterizer::default();
        lcd.push_text(&mut font, "A\nB", PushTextOptions::default()).unwrap();
        lcd.clear().unwrap();
        lcd.push_text(&mut font, "C", PushTextOptions::default()).unwrap();
        assert_eq!(byte_at(&lcd, 0, 0), b'C');
        assert_eq!(byte_at(&lcd, 1, 0), 0);
    }

    #[test]
    fn test_push_text_escapes() {
        let (mut lcd, _) = test_display();
        let mut font = MockRasterizer::default();
        lcd.push_text(&mut font, "A\tB", PushTextOptions::default()).unwrap();
        assert_eq!(byte_at(&lcd, 0, 32), b'B');

        lcd.push_text(&mut font, "\\nC\\\\", PushTextOptions::default()).unwrap();
        assert_eq!(byte_at(&lcd, 1, 0), b'C');
        assert_eq!(byte_at(&lcd, 1, 2), b'\\');

        lcd.push_text(&mut font, "D\rE", PushTextOptions::default()).unwrap();
        assert_eq!(byte_at(&lcd, 1, 0), b'E');
        assert_eq!(byte_at(&lcd, 1, 4), b'D');
    }

    #[test]
    fn test_push_text_space_width() {
        let (mut lcd, _) = test_display();
        let mut font = MockRasterizer::default();
        lcd.push_text(&mut font, " ", PushTextOptions::default()).unwrap();
        // 8px font * 0.4, plus one column of spacing
        assert_eq!(lcd.cursor(), (4, 0));
        assert_eq!(font.calls, 0);
    }

    #[test]
    fn test_push_text_without_refresh_leaves_blocks_dirty() {
        let (mut lcd, connector) = test_display();
        let mut font = MockRasterizer::default();
        let options = PushTextOptions {
            refresh: false,
            ..PushTextOptions::default()
        };
        lcd.push_text(&mut font, "A", options).unwrap();
        assert!(connector.reports().is_empty());
        assert!(lcd.dirty().unwrap().is_dirty(0));
    }

    #[test]
    fn test_push_text_needs_graphics_panel() {
        let connector = MockConnector::text();
        let mut lcd = PicoLcd::open(connector, Config::default()).unwrap();
        let mut font = MockRasterizer::default();
        assert!(matches!(
            lcd.push_text(&mut font, "A", PushTextOptions::default()),
            Err(Error::UnsupportedProfile { .. })
        ));
    }

    #[test]
    fn test_draw_text_at_sets_pixels() {
        let (mut lcd, _) = test_display();
        let mut font = MockRasterizer::default();
        let erased = lcd
            .draw_text_at(&mut font, (10, 20), "A", &TextOptions::default())
            .unwrap();
        assert_eq!(erased, None);
        assert!(lcd.get_pixel(10, 20).unwrap());
        assert!(lcd.get_pixel(10, 26).unwrap());
        assert!(!lcd.get_pixel(10, 21).unwrap());
    }

    #[test]
    fn test_draw_text_at_erase_behind_returns_bounds() {
        let (mut lcd, _) = test_display();
        lcd.set_pixel(10, 23, true, false, false).unwrap();
        let mut font = MockRasterizer::default();
        let options = TextOptions {
            erase_behind: true,
            ..TextOptions::default()
        };
        let erased = lcd.draw_text_at(&mut font, (10, 20), "A", &options).unwrap();
        assert_eq!(erased, Some(Rect::new((10, 20), (11, 27))));
        assert!(!lcd.get_pixel(10, 23).unwrap());
        assert!(lcd.get_pixel(10, 26).unwrap());
    }

    #[test]
    fn test_draw_text_at_erase_rect() {
        let (mut lcd, _) = test_display();
        lcd.set_pixel(30, 30, true, false, false).unwrap();
        let mut font = MockRasterizer::default();
        let options = TextOptions {
            erase_rect: Some(Rect::new((0, 0), (40, 40))),
            ..TextOptions::default()
        };
        let erased = lcd.draw_text_at(&mut font, (0, 0), "A", &options).unwrap();
        assert_eq!(erased, None);
        assert!(!lcd.get_pixel(30, 30).unwrap());
        assert!(lcd.get_pixel(0, 0).unwrap());
    }

    #[test]
    fn test_draw_text_at_unknown_font_sends_nothing() {
        let (mut lcd, connector) = test_display();
        let mut font = MockRasterizer::default();
        let options = TextOptions {
            font: Some(String::from("comic")),
            ..TextOptions::default()
        };
        assert!(matches!(
            lcd.draw_text_at(&mut font, (0, 0), "A", &options),
            Err(Error::UnknownFont { .. })
        ));
        assert!(connector.reports().is_empty());
        assert_eq!(font.calls, 0);
    }

    #[test]
    fn test_draw_text_at_reports_missing_font_file() {
        let (mut lcd, connector) = test_display();
        let dir = std::env::temp_dir().join("picolcd-no-such-fonts");
        let mut fonts = CatalogRasterizer::new(FontCatalog::bundled(&dir));
        let options = TextOptions {
            font: Some(String::from("Zephyrean")),
            ..TextOptions::default()
        };
        let result = lcd.draw_text_at(&mut fonts, (0, 0), "A", &options);
        assert!(matches!(
            result,
            Err(Error::FontFileMissing { ref path }) if *path == dir.join("zephyrea.ttf")
        ));
        assert!(connector.reports().is_empty());
        assert_eq!(fonts.inner.calls, 0);
    }

    #[test]
    fn test_draw_text_at_with_catalog_font() {
        let (mut lcd, _) = test_display();
        let dir = std::env::temp_dir().join(format!("picolcd-text-fonts-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("ninepin.ttf"), b"").unwrap();
        let mut fonts = CatalogRasterizer::new(FontCatalog::bundled(&dir));

        lcd.draw_text_at(&mut fonts, (4, 8), "A", &TextOptions::default())
            .unwrap();
        assert!(lcd.get_pixel(4, 8).unwrap());
        assert_eq!(fonts.inner.calls, 1);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_draw_text_grid_on_graphics_panel() {
        let (mut lcd, _) = test_display();
        let mut font = MockRasterizer::default();
        lcd.draw_text(&mut font, 1, 2, "A", &TextOptions::default())
            .unwrap();
        assert!(lcd.get_pixel(12, 8).unwrap());
    }

    #[test]
    fn test_draw_text_on_character_panel() {
        let connector = MockConnector::text();
        let mut lcd = PicoLcd::open(connector.clone(), Config::default()).unwrap();
        connector.take_reports();
        let mut font = MockRasterizer::default();
        lcd.draw_text(&mut font, 2, 3, "hi", &TextOptions::default())
            .unwrap();
        assert_eq!(
            connector.reports(),
            vec![
                vec![0x94, 0x00, 0x01, 0x00, 0x64, 0x97],
                vec![0x95, 0x01, 0x00, 0x01, 2, b'h', b'i'],
            ]
        );
        assert!(matches!(
            lcd.draw_text(&mut font, 4, 0, "x", &TextOptions::default()),
            Err(Error::InvalidAddress { .. })
        ));
        assert!(matches!(
            lcd.draw_text(&mut font, 0, 15, "too long", &TextOptions::default()),
            Err(Error::InvalidAddress { x: 15, y: 0 })
        ));
    }
}
