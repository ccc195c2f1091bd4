//! Rectangles and images
//!
//! Both operations edit the framebuffer pixel by pixel without sending
//! anything, then finish with a single refresh so only dirty blocks travel.

use rand::Rng;

use crate::display::{LcdResult, PicoLcd};
use crate::interface::Connector;
use crate::raster::RasterSource;

/// Half-open rectangle: `x0..x1` by `y0..y1`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    /// Left edge, inclusive
    pub x0: i32,
    /// Top edge, inclusive
    pub y0: i32,
    /// Right edge, exclusive
    pub x1: i32,
    /// Bottom edge, exclusive
    pub y1: i32,
}

impl Rect {
    /// Rectangle from its top-left corner and exclusive bottom-right corner
    pub fn new(top_left: (i32, i32), bottom_right: (i32, i32)) -> Self {
        Self {
            x0: top_left.0,
            y0: top_left.1,
            x1: bottom_right.0,
            y1: bottom_right.1,
        }
    }

    /// Rectangle from its top-left corner and size
    pub fn with_size(top_left: (i32, i32), width: u32, height: u32) -> Self {
        let extent = |size: u32| i32::try_from(size).unwrap_or(i32::MAX);
        Self::new(
            top_left,
            (
                top_left.0.saturating_add(extent(width)),
                top_left.1.saturating_add(extent(height)),
            ),
        )
    }

    /// Width in pixels, zero for inverted rectangles
    pub fn width(&self) -> u32 {
        span(self.x0, self.x1)
    }

    /// Height in pixels, zero for inverted rectangles
    pub fn height(&self) -> u32 {
        span(self.y0, self.y1)
    }

    /// Whether the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Whether (x, y) lies inside
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.x0..self.x1).contains(&x) && (self.y0..self.y1).contains(&y)
    }

    /// Shrink every edge inwards by `amount`
    pub fn smaller(&self, amount: i32) -> Self {
        Self {
            x0: self.x0.saturating_add(amount),
            y0: self.y0.saturating_add(amount),
            x1: self.x1.saturating_sub(amount),
            y1: self.y1.saturating_sub(amount),
        }
    }

    /// Grow every edge outwards by `amount`
    pub fn larger(&self, amount: i32) -> Self {
        self.smaller(amount.saturating_neg())
    }

    /// Overlap with `other`, empty when they do not meet
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    /// Pixels of the filled area or of the one-pixel outline
    pub fn pixels(&self, filled: bool) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.pixels_within(filled, self)
    }

    /// Like [`Rect::pixels`], restricted to the part inside `clip`
    ///
    /// Only the clipped area is visited. An outline keeps the edges of the
    /// whole rectangle, so a cut-off side is not drawn.
    pub fn pixels_within(&self, filled: bool, clip: &Self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let area = self.intersection(clip);
        let (right, bottom) = (self.x1.saturating_sub(1), self.y1.saturating_sub(1));
        (area.y0..area.y1)
            .flat_map(move |y| (area.x0..area.x1).map(move |x| (x, y)))
            .filter(move |&(x, y)| filled || x == self.x0 || x == right || y == self.y0 || y == bottom)
    }
}

fn span(start: i32, end: i32) -> u32 {
    u32::try_from(i64::from(end) - i64::from(start)).unwrap_or(0)
}

/// How an image is turned into one-bit pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageOptions {
    /// Lightness cut-off (0.0-1.0); `None` selects random dithering
    pub threshold: Option<f32>,
    /// Swap on and off
    pub invert: bool,
    /// Lightness multiplier used by dithering
    pub brightness: f32,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            threshold: None,
            invert: false,
            brightness: 1.0,
        }
    }
}

/// Sum of the three channels at full white
const WHITE_TOTAL: u16 = 765;

impl<C> PicoLcd<C>
where
    C: Connector,
{
    /// Draw a rectangle and refresh
    ///
    /// The rectangle is clipped to the panel first, so its size does not
    /// matter. An outline whose edge lies off the panel loses that side.
    ///
    /// # Arguments
    ///
    /// * `rect` - Half-open area
    /// * `on` - Pixel state to paint
    /// * `filled` - Paint the whole area rather than a one-pixel outline
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedProfile` on a character panel and
    /// `Error::Disconnected` if the refresh could not reach the device.
    pub fn draw_rect(&mut self, rect: Rect, on: bool, filled: bool) -> LcdResult<(), C> {
        self.paint_rect(rect, on, filled)?;
        self.refresh()
    }

    /// Draw a rectangle into the framebuffer only, returning how many
    /// on-panel pixels it covered
    pub(crate) fn paint_rect(&mut self, rect: Rect, on: bool, filled: bool) -> LcdResult<usize, C> {
        let profile = self.require_graphics("draw_rect")?;
        let panel = Rect::with_size((0, 0), u32::from(profile.width), u32::from(profile.height));
        let mut count = 0;
        for (x, y) in rect.pixels_within(filled, &panel) {
            self.set_pixel(x, y, on, false, false)?;
            count += 1;
        }
        Ok(count)
    }

    /// Draw an image with its top-left corner at `pos`, then refresh
    ///
    /// With a threshold, pixels darker than the threshold turn on. Without
    /// one, each pixel turns on with a probability that falls as its
    /// lightness times `brightness` rises. The image is clipped to the panel.
    ///
    /// # Arguments
    ///
    /// * `pos` - Panel position of the image's top-left pixel, may be negative
    /// * `image` - Pixel source
    /// * `options` - Threshold, inversion and dithering brightness
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedProfile` on a character panel and
    /// `Error::Disconnected` if the refresh could not reach the device.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let logo = load_png("logo.png")?;
    /// let options = ImageOptions { threshold: Some(0.5), ..ImageOptions::default() };
    /// lcd.draw_image((200, 0), &logo, options)?;
    /// ```
    pub fn draw_image<S>(&mut self, pos: (i32, i32), image: &S, options: ImageOptions) -> LcdResult<(), C>
    where
        S: RasterSource + ?Sized,
    {
        self.draw_image_with_rng(pos, image, options, &mut rand::thread_rng())
    }

    /// [`draw_image`](Self::draw_image) with a caller supplied random source
    pub fn draw_image_with_rng<S, R>(
        &mut self,
        pos: (i32, i32),
        image: &S,
        options: ImageOptions,
        rng: &mut R,
    ) -> LcdResult<(), C>
    where
        S: RasterSource + ?Sized,
        R: Rng + ?Sized,
    {
        let profile = self.require_graphics("draw_image")?;
        let (width, height) = image.dimensions();
        let (px, py) = (i64::from(pos.0), i64::from(pos.1));
        let x_start = (-px).max(0);
        let y_start = (-py).max(0);
        let x_end = i64::from(width).min(i64::from(profile.width) - px);
        let y_end = i64::from(height).min(i64::from(profile.height) - py);

        for sy in y_start..y_end {
            for sx in x_start..x_end {
                let [r, g, b] = image.rgb(sx as u32, sy as u32);
                let total = u16::from(r) + u16::from(g) + u16::from(b);
                let dark = match options.threshold {
                    Some(threshold) => f32::from(total) / f32::from(WHITE_TOTAL) < threshold,
                    None => {
                        f32::from(total) * options.brightness
                            < f32::from(rng.gen_range(0..WHITE_TOTAL))
                    }
                };
                self.set_pixel(
                    (px + sx) as i32,
                    (py + sy) as i32,
                    dark != options.invert,
                    false,
                    false,
                )?;
            }
        }
        self.refresh()
    }
}
