//! Image sources for [`PicoLcd::draw_image`](crate::PicoLcd::draw_image)

/// Anything that can be read as a grid of RGB pixels
pub trait RasterSource {
    /// Width and height in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Colour at (x, y); only called inside [`dimensions`](Self::dimensions)
    fn rgb(&self, x: u32, y: u32) -> [u8; 3];
}

/// In-memory RGB image
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbImage {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl RgbImage {
    /// Image filled with one colour
    pub fn new(width: u32, height: u32, fill: [u8; 3]) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Image from row-major pixels; `None` if the count does not match
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[u8; 3]>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Overwrite one pixel; writes outside the image are dropped
    pub fn set(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = rgb;
        }
    }
}

impl RasterSource for RgbImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or([0xFF; 3])
    }
}

/// Decode a PNG stream into an [`RgbImage`], dropping any alpha channel
#[cfg(feature = "png")]
pub fn decode_png<R: std::io::Read>(reader: R) -> Result<RgbImage, png::DecodingError> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;

    let samples = info.color_type.samples();
    let mut pixels = Vec::with_capacity(info.width as usize * info.height as usize);
    for line in buf.chunks(info.line_size).take(info.height as usize) {
        for px in line.chunks(samples).take(info.width as usize) {
            pixels.push(match px {
                [r, g, b, ..] => [*r, *g, *b],
                [gray, ..] => [*gray; 3],
                [] => [0xFF; 3],
            });
        }
    }
    Ok(RgbImage {
        width: info.width,
        height: info.height,
        pixels,
    })
}

/// Load a PNG file into an [`RgbImage`]
#[cfg(feature = "png")]
pub fn load_png(path: impl AsRef<std::path::Path>) -> Result<RgbImage, png::DecodingError> {
    let file = std::fs::File::open(path)?;
    decode_png(std::io::BufReader::new(file))
}
