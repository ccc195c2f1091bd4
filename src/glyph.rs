//! Glyph rasterization seam and font catalog
//!
//! Turning text into pixels is delegated to a [`GlyphRasterizer`], which
//! resolves font requests and paints coverage into an [`AlphaMask`]. The
//! driver only ever thresholds that mask, so any font engine can be plugged
//! in. [`FontCatalog`] is a ready-made name to file resolver for
//! rasterizers that load font files.

use std::path::{Path, PathBuf};

use crate::error::FontError;

/// Single-channel coverage buffer, 0 (empty) to 255 (solid)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl AlphaMask {
    /// Empty mask of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width as usize * height as usize],
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    /// Coverage at (x, y); zero outside the mask
    pub fn get(&self, x: i32, y: i32) -> u8 {
        self.offset(x, y).map_or(0, |offset| self.alpha[offset])
    }

    /// Set coverage at (x, y); writes outside the mask are dropped
    pub fn set(&mut self, x: i32, y: i32, value: u8) {
        if let Some(offset) = self.offset(x, y) {
            self.alpha[offset] = value;
        }
    }

    /// Coverage at (x, y) scaled to 0.0-1.0
    pub fn coverage(&self, x: i32, y: i32) -> f32 {
        f32::from(self.get(x, y)) / 255.0
    }

    /// Reset every pixel to empty
    pub fn clear(&mut self) {
        self.alpha.fill(0);
    }

    /// Pixels whose coverage is at least `threshold`, row by row
    pub fn lit(&self, threshold: f32) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.alpha
            .iter()
            .enumerate()
            .filter(move |(_, alpha)| f32::from(**alpha) / 255.0 >= threshold)
            .map(move |(offset, _)| {
                let offset = offset as u32;
                ((offset % self.width) as i32, (offset / self.width) as i32)
            })
    }
}

/// A resolved font request
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontSpec {
    /// Catalog name of the face
    pub name: String,
    /// Font file backing the face, if any
    pub path: Option<PathBuf>,
    /// Requested size in pixels
    pub size: u32,
    /// Whether this is the rasterizer's default face
    pub is_default: bool,
}

/// Font engine used by the text operations
pub trait GlyphRasterizer {
    /// Resolve a font name and size; `None` selects the defaults
    ///
    /// # Errors
    ///
    /// Returns [`FontError`] for names the engine does not know or whose
    /// backing file is missing.
    fn resolve(&self, name: Option<&str>, size: Option<u32>) -> Result<FontSpec, FontError>;

    /// Paint `text` with its top-left corner at `origin`
    fn rasterize(&mut self, font: &FontSpec, text: &str, origin: (i32, i32), mask: &mut AlphaMask);
}

/// Alpha threshold for text when the caller gave none
///
/// The default face renders thin anti-aliased strokes, so it gets a much
/// lower cut-off than other faces.
pub fn default_threshold(font: &FontSpec, fallback: f32) -> f32 {
    if !font.is_default {
        fallback
    } else if font.size > 8 {
        0.02
    } else {
        0.03
    }
}

/// One catalog entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontFace {
    /// Lookup name, matched case-insensitively
    pub name: String,
    /// File name relative to the catalog directory
    pub file_name: String,
    /// Size used when the caller gives none
    pub default_size: u32,
    /// Usage hint
    pub note: Option<String>,
}

impl FontFace {
    /// New entry without a note
    pub fn new(name: &str, file_name: &str, default_size: u32) -> Self {
        Self {
            name: name.to_lowercase(),
            file_name: file_name.to_string(),
            default_size,
            note: None,
        }
    }

    /// Attach a usage hint
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }
}

/// Named fonts stored in one directory
#[derive(Clone, Debug)]
pub struct FontCatalog {
    font_dir: PathBuf,
    faces: Vec<FontFace>,
    default_face: String,
}

impl FontCatalog {
    /// Empty catalog rooted at `font_dir` whose default face is `default_face`
    pub fn new(font_dir: impl Into<PathBuf>, default_face: &str) -> Self {
        Self {
            font_dir: font_dir.into(),
            faces: Vec::new(),
            default_face: default_face.to_lowercase(),
        }
    }

    /// The pixel fonts picoLCD setups usually ship, rooted at `font_dir`
    pub fn bundled(font_dir: impl Into<PathBuf>) -> Self {
        Self::new(font_dir, "ninepin")
            .with_face(FontFace::new("ninepin", "ninepin.ttf", 8))
            .with_face(
                FontFace::new("zephyrean", "zephyrea.ttf", 8).with_note("smallest 8pt readable font"),
            )
            .with_face(
                FontFace::new("flottflott", "Flottflott.ttf", 11)
                    .with_note("unreadable below font size 11"),
            )
            .with_face(
                FontFace::new("press start", "prstartk.ttf", 6)
                    .with_note("a pixel art font readable at 6pt"),
            )
    }

    /// Add or replace an entry
    pub fn with_face(mut self, face: FontFace) -> Self {
        self.faces.retain(|existing| existing.name != face.name);
        self.faces.push(face);
        self
    }

    /// Directory font files are resolved against
    pub fn font_dir(&self) -> &Path {
        &self.font_dir
    }

    /// All entries in insertion order
    pub fn faces(&self) -> &[FontFace] {
        &self.faces
    }

    /// Name of the default face
    pub fn default_face(&self) -> &str {
        &self.default_face
    }

    /// Look up an entry by name, ignoring case
    pub fn face(&self, name: &str) -> Option<&FontFace> {
        let name = name.to_lowercase();
        self.faces.iter().find(|face| face.name == name)
    }

    /// Resolve a request to a face, file and size
    ///
    /// The file is looked up in the catalog directory first, then as given.
    ///
    /// # Errors
    ///
    /// Returns [`FontError::UnknownFont`] for names not in the catalog and
    /// [`FontError::FontFileMissing`] when the entry's file does not exist.
    pub fn resolve(&self, name: Option<&str>, size: Option<u32>) -> Result<FontSpec, FontError> {
        let requested = name.unwrap_or(&self.default_face);
        let face = self.face(requested).ok_or_else(|| FontError::UnknownFont {
            name: requested.to_string(),
        })?;
        let in_dir = self.font_dir.join(&face.file_name);
        let path = [in_dir.clone(), PathBuf::from(&face.file_name)]
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or(FontError::FontFileMissing { path: in_dir })?;
        Ok(FontSpec {
            name: face.name.clone(),
            path: Some(path),
            size: size.unwrap_or(face.default_size),
            is_default: face.name == self.default_face,
        })
    }
}
