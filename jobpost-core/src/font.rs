//! Typefaces and Sized Fonts
//!
//! Every `Typeface` is an outline font parsed with `ab_glyph`. DejaVu Sans
//! (regular and bold) is compiled into the crate, so loading never fails from
//! the caller's point of view: `Typeface::load` and `Typeface::discover`
//! degrade to the embedded face of the requested weight.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use ab_glyph::{point, Font as _, FontArc, GlyphId, PxScale, ScaleFont as _};
use image::{Rgb, RgbImage};
use thiserror::Error;
use tracing::{debug, warn};

use crate::raster::blend_pixel;

/// Extra pixels added below the reference glyph when advancing a line.
pub const LINE_PADDING: f32 = 4.0;

/// Largest pixel size a `Font` is rasterized at; larger requests are clamped.
pub const MAX_FONT_PX: f32 = 2048.0;

const REFERENCE_CHAR: &str = "A";

const EMBEDDED_REGULAR_TTF: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
const EMBEDDED_BOLD_TTF: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

static EMBEDDED_REGULAR: LazyLock<FontArc> = LazyLock::new(|| {
    FontArc::try_from_slice(EMBEDDED_REGULAR_TTF).expect("embedded DejaVuSans.ttf is a valid font")
});

static EMBEDDED_BOLD: LazyLock<FontArc> = LazyLock::new(|| {
    FontArc::try_from_slice(EMBEDDED_BOLD_TTF).expect("embedded DejaVuSans-Bold.ttf is a valid font")
});

/// Common system locations tried when no bold typeface is configured.
pub const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Common system locations tried when no regular typeface is configured.
pub const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Debug, Error)]
pub enum FontError {
    #[error("Failed to read font {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid font data: {0}")]
    Invalid(String),
}

/// Pixel measurements of rendered text.
pub trait TextMetrics {
    /// Horizontal extent of `text` in pixels.
    fn text_width(&self, text: &str) -> f32;

    /// Ink height of `text` in pixels (0 for blank text).
    fn text_height(&self, text: &str) -> f32;

    /// Vertical advance between wrapped lines.
    fn line_height(&self) -> f32 {
        (self.text_height(REFERENCE_CHAR) + LINE_PADDING).max(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

impl Weight {
    /// System paths probed for this weight, most preferred first.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Weight::Regular => REGULAR_CANDIDATES,
            Weight::Bold => BOLD_CANDIDATES,
        }
    }
}

#[derive(Clone)]
pub struct Typeface {
    font: FontArc,
    embedded: bool,
}

impl fmt::Debug for Typeface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typeface")
            .field("embedded", &self.embedded)
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl Default for Typeface {
    fn default() -> Self {
        Self::embedded(Weight::Regular)
    }
}

impl Typeface {
    /// The DejaVu Sans face compiled into the crate.
    pub fn embedded(weight: Weight) -> Self {
        let font = match weight {
            Weight::Regular => EMBEDDED_REGULAR.clone(),
            Weight::Bold => EMBEDDED_BOLD.clone(),
        };
        Self { font, embedded: true }
    }

    pub fn from_vec(data: Vec<u8>) -> Result<Self, FontError> {
        FontArc::try_from_vec(data)
            .map(|font| Self { font, embedded: false })
            .map_err(|e| FontError::Invalid(e.to_string()))
    }

    pub fn try_load(path: &Path) -> Result<Self, FontError> {
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_vec(data)
    }

    /// Load a typeface, substituting the embedded face of `weight` on any failure.
    pub fn load(path: &Path, weight: Weight) -> Self {
        match Self::try_load(path) {
            Ok(face) => {
                debug!(path = %path.display(), "loaded typeface");
                face
            }
            Err(e) => {
                warn!("{e}; using embedded DejaVu Sans");
                Self::embedded(weight)
            }
        }
    }

    /// Resolve a typeface from an explicit path, then the system paths for `weight`.
    pub fn discover(explicit: Option<&Path>, weight: Weight) -> Self {
        Self::discover_in(explicit, weight.candidates(), weight)
    }

    /// Like `discover`, probing `candidates` instead of the system paths.
    ///
    /// Missing candidates are skipped quietly; only a failing explicit path is
    /// reported. Falls back to the embedded face when nothing loads.
    pub fn discover_in(explicit: Option<&Path>, candidates: &[&str], weight: Weight) -> Self {
        if let Some(path) = explicit {
            match Self::try_load(path) {
                Ok(face) => return face,
                Err(e) => warn!("{e}; trying system fonts"),
            }
        }
        for candidate in candidates {
            if let Ok(face) = Self::try_load(Path::new(candidate)) {
                debug!(path = candidate, "discovered system typeface");
                return face;
            }
        }
        debug!(?weight, "no typeface found; using embedded DejaVu Sans");
        Self::embedded(weight)
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// Size the face; `px` is clamped to `1.0..=MAX_FONT_PX` (NaN becomes 1).
    pub fn at_size(&self, px: f32) -> Font {
        Font {
            font: self.font.clone(),
            px: px.max(1.0).min(MAX_FONT_PX),
        }
    }
}

/// A typeface at a fixed pixel size.
#[derive(Clone)]
pub struct Font {
    font: FontArc,
    px: f32,
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font").field("px", &self.px).finish()
    }
}

impl Font {
    /// Draw `text` with its top edge at `y`; the baseline sits one ascent below.
    pub fn draw(&self, canvas: &mut RgbImage, x: i64, y: i64, text: &str, color: Rgb<u8>) {
        let scale = PxScale::from(self.px);
        let scaled = self.font.as_scaled(scale);
        let baseline = y as f32 + scaled.ascent();
        let mut caret = x as f32;
        let mut prev: Option<GlyphId> = None;

        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(p) = prev {
                caret += scaled.kern(p, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            prev = Some(id);

            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                let left = bounds.min.x as i64;
                let top = bounds.min.y as i64;
                outlined.draw(|gx, gy, coverage| {
                    blend_pixel(canvas, left + gx as i64, top + gy as i64, color, coverage);
                });
            }
        }
    }
}

impl TextMetrics for Font {
    fn text_width(&self, text: &str) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(self.px));
        let mut width = 0.0;
        let mut prev: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    fn text_height(&self, text: &str) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(self.px));
        let mut bounds: Option<(f32, f32)> = None;
        for ch in text.chars() {
            let glyph = scaled.scaled_glyph(ch);
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let b = outlined.px_bounds();
                bounds = Some(match bounds {
                    Some((top, bottom)) => (top.min(b.min.y), bottom.max(b.max.y)),
                    None => (b.min.y, b.max.y),
                });
            }
        }
        bounds.map_or(0.0, |(top, bottom)| bottom - top)
    }
}
