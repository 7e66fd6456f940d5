//! Image Composer - Logo, Title, Blocks, Footer
//!
//! `Composer::compose` is a pure function of its inputs: no I/O, no clock,
//! no randomness. Encoding the returned buffer is the caller's job.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::blocks::{BlockTag, ContentBlock};
use crate::font::{Font, TextMetrics, Typeface, Weight};
use crate::raster::{fill_rect, overlay_rgba};
use crate::wrap::draw_wrapped;

pub const DEFAULT_FOOTER_TEXT: &str = "Generated with InstaJobPost";

/// Per-tag rendering parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSpec {
    /// Font size as a fraction of canvas width.
    pub font_scale: f32,
    pub color: [u8; 3],
    pub indent: i64,
    /// Vertical gap after the block, in pixels.
    pub gap_after: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterSpec {
    /// Bar height as a fraction of canvas height.
    pub height_fraction: f32,
    pub fill: [u8; 3],
    pub text: String,
    pub text_color: [u8; 3],
    pub font_scale: f32,
    pub inset: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub background: [u8; 3],
    pub logo_fraction: f32,
    pub logo_top: i64,
    pub title_color: [u8; 3],
    pub title_scale: f32,
    pub title_gap_above: i64,
    pub title_gap_below: i64,
    /// Wrap width as a fraction of canvas width, shared by every block tag.
    pub wrap_fraction: f32,
    pub heading: StyleSpec,
    pub body: StyleSpec,
    pub footer: FooterSpec,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: [245, 250, 255],
            logo_fraction: 0.15,
            logo_top: 30,
            title_color: [27, 107, 221],
            title_scale: 0.06,
            title_gap_above: 20,
            title_gap_below: 25,
            wrap_fraction: 0.85,
            heading: StyleSpec {
                font_scale: 0.045,
                color: [224, 60, 60],
                indent: 40,
                gap_after: 10,
            },
            body: StyleSpec {
                font_scale: 0.035,
                color: [72, 72, 75],
                indent: 40,
                gap_after: 8,
            },
            footer: FooterSpec {
                height_fraction: 0.05,
                fill: [230, 230, 230],
                text: DEFAULT_FOOTER_TEXT.to_string(),
                text_color: [44, 44, 44],
                font_scale: 0.03,
                inset: 20,
            },
        }
    }
}

impl Theme {
    pub fn style_for(&self, tag: BlockTag) -> &StyleSpec {
        match tag {
            BlockTag::Heading => &self.heading,
            BlockTag::Body => &self.body,
        }
    }
}

/// Bold face for title and headings, regular face for body and footer.
#[derive(Debug, Clone)]
pub struct Typefaces {
    pub bold: Typeface,
    pub regular: Typeface,
}

impl Default for Typefaces {
    fn default() -> Self {
        Self {
            bold: Typeface::embedded(Weight::Bold),
            regular: Typeface::embedded(Weight::Regular),
        }
    }
}

impl Typefaces {
    /// Resolve both faces from optional paths, then system fonts, then the embedded faces.
    pub fn discover(bold: Option<&Path>, regular: Option<&Path>) -> Self {
        Self {
            bold: Typeface::discover(bold, Weight::Bold),
            regular: Typeface::discover(regular, Weight::Regular),
        }
    }
}

struct FontSet {
    title: Font,
    heading: Font,
    body: Font,
    footer: Font,
}

impl FontSet {
    fn for_block(&self, tag: BlockTag) -> &Font {
        match tag {
            BlockTag::Heading => &self.heading,
            BlockTag::Body => &self.body,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Composer {
    typefaces: Typefaces,
    theme: Theme,
}

impl Composer {
    pub fn new(typefaces: Typefaces) -> Self {
        Self {
            typefaces,
            theme: Theme::default(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Render a complete post image of `width` x `height`.
    ///
    /// Never fails. Content taller than the canvas is clipped, not rearranged.
    pub fn compose(
        &self,
        logo: &RgbaImage,
        title: &str,
        blocks: &[ContentBlock],
        width: u32,
        height: u32,
    ) -> RgbImage {
        let theme = &self.theme;
        let mut canvas = RgbImage::from_pixel(width, height, Rgb(theme.background));
        let canvas_w = width as f32;

        // Logo
        let logo_size = (canvas_w * theme.logo_fraction) as u32;
        if logo_size > 0 && logo.width() > 0 && logo.height() > 0 {
            let resized = imageops::resize(logo, logo_size, logo_size, FilterType::Lanczos3);
            let logo_x = (width as i64 - logo_size as i64) / 2;
            overlay_rgba(&mut canvas, &resized, logo_x, theme.logo_top);
        }

        let fonts = self.font_set(canvas_w);

        // Title
        let title_w = fonts.title.text_width(title);
        let title_h = fonts.title.text_height(title);
        let mut y = theme.logo_top + logo_size as i64 + theme.title_gap_above;
        let title_x = ((canvas_w - title_w) / 2.0).floor() as i64;
        fonts.title.draw(&mut canvas, title_x, y, title, Rgb(theme.title_color));
        y += title_h as i64 + theme.title_gap_below;

        // Blocks
        let max_width = (canvas_w * theme.wrap_fraction).floor();
        for block in blocks {
            let style = theme.style_for(block.tag);
            y = draw_wrapped(
                &mut canvas,
                &block.text,
                fonts.for_block(block.tag),
                (style.indent, y),
                Rgb(style.color),
                max_width,
            );
            y += style.gap_after;
        }
        debug!(blocks = blocks.len(), cursor = y, height, "laid out content");

        // Footer
        let footer = &theme.footer;
        let footer_h = (height as f32 * footer.height_fraction) as u32;
        let footer_top = height as i64 - footer_h as i64;
        fill_rect(&mut canvas, 0, footer_top, width, footer_h, Rgb(footer.fill));
        let text_h = fonts.footer.text_height(&footer.text) as i64;
        let text_y = footer_top + (footer_h as i64 - text_h).div_euclid(2);
        fonts.footer.draw(
            &mut canvas,
            footer.inset,
            text_y,
            &footer.text,
            Rgb(footer.text_color),
        );

        canvas
    }

    fn font_set(&self, canvas_w: f32) -> FontSet {
        let theme = &self.theme;
        FontSet {
            title: self.typefaces.bold.at_size(size_px(canvas_w, theme.title_scale)),
            heading: self.typefaces.bold.at_size(size_px(canvas_w, theme.heading.font_scale)),
            body: self.typefaces.regular.at_size(size_px(canvas_w, theme.body.font_scale)),
            footer: self.typefaces.regular.at_size(size_px(canvas_w, theme.footer.font_scale)),
        }
    }
}

fn size_px(canvas_w: f32, scale: f32) -> f32 {
    (canvas_w * scale).floor().max(1.0)
}

/// Compose with the embedded typefaces and the default theme.
pub fn compose(
    logo: &RgbaImage,
    title: &str,
    blocks: &[ContentBlock],
    width: u32,
    height: u32,
) -> RgbImage {
    Composer::default().compose(logo, title, blocks, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logo::placeholder_logo;

    fn sample_blocks() -> Vec<ContentBlock> {
        vec![ContentBlock::heading("H1"), ContentBlock::body("line one")]
    }

    /// Anti-aliased edges blend; solid glyph interiors land within a few levels.
    fn has_ink_at(img: &RgbImage, x: u32, y: u32, color: [u8; 3]) -> bool {
        img.get_pixel(x, y)
            .0
            .iter()
            .zip(color)
            .all(|(a, b)| a.abs_diff(b) <= 8)
    }

    fn has_ink(img: &RgbImage, color: [u8; 3]) -> bool {
        img.enumerate_pixels().any(|(x, y, _)| has_ink_at(img, x, y, color))
    }

    #[test]
    fn test_canvas_matches_requested_size() {
        let img = compose(&placeholder_logo(), "Test Title", &sample_blocks(), 1080, 1080);
        assert_eq!(img.dimensions(), (1080, 1080));
    }

    #[test]
    fn test_footer_band_occupies_bottom_five_percent() {
        let img = compose(&placeholder_logo(), "Test Title", &sample_blocks(), 1080, 1080);
        let fill = Rgb([230, 230, 230]);
        // right edge is clear of the attribution text
        for y in 1026..1080 {
            assert_eq!(*img.get_pixel(1079, y), fill, "row {y}");
        }
        assert_eq!(*img.get_pixel(1079, 1025), Rgb([245, 250, 255]));
    }

    #[test]
    fn test_logo_is_centered_below_top_margin() {
        let img = compose(&placeholder_logo(), "", &[], 1000, 1000);
        // logo is 150px at x=425, y=30; its centre is the darker disk
        assert_eq!(*img.get_pixel(500, 29), Rgb([245, 250, 255]));
        let centre = img.get_pixel(500, 105);
        assert!(centre.0.iter().all(|c| c.abs_diff(150) <= 2), "{centre:?}");
        assert_eq!(*img.get_pixel(424, 105), Rgb([245, 250, 255]));
    }

    #[test]
    fn test_transparent_logo_shows_background() {
        let logo = RgbaImage::new(20, 20);
        let img = compose(&logo, "", &[], 400, 400);
        assert_eq!(*img.get_pixel(200, 40), Rgb([245, 250, 255]));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let blocks = vec![
            ContentBlock::heading("BEL Recruitment 2025 - Vacancy Details"),
            ContentBlock::body("Maximum Age: 25 years"),
            ContentBlock::body("ICWA (Inter) or CA (Inter)"),
        ];
        let a = compose(&placeholder_logo(), "Indian Army 2025", &blocks, 1200, 627);
        let b = compose(&placeholder_logo(), "Indian Army 2025", &blocks, 1200, 627);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_empty_blocks_still_render_title_and_footer() {
        let img = compose(&placeholder_logo(), "Title Only", &[], 1080, 1080);
        assert!(has_ink(&img, [27, 107, 221]));
        assert_eq!(*img.get_pixel(1079, 1079), Rgb([230, 230, 230]));
    }

    #[test]
    fn test_heading_and_body_colors_drawn() {
        let img = compose(&placeholder_logo(), "T", &sample_blocks(), 1080, 1080);
        assert!(has_ink(&img, [224, 60, 60]));
        assert!(has_ink(&img, [72, 72, 75]));
    }

    #[test]
    fn test_logo_is_not_mutated() {
        let logo = placeholder_logo();
        let before = logo.clone();
        let _ = compose(&logo, "T", &sample_blocks(), 640, 640);
        assert_eq!(logo, before);
    }

    #[test]
    fn test_tiny_canvas_does_not_panic() {
        let img = compose(&placeholder_logo(), "Overflowing title", &sample_blocks(), 3, 2);
        assert_eq!(img.dimensions(), (3, 2));
    }

    #[test]
    fn test_missing_typefaces_degrade_to_embedded() {
        let faces = Typefaces {
            bold: Typeface::load(Path::new("/missing/arialbd.ttf"), Weight::Bold),
            regular: Typeface::load(Path::new("/missing/arial.ttf"), Weight::Regular),
        };
        assert!(faces.bold.is_embedded() && faces.regular.is_embedded());
        let img = Composer::new(faces).compose(&placeholder_logo(), "T", &sample_blocks(), 1080, 1080);
        let reference = compose(&placeholder_logo(), "T", &sample_blocks(), 1080, 1080);
        assert_eq!(img.as_raw(), reference.as_raw());
    }

    #[test]
    fn test_footer_text_is_inked_inside_band() {
        let img = compose(&placeholder_logo(), "Test Title", &sample_blocks(), 1080, 1080);
        let inked_rows: Vec<u32> = (0..1080)
            .filter(|&y| (0..540).any(|x| has_ink_at(&img, x, y, [44, 44, 44])))
            .collect();
        assert!(!inked_rows.is_empty());
        assert!(inked_rows.iter().all(|&y| (1026..1080).contains(&y)), "{inked_rows:?}");
    }

    #[test]
    fn test_block_cursor_uses_outline_line_height() {
        let theme = Theme::default();
        let body = Typefaces::default().regular.at_size(size_px(1080.0, theme.body.font_scale));
        assert_eq!(body.line_height(), body.text_height("A") + 4.0);

        // a second body line lands one line height plus the gap further down
        let one = vec![ContentBlock::body("H")];
        let two = vec![ContentBlock::body("H"), ContentBlock::body("H")];
        let a = compose(&placeholder_logo(), "T", &one, 1080, 1080);
        let b = compose(&placeholder_logo(), "T", &two, 1080, 1080);
        let last_ink = |img: &RgbImage| {
            (0..1000u32)
                .rev()
                .find(|&y| (40..200).any(|x| has_ink_at(img, x, y, [72, 72, 75])))
        };
        let step = last_ink(&b).unwrap() - last_ink(&a).unwrap();
        let expected = body.line_height().round() as u32 + theme.body.gap_after as u32;
        assert_eq!(step, expected);
    }
}
