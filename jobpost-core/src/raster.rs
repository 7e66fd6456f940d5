//! Pixel helpers for the RGB canvas

use image::{Rgb, RgbImage, RgbaImage};

/// Blend `color` into the pixel at (`x`, `y`) with the given coverage in `0.0..=1.0`.
///
/// Out-of-bounds coordinates are ignored.
pub fn blend_pixel(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let a = coverage.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let inv = 1.0 - a;
    for c in 0..3 {
        dst.0[c] = (color.0[c] as f32 * a + dst.0[c] as f32 * inv).round() as u8;
    }
}

/// Fill an axis-aligned rectangle, clipped to the canvas.
pub fn fill_rect(canvas: &mut RgbImage, x: i64, y: i64, width: u32, height: u32, color: Rgb<u8>) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + width as i64).min(canvas.width() as i64);
    let y1 = (y + height as i64).min(canvas.height() as i64);
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px as u32, py as u32, color);
        }
    }
}

/// Composite an RGBA image onto the canvas using its own alpha channel.
pub fn overlay_rgba(canvas: &mut RgbImage, over: &RgbaImage, x: i64, y: i64) {
    for (ox, oy, p) in over.enumerate_pixels() {
        let alpha = p.0[3] as f32 / 255.0;
        blend_pixel(
            canvas,
            x + ox as i64,
            y + oy as i64,
            Rgb([p.0[0], p.0[1], p.0[2]]),
            alpha,
        );
    }
}
