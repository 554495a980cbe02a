//! Coverage masks for anti-aliased shapes and glyphs.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use super::color::OPA_COVER;

/// Subsamples per axis used for corner anti-aliasing.
const SUBSAMPLES: i32 = 4;

/// Coverage of pixel `(px, py)` inside a `w`x`h` rectangle with rounded
/// corners of radius `r`. Coordinates are relative to the rectangle.
pub fn rounded_rect_coverage(px: i32, py: i32, w: i32, h: i32, r: i32) -> u8 {
    if px < 0 || py < 0 || px >= w || py >= h {
        return 0;
    }
    let r = r.min(w / 2).min(h / 2);
    if r <= 0 || (px >= r && px < w - r) || (py >= r && py < h - r) {
        return OPA_COVER;
    }

    // Work in 1/(2*SUBSAMPLES) pixel units so subsample centers are integers.
    // Squared distances of large radii exceed i32.
    let unit = 2 * SUBSAMPLES as i64;
    let (px, py, w, h, r) = (px as i64, py as i64, w as i64, h as i64, r as i64);
    let left = unit * r;
    let right = unit * (w - r);
    let top = unit * r;
    let bottom = unit * (h - r);
    let r2 = (unit * r) * (unit * r);

    let mut hits = 0;
    for sy in 0..SUBSAMPLES as i64 {
        let y = unit * py + 2 * sy + 1;
        let dy = if y < top {
            top - y
        } else if y > bottom {
            y - bottom
        } else {
            0
        };
        for sx in 0..SUBSAMPLES as i64 {
            let x = unit * px + 2 * sx + 1;
            let dx = if x < left {
                left - x
            } else if x > right {
                x - right
            } else {
                0
            };
            if dx * dx + dy * dy <= r2 {
                hits += 1;
            }
        }
    }
    (hits * OPA_COVER as i32 / (SUBSAMPLES * SUBSAMPLES)) as u8
}

/// Coverage of a border ring `width` pixels thick.
pub fn border_coverage(px: i32, py: i32, w: i32, h: i32, r: i32, width: i32) -> u8 {
    let outer = rounded_rect_coverage(px, py, w, h, r);
    if outer == 0 {
        return 0;
    }
    let inner = rounded_rect_coverage(
        px - width,
        py - width,
        w - 2 * width,
        h - 2 * width,
        (r - width).max(0),
    );
    outer.saturating_sub(inner)
}

/// Monochrome render target that records glyph coverage.
pub struct MaskCanvas {
    size: Size,
    data: Vec<u8>,
}

impl MaskCanvas {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            data: vec![0; (size.width * size.height) as usize],
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl OriginDimensions for MaskCanvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for MaskCanvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let w = self.size.width as i32;
        let h = self.size.height as i32;
        for Pixel(p, color) in pixels {
            if color.is_on() && p.x >= 0 && p.y >= 0 && p.x < w && p.y < h {
                self.data[(p.y * w + p.x) as usize] = OPA_COVER;
            }
        }
        Ok(())
    }
}
