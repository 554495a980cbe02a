//! RGB565 color math and opacity constants.
//!
//! # RGB565 Format
//! - Red: 5 bits (0-31)
//! - Green: 6 bits (0-63)
//! - Blue: 5 bits (0-31)
//!
//! To convert from 8-bit RGB: R>>3, G>>2, B>>3

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

// ============================================================================
// Opacity
// ============================================================================

/// Fully transparent.
pub const OPA_TRANSP: u8 = 0;
/// At or below this opacity nothing is drawn.
pub const OPA_MIN: u8 = 2;
/// At or above this opacity the foreground replaces the background.
pub const OPA_MAX: u8 = 253;
/// Fully opaque.
pub const OPA_COVER: u8 = 255;
pub const OPA_50: u8 = 127;
/// Opacity of disabled objects.
pub const OPA_60: u8 = 153;

/// Map a percentage (0..=100) onto the opacity range.
pub const fn opa_percent(percent: u8) -> u8 {
    let p = if percent > 100 { 100 } else { percent };
    ((p as u16 * 255 + 50) / 100) as u8
}

// ============================================================================
// Base Colors
// ============================================================================

pub const BLACK: Rgb565 = Rgb565::new(0, 0, 0);
pub const WHITE: Rgb565 = Rgb565::new(255 >> 3, 255 >> 2, 255 >> 3);
pub const RED: Rgb565 = Rgb565::new(255 >> 3, 0, 0);
pub const GREEN: Rgb565 = Rgb565::new(0, 255 >> 2, 0);
pub const BLUE: Rgb565 = Rgb565::new(0, 0, 255 >> 3);
pub const GRAY: Rgb565 = Rgb565::new(128 >> 3, 128 >> 2, 128 >> 3);

/// Convert `0xRRGGBB` into RGB565.
pub const fn color_hex(hex: u32) -> Rgb565 {
    let r = ((hex >> 16) & 0xFF) as u8;
    let g = ((hex >> 8) & 0xFF) as u8;
    let b = (hex & 0xFF) as u8;
    Rgb565::new(r >> 3, g >> 2, b >> 3)
}

// ============================================================================
// Mixing
// ============================================================================

/// Exact `x / 255` for `x` below 2^16 + 2^15, without a division.
#[inline]
pub const fn udiv255(x: u32) -> u32 {
    (x * 0x8081) >> 23
}

/// `n / 255` in Q15, rounded. Used to scale mask coverage by a layer opacity.
#[inline]
pub const fn per_255(n: u8) -> u32 {
    (n as u32 * 32768 + 127) / 255
}

/// Scale mask coverage by a layer opacity.
#[inline]
pub const fn scale_opa(mask: u8, opa: u8) -> u8 {
    ((per_255(mask) * opa as u32) >> 15) as u8
}

#[inline]
const fn mix_channel(c1: u8, c2: u8, mix: u8) -> u8 {
    let m = mix as u32;
    udiv255(c1 as u32 * m + c2 as u32 * (255 - m) + 128) as u8
}

/// Weighted mix of two colors; `mix` is the weight of `c1`.
#[inline]
pub fn mix(c1: Rgb565, c2: Rgb565, mix: u8) -> Rgb565 {
    Rgb565::new(
        mix_channel(c1.r(), c2.r(), mix),
        mix_channel(c1.g(), c2.g(), mix),
        mix_channel(c1.b(), c2.b(), mix),
    )
}

/// Composite `fg` at `fg_opa` over an opaque background.
#[inline]
pub fn mix_with_alpha(bg: Rgb565, fg: Rgb565, fg_opa: u8) -> Rgb565 {
    if fg_opa >= OPA_MAX {
        fg
    } else if fg_opa <= OPA_MIN {
        bg
    } else {
        mix(fg, bg, fg_opa)
    }
}
