//! Draw attributes handed to the draw primitives.
//!
//! Widgets keep their own style payloads and translate them into these
//! attribute structs each time they render.

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::ascii::{FONT_5X8, FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Alignment;

use super::color::{BLACK, OPA_COVER, OPA_TRANSP, WHITE};

// ============================================================================
// Rectangles
// ============================================================================

/// Background and border of a rectangular element
///
/// Use the builder pattern to construct attributes incrementally.
///
/// # Examples
///
/// ```ignore
/// // Card with a 2px border and rounded corners
/// let attr = RectAttr::new()
///     .with_background(WHITE)
///     .with_border(GRAY, 2)
///     .with_radius(8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectAttr {
    /// Background fill color
    pub bg_color: Rgb565,

    /// Opacity applied to fill and border
    pub bg_opa: u8,

    /// Border color
    pub border_color: Rgb565,

    /// Border width in pixels (0 = no border)
    pub border_width: u16,

    /// Corner radius in pixels
    pub radius: u16,

    /// Paint the interior; outline-only when false
    pub is_fill: bool,
}

impl Default for RectAttr {
    /// Opaque white fill, square corners, no border
    fn default() -> Self {
        Self {
            bg_color: WHITE,
            bg_opa: OPA_COVER,
            border_color: BLACK,
            border_width: 0,
            radius: 0,
            is_fill: true,
        }
    }
}

impl RectAttr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, color: Rgb565) -> Self {
        self.bg_color = color;
        self
    }

    /// Sets the border color and width
    ///
    /// A width of 0 effectively disables the border.
    ///
    /// # Arguments
    /// * `color` - RGB565 color value for the border
    /// * `width` - Border width in pixels
    pub fn with_border(mut self, color: Rgb565, width: u16) -> Self {
        self.border_color = color;
        self.border_width = width;
        self
    }

    pub fn with_radius(mut self, radius: u16) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_opa(mut self, opa: u8) -> Self {
        self.bg_opa = opa;
        self
    }

    /// Draw only the border ring.
    pub fn outline_only(mut self) -> Self {
        self.is_fill = false;
        self
    }

    pub fn is_visible(&self) -> bool {
        self.bg_opa > OPA_TRANSP && (self.is_fill || self.border_width > 0)
    }
}

// ============================================================================
// Text
// ============================================================================

/// Text size variants
///
/// Provides three preset text sizes with corresponding embedded-graphics fonts:
/// - `Small`: 5x8 font
/// - `Medium`: 6x10 font (default)
/// - `Large`: 10x20 font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl TextSize {
    pub fn font(&self) -> &'static MonoFont<'static> {
        match self {
            TextSize::Small => &FONT_5X8,
            TextSize::Medium => &FONT_6X10,
            TextSize::Large => &FONT_10X20,
        }
    }
}

/// How a run of text is placed in its area.
#[derive(Debug, Clone, Copy)]
pub struct FontAttr<'a> {
    pub text: &'a str,
    pub font: &'static MonoFont<'static>,
    pub color: Rgb565,
    pub opa: u8,
    pub align: Alignment,
}

impl<'a> FontAttr<'a> {
    pub fn new(text: &'a str, size: TextSize) -> Self {
        Self {
            text,
            font: size.font(),
            color: BLACK,
            opa: OPA_COVER,
            align: Alignment::Left,
        }
    }

    pub fn with_color(mut self, color: Rgb565) -> Self {
        self.color = color;
        self
    }

    pub fn with_opa(mut self, opa: u8) -> Self {
        self.opa = opa;
        self
    }

    pub fn with_alignment(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }
}

// ============================================================================
// Images
// ============================================================================

/// Decoded RGB565 image with an optional alpha plane.
#[derive(Debug, Clone, Copy)]
pub struct ImgDsc<'a> {
    pub size: Size,
    pub pixels: &'a [Rgb565],
    pub alpha: Option<&'a [u8]>,
    pub opa: u8,
}

impl<'a> ImgDsc<'a> {
    pub fn new(size: Size, pixels: &'a [Rgb565]) -> Self {
        Self {
            size,
            pixels,
            alpha: None,
            opa: OPA_COVER,
        }
    }

    pub fn with_alpha(mut self, alpha: &'a [u8]) -> Self {
        self.alpha = Some(alpha);
        self
    }
}
