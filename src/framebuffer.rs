//! RAM framebuffer with dirty-rectangle tracking.
//!
//! The compositor renders invalid areas into this buffer. Afterwards only
//! the bounding rectangle of everything touched since the last flush is
//! sent to the panel, in a single `fill_contiguous` transaction.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

use crate::ui::core::AreaExt;

/// Bounding box of pixels that have changed since the last flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DirtyRect {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl DirtyRect {
    /// Expand the dirty region to include the given inclusive box.
    fn expand(&mut self, other: DirtyRect) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    fn from_point(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn to_rectangle(self) -> Rectangle {
        Rectangle::new(
            Point::new(self.min_x as i32, self.min_y as i32),
            Size::new(
                (self.max_x - self.min_x + 1) as u32,
                (self.max_y - self.min_y + 1) as u32,
            ),
        )
    }
}

/// Screen-sized pixel buffer implementing `DrawTarget<Color = Rgb565>`.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb565>,
    dirty: Option<DirtyRect>,
}

impl FrameBuffer {
    /// Allocate a framebuffer filled with black pixels.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: width as usize,
            height: height as usize,
            pixels: vec![Rgb565::BLACK; width as usize * height as usize],
            dirty: None,
        }
    }

    pub fn area(&self) -> Rectangle {
        Rectangle::new(Point::zero(), self.size())
    }

    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Rgb565] {
        &mut self.pixels
    }

    pub fn pixel(&self, p: Point) -> Option<Rgb565> {
        if !self.area().contains_point(p) {
            return None;
        }
        Some(self.pixels[p.y as usize * self.width + p.x as usize])
    }

    /// Area touched since the last flush.
    pub fn dirty_area(&self) -> Option<Rectangle> {
        self.dirty.map(DirtyRect::to_rectangle)
    }

    /// Record that `area` was written behind the buffer's back.
    pub(crate) fn mark_dirty(&mut self, area: &Rectangle) {
        let Some(a) = area.clip(&self.area()) else {
            return;
        };
        let rect = DirtyRect {
            min_x: a.top_left.x as usize,
            min_y: a.top_left.y as usize,
            max_x: (a.x2() - 1) as usize,
            max_y: (a.y2() - 1) as usize,
        };
        match &mut self.dirty {
            Some(d) => d.expand(rect),
            None => self.dirty = Some(rect),
        }
    }

    /// Write a single pixel, expanding the dirty rect only if the color changed.
    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb565) {
        let idx = y * self.width + x;
        if self.pixels[idx] != color {
            self.pixels[idx] = color;
            let point = DirtyRect::from_point(x, y);
            match &mut self.dirty {
                Some(rect) => rect.expand(point),
                None => self.dirty = Some(point),
            }
        }
    }

    /// Flush the dirty region to a hardware display, then reset the dirty state.
    ///
    /// If nothing changed, this is a no-op.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(rect) = self.dirty.take() else {
            return Ok(());
        };
        let area = rect.to_rectangle();
        let width = area.size.width as usize;

        debug!(
            "Flushing {}x{} dirty region at ({}, {})",
            area.size.width, area.size.height, rect.min_x, rect.min_y
        );

        // Borrow the pixel slice so the closure captures a shared reference,
        // avoiding the `FnMut` escaping-reference issue with `&mut self`.
        let pixels = &self.pixels;
        let stride = self.width;
        let pixel_iter = (rect.min_y..=rect.max_y).flat_map(move |y| {
            let row_start = y * stride + rect.min_x;
            pixels[row_start..row_start + width].iter().copied()
        });

        display.fill_contiguous(&area, pixel_iter)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x >= 0
                && coord.y >= 0
                && (coord.x as usize) < self.width
                && (coord.y as usize) < self.height
            {
                self.set_pixel(coord.x as usize, coord.y as usize, color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let Some(a) = area.clip(&self.area()) else {
            return Ok(());
        };
        for y in a.top_left.y..a.y2() {
            for x in a.top_left.x..a.x2() {
                self.set_pixel(x as usize, y as usize, color);
            }
        }
        Ok(())
    }
}
