//! Pixel compositor.
//!
//! Every draw primitive ends up here: a rectangular destination window, an
//! optional source image, an optional 8-bit coverage mask and a layer opacity.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::primitives::Rectangle;
use log::warn;

use super::DrawCtx;
use super::color::{OPA_MAX, OPA_MIN, mix_with_alpha, scale_opa};
use crate::config::BlendWalk;
use crate::ui::core::AreaExt;

/// What to composite and where.
#[derive(Debug, Clone, Copy)]
pub struct BlendDesc<'a> {
    /// Screen area covered by `src` and `mask`.
    pub dst_area: Rectangle,
    /// Row-major source pixels, stride `dst_area.width`.
    pub src: Option<&'a [Rgb565]>,
    /// Row-major coverage, same geometry as `src`.
    pub mask: Option<&'a [u8]>,
    /// Solid color used when `src` is absent.
    pub color_fill: Rgb565,
    pub opa: u8,
}

impl<'a> BlendDesc<'a> {
    pub fn fill(dst_area: Rectangle, color: Rgb565, opa: u8) -> Self {
        Self {
            dst_area,
            src: None,
            mask: None,
            color_fill: color,
            opa,
        }
    }

    pub fn with_mask(mut self, mask: &'a [u8]) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_src(mut self, src: &'a [Rgb565]) -> Self {
        self.src = Some(src);
        self
    }
}

/// Resolved blend window: every slice starts at the first pixel to touch.
pub struct FillCache<'a> {
    pub dst: &'a mut [Rgb565],
    pub dst_stride: usize,
    pub src: Option<&'a [Rgb565]>,
    pub src_stride: usize,
    pub mask: Option<&'a [u8]>,
    pub mask_stride: usize,
    pub width: usize,
    pub height: usize,
    pub color: Rgb565,
    pub opa: u8,
}

impl FillCache<'_> {
    #[inline]
    fn coverage(&self, x: usize, y: usize) -> u8 {
        match self.mask {
            Some(mask) => {
                let raw = mask[y * self.mask_stride + x];
                if self.opa >= OPA_MAX {
                    raw
                } else {
                    scale_opa(raw, self.opa)
                }
            }
            None => self.opa,
        }
    }

    #[inline]
    fn blend_pixel(&mut self, x: usize, y: usize) {
        let opa = self.coverage(x, y);
        if opa <= OPA_MIN {
            return;
        }
        let fg = match self.src {
            Some(src) => src[y * self.src_stride + x],
            None => self.color,
        };
        let d = &mut self.dst[y * self.dst_stride + x];
        *d = mix_with_alpha(*d, fg, opa);
    }

    /// Copy or fill a full row when it is entirely opaque.
    fn try_opaque_row(&mut self, y: usize) -> bool {
        if self.opa < OPA_MAX {
            return false;
        }
        if let Some(mask) = self.mask {
            let row = &mask[y * self.mask_stride..y * self.mask_stride + self.width];
            if row.iter().any(|&m| m < OPA_MAX) {
                return false;
            }
        }
        let start = y * self.dst_stride;
        let dst = &mut self.dst[start..start + self.width];
        match self.src {
            Some(src) => {
                let s = y * self.src_stride;
                dst.copy_from_slice(&src[s..s + self.width]);
            }
            None => dst.fill(self.color),
        }
        true
    }
}

/// Composite a resolved window.
pub fn blend_fill(cache: &mut FillCache<'_>, walk: BlendWalk) {
    if cache.width == 0 || cache.height == 0 || cache.opa <= OPA_MIN {
        return;
    }

    match walk {
        BlendWalk::Horizontal => {
            for y in 0..cache.height {
                if cache.try_opaque_row(y) {
                    continue;
                }
                for x in 0..cache.width {
                    cache.blend_pixel(x, y);
                }
            }
        }
        BlendWalk::Vertical => {
            if cache.opa >= OPA_MAX && cache.mask.is_none() {
                for y in 0..cache.height {
                    cache.try_opaque_row(y);
                }
                return;
            }
            for x in 0..cache.width {
                for y in 0..cache.height {
                    cache.blend_pixel(x, y);
                }
            }
        }
    }
}

/// Clip `desc` against the buffer and the context clip, then composite it.
pub fn blend(ctx: &mut DrawCtx<'_>, desc: &BlendDesc<'_>) {
    if desc.opa <= OPA_MIN {
        return;
    }
    let Some(visible) = ctx
        .buf_area
        .clip(&ctx.clip)
        .and_then(|a| a.clip(&desc.dst_area))
    else {
        return;
    };

    let src_stride = desc.dst_area.size.width as usize;
    let needed = src_stride * desc.dst_area.size.height as usize;
    if desc.src.is_some_and(|s| s.len() < needed) || desc.mask.is_some_and(|m| m.len() < needed)
    {
        warn!("Blend source smaller than its {:?} area", desc.dst_area.size);
        return;
    }

    let dst_stride = ctx.buf_area.size.width as usize;
    let dst_offset = (visible.top_left.y - ctx.buf_area.top_left.y) as usize * dst_stride
        + (visible.top_left.x - ctx.buf_area.top_left.x) as usize;
    let src_offset = (visible.top_left.y - desc.dst_area.top_left.y) as usize * src_stride
        + (visible.top_left.x - desc.dst_area.top_left.x) as usize;

    let mut cache = FillCache {
        dst: &mut ctx.buf[dst_offset..],
        dst_stride,
        src: desc.src.map(|s| &s[src_offset..]),
        src_stride,
        mask: desc.mask.map(|m| &m[src_offset..]),
        mask_stride: src_stride,
        width: visible.size.width as usize,
        height: visible.size.height as usize,
        color: desc.color_fill,
        opa: desc.opa,
    };
    blend_fill(&mut cache, ctx.walk);
}
