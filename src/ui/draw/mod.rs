//! Draw primitives built on the compositor.
//!
//! A [`DrawCtx`] wraps the pixel buffer being rendered together with the
//! area it represents on screen and the current clip. Widgets draw through
//! the functions here; none of them write outside `clip`.

pub mod blend;
pub mod color;
pub mod mask;
pub mod style;

use alloc::vec;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::{BinaryColor, Rgb565};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use crate::config::BlendWalk;
use crate::ui::core::{AreaExt, area};
use crate::ui::object::Obj;
use blend::{BlendDesc, blend};
use color::BLACK;
use mask::{MaskCanvas, border_coverage, rounded_rect_coverage};
use style::{FontAttr, ImgDsc, RectAttr};

pub struct DrawCtx<'a> {
    pub(crate) buf: &'a mut [Rgb565],
    pub(crate) buf_area: Rectangle,
    pub(crate) clip: Rectangle,
    pub(crate) walk: BlendWalk,
    pub(crate) focus_color: Rgb565,
}

impl<'a> DrawCtx<'a> {
    /// `buf` holds `buf_area` row-major.
    pub fn new(
        buf: &'a mut [Rgb565],
        buf_area: Rectangle,
        walk: BlendWalk,
        focus_color: Rgb565,
    ) -> Self {
        Self {
            buf,
            buf_area,
            clip: buf_area,
            walk,
            focus_color,
        }
    }

    pub fn buf_area(&self) -> Rectangle {
        self.buf_area
    }

    pub fn clip(&self) -> Rectangle {
        self.clip
    }

    pub fn set_clip(&mut self, clip: Rectangle) {
        self.clip = clip;
    }

    pub fn walk(&self) -> BlendWalk {
        self.walk
    }
}

/// Background fill plus optional border, with anti-aliased corners.
pub fn draw_bg(ctx: &mut DrawCtx<'_>, attr: &RectAttr, coords: &Rectangle) {
    if !attr.is_visible() || coords.is_zero_sized() {
        return;
    }
    let Some(visible) = coords.clip(&ctx.clip).and_then(|a| a.clip(&ctx.buf_area)) else {
        return;
    };

    let w = coords.size.width as i32;
    let h = coords.size.height as i32;
    let r = (attr.radius as i32).min(w / 2).min(h / 2);
    let bw = (attr.border_width as i32).min(w / 2).min(h / 2);
    let ox = visible.top_left.x - coords.top_left.x;
    let mut mask = vec![0u8; visible.size.width as usize];

    for y in visible.top_left.y..visible.y2() {
        let py = y - coords.top_left.y;
        let row = area(visible.top_left.x, y, visible.size.width, 1);

        if attr.is_fill {
            let fill = BlendDesc::fill(row, attr.bg_color, attr.bg_opa);
            if py >= r && py < h - r {
                blend(ctx, &fill);
            } else {
                for (i, m) in mask.iter_mut().enumerate() {
                    *m = rounded_rect_coverage(ox + i as i32, py, w, h, r);
                }
                blend(ctx, &fill.with_mask(&mask));
            }
        }

        if bw > 0 {
            for (i, m) in mask.iter_mut().enumerate() {
                *m = border_coverage(ox + i as i32, py, w, h, r, bw);
            }
            let border = BlendDesc::fill(row, attr.border_color, attr.bg_opa).with_mask(&mask);
            blend(ctx, &border);
        }
    }
}

/// Render `attr.text` inside `coords`, returning the area the glyphs cover.
pub fn draw_text(ctx: &mut DrawCtx<'_>, attr: &FontAttr<'_>, coords: &Rectangle) -> Rectangle {
    let empty = Rectangle::new(coords.top_left, Size::zero());
    if attr.text.is_empty() || coords.is_zero_sized() {
        return empty;
    }

    let anchor_x = match attr.align {
        Alignment::Left => 0,
        Alignment::Center => coords.size.width as i32 / 2,
        Alignment::Right => coords.size.width as i32 - 1,
    };
    let character_style = MonoTextStyle::new(attr.font, BinaryColor::On);
    let text_style = TextStyleBuilder::new()
        .alignment(attr.align)
        .baseline(Baseline::Top)
        .build();
    let text = Text::with_text_style(
        attr.text,
        Point::new(anchor_x, 0),
        character_style,
        text_style,
    );

    let mut canvas = MaskCanvas::new(coords.size);
    text.draw(&mut canvas).ok();

    blend(
        ctx,
        &BlendDesc::fill(*coords, attr.color, attr.opa).with_mask(canvas.data()),
    );

    text.bounding_box()
        .clip(&Rectangle::new(Point::zero(), coords.size))
        .map(|b| b.translate(coords.top_left))
        .unwrap_or(empty)
}

/// Blit an image with its top-left corner at `pos`.
pub fn draw_img(ctx: &mut DrawCtx<'_>, img: &ImgDsc<'_>, pos: Point) -> Rectangle {
    let dst = Rectangle::new(pos, img.size);
    let mut desc = BlendDesc::fill(dst, BLACK, img.opa).with_src(img.pixels);
    if let Some(alpha) = img.alpha {
        desc = desc.with_mask(alpha);
    }
    blend(ctx, &desc);
    dst
}

/// One-pixel outline around a focused object.
pub fn draw_focus(ctx: &mut DrawCtx<'_>, obj: &Obj, radius: u16) {
    let flags = obj.flags();
    if !flags.focus || flags.focus_disabled {
        return;
    }
    let attr = RectAttr::new()
        .with_border(ctx.focus_color, 1)
        .with_radius(radius)
        .with_opa(obj.opa())
        .outline_only();
    draw_bg(ctx, &attr, &obj.area());
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::color::{BLUE, OPA_COVER, RED, WHITE};
    use super::style::TextSize;
    use super::*;

    fn canvas(w: u32, h: u32) -> Vec<Rgb565> {
        vec![BLACK; (w * h) as usize]
    }

    #[test]
    fn test_bg_square_fills_exactly() {
        let mut buf = canvas(10, 10);
        let mut ctx = DrawCtx::new(&mut buf, area(0, 0, 10, 10), BlendWalk::Horizontal, BLUE);
        draw_bg(&mut ctx, &RectAttr::new().with_background(RED), &area(2, 2, 4, 3));
        assert_eq!(buf.iter().filter(|&&c| c == RED).count(), 12);
        assert_eq!(buf[2 * 10 + 2], RED);
        assert_eq!(buf[5 * 10 + 2], BLACK);
    }

    #[test]
    fn test_bg_rounded_corner_is_softened() {
        let mut buf = canvas(20, 20);
        let mut ctx = DrawCtx::new(&mut buf, area(0, 0, 20, 20), BlendWalk::Vertical, BLUE);
        let attr = RectAttr::new().with_background(WHITE).with_radius(6);
        draw_bg(&mut ctx, &attr, &area(0, 0, 20, 20));
        assert_eq!(buf[0], BLACK);
        assert_eq!(buf[10 * 20 + 10], WHITE);
        assert_eq!(buf[10], WHITE);
    }

    #[test]
    fn test_border_leaves_interior_untouched() {
        let mut buf = canvas(10, 10);
        let mut ctx = DrawCtx::new(&mut buf, area(0, 0, 10, 10), BlendWalk::Horizontal, BLUE);
        let attr = RectAttr::new().with_border(RED, 1).outline_only();
        draw_bg(&mut ctx, &attr, &area(0, 0, 10, 10));
        assert_eq!(buf[0], RED);
        assert_eq!(buf[5 * 10 + 9], RED);
        assert_eq!(buf[5 * 10 + 5], BLACK);
    }

    #[test]
    fn test_text_reports_glyph_bounds() {
        let mut buf = canvas(40, 12);
        let mut ctx = DrawCtx::new(&mut buf, area(0, 0, 40, 12), BlendWalk::Horizontal, BLUE);
        let attr = FontAttr::new("Hi", TextSize::Medium).with_color(WHITE);
        let bounds = draw_text(&mut ctx, &attr, &area(4, 1, 36, 11));
        assert_eq!(bounds, area(4, 1, 12, 10));

        let lit: Vec<usize> = (0..buf.len()).filter(|&i| buf[i] == WHITE).collect();
        assert!(!lit.is_empty());
        for i in lit {
            let p = Point::new((i % 40) as i32, (i / 40) as i32);
            assert!(bounds.contains_point(p));
        }
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let mut buf = canvas(8, 8);
        let mut ctx = DrawCtx::new(&mut buf, area(0, 0, 8, 8), BlendWalk::Horizontal, BLUE);
        let bounds = draw_text(&mut ctx, &FontAttr::new("", TextSize::Small), &area(0, 0, 8, 8));
        assert!(bounds.is_zero_sized());
        assert!(buf.iter().all(|&c| c == BLACK));
    }

    #[test]
    fn test_img_alpha_plane() {
        let mut buf = canvas(4, 1);
        let mut ctx = DrawCtx::new(&mut buf, area(0, 0, 4, 1), BlendWalk::Horizontal, BLUE);
        let pixels = [RED, RED];
        let alpha = [OPA_COVER, 0];
        let img = ImgDsc::new(Size::new(2, 1), &pixels).with_alpha(&alpha);
        let dst = draw_img(&mut ctx, &img, Point::new(1, 0));
        assert_eq!(dst, area(1, 0, 2, 1));
        assert_eq!(buf, [BLACK, RED, BLACK, BLACK]);
    }
}
