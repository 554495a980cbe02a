//! Display state: screen registry, invalid areas and the refresh pass.
//!
//! This module keeps track of:
//! - The screens (root objects) in creation order and the active one
//! - A bounded history of previously shown screens
//! - A bounded list of invalid areas, merged as they arrive
//! - The framebuffer the refresh pass renders into

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::primitives::Rectangle;
use heapless::Vec;
use log::{trace, warn};

use crate::config::{BlendWalk, GuiConfig};
use crate::framebuffer::FrameBuffer;
use crate::mem::{MemPool, PoolVec};
use crate::ui::core::AreaExt;
use crate::ui::draw::DrawCtx;
use crate::ui::draw::color::BLACK;
use crate::ui::error::GuiResult;
use crate::ui::object::{ObjArena, ObjId};

/// Invalid areas kept before collapsing to a full-screen redraw.
pub const INVALID_AREA_CAPACITY: usize = 16;

/// Screens remembered for going back. The oldest is forgotten first.
pub const SCREEN_HISTORY_DEPTH: usize = 8;

pub struct Display {
    area: Rectangle,
    screens: PoolVec<ObjId>,
    active: Option<ObjId>,
    history: Vec<ObjId, SCREEN_HISTORY_DEPTH>,
    invalid: Vec<Rectangle, INVALID_AREA_CAPACITY>,
    framebuffer: FrameBuffer,
    walk: BlendWalk,
    focus_color: Rgb565,
}

impl Display {
    pub fn new(config: &GuiConfig) -> Self {
        let framebuffer = FrameBuffer::new(config.hor_res, config.ver_res);
        Self {
            area: framebuffer.area(),
            screens: PoolVec::new(),
            active: None,
            history: Vec::new(),
            invalid: Vec::new(),
            framebuffer,
            walk: config.blend_walk,
            focus_color: config.focus_color(),
        }
    }

    pub fn area(&self) -> Rectangle {
        self.area
    }

    pub fn screens(&self) -> &[ObjId] {
        self.screens.as_slice()
    }

    pub fn active_screen(&self) -> Option<ObjId> {
        self.active
    }

    /// Screen shown before the active one.
    pub fn prev_screen(&self) -> Option<ObjId> {
        self.history.last().copied()
    }

    /// Previously shown screens, oldest first.
    pub fn history(&self) -> &[ObjId] {
        &self.history
    }

    pub fn invalid_areas(&self) -> &[Rectangle] {
        &self.invalid
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub(crate) fn set_active_screen(&mut self, scr: ObjId) {
        self.active = Some(scr);
        self.invalidate_area(self.area);
    }

    /// Show `scr`, remembering the active screen in the history.
    pub(crate) fn push_screen(&mut self, scr: ObjId) {
        if let Some(cur) = self.active
            && cur != scr
        {
            if self.history.is_full() {
                self.history.remove(0);
            }
            self.history.push(cur).ok();
        }
        self.set_active_screen(scr);
    }

    /// Show the most recent screen of the history that is still registered.
    pub(crate) fn pop_screen(&mut self) -> Option<ObjId> {
        while let Some(scr) = self.history.pop() {
            if Some(scr) != self.active && self.screens.contains(&scr) {
                self.set_active_screen(scr);
                return Some(scr);
            }
        }
        None
    }

    pub(crate) fn add_screen(&mut self, pool: &mut MemPool, scr: ObjId) -> GuiResult<()> {
        self.screens.push(pool, scr)
    }

    /// Unregister a screen. Returns false when it was not registered.
    pub(crate) fn remove_screen(&mut self, pool: &mut MemPool, scr: ObjId) -> bool {
        let Some(idx) = self.screens.position(&scr) else {
            return false;
        };
        self.screens.remove(pool, idx);
        self.history.retain(|&s| s != scr);
        if self.active == Some(scr) {
            self.active = self.history.pop().or_else(|| self.screens.last().copied());
            self.invalidate_area(self.area);
        }
        true
    }

    /// Queue `area` for redraw.
    ///
    /// Areas that overlap or touch an entry already queued are merged into
    /// it. When the list is full everything collapses to one full-screen
    /// area.
    pub fn invalidate_area(&mut self, area: Rectangle) {
        let Some(mut merged) = area.clip(&self.area) else {
            return;
        };
        while let Some(idx) = self.invalid.iter().position(|a| a.touches(&merged)) {
            merged = merged.join(&self.invalid.swap_remove(idx));
        }
        if self.invalid.push(merged).is_err() {
            warn!("Invalid area list full, redrawing the whole screen");
            self.invalid.clear();
            self.invalid.push(self.area).ok();
        }
    }

    /// Render every invalid area of the active screen into the framebuffer.
    /// Returns the number of areas rendered.
    pub(crate) fn refresh(&mut self, objs: &ObjArena) -> usize {
        if self.invalid.is_empty() {
            return 0;
        }
        let areas = core::mem::take(&mut self.invalid);
        let Some(scr) = self.active.filter(|&s| objs.contains(s)) else {
            return 0;
        };
        for dirty in &areas {
            self.render_area(objs, scr, dirty);
        }
        trace!("Refreshed {} areas", areas.len());
        areas.len()
    }

    fn render_area(&mut self, objs: &ObjArena, scr: ObjId, dirty: &Rectangle) {
        self.framebuffer.fill_solid(dirty, BLACK).ok();
        let fb_area = self.framebuffer.area();
        let (walk, focus_color) = (self.walk, self.focus_color);
        let mut ctx = DrawCtx::new(self.framebuffer.pixels_mut(), fb_area, walk, focus_color);
        render_obj(objs, scr, &mut ctx, dirty, &fb_area);
        self.framebuffer.mark_dirty(dirty);
    }

    pub fn flush<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.framebuffer.flush(target)
    }
}

/// Draw `id` and its visible descendants, parents first.
fn render_obj(
    objs: &ObjArena,
    id: ObjId,
    ctx: &mut DrawCtx<'_>,
    dirty: &Rectangle,
    parent_area: &Rectangle,
) {
    let Some(obj) = objs.get(id) else {
        return;
    };
    if !obj.flags.visible {
        return;
    }
    let clip = if obj.flags.inside {
        dirty.clip(parent_area)
    } else {
        Some(*dirty)
    };
    let Some(clip) = clip else {
        return;
    };

    if !obj.flags.is_virtual
        && obj.area.clip(&clip).is_some()
        && let Some(class) = obj.class
    {
        ctx.set_clip(clip);
        class.init(obj, ctx);
    }
    for &child in obj.children() {
        render_obj(objs, child, ctx, &clip, &obj.area);
    }
}
