//! Geometry and flag setters.
//!
//! Every setter refuses objects already marked for deletion and invalidates
//! the screen area the change touches.

use alloc::vec::Vec;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use super::{ObjFlags, ObjId, ScrollDir};
use crate::gui::Gui;
use crate::ui::draw::color::{OPA_60, OPA_COVER};
use crate::ui::error::GuiResult;
use crate::ui::layouts::LayoutType;

impl Gui {
    fn update_flags(&mut self, obj: ObjId, f: impl FnOnce(&mut ObjFlags)) -> GuiResult<()> {
        f(&mut self.live_mut(obj)?.flags);
        self.invalidate(obj);
        Ok(())
    }

    /// Re-run the parent's layout after `obj` moved, resized or changed
    /// visibility.
    fn relayout_parent(&mut self, obj: ObjId) {
        if let Some(parent) = self.parent(obj)
            && self
                .objs
                .get(parent)
                .is_some_and(|p| p.layout.kind != LayoutType::None)
        {
            self.relayout(parent);
        }
    }

    /// Move `obj` to an absolute position. Descendants keep their offsets.
    ///
    /// A child of a layout container is placed back by the container.
    pub fn set_pos(&mut self, obj: ObjId, x: i32, y: i32) -> GuiResult<()> {
        let cur = self.live_mut(obj)?.area.top_left;
        let delta = Point::new(x, y) - cur;
        if delta == Point::zero() {
            return Ok(());
        }
        self.invalidate(obj);
        self.move_subtree(obj, delta);
        self.invalidate(obj);
        self.relayout_parent(obj);
        Ok(())
    }

    pub fn set_x(&mut self, obj: ObjId, x: i32) -> GuiResult<()> {
        let y = self.obj_ref(obj)?.area.top_left.y;
        self.set_pos(obj, x, y)
    }

    pub fn set_y(&mut self, obj: ObjId, y: i32) -> GuiResult<()> {
        let x = self.obj_ref(obj)?.area.top_left.x;
        self.set_pos(obj, x, y)
    }

    pub fn set_size(&mut self, obj: ObjId, w: u32, h: u32) -> GuiResult<()> {
        let size = Size::new(w, h);
        if self.live_mut(obj)?.area.size == size {
            return Ok(());
        }
        self.invalidate(obj);
        self.obj_mut(obj)?.area.size = size;
        self.invalidate(obj);
        self.relayout(obj);
        self.relayout_parent(obj);
        Ok(())
    }

    pub fn set_area(&mut self, obj: ObjId, area: Rectangle) -> GuiResult<()> {
        self.set_pos(obj, area.top_left.x, area.top_left.y)?;
        self.set_size(obj, area.size.width, area.size.height)
    }

    pub fn set_opa(&mut self, obj: ObjId, opa: u8) -> GuiResult<()> {
        self.live_mut(obj)?.opa = opa;
        self.invalidate(obj);
        Ok(())
    }

    pub fn set_radius(&mut self, obj: ObjId, radius: u16) -> GuiResult<()> {
        self.live_mut(obj)?.radius = radius;
        self.invalidate(obj);
        self.relayout(obj);
        Ok(())
    }

    /// Hidden objects are skipped by drawing, hit testing and layout.
    pub fn set_visible(&mut self, obj: ObjId, visible: bool) -> GuiResult<()> {
        self.update_flags(obj, |f| f.visible = visible)?;
        self.relayout_parent(obj);
        Ok(())
    }

    /// Disabled objects refuse input and are drawn dimmed.
    pub fn set_disabled(&mut self, obj: ObjId, disabled: bool) -> GuiResult<()> {
        let o = self.live_mut(obj)?;
        o.flags.disabled = disabled;
        o.opa = if disabled { OPA_60 } else { OPA_COVER };
        self.invalidate(obj);
        Ok(())
    }

    pub fn set_focus(&mut self, obj: ObjId, focus: bool) -> GuiResult<()> {
        self.update_flags(obj, |f| f.focus = focus)
    }

    pub fn set_focus_disabled(&mut self, obj: ObjId, disabled: bool) -> GuiResult<()> {
        self.update_flags(obj, |f| f.focus_disabled = disabled)
    }

    pub fn set_fixed(&mut self, obj: ObjId, fixed: bool) -> GuiResult<()> {
        self.update_flags(obj, |f| f.fixed = fixed)
    }

    pub fn set_overflow(&mut self, obj: ObjId, overflow: bool) -> GuiResult<()> {
        self.update_flags(obj, |f| f.overflow = overflow)
    }

    pub fn set_inside(&mut self, obj: ObjId, inside: bool) -> GuiResult<()> {
        self.update_flags(obj, |f| f.inside = inside)
    }

    pub fn set_virtual(&mut self, obj: ObjId, is_virtual: bool) -> GuiResult<()> {
        self.update_flags(obj, |f| f.is_virtual = is_virtual)?;
        self.relayout_parent(obj);
        Ok(())
    }

    pub fn set_grow_invert(&mut self, obj: ObjId, invert: bool) -> GuiResult<()> {
        self.update_flags(obj, |f| f.grow_invert = invert)?;
        self.relayout(obj);
        Ok(())
    }

    pub fn set_bubble_notify(&mut self, obj: ObjId, bubble: bool) -> GuiResult<()> {
        self.update_flags(obj, |f| f.bubble_notify = bubble)
    }

    pub fn set_show_bg(&mut self, obj: ObjId, show: bool) -> GuiResult<()> {
        self.update_flags(obj, |f| f.show_bg = show)
    }

    pub fn set_scroll_dir(&mut self, obj: ObjId, dir: ScrollDir) -> GuiResult<()> {
        self.update_flags(obj, |f| f.scroll_dir = dir)
    }

    /// Record the last input point, relative to the object.
    pub fn set_process_point(&mut self, obj: ObjId, point: Point) -> GuiResult<()> {
        self.live_mut(obj)?.process_attr.point = point;
        Ok(())
    }

    /// Scroll the content of `obj`, moving its children by the difference.
    pub fn set_scroll(&mut self, obj: ObjId, scroll: Point) -> GuiResult<()> {
        let o = self.live_mut(obj)?;
        let (x, y) = match o.flags.scroll_dir {
            ScrollDir::Disable => return Ok(()),
            ScrollDir::Horizontal => (scroll.x, o.process_attr.scroll.y),
            ScrollDir::Vertical => (o.process_attr.scroll.x, scroll.y),
            ScrollDir::All => (scroll.x, scroll.y),
        };
        let delta = Point::new(x, y) - o.process_attr.scroll;
        o.process_attr.scroll = Point::new(x, y);
        let children = o.children.as_slice().to_vec();
        for child in children {
            self.move_subtree(child, delta);
        }
        self.invalidate(obj);
        Ok(())
    }

    /// Shift `obj` and all of its descendants without invalidating.
    pub(crate) fn move_subtree(&mut self, obj: ObjId, delta: Point) {
        let mut order = Vec::new();
        if self.collect_subtree(obj, &mut order).is_err() {
            return;
        }
        for id in order {
            if let Some(o) = self.objs.get_mut(id) {
                o.area.top_left += delta;
            }
        }
    }
}
