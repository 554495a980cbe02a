//! Row-grow layout.
//!
//! Visible children are laid side by side along the x axis in child order,
//! each advancing the cursor by its own width. Virtual children are
//! transparent: their children join the row and carry the cursor on.
//! A child whose y lies outside the container row is snapped to its top.

use embedded_graphics::prelude::*;

use crate::gui::Gui;
use crate::ui::error::GuiResult;
use crate::ui::object::ObjId;

impl Gui {
    pub(crate) fn row_grow(&mut self, obj: ObjId) -> GuiResult<()> {
        let o = self.obj_ref(obj)?;
        if o.children.is_empty() {
            return Ok(());
        }
        let invert = o.flags.grow_invert;
        let mut offset = o.area.top_left;
        if invert {
            offset.x += o.area.size.width as i32;
        }
        self.row_grow_inside(obj, &mut offset, invert);
        Ok(())
    }

    fn row_grow_inside(&mut self, target: ObjId, offset: &mut Point, invert: bool) {
        let Some(t) = self.objs.get(target) else {
            return;
        };
        let height = t.area.size.height as i32;
        let children = t.children.as_slice().to_vec();

        for child in children {
            let Some(c) = self.objs.get(child) else {
                continue;
            };
            if !c.flags.visible {
                continue;
            }
            if c.flags.is_virtual {
                self.row_grow_inside(child, offset, invert);
                continue;
            }

            let width = c.area.size.width as i32;
            let mut y = c.area.top_left.y;
            if y < offset.y || y > offset.y + height {
                y = offset.y;
            }
            let x = if invert {
                offset.x -= width;
                offset.x
            } else {
                let x = offset.x;
                offset.x += width;
                x
            };

            let delta = Point::new(x, y) - c.area.top_left;
            if delta != Point::zero() {
                self.invalidate(child);
                self.move_subtree(child, delta);
                self.invalidate(child);
            }
        }
    }
}
