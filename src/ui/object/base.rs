//! The generic base object: screens and plain containers.

use alloc::boxed::Box;
use core::any::Any;
use core::mem::size_of;

use embedded_graphics::pixelcolor::Rgb565;
use log::trace;

use super::{Obj, ObjClass, ObjId, ObjType};
use crate::gui::Gui;
use crate::ui::draw::color::WHITE;
use crate::ui::draw::style::RectAttr;
use crate::ui::draw::{DrawCtx, draw_bg, draw_focus};
use crate::ui::error::{GuiError, GuiResult};
use crate::ui::event::{Event, EventCode};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseStyle {
    pub bgcolor: Rgb565,
}

impl Default for BaseStyle {
    fn default() -> Self {
        Self { bgcolor: WHITE }
    }
}

pub struct BaseClass;

pub static BASE_CLASS: BaseClass = BaseClass;

impl ObjClass for BaseClass {
    fn obj_type(&self) -> ObjType {
        ObjType::Obj
    }

    fn size_style(&self) -> usize {
        size_of::<BaseStyle>()
    }

    fn create_style(&self) -> Box<dyn Any> {
        Box::new(BaseStyle::default())
    }

    fn init(&self, obj: &Obj, ctx: &mut DrawCtx<'_>) {
        if obj.flags.show_bg {
            let bgcolor = obj.style::<BaseStyle>().map_or(WHITE, |s| s.bgcolor);
            // Screens are never rounded.
            let radius = if obj.parent.is_none() { 0 } else { obj.radius };
            let attr = RectAttr::new()
                .with_background(bgcolor)
                .with_opa(obj.opa)
                .with_radius(radius);
            draw_bg(ctx, &attr, &obj.area);
        }
        draw_focus(ctx, obj, obj.radius);
    }
}

/// Default reactions shared by every class.
pub fn base_event(gui: &mut Gui, obj: ObjId, e: &Event) {
    match e.code {
        EventCode::DrawStart => {
            gui.mark_dirty(obj);
            gui.raise(obj, EventCode::DrawEnd).ok();
        }
        EventCode::UpdateStyle => gui.invalidate(obj),
        EventCode::Released => {
            gui.raise(obj, EventCode::DrawStart).ok();
        }
        code => trace!("{:?} ignored {:?}", obj, code),
    }
}

impl Gui {
    /// Background color of a base object.
    pub fn set_bgcolor(&mut self, obj: ObjId, color: Rgb565) -> GuiResult<()> {
        let style = self
            .live_mut(obj)?
            .style_mut::<BaseStyle>()
            .ok_or(GuiError::NotFound)?;
        style.bgcolor = color;
        self.invalidate(obj);
        Ok(())
    }

    pub fn bgcolor(&self, obj: ObjId) -> Option<Rgb565> {
        Some(self.objs.get(obj)?.style::<BaseStyle>()?.bgcolor)
    }
}
