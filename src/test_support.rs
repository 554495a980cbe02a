//! Shared fixtures for unit tests.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::{Cell, RefCell};
use core::mem::size_of;
use std::thread_local;

use crate::config::GuiConfig;
use crate::gui::Gui;
use crate::ui::draw::color::GRAY;
use crate::ui::draw::style::{FontAttr, RectAttr, TextSize};
use crate::ui::draw::{DrawCtx, draw_bg, draw_text};
use crate::ui::event::{Event, EventCb, EventCode, Param};
use crate::ui::object::{Obj, ObjClass, ObjId, ObjType, base::base_event};

thread_local! {
    static LOG: RefCell<Vec<(ObjId, EventCode)>> = const { RefCell::new(Vec::new()) };
    static DROPS: Cell<usize> = const { Cell::new(0) };
}

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 800x480 GUI with the default pool.
pub(crate) fn gui() -> Gui {
    init_logging();
    Gui::new(GuiConfig::default().with_resolution(800, 480)).unwrap()
}

/// Tick until the redraw events raised so far have been delivered.
pub(crate) fn settle(gui: &mut Gui) {
    // DrawStart on one tick, the DrawEnd it raises on the next.
    gui.task_handler();
    gui.task_handler();
}

/// Clears the class event log and the style drop counter.
pub(crate) fn reset_class_log() {
    LOG.with(|log| log.borrow_mut().clear());
    DROPS.with(|d| d.set(0));
}

/// Events seen by label class handlers, in delivery order.
pub(crate) fn class_log() -> Vec<(ObjId, EventCode)> {
    LOG.with(|log| log.borrow().clone())
}

/// Label styles dropped since the last reset.
pub(crate) fn drops() -> usize {
    DROPS.with(Cell::get)
}

pub(crate) struct LabelStyle {
    pub(crate) text: &'static str,
}

impl Drop for LabelStyle {
    fn drop(&mut self) {
        DROPS.with(|d| d.set(d.get() + 1));
    }
}

/// Label-like class that records its class events.
pub(crate) struct LabelClass {
    ty: ObjType,
}

pub(crate) static LABEL_CLASS: LabelClass = LabelClass {
    ty: ObjType::Label,
};

impl ObjClass for LabelClass {
    fn obj_type(&self) -> ObjType {
        self.ty
    }

    fn size_style(&self) -> usize {
        size_of::<LabelStyle>()
    }

    fn create_style(&self) -> Box<dyn Any> {
        Box::new(LabelStyle { text: "Label" })
    }

    fn init(&self, obj: &Obj, ctx: &mut DrawCtx<'_>) {
        let attr = RectAttr::new()
            .with_background(GRAY)
            .with_opa(obj.opa())
            .with_radius(obj.radius());
        draw_bg(ctx, &attr, &obj.area());
        if let Some(style) = obj.style::<LabelStyle>() {
            draw_text(ctx, &FontAttr::new(style.text, TextSize::Small), &obj.area());
        }
    }

    fn event(&self, gui: &mut Gui, obj: ObjId, e: &Event) {
        LOG.with(|log| log.borrow_mut().push((obj, e.code)));
        base_event(gui, obj, e);
    }
}

/// Callback that records every invocation.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    calls: Rc<RefCell<Vec<(ObjId, EventCode, Param)>>>,
}

impl Recorder {
    pub(crate) fn callback(&self) -> EventCb {
        let calls = self.calls.clone();
        Rc::new(move |_: &mut Gui, e: &Event| {
            calls.borrow_mut().push((e.target, e.code, e.param));
        })
    }

    pub(crate) fn count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub(crate) fn params(&self) -> Vec<Param> {
        self.calls.borrow().iter().map(|c| c.2).collect()
    }

    pub(crate) fn targets(&self) -> Vec<ObjId> {
        self.calls.borrow().iter().map(|c| c.0).collect()
    }

    pub(crate) fn codes(&self) -> Vec<EventCode> {
        self.calls.borrow().iter().map(|c| c.1).collect()
    }
}
