//! Event codes, callbacks and the dispatcher.
//!
//! Every object carries a pending-event bitmask. Sending an event sets its
//! bit and, when the dispatcher is idle, immediately flushes all of the
//! target's pending bits in ascending code order. While a dispatch is in
//! progress the dispatcher is locked: nested sends only set bits and the
//! tick pass in [`Gui::task_handler`](crate::Gui::task_handler) delivers
//! them. A given code is delivered at most once per object per tick.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use bitflags::bitflags;
use embedded_graphics::prelude::Point;
use log::{debug, trace};

use crate::gui::Gui;
use crate::ui::error::{GuiError, GuiResult};
use crate::ui::object::ObjId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventCode {
    Released = 0,
    Pressing,
    Pressed,
    ScrollStart,
    Scroll,
    ScrollEnd,
    ProcessLost,
    Key,
    Focused,
    UpdateValue,
    UpdateStyle,
    DrawStart,
    DrawEnd,
    DrawRedraw,
    ChildRemove,
    ChildRemoved,
    ChildAdd,
    ChildDelete,
    ChildDeleted,
    Deleted,
}

impl EventCode {
    pub const ALL: [EventCode; 20] = [
        EventCode::Released,
        EventCode::Pressing,
        EventCode::Pressed,
        EventCode::ScrollStart,
        EventCode::Scroll,
        EventCode::ScrollEnd,
        EventCode::ProcessLost,
        EventCode::Key,
        EventCode::Focused,
        EventCode::UpdateValue,
        EventCode::UpdateStyle,
        EventCode::DrawStart,
        EventCode::DrawEnd,
        EventCode::DrawRedraw,
        EventCode::ChildRemove,
        EventCode::ChildRemoved,
        EventCode::ChildAdd,
        EventCode::ChildDelete,
        EventCode::ChildDeleted,
        EventCode::Deleted,
    ];

    pub fn mask(self) -> EventMask {
        EventMask::from_bits_retain(1 << self as u8)
    }

    /// Codes produced by input devices. Disabled objects refuse these.
    pub fn is_input(self) -> bool {
        (self as u8) <= (EventCode::Focused as u8)
    }
}

bitflags! {
    /// One bit per [`EventCode`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EventMask: u32 {
        const RELEASED = 1 << 0;
        const PRESSING = 1 << 1;
        const PRESSED = 1 << 2;
        const SCROLL_START = 1 << 3;
        const SCROLL = 1 << 4;
        const SCROLL_END = 1 << 5;
        const PROCESS_LOST = 1 << 6;
        const KEY = 1 << 7;
        const FOCUSED = 1 << 8;
        const UPDATE_VALUE = 1 << 9;
        const UPDATE_STYLE = 1 << 10;
        const DRAW_START = 1 << 11;
        const DRAW_END = 1 << 12;
        const DRAW_REDRAW = 1 << 13;
        const CHILD_REMOVE = 1 << 14;
        const CHILD_REMOVED = 1 << 15;
        const CHILD_ADD = 1 << 16;
        const CHILD_DELETE = 1 << 17;
        const CHILD_DELETED = 1 << 18;
        const DELETED = 1 << 19;
    }
}

impl EventMask {
    /// Pending codes in ascending order.
    pub fn codes(self) -> impl Iterator<Item = EventCode> {
        EventCode::ALL
            .into_iter()
            .filter(move |code| self.contains(code.mask()))
    }
}

/// Which codes a callback is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    Code(EventCode),
    All,
}

impl EventFilter {
    pub fn matches(self, code: EventCode) -> bool {
        match self {
            EventFilter::Code(c) => c == code,
            EventFilter::All => true,
        }
    }
}

impl From<EventCode> for EventFilter {
    fn from(code: EventCode) -> Self {
        EventFilter::Code(code)
    }
}

/// Event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Param {
    #[default]
    None,
    Obj(ObjId),
    Int(i32),
    Point(Point),
}

pub struct Event {
    /// Object whose handlers are running.
    pub target: ObjId,
    /// Object the event was sent to; differs from `target` while bubbling.
    pub origin: ObjId,
    pub code: EventCode,
    pub param: Param,
    pub user_data: Option<Rc<dyn Any>>,
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("target", &self.target)
            .field("origin", &self.origin)
            .field("code", &self.code)
            .field("param", &self.param)
            .finish()
    }
}

pub type EventCb = Rc<dyn Fn(&mut Gui, &Event)>;

#[derive(Clone)]
pub(crate) struct EventAttr {
    pub(crate) cb: EventCb,
    pub(crate) filter: EventFilter,
    pub(crate) user_data: Option<Rc<dyn Any>>,
}

#[derive(Debug, Default)]
pub(crate) struct Dispatch {
    pub(crate) locked: bool,
    pub(crate) locked_obj: Option<ObjId>,
}

impl Gui {
    /// Register a callback. Registering the same callback twice for the same
    /// filter is a no-op.
    pub fn add_event_cb(
        &mut self,
        obj: ObjId,
        cb: EventCb,
        filter: impl Into<EventFilter>,
        user_data: Option<Rc<dyn Any>>,
    ) -> GuiResult<()> {
        let filter = filter.into();
        let o = self.objs.get_mut(obj).ok_or(GuiError::StaleObject(obj))?;
        if o
            .event_attr
            .iter()
            .any(|a| a.filter == filter && Rc::ptr_eq(&a.cb, &cb))
        {
            trace!("Callback already registered on {:?}", obj);
            return Ok(());
        }
        o.event_attr.push(
            &mut self.pool,
            EventAttr {
                cb,
                filter,
                user_data,
            },
        )
    }

    pub fn remove_all_event_cb(&mut self, obj: ObjId) -> GuiResult<()> {
        let o = self.objs.get_mut(obj).ok_or(GuiError::StaleObject(obj))?;
        o.event_attr.release(&mut self.pool);
        Ok(())
    }

    pub fn event_cb_count(&self, obj: ObjId) -> usize {
        self.objs.get(obj).map_or(0, |o| o.event_attr.len())
    }

    /// Mark `code` pending on `obj` without dispatching.
    pub fn raise(&mut self, obj: ObjId, code: EventCode) -> GuiResult<()> {
        let o = self.objs.get_mut(obj).ok_or(GuiError::StaleObject(obj))?;
        if code.is_input() && o.flags.disabled {
            return Err(GuiError::DisabledInput);
        }
        if o.event_mask.contains(code.mask()) {
            return Err(GuiError::AlreadyPending);
        }
        o.event_mask.insert(code.mask());
        Ok(())
    }

    /// Send an event. Delivery happens now unless the dispatcher is busy,
    /// in which case [`GuiError::Locked`] is returned and the event is
    /// delivered on the next tick.
    pub fn send(&mut self, obj: ObjId, code: EventCode, param: Param) -> GuiResult<()> {
        self.raise(obj, code)?;
        if self.dispatch.locked {
            trace!("Deferred {:?} to {:?}", code, obj);
            return Err(GuiError::Locked);
        }
        let pending = self.objs.get(obj).map_or(EventMask::empty(), |o| o.event_mask);
        self.deliver_pending(obj, pending, Some((code, param)));
        Ok(())
    }

    /// Send to every descendant of `obj`, parents before children.
    pub fn send_to_children(&mut self, obj: ObjId, code: EventCode, param: Param) -> GuiResult<()> {
        let mut order = Vec::new();
        self.collect_subtree(obj, &mut order)?;
        for child in order.into_iter().skip(1) {
            self.send(child, code, param).ok();
        }
        Ok(())
    }

    pub fn set_id(&mut self, obj: ObjId, id: i32) -> GuiResult<()> {
        self.obj_mut(obj)?.id = Some(id);
        Ok(())
    }

    /// First object carrying `id`, searching screens in registration order.
    pub fn find_by_id(&self, id: i32) -> Option<ObjId> {
        let mut order = Vec::new();
        for &scr in self.display.screens() {
            self.collect_subtree(scr, &mut order).ok();
        }
        order
            .into_iter()
            .find(|&o| self.objs.get(o).is_some_and(|obj| obj.id == Some(id)))
    }

    pub fn send_by_id(&mut self, id: i32, code: EventCode, param: Param) -> GuiResult<()> {
        let obj = self.find_by_id(id).ok_or(GuiError::NotFound)?;
        self.send(obj, code, param)
    }

    pub fn is_locked(&self) -> bool {
        self.dispatch.locked
    }

    /// Object whose events are currently being dispatched.
    pub fn locked_obj(&self) -> Option<ObjId> {
        self.dispatch.locked_obj
    }

    /// Deliver the bits of `pending` that are still set on `obj`.
    fn deliver_pending(
        &mut self,
        obj: ObjId,
        pending: EventMask,
        sent: Option<(EventCode, Param)>,
    ) {
        self.dispatch.locked = true;
        self.dispatch.locked_obj = Some(obj);

        for code in pending.codes() {
            let Some(o) = self.objs.get_mut(obj) else {
                break;
            };
            if !o.event_mask.contains(code.mask()) {
                continue;
            }
            o.event_mask.remove(code.mask());
            let param = match sent {
                Some((c, p)) if c == code => p,
                _ => Param::None,
            };
            self.deliver(obj, code, param);
        }

        self.dispatch.locked = false;
        self.dispatch.locked_obj = None;
    }

    /// Run the class handler then the user callbacks, bubbling upwards while
    /// the current object asks for it.
    fn deliver(&mut self, origin: ObjId, code: EventCode, param: Param) {
        let mut current = origin;
        loop {
            let Some(o) = self.objs.get(current) else {
                return;
            };
            let class = o.class;
            let bubble = o.flags.bubble_notify;
            let parent = o.parent;
            let callbacks: Vec<EventAttr> = if o.flags.disabled {
                Vec::new()
            } else {
                o.event_attr
                    .iter()
                    .filter(|a| a.filter.matches(code))
                    .cloned()
                    .collect()
            };

            let mut e = Event {
                target: current,
                origin,
                code,
                param,
                user_data: None,
            };
            if let Some(class) = class {
                class.event(self, current, &e);
            }
            for attr in callbacks {
                if !self.objs.contains(current) {
                    return;
                }
                e.user_data = attr.user_data.clone();
                (attr.cb)(self, &e);
            }

            match (bubble, parent) {
                (true, Some(p)) => current = p,
                _ => return,
            }
        }
    }

    /// Deliver everything left pending, walking every screen parent first.
    pub(crate) fn event_system_pass(&mut self) {
        let mut order = Vec::new();
        for &scr in self.display.screens() {
            self.collect_subtree(scr, &mut order).ok();
        }
        let plan: Vec<(ObjId, EventMask)> = order
            .into_iter()
            .filter_map(|id| {
                let mask = self.objs.get(id)?.event_mask;
                (!mask.is_empty()).then_some((id, mask))
            })
            .collect();

        if !plan.is_empty() {
            debug!("Event pass delivering to {} objects", plan.len());
        }
        for (id, mask) in plan {
            self.deliver_pending(id, mask, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use core::cell::{Cell, RefCell};

    use super::*;
    use crate::test_support::{Recorder, gui, settle};

    #[test]
    fn test_codes_iterate_ascending() {
        let mask = EventMask::DELETED | EventMask::RELEASED | EventMask::DRAW_START;
        let codes: Vec<EventCode> = mask.codes().collect();
        assert_eq!(
            codes,
            vec![EventCode::Released, EventCode::DrawStart, EventCode::Deleted]
        );
        assert_eq!(EventCode::DrawEnd.mask(), EventMask::DRAW_END);
    }

    #[test]
    fn test_released_callback_runs_once_and_schedules_redraw() {
        let mut gui = gui();
        let scr = gui.create_obj(None).unwrap();
        let btn = gui.create_obj(Some(scr)).unwrap();
        gui.set_size(btn, 40, 20).unwrap();
        settle(&mut gui);

        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        gui.add_event_cb(
            btn,
            Rc::new(move |_: &mut Gui, _: &Event| h.set(h.get() + 1)),
            EventCode::Released,
            None,
        )
        .unwrap();
        let draw_end = Rc::new(Cell::new(0));
        let d = draw_end.clone();
        gui.add_event_cb(
            btn,
            Rc::new(move |_: &mut Gui, _: &Event| d.set(d.get() + 1)),
            EventCode::DrawEnd,
            None,
        )
        .unwrap();

        gui.send(btn, EventCode::Released, Param::None).unwrap();
        assert_eq!(hits.get(), 1);
        assert!(gui.obj(btn).unwrap().event_mask().contains(EventMask::DRAW_START));

        gui.task_handler();
        assert!(gui.obj(btn).unwrap().event_mask().contains(EventMask::DRAW_END));
        gui.task_handler();
        assert_eq!(draw_end.get(), 1);
        assert_eq!(hits.get(), 1);
        assert!(gui.obj(btn).unwrap().event_mask().is_empty());
    }

    #[test]
    fn test_nested_send_is_deferred_to_next_tick() {
        let mut gui = gui();
        let scr = gui.create_obj(None).unwrap();
        let a = gui.create_obj(Some(scr)).unwrap();
        let b = gui.create_obj(Some(scr)).unwrap();

        let nested = Rc::new(Cell::new(None));
        let n = nested.clone();
        gui.add_event_cb(
            a,
            Rc::new(move |gui: &mut Gui, _: &Event| {
                n.set(Some(gui.send(b, EventCode::UpdateValue, Param::Int(7))));
            }),
            EventCode::Pressed,
            None,
        )
        .unwrap();

        let seen = Recorder::default();
        gui.add_event_cb(b, seen.callback(), EventCode::UpdateValue, None)
            .unwrap();

        gui.send(a, EventCode::Pressed, Param::None).unwrap();
        assert_eq!(nested.get(), Some(Err(GuiError::Locked)));
        assert_eq!(seen.count(), 0);

        gui.task_handler();
        assert_eq!(seen.count(), 1);
        assert_eq!(seen.params(), vec![Param::None]);
        gui.task_handler();
        assert_eq!(seen.count(), 1);
    }

    #[test]
    fn test_repeated_raise_delivers_once() {
        let mut gui = gui();
        let scr = gui.create_obj(None).unwrap();
        let seen = Recorder::default();
        gui.add_event_cb(scr, seen.callback(), EventCode::UpdateValue, None)
            .unwrap();

        gui.raise(scr, EventCode::UpdateValue).unwrap();
        assert_eq!(
            gui.raise(scr, EventCode::UpdateValue),
            Err(GuiError::AlreadyPending)
        );
        assert_eq!(GuiError::AlreadyPending.kind(), crate::ResultKind::Failed);
        gui.task_handler();
        gui.task_handler();
        assert_eq!(seen.count(), 1);
    }

    #[test]
    fn test_disabled_object_refuses_input() {
        let mut gui = gui();
        let scr = gui.create_obj(None).unwrap();
        let obj = gui.create_obj(Some(scr)).unwrap();
        let seen = Recorder::default();
        gui.add_event_cb(obj, seen.callback(), EventFilter::All, None)
            .unwrap();
        gui.set_disabled(obj, true).unwrap();

        assert_eq!(
            gui.send(obj, EventCode::Pressed, Param::None),
            Err(GuiError::DisabledInput)
        );
        gui.send(obj, EventCode::UpdateValue, Param::None).unwrap();
        assert_eq!(seen.count(), 0);
    }

    #[test]
    fn test_duplicate_registration_ignored() {
        let mut gui = gui();
        let scr = gui.create_obj(None).unwrap();
        let seen = Recorder::default();
        let cb = seen.callback();
        gui.add_event_cb(scr, cb.clone(), EventCode::Key, None).unwrap();
        gui.add_event_cb(scr, cb.clone(), EventCode::Key, None).unwrap();
        gui.add_event_cb(scr, cb, EventCode::Pressed, None).unwrap();
        assert_eq!(gui.event_cb_count(scr), 2);

        gui.remove_all_event_cb(scr).unwrap();
        assert_eq!(gui.event_cb_count(scr), 0);
    }

    #[test]
    fn test_callbacks_run_in_registration_order_with_user_data() {
        let mut gui = gui();
        let scr = gui.create_obj(None).unwrap();
        settle(&mut gui);
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in [1i32, 2, 3] {
            let o = order.clone();
            gui.add_event_cb(
                scr,
                Rc::new(move |_: &mut Gui, e: &Event| {
                    let data = e.user_data.as_ref().and_then(|d| d.downcast_ref::<i32>());
                    o.borrow_mut().push(data.copied());
                }),
                EventFilter::All,
                Some(Rc::new(tag * 10)),
            )
            .unwrap();
        }
        gui.send(scr, EventCode::Key, Param::Int(1)).unwrap();
        assert_eq!(*order.borrow(), vec![Some(10), Some(20), Some(30)]);
    }

    #[test]
    fn test_bubbling_reaches_parent() {
        let mut gui = gui();
        let scr = gui.create_obj(None).unwrap();
        let child = gui.create_obj(Some(scr)).unwrap();
        gui.set_bubble_notify(child, true).unwrap();

        let origins = Rc::new(RefCell::new(Vec::new()));
        let o = origins.clone();
        gui.add_event_cb(
            scr,
            Rc::new(move |_: &mut Gui, e: &Event| o.borrow_mut().push((e.target, e.origin))),
            EventCode::Key,
            None,
        )
        .unwrap();

        gui.send(child, EventCode::Key, Param::None).unwrap();
        assert_eq!(*origins.borrow(), vec![(scr, child)]);
    }

    #[test]
    fn test_send_by_id() {
        let mut gui = gui();
        let scr = gui.create_obj(None).unwrap();
        let obj = gui.create_obj(Some(scr)).unwrap();
        gui.set_id(obj, 42).unwrap();
        let seen = Recorder::default();
        gui.add_event_cb(obj, seen.callback(), EventCode::Key, None)
            .unwrap();

        assert_eq!(gui.find_by_id(42), Some(obj));
        gui.send_by_id(42, EventCode::Key, Param::Int(5)).unwrap();
        assert_eq!(seen.params(), vec![Param::Int(5)]);
        assert_eq!(
            gui.send_by_id(7, EventCode::Key, Param::None),
            Err(GuiError::NotFound)
        );
    }

    #[test]
    fn test_send_to_children_skips_root() {
        let mut gui = gui();
        let scr = gui.create_obj(None).unwrap();
        let a = gui.create_obj(Some(scr)).unwrap();
        let b = gui.create_obj(Some(a)).unwrap();
        let seen = Recorder::default();
        for obj in [scr, a, b] {
            gui.add_event_cb(obj, seen.callback(), EventCode::UpdateStyle, None)
                .unwrap();
        }
        gui.send_to_children(scr, EventCode::UpdateStyle, Param::None)
            .unwrap();
        assert_eq!(seen.targets(), vec![a, b]);
    }
}
