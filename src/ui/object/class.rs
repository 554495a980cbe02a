//! Widget classes and the object lifecycle.
//!
//! A class describes one widget type: its tag, its style payload and three
//! hooks. `init` renders the object, `deinit` releases class resources and
//! `event` reacts to dispatched events before user callbacks run.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::mem::size_of;

use log::{debug, trace, warn};

use super::{Obj, ObjId, ObjType, StyleBox};
use crate::gui::Gui;
use crate::ui::draw::DrawCtx;
use crate::ui::error::{GuiError, GuiResult};
use crate::ui::event::{Event, EventCode, Param};

pub trait ObjClass {
    fn obj_type(&self) -> ObjType;

    /// Bytes charged to the pool for the style payload.
    fn size_style(&self) -> usize;

    /// Fresh style payload for a new instance.
    fn create_style(&self) -> Box<dyn Any>;

    /// Render `obj` into `ctx`.
    fn init(&self, obj: &Obj, ctx: &mut DrawCtx<'_>);

    /// Release class-owned resources. The style payload is dropped afterwards.
    fn deinit(&self, _obj: &mut Obj) {}

    fn event(&self, gui: &mut Gui, obj: ObjId, e: &Event) {
        super::base::base_event(gui, obj, e);
    }
}

impl Gui {
    /// Instantiate `class`. Without a parent the object becomes a screen.
    pub fn create(
        &mut self,
        class: &'static dyn ObjClass,
        parent: Option<ObjId>,
    ) -> GuiResult<ObjId> {
        let inherited = match parent {
            Some(p) => {
                let p_obj = self.obj_ref(p)?;
                if p_obj.flags.delate {
                    return Err(GuiError::PendingDelete);
                }
                let ty = class.obj_type();
                if ty != ObjType::Obj && ty == p_obj.obj_type() {
                    return Err(GuiError::SameTypeNesting);
                }
                Some((p_obj.area.top_left, p_obj.flags.overflow, p_obj.flags.inside))
            }
            None => None,
        };

        let block = self.pool.alloc(size_of::<Obj>())?;
        let style_block = match self.pool.alloc(class.size_style()) {
            Ok(b) => b,
            Err(e) => {
                self.pool.free(block);
                return Err(e);
            }
        };
        let style = StyleBox {
            data: class.create_style(),
            block: style_block,
        };
        let mut obj = Obj::new(class, parent, self.config.default_radius, block, style);
        match inherited {
            Some((pos, overflow, inside)) => {
                obj.area.top_left = pos;
                obj.flags.fixed = true;
                obj.flags.overflow = overflow;
                obj.flags.inside = inside;
            }
            None => {
                obj.area = self.display.area();
                obj.flags.show_bg = true;
            }
        }

        let id = self.objs.insert(obj);
        let linked = match parent {
            Some(p) => match self.objs.get_mut(p) {
                Some(p_obj) => p_obj.children.push(&mut self.pool, id),
                None => Err(GuiError::StaleObject(p)),
            },
            None => self.display.add_screen(&mut self.pool, id),
        };
        if let Err(e) = linked {
            if let Some(obj) = self.objs.remove(id) {
                self.release_obj(obj);
            }
            return Err(e);
        }

        match parent {
            Some(p) => {
                self.send(p, EventCode::ChildAdd, Param::Obj(id)).ok();
                self.relayout(p);
            }
            None => {
                if self.display.active_screen().is_none() {
                    self.display.set_active_screen(id);
                }
            }
        }
        self.invalidate(id);
        debug!("Created {:?} {:?} under {:?}", class.obj_type(), id, parent);
        Ok(id)
    }

    /// Create a plain base object.
    pub fn create_obj(&mut self, parent: Option<ObjId>) -> GuiResult<ObjId> {
        self.create(&super::BASE_CLASS, parent)
    }

    /// Destroy `obj` and its subtree. While the dispatcher is busy the object
    /// is only marked and torn down on the next tick.
    pub fn destroy(&mut self, obj: ObjId) -> GuiResult<()> {
        let o = self.obj_mut(obj)?;
        o.flags.delate = true;
        if self.dispatch.locked {
            if !self.pending_destroy.contains(&obj) {
                self.pending_destroy.push(obj);
            }
            trace!("Deferred destroy of {:?}", obj);
            return Ok(());
        }
        self.destroy_immediately(obj)
    }

    /// Tear down `obj` now, regardless of the dispatcher state.
    ///
    /// Children are destroyed last to first, bracketed by `ChildDelete` and
    /// `ChildDeleted` on their parent. Each object receives `Deleted` before
    /// its class `deinit` runs. Finally the root is unlinked from its parent
    /// or from the screen registry.
    pub fn destroy_immediately(&mut self, obj: ObjId) -> GuiResult<()> {
        let parent = self.obj_ref(obj)?.parent;
        self.mark_dirty(obj);
        self.destroy_subtree(obj);

        match parent {
            Some(p) => {
                let unlinked = match self.objs.get_mut(p) {
                    Some(p_obj) => match p_obj.children.position(&obj) {
                        Some(idx) => {
                            p_obj.children.remove(&mut self.pool, idx);
                            true
                        }
                        None => false,
                    },
                    None => false,
                };
                if !unlinked {
                    warn!("{:?} missing from the child list of {:?}", obj, p);
                }
                self.relayout(p);
            }
            None => {
                let was_active = self.display.active_screen() == Some(obj);
                if !self.display.remove_screen(&mut self.pool, obj) {
                    warn!("Destroyed screen {:?} was not registered", obj);
                }
                if was_active && let Some(scr) = self.display.active_screen() {
                    self.redraw_screen(scr);
                }
            }
        }

        self.destroy_self(obj);
        Ok(())
    }

    /// Destroy every child of `obj`, last to first.
    pub fn destroy_children(&mut self, obj: ObjId) -> GuiResult<()> {
        let children = self.obj_ref(obj)?.children.as_slice().to_vec();
        for child in children.into_iter().rev() {
            self.destroy(child)?;
        }
        Ok(())
    }

    fn destroy_subtree(&mut self, obj: ObjId) {
        let children = match self.objs.get(obj) {
            Some(o) if !o.children.is_empty() => o.children.as_slice().to_vec(),
            _ => return,
        };

        self.send(obj, EventCode::ChildDelete, Param::None).ok();
        for child in children.into_iter().rev() {
            self.destroy_subtree(child);
            self.destroy_self(child);
        }
        self.send(obj, EventCode::ChildDeleted, Param::None).ok();

        if let Some(o) = self.objs.get_mut(obj) {
            o.children.release(&mut self.pool);
        }
    }

    fn destroy_self(&mut self, obj: ObjId) {
        self.send(obj, EventCode::Deleted, Param::None).ok();
        self.pending_destroy.retain(|&p| p != obj);
        if let Some(o) = self.objs.remove(obj) {
            self.release_obj(o);
            trace!("Freed {:?}", obj);
        }
    }

    /// Return every pool block the object owns.
    fn release_obj(&mut self, mut obj: Obj) {
        obj.event_attr.release(&mut self.pool);
        obj.children.release(&mut self.pool);
        if let Some(class) = obj.class.take() {
            class.deinit(&mut obj);
        }
        if let Some(style) = obj.style.take() {
            self.pool.free(style.block);
        }
        if let Some(block) = obj.block.take() {
            self.pool.free(block);
        }
    }

    /// Tear down objects whose destruction was deferred by a busy dispatcher.
    pub(crate) fn process_pending_destroy(&mut self) {
        let pending = core::mem::take(&mut self.pending_destroy);
        for obj in pending {
            if self.dispatch.locked_obj == Some(obj) {
                warn!("{:?} is still dispatching, destroy retried next tick", obj);
                self.pending_destroy.push(obj);
                continue;
            }
            if self.objs.contains(obj) {
                self.destroy_immediately(obj).ok();
            }
        }
    }

    /// Move `obj` under `to`, returning the new parent.
    pub fn change_parent(&mut self, obj: ObjId, to: ObjId) -> GuiResult<ObjId> {
        let from = self.obj_ref(obj)?.parent.ok_or(GuiError::NoParent)?;
        if self.obj_ref(to)?.flags.delate {
            return Err(GuiError::PendingDelete);
        }
        if from == to {
            return Ok(to);
        }
        if to == obj || self.is_child(to, obj) {
            return Err(GuiError::CyclicParent);
        }

        self.send(from, EventCode::ChildRemove, Param::Obj(obj)).ok();
        self.invalidate(obj);

        match self.objs.get_mut(to) {
            Some(to_obj) => to_obj.children.push(&mut self.pool, obj)?,
            None => return Err(GuiError::StaleObject(to)),
        }
        if let Some(from_obj) = self.objs.get_mut(from)
            && let Some(idx) = from_obj.children.position(&obj)
        {
            from_obj.children.remove(&mut self.pool, idx);
        }
        self.obj_mut(obj)?.parent = Some(to);

        self.send(from, EventCode::ChildRemoved, Param::Obj(obj)).ok();
        self.send(to, EventCode::ChildAdd, Param::Obj(obj)).ok();
        self.relayout(from);
        self.relayout(to);
        self.invalidate(obj);
        Ok(to)
    }

    /// True when `ancestor` appears on the parent chain of `obj`.
    pub fn is_child(&self, obj: ObjId, ancestor: ObjId) -> bool {
        let mut current = self.objs.get(obj).and_then(|o| o.parent);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.objs.get(p).and_then(|o| o.parent);
        }
        false
    }

    pub fn obj_type(&self, obj: ObjId) -> ObjType {
        self.objs.get(obj).map_or(ObjType::Unknown, |o| o.obj_type())
    }

    pub fn is_type(&self, obj: ObjId, ty: ObjType) -> bool {
        self.obj_type(obj) == ty
    }

    pub fn parent(&self, obj: ObjId) -> Option<ObjId> {
        self.objs.get(obj)?.parent
    }

    pub fn children(&self, obj: ObjId) -> &[ObjId] {
        self.objs.get(obj).map(|o| o.children()).unwrap_or(&[])
    }

    pub fn child_count(&self, obj: ObjId) -> usize {
        self.objs.get(obj).map_or(0, |o| o.child_count())
    }

    /// Pre-order walk of `root` and its descendants, appended to `out`.
    pub fn collect_subtree(&self, root: ObjId, out: &mut Vec<ObjId>) -> GuiResult<()> {
        self.obj_ref(root)?;
        let mut stack = alloc::vec![root];
        while let Some(id) = stack.pop() {
            let Some(o) = self.objs.get(id) else {
                continue;
            };
            out.push(id);
            stack.extend(o.children.iter().rev().copied());
        }
        Ok(())
    }
}
