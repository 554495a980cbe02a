//! Widget objects and the arena that owns them.
//!
//! Objects live in a generational arena owned by [`Gui`](crate::Gui). The
//! tree is expressed through [`ObjId`] handles: a parent lists its children
//! in insertion order and every child records its parent. A handle that
//! outlives its object is detected by the generation check and never
//! aliases a newer object.

pub mod base;
pub mod class;
pub mod props;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::mem::{Block, PoolVec};
use crate::ui::event::{EventAttr, EventMask};
use crate::ui::layouts::LayoutProps;

pub use base::{BASE_CLASS, BaseClass, BaseStyle};
pub use class::ObjClass;

/// Handle to an object in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId {
    index: u32,
    generation: u32,
}

/// Widget type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjType {
    Unknown,
    /// The generic base object. Screens and plain containers.
    Obj,
    Rect,
    Label,
    Btn,
    Img,
    Group,
    Input,
    Slider,
    Custom(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDir {
    Disable,
    Horizontal,
    Vertical,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjFlags {
    pub visible: bool,
    pub disabled: bool,
    /// Marked for deletion; no further mutation.
    pub delate: bool,
    pub focus: bool,
    pub focus_disabled: bool,
    /// Position is managed by the application, not by scrolling.
    pub fixed: bool,
    /// Content may extend past the parent.
    pub overflow: bool,
    /// Drawing is clipped to the parent area.
    pub inside: bool,
    /// Layout-transparent grouping node.
    pub is_virtual: bool,
    /// Row-grow runs from the right edge towards the left.
    pub grow_invert: bool,
    /// Events continue to the parent after the target handled them.
    pub bubble_notify: bool,
    pub show_bg: bool,
    pub scroll_dir: ScrollDir,
}

impl Default for ObjFlags {
    fn default() -> Self {
        Self {
            visible: true,
            disabled: false,
            delate: false,
            focus: false,
            focus_disabled: false,
            fixed: false,
            overflow: false,
            inside: false,
            is_virtual: false,
            grow_invert: false,
            bubble_notify: false,
            show_bg: false,
            scroll_dir: ScrollDir::All,
        }
    }
}

/// Input processing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessAttr {
    /// Last input point relative to the object.
    pub point: Point,
    /// Accumulated scroll offset.
    pub scroll: Point,
}

/// Class-specific style payload, charged to the pool.
pub(crate) struct StyleBox {
    pub(crate) data: Box<dyn Any>,
    pub(crate) block: Block,
}

pub struct Obj {
    pub(crate) class: Option<&'static dyn ObjClass>,
    pub(crate) parent: Option<ObjId>,
    pub(crate) children: PoolVec<ObjId>,
    pub(crate) style: Option<StyleBox>,
    pub(crate) event_attr: PoolVec<EventAttr>,
    pub(crate) event_mask: EventMask,
    pub(crate) block: Option<Block>,
    pub(crate) id: Option<i32>,
    pub(crate) area: Rectangle,
    pub(crate) opa: u8,
    pub(crate) radius: u16,
    pub(crate) flags: ObjFlags,
    pub(crate) layout: LayoutProps,
    pub process_attr: ProcessAttr,
}

impl Obj {
    pub(crate) fn new(
        class: &'static dyn ObjClass,
        parent: Option<ObjId>,
        radius: u16,
        block: Block,
        style: StyleBox,
    ) -> Self {
        Self {
            class: Some(class),
            parent,
            children: PoolVec::new(),
            style: Some(style),
            event_attr: PoolVec::new(),
            event_mask: EventMask::empty(),
            block: Some(block),
            id: None,
            area: Rectangle::zero(),
            opa: crate::ui::draw::color::OPA_COVER,
            radius,
            flags: ObjFlags::default(),
            layout: LayoutProps::default(),
            process_attr: ProcessAttr::default(),
        }
    }

    pub fn obj_type(&self) -> ObjType {
        self.class.map_or(ObjType::Unknown, |c| c.obj_type())
    }

    pub fn parent(&self) -> Option<ObjId> {
        self.parent
    }

    pub fn children(&self) -> &[ObjId] {
        self.children.as_slice()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn area(&self) -> Rectangle {
        self.area
    }

    pub fn x(&self) -> i32 {
        self.area.top_left.x
    }

    pub fn y(&self) -> i32 {
        self.area.top_left.y
    }

    pub fn w(&self) -> u32 {
        self.area.size.width
    }

    pub fn h(&self) -> u32 {
        self.area.size.height
    }

    pub fn opa(&self) -> u8 {
        self.opa
    }

    pub fn radius(&self) -> u16 {
        self.radius
    }

    pub fn flags(&self) -> &ObjFlags {
        &self.flags
    }

    pub fn layout(&self) -> &LayoutProps {
        &self.layout
    }

    pub fn event_mask(&self) -> EventMask {
        self.event_mask
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub fn style<S: Any>(&self) -> Option<&S> {
        self.style.as_ref()?.data.downcast_ref()
    }

    pub fn style_mut<S: Any>(&mut self) -> Option<&mut S> {
        self.style.as_mut()?.data.downcast_mut()
    }
}

struct Slot {
    generation: u32,
    obj: Option<Obj>,
}

/// Generational storage for objects.
#[derive(Default)]
pub(crate) struct ObjArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl ObjArena {
    pub(crate) fn insert(&mut self, obj: Obj) -> ObjId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.obj = Some(obj);
            return ObjId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            obj: Some(obj),
        });
        ObjId {
            index,
            generation: 0,
        }
    }

    pub(crate) fn get(&self, id: ObjId) -> Option<&Obj> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.obj.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: ObjId) -> Option<&mut Obj> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.obj.as_mut()
    }

    pub(crate) fn contains(&self, id: ObjId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn remove(&mut self, id: ObjId) -> Option<Obj> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let obj = slot.obj.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(obj)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}
