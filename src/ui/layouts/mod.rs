// src/ui/layouts/mod.rs
//! Layout solvers for arranging children inside a container object
//!
//! - Row-grow: children flow left to right (or right to left) by width
//! - Flex: single-line flexbox with justification, alignment and gaps

pub mod flex;
pub mod row_grow;

use log::warn;

pub use flex::{Alignment, Direction, FlexProps, Justify, space_distribution};

use crate::gui::Gui;
use crate::ui::error::GuiResult;
use crate::ui::object::ObjId;

/// Layout applied to an object's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutType {
    #[default]
    None,
    RowGrow,
    Flex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutProps {
    pub kind: LayoutType,
    pub flex: FlexProps,
    /// Children have been placed by a flex pass at least once.
    pub(crate) placed: bool,
}

impl LayoutProps {
    pub fn placed(&self) -> bool {
        self.placed
    }
}

impl Gui {
    /// Flow children in a row, sized by their widths.
    pub fn set_row_layout(&mut self, obj: ObjId, enabled: bool) -> GuiResult<()> {
        let layout = &mut self.live_mut(obj)?.layout;
        if enabled {
            layout.kind = LayoutType::RowGrow;
        } else if layout.kind == LayoutType::RowGrow {
            layout.kind = LayoutType::None;
        }
        self.layout_update(obj)
    }

    /// Turn `obj` into a flex container and place its children.
    pub fn set_flex(&mut self, obj: ObjId, props: FlexProps) -> GuiResult<()> {
        let layout = &mut self.live_mut(obj)?.layout;
        layout.kind = LayoutType::Flex;
        layout.flex = props;
        self.layout_update(obj)
    }

    /// Re-run whatever layout `obj` carries.
    pub fn layout_update(&mut self, obj: ObjId) -> GuiResult<()> {
        match self.obj_ref(obj)?.layout.kind {
            LayoutType::None => Ok(()),
            LayoutType::RowGrow => self.row_grow(obj),
            LayoutType::Flex => self.layout_update_core(obj),
        }
    }

    /// Layout after a structural change; failures are logged, not returned.
    pub(crate) fn relayout(&mut self, obj: ObjId) {
        if let Err(e) = self.layout_update(obj) {
            warn!("Layout of {:?} skipped: {}", obj, e);
        }
    }
}
