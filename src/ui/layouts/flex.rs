// src/ui/layouts/flex.rs
//! Single-line flex layout
//!
//! Children are placed along the main axis in child order (reversed for the
//! reverse directions). The container's corner radius is kept clear: the
//! usable main extent is the container extent minus the radius, and content
//! starts half a radius in from the leading edge.

use alloc::vec::Vec;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use super::LayoutType;
use crate::gui::Gui;
use crate::ui::error::{GuiError, GuiResult};
use crate::ui::object::ObjId;

/// Main axis and placement order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Left to right
    #[default]
    Horizontal,
    /// Left to right, last child first
    HorizontalReverse,
    /// Top to bottom
    Vertical,
    /// Top to bottom, last child first
    VerticalReverse,
}

impl Direction {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Horizontal | Direction::HorizontalReverse)
    }

    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Direction::HorizontalReverse | Direction::VerticalReverse
        )
    }
}

/// Distribution of children along the main axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Start,
    End,
    Center,
    /// First and last child touch the edges, equal gaps between
    SpaceBetween,
    /// Equal space around every child, half at the edges
    SpaceAround,
    /// Equal space between children and at both edges
    SpaceEvenly,
}

impl Justify {
    /// Space modes derive the gap from the slack and ignore the configured one.
    pub fn is_space(self) -> bool {
        matches!(
            self,
            Justify::SpaceBetween | Justify::SpaceAround | Justify::SpaceEvenly
        )
    }
}

/// Alignment of children along the cross axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlexProps {
    pub direction: Direction,
    pub justify: Justify,
    pub align_items: Alignment,
    /// Keep the configured cross size even when children are larger.
    pub shrink: bool,
    /// Gap between children for the non-space modes.
    pub gap: u16,
}

impl FlexProps {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn with_justify(mut self, justify: Justify) -> Self {
        self.justify = justify;
        self
    }

    pub fn with_alignment(mut self, align: Alignment) -> Self {
        self.align_items = align;
        self
    }

    pub fn with_gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_shrink(mut self, shrink: bool) -> Self {
        self.shrink = shrink;
        self
    }
}

/// Gap and leading offset for the space modes.
///
/// With no slack the content is centered and overflows both edges.
pub fn space_distribution(justify: Justify, slack: i32, count: i32) -> (i32, i32) {
    if count <= 0 {
        return (0, 0);
    }
    if slack <= 0 {
        return (0, slack / 2);
    }
    match justify {
        Justify::SpaceBetween if count > 1 => (slack / (count - 1), 0),
        Justify::SpaceAround => {
            let q = slack / count;
            (q, q / 2)
        }
        Justify::SpaceEvenly => {
            let q = slack / (count + 1);
            (q, q)
        }
        _ => (0, 0),
    }
}

/// Split an area into (main start, main length, cross start, cross length).
fn axes(horizontal: bool, r: &Rectangle) -> (i32, i32, i32, i32) {
    let (x, y) = (r.top_left.x, r.top_left.y);
    let (w, h) = (r.size.width as i32, r.size.height as i32);
    if horizontal { (x, w, y, h) } else { (y, h, x, w) }
}

fn point(horizontal: bool, main: i32, cross: i32) -> Point {
    if horizontal {
        Point::new(main, cross)
    } else {
        Point::new(cross, main)
    }
}

fn rect(horizontal: bool, main: i32, main_len: i32, cross: i32, cross_len: i32) -> Rectangle {
    let size = if horizontal {
        Size::new(main_len.max(0) as u32, cross_len.max(0) as u32)
    } else {
        Size::new(cross_len.max(0) as u32, main_len.max(0) as u32)
    };
    Rectangle::new(point(horizontal, main, cross), size)
}

impl Gui {
    /// Place the children of a flex container.
    ///
    /// Fails with [`GuiError::NestedFlex`] when the parent is a flex
    /// container that has already placed its own children.
    pub fn layout_update_core(&mut self, obj: ObjId) -> GuiResult<()> {
        let o = self.obj_ref(obj)?;
        if o.layout.kind != LayoutType::Flex {
            return Ok(());
        }
        if let Some(p) = o.parent
            && let Some(parent) = self.objs.get(p)
            && parent.layout.kind == LayoutType::Flex
            && parent.layout.placed
        {
            return Err(GuiError::NestedFlex);
        }

        let props = o.layout.flex;
        let area = o.area;
        let radius = o.radius as i32;
        let children: Vec<(ObjId, Rectangle)> = o
            .children
            .iter()
            .filter_map(|&c| {
                let child = self.objs.get(c)?;
                child.flags.visible.then_some((c, child.area))
            })
            .collect();
        if children.is_empty() {
            return Ok(());
        }

        let horizontal = props.direction.is_horizontal();
        let (main_start, main_len, cross_start, cross_len) = axes(horizontal, &area);
        let inset = radius / 2;
        let count = children.len() as i32;
        let total: i32 = children.iter().map(|(_, r)| axes(horizontal, r).1).sum();
        let max_cross = children
            .iter()
            .map(|(_, r)| axes(horizontal, r).3)
            .max()
            .unwrap_or(0);
        let cross_len = if !props.shrink && max_cross > cross_len {
            max_cross
        } else {
            cross_len
        };

        let (gap, lead) = if props.justify.is_space() {
            space_distribution(props.justify, main_len - radius - total, count)
        } else {
            (props.gap as i32, 0)
        };

        let mut cursor = main_start + inset + lead;
        let mut place = |gui: &mut Gui, child: ObjId, r: &Rectangle| {
            let (_, c_main, _, c_cross) = axes(horizontal, r);
            let cross = match props.align_items {
                Alignment::Start => cross_start,
                Alignment::Center => cross_start + (cross_len - c_cross) / 2,
                Alignment::End => cross_start + cross_len - c_cross,
            };
            let target = point(horizontal, cursor, cross);
            gui.move_subtree(child, target - r.top_left);
            cursor += c_main + gap;
        };
        if props.direction.is_reverse() {
            for (child, r) in children.iter().rev() {
                place(self, *child, r);
            }
        } else {
            for (child, r) in children.iter() {
                place(self, *child, r);
            }
        }

        let mut new_main_start = main_start;
        let mut new_main_len = main_len;
        if !props.justify.is_space() {
            let content = total + gap * (count - 1);
            if content + radius > main_len {
                let grow = content + radius - main_len;
                new_main_len = content + radius;
                match props.justify {
                    Justify::End => new_main_start -= grow,
                    Justify::Center => new_main_start -= grow / 2,
                    _ => {}
                }
            }
            let desired = match props.justify {
                Justify::End => new_main_start + new_main_len - (radius - inset) - content,
                Justify::Center => new_main_start + inset + (new_main_len - radius - content) / 2,
                _ => new_main_start + inset,
            };
            let delta = desired - (main_start + inset);
            if delta != 0 {
                for (child, _) in &children {
                    self.move_subtree(*child, point(horizontal, delta, 0));
                }
            }
        }

        let new_area = rect(horizontal, new_main_start, new_main_len, cross_start, cross_len);
        self.invalidate(obj);
        let o = self.obj_mut(obj)?;
        o.layout.placed = true;
        o.area = new_area;
        self.invalidate(obj);
        Ok(())
    }
}
