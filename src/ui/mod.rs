// src/ui/mod.rs
//! GT GUI core
//!
//! This module provides the retained-mode widget system:
//! - Objects, classes and the widget tree
//! - Event dispatch with per-object pending masks
//! - Row-grow and flex layouts
//! - Drawing primitives and the pixel compositor

pub mod core;
pub mod draw;
pub mod error;
pub mod event;
pub mod layouts;
pub mod object;

// Re-export commonly used items
pub use draw::DrawCtx;
pub use draw::style::{FontAttr, ImgDsc, RectAttr, TextSize};
pub use error::{GuiError, GuiResult, ResultKind};
pub use event::{Event, EventCb, EventCode, EventFilter, EventMask, Param};
pub use layouts::{Alignment, Direction, FlexProps, Justify, LayoutType};
pub use object::{
    BASE_CLASS, BaseClass, BaseStyle, Obj, ObjClass, ObjFlags, ObjId, ObjType, ScrollDir,
};
