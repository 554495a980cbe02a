#![no_std]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod config;
pub mod display;
pub mod framebuffer;
pub mod gui;
pub mod mem;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use config::{BlendWalk, ConfigError, GuiConfig};
pub use display::Display;
pub use framebuffer::FrameBuffer;
pub use gui::Gui;
pub use mem::{MemPool, MemStats};
pub use ui::{
    Event, EventCb, EventCode, EventFilter, GuiError, GuiResult, Obj, ObjClass, ObjId, ObjType,
    Param, ResultKind,
};
