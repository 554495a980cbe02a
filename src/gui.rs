//! The GUI root: owns objects, memory pool, dispatcher and display.
//!
//! ```ignore
//! let mut gui = Gui::new(GuiConfig::default())?;
//! let scr = gui.create_obj(None)?;
//! let btn = gui.create_obj(Some(scr))?;
//! gui.set_area(btn, Rectangle::new(Point::new(10, 10), Size::new(80, 30)))?;
//!
//! loop {
//!     gui.task_handler();
//!     gui.flush(&mut panel)?;
//! }
//! ```

use alloc::vec::Vec;
use core::any::Any;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::{debug, info};

use crate::config::{ConfigError, GuiConfig};
use crate::display::Display;
use crate::mem::{MemPool, MemStats};
use crate::ui::core::AreaExt;
use crate::ui::error::{GuiError, GuiResult};
use crate::ui::event::{Dispatch, EventCode};
use crate::ui::object::{Obj, ObjArena, ObjId};

pub struct Gui {
    pub(crate) config: GuiConfig,
    pub(crate) pool: MemPool,
    pub(crate) objs: ObjArena,
    pub(crate) display: Display,
    pub(crate) dispatch: Dispatch,
    pub(crate) pending_destroy: Vec<ObjId>,
}

impl Gui {
    pub fn new(config: GuiConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            "GUI {}x{}, pool {} bytes",
            config.hor_res, config.ver_res, config.mem_capacity
        );
        Ok(Self {
            pool: MemPool::new(config.mem_capacity as usize),
            objs: ObjArena::default(),
            display: Display::new(&config),
            dispatch: Dispatch::default(),
            pending_destroy: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &GuiConfig {
        &self.config
    }

    pub fn mem_stats(&self) -> MemStats {
        self.pool.stats()
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn obj(&self, id: ObjId) -> Option<&Obj> {
        self.objs.get(id)
    }

    /// Number of live objects across all screens.
    pub fn obj_count(&self) -> usize {
        self.objs.len()
    }

    pub fn style<S: Any>(&self, id: ObjId) -> Option<&S> {
        self.objs.get(id)?.style()
    }

    /// Mutable style access. Send `UpdateStyle` afterwards to redraw.
    pub fn style_mut<S: Any>(&mut self, id: ObjId) -> Option<&mut S> {
        let obj = self.objs.get_mut(id)?;
        if obj.flags.delate {
            return None;
        }
        obj.style_mut()
    }

    pub(crate) fn obj_ref(&self, id: ObjId) -> GuiResult<&Obj> {
        self.objs.get(id).ok_or(GuiError::StaleObject(id))
    }

    pub(crate) fn obj_mut(&mut self, id: ObjId) -> GuiResult<&mut Obj> {
        self.objs.get_mut(id).ok_or(GuiError::StaleObject(id))
    }

    /// Like `obj_mut`, but refuses objects marked for deletion.
    pub(crate) fn live_mut(&mut self, id: ObjId) -> GuiResult<&mut Obj> {
        let obj = self.obj_mut(id)?;
        if obj.flags.delate {
            return Err(GuiError::PendingDelete);
        }
        Ok(obj)
    }

    /// Queue the object's area for redraw and tell its class with
    /// `DrawStart` on the next tick.
    pub fn invalidate(&mut self, obj: ObjId) {
        if self.mark_dirty(obj) {
            self.raise(obj, EventCode::DrawStart).ok();
        }
    }

    /// Queue the object's area for redraw without raising an event.
    pub(crate) fn mark_dirty(&mut self, obj: ObjId) -> bool {
        let Some(o) = self.objs.get(obj) else {
            return false;
        };
        let area = o.area;
        self.display.invalidate_area(area);
        true
    }

    pub fn invalidate_area(&mut self, area: Rectangle) {
        self.display.invalidate_area(area);
    }

    /// Make `scr` the screen that is rendered. The screen shown before is
    /// remembered for [`Gui::go_back`].
    pub fn load_screen(&mut self, scr: ObjId) -> GuiResult<()> {
        if !self.display.screens().contains(&scr) {
            return Err(GuiError::NotFound);
        }
        self.display.push_screen(scr);
        self.redraw_screen(scr);
        Ok(())
    }

    /// Return to the most recent screen in the history that still exists.
    pub fn go_back(&mut self) -> GuiResult<ObjId> {
        let scr = self.display.pop_screen().ok_or(GuiError::NotFound)?;
        self.redraw_screen(scr);
        debug!("Back to screen {:?}", scr);
        Ok(scr)
    }

    /// Screen shown before the active one.
    pub fn prev_screen(&self) -> Option<ObjId> {
        self.display.prev_screen()
    }

    /// Raise `DrawStart` on every object of a newly shown screen.
    pub(crate) fn redraw_screen(&mut self, scr: ObjId) {
        let mut subtree = Vec::new();
        if self.collect_subtree(scr, &mut subtree).is_err() {
            return;
        }
        for obj in subtree {
            self.raise(obj, EventCode::DrawStart).ok();
        }
    }

    pub fn set_screen_bgcolor(&mut self, scr: ObjId, color: Rgb565) -> GuiResult<()> {
        if self.obj_ref(scr)?.parent.is_some() {
            return Err(GuiError::NotFound);
        }
        self.set_bgcolor(scr, color)
    }

    /// Topmost visible object of the active screen containing `point`.
    pub fn obj_at_point(&self, point: Point) -> Option<ObjId> {
        let scr = self.display.active_screen()?;
        self.hit_test(scr, point)
    }

    fn hit_test(&self, id: ObjId, point: Point) -> Option<ObjId> {
        let obj = self.objs.get(id)?;
        if !obj.flags.visible {
            return None;
        }
        for &child in obj.children().iter().rev() {
            if let Some(hit) = self.hit_test(child, point) {
                return Some(hit);
            }
        }
        (!obj.flags.is_virtual && obj.area.contains_point(point)).then_some(id)
    }

    /// One GUI tick.
    ///
    /// Destroys deferred objects, delivers every pending event once, then
    /// renders the invalid areas. Returns the number of areas rendered.
    pub fn task_handler(&mut self) -> usize {
        self.process_pending_destroy();
        self.event_system_pass();
        self.display.refresh(&self.objs)
    }

    /// Push the rendered changes to the panel.
    pub fn flush<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.display.flush(target)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::config::BlendWalk;
    use crate::display::SCREEN_HISTORY_DEPTH;
    use crate::test_support::{LABEL_CLASS, class_log, gui, reset_class_log, settle};
    use crate::ui::core::area;
    use crate::ui::draw::color::{BLUE, RED, WHITE};
    use crate::ui::event::{EventCode, Param};

    #[test]
    fn test_rejects_invalid_config() {
        assert!(Gui::new(GuiConfig::default().with_resolution(0, 0)).is_err());
    }

    #[test]
    fn test_hit_test_prefers_topmost_child() {
        let mut gui = gui();
        let scr = gui.create_obj(None).unwrap();
        let back = gui.create_obj(Some(scr)).unwrap();
        let front = gui.create_obj(Some(scr)).unwrap();
        gui.set_area(back, area(0, 0, 100, 100)).unwrap();
        gui.set_area(front, area(50, 50, 100, 100)).unwrap();

        assert_eq!(gui.obj_at_point(Point::new(60, 60)), Some(front));
        assert_eq!(gui.obj_at_point(Point::new(10, 10)), Some(back));
        assert_eq!(gui.obj_at_point(Point::new(700, 400)), Some(scr));

        gui.set_visible(front, false).unwrap();
        assert_eq!(gui.obj_at_point(Point::new(60, 60)), Some(back));
    }

    #[test]
    fn test_tick_renders_screen_and_children() {
        let mut gui = gui();
        let scr = gui.create_obj(None).unwrap();
        gui.set_screen_bgcolor(scr, BLUE).unwrap();
        let card = gui.create_obj(Some(scr)).unwrap();
        gui.set_area(card, area(10, 10, 20, 20)).unwrap();
        gui.set_radius(card, 0).unwrap();
        gui.set_show_bg(card, true).unwrap();
        gui.set_bgcolor(card, RED).unwrap();

        assert!(gui.task_handler() > 0);
        let fb = gui.display().framebuffer();
        assert_eq!(fb.pixel(Point::new(0, 0)), Some(BLUE));
        assert_eq!(fb.pixel(Point::new(15, 15)), Some(RED));
        assert_eq!(fb.pixel(Point::new(30, 30)), Some(BLUE));
        assert!(gui.display().invalid_areas().is_empty());
        assert_eq!(gui.task_handler(), 0);
    }

    #[test]
    fn test_walk_order_does_not_change_output() {
        let render = |walk: BlendWalk| {
            let mut gui = Gui::new(
                GuiConfig::default()
                    .with_resolution(64, 48)
                    .with_blend_walk(walk),
            )
            .unwrap();
            let scr = gui.create_obj(None).unwrap();
            let card = gui.create_obj(Some(scr)).unwrap();
            gui.set_area(card, area(5, 5, 30, 20)).unwrap();
            gui.set_radius(card, 7).unwrap();
            gui.set_opa(card, 150).unwrap();
            gui.set_show_bg(card, true).unwrap();
            gui.set_bgcolor(card, WHITE).unwrap();
            let label = gui.create(&LABEL_CLASS, Some(scr)).unwrap();
            gui.set_area(label, area(8, 30, 50, 12)).unwrap();
            gui.task_handler();
            gui.display().framebuffer().pixels().to_vec()
        };
        assert_eq!(render(BlendWalk::Horizontal), render(BlendWalk::Vertical));
    }

    #[test]
    fn test_inside_child_is_clipped_to_parent() {
        let mut gui = gui();
        let scr = gui.create_obj(None).unwrap();
        gui.set_screen_bgcolor(scr, BLUE).unwrap();
        let frame = gui.create_obj(Some(scr)).unwrap();
        gui.set_area(frame, area(0, 0, 10, 10)).unwrap();
        let child = gui.create_obj(Some(frame)).unwrap();
        gui.set_area(child, area(5, 5, 20, 20)).unwrap();
        gui.set_radius(child, 0).unwrap();
        gui.set_show_bg(child, true).unwrap();
        gui.set_bgcolor(child, RED).unwrap();
        gui.set_inside(child, true).unwrap();

        gui.task_handler();
        let fb = gui.display().framebuffer();
        assert_eq!(fb.pixel(Point::new(7, 7)), Some(RED));
        assert_eq!(fb.pixel(Point::new(15, 15)), Some(BLUE));
    }

    #[test]
    fn test_destroying_active_screen_falls_back() {
        let mut gui = gui();
        let first = gui.create_obj(None).unwrap();
        let second = gui.create_obj(None).unwrap();
        assert_eq!(gui.display().active_screen(), Some(first));
        gui.load_screen(second).unwrap();
        gui.destroy(second).unwrap();
        assert_eq!(gui.display().active_screen(), Some(first));
        assert_eq!(gui.load_screen(second), Err(GuiError::NotFound));
    }

    #[test]
    fn test_property_changes_notify_class() {
        let mut gui = gui();
        let scr = gui.create_obj(None).unwrap();
        let label = gui.create(&LABEL_CLASS, Some(scr)).unwrap();
        settle(&mut gui);
        reset_class_log();

        gui.set_opa(label, 100).unwrap();
        gui.set_visible(label, false).unwrap();
        gui.set_visible(label, true).unwrap();
        assert!(class_log().is_empty());
        gui.task_handler();
        assert_eq!(class_log(), vec![(label, EventCode::DrawStart)]);
        gui.task_handler();
        assert_eq!(
            class_log(),
            vec![(label, EventCode::DrawStart), (label, EventCode::DrawEnd)]
        );
        gui.task_handler();
        assert_eq!(class_log().len(), 2);
    }

    #[test]
    fn test_load_screen_redraws_its_objects() {
        let mut gui = gui();
        let first = gui.create_obj(None).unwrap();
        let second = gui.create_obj(None).unwrap();
        let label = gui.create(&LABEL_CLASS, Some(second)).unwrap();
        settle(&mut gui);
        reset_class_log();

        gui.load_screen(second).unwrap();
        gui.task_handler();
        assert_eq!(class_log(), vec![(label, EventCode::DrawStart)]);
        assert_eq!(gui.prev_screen(), Some(first));
    }

    #[test]
    fn test_go_back_walks_screen_history() {
        let mut gui = gui();
        let a = gui.create_obj(None).unwrap();
        let b = gui.create_obj(None).unwrap();
        let c = gui.create_obj(None).unwrap();
        assert_eq!(gui.prev_screen(), None);

        gui.load_screen(b).unwrap();
        gui.load_screen(c).unwrap();
        assert_eq!(gui.display().history(), &[a, b]);
        assert_eq!(gui.prev_screen(), Some(b));

        assert_eq!(gui.go_back(), Ok(b));
        assert_eq!(gui.display().active_screen(), Some(b));
        assert_eq!(gui.go_back(), Ok(a));
        assert_eq!(gui.go_back(), Err(GuiError::NotFound));
        assert_eq!(gui.display().active_screen(), Some(a));
    }

    #[test]
    fn test_screen_history_forgets_oldest() {
        let mut gui = gui();
        let screens: Vec<ObjId> = (0..SCREEN_HISTORY_DEPTH + 2)
            .map(|_| gui.create_obj(None).unwrap())
            .collect();
        for &scr in &screens[1..] {
            gui.load_screen(scr).unwrap();
        }
        let history = gui.display().history();
        assert_eq!(history.len(), SCREEN_HISTORY_DEPTH);
        assert_eq!(history[0], screens[1]);
        assert_eq!(gui.prev_screen(), Some(screens[SCREEN_HISTORY_DEPTH]));
    }

    #[test]
    fn test_destroyed_screen_leaves_history() {
        let mut gui = gui();
        let a = gui.create_obj(None).unwrap();
        let b = gui.create_obj(None).unwrap();
        let c = gui.create_obj(None).unwrap();
        let d = gui.create_obj(None).unwrap();
        gui.load_screen(b).unwrap();
        gui.load_screen(c).unwrap();
        gui.load_screen(d).unwrap();

        gui.destroy(c).unwrap();
        assert_eq!(gui.display().history(), &[a, b]);
        gui.destroy(d).unwrap();
        assert_eq!(gui.display().active_screen(), Some(b));
        assert_eq!(gui.go_back(), Ok(a));
    }

    #[test]
    fn test_flush_after_tick() {
        use embedded_graphics::mock_display::MockDisplay;

        let mut gui = Gui::new(GuiConfig::default().with_resolution(32, 32)).unwrap();
        let scr = gui.create_obj(None).unwrap();
        gui.task_handler();
        let mut panel: MockDisplay<Rgb565> = MockDisplay::new();
        gui.flush(&mut panel).unwrap();
        assert_eq!(panel.affected_area(), area(0, 0, 32, 32));

        gui.send(scr, EventCode::UpdateStyle, Param::None).unwrap();
        assert!(gui.display().framebuffer().dirty_area().is_none());
    }
}
