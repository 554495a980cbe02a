// src/ui/core.rs
//! Geometry helpers shared by the layout solver, compositor and display.
//!
//! Areas are `embedded_graphics` rectangles in absolute screen coordinates.
//! The exclusive right edge of an area is `x + w`.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Extra operations on areas.
pub trait AreaExt {
    /// Exclusive right edge.
    fn x2(&self) -> i32;
    /// Exclusive bottom edge.
    fn y2(&self) -> i32;
    /// Smallest area containing both.
    fn join(&self, other: &Rectangle) -> Rectangle;
    /// Overlapping part, `None` when the areas are disjoint.
    fn clip(&self, other: &Rectangle) -> Option<Rectangle>;
    /// True when the areas overlap or share an edge.
    fn touches(&self, other: &Rectangle) -> bool;
    fn contains_point(&self, p: Point) -> bool;
    fn pixel_count(&self) -> u32;
}

impl AreaExt for Rectangle {
    fn x2(&self) -> i32 {
        self.top_left.x + self.size.width as i32
    }

    fn y2(&self) -> i32 {
        self.top_left.y + self.size.height as i32
    }

    fn join(&self, other: &Rectangle) -> Rectangle {
        if self.is_zero_sized() {
            return *other;
        }
        if other.is_zero_sized() {
            return *self;
        }
        let min_x = self.top_left.x.min(other.top_left.x);
        let min_y = self.top_left.y.min(other.top_left.y);
        let max_x = self.x2().max(other.x2());
        let max_y = self.y2().max(other.y2());

        Rectangle::new(
            Point::new(min_x, min_y),
            Size::new((max_x - min_x) as u32, (max_y - min_y) as u32),
        )
    }

    fn clip(&self, other: &Rectangle) -> Option<Rectangle> {
        let min_x = self.top_left.x.max(other.top_left.x);
        let min_y = self.top_left.y.max(other.top_left.y);
        let max_x = self.x2().min(other.x2());
        let max_y = self.y2().min(other.y2());
        if max_x <= min_x || max_y <= min_y {
            return None;
        }
        Some(Rectangle::new(
            Point::new(min_x, min_y),
            Size::new((max_x - min_x) as u32, (max_y - min_y) as u32),
        ))
    }

    fn touches(&self, other: &Rectangle) -> bool {
        self.top_left.x <= other.x2()
            && other.top_left.x <= self.x2()
            && self.top_left.y <= other.y2()
            && other.top_left.y <= self.y2()
    }

    fn contains_point(&self, p: Point) -> bool {
        p.x >= self.top_left.x && p.x < self.x2() && p.y >= self.top_left.y && p.y < self.y2()
    }

    fn pixel_count(&self) -> u32 {
        self.size.width * self.size.height
    }
}

/// Build an area from signed position and unsigned extent.
pub fn area(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
    Rectangle::new(Point::new(x, y), Size::new(w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_covers_both() {
        let a = area(0, 0, 10, 10);
        let b = area(20, 5, 5, 20);
        assert_eq!(a.join(&b), area(0, 0, 25, 25));
        assert_eq!(Rectangle::zero().join(&b), b);
    }

    #[test]
    fn test_clip_disjoint_is_none() {
        let a = area(0, 0, 10, 10);
        assert_eq!(a.clip(&area(10, 0, 5, 5)), None);
        assert_eq!(a.clip(&area(5, 5, 10, 10)), Some(area(5, 5, 5, 5)));
    }

    #[test]
    fn test_touching_edges() {
        let a = area(0, 0, 10, 10);
        assert!(a.touches(&area(10, 0, 5, 5)));
        assert!(!a.touches(&area(11, 0, 5, 5)));
    }

    #[test]
    fn test_exclusive_right_edge() {
        let a = area(3, 4, 10, 2);
        assert_eq!(a.x2(), 13);
        assert!(a.contains_point(Point::new(12, 5)));
        assert!(!a.contains_point(Point::new(13, 5)));
    }
}
