//! Axis-aligned rectangles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle described by its top-left corner and size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub position: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// Create a rectangle from raw coordinates.
    #[must_use]
    pub const fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[must_use]
    pub fn left(&self) -> f32 {
        self.position.x
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    #[must_use]
    pub fn top(&self) -> f32 {
        self.position.y
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    /// Centre point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Grow the rectangle by `amount` on every side.
    #[must_use]
    pub fn expanded(&self, amount: f32) -> Self {
        Self {
            position: self.position - Vec2::splat(amount),
            size: self.size + Vec2::splat(amount * 2.0),
        }
    }

    /// Returns `true` if the interiors of the two rectangles intersect.
    ///
    /// All four half-plane comparisons are strict, so rectangles that only
    /// share an edge or a corner do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let r = Rect::from_xywh(10.0, 20.0, 5.0, 8.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 15.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.bottom(), 28.0);
        assert_eq!(r.center(), Vec2::new(12.5, 24.0));
    }

    #[test]
    fn test_overlapping_rects() {
        let a = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Rect::from_xywh(5.0, 5.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        let right = Rect::from_xywh(10.0, 0.0, 10.0, 10.0);
        let below = Rect::from_xywh(0.0, 10.0, 10.0, 10.0);
        let corner = Rect::from_xywh(10.0, 10.0, 5.0, 5.0);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
        assert!(!a.overlaps(&corner));
    }

    #[test]
    fn test_contained_rect_overlaps() {
        let outer = Rect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::from_xywh(40.0, 40.0, 1.0, 1.0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_expanded() {
        let r = Rect::from_xywh(10.0, 10.0, 4.0, 4.0).expanded(2.0);
        assert_eq!(r, Rect::from_xywh(8.0, 8.0, 8.0, 8.0));
    }
}
