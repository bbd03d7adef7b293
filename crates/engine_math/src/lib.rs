//! # engine_math
//!
//! Math types for the entity-component framework. Re-exports [`glam`] for
//! linear algebra and defines the small set of 2D spatial helpers the query
//! engine and the demo game share.

pub mod rect;

// Re-export glam types for convenience.
pub use glam::{Vec2, vec2};

pub use rect::Rect;

/// Squared euclidean distance between two points.
///
/// Range checks compare against a squared radius so no square root is taken.
#[must_use]
pub fn distance_sq(a: Vec2, b: Vec2) -> f32 {
    let d = a - b;
    d.x * d.x + d.y * d.y
}

/// Sign of `value` as `-1`, `0` or `1`.
#[must_use]
pub fn sgn(value: f32) -> i32 {
    i32::from(0.0 < value) - i32::from(value < 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_sq() {
        assert_eq!(distance_sq(Vec2::ZERO, Vec2::new(3.0, 4.0)), 25.0);
        assert_eq!(distance_sq(Vec2::ONE, Vec2::ONE), 0.0);
    }

    #[test]
    fn test_sgn() {
        assert_eq!(sgn(-0.5), -1);
        assert_eq!(sgn(0.0), 0);
        assert_eq!(sgn(12.0), 1);
    }
}
