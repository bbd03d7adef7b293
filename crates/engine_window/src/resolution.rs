//! Display resolutions.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A window or display resolution in pixels.
///
/// Ordered by area first. Resolutions with the same area are ordered by
/// width, then height, so that ordering agrees with equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Resolution {
    pub width: i32,
    pub height: i32,
}

impl Resolution {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Pixel count, widened so large modes cannot overflow.
    #[must_use]
    pub fn area(&self) -> i64 {
        i64::from(self.width) * i64::from(self.height)
    }
}

impl Ord for Resolution {
    fn cmp(&self, other: &Self) -> Ordering {
        self.area()
            .cmp(&other.area())
            .then(self.width.cmp(&other.width))
            .then(self.height.cmp(&other.height))
    }
}

impl PartialOrd for Resolution {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_by_area() {
        let small = Resolution::new(1280, 720);
        let large = Resolution::new(1920, 1080);
        assert!(small < large);
        assert!(Resolution::new(4000, 10) < small);
    }

    #[test]
    fn test_equal_area_is_not_equal() {
        let wide = Resolution::new(200, 100);
        let tall = Resolution::new(100, 200);
        assert_eq!(wide.area(), tall.area());
        assert_ne!(wide, tall);
        assert_eq!(tall.cmp(&wide), Ordering::Less);
    }

    #[test]
    fn test_display() {
        assert_eq!(Resolution::new(1280, 720).to_string(), "(1280,720)");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&Resolution::new(800, 600)).unwrap();
        assert_eq!(json, r#"{"width":800,"height":600}"#);
    }
}
