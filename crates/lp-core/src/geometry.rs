//! Plan-view geometry shared by the network and layout crates.

use serde::{Deserialize, Serialize};

use crate::numeric::{Real, lerp};

/// A 2-D point in the network's plan coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: Real,
    pub y: Real,
}

impl Point {
    pub fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }

    /// Point a fraction `t` of the way from `self` to `other`.
    pub fn along(self, other: Point, t: Real) -> Point {
        Point {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
        }
    }

    pub fn midpoint(self, other: Point) -> Point {
        self.along(other, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn along_and_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 4.0);
        assert_eq!(a.midpoint(b), Point::new(5.0, 2.0));
        assert_eq!(a.along(b, 0.25), Point::new(2.5, 1.0));
    }
}
