use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page space. `top <= bottom`, y grows downward
/// for pages produced by [`crate::pdf_source`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Closed-interval overlap on both axes; touching edges count.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.top <= other.bottom
            && other.top <= self.bottom
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A straight ruling line recovered from the drawing stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub orientation: Orientation,
}

impl LineSegment {
    /// Classify a segment as horizontal or vertical; `None` for diagonals.
    pub fn classify(x1: f64, y1: f64, x2: f64, y2: f64, tolerance: f64) -> Option<Self> {
        let orientation = if (y1 - y2).abs() < tolerance {
            Orientation::Horizontal
        } else if (x1 - x2).abs() < tolerance {
            Orientation::Vertical
        } else {
            return None;
        };

        Some(Self { x1, y1, x2, y2, orientation })
    }

    /// Coordinate along which rulings of this orientation are spaced
    /// (y for horizontal lines, x for vertical ones).
    pub fn position(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.y1,
            Orientation::Vertical => self.x1,
        }
    }

    /// The (min, max) interval the segment covers along its own direction.
    pub fn span(&self) -> (f64, f64) {
        match self.orientation {
            Orientation::Horizontal => (self.x1.min(self.x2), self.x1.max(self.x2)),
            Orientation::Vertical => (self.y1.min(self.y2), self.y1.max(self.y2)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_axis_aligned() {
        let h = LineSegment::classify(0.0, 10.0, 100.0, 10.4, 1.0).unwrap();
        assert_eq!(h.orientation, Orientation::Horizontal);
        assert_eq!(h.position(), 10.0);

        let v = LineSegment::classify(50.0, 0.0, 50.5, 60.0, 1.0).unwrap();
        assert_eq!(v.orientation, Orientation::Vertical);
        assert_eq!(v.span(), (0.0, 60.0));
    }

    #[test]
    fn test_classify_diagonal_is_none() {
        assert!(LineSegment::classify(0.0, 0.0, 40.0, 40.0, 1.0).is_none());
    }

    #[test]
    fn test_box_intersection_and_union() {
        let a = BoundingBox::new(0.0, 0.0, 100.0, 60.0);
        let b = BoundingBox::new(50.0, 30.0, 150.0, 90.0);
        let c = BoundingBox::new(200.0, 0.0, 300.0, 60.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_eq!(a.union(&b), BoundingBox::new(0.0, 0.0, 150.0, 90.0));
    }

    #[test]
    fn test_contains_point_is_inclusive() {
        let bbox = BoundingBox::new(0.0, 0.0, 100.0, 60.0);
        assert!(bbox.contains_point(0.0, 0.0));
        assert!(bbox.contains_point(100.0, 60.0));
        assert!(!bbox.contains_point(100.1, 30.0));
    }
}
