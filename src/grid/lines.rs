use tracing::{debug, trace};

use crate::geometry::{LineSegment, Orientation};
use crate::operators::PathOp;

/// Ruling lines of one page, split by orientation and sorted along the
/// spacing axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLines {
    /// Sorted ascending by y
    pub horizontal: Vec<LineSegment>,
    /// Sorted ascending by x
    pub vertical: Vec<LineSegment>,
}

impl PageLines {
    pub fn is_empty(&self) -> bool {
        self.horizontal.is_empty() && self.vertical.is_empty()
    }
}

/// Replay a page's path operators and collect the axis-aligned segments.
///
/// `MoveTo` resets the pen, `LineTo` emits a segment from the previous pen
/// position and advances it. A `LineTo` before any `MoveTo` just places the
/// pen. Diagonal segments are dropped.
pub fn extract_lines(operators: &[PathOp], tolerance: f64) -> PageLines {
    let mut lines = PageLines::default();
    let mut pen: Option<(f64, f64)> = None;
    let mut diagonals = 0usize;

    for op in operators {
        match *op {
            PathOp::MoveTo { x, y } => pen = Some((x, y)),
            PathOp::LineTo { x, y } => {
                if let Some((px, py)) = pen {
                    match LineSegment::classify(px, py, x, y, tolerance) {
                        Some(segment) => match segment.orientation {
                            Orientation::Horizontal => lines.horizontal.push(segment),
                            Orientation::Vertical => lines.vertical.push(segment),
                        },
                        None => {
                            trace!(px, py, x, y, "dropping diagonal segment");
                            diagonals += 1;
                        }
                    }
                }
                pen = Some((x, y));
            }
            PathOp::Other => {}
        }
    }

    lines.horizontal.sort_by(|a, b| a.position().total_cmp(&b.position()));
    lines.vertical.sort_by(|a, b| a.position().total_cmp(&b.position()));

    debug!(
        horizontal = lines.horizontal.len(),
        vertical = lines.vertical.len(),
        diagonals,
        "extracted ruling lines"
    );

    lines
}
