use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::BoundingBox;
use super::detector::GridCandidate;

/// One physically distinct ruled grid after duplicate detections are folded
/// together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRegion {
    pub bounding_box: BoundingBox,
    pub row_count: usize,
    pub col_count: usize,
    /// How many raw candidates were folded into this region
    pub merged_candidates: usize,
}

impl From<&GridCandidate> for TableRegion {
    fn from(candidate: &GridCandidate) -> Self {
        Self {
            bounding_box: candidate.bounding_box,
            row_count: candidate.row_count,
            col_count: candidate.col_count,
            merged_candidates: 1,
        }
    }
}

impl TableRegion {
    fn absorb(&mut self, candidate: &GridCandidate) {
        self.bounding_box = self.bounding_box.union(&candidate.bounding_box);
        self.row_count = self.row_count.max(candidate.row_count);
        self.col_count = self.col_count.max(candidate.col_count);
        self.merged_candidates += 1;
    }
}

/// Fold candidates, in discovery order, into canonical regions.
///
/// A candidate joins the *first* region it overlaps on both axes. A candidate
/// bridging two regions that don't overlap each other only joins the first
/// one; the two regions are not reconciled.
pub fn merge_candidates(candidates: &[GridCandidate]) -> Vec<TableRegion> {
    let mut regions: Vec<TableRegion> = Vec::new();

    for candidate in candidates {
        match regions
            .iter_mut()
            .find(|region| region.bounding_box.intersects(&candidate.bounding_box))
        {
            Some(region) => region.absorb(candidate),
            None => regions.push(TableRegion::from(candidate)),
        }
    }

    debug!(candidates = candidates.len(), regions = regions.len(), "merged grid candidates");
    regions
}
