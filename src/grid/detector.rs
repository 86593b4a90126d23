use tracing::debug;

use crate::config::DetectionConfig;
use crate::geometry::{BoundingBox, LineSegment};
use super::lines::PageLines;

/// A regular run of rulings on both axes. `row_count`/`col_count` are the
/// number of ruling lines in each run, not the number of bands between them.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCandidate {
    pub bounding_box: BoundingBox,
    pub row_count: usize,
    pub col_count: usize,
    pub horizontal_lines: Vec<LineSegment>,
    pub vertical_lines: Vec<LineSegment>,
}

/// Find every regularly spaced ruling grid on a page.
///
/// Each (horizontal, vertical) start pair grows a run on both axes until the
/// first gap outside the configured window. The same physical table is
/// reported once per start pair that lands inside it; [`super::merger`]
/// collapses the duplicates.
///
/// With `split_connected_rulings` the lines are first grouped into clusters
/// of rulings that touch each other, and runs never cross cluster borders.
/// Rulings count as touching when they come within one minimum gap of each
/// other, so inner rules drawn short of the border stay in the grid.
pub fn detect_grids(lines: &PageLines, config: &DetectionConfig) -> Vec<GridCandidate> {
    let mut candidates = Vec::new();

    if config.split_connected_rulings {
        let clusters = ruling_clusters(&lines.horizontal, &lines.vertical, config);
        debug!(clusters = clusters.len(), "grouped rulings into clusters");
        for (horizontal, vertical) in clusters {
            detect_in(&horizontal, &vertical, config, &mut candidates);
        }
    } else {
        detect_in(&lines.horizontal, &lines.vertical, config, &mut candidates);
    }

    debug!(candidates = candidates.len(), "grid candidates detected");
    candidates
}

fn detect_in(
    horizontal: &[LineSegment],
    vertical: &[LineSegment],
    config: &DetectionConfig,
    out: &mut Vec<GridCandidate>,
) {
    // Run lengths depend only on the start index of their own axis
    let row_runs: Vec<usize> = (0..horizontal.len())
        .map(|h| run_length(horizontal, h, config.min_row_gap, config.max_row_gap))
        .collect();
    let col_runs: Vec<usize> = (0..vertical.len())
        .map(|v| run_length(vertical, v, config.min_col_gap, config.max_col_gap))
        .collect();

    for (h, &row_count) in row_runs.iter().enumerate() {
        if row_count < config.min_rows {
            continue;
        }
        for (v, &col_count) in col_runs.iter().enumerate() {
            if col_count < config.min_cols {
                continue;
            }

            let rows = &horizontal[h..h + row_count];
            let cols = &vertical[v..v + col_count];
            let bounding_box = BoundingBox::new(
                cols[0].position(),
                rows[0].position(),
                cols[col_count - 1].position(),
                rows[row_count - 1].position(),
            );

            out.push(GridCandidate {
                bounding_box,
                row_count,
                col_count,
                horizontal_lines: rows.to_vec(),
                vertical_lines: cols.to_vec(),
            });
        }
    }
}

/// Number of lines from `start` whose consecutive gaps stay inside
/// `[min_gap, max_gap]`. Always at least 1.
pub fn run_length(lines: &[LineSegment], start: usize, min_gap: f64, max_gap: f64) -> usize {
    let mut count = 1;
    for pair in lines[start..].windows(2) {
        let gap = pair[1].position() - pair[0].position();
        if gap < min_gap || gap > max_gap {
            break;
        }
        count += 1;
    }
    count
}

/// Group rulings that touch (a horizontal reaching a vertical, or two
/// collinear pieces overlapping) into connected clusters. Clusters keep the
/// input sort order and come out ordered by their first horizontal line.
fn ruling_clusters(
    horizontal: &[LineSegment],
    vertical: &[LineSegment],
    config: &DetectionConfig,
) -> Vec<(Vec<LineSegment>, Vec<LineSegment>)> {
    let tolerance = config.line_tolerance;
    let reach = Reach {
        along_x: config.min_col_gap.max(tolerance),
        along_y: config.min_row_gap.max(tolerance),
    };
    let offset = horizontal.len();
    let mut sets = UnionFind::new(offset + vertical.len());

    for (i, h) in horizontal.iter().enumerate() {
        for (j, v) in vertical.iter().enumerate() {
            if reach.connects(h, v) {
                sets.union(i, offset + j);
            }
        }
    }
    join_collinear(horizontal, 0, tolerance, &mut sets);
    join_collinear(vertical, offset, tolerance, &mut sets);

    let mut roots: Vec<usize> = Vec::new();
    let mut clusters: Vec<(Vec<LineSegment>, Vec<LineSegment>)> = Vec::new();

    for (i, h) in horizontal.iter().enumerate() {
        let idx = cluster_slot(&mut roots, &mut clusters, sets.find(i));
        clusters[idx].0.push(*h);
    }
    for (j, v) in vertical.iter().enumerate() {
        let idx = cluster_slot(&mut roots, &mut clusters, sets.find(offset + j));
        clusters[idx].1.push(*v);
    }

    clusters
}

fn cluster_slot(
    roots: &mut Vec<usize>,
    clusters: &mut Vec<(Vec<LineSegment>, Vec<LineSegment>)>,
    root: usize,
) -> usize {
    match roots.iter().position(|&r| r == root) {
        Some(idx) => idx,
        None => {
            roots.push(root);
            clusters.push((Vec::new(), Vec::new()));
            roots.len() - 1
        }
    }
}

/// How far a ruling may stop short of a crossing ruling and still join it
struct Reach {
    along_x: f64,
    along_y: f64,
}

impl Reach {
    fn connects(&self, h: &LineSegment, v: &LineSegment) -> bool {
        let (h_start, h_end) = h.span();
        let (v_start, v_end) = v.span();
        let x = v.position();
        let y = h.position();
        x >= h_start - self.along_x
            && x <= h_end + self.along_x
            && y >= v_start - self.along_y
            && y <= v_end + self.along_y
    }
}

fn join_collinear(lines: &[LineSegment], offset: usize, tolerance: f64, sets: &mut UnionFind) {
    for i in 0..lines.len() {
        for j in i + 1..lines.len() {
            // Sorted by position, so nothing further along can be collinear
            if lines[j].position() - lines[i].position() >= tolerance {
                break;
            }
            let (a_start, a_end) = lines[i].span();
            let (b_start, b_end) = lines[j].span();
            if a_start <= b_end + tolerance && b_start <= a_end + tolerance {
                sets.union(offset + i, offset + j);
            }
        }
    }
}

struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }

        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
    }
}
