//! Reconstruction of closed polygons from an unordered set of 2D segments.

use crate::math::{Point2D, Real};
use crate::utils::polygon_signed_area2;
use hashbrown::HashMap;
use smallvec::SmallVec;

/// Sine of the angle below which a polygon corner is considered flat.
const COLLINEARITY_EPSILON: Real = 1.0e-4;

/// Closed polygons recovered by [`polygons_from_edges`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeLoops {
    /// Closed counter-clockwise polygons, without repeated or flat vertices.
    pub polygons: Vec<Vec<Point2D>>,
    /// Number of chains that could not be closed, and were dropped.
    pub open_chains: usize,
}

/// Merges points closer than a tolerance, using a uniform grid.
struct Welder {
    cell_size: Real,
    cells: HashMap<(i64, i64), SmallVec<[u32; 2]>>,
    points: Vec<Point2D>,
}

impl Welder {
    fn new(tolerance: Real) -> Self {
        Welder {
            cell_size: tolerance.max(Real::EPSILON),
            cells: HashMap::new(),
            points: Vec::new(),
        }
    }

    fn cell(&self, pt: &Point2D) -> (i64, i64) {
        (
            (pt.x / self.cell_size).floor() as i64,
            (pt.y / self.cell_size).floor() as i64,
        )
    }

    /// The index of the welded point equal to `pt` within tolerance.
    fn insert(&mut self, pt: Point2D) -> u32 {
        let (cx, cy) = self.cell(&pt);

        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(candidates) = self.cells.get(&(cx + dx, cy + dy)) {
                    for id in candidates {
                        if na::distance(&self.points[*id as usize], &pt) <= self.cell_size {
                            return *id;
                        }
                    }
                }
            }
        }

        let id = self.points.len() as u32;
        self.points.push(pt);
        self.cells.entry((cx, cy)).or_default().push(id);
        id
    }
}

/// Chains unordered segments into closed polygons.
///
/// Segment endpoints closer than `tolerance` are merged. Each chain is followed from an unused
/// segment until it comes back to its first point. Chains that cannot be closed are dropped
/// and counted in [`EdgeLoops::open_chains`]. Flat corners are removed from the closed
/// polygons and every polygon is made counter-clockwise. Polygons left with less than three
/// vertices are dropped.
pub fn polygons_from_edges(edges: &[[Point2D; 2]], tolerance: Real) -> EdgeLoops {
    let mut welder = Welder::new(tolerance);
    let mut segments = Vec::with_capacity(edges.len());

    for [a, b] in edges {
        let ia = welder.insert(*a);
        let ib = welder.insert(*b);
        if ia != ib {
            segments.push([ia, ib]);
        }
    }

    let mut adjacency: Vec<SmallVec<[usize; 2]>> = vec![SmallVec::new(); welder.points.len()];
    for (i, [a, b]) in segments.iter().enumerate() {
        adjacency[*a as usize].push(i);
        adjacency[*b as usize].push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut result = EdgeLoops::default();

    for first in 0..segments.len() {
        if used[first] {
            continue;
        }
        used[first] = true;

        let [start, mut curr] = segments[first];
        let mut chain = vec![start];
        let mut closed = false;

        loop {
            if curr == start {
                closed = true;
                break;
            }
            chain.push(curr);

            let next = adjacency[curr as usize]
                .iter()
                .copied()
                .find(|seg| !used[*seg]);
            let Some(next) = next else {
                break;
            };

            used[next] = true;
            let [a, b] = segments[next];
            curr = if a == curr { b } else { a };
        }

        if !closed {
            result.open_chains += 1;
            continue;
        }

        let mut polygon: Vec<Point2D> = chain
            .iter()
            .map(|id| welder.points[*id as usize])
            .collect();
        remove_flat_corners(&mut polygon);

        if polygon.len() >= 3 {
            if polygon_signed_area2(&polygon) < 0.0 {
                polygon.reverse();
            }
            result.polygons.push(polygon);
        }
    }

    result
}

/// Removes the vertices of a closed polygon where the boundary does not turn.
pub fn remove_flat_corners(polygon: &mut Vec<Point2D>) {
    let mut i = 0;
    let mut since_last_removal = 0;

    while polygon.len() >= 3 && since_last_removal < polygon.len() {
        let n = polygon.len();
        let prev = polygon[(i + n - 1) % n];
        let next = polygon[(i + 1) % n];
        let e1 = polygon[i] - prev;
        let e2 = next - polygon[i];
        let scale = e1.norm() * e2.norm();

        if e1.perp(&e2).abs() <= COLLINEARITY_EPSILON * scale {
            let _ = polygon.remove(i);
            since_last_removal = 0;
            if i >= polygon.len() {
                i = 0;
            }
        } else {
            since_last_removal += 1;
            i = (i + 1) % n;
        }
    }
}
