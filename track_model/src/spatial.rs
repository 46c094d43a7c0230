//! # Spatial index
//!
//! Nearest point queries over the centreline samples.
//!
//! The default index is an exhaustive linear scan. The sample count is
//! bounded by the discretization resolution rather than by any real-time
//! constraint, so the scan is perfectly serviceable for one-shot queries. For
//! high frequency querying (a control loop localising every cycle) the
//! [`UniformGrid`] is a drop-in accelerator built once over the same points.
//!
//! Whatever the implementation, the contract is identical: return the index
//! of the exact nearest point, and break exact distance ties by the lowest
//! index.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A nearest point index over a fixed, non-empty set of 2D points.
pub trait NearestIndex: std::fmt::Debug + Send + Sync {
    /// Get the index of the point nearest to `query`.
    ///
    /// Exact distance ties resolve to the lowest index.
    fn nearest(&self, query: Vector2<f64>) -> usize;
}

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Exhaustive scan over every point.
#[derive(Debug, Clone)]
pub struct LinearScan {
    points: Vec<Vector2<f64>>,
}

/// A uniform grid over the points' bounding box.
///
/// Each cell stores the indices of the points inside it. A query scans the
/// cell containing the query point and then rings of cells of growing radius,
/// stopping once no unvisited cell can hold a point at least as close as the
/// best found.
#[derive(Debug, Clone)]
pub struct UniformGrid {
    points: Vec<Vector2<f64>>,

    /// Point indices per cell, row-major
    cells: Vec<Vec<usize>>,

    /// Lower-left corner of the grid
    min_m: Vector2<f64>,

    /// Side length of the square cells
    cell_size_m: f64,

    num_cells_x: usize,
    num_cells_y: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl LinearScan {
    /// Create a new scan index over the given points.
    pub fn new(points: Vec<Vector2<f64>>) -> Self {
        Self { points }
    }
}

impl NearestIndex for LinearScan {
    fn nearest(&self, query: Vector2<f64>) -> usize {
        let mut best_index = 0;
        let mut best_dist_sq = f64::INFINITY;

        for (i, point) in self.points.iter().enumerate() {
            let dist_sq = (point - query).norm_squared();

            // Strict comparison keeps the first index on an exact tie
            if dist_sq < best_dist_sq {
                best_dist_sq = dist_sq;
                best_index = i;
            }
        }

        best_index
    }
}

impl UniformGrid {
    /// Build a grid over the given points with the given cell size.
    ///
    /// The cell size must be positive. A size in the region of a few sample
    /// separations keeps cell occupancy low without inflating the ring search.
    pub fn build(points: Vec<Vector2<f64>>, cell_size_m: f64) -> Self {
        assert!(
            cell_size_m > 0.0 && cell_size_m.is_finite(),
            "cell size must be positive and finite"
        );

        // Bounding box of the point set
        let mut min_m = Vector2::new(f64::INFINITY, f64::INFINITY);
        let mut max_m = Vector2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for point in points.iter() {
            min_m[0] = min_m[0].min(point[0]);
            min_m[1] = min_m[1].min(point[1]);
            max_m[0] = max_m[0].max(point[0]);
            max_m[1] = max_m[1].max(point[1]);
        }

        let num_cells_x = ((max_m[0] - min_m[0]) / cell_size_m).floor() as usize + 1;
        let num_cells_y = ((max_m[1] - min_m[1]) / cell_size_m).floor() as usize + 1;

        let mut cells = vec![Vec::new(); num_cells_x * num_cells_y];

        // Filling in index order keeps each cell's list ascending
        for (i, point) in points.iter().enumerate() {
            let cell_x = ((point[0] - min_m[0]) / cell_size_m).floor() as usize;
            let cell_y = ((point[1] - min_m[1]) / cell_size_m).floor() as usize;
            cells[cell_y * num_cells_x + cell_x].push(i);
        }

        Self {
            points,
            cells,
            min_m,
            cell_size_m,
            num_cells_x,
            num_cells_y,
        }
    }

    /// Get the grid cell containing `query`, clamped into the grid.
    fn clamped_cell(&self, query: Vector2<f64>) -> (usize, usize) {
        let cell_x = ((query[0] - self.min_m[0]) / self.cell_size_m).floor();
        let cell_y = ((query[1] - self.min_m[1]) / self.cell_size_m).floor();

        (
            (cell_x.max(0.0) as usize).min(self.num_cells_x - 1),
            (cell_y.max(0.0) as usize).min(self.num_cells_y - 1),
        )
    }

    /// Scan one cell, updating the best candidate.
    fn scan_cell(
        &self,
        cell_x: usize,
        cell_y: usize,
        query: Vector2<f64>,
        best_index: &mut Option<usize>,
        best_dist_sq: &mut f64,
    ) {
        for &i in self.cells[cell_y * self.num_cells_x + cell_x].iter() {
            let dist_sq = (self.points[i] - query).norm_squared();

            // Cells are not visited in index order, so the tie rule is
            // applied explicitly
            let wins = match *best_index {
                Some(best) => {
                    dist_sq < *best_dist_sq || (dist_sq == *best_dist_sq && i < best)
                }
                None => true,
            };

            if wins {
                *best_index = Some(i);
                *best_dist_sq = dist_sq;
            }
        }
    }
}

impl NearestIndex for UniformGrid {
    fn nearest(&self, query: Vector2<f64>) -> usize {
        let (centre_x, centre_y) = self.clamped_cell(query);
        let max_ring = self.num_cells_x.max(self.num_cells_y);

        let mut best_index: Option<usize> = None;
        let mut best_dist_sq = f64::INFINITY;

        for ring in 0..=max_ring {
            // A cell `ring` rings out holds no point closer than
            // (ring - 1) cell sizes from the query, so once the best beats
            // that bound (strictly, to protect ties) the search is done
            if best_index.is_some() {
                let ring_min_m = (ring as f64 - 1.0).max(0.0) * self.cell_size_m;
                if ring_min_m * ring_min_m > best_dist_sq {
                    break;
                }
            }

            let lo_x = centre_x as isize - ring as isize;
            let hi_x = centre_x as isize + ring as isize;
            let lo_y = centre_y as isize - ring as isize;
            let hi_y = centre_y as isize + ring as isize;

            for cell_y in lo_y..=hi_y {
                if cell_y < 0 || cell_y as usize >= self.num_cells_y {
                    continue;
                }

                for cell_x in lo_x..=hi_x {
                    if cell_x < 0 || cell_x as usize >= self.num_cells_x {
                        continue;
                    }

                    // Only the outer shell of the square is new this ring
                    let on_shell = cell_y == lo_y
                        || cell_y == hi_y
                        || cell_x == lo_x
                        || cell_x == hi_x;
                    if !on_shell {
                        continue;
                    }

                    self.scan_cell(
                        cell_x as usize,
                        cell_y as usize,
                        query,
                        &mut best_index,
                        &mut best_dist_sq,
                    );
                }
            }
        }

        // The point set is non-empty, so a candidate always exists
        best_index.unwrap_or(0)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::segment::{self, SegmentSpec};

    fn circuit_points() -> Vec<Vector2<f64>> {
        let samples = segment::generate(
            &[
                SegmentSpec::Straight { length_m: 40.0 },
                SegmentSpec::Arc {
                    radius_m: 10.0,
                    angle_deg: 90.0,
                },
                SegmentSpec::Straight { length_m: 20.0 },
                SegmentSpec::Arc {
                    radius_m: 10.0,
                    angle_deg: 90.0,
                },
                SegmentSpec::Straight { length_m: 40.0 },
                SegmentSpec::Arc {
                    radius_m: 10.0,
                    angle_deg: 90.0,
                },
                SegmentSpec::Straight { length_m: 20.0 },
                SegmentSpec::Arc {
                    radius_m: 10.0,
                    angle_deg: 90.0,
                },
            ],
            Vector2::new(0.0, 0.0),
            0.0,
            5.0,
        )
        .unwrap();

        samples
            .left_m
            .iter()
            .zip(samples.right_m.iter())
            .map(|(left, right)| (left + right) / 2.0)
            .collect()
    }

    #[test]
    fn test_tie_breaks_to_first_index() {
        let points = vec![Vector2::new(0.0, 0.0), Vector2::new(2.0, 0.0)];

        // Exactly between the two points
        let query = Vector2::new(1.0, 0.0);
        assert_eq!(LinearScan::new(points.clone()).nearest(query), 0);
        assert_eq!(UniformGrid::build(points, 0.5).nearest(query), 0);

        // Coincident points
        let duplicates = vec![
            Vector2::new(1.0, 1.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(1.0, 1.0),
        ];
        let query = Vector2::new(0.0, 0.0);
        assert_eq!(LinearScan::new(duplicates.clone()).nearest(query), 0);
        assert_eq!(UniformGrid::build(duplicates, 1.0).nearest(query), 0);
    }

    #[test]
    fn test_grid_matches_linear_scan() {
        let points = circuit_points();
        let linear = LinearScan::new(points.clone());
        let grid = UniformGrid::build(points.clone(), 2.0);

        // Query at, near and far from every sample
        for (i, point) in points.iter().enumerate() {
            let angle = i as f64 * 0.7;
            for &radius_m in &[0.0, 0.31, 4.7] {
                let query = point + radius_m * Vector2::new(angle.cos(), angle.sin());
                assert_eq!(
                    linear.nearest(query),
                    grid.nearest(query),
                    "disagreement at query {:?}",
                    query
                );
            }
        }
    }

    #[test]
    fn test_far_outside_query() {
        let points = circuit_points();
        let linear = LinearScan::new(points.clone());
        let grid = UniformGrid::build(points, 2.0);

        for &query in &[
            Vector2::new(1000.0, 1000.0),
            Vector2::new(-500.0, 30.0),
            Vector2::new(0.0, -2000.0),
        ] {
            assert_eq!(linear.nearest(query), grid.nearest(query));
        }
    }

    #[test]
    fn test_single_cell_grid() {
        // All points coincide, bounding box collapses to one cell
        let points = vec![Vector2::new(3.0, 3.0); 4];
        let grid = UniformGrid::build(points, 2.0);
        assert_eq!(grid.nearest(Vector2::new(10.0, -4.0)), 0);
    }
}
