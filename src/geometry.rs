//! Geometry Primitives: Points, Intervals, Cubes and Point Clouds
//!
//! A point is a fixed-dimension coordinate vector. Point clouds keep one
//! point per row of an `Array2<f64>` and carry a [`FrameId`]: clouds built
//! from the same samples (domain, range, graph) share a frame, which is what
//! lets vertex `k` of one complex be looked up as vertex `k` of another.

use ndarray::{Array1, Array2, ArrayView1};
use std::fmt;
use std::ops::Index;
use std::sync::atomic::{AtomicU64, Ordering};

/// A point in ℝⁿ
pub type Point = Array1<f64>;

static NEXT_FRAME: AtomicU64 = AtomicU64::new(0);

/// Identity of a positional correspondence between point clouds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

impl FrameId {
    /// Allocate a frame no other cloud uses yet
    pub fn fresh() -> Self {
        Self(NEXT_FRAME.fetch_add(1, Ordering::Relaxed))
    }
}

/// Closed interval [min, max]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub fn new(min: f64, max: f64) -> Self {
        assert!(max >= min, "interval [{}, {}] is reversed", min, max);
        Self { min, max }
    }

    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// Axis-aligned box: one interval per dimension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cube {
    intervals: Vec<Interval>,
}

impl Cube {
    pub fn new(intervals: Vec<Interval>) -> Self {
        Self { intervals }
    }

    /// The unit cube [0, 1]ⁿ
    pub fn unit(dimension: usize) -> Self {
        Self::new(vec![Interval::default(); dimension])
    }

    pub fn dimension(&self) -> usize {
        self.intervals.len()
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn add_dimension(&mut self, interval: Interval) {
        self.intervals.push(interval);
    }

    /// A point of a different dimension is never inside.
    pub fn contains(&self, point: ArrayView1<f64>) -> bool {
        point.len() == self.dimension()
            && self
                .intervals
                .iter()
                .zip(point.iter())
                .all(|(interval, &x)| interval.contains(x))
    }
}

impl Index<usize> for Cube {
    type Output = Interval;

    fn index(&self, dim: usize) -> &Interval {
        &self.intervals[dim]
    }
}

/// Ordered list of equal-dimension points tagged with a frame
#[derive(Debug, Clone)]
pub struct PointCloud {
    frame: FrameId,
    coords: Array2<f64>,
}

impl PointCloud {
    /// Wrap coordinates (one point per row) in a fresh frame
    pub fn new(coords: Array2<f64>) -> Self {
        Self {
            frame: FrameId::fresh(),
            coords,
        }
    }

    /// Build a cloud from individual points, all of dimension `dimension`
    pub fn from_points(dimension: usize, points: &[Point]) -> Self {
        for p in points {
            assert_eq!(p.len(), dimension, "point dimension mismatch");
        }
        let coords = Array2::from_shape_fn((points.len(), dimension), |(i, d)| points[i][d]);
        Self::new(coords)
    }

    /// A cloud in the same frame, i.e. with the same positional correspondence.
    pub fn sibling(&self, coords: Array2<f64>) -> Self {
        assert_eq!(
            coords.nrows(),
            self.len(),
            "sibling cloud must have one row per sample"
        );
        Self {
            frame: self.frame,
            coords,
        }
    }

    /// Row-wise concatenation `[self | other]`, kept in this cloud's frame
    pub fn glue(&self, other: &PointCloud) -> Self {
        assert_eq!(self.frame, other.frame, "glued clouds must share a frame");
        let (n, dd) = self.coords.dim();
        let rd = other.dimension();
        let coords = Array2::from_shape_fn((n, dd + rd), |(i, d)| {
            if d < dd {
                self.coords[[i, d]]
            } else {
                other.coords[[i, d - dd]]
            }
        });
        self.sibling(coords)
    }

    pub fn frame(&self) -> FrameId {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.coords.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimension(&self) -> usize {
        self.coords.ncols()
    }

    pub fn point(&self, position: usize) -> ArrayView1<'_, f64> {
        assert!(
            position < self.len(),
            "position {} out of range for cloud of {} points",
            position,
            self.len()
        );
        self.coords.row(position)
    }

    pub fn points(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        self.coords.rows().into_iter()
    }

    pub fn coords(&self) -> &Array2<f64> {
        &self.coords
    }
}

/// Space-separated coordinates, each followed by a space
pub struct Coords<'a>(pub ArrayView1<'a, f64>);

impl fmt::Display for Coords<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for x in self.0.iter() {
            write!(f, "{} ", x)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cube_contains() {
        let cube = Cube::new(vec![Interval::new(0.0, 1.0), Interval::new(-1.0, 1.0)]);
        assert!(cube.contains(array![0.5, -1.0].view()));
        assert!(!cube.contains(array![1.5, 0.0].view()));
        // Wrong dimension is outside
        assert!(!cube.contains(array![0.5].view()));
    }

    #[test]
    fn test_siblings_share_frame() {
        let domain = PointCloud::new(array![[0.0], [1.0]]);
        let range = domain.sibling(array![[2.0], [3.0]]);
        let graph = domain.glue(&range);

        assert_eq!(domain.frame(), graph.frame());
        assert_eq!(graph.point(1).to_vec(), vec![1.0, 3.0]);

        let other = PointCloud::new(array![[0.0], [1.0]]);
        assert_ne!(domain.frame(), other.frame());
    }

    #[test]
    #[should_panic]
    fn test_sibling_length_mismatch() {
        let domain = PointCloud::new(array![[0.0], [1.0]]);
        let _ = domain.sibling(array![[2.0]]);
    }
}
