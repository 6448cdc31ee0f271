//! Sampled domains: grids, random clouds, explicit lists and ball restrictions

use super::Domain;
use crate::geometry::{Cube, Point, PointCloud};
use crate::metrics::{assert_bound_to, Metric};
use ndarray::{Array1, ArrayView1};
use rand::Rng;

/// Rejection attempts per random sample before settling for the last draw
const MAX_HOLE_REJECTIONS: usize = 100;

/// Regular grid over a cube, optionally with a rectangular hole cut out
///
/// Grid point `k` along axis `d` sits at `min + len * k / max(1, res - 1)`,
/// the first axis varying fastest.
#[derive(Debug, Clone)]
pub struct UniformCube {
    cube: Cube,
    resolution: Vec<usize>,
    hole: Option<Cube>,
    /// Grid indices outside the hole
    retained: Vec<usize>,
}

impl UniformCube {
    pub fn new(cube: Cube, resolution: Vec<usize>) -> Self {
        Self::build(cube, resolution, None)
    }

    /// Grid points falling into `hole` are dropped.
    pub fn with_hole(cube: Cube, resolution: Vec<usize>, hole: Cube) -> Self {
        Self::build(cube, resolution, Some(hole))
    }

    fn build(cube: Cube, resolution: Vec<usize>, hole: Option<Cube>) -> Self {
        assert_eq!(
            resolution.len(),
            cube.dimension(),
            "one resolution per cube dimension"
        );
        let total: usize = resolution.iter().product();
        let mut domain = Self {
            cube,
            resolution,
            hole,
            retained: Vec::new(),
        };
        let retained = (0..total)
            .filter(|&k| match &domain.hole {
                Some(hole) => !hole.contains(domain.grid_point(k).view()),
                None => true,
            })
            .collect();
        domain.retained = retained;
        domain
    }

    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    pub fn resolution(&self) -> &[usize] {
        &self.resolution
    }

    fn grid_point(&self, mut k: usize) -> Point {
        let mut p = Array1::zeros(self.cube.dimension());
        for (d, &res) in self.resolution.iter().enumerate() {
            let interval = self.cube[d];
            let step = (k % res) as f64;
            p[d] = interval.min + interval.length() * step / res.saturating_sub(1).max(1) as f64;
            k /= res;
        }
        p
    }
}

impl Domain for UniformCube {
    fn count(&self) -> usize {
        self.retained.len()
    }

    fn dimension(&self) -> usize {
        self.cube.dimension()
    }

    fn value_at(&self, index: usize) -> Point {
        self.grid_point(self.retained[index])
    }

    fn contains(&self, point: ArrayView1<f64>) -> bool {
        self.cube.contains(point) && !self.hole.as_ref().is_some_and(|h| h.contains(point))
    }
}

/// Uniformly random samples in a cube, drawn once from the injected generator
#[derive(Debug, Clone)]
pub struct RandomCube {
    cube: Cube,
    hole: Option<Cube>,
    points: Vec<Point>,
}

impl RandomCube {
    pub fn new<R: Rng>(cube: Cube, count: usize, rng: &mut R) -> Self {
        Self::build(cube, None, count, rng)
    }

    /// Draws landing in `hole` are retried a bounded number of times.
    pub fn with_hole<R: Rng>(cube: Cube, hole: Cube, count: usize, rng: &mut R) -> Self {
        Self::build(cube, Some(hole), count, rng)
    }

    fn build<R: Rng>(cube: Cube, hole: Option<Cube>, count: usize, rng: &mut R) -> Self {
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            let mut p = Self::draw(&cube, rng);
            if let Some(hole) = &hole {
                let mut attempts = 0;
                while hole.contains(p.view()) && attempts < MAX_HOLE_REJECTIONS {
                    p = Self::draw(&cube, rng);
                    attempts += 1;
                }
            }
            points.push(p);
        }
        Self { cube, hole, points }
    }

    fn draw<R: Rng>(cube: &Cube, rng: &mut R) -> Point {
        Array1::from_iter(
            cube.intervals()
                .iter()
                .map(|interval| interval.min + interval.length() * rng.random::<f64>()),
        )
    }

    pub fn cube(&self) -> &Cube {
        &self.cube
    }
}

impl Domain for RandomCube {
    fn count(&self) -> usize {
        self.points.len()
    }

    fn dimension(&self) -> usize {
        self.cube.dimension()
    }

    fn value_at(&self, index: usize) -> Point {
        self.points[index].clone()
    }

    fn contains(&self, point: ArrayView1<f64>) -> bool {
        self.cube.contains(point) && !self.hole.as_ref().is_some_and(|h| h.contains(point))
    }
}

/// Hand-picked samples; membership is exact equality with one of them.
#[derive(Debug, Clone)]
pub struct PointList {
    dimension: usize,
    points: Vec<Point>,
}

impl PointList {
    pub fn new(dimension: usize, points: Vec<Point>) -> Self {
        for p in &points {
            assert_eq!(p.len(), dimension, "point dimension mismatch");
        }
        Self { dimension, points }
    }
}

impl Domain for PointList {
    fn count(&self) -> usize {
        self.points.len()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn value_at(&self, index: usize) -> Point {
        self.points[index].clone()
    }

    fn contains(&self, point: ArrayView1<f64>) -> bool {
        self.points.iter().any(|p| p.view() == point)
    }
}

/// The samples of a parent domain within `radius` of a center
///
/// Membership of arbitrary points is still answered by the parent, so an
/// exit-set test against a restriction sees the whole domain.
pub struct DomainRestriction<'a> {
    parent: &'a dyn Domain,
    points: Vec<Point>,
}

impl<'a> DomainRestriction<'a> {
    /// Restrict using a metric that carries no positional state.
    pub fn new(parent: &'a dyn Domain, metric: &dyn Metric, center: ArrayView1<f64>, radius: f64) -> Self {
        assert!(
            metric.index_frame().is_none(),
            "an index metric needs the parent's cloud; use DomainRestriction::around"
        );
        assert_eq!(center.len(), parent.dimension(), "center dimension mismatch");
        let points = (0..parent.count())
            .map(|i| parent.value_at(i))
            .filter(|p| metric.distance(p.view(), center, None, None) <= radius)
            .collect();
        Self { parent, points }
    }

    /// Restrict the samples of `cloud` (the parent's samples in index
    /// order), passing their positions to `metric`.
    pub fn around(
        parent: &'a dyn Domain,
        cloud: &PointCloud,
        metric: &dyn Metric,
        center: ArrayView1<f64>,
        radius: f64,
    ) -> Self {
        assert_eq!(cloud.len(), parent.count(), "cloud does not sample the parent domain");
        assert_eq!(center.len(), parent.dimension(), "center dimension mismatch");
        assert_bound_to(metric, cloud);
        let points = cloud
            .points()
            .enumerate()
            .filter(|(i, p)| metric.distance(*p, center, Some(*i), None) <= radius)
            .map(|(_, p)| p.to_owned())
            .collect();
        Self { parent, points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Domain for DomainRestriction<'_> {
    fn count(&self) -> usize {
        self.points.len()
    }

    fn dimension(&self) -> usize {
        self.parent.dimension()
    }

    fn value_at(&self, index: usize) -> Point {
        self.points[index].clone()
    }

    fn contains(&self, point: ArrayView1<f64>) -> bool {
        self.parent.contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Interval;
    use crate::metrics::EuclideanMetric;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_cube_grid() {
        let domain = UniformCube::new(Cube::unit(2), vec![3, 2]);
        assert_eq!(domain.count(), 6);
        assert_eq!(domain.value_at(0).to_vec(), vec![0.0, 0.0]);
        // First axis varies fastest
        assert_eq!(domain.value_at(1).to_vec(), vec![0.5, 0.0]);
        assert_eq!(domain.value_at(5).to_vec(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_uniform_cube_single_resolution() {
        let domain = UniformCube::new(Cube::new(vec![Interval::new(2.0, 3.0)]), vec![1]);
        assert_eq!(domain.count(), 1);
        assert_eq!(domain.value_at(0)[0], 2.0);
    }

    #[test]
    fn test_uniform_cube_with_hole() {
        let hole = Cube::new(vec![Interval::new(0.33, 0.66), Interval::new(0.0, 1.0)]);
        let domain = UniformCube::with_hole(Cube::unit(2), vec![11, 11], hole);

        // Columns 0.4, 0.5, 0.6 are cut out
        assert_eq!(domain.count(), 8 * 11);
        for i in 0..domain.count() {
            assert!(domain.contains(domain.value_at(i).view()));
        }
        assert!(!domain.contains(array![0.5, 0.5].view()));
    }

    #[test]
    fn test_random_cube_is_seeded() {
        let cube = Cube::new(vec![Interval::new(-1.0, 1.0), Interval::new(0.0, 2.0)]);
        let a = RandomCube::new(cube.clone(), 50, &mut StdRng::seed_from_u64(7));
        let b = RandomCube::new(cube, 50, &mut StdRng::seed_from_u64(7));

        assert_eq!(a.count(), 50);
        for i in 0..a.count() {
            assert_eq!(a.value_at(i), b.value_at(i));
            assert!(a.contains(a.value_at(i).view()));
        }
    }

    #[test]
    fn test_random_cube_avoids_hole() {
        let hole = Cube::new(vec![Interval::new(0.33, 0.66), Interval::new(0.0, 1.0)]);
        let domain = RandomCube::with_hole(Cube::unit(2), hole.clone(), 200, &mut StdRng::seed_from_u64(3));
        for i in 0..domain.count() {
            assert!(!hole.contains(domain.value_at(i).view()));
        }
    }

    #[test]
    fn test_restriction_to_ball() {
        let domain = UniformCube::new(Cube::unit(1), vec![11]);
        let restriction = DomainRestriction::new(&domain, &EuclideanMetric, array![0.5].view(), 0.2);

        // 0.3 ..= 0.7, allowing for rounding at the boundary
        assert!(restriction.count() >= 3 && restriction.count() <= 5);
        for i in 0..restriction.count() {
            let p = restriction.value_at(i);
            assert!((p[0] - 0.5).abs() <= 0.2 + 1e-12);
        }
        // Membership comes from the parent
        assert!(restriction.contains(array![0.95].view()));

        let far = DomainRestriction::new(&domain, &EuclideanMetric, array![5.0].view(), 0.2);
        assert!(far.is_empty());
    }

    #[test]
    fn test_restriction_around_cloud_matches() {
        let domain = UniformCube::new(Cube::unit(1), vec![11]);
        let cloud = domain.to_cloud();
        let by_points = DomainRestriction::new(&domain, &EuclideanMetric, array![0.1].view(), 0.15);
        let by_positions = DomainRestriction::around(&domain, &cloud, &EuclideanMetric, array![0.1].view(), 0.15);

        assert_eq!(by_points.count(), by_positions.count());
        for i in 0..by_points.count() {
            assert_relative_eq!(by_points.value_at(i)[0], by_positions.value_at(i)[0]);
        }
    }

    #[test]
    fn test_point_list() {
        let list = PointList::new(1, vec![array![0.4], array![0.5]]);
        assert_eq!(list.count(), 2);
        assert!(list.contains(array![0.5].view()));
        assert!(!list.contains(array![0.45].view()));
        assert_eq!(list.to_cloud().len(), 2);
    }
}
