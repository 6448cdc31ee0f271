//! Exit-Set Quotient Metric
//!
//! Collapses the exit set of a map (the samples it sends out of the domain,
//! directly or after a second application) to a single point:
//!
//!   d(x, y) = dx + dy                      if dx = 0 or dy = 0
//!   d(x, y) = min(dx + dy, inner(x, y))    otherwise
//!
//! where dx is the inner distance from x to the nearest exit-set point.

use super::{IndexMetric, Metric};
use crate::geometry::{FrameId, Point, PointCloud};
use crate::sampling::{Domain, Map};
use ndarray::ArrayView1;
use std::collections::HashMap;

/// Exact-equality key for a point; `-0.0` and `0.0` coincide.
fn point_key(p: ArrayView1<f64>) -> Vec<u64> {
    p.iter()
        .map(|&x| if x == 0.0 { 0 } else { x.to_bits() })
        .collect()
}

pub struct ExitSetQuotientMetric<'a> {
    domain: &'a dyn Domain,
    inner: &'a dyn Metric,
    /// Interior points with their distance to the exit set
    interior: HashMap<Vec<u64>, f64>,
    exit_set: Vec<Point>,
}

impl<'a> ExitSetQuotientMetric<'a> {
    pub fn new(domain: &'a dyn Domain, map: &dyn Map, inner: &'a dyn Metric) -> Self {
        assert!(
            inner.index_frame().is_none(),
            "inner metric of a quotient must not carry positional state"
        );

        // Both the samples and their images are classified: an image stays
        // interior only if its own image is still in the domain.
        let mut interior_points: Vec<Point> = Vec::new();
        let mut exit_set: Vec<Point> = Vec::new();
        for i in 0..domain.count() {
            let p = domain.value_at(i);
            let v = map.value_at(p.view());
            if domain.contains(v.view()) {
                interior_points.push(p);
                let v1 = map.value_at(v.view());
                if domain.contains(v1.view()) {
                    interior_points.push(v);
                } else {
                    exit_set.push(v);
                }
            } else {
                exit_set.push(p);
            }
        }

        let mut interior = HashMap::with_capacity(interior_points.len());
        for p in &interior_points {
            let distance = exit_set
                .iter()
                .map(|e| inner.distance(p.view(), e.view(), None, None))
                .fold(f64::MAX, f64::min);
            interior.entry(point_key(p.view())).or_insert(distance);
        }

        Self {
            domain,
            inner,
            interior,
            exit_set,
        }
    }

    pub fn inner(&self) -> &dyn Metric {
        self.inner
    }

    pub fn exit_set(&self) -> &[Point] {
        &self.exit_set
    }

    /// Points outside the domain and points never classified as interior
    /// belong to the exit set.
    pub fn is_in_exit_set(&self, p: ArrayView1<f64>) -> bool {
        !self.domain.contains(p) || !self.interior.contains_key(&point_key(p))
    }

    /// Zero exactly on the exit set and outside the domain
    pub fn distance_to_exit_set(&self, p: ArrayView1<f64>) -> f64 {
        if !self.domain.contains(p) {
            return 0.0;
        }
        self.interior.get(&point_key(p)).copied().unwrap_or(0.0)
    }

    fn combine(&self, x: ArrayView1<f64>, y: ArrayView1<f64>, dx: f64, dy: f64) -> f64 {
        if dx == 0.0 || dy == 0.0 {
            return dx + dy;
        }
        (dx + dy).min(self.inner.distance(x, y, None, None))
    }
}

impl Metric for ExitSetQuotientMetric<'_> {
    fn distance(&self, x: ArrayView1<f64>, y: ArrayView1<f64>, _: Option<usize>, _: Option<usize>) -> f64 {
        let dx = self.distance_to_exit_set(x);
        let dy = self.distance_to_exit_set(y);
        self.combine(x, y, dx, dy)
    }

    fn has_index_metric(&self) -> bool {
        true
    }

    fn create_index_metric<'s>(&'s self, cloud: &PointCloud) -> Option<Box<dyn IndexMetric + 's>> {
        Some(Box::new(ExitSetQuotientIndexMetric::new(self, cloud)))
    }
}

/// Snapshot of `distance_to_exit_set` for every position of one cloud
pub struct ExitSetQuotientIndexMetric<'s> {
    metric: &'s ExitSetQuotientMetric<'s>,
    frame: FrameId,
    distance_to_exit_set: Vec<f64>,
}

impl<'s> ExitSetQuotientIndexMetric<'s> {
    pub fn new(metric: &'s ExitSetQuotientMetric<'s>, cloud: &PointCloud) -> Self {
        let mut snapshot = Self {
            metric,
            frame: cloud.frame(),
            distance_to_exit_set: Vec::new(),
        };
        snapshot.reset(cloud);
        snapshot
    }

    fn cached(&self, p: ArrayView1<f64>, position: Option<usize>) -> f64 {
        match position {
            Some(i) => {
                assert!(
                    i < self.distance_to_exit_set.len(),
                    "position {} outside snapshot of {} points",
                    i,
                    self.distance_to_exit_set.len()
                );
                self.distance_to_exit_set[i]
            }
            None => self.metric.distance_to_exit_set(p),
        }
    }
}

impl Metric for ExitSetQuotientIndexMetric<'_> {
    fn distance(&self, x: ArrayView1<f64>, y: ArrayView1<f64>, i: Option<usize>, j: Option<usize>) -> f64 {
        let dx = self.cached(x, i);
        let dy = self.cached(y, j);
        self.metric.combine(x, y, dx, dy)
    }

    fn index_frame(&self) -> Option<FrameId> {
        Some(self.frame)
    }
}

impl IndexMetric for ExitSetQuotientIndexMetric<'_> {
    fn reset(&mut self, cloud: &PointCloud) {
        self.frame = cloud.frame();
        self.distance_to_exit_set = cloud
            .points()
            .map(|p| self.metric.distance_to_exit_set(p))
            .collect();
    }

    fn len(&self) -> usize {
        self.distance_to_exit_set.len()
    }

    fn as_metric(&self) -> &dyn Metric {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Cube, Interval};
    use crate::metrics::{assert_bound_to, EuclideanMetric};
    use crate::sampling::{Translation, UniformCube};
    use approx::assert_relative_eq;
    use ndarray::array;

    /// [0, 1] sampled at 0.0, 0.1, ..., 1.0 and shifted right by 0.25:
    /// samples from 0.8 up leave the domain at once, 0.6 and 0.7 on the
    /// second application.
    fn setup() -> (UniformCube, Translation) {
        let domain = UniformCube::new(Cube::new(vec![Interval::new(0.0, 1.0)]), vec![11]);
        let map = Translation::new(array![0.25]);
        (domain, map)
    }

    #[test]
    fn test_zero_exactly_on_exit_set() {
        let (domain, map) = setup();
        let metric = ExitSetQuotientMetric::new(&domain, &map, &EuclideanMetric);

        for i in 0..domain.count() {
            let p = domain.value_at(i);
            let d = metric.distance_to_exit_set(p.view());
            assert_eq!(d == 0.0, metric.is_in_exit_set(p.view()), "point {}", p);
        }

        // Exit set: 0.8, 0.9, 1.0 directly
        assert!(metric.is_in_exit_set(array![0.9].view()));
        // Interior, nearest exit-set point is 0.8
        assert_relative_eq!(metric.distance_to_exit_set(array![0.2].view()), 0.6, epsilon = 1e-12);
        // Outside the domain
        assert_eq!(metric.distance_to_exit_set(array![1.5].view()), 0.0);
    }

    #[test]
    fn test_quotient_never_exceeds_inner() {
        let (domain, map) = setup();
        let metric = ExitSetQuotientMetric::new(&domain, &map, &EuclideanMetric);
        let cloud = domain.to_cloud();

        for x in cloud.points() {
            for y in cloud.points() {
                let q = metric.distance(x, y, None, None);
                let e = EuclideanMetric.distance(x, y, None, None);
                assert!(q <= e + 1e-12);
                assert!(q >= 0.0);
            }
        }

        // Points outside the domain are glued to the exit set
        let a = array![0.7];
        let b = array![1.5];
        let q = metric.distance(a.view(), b.view(), None, None);
        assert_relative_eq!(q, 0.1, epsilon = 1e-12);
        assert!(q < EuclideanMetric.distance(a.view(), b.view(), None, None));
    }

    #[test]
    fn test_index_snapshot_matches_parent() {
        let (domain, map) = setup();
        let metric = ExitSetQuotientMetric::new(&domain, &map, &EuclideanMetric);
        let cloud = domain.to_cloud();
        let snapshot = metric.create_index_metric(&cloud).unwrap();

        assert!(metric.has_index_metric());
        assert_eq!(snapshot.len(), cloud.len());
        assert_bound_to(snapshot.as_metric(), &cloud);

        for i in 0..cloud.len() {
            for j in 0..cloud.len() {
                let (x, y) = (cloud.point(i), cloud.point(j));
                assert_relative_eq!(
                    snapshot.distance(x, y, Some(i), Some(j)),
                    metric.distance(x, y, None, None)
                );
            }
        }
    }

    #[test]
    #[should_panic(expected = "rebuild it with reset()")]
    fn test_stale_snapshot_panics() {
        let (domain, map) = setup();
        let metric = ExitSetQuotientMetric::new(&domain, &map, &EuclideanMetric);
        let cloud = domain.to_cloud();
        let snapshot = metric.create_index_metric(&cloud).unwrap();

        // Same coordinates, different list
        let rebuilt = domain.to_cloud();
        assert_bound_to(snapshot.as_metric(), &rebuilt);
    }

    #[test]
    fn test_reset_rebinds_snapshot() {
        let (domain, map) = setup();
        let metric = ExitSetQuotientMetric::new(&domain, &map, &EuclideanMetric);
        let cloud = domain.to_cloud();
        let mut snapshot = metric.create_index_metric(&cloud).unwrap();

        let smaller = PointCloud::new(array![[0.1], [0.95]]);
        snapshot.reset(&smaller);
        assert_bound_to(snapshot.as_metric(), &smaller);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.distance(smaller.point(0), smaller.point(1), Some(0), Some(1)),
            metric.distance(smaller.point(0), smaller.point(1), None, None)
        );
    }
}
