//! Concrete maps under test

use super::{Map, Noise};
use crate::geometry::{Cube, Interval, Point};
use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Per-axis scaling: `r[i] = p[i] * factor[i]`
#[derive(Debug, Clone)]
pub struct LinearMap {
    factors: Vec<f64>,
}

impl LinearMap {
    pub fn new(factors: Vec<f64>) -> Self {
        Self { factors }
    }
}

impl Map for LinearMap {
    fn dimension(&self) -> usize {
        self.factors.len()
    }

    fn value_at(&self, point: ArrayView1<f64>) -> Point {
        assert_eq!(point.len(), self.factors.len(), "map dimension mismatch");
        Array1::from_iter(point.iter().zip(&self.factors).map(|(x, f)| x * f))
    }
}

/// Per-axis linear map folded back at the centre of each domain interval,
/// which makes it jump there:
///
///   r[i] = p[i] * f[i]                       for p[i] <  c[i]
///   r[i] = (max[i] - (p[i] - c[i])) * f[i]   for p[i] >= c[i]
#[derive(Debug, Clone)]
pub struct LinearDiscontinuousMap {
    factors: Vec<f64>,
    /// `[centre, max]` of each domain interval
    folds: Vec<Interval>,
}

impl LinearDiscontinuousMap {
    pub fn new(factors: Vec<f64>, domain: &Cube) -> Self {
        assert_eq!(factors.len(), domain.dimension(), "one factor per domain axis");
        let folds = domain
            .intervals()
            .iter()
            .map(|i| Interval::new(i.center(), i.max))
            .collect();
        Self { factors, folds }
    }
}

impl Map for LinearDiscontinuousMap {
    fn dimension(&self) -> usize {
        self.factors.len()
    }

    fn value_at(&self, point: ArrayView1<f64>) -> Point {
        assert_eq!(point.len(), self.factors.len(), "map dimension mismatch");
        Array1::from_iter(point.iter().zip(self.folds.iter().zip(&self.factors)).map(
            |(&x, (fold, f))| {
                if x < fold.min {
                    x * f
                } else {
                    (fold.max - (x - fold.min)) * f
                }
            },
        ))
    }
}

/// Planar-to-scalar map that is zero on the left half of the square and
/// `±factor * x` on the right half, the sign flipping across the horizontal
/// centre line.
#[derive(Debug, Clone)]
pub struct StepMap2To1 {
    center_x: f64,
    center_y: f64,
    factor: f64,
}

impl StepMap2To1 {
    pub fn new(domain: &Cube, factor: f64) -> Self {
        assert_eq!(domain.dimension(), 2, "step map needs a planar domain");
        Self {
            center_x: domain[0].center(),
            center_y: domain[1].center(),
            factor,
        }
    }
}

impl Map for StepMap2To1 {
    fn dimension(&self) -> usize {
        1
    }

    fn value_at(&self, point: ArrayView1<f64>) -> Point {
        assert_eq!(point.len(), 2, "step map needs a planar point");
        let value = if point[0] < self.center_x {
            0.0
        } else if point[1] > self.center_y {
            self.factor * point[0]
        } else {
            -self.factor * point[0]
        };
        Array1::from_elem(1, value)
    }
}

/// `r = p + offset`
#[derive(Debug, Clone)]
pub struct Translation {
    offset: Point,
}

impl Translation {
    pub fn new(offset: Point) -> Self {
        Self { offset }
    }
}

impl Map for Translation {
    fn dimension(&self) -> usize {
        self.offset.len()
    }

    fn value_at(&self, point: ArrayView1<f64>) -> Point {
        assert_eq!(point.len(), self.offset.len(), "map dimension mismatch");
        &point + &self.offset
    }
}

/// Wraps a map and perturbs each image with [`Noise`].
///
/// The perturbation is drawn from a generator seeded by `seed` and the
/// coordinates of the argument, so evaluating the same point twice yields
/// the same image.
#[derive(Debug, Clone)]
pub struct NoisyMap<M> {
    inner: M,
    noise: Noise,
    seed: u64,
}

impl<M: Map> NoisyMap<M> {
    pub fn new(inner: M, noise: Noise, seed: u64) -> Self {
        assert_eq!(inner.dimension(), noise.dimension(), "noise must match the range");
        Self { inner, noise, seed }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    fn rng_for(&self, point: ArrayView1<f64>) -> StdRng {
        let mut hasher = DefaultHasher::new();
        for x in point.iter() {
            x.to_bits().hash(&mut hasher);
        }
        StdRng::seed_from_u64(self.seed ^ hasher.finish())
    }
}

impl<M: Map> Map for NoisyMap<M> {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn value_at(&self, point: ArrayView1<f64>) -> Point {
        let mut value = self.inner.value_at(point);
        if !self.noise.is_silent() {
            self.noise.perturb(&mut value, &mut self.rng_for(point));
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_linear_map() {
        let map = LinearMap::new(vec![2.0, -1.0]);
        assert_eq!(map.value_at(array![1.0, 3.0].view()).to_vec(), vec![2.0, -3.0]);
    }

    #[test]
    fn test_linear_discontinuous_folds_at_center() {
        let map = LinearDiscontinuousMap::new(vec![1.0], &Cube::unit(1));

        assert_relative_eq!(map.value_at(array![0.4].view())[0], 0.4);
        // Jumps from ~0.5 to 1.0 at the centre, then decreases
        assert_relative_eq!(map.value_at(array![0.5].view())[0], 1.0);
        assert_relative_eq!(map.value_at(array![0.6].view())[0], 0.9);
        assert_relative_eq!(map.value_at(array![1.0].view())[0], 0.5);
    }

    #[test]
    fn test_step_map() {
        let map = StepMap2To1::new(&Cube::unit(2), 2.0);
        assert_eq!(map.value_at(array![0.2, 0.9].view())[0], 0.0);
        assert_relative_eq!(map.value_at(array![0.75, 0.9].view())[0], 1.5);
        assert_relative_eq!(map.value_at(array![0.75, 0.1].view())[0], -1.5);
    }

    #[test]
    fn test_translation() {
        let map = Translation::new(array![0.25, -1.0]);
        assert_eq!(map.value_at(array![0.5, 0.5].view()).to_vec(), vec![0.75, -0.5]);
    }

    #[test]
    fn test_noisy_map_is_deterministic() {
        let noise = Noise::isotropic(1, 0.05).unwrap();
        let map = NoisyMap::new(LinearMap::new(vec![1.0]), noise, 11);

        let p = array![0.3];
        let a = map.value_at(p.view());
        let b = map.value_at(p.view());
        assert_eq!(a, b);
        assert!((a[0] - 0.3).abs() <= 0.05);
    }
}
