//! Bounded uniform noise, one amplitude per axis

use crate::geometry::Point;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum NoiseError {
    #[error("noise amplitude {delta} on axis {axis} must be finite and non-negative")]
    InvalidDelta { axis: usize, delta: f64 },
}

/// Adds an independent draw from `[-delta_d, delta_d]` to every coordinate `d`.
#[derive(Debug, Clone)]
pub struct Noise {
    deltas: Vec<f64>,
    axes: Vec<Uniform<f64>>,
}

impl Noise {
    pub fn new(deltas: Vec<f64>) -> Result<Self, NoiseError> {
        let axes = deltas
            .iter()
            .enumerate()
            .map(|(axis, &delta)| {
                if !delta.is_finite() || delta < 0.0 {
                    return Err(NoiseError::InvalidDelta { axis, delta });
                }
                Uniform::new_inclusive(-delta, delta).map_err(|_| NoiseError::InvalidDelta { axis, delta })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { deltas, axes })
    }

    /// The same amplitude on each of `dimension` axes
    pub fn isotropic(dimension: usize, delta: f64) -> Result<Self, NoiseError> {
        Self::new(vec![delta; dimension])
    }

    pub fn dimension(&self) -> usize {
        self.deltas.len()
    }

    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }

    /// Whether every amplitude is zero
    pub fn is_silent(&self) -> bool {
        self.deltas.iter().all(|&d| d == 0.0)
    }

    pub fn perturb<R: Rng>(&self, point: &mut Point, rng: &mut R) {
        assert_eq!(point.len(), self.dimension(), "noise dimension mismatch");
        for (x, axis) in point.iter_mut().zip(self.axes.iter()) {
            *x += axis.sample(rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_perturbation_is_bounded() {
        let noise = Noise::new(vec![0.1, 0.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1000 {
            let mut p = array![1.0, 2.0];
            noise.perturb(&mut p, &mut rng);
            assert!((p[0] - 1.0).abs() <= 0.1);
            // Zero amplitude leaves the axis untouched
            assert_eq!(p[1], 2.0);
        }
    }

    #[test]
    fn test_invalid_delta() {
        assert_eq!(
            Noise::new(vec![0.1, -0.5]).unwrap_err(),
            NoiseError::InvalidDelta { axis: 1, delta: -0.5 }
        );
        assert!(Noise::isotropic(2, f64::NAN).is_err());
        assert!(Noise::isotropic(2, 0.0).unwrap().is_silent());
    }
}
