//! Closed-form exit-set quotient for horseshoe maps
//!
//! The y-range of the square is cut into horizontal stripes:
//!
//! ```text
//!   y_max ┌──────────────────────┐  stripe n+1  (margin, exit)
//!         ├──────────────────────┤  stripe n
//!         │          ...         │
//!         ├──────────────────────┤  stripe 1
//!   y_min └──────────────────────┘  stripe 0    (margin, exit)
//! ```
//!
//! Even stripes start out in the exit set. One stripe may additionally carry
//! a partial boundary in x. Distances to the exit set are computed from the
//! thresholds directly instead of from samples.

use super::{EuclideanMetric, Metric};
use crate::geometry::Interval;
use ndarray::ArrayView1;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PartialExit {
    stripe: usize,
    value: f64,
    invert: bool,
}

#[derive(Debug, Clone)]
pub struct HorseshoeExitSetQuotientMetric {
    thresholds: Vec<f64>,
    /// Sorted stripe indices in the exit set
    exit_stripes: Vec<usize>,
    prev_exit: Vec<usize>,
    next_exit: Vec<usize>,
    partial: Option<PartialExit>,
    trivial: bool,
}

impl HorseshoeExitSetQuotientMetric {
    pub fn new(y_interval: Interval, exit_margin: f64, pieces_count: usize) -> Self {
        let count = pieces_count + 3;
        let piece_delta = y_interval.length() / (pieces_count as f64 + 2.0 * exit_margin);

        let mut thresholds = Vec::with_capacity(count);
        let mut t = y_interval.min;
        thresholds.push(t);
        t += piece_delta * exit_margin;
        thresholds.push(t);
        for _ in 0..pieces_count {
            t += piece_delta;
            thresholds.push(t);
        }
        thresholds.push(y_interval.max);

        let mut metric = Self {
            thresholds,
            exit_stripes: (0..pieces_count + 2).step_by(2).collect(),
            prev_exit: Vec::new(),
            next_exit: Vec::new(),
            partial: None,
            trivial: false,
        };
        metric.update_prev_next();
        metric
    }

    pub fn stripe_count(&self) -> usize {
        self.thresholds.len() - 1
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn add_piece_to_exit_set(&mut self, stripe: usize) {
        assert!(stripe < self.stripe_count(), "stripe {} out of range", stripe);
        if let Err(at) = self.exit_stripes.binary_search(&stripe) {
            self.exit_stripes.insert(at, stripe);
        }
        self.update_prev_next();
    }

    pub fn remove_piece_from_exit_set(&mut self, stripe: usize) {
        if let Ok(at) = self.exit_stripes.binary_search(&stripe) {
            self.exit_stripes.remove(at);
        }
        self.update_prev_next();
    }

    /// Make part of `stripe` exit: `x <= value` when inverted, else `x >= value`.
    pub fn set_x_exit_set(&mut self, stripe: usize, progress: f64, invert: bool, x_interval: Interval) {
        assert!(stripe < self.stripe_count(), "stripe {} out of range", stripe);
        let value = if invert {
            progress * x_interval.length() + x_interval.min
        } else {
            (1.0 - progress) * x_interval.length() + x_interval.min
        };
        self.partial = Some(PartialExit {
            stripe,
            value,
            invert,
        });
    }

    /// Everything is exit set; all distances become 0.
    pub fn set_trivial(&mut self, trivial: bool) {
        self.trivial = trivial;
    }

    pub fn is_trivial(&self) -> bool {
        self.trivial
    }

    pub fn is_in_exit_set(&self, p: ArrayView1<f64>) -> bool {
        self.trivial || self.is_in_exit_set_at(p, self.stripe_of(p[1]))
    }

    pub fn distance_to_exit_set(&self, p: ArrayView1<f64>) -> f64 {
        if self.trivial {
            return 0.0;
        }
        self.distance_to_exit_set_at(p, self.stripe_of(p[1]))
    }

    fn update_prev_next(&mut self) {
        assert!(!self.exit_stripes.is_empty(), "exit set must keep at least one stripe");
        let first = self.exit_stripes[0];
        let last = self.exit_stripes[self.exit_stripes.len() - 1];

        let stripes = self.stripe_count();
        self.prev_exit = (0..stripes)
            .map(|i| {
                self.exit_stripes
                    .iter()
                    .rev()
                    .find(|&&j| j < i)
                    .copied()
                    .unwrap_or(first)
            })
            .collect();
        self.next_exit = (0..stripes)
            .map(|i| {
                self.exit_stripes
                    .iter()
                    .find(|&&j| j > i)
                    .copied()
                    .unwrap_or(last)
            })
            .collect();
    }

    /// First stripe whose upper threshold lies above `y`; the top stripe
    /// takes everything beyond.
    fn stripe_of(&self, y: f64) -> usize {
        let stripes = self.stripe_count();
        (0..stripes)
            .find(|&i| self.thresholds[i + 1] > y)
            .unwrap_or(stripes - 1)
    }

    fn is_exit_stripe(&self, stripe: usize) -> bool {
        self.exit_stripes.binary_search(&stripe).is_ok()
    }

    fn is_in_exit_set_at(&self, p: ArrayView1<f64>, stripe: usize) -> bool {
        match self.partial {
            Some(partial) if partial.stripe == stripe => {
                if partial.invert {
                    p[0] <= partial.value
                } else {
                    p[0] >= partial.value
                }
            }
            _ => self.is_exit_stripe(stripe),
        }
    }

    fn distance_to_exit_set_at(&self, p: ArrayView1<f64>, stripe: usize) -> f64 {
        if self.trivial || self.is_in_exit_set_at(p, stripe) {
            return 0.0;
        }
        let y = p[1];
        let below = (y - self.thresholds[self.prev_exit[stripe] + 1]).abs();
        let above = (y - self.thresholds[self.next_exit[stripe]]).abs();
        let y_dist = below.min(above);

        match self.partial {
            Some(partial) if partial.stripe == stripe => {
                let x_dist = if partial.invert {
                    p[0] - partial.value
                } else {
                    partial.value - p[0]
                };
                x_dist.min(y_dist)
            }
            _ => y_dist,
        }
    }
}

impl Metric for HorseshoeExitSetQuotientMetric {
    fn distance(&self, x: ArrayView1<f64>, y: ArrayView1<f64>, _: Option<usize>, _: Option<usize>) -> f64 {
        if self.trivial {
            return 0.0;
        }
        assert_eq!(x.len(), 2, "horseshoe metric is planar");
        assert_eq!(y.len(), 2, "horseshoe metric is planar");

        let ix = self.stripe_of(x[1]);
        let iy = self.stripe_of(y[1]);
        let through_exit = self.distance_to_exit_set_at(x, ix) + self.distance_to_exit_set_at(y, iy);

        if !self.is_in_exit_set_at(x, ix)
            && !self.is_in_exit_set_at(y, iy)
            && self.prev_exit[ix] == self.prev_exit[iy]
        {
            EuclideanMetric.distance(x, y, None, None).min(through_exit)
        } else {
            through_exit
        }
    }
}

impl fmt::Display for HorseshoeExitSetQuotientMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "thresholds:")?;
        for t in &self.thresholds {
            writeln!(f, "{}", t)?;
        }
        writeln!(f, "exit set:")?;
        for &s in &self.exit_stripes {
            writeln!(f, "[{}, {}]", self.thresholds[s], self.thresholds[s + 1])?;
        }
        writeln!(f, "prev and next exit sets:")?;
        for s in (0..self.stripe_count()).filter(|&s| !self.is_exit_stripe(s)) {
            writeln!(f, "{} {} {}", s, self.prev_exit[s], self.next_exit[s])?;
        }
        if let Some(partial) = self.partial {
            writeln!(
                f,
                "x exit set index: {} value {} invert: {}",
                partial.stripe, partial.value, partial.invert
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    /// Unit square, margin 0.1, three pieces:
    /// thresholds 0, 0.03125, 0.34375, 0.65625, 0.96875, 1
    fn u_metric() -> HorseshoeExitSetQuotientMetric {
        HorseshoeExitSetQuotientMetric::new(Interval::new(0.0, 1.0), 0.1, 3)
    }

    #[test]
    fn test_thresholds() {
        let metric = u_metric();
        assert_eq!(metric.stripe_count(), 5);
        let expected = [0.0, 0.03125, 0.34375, 0.65625, 0.96875, 1.0];
        for (t, e) in metric.thresholds().iter().zip(expected.iter()) {
            assert_relative_eq!(*t, *e, epsilon = 1e-12);
        }

        assert!(metric.is_in_exit_set(array![0.5, 0.01].view()));
        assert!(!metric.is_in_exit_set(array![0.5, 0.2].view()));
        assert!(metric.is_in_exit_set(array![0.5, 0.5].view()));
        // Beyond y_max falls into the top stripe
        assert!(metric.is_in_exit_set(array![0.5, 1.5].view()));
    }

    #[test]
    fn test_distance_to_exit_set() {
        let metric = u_metric();
        assert_relative_eq!(metric.distance_to_exit_set(array![0.5, 0.2].view()), 0.14375, epsilon = 1e-12);
        assert_relative_eq!(metric.distance_to_exit_set(array![0.5, 0.8].view()), 0.14375, epsilon = 1e-12);
        assert_eq!(metric.distance_to_exit_set(array![0.5, 0.5].view()), 0.0);
    }

    #[test]
    fn test_distance_within_and_across_stripes() {
        let metric = u_metric();

        // Same stripe: plain distance is shorter
        let a = array![0.4, 0.2];
        let b = array![0.6, 0.2];
        assert_relative_eq!(metric.distance(a.view(), b.view(), None, None), 0.2, epsilon = 1e-12);

        // Separated by the middle exit stripe: only the way through it counts
        let c = array![0.5, 0.2];
        let d = array![0.5, 0.8];
        assert_relative_eq!(metric.distance(c.view(), d.view(), None, None), 0.2875, epsilon = 1e-12);

        // Symmetric
        assert_relative_eq!(
            metric.distance(d.view(), c.view(), None, None),
            metric.distance(c.view(), d.view(), None, None)
        );
    }

    #[test]
    fn test_partial_exit_and_pieces() {
        let mut metric = u_metric();
        metric.set_x_exit_set(3, 0.5, true, Interval::new(0.0, 1.0));

        assert!(metric.is_in_exit_set(array![0.4, 0.8].view()));
        assert!(!metric.is_in_exit_set(array![0.55, 0.8].view()));
        assert_relative_eq!(metric.distance_to_exit_set(array![0.55, 0.8].view()), 0.05, epsilon = 1e-12);

        metric.add_piece_to_exit_set(1);
        assert!(metric.is_in_exit_set(array![0.5, 0.2].view()));
        metric.remove_piece_from_exit_set(1);
        assert!(!metric.is_in_exit_set(array![0.5, 0.2].view()));

        let text = metric.to_string();
        assert!(text.starts_with("thresholds:"));
        assert!(text.contains("x exit set index: 3 value 0.5 invert: true"));
    }

    #[test]
    fn test_trivial_collapses_everything() {
        let mut metric = u_metric();
        metric.set_trivial(true);
        let a = array![0.1, 0.2];
        let b = array![0.9, 0.8];
        assert_eq!(metric.distance(a.view(), b.view(), None, None), 0.0);
        assert!(metric.is_in_exit_set(a.view()));
    }
}
