//! Metrics Module: Distances for Rips Construction
//!
//! Every metric answers `distance(x, y, i, j)`. The optional positions `i`
//! and `j` are cache keys into per-point state and never change the value
//! a metric would compute from the coordinates alone.
//!
//! ## Capabilities
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Metric                               │
//! ├──────────────────────────────────────────────────────────────┤
//! │  + distance(x, y, i, j)                                      │
//! │  + has_index_metric()      - can build a positional snapshot │
//! │  + create_index_metric(c)  - snapshot bound to cloud c       │
//! │  + index_frame()           - frame a snapshot is bound to    │
//! └──────────────────────────────────────────────────────────────┘
//!                               ▲
//!                    IndexMetric: + reset(c), len()
//! ```
//!
//! A snapshot is only valid for the cloud (frame) that produced it. Every
//! consumer that passes positions calls [`assert_bound_to`] first, so a stale
//! snapshot fails loudly instead of returning distances for the wrong points.

mod exit_set;
mod horseshoe;

pub use exit_set::{ExitSetQuotientIndexMetric, ExitSetQuotientMetric};
pub use horseshoe::HorseshoeExitSetQuotientMetric;

use crate::geometry::{FrameId, PointCloud};
use ndarray::{s, ArrayView1};

/// Distance between two points, optionally keyed by their cloud positions
pub trait Metric {
    fn distance(
        &self,
        x: ArrayView1<f64>,
        y: ArrayView1<f64>,
        i: Option<usize>,
        j: Option<usize>,
    ) -> f64;

    /// Whether [`Metric::create_index_metric`] yields a snapshot
    fn has_index_metric(&self) -> bool {
        false
    }

    /// Position-keyed snapshot of this metric over `cloud`
    fn create_index_metric<'s>(&'s self, _cloud: &PointCloud) -> Option<Box<dyn IndexMetric + 's>> {
        None
    }

    /// Frame of the cloud this metric's cached state is keyed by, if any
    fn index_frame(&self) -> Option<FrameId> {
        None
    }
}

/// A metric caching per-point values by position in one cloud
pub trait IndexMetric: Metric {
    /// Rebuild the snapshot for `cloud` and rebind to its frame
    fn reset(&mut self, cloud: &PointCloud);

    /// Number of cached positions
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn as_metric(&self) -> &dyn Metric;
}

/// Panic unless `metric` may be queried with positions into `cloud`.
pub fn assert_bound_to(metric: &dyn Metric, cloud: &PointCloud) {
    if let Some(frame) = metric.index_frame() {
        assert_eq!(
            frame,
            cloud.frame(),
            "index metric is bound to another point cloud; rebuild it with reset()"
        );
    }
}

/// Euclidean (L2) distance
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanMetric;

impl Metric for EuclideanMetric {
    fn distance(&self, x: ArrayView1<f64>, y: ArrayView1<f64>, _: Option<usize>, _: Option<usize>) -> f64 {
        assert_eq!(x.len(), y.len(), "dimension mismatch");
        let mut dist_sq = 0.0;
        for (a, b) in x.iter().zip(y.iter()) {
            let diff = a - b;
            dist_sq += diff * diff;
        }
        dist_sq.sqrt()
    }
}

/// Chebyshev (L∞) distance
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxMetric;

impl Metric for MaxMetric {
    fn distance(&self, x: ArrayView1<f64>, y: ArrayView1<f64>, _: Option<usize>, _: Option<usize>) -> f64 {
        assert_eq!(x.len(), y.len(), "dimension mismatch");
        x.iter()
            .zip(y.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

/// Taxicab (L1) distance
#[derive(Debug, Clone, Copy, Default)]
pub struct TaxiMetric;

impl Metric for TaxiMetric {
    fn distance(&self, x: ArrayView1<f64>, y: ArrayView1<f64>, _: Option<usize>, _: Option<usize>) -> f64 {
        assert_eq!(x.len(), y.len(), "dimension mismatch");
        x.iter().zip(y.iter()).map(|(a, b)| (a - b).abs()).sum()
    }
}

/// Graph metric on `(domain | range)` coordinates:
///
///   d((x, f(x)), (y, f(y))) = max(d_D(x, y), d_R(f(x), f(y)))
///
/// It dominates the domain metric, so a graph complex never has fewer
/// components than the domain complex at the same scale.
#[derive(Clone, Copy)]
pub struct MaxDomainRangeMetric<'a> {
    domain: &'a dyn Metric,
    range: &'a dyn Metric,
    domain_dim: usize,
    range_dim: usize,
}

impl<'a> MaxDomainRangeMetric<'a> {
    pub fn new(domain: &'a dyn Metric, range: &'a dyn Metric, domain_dim: usize, range_dim: usize) -> Self {
        Self {
            domain,
            range,
            domain_dim,
            range_dim,
        }
    }

    pub fn domain_dim(&self) -> usize {
        self.domain_dim
    }

    pub fn range_dim(&self) -> usize {
        self.range_dim
    }
}

impl Metric for MaxDomainRangeMetric<'_> {
    fn distance(&self, x: ArrayView1<f64>, y: ArrayView1<f64>, i: Option<usize>, j: Option<usize>) -> f64 {
        let dd = self.domain_dim;
        assert_eq!(x.len(), y.len(), "dimension mismatch");
        assert_eq!(x.len(), dd + self.range_dim, "graph point dimension mismatch");

        let domain_dist = self.domain.distance(x.slice(s![..dd]), y.slice(s![..dd]), i, j);
        let range_dist = self.range.distance(x.slice(s![dd..]), y.slice(s![dd..]), i, j);
        domain_dist.max(range_dist)
    }

    fn index_frame(&self) -> Option<FrameId> {
        match (self.domain.index_frame(), self.range.index_frame()) {
            (Some(d), Some(r)) => {
                assert_eq!(d, r, "domain and range snapshots describe different samples");
                Some(d)
            }
            (d, r) => d.or(r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_basic_metrics() {
        let x = array![0.0, 0.0];
        let y = array![3.0, -4.0];

        assert_relative_eq!(EuclideanMetric.distance(x.view(), y.view(), None, None), 5.0);
        assert_relative_eq!(MaxMetric.distance(x.view(), y.view(), None, None), 4.0);
        assert_relative_eq!(TaxiMetric.distance(x.view(), y.view(), None, None), 7.0);
        // Symmetric
        assert_relative_eq!(MaxMetric.distance(y.view(), x.view(), None, None), 4.0);
    }

    #[test]
    fn test_graph_metric_dominates_domain() {
        let graph = MaxDomainRangeMetric::new(&EuclideanMetric, &EuclideanMetric, 1, 1);

        // Continuous piece: range distance equals domain distance
        let a = array![0.1, 0.1];
        let b = array![0.2, 0.2];
        let d = graph.distance(a.view(), b.view(), None, None);
        assert_relative_eq!(d, EuclideanMetric.distance(a.slice(s![..1]), b.slice(s![..1]), None, None));

        // Across a jump: range distance wins
        let c = array![0.5, 1.0];
        let d = graph.distance(b.view(), c.view(), None, None);
        assert!(d > EuclideanMetric.distance(b.slice(s![..1]), c.slice(s![..1]), None, None));
        assert_relative_eq!(d, 0.8, epsilon = 1e-12);
    }

    #[test]
    #[should_panic]
    fn test_graph_metric_dimension_mismatch() {
        let graph = MaxDomainRangeMetric::new(&EuclideanMetric, &EuclideanMetric, 1, 1);
        let a = array![0.1, 0.1, 0.1];
        graph.distance(a.view(), a.view(), None, None);
    }
}
