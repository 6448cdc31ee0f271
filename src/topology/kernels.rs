//! Local Kernel Persistence
//!
//! For each test point the domain is restricted to a neighbourhood, Rips
//! complexes are built over the restricted domain and over the graph of
//! the map, and the projection of graph components onto domain components
//! is recorded. A continuous map keeps this projection injective; a jump
//! leaves the graph split where the domain is already connected.
//!
//! ## Two Algorithms
//!
//! - [`compute_alg1`]: fixed filtration. One projection per epsilon of a
//!   caller-supplied ascending sequence, in a ball of fixed radius.
//!
//! - [`compute_alg2`]: adaptive. One global scale is found by bisection
//!   ([`find_epsilons`]) so that the whole graph is connected, inflated by
//!   `1 + beta`, and each domain point gets a single projection at that scale.

use super::{PersistenceDiagram, Projection, RipsComplex};
use crate::geometry::{Coords, Point, PointCloud};
use crate::metrics::{IndexMetric, MaxDomainRangeMetric, Metric};
use crate::sampling::{Domain, DomainRestriction, Map, Samples};
use ndarray::ArrayView1;
use std::fmt;
use tracing::{debug, info, trace};

/// Initial bracket for the global scale search of [`compute_alg2`]
const ALG2_START_EPSILON: f64 = 0.1;
const ALG2_START_PREV_EPSILON: f64 = 0.05;

/// Results for one test point
#[derive(Debug, Clone)]
pub struct PointPersistenceData {
    argument: Point,
    value: Point,
    diagram: PersistenceDiagram,
    quality: f64,
    discontinuity: bool,
}

impl PointPersistenceData {
    pub fn new(argument: Point, map: &dyn Map, diagram: PersistenceDiagram) -> Self {
        let value = map.value_at(argument.view());
        Self {
            argument,
            value,
            diagram,
            quality: 0.0,
            discontinuity: false,
        }
    }

    pub fn argument(&self) -> &Point {
        &self.argument
    }

    /// Image of the argument under the map
    pub fn value(&self) -> &Point {
        &self.value
    }

    pub fn diagram(&self) -> &PersistenceDiagram {
        &self.diagram
    }

    pub fn quality(&self) -> f64 {
        self.quality
    }

    pub fn is_discontinuity(&self) -> bool {
        self.discontinuity
    }

    pub fn set_score(&mut self, quality: f64, discontinuity: bool) {
        self.quality = quality;
        self.discontinuity = discontinuity;
    }
}

/// One output line: argument, value, quality, flag
impl fmt::Display for PointPersistenceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{} {}",
            Coords(self.argument.view()),
            Coords(self.value.view()),
            self.quality,
            u8::from(self.discontinuity)
        )
    }
}

/// Bracket the smallest scale at which `cloud` is a single component.
///
/// Returns `(prev_epsilon, epsilon)` with `epsilon - prev_epsilon <= alpha`
/// and one component at `epsilon`. Duplicate points are glued unless the
/// metric holds position-keyed state.
pub fn find_epsilons(
    cloud: &PointCloud,
    metric: &dyn Metric,
    prev_epsilon: f64,
    epsilon: f64,
    alpha: f64,
) -> (f64, f64) {
    assert!(alpha > 0.0, "bisection tolerance must be positive");
    assert!(epsilon > 0.0, "initial epsilon must be positive");

    let glue = metric.index_frame().is_none();
    let components = |e: f64| RipsComplex::new(cloud, metric, e, glue).component_count();

    let mut prev = prev_epsilon;
    let mut eps = epsilon;

    while components(eps) > 1 {
        prev = eps;
        eps *= 2.0;
        trace!(epsilon = eps, "expanding");
    }
    while prev > 0.0 && components(prev) == 1 {
        prev *= 0.5;
        trace!(prev_epsilon = prev, "contracting");
    }
    while eps - prev > alpha {
        let mid = (eps + prev) * 0.5;
        if components(mid) == 1 {
            eps = mid;
        } else {
            prev = mid;
        }
        trace!(prev_epsilon = prev, epsilon = eps, "bisecting");
    }
    (prev, eps)
}

/// Graph → domain projection at one scale, checking domination on the way
fn project(
    samples: &Samples,
    domain_metric: &dyn Metric,
    graph_metric: &dyn Metric,
    epsilon: f64,
) -> (Projection, usize) {
    let domain_complex = RipsComplex::new(samples.domain(), domain_metric, epsilon, false);
    let graph_complex = RipsComplex::new(samples.graph(), graph_metric, epsilon, false);
    let domain_components = domain_complex.component_count();
    let graph_components = graph_complex.component_count();
    assert!(
        graph_components >= domain_components,
        "graph complex has {} components, fewer than the domain's {} at epsilon {}",
        graph_components,
        domain_components,
        epsilon
    );
    (graph_complex.projection_map(&domain_complex), graph_components)
}

/// Fixed-filtration local kernels.
///
/// For every test point the domain is restricted to the ball of
/// `restriction_radius`; for each epsilon (ascending) one projection is
/// recorded, stopping once the graph is connected.
pub fn compute_alg1(
    domain: &dyn Domain,
    map: &dyn Map,
    test_domain: &dyn Domain,
    epsilons: &[f64],
    restriction_radius: f64,
    domain_metric: &dyn Metric,
    graph_metric: &dyn Metric,
) -> Vec<PointPersistenceData> {
    assert!(
        epsilons.windows(2).all(|w| w[0] < w[1]),
        "epsilons must be strictly ascending"
    );
    assert_eq!(test_domain.dimension(), domain.dimension(), "test domain dimension mismatch");
    info!(
        test_points = test_domain.count(),
        steps = epsilons.len(),
        radius = restriction_radius,
        "computing local kernels with a fixed filtration"
    );

    let mut data = Vec::with_capacity(test_domain.count());
    for t in 0..test_domain.count() {
        let center = test_domain.value_at(t);
        let restriction = DomainRestriction::new(domain, domain_metric, center.view(), restriction_radius);
        if restriction.is_empty() {
            debug!(center = %Coords(center.view()), "empty restriction, skipping");
            continue;
        }

        let samples = Samples::of(&restriction, map);
        let mut projections = Vec::with_capacity(epsilons.len());
        for &epsilon in epsilons {
            let (projection, graph_components) = project(&samples, domain_metric, graph_metric, epsilon);
            projections.push(projection);
            if graph_components == 1 {
                break;
            }
        }

        let diagram = PersistenceDiagram::from_projections(&projections);
        debug!(
            center = %Coords(center.view()),
            samples = samples.len(),
            steps = projections.len(),
            longest = diagram.longest_persistence(),
            "local kernels"
        );
        data.push(PointPersistenceData::new(center, map, diagram));
    }
    data
}

/// A base metric with optional position-keyed snapshots over the domain and
/// range clouds of one set of samples.
struct MetricsProxy<'m> {
    base: &'m dyn Metric,
    domain_index: Option<Box<dyn IndexMetric + 'm>>,
    range_index: Option<Box<dyn IndexMetric + 'm>>,
    domain_dim: usize,
    range_dim: usize,
}

impl<'m> MetricsProxy<'m> {
    fn new(base: &'m dyn Metric, samples: &Samples) -> Self {
        let (domain_index, range_index) = if base.has_index_metric() {
            (
                base.create_index_metric(samples.domain()),
                base.create_index_metric(samples.range()),
            )
        } else {
            (None, None)
        };
        Self {
            base,
            domain_index,
            range_index,
            domain_dim: samples.domain().dimension(),
            range_dim: samples.range().dimension(),
        }
    }

    fn domain(&self) -> &dyn Metric {
        match &self.domain_index {
            Some(index) => index.as_metric(),
            None => self.base,
        }
    }

    fn range(&self) -> &dyn Metric {
        match &self.range_index {
            Some(index) => index.as_metric(),
            None => self.base,
        }
    }

    fn graph(&self) -> MaxDomainRangeMetric<'_> {
        MaxDomainRangeMetric::new(self.domain(), self.range(), self.domain_dim, self.range_dim)
    }
}

/// Adaptive local kernels: a single projection per domain point at a
/// globally bisected scale inflated by `1 + beta`.
pub fn compute_alg2(
    domain: &dyn Domain,
    map: &dyn Map,
    alpha: f64,
    beta: f64,
    domain_metric: &dyn Metric,
) -> Vec<PointPersistenceData> {
    if domain.count() < 2 {
        return Vec::new();
    }

    let samples = Samples::of(domain, map);
    let global = MetricsProxy::new(domain_metric, &samples);
    let (prev_epsilon, epsilon) = find_epsilons(
        samples.graph(),
        &global.graph(),
        ALG2_START_PREV_EPSILON,
        ALG2_START_EPSILON,
        alpha,
    );
    let epsilon = (1.0 + beta) * epsilon;
    info!(prev_epsilon, epsilon, "computing local kernels at an adaptive scale");

    let mut data = Vec::with_capacity(samples.len());
    for i in 0..samples.len() {
        let center: ArrayView1<f64> = samples.domain().point(i);
        let restriction = DomainRestriction::around(domain, samples.domain(), global.domain(), center, epsilon);
        if restriction.is_empty() {
            debug!(center = %Coords(center), "empty restriction, skipping");
            continue;
        }

        let local_samples = Samples::of(&restriction, map);
        let local = MetricsProxy::new(domain_metric, &local_samples);
        let (projection, _) = project(&local_samples, local.domain(), &local.graph(), epsilon);

        let diagram = PersistenceDiagram::from_projections(&[projection]);
        data.push(PointPersistenceData::new(center.to_owned(), map, diagram));
    }
    data
}
