//! # TDA-Discontinuity
//!
//! Discontinuity Detection for Sampled Maps via Local Kernel Persistence
//!
//! ## Theoretical Framework
//!
//! Given a map f: D → R known only through samples, this crate decides
//! where f is likely discontinuous by comparing the connectivity of the
//! sampled domain with the connectivity of the sampled graph of f.
//!
//! ### Central Observation
//!
//! The projection (x, f(x)) ↦ x is 1-Lipschitz for the max metric on the
//! graph, so at every scale ε it maps graph components onto domain
//! components. Where f is continuous this map becomes injective at small
//! scales; across a jump two graph components land on one domain component
//! and stay that way for a long stretch of the filtration.
//!
//! ### Methodology
//!
//! 1. **Sampling**: grids or seeded random clouds in a cube (optionally with
//!    a hole), mapped through the map under test
//!
//! 2. **Local Rips Complexes**: around each test point, 1-skeleton Rips
//!    complexes of the restricted domain and of its graph
//!
//! 3. **Kernel Persistence**: birth and death of kernel generators of the
//!    graph → domain projection over the filtration
//!
//! 4. **Scoring**: a quality function turns each diagram into a score in
//!    [0, 1]; scores at or above the threshold are flagged
//!
//! ## Quotient Metrics
//!
//! For maps that push part of the domain out (translations, horseshoes),
//! the exit set can be collapsed to a single point so that leaving the
//! domain is not mistaken for tearing.

pub mod config;
pub mod geometry;
pub mod metrics;
pub mod output;
pub mod quality;
pub mod sampling;
pub mod topology;

mod run;

pub use run::run;

// Re-exports from config
pub use config::{ConfigError, RunArgs, RunConfig};

// Re-exports from output
pub use output::{write_results, write_results_to_file, OutputError};

// Re-exports from topology
pub use topology::{
    compute_alg1,
    compute_alg2,
    find_epsilons,
    PersistenceDiagram,
    PointPersistenceData,
    RipsComplex,
};

// Re-exports from quality
pub use quality::{score_persistence_data, QualityFunction};

// Re-exports from sampling
pub use sampling::{Domain, Map};

// Re-exports from metrics
pub use metrics::{EuclideanMetric, IndexMetric, MaxDomainRangeMetric, Metric};
