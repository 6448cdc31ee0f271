//! Topology Module: Rips Complexes and Local Kernel Persistence
//!
//! Implements the combinatorial side of discontinuity detection:
//! - Rips graphs and their connected components
//! - Projections of graph components onto domain components
//! - Kernel persistence diagrams over a filtration
//! - The fixed-filtration and adaptive local kernel algorithms
//!
//! ## Mathematical Background
//!
//! For a map f: D → R sampled at X ⊂ D, the graph Γ = {(x, f(x))} carries
//! the metric max(d_D, d_R). The projection Γ → X is 1-Lipschitz, so it
//! induces a map H₀(R_ε(Γ)) → H₀(R_ε(X)) on components at every scale ε.
//!
//! ```text
//!   H₀(R_ε₀(Γ)) ──> H₀(R_ε₁(Γ)) ──> ... ──> H₀(R_εₙ(Γ))
//!        │               │                       │
//!        ▼               ▼                       ▼
//!   H₀(R_ε₀(X)) ──> H₀(R_ε₁(X)) ──> ... ──> H₀(R_εₙ(X))
//! ```
//!
//! Near a continuity point the vertical maps are eventually injective. A
//! kernel that persists across many scales means the graph stays torn
//! where the domain is whole.

mod kernels;
mod persistence;
mod rips;

pub use kernels::{compute_alg1, compute_alg2, find_epsilons, PointPersistenceData};
pub use persistence::{kernel_of, KernelClass, PersistenceDiagram, Projection};
pub use rips::{Connectivity, RipsComplex, RipsGraph};
