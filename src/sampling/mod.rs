//! Sampling Module: Domains and Maps Under Test
//!
//! Provides the sampled spaces the kernel persistence algorithms work on:
//!
//! - **Domains**: regular grids and seeded random clouds in a cube (both
//!   optionally with a hole), explicit point lists, ball restrictions
//! - **Maps**: linear, folded (discontinuous), step, translation, the
//!   U, S and G horseshoes, and a noisy wrapper around any of them
//! - **Samples**: domain, range and graph clouds sharing one frame

mod domain;
mod horseshoe;
mod map;
mod noise;
mod samples;
mod traits;

pub use domain::{DomainRestriction, PointList, RandomCube, UniformCube};
pub use horseshoe::{HorseshoeG, HorseshoeS, HorseshoeU};
pub use map::{LinearDiscontinuousMap, LinearMap, NoisyMap, StepMap2To1, Translation};
pub use noise::{Noise, NoiseError};
pub use samples::Samples;
pub use traits::{Domain, Map};
