//! Kernel Persistence Diagrams
//!
//! A sequence of projections (graph components → domain components, one
//! per filtration step) is turned into a persistence diagram of kernel
//! generators. A generator is "born" at the first step it is absorbed
//! into an already-seen target and "dies" when that run of steps ends.
//!
//! ## Interpretation
//!
//! - Long-lived kernels (large death − birth) mean the graph stays split
//!   where the domain is already connected: a likely discontinuity
//! - Short-lived kernels are sampling noise
//! - Only the first contiguous run of a generator is recorded; if it
//!   disappears and comes back later, the second run is ignored

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Source vertex position → target representative position, ascending by source
pub type Projection = BTreeMap<usize, usize>;

/// Sources whose target was already reached by a smaller source
pub fn kernel_of(projection: &Projection) -> Vec<usize> {
    let mut seen = BTreeSet::new();
    projection
        .iter()
        .filter_map(|(&source, &target)| if seen.insert(target) { None } else { Some(source) })
        .collect()
}

/// A kernel generator alive over filtration steps [birth, death)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelClass {
    pub column: usize,
    pub birth: usize,
    pub death: usize,
}

impl KernelClass {
    pub fn new(column: usize, birth: usize, death: usize) -> Self {
        Self { column, birth, death }
    }

    /// Lifetime in filtration steps
    pub fn persistence(&self) -> usize {
        self.death - self.birth
    }
}

/// Persistence diagram: one class per kernel generator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistenceDiagram {
    classes: Vec<KernelClass>,
}

impl PersistenceDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_classes(classes: Vec<KernelClass>) -> Self {
        Self { classes }
    }

    pub fn from_projections(projections: &[Projection]) -> Self {
        // generator -> (birth, death)
        let mut runs: BTreeMap<usize, (usize, usize)> = BTreeMap::new();

        for (step, projection) in projections.iter().enumerate() {
            for generator in kernel_of(projection) {
                let run = runs.entry(generator).or_insert((step, step));
                if run.1 == step {
                    run.1 = step + 1;
                }
            }
        }

        let classes = runs
            .values()
            .enumerate()
            .map(|(column, &(birth, death))| KernelClass::new(column, birth, death))
            .collect();
        Self { classes }
    }

    pub fn classes(&self) -> &[KernelClass] {
        &self.classes
    }

    pub fn iter(&self) -> impl Iterator<Item = &KernelClass> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Longest lifetime, 0 for an empty diagram
    pub fn longest_persistence(&self) -> usize {
        self.classes.iter().map(KernelClass::persistence).max().unwrap_or(0)
    }

    /// Number of classes still alive at step `steps` (the end of the filtration)
    pub fn reaching(&self, steps: usize) -> usize {
        self.classes.iter().filter(|c| c.death == steps).count()
    }
}

impl fmt::Display for PersistenceDiagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for class in &self.classes {
            writeln!(f, "{}: {} {} ", class.column, class.birth, class.death)?;
        }
        Ok(())
    }
}
