//! The five scoring strategies

use super::QualityFunction;
use crate::topology::{PersistenceDiagram, PointPersistenceData};
use std::collections::BTreeMap;

/// Longest lifetime of each point's diagram
fn longest_per_point(data: &[PointPersistenceData]) -> impl Iterator<Item = usize> + '_ {
    data.iter().map(|p| p.diagram().longest_persistence())
}

/// Range of per-point longest lifetimes; `min` starts at `steps`
fn longest_range(data: &[PointPersistenceData], steps: usize) -> (usize, usize) {
    longest_per_point(data).fold((steps, 0), |(min, max), l| (min.min(l), max.max(l)))
}

/// Longest lifetime in `diagram`, floored at `floor`
fn longest_from(diagram: &PersistenceDiagram, floor: usize) -> usize {
    diagram.longest_persistence().max(floor)
}

/// `(longest − min) / (max − min)` over per-point longest lifetimes
#[derive(Debug, Clone, Default)]
pub struct NormalizedLongest {
    min: usize,
    max: usize,
}

impl QualityFunction for NormalizedLongest {
    fn init(&mut self, data: &[PointPersistenceData], steps: usize) {
        (self.min, self.max) = longest_range(data, steps);
    }

    fn calculate(&self, diagram: &PersistenceDiagram) -> f64 {
        if self.min == self.max {
            return 0.0;
        }
        let value = longest_from(diagram, self.min);
        (value - self.min) as f64 / (self.max - self.min) as f64
    }

    fn name(&self) -> &'static str {
        "normalized longest"
    }
}

/// 1 for points whose longest lifetime is the run's maximum
#[derive(Debug, Clone, Default)]
pub struct LongestIsMaximal {
    min: usize,
    max: usize,
}

impl QualityFunction for LongestIsMaximal {
    fn init(&mut self, data: &[PointPersistenceData], steps: usize) {
        (self.min, self.max) = longest_range(data, steps);
    }

    fn calculate(&self, diagram: &PersistenceDiagram) -> f64 {
        if self.min == self.max {
            return 0.0;
        }
        if longest_from(diagram, self.min) == self.max {
            1.0
        } else {
            0.0
        }
    }

    fn name(&self) -> &'static str {
        "longest is maximal"
    }
}

/// Excess of the longest lifetime over the most common one.
///
/// On ties the smallest lifetime wins the mode.
#[derive(Debug, Clone, Default)]
pub struct AboveMode {
    mode: usize,
    max: usize,
}

impl AboveMode {
    pub fn mode(&self) -> usize {
        self.mode
    }
}

impl QualityFunction for AboveMode {
    fn init(&mut self, data: &[PointPersistenceData], _steps: usize) {
        let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
        for longest in longest_per_point(data) {
            *histogram.entry(longest).or_insert(0) += 1;
        }
        self.max = histogram.keys().next_back().copied().unwrap_or(0);

        let mut best = 0;
        self.mode = 0;
        for (&lifetime, &count) in &histogram {
            if count > best {
                best = count;
                self.mode = lifetime;
            }
        }
    }

    fn calculate(&self, diagram: &PersistenceDiagram) -> f64 {
        let value = diagram.longest_persistence();
        if value <= self.mode || self.max <= self.mode {
            return 0.0;
        }
        (value - self.mode) as f64 / (self.max - self.mode) as f64
    }

    fn name(&self) -> &'static str {
        "above mode"
    }
}

/// 1 for points holding an interval as long as the longest of the run,
/// with the range taken over every interval rather than per point
#[derive(Debug, Clone, Default)]
pub struct GlobalIntervalMaximal {
    min: usize,
    max: usize,
}

impl QualityFunction for GlobalIntervalMaximal {
    fn init(&mut self, data: &[PointPersistenceData], steps: usize) {
        self.min = steps;
        self.max = 0;
        for class in data.iter().flat_map(|p| p.diagram().iter()) {
            self.min = self.min.min(class.persistence());
            self.max = self.max.max(class.persistence());
        }
    }

    fn calculate(&self, diagram: &PersistenceDiagram) -> f64 {
        if self.min == self.max {
            return 0.0;
        }
        if longest_from(diagram, self.min) == self.max {
            1.0
        } else {
            0.0
        }
    }

    fn name(&self) -> &'static str {
        "global interval maximal"
    }
}

/// 1 if some kernel is still alive at the end of the filtration
#[derive(Debug, Clone, Default)]
pub struct ReachesLastStep {
    steps: usize,
}

impl QualityFunction for ReachesLastStep {
    fn init(&mut self, _data: &[PointPersistenceData], steps: usize) {
        self.steps = steps;
    }

    fn calculate(&self, diagram: &PersistenceDiagram) -> f64 {
        if self.steps == 0 || diagram.reaching(self.steps) == 0 {
            0.0
        } else {
            1.0
        }
    }

    fn name(&self) -> &'static str {
        "reaches last step"
    }
}
