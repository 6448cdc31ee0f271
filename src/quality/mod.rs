//! Quality Module: Scoring Kernel Persistence Diagrams
//!
//! Turns the per-point persistence diagrams of a run into a scalar score
//! and a discontinuity flag. Scoring is two-pass, in the manner of a
//! calibrated detector:
//!
//! ```text
//!   all diagrams ──init──> global statistics (min, max, mode, steps)
//!   one diagram  ──calculate──> score ∈ [0, 1]
//!   score ≥ threshold  ⇒  flagged as a discontinuity
//! ```
//!
//! ## Strategies
//!
//! | # | Strategy                | Score |
//! |---|-------------------------|-------|
//! | 1 | `NormalizedLongest`     | longest lifetime rescaled to the run's range |
//! | 2 | `LongestIsMaximal`      | 1 for points attaining the run's maximum |
//! | 3 | `AboveMode`             | excess over the most common lifetime |
//! | 4 | `GlobalIntervalMaximal` | 1 for points holding a globally longest interval |
//! | 5 | `ReachesLastStep`       | 1 if some kernel survives the whole filtration |

mod functions;

pub use functions::{
    AboveMode,
    GlobalIntervalMaximal,
    LongestIsMaximal,
    NormalizedLongest,
    ReachesLastStep,
};

use crate::topology::{PersistenceDiagram, PointPersistenceData};
use tracing::info;

/// Flag threshold used when none is configured
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// A scoring strategy over the diagrams of one run
pub trait QualityFunction {
    /// Collect run-wide statistics; `steps` is the filtration length.
    fn init(&mut self, data: &[PointPersistenceData], steps: usize);

    /// Score one diagram against the statistics from `init`.
    fn calculate(&self, diagram: &PersistenceDiagram) -> f64;

    /// Human-readable strategy name
    fn name(&self) -> &'static str;
}

/// Strategy by its number (1..=5)
pub fn quality_function(number: u32) -> Option<Box<dyn QualityFunction>> {
    match number {
        1 => Some(Box::new(NormalizedLongest::default())),
        2 => Some(Box::new(LongestIsMaximal::default())),
        3 => Some(Box::new(AboveMode::default())),
        4 => Some(Box::new(GlobalIntervalMaximal::default())),
        5 => Some(Box::new(ReachesLastStep::default())),
        _ => None,
    }
}

/// Score every point: `init` once over the whole run, then `calculate`
/// per point, flagging scores at or above `threshold`.
pub fn score_persistence_data(
    data: &mut [PointPersistenceData],
    quality: &mut dyn QualityFunction,
    steps: usize,
    threshold: f64,
) {
    quality.init(data, steps);

    let mut flagged = 0;
    for point in data.iter_mut() {
        let score = quality.calculate(point.diagram());
        let discontinuity = score >= threshold;
        flagged += usize::from(discontinuity);
        point.set_score(score, discontinuity);
    }
    info!(
        strategy = quality.name(),
        points = data.len(),
        flagged,
        threshold,
        "scored persistence data"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::LinearMap;
    use crate::topology::KernelClass;
    use ndarray::array;
    use std::cell::RefCell;

    /// Records the order of calls it receives
    struct Recorder {
        calls: RefCell<Vec<&'static str>>,
    }

    impl QualityFunction for Recorder {
        fn init(&mut self, data: &[PointPersistenceData], steps: usize) {
            assert_eq!(data.len(), 3);
            assert_eq!(steps, 4);
            self.calls.borrow_mut().push("init");
        }

        fn calculate(&self, diagram: &PersistenceDiagram) -> f64 {
            self.calls.borrow_mut().push("calculate");
            diagram.longest_persistence() as f64 / 4.0
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    fn point(x: f64, lifetimes: &[(usize, usize)]) -> PointPersistenceData {
        let classes = lifetimes
            .iter()
            .enumerate()
            .map(|(c, &(b, d))| KernelClass::new(c, b, d))
            .collect();
        PointPersistenceData::new(array![x], &LinearMap::new(vec![1.0]), PersistenceDiagram::from_classes(classes))
    }

    #[test]
    fn test_init_runs_once_before_calculate() {
        let mut data = vec![point(0.0, &[]), point(0.5, &[(1, 4)]), point(1.0, &[(0, 2)])];
        let mut recorder = Recorder {
            calls: RefCell::new(Vec::new()),
        };
        score_persistence_data(&mut data, &mut recorder, 4, 0.5);

        assert_eq!(
            recorder.calls.into_inner(),
            vec!["init", "calculate", "calculate", "calculate"]
        );
        let flags: Vec<bool> = data.iter().map(PointPersistenceData::is_discontinuity).collect();
        assert_eq!(flags, vec![false, true, true]);
        assert_eq!(data[1].quality(), 0.75);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut data = vec![point(0.0, &[]), point(0.5, &[(0, 2)]), point(1.0, &[(0, 4)])];
        let mut quality = NormalizedLongest::default();
        score_persistence_data(&mut data, &mut quality, 4, 0.5);

        assert_eq!(data[1].quality(), 0.5);
        assert!(data[1].is_discontinuity());
        assert!(!data[0].is_discontinuity());
    }

    #[test]
    fn test_strategy_numbers() {
        let names: Vec<&str> = (1..=5)
            .filter_map(quality_function)
            .map(|q| q.name())
            .collect();
        assert_eq!(names.len(), 5);
        assert!(quality_function(0).is_none());
        assert!(quality_function(6).is_none());
    }
}
