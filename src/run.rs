//! One detection run, from configuration to scored points

use crate::config::{Algorithm, ConfigError, RunConfig};
use crate::metrics::MaxDomainRangeMetric;
use crate::quality::score_persistence_data;
use crate::topology::{compute_alg1, compute_alg2, PointPersistenceData};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

/// Build the run's objects, compute local kernels and score them.
///
/// Random domains and test points are drawn from a generator seeded with
/// `config.seed`, so a run is reproducible.
pub fn run(config: &RunConfig) -> Result<Vec<PointPersistenceData>, ConfigError> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let domain = config.create_domain(&mut rng);
    let map = config.create_map()?;
    let metric = config.create_metric(domain.as_ref(), &map);
    let domain_metric = metric.as_metric();
    info!(
        samples = domain.count(),
        domain_dim = config.domain_dimension(),
        range_dim = config.range_dimension(),
        algorithm = ?config.algorithm,
        "starting run"
    );

    let (mut data, steps) = match config.algorithm {
        Algorithm::Fixed => {
            let test_domain = config.create_test_domain(&mut rng);
            let epsilons = config.epsilons();
            let graph_metric = MaxDomainRangeMetric::new(
                domain_metric,
                domain_metric,
                config.domain_dimension(),
                config.range_dimension(),
            );
            let data = compute_alg1(
                domain.as_ref(),
                map.map(),
                test_domain.as_ref(),
                &epsilons,
                config.radius,
                domain_metric,
                &graph_metric,
            );
            (data, epsilons.len())
        }
        Algorithm::Adaptive => {
            let data = compute_alg2(domain.as_ref(), map.map(), config.alpha, config.beta, domain_metric);
            (data, 1)
        }
    };

    let mut quality = config.create_quality_function();
    score_persistence_data(&mut data, quality.as_mut(), steps, config.threshold);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_is_flagged_near_its_centre() {
        let config = RunConfig::parse(
            "--domain uniform 11 --map linear_fold1d 1 --test uniform 11 --epsilons 0.05 0.2 20 --radius 0.2",
        )
        .unwrap();
        let data = run(&config).unwrap();

        assert_eq!(data.len(), 11);
        let flagged: Vec<f64> = data
            .iter()
            .filter(|d| d.is_discontinuity())
            .map(|d| d.argument()[0])
            .collect();
        // Only balls reaching across 0.5 from the left or centre see the fold
        assert!(data[5].is_discontinuity());
        assert!(flagged.iter().all(|&x| (0.25..=0.65).contains(&x)), "{:?}", flagged);
        assert!(!data[0].is_discontinuity());
        assert_eq!(data[0].quality(), 0.0);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let config = RunConfig::parse("--domain random 40 --map linear2d 1 1 --test random 10 --seed 9").unwrap();
        let a: Vec<String> = run(&config).unwrap().iter().map(ToString::to_string).collect();
        let b: Vec<String> = run(&config).unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_five_leg_horseshoes_run_with_their_quotient() {
        for name in ["horseshoe_s", "horseshoe_g"] {
            let config = RunConfig::parse(&format!(
                "--domain uniform 6 --map {} 0.2 --metrics quotient_exit_set --test uniform 3",
                name
            ))
            .unwrap();
            let data = run(&config).unwrap();
            assert_eq!(data.len(), 9);
            assert!(data.iter().all(|d| d.value().len() == 2));
        }
    }

    #[test]
    fn test_adaptive_run() {
        let config = RunConfig::parse("--domain uniform 21 --map linear_fold1d --algorithm 2 --quality 5").unwrap();
        let data = run(&config).unwrap();
        assert_eq!(data.len(), 21);
        assert!(data.iter().all(|d| d.quality() == 0.0 || d.quality() == 1.0));
    }
}
