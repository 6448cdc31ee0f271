//! Run Configuration
//!
//! A run is described by `--key value...` groups, parsed with clap:
//!
//! ```text
//!   --domain uniform 21 0 1 --map linear_fold1d 2 --epsilons 0.05 0.2 20
//!   └──────┬─────────────┘ └──────────┬───────┘ └──────────┬──────────┘
//!     samples of D              f: D → R            filtration scales
//! ```
//!
//! Every key is optional; omitted keys keep their defaults. [`RunArgs`] is
//! the raw command-line form, shared by the binary's argv and by run-list
//! lines. The validated [`RunConfig`] then builds the domain, map, metric,
//! test points and epsilons of the run.

use crate::geometry::{Cube, Interval};
use crate::metrics::{EuclideanMetric, ExitSetQuotientMetric, HorseshoeExitSetQuotientMetric, Metric};
use crate::quality::{quality_function, NormalizedLongest, QualityFunction, DEFAULT_THRESHOLD};
use crate::sampling::{
    Domain, HorseshoeG, HorseshoeS, HorseshoeU, LinearDiscontinuousMap, LinearMap, Map, Noise, NoiseError,
    NoisyMap, RandomCube, StepMap2To1, Translation, UniformCube,
};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{ArgAction, Args, Parser, ValueEnum};
use ndarray::Array1;
use rand::Rng;
use std::ffi::OsString;
use std::iter::Peekable;
use std::path::PathBuf;
use std::slice;
use std::str::FromStr;
use thiserror::Error;

/// Margin of the horseshoe square that is expelled, and the one that is entered
const HORSESHOE_MARGIN: f64 = 0.1;

/// Strip removed from the `*_with_hole` domains, truncated to the domain's dimension
const HOLE: [Interval; 2] = [Interval { min: 0.33, max: 0.66 }, Interval { min: 0.0, max: 1.0 }];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown parameter --{0}")]
    UnknownKey(String),

    #[error("unknown value '{value}' for --{key}")]
    UnknownValue { key: String, value: String },

    #[error("--{key} needs a value")]
    MissingValue { key: String },

    #[error("'{value}' is not a valid number for --{key}")]
    InvalidNumber { key: String, value: String },

    #[error("unexpected '{token}' after --{key}")]
    UnexpectedToken { key: String, token: String },

    #[error("unexpected value '{0}' outside any parameter")]
    StrayValue(String),

    #[error("--{key}: {reason}")]
    OutOfRange { key: String, reason: String },

    #[error("invalid noise: {0}")]
    Noise(#[from] NoiseError),

    #[error("{0}")]
    Arguments(String),
}

impl From<clap::Error> for ConfigError {
    fn from(err: clap::Error) -> Self {
        let context = |kind: ContextKind| match err.get(kind) {
            Some(ContextValue::String(s)) => s.clone(),
            _ => String::new(),
        };
        // Reported as "--alpha <ALPHA>"
        let arg = context(ContextKind::InvalidArg);
        let key = arg
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_start_matches('-')
            .to_string();
        let value = context(ContextKind::InvalidValue);

        match err.kind() {
            ErrorKind::UnknownArgument if arg.starts_with('-') => ConfigError::UnknownKey(key),
            ErrorKind::UnknownArgument => ConfigError::StrayValue(arg),
            ErrorKind::InvalidValue | ErrorKind::TooFewValues | ErrorKind::WrongNumberOfValues
                if value.is_empty() =>
            {
                ConfigError::MissingValue { key }
            }
            ErrorKind::InvalidValue => ConfigError::UnknownValue { key, value },
            ErrorKind::ValueValidation => ConfigError::InvalidNumber { key, value },
            _ => ConfigError::Arguments(err.to_string().trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainKind {
    Uniform,
    UniformWithHole,
    Random,
    RandomWithHole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKind {
    Linear1d,
    Linear2d,
    /// Planar step map onto the line
    LinearDiscontinuous,
    /// Line folded back at its centre
    LinearFold1d,
    HorseshoeU,
    HorseshoeS,
    /// Horseshoe whose middle leg is folded out of the square
    HorseshoeG,
    Translation1d,
    Translation2d,
}

impl MapKind {
    fn parse(name: &str) -> Option<(Self, Vec<f64>)> {
        let kind = match name {
            "linear1d" => (MapKind::Linear1d, vec![1.0]),
            "linear2d" => (MapKind::Linear2d, vec![1.0, 0.0]),
            "linear_discontinuous" | "linear_discontinous" => (MapKind::LinearDiscontinuous, vec![1.0]),
            "linear_fold1d" => (MapKind::LinearFold1d, vec![1.0]),
            "horseshoe_u" => (MapKind::HorseshoeU, vec![0.0]),
            "horseshoe_s" => (MapKind::HorseshoeS, vec![0.0]),
            "horseshoe_g" => (MapKind::HorseshoeG, vec![0.0]),
            "translation1d" => (MapKind::Translation1d, vec![0.1]),
            "translation2d" => (MapKind::Translation2d, vec![0.1, 0.0]),
            _ => return None,
        };
        Some(kind)
    }

    pub fn domain_dimension(self) -> usize {
        match self {
            MapKind::Linear1d | MapKind::Translation1d | MapKind::LinearFold1d => 1,
            _ => 2,
        }
    }

    pub fn range_dimension(self) -> usize {
        match self {
            MapKind::Linear1d | MapKind::LinearDiscontinuous | MapKind::Translation1d | MapKind::LinearFold1d => 1,
            _ => 2,
        }
    }

    fn is_horseshoe(self) -> bool {
        matches!(self, MapKind::HorseshoeU | MapKind::HorseshoeS | MapKind::HorseshoeG)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricsKind {
    #[value(name = "default", alias = "euclidean")]
    Euclidean,
    #[value(name = "quotient_exit_set")]
    QuotientExitSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    /// Fixed filtration around random or grid test points
    #[value(name = "1")]
    Fixed,
    /// Bisected global scale, one step per domain point
    #[value(name = "2")]
    Adaptive,
}

/// Command-line form of a run; see [`RunConfig`] for the defaults
#[derive(Debug, Clone, Default, PartialEq, Args)]
pub struct RunArgs {
    /// Sampled domain: uniform|uniform_with_hole|random|random_with_hole SIZE [MIN [MAX]]...
    #[arg(long, num_args = 2.., value_name = "ARGS", allow_negative_numbers = true, action = ArgAction::Set)]
    pub domain: Option<Vec<String>>,

    /// Map under test and its parameters, e.g. `linear_fold1d 2`
    #[arg(long, num_args = 1.., value_name = "ARGS", allow_negative_numbers = true, action = ArgAction::Set)]
    pub map: Option<Vec<String>>,

    /// Bound of the uniform noise added to every image
    #[arg(long, allow_negative_numbers = true)]
    pub noise: Option<f64>,

    #[arg(long)]
    pub metrics: Option<MetricsKind>,

    /// Test points: uniform|random SIZE
    #[arg(long, num_args = 2, value_name = "ARGS", action = ArgAction::Set)]
    pub test: Option<Vec<String>>,

    /// Filtration scales: MIN [MAX [COUNT]]
    #[arg(long, num_args = 1..=3, value_name = "ARGS", allow_negative_numbers = true, action = ArgAction::Set)]
    pub epsilons: Option<Vec<String>>,

    /// Bisection tolerance of the adaptive algorithm
    #[arg(long, allow_negative_numbers = true)]
    pub alpha: Option<f64>,

    /// Inflation of the adaptive scale
    #[arg(long, allow_negative_numbers = true)]
    pub beta: Option<f64>,

    /// Radius of the local restriction around a test point
    #[arg(long, allow_negative_numbers = true)]
    pub radius: Option<f64>,

    /// Quality function, 1 to 5
    #[arg(long)]
    pub quality: Option<u32>,

    #[arg(long, allow_negative_numbers = true)]
    pub threshold: Option<f64>,

    #[arg(long)]
    pub algorithm: Option<Algorithm>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// One run-list line; the binary flattens [`RunArgs`] into its own parser
#[derive(Debug, Parser)]
#[command(no_binary_name = true, args_override_self = true, disable_help_flag = true)]
struct ParamLine {
    #[command(flatten)]
    args: RunArgs,
}

/// Everything one detection run needs
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub domain_kind: DomainKind,
    pub domain_size: usize,
    /// Intervals given on the command line; padded to the domain dimension
    pub domain_intervals: Vec<Interval>,
    pub map_kind: MapKind,
    pub map_params: Vec<f64>,
    pub noise_delta: f64,
    pub metrics: MetricsKind,
    pub test_kind: DomainKind,
    pub test_size: usize,
    pub epsilon_range: Interval,
    pub epsilon_count: usize,
    pub alpha: f64,
    pub beta: f64,
    pub radius: f64,
    pub quality: u32,
    pub threshold: f64,
    pub algorithm: Algorithm,
    pub seed: u64,
    pub output: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            domain_kind: DomainKind::Uniform,
            domain_size: 11,
            domain_intervals: vec![Interval::new(0.0, 1.0)],
            map_kind: MapKind::LinearDiscontinuous,
            map_params: vec![1.0],
            noise_delta: 0.0,
            metrics: MetricsKind::Euclidean,
            test_kind: DomainKind::Random,
            test_size: 100,
            epsilon_range: Interval::new(0.05, 0.2),
            epsilon_count: 20,
            alpha: 0.01,
            beta: 0.5,
            radius: 0.2,
            quality: 1,
            threshold: DEFAULT_THRESHOLD,
            algorithm: Algorithm::Fixed,
            seed: 0,
            output: PathBuf::from("output.txt"),
        }
    }
}

fn out_of_range(key: &str, reason: &str) -> ConfigError {
    ConfigError::OutOfRange {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Values of one multi-token `--key`
struct Values<'a> {
    key: &'static str,
    tokens: Peekable<slice::Iter<'a, String>>,
}

impl<'a> Values<'a> {
    fn new(key: &'static str, tokens: &'a [String]) -> Self {
        Self {
            key,
            tokens: tokens.iter().peekable(),
        }
    }

    fn missing(&self) -> ConfigError {
        ConfigError::MissingValue { key: self.key.to_string() }
    }

    fn word(&mut self) -> Result<&'a str, ConfigError> {
        self.tokens.next().map(String::as_str).ok_or_else(|| self.missing())
    }

    fn number<T: FromStr>(&mut self) -> Result<T, ConfigError> {
        let token = self.word()?;
        token.parse().map_err(|_| ConfigError::InvalidNumber {
            key: self.key.to_string(),
            value: token.to_string(),
        })
    }

    /// Next token as a number, if there is one
    fn maybe_number<T: FromStr>(&mut self) -> Result<Option<T>, ConfigError> {
        match self.tokens.peek() {
            Some(_) => self.number().map(Some),
            None => Ok(None),
        }
    }

    fn finish(mut self) -> Result<(), ConfigError> {
        match self.tokens.next() {
            Some(token) => Err(ConfigError::UnexpectedToken {
                key: self.key.to_string(),
                token: token.clone(),
            }),
            None => Ok(()),
        }
    }

    fn unknown(&self, value: &str) -> ConfigError {
        ConfigError::UnknownValue {
            key: self.key.to_string(),
            value: value.to_string(),
        }
    }

    fn out_of_range(&self, reason: &str) -> ConfigError {
        out_of_range(self.key, reason)
    }
}

fn domain_kind(values: &Values, name: &str, allow_hole: bool) -> Result<DomainKind, ConfigError> {
    match name {
        "uniform" => Ok(DomainKind::Uniform),
        "random" => Ok(DomainKind::Random),
        "uniform_with_hole" if allow_hole => Ok(DomainKind::UniformWithHole),
        "random_with_hole" if allow_hole => Ok(DomainKind::RandomWithHole),
        _ => Err(values.unknown(name)),
    }
}

impl RunConfig {
    /// Parse one whitespace-separated parameter line on top of the defaults.
    pub fn parse(params: &str) -> Result<Self, ConfigError> {
        Self::from_tokens(params.split_whitespace())
    }

    /// Parse already tokenised parameters, such as a process's argv without
    /// the program name.
    pub fn from_tokens<I, T>(tokens: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let line = ParamLine::try_parse_from(tokens)?;
        Self::from_args(&line.args)
    }

    /// Validate parsed arguments on top of the defaults.
    pub fn from_args(args: &RunArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(tokens) = &args.domain {
            config.apply_domain(Values::new("domain", tokens))?;
        }
        if let Some(tokens) = &args.map {
            config.apply_map(Values::new("map", tokens))?;
        }
        if let Some(delta) = args.noise {
            if !delta.is_finite() || delta < 0.0 {
                return Err(NoiseError::InvalidDelta { axis: 0, delta }.into());
            }
            config.noise_delta = delta;
        }
        if let Some(metrics) = args.metrics {
            config.metrics = metrics;
        }
        if let Some(tokens) = &args.test {
            let mut values = Values::new("test", tokens);
            let name = values.word()?;
            config.test_kind = domain_kind(&values, name, false)?;
            config.test_size = values.number()?;
            values.finish()?;
        }
        if let Some(tokens) = &args.epsilons {
            config.apply_epsilons(Values::new("epsilons", tokens))?;
        }
        if let Some(alpha) = args.alpha {
            if !(alpha > 0.0) {
                return Err(out_of_range("alpha", "tolerance must be positive"));
            }
            config.alpha = alpha;
        }
        if let Some(beta) = args.beta {
            if !(beta >= 0.0) {
                return Err(out_of_range("beta", "inflation must be non-negative"));
            }
            config.beta = beta;
        }
        if let Some(radius) = args.radius {
            config.radius = radius;
        }
        if let Some(quality) = args.quality {
            if quality_function(quality).is_none() {
                return Err(ConfigError::UnknownValue {
                    key: "quality".to_string(),
                    value: quality.to_string(),
                });
            }
            config.quality = quality;
        }
        if let Some(threshold) = args.threshold {
            config.threshold = threshold;
        }
        if let Some(algorithm) = args.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(seed) = args.seed {
            config.seed = seed;
        }
        if let Some(out) = &args.out {
            config.output = out.clone();
        }
        Ok(config)
    }

    fn apply_domain(&mut self, mut values: Values) -> Result<(), ConfigError> {
        let name = values.word()?;
        self.domain_kind = domain_kind(&values, name, true)?;
        self.domain_size = values.number()?;
        self.domain_intervals.clear();
        while let Some(min) = values.maybe_number::<f64>()? {
            let max = values.maybe_number::<f64>()?.unwrap_or(min + 1.0);
            if !(min.is_finite() && max >= min) {
                return Err(values.out_of_range("need min <= max for every interval"));
            }
            self.domain_intervals.push(Interval::new(min, max));
        }
        if self.domain_intervals.is_empty() {
            self.domain_intervals.push(Interval::new(0.0, 1.0));
        }
        values.finish()
    }

    fn apply_map(&mut self, mut values: Values) -> Result<(), ConfigError> {
        let name = values.word()?;
        let (kind, mut params) = MapKind::parse(name).ok_or_else(|| values.unknown(name))?;
        for param in params.iter_mut() {
            match values.maybe_number()? {
                Some(v) => *param = v,
                None => break,
            }
        }
        if kind.is_horseshoe() && !(params[0] >= 0.0) {
            return Err(values.out_of_range("horseshoe offset must be non-negative"));
        }
        self.map_kind = kind;
        self.map_params = params;
        values.finish()
    }

    fn apply_epsilons(&mut self, mut values: Values) -> Result<(), ConfigError> {
        let min: f64 = values.number()?;
        let max = values.maybe_number::<f64>()?.unwrap_or(min + 1.0);
        let count = values.maybe_number()?.unwrap_or(self.epsilon_count);
        if !(min > 0.0 && max > min) {
            return Err(values.out_of_range("need 0 < min < max"));
        }
        if count == 0 {
            return Err(values.out_of_range("need at least one epsilon"));
        }
        self.epsilon_range = Interval::new(min, max);
        self.epsilon_count = count;
        values.finish()
    }

    pub fn domain_dimension(&self) -> usize {
        self.map_kind.domain_dimension()
    }

    pub fn range_dimension(&self) -> usize {
        self.map_kind.range_dimension()
    }

    /// The configured intervals, the last one repeated up to the domain dimension
    pub fn domain_cube(&self) -> Cube {
        let dim = self.domain_dimension();
        let last = self.domain_intervals.last().copied().unwrap_or_default();
        Cube::new(
            (0..dim)
                .map(|d| self.domain_intervals.get(d).copied().unwrap_or(last))
                .collect(),
        )
    }

    fn sampled_domain<R: Rng>(&self, kind: DomainKind, size: usize, rng: &mut R) -> Box<dyn Domain> {
        let cube = self.domain_cube();
        let dim = cube.dimension();
        let hole = || Cube::new(HOLE[..dim.min(HOLE.len())].to_vec());
        match kind {
            DomainKind::Uniform => Box::new(UniformCube::new(cube, vec![size; dim])),
            DomainKind::UniformWithHole => Box::new(UniformCube::with_hole(cube, vec![size; dim], hole())),
            DomainKind::Random => Box::new(RandomCube::new(cube, size, rng)),
            DomainKind::RandomWithHole => Box::new(RandomCube::with_hole(cube, hole(), size, rng)),
        }
    }

    pub fn create_domain<R: Rng>(&self, rng: &mut R) -> Box<dyn Domain> {
        self.sampled_domain(self.domain_kind, self.domain_size, rng)
    }

    pub fn create_test_domain<R: Rng>(&self, rng: &mut R) -> Box<dyn Domain> {
        self.sampled_domain(self.test_kind, self.test_size, rng)
    }

    pub fn create_noise(&self) -> Result<Noise, ConfigError> {
        Ok(Noise::isotropic(self.range_dimension(), self.noise_delta)?)
    }

    pub fn create_map(&self) -> Result<MapUnderTest, ConfigError> {
        let cube = self.domain_cube();
        let p = &self.map_params;
        let mut horseshoe_metric = None;
        let map: Box<dyn Map> = match self.map_kind {
            MapKind::Linear1d | MapKind::Linear2d => self.with_noise(LinearMap::new(p.clone()))?,
            MapKind::LinearDiscontinuous => self.with_noise(StepMap2To1::new(&cube, p[0]))?,
            MapKind::LinearFold1d => self.with_noise(LinearDiscontinuousMap::new(vec![p[0]], &cube))?,
            MapKind::HorseshoeU => {
                let horseshoe = HorseshoeU::new(HORSESHOE_MARGIN, HORSESHOE_MARGIN, &cube, p[0]);
                horseshoe_metric = Some(horseshoe.exit_set_metric().clone());
                self.with_noise(horseshoe)?
            }
            MapKind::HorseshoeS => {
                let horseshoe = HorseshoeS::new(HORSESHOE_MARGIN, HORSESHOE_MARGIN, &cube, p[0]);
                horseshoe_metric = Some(horseshoe.exit_set_metric().clone());
                self.with_noise(horseshoe)?
            }
            MapKind::HorseshoeG => {
                let horseshoe = HorseshoeG::new(HORSESHOE_MARGIN, HORSESHOE_MARGIN, &cube, p[0]);
                horseshoe_metric = Some(horseshoe.exit_set_metric().clone());
                self.with_noise(horseshoe)?
            }
            MapKind::Translation1d | MapKind::Translation2d => {
                self.with_noise(Translation::new(Array1::from_vec(p.clone())))?
            }
        };
        Ok(MapUnderTest { map, horseshoe_metric })
    }

    fn with_noise<M: Map + 'static>(&self, map: M) -> Result<Box<dyn Map>, ConfigError> {
        let noise = self.create_noise()?;
        if noise.is_silent() {
            Ok(Box::new(map))
        } else {
            Ok(Box::new(NoisyMap::new(map, noise, self.seed)))
        }
    }

    /// Domain metric of the run; the graph metric is derived from it
    pub fn create_metric<'a>(&self, domain: &'a dyn Domain, map: &'a MapUnderTest) -> DomainMetric<'a> {
        match (self.metrics, &map.horseshoe_metric) {
            (MetricsKind::Euclidean, _) => DomainMetric::Euclidean(EuclideanMetric),
            (MetricsKind::QuotientExitSet, Some(horseshoe)) => DomainMetric::Horseshoe(horseshoe),
            (MetricsKind::QuotientExitSet, None) => {
                DomainMetric::ExitSet(ExitSetQuotientMetric::new(domain, map.map(), &EuclideanMetric))
            }
        }
    }

    /// `epsilon_count` evenly spaced scales from min to max
    pub fn epsilons(&self) -> Vec<f64> {
        let Interval { min, max } = self.epsilon_range;
        if self.epsilon_count == 1 {
            return vec![min];
        }
        let delta = (max - min) / (self.epsilon_count - 1) as f64;
        (0..self.epsilon_count).map(|k| min + delta * k as f64).collect()
    }

    pub fn create_quality_function(&self) -> Box<dyn QualityFunction> {
        quality_function(self.quality).unwrap_or_else(|| Box::new(NormalizedLongest::default()))
    }
}

impl FromStr for RunConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The configured map, plus the quotient metric of its exit set when the map
/// knows it in closed form
pub struct MapUnderTest {
    map: Box<dyn Map>,
    horseshoe_metric: Option<HorseshoeExitSetQuotientMetric>,
}

impl MapUnderTest {
    pub fn map(&self) -> &dyn Map {
        self.map.as_ref()
    }

    pub fn horseshoe_metric(&self) -> Option<&HorseshoeExitSetQuotientMetric> {
        self.horseshoe_metric.as_ref()
    }
}

pub enum DomainMetric<'a> {
    Euclidean(EuclideanMetric),
    ExitSet(ExitSetQuotientMetric<'a>),
    Horseshoe(&'a HorseshoeExitSetQuotientMetric),
}

impl DomainMetric<'_> {
    pub fn as_metric(&self) -> &dyn Metric {
        match self {
            DomainMetric::Euclidean(m) => m,
            DomainMetric::ExitSet(m) => m,
            DomainMetric::Horseshoe(m) => *m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_defaults() {
        let config = RunConfig::parse("").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.domain_dimension(), 2);
        assert_eq!(config.range_dimension(), 1);
        assert_eq!(config.domain_cube(), Cube::unit(2));

        let eps = config.epsilons();
        assert_eq!(eps.len(), 20);
        assert_relative_eq!(eps[0], 0.05);
        assert_relative_eq!(eps[19], 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_full_parameter_string() {
        let config: RunConfig = "--domain random_with_hole 50 -1 1 0 --map translation2d 0.3 \
             --noise 0.01 --metrics quotient_exit_set --test uniform 7 --epsilons 0.1 0.5 5 \
             --alpha 0.02 --beta 0.25 --radius 0.3 --quality 3 --threshold 0.8 --algorithm 2 \
             --seed 42 --out result.txt"
            .parse()
            .unwrap();

        assert_eq!(config.domain_kind, DomainKind::RandomWithHole);
        assert_eq!(config.domain_size, 50);
        assert_eq!(
            config.domain_cube(),
            Cube::new(vec![Interval::new(-1.0, 1.0), Interval::new(0.0, 1.0)])
        );
        assert_eq!(config.map_kind, MapKind::Translation2d);
        assert_eq!(config.map_params, vec![0.3, 0.0]);
        assert_eq!(config.metrics, MetricsKind::QuotientExitSet);
        assert_eq!((config.test_kind, config.test_size), (DomainKind::Uniform, 7));
        let eps = config.epsilons();
        assert_eq!(eps.len(), 5);
        for (e, expected) in eps.iter().zip([0.1, 0.2, 0.3, 0.4, 0.5]) {
            assert_relative_eq!(*e, expected, epsilon = 1e-12);
        }
        assert_eq!(config.quality, 3);
        assert_eq!(config.algorithm, Algorithm::Adaptive);
        assert_eq!(config.seed, 42);
        assert_eq!(config.output, PathBuf::from("result.txt"));
    }

    #[test]
    fn test_interval_padding() {
        let config = RunConfig::parse("--domain uniform 5 2 3 --map horseshoe_u").unwrap();
        assert_eq!(
            config.domain_cube(),
            Cube::new(vec![Interval::new(2.0, 3.0), Interval::new(2.0, 3.0)])
        );
        let config = RunConfig::parse("--domain uniform 5 --map linear1d 2").unwrap();
        assert_eq!(config.domain_cube(), Cube::unit(1));
        assert_eq!(config.map_params, vec![2.0]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            RunConfig::parse("--colour red"),
            Err(ConfigError::UnknownKey("colour".into()))
        );
        assert!(matches!(
            RunConfig::parse("--map spiral"),
            Err(ConfigError::UnknownValue { .. })
        ));
        assert!(matches!(
            RunConfig::parse("--alpha"),
            Err(ConfigError::MissingValue { .. })
        ));
        assert!(matches!(
            RunConfig::parse("--radius wide"),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert_eq!(
            RunConfig::parse("--beta 0.5 0.6"),
            Err(ConfigError::StrayValue("0.6".into()))
        );
        assert!(matches!(
            RunConfig::parse("--map linear1d 2 3"),
            Err(ConfigError::UnexpectedToken { .. })
        ));
        assert!(matches!(RunConfig::parse("--quality 9"), Err(ConfigError::UnknownValue { .. })));
        assert!(matches!(RunConfig::parse("--test random_with_hole 5"), Err(ConfigError::UnknownValue { .. })));
        assert!(matches!(RunConfig::parse("--noise -0.1"), Err(ConfigError::Noise(_))));
        assert!(matches!(RunConfig::parse("--epsilons 0.3 0.1 4"), Err(ConfigError::OutOfRange { .. })));
        assert!(matches!(RunConfig::parse("--map horseshoe_s -0.1"), Err(ConfigError::OutOfRange { .. })));
    }

    #[test]
    fn test_reversed_interval_is_an_error() {
        assert_eq!(
            RunConfig::parse("--domain uniform 11 1 0"),
            Err(ConfigError::OutOfRange {
                key: "domain".into(),
                reason: "need min <= max for every interval".into(),
            })
        );
        assert!(matches!(
            RunConfig::parse("--domain uniform 11 0 1 0.5 NaN"),
            Err(ConfigError::OutOfRange { .. })
        ));
        // A lone min still pads to a unit-length interval
        let config = RunConfig::parse("--domain uniform 11 -2").unwrap();
        assert_eq!(config.domain_intervals, vec![Interval::new(-2.0, -1.0)]);
    }

    #[test]
    fn test_values_keep_shell_tokens() {
        let config = RunConfig::parse("--out results--run1.txt").unwrap();
        assert_eq!(config.output, PathBuf::from("results--run1.txt"));

        let config = RunConfig::from_tokens(["--out", "my results.txt", "--seed", "4"]).unwrap();
        assert_eq!(config.output, PathBuf::from("my results.txt"));
        assert_eq!(config.seed, 4);
    }

    #[test]
    fn test_parsed_arguments_validate_like_lines() {
        let args = RunArgs {
            map: Some(vec!["horseshoe_g".into(), "0.2".into()]),
            algorithm: Some(Algorithm::Adaptive),
            ..RunArgs::default()
        };
        let config = RunConfig::from_args(&args).unwrap();
        assert_eq!(config.map_kind, MapKind::HorseshoeG);
        assert_eq!(config.map_params, vec![0.2]);
        assert_eq!(config.algorithm, Algorithm::Adaptive);

        let args = RunArgs {
            alpha: Some(0.0),
            ..RunArgs::default()
        };
        assert!(matches!(RunConfig::from_args(&args), Err(ConfigError::OutOfRange { .. })));
    }

    #[test]
    fn test_negative_values_survive_splitting() {
        let config = RunConfig::parse("--map translation1d -0.25").unwrap();
        assert_eq!(config.map_params, vec![-0.25]);
    }

    #[test]
    fn test_factories() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = RunConfig::parse("--domain uniform_with_hole 11 --map linear2d 2 3 --test random 5").unwrap();

        let domain = config.create_domain(&mut rng);
        assert_eq!(domain.dimension(), 2);
        // Grid columns at x = 0.4, 0.5, 0.6 fall into the hole
        assert_eq!(domain.count(), 88);
        assert_eq!(config.create_test_domain(&mut rng).count(), 5);

        let map = config.create_map().unwrap();
        assert_eq!(map.map().value_at(array![1.0, 1.0].view()), array![2.0, 3.0]);
        assert!(map.horseshoe_metric().is_none());
    }

    #[test]
    fn test_metric_selection() {
        let mut rng = StdRng::seed_from_u64(0);

        let config = RunConfig::parse("--map horseshoe_u 0.05 --metrics quotient_exit_set").unwrap();
        let domain = config.create_domain(&mut rng);
        let map = config.create_map().unwrap();
        assert!(matches!(config.create_metric(domain.as_ref(), &map), DomainMetric::Horseshoe(_)));

        let config = RunConfig::parse("--map translation1d 0.25 --metrics quotient_exit_set").unwrap();
        let domain = config.create_domain(&mut rng);
        let map = config.create_map().unwrap();
        let metric = config.create_metric(domain.as_ref(), &map);
        assert!(matches!(metric, DomainMetric::ExitSet(_)));
        assert!(metric.as_metric().has_index_metric());

        let config = RunConfig::parse("--map translation1d 0.25").unwrap();
        let map = config.create_map().unwrap();
        assert!(matches!(config.create_metric(domain.as_ref(), &map), DomainMetric::Euclidean(_)));

        for name in ["horseshoe_s", "horseshoe_g"] {
            let config = RunConfig::parse(&format!("--map {} 0.3 --metrics quotient_exit_set", name)).unwrap();
            assert_eq!((config.domain_dimension(), config.range_dimension()), (2, 2));
            let domain = config.create_domain(&mut rng);
            let map = config.create_map().unwrap();
            assert!(matches!(config.create_metric(domain.as_ref(), &map), DomainMetric::Horseshoe(_)));
        }
    }

    #[test]
    fn test_noisy_map_is_repeatable() {
        let config = RunConfig::parse("--map linear1d --noise 0.1 --seed 3").unwrap();
        let map = config.create_map().unwrap();
        let a = map.map().value_at(array![0.5].view());
        let b = map.map().value_at(array![0.5].view());
        assert_eq!(a, b);
        assert!((a[0] - 0.5).abs() <= 0.1);
    }
}
