//! Configuration system with YAML schema and validation.
//!
//! Implements mistake-proofing through:
//! - Type-safe configuration structs
//! - Range checks via `validator`
//! - Runtime semantic validation (dimension equality, sampling ranges)

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{SimError, SimResult};

/// Construct-time configuration of a [`SeisSystem`](crate::system::SeisSystem).
///
/// Loaded from YAML files with full schema validation, or assembled with
/// [`SystemConfig::builder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SystemConfig {
    /// Population size (number of nodes).
    #[validate(range(min = 1))]
    pub latent_dim: usize,

    /// Observed dimensionality; must equal `latent_dim`.
    #[validate(range(min = 1))]
    pub embed_dim: usize,

    /// Standard deviation of additive Gaussian noise.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f64,

    /// In-distribution initial-condition range `[low, high)`.
    #[serde(default = "SampleRange::in_distribution")]
    pub ind_range: SampleRange,

    /// Out-of-distribution initial-condition range `[low, high)`.
    #[serde(default = "SampleRange::out_of_distribution")]
    pub ood_range: SampleRange,

    /// Erdős–Rényi edge probability.
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_p_edge")]
    pub p_edge: f64,

    /// Master seed. `None` seeds from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Epidemic rates handed to every model instance.
    #[validate(nested)]
    #[serde(default)]
    pub model: SeisParams,
}

const fn default_noise_scale() -> f64 {
    0.01
}

const fn default_p_edge() -> f64 {
    0.05
}

impl SystemConfig {
    /// Default configuration for a population of `n` nodes.
    #[must_use]
    pub fn with_population(n: usize) -> Self {
        Self {
            latent_dim: n,
            embed_dim: n,
            noise_scale: default_noise_scale(),
            ind_range: SampleRange::in_distribution(),
            ood_range: SampleRange::out_of_distribution(),
            p_edge: default_p_edge(),
            seed: None,
            model: SeisParams::default(),
        }
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder(population: usize) -> SystemConfigBuilder {
        SystemConfigBuilder::new(population)
    }

    /// Run schema and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn check(&self) -> SimResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> SimResult<()> {
        if self.embed_dim != self.latent_dim {
            return Err(SimError::DimensionMismatch {
                latent_dim: self.latent_dim,
                embed_dim: self.embed_dim,
            });
        }
        self.ind_range.check("ind_range")?;
        self.ood_range.check("ood_range")?;
        if !self.noise_scale.is_finite() {
            return Err(SimError::NonFiniteValue {
                location: "noise_scale".to_string(),
            });
        }
        Ok(())
    }

    /// Sampling range for initial conditions.
    #[must_use]
    pub const fn range(&self, in_dist: bool) -> SampleRange {
        if in_dist {
            self.ind_range
        } else {
            self.ood_range
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug)]
pub struct SystemConfigBuilder {
    config: SystemConfig,
}

impl SystemConfigBuilder {
    fn new(population: usize) -> Self {
        Self {
            config: SystemConfig::with_population(population),
        }
    }

    /// Override the embedding dimension (must equal the population to validate).
    #[must_use]
    pub const fn embed_dim(mut self, embed_dim: usize) -> Self {
        self.config.embed_dim = embed_dim;
        self
    }

    /// Set the noise standard deviation.
    #[must_use]
    pub const fn noise_scale(mut self, noise_scale: f64) -> Self {
        self.config.noise_scale = noise_scale;
        self
    }

    /// Set the in-distribution range.
    #[must_use]
    pub const fn ind_range(mut self, low: f64, high: f64) -> Self {
        self.config.ind_range = SampleRange::new(low, high);
        self
    }

    /// Set the out-of-distribution range.
    #[must_use]
    pub const fn ood_range(mut self, low: f64, high: f64) -> Self {
        self.config.ood_range = SampleRange::new(low, high);
        self
    }

    /// Set the edge probability.
    #[must_use]
    pub const fn p_edge(mut self, p_edge: f64) -> Self {
        self.config.p_edge = p_edge;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set epidemic rates.
    #[must_use]
    pub const fn model(mut self, model: SeisParams) -> Self {
        self.config.model = model;
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if any constraint is violated.
    pub fn build(self) -> SimResult<SystemConfig> {
        self.config.check()?;
        Ok(self.config)
    }
}

/// Half-open sampling interval `[low, high)`, written as `[low, high]` in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct SampleRange {
    /// Inclusive lower bound.
    pub low: f64,
    /// Exclusive upper bound.
    pub high: f64,
}

impl SampleRange {
    /// Create a range.
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Default in-distribution range; excludes values that start an extinct population.
    #[must_use]
    pub const fn in_distribution() -> Self {
        Self::new(0.0, 0.5)
    }

    /// Default out-of-distribution range, disjoint from [`Self::in_distribution`].
    #[must_use]
    pub const fn out_of_distribution() -> Self {
        Self::new(0.5, 1.0)
    }

    /// Whether `value` lies in `[low, high)`.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.low..self.high).contains(&value)
    }

    fn check(&self, name: &str) -> SimResult<()> {
        if !(self.low.is_finite() && self.high.is_finite()) {
            return Err(SimError::NonFiniteValue {
                location: name.to_string(),
            });
        }
        if self.low > self.high {
            return Err(SimError::config(format!(
                "{name}: low {} exceeds high {}",
                self.low, self.high
            )));
        }
        if self.low < 0.0 || self.high > 1.0 {
            return Err(SimError::config(format!(
                "{name}: [{}, {}) must lie within [0, 1]",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

impl From<(f64, f64)> for SampleRange {
    fn from((low, high): (f64, f64)) -> Self {
        Self::new(low, high)
    }
}

impl From<SampleRange> for (f64, f64) {
    fn from(range: SampleRange) -> Self {
        (range.low, range.high)
    }
}

/// How susceptible nodes are exposed.
///
/// Latency is the same in both modes: an exposed node gains α progress per
/// step and becomes infected on the step after progress reaches 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransmissionMode {
    /// Each infected neighbour transmits independently with probability β.
    #[default]
    Independent,
    /// Any infected neighbour triggers exposure with probability β.
    Triggered,
}

/// SEIS rates. All values are per-step probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SeisParams {
    /// Infection rate (β).
    #[validate(range(min = 0.0, max = 1.0))]
    pub beta: f64,
    /// Infected → susceptible rate (λ).
    #[validate(range(min = 0.0, max = 1.0))]
    pub lambda: f64,
    /// Latent period rate (α), exposed → infected.
    #[validate(range(min = 0.0, max = 1.0))]
    pub alpha: f64,
    /// Share of nodes infected when no initial condition is supplied.
    #[validate(range(min = 0.0, max = 1.0))]
    pub fraction_infected: f64,
    /// Exposure rule.
    #[serde(default)]
    pub transmission: TransmissionMode,
}

impl Default for SeisParams {
    fn default() -> Self {
        Self {
            beta: 0.1,
            lambda: 0.5,
            alpha: 0.05,
            fraction_infected: 0.1,
            transmission: TransmissionMode::Independent,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SystemConfig::with_population(10);

        assert_eq!(config.latent_dim, 10);
        assert_eq!(config.embed_dim, 10);
        assert!((config.noise_scale - 0.01).abs() < f64::EPSILON);
        assert!((config.p_edge - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.ind_range, SampleRange::new(0.0, 0.5));
        assert_eq!(config.ood_range, SampleRange::new(0.5, 1.0));
        assert_eq!(config.seed, None);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_model_defaults() {
        let params = SeisParams::default();

        assert!((params.beta - 0.1).abs() < f64::EPSILON);
        assert!((params.lambda - 0.5).abs() < f64::EPSILON);
        assert!((params.alpha - 0.05).abs() < f64::EPSILON);
        assert!((params.fraction_infected - 0.1).abs() < f64::EPSILON);
        assert_eq!(params.transmission, TransmissionMode::Independent);
    }

    #[test]
    fn test_config_builder() {
        let config = SystemConfig::builder(4)
            .seed(12345)
            .p_edge(0.0)
            .noise_scale(0.5)
            .build();
        assert!(config.is_ok());

        let config = config.ok();
        assert_eq!(config.as_ref().and_then(|c| c.seed), Some(12345));
        assert_eq!(config.as_ref().map(|c| c.p_edge), Some(0.0));
    }

    #[test]
    fn test_builder_rejects_dimension_mismatch() {
        let err = SystemConfig::builder(4).embed_dim(5).build();
        assert!(matches!(
            err,
            Err(SimError::DimensionMismatch {
                latent_dim: 4,
                embed_dim: 5
            })
        ));
    }

    #[test]
    fn test_builder_rejects_bad_edge_probability() {
        assert!(SystemConfig::builder(4).p_edge(1.5).build().is_err());
        assert!(SystemConfig::builder(4).p_edge(-0.1).build().is_err());
    }

    #[test]
    fn test_builder_rejects_inverted_range() {
        assert!(SystemConfig::builder(4).ind_range(0.5, 0.1).build().is_err());
        assert!(SystemConfig::builder(4).ood_range(0.5, 1.5).build().is_err());
    }

    #[test]
    fn test_builder_rejects_negative_noise() {
        assert!(SystemConfig::builder(4).noise_scale(-0.01).build().is_err());
    }

    #[test]
    fn test_config_yaml_parse() {
        let yaml = r"
latent_dim: 8
embed_dim: 8
noise_scale: 0.02
ind_range: [0.0, 0.4]
p_edge: 0.1
seed: 42
model:
  beta: 0.2
  lambda: 0.4
  alpha: 0.1
  fraction_infected: 0.05
  transmission: triggered
";
        let config = SystemConfig::from_yaml(yaml);
        assert!(config.is_ok(), "{config:?}");

        let config = config.ok();
        assert_eq!(config.as_ref().map(|c| c.latent_dim), Some(8));
        assert_eq!(
            config.as_ref().map(|c| c.ind_range),
            Some(SampleRange::new(0.0, 0.4))
        );
        assert_eq!(
            config.as_ref().map(|c| c.ood_range),
            Some(SampleRange::out_of_distribution())
        );
        assert_eq!(
            config.as_ref().map(|c| c.model.transmission),
            Some(TransmissionMode::Triggered)
        );
    }

    #[test]
    fn test_config_yaml_defaults_model() {
        let yaml = r"
latent_dim: 3
embed_dim: 3
";
        let config = SystemConfig::from_yaml(yaml).ok();
        assert_eq!(config.map(|c| c.model), Some(SeisParams::default()));
    }

    #[test]
    fn test_config_yaml_rejects_out_of_range_rate() {
        let yaml = r"
latent_dim: 3
embed_dim: 3
model:
  beta: 1.5
  lambda: 0.5
  alpha: 0.05
  fraction_infected: 0.1
";
        assert!(matches!(
            SystemConfig::from_yaml(yaml),
            Err(SimError::Validation(_))
        ));
    }

    #[test]
    fn test_config_yaml_rejects_unknown_field() {
        let yaml = r"
latent_dim: 3
embed_dim: 3
pEdge: 0.1
";
        assert!(matches!(
            SystemConfig::from_yaml(yaml),
            Err(SimError::YamlParse(_))
        ));
    }

    #[test]
    fn test_config_yaml_roundtrip_preserves_values() {
        let config = SystemConfig::builder(6).seed(9).p_edge(0.3).build().ok();
        let yaml = config.as_ref().and_then(|c| c.to_yaml().ok());
        let parsed = yaml.and_then(|y| SystemConfig::from_yaml(&y).ok());
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().ok();
        if let Some(f) = file.as_mut() {
            let _ = writeln!(f, "latent_dim: 5\nembed_dim: 5\nseed: 1");
        }
        let loaded = file.as_ref().map(|f| SystemConfig::load(f.path()));
        assert!(matches!(loaded, Some(Ok(ref c)) if c.latent_dim == 5 && c.seed == Some(1)));

        assert!(SystemConfig::load("/nonexistent/seisim.yaml").is_err());
    }

    #[test]
    fn test_range_selection() {
        let config = SystemConfig::with_population(2);
        assert!(config.range(true).contains(0.0));
        assert!(!config.range(true).contains(0.5));
        assert!(config.range(false).contains(0.5));
        assert!(!config.range(false).contains(1.0));
    }
}
