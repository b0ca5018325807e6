//! SEIS trajectory generator.
//!
//! [`SeisSystem`] fulfils the [`DynamicalSystem`] contract used by
//! benchmarking harnesses: sample initial conditions, simulate batches of
//! trajectories, and score them.
//!
//! # Example
//!
//! ```rust
//! use seisim::prelude::*;
//!
//! let config = SystemConfig::builder(4).seed(42).p_edge(0.0).build()?;
//! let mut system = SeisSystem::new(config)?;
//!
//! let x0 = system.make_init_conds(1, true);
//! let data = system.make_data(&x0, None, 3, false)?;
//! assert_eq!(data.shape(), &[1, 4, 3]);
//! # Ok::<(), seisim::error::SimError>(())
//! ```

pub mod metrics;
pub mod trajectory;

use ndarray::{Array2, Array3, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{SeisParams, SystemConfig};
use crate::engine::graph::ContactGraph;
use crate::engine::rng::SimRng;
use crate::error::{SimError, SimResult};
use crate::scenarios::SeisModel;

/// Contract of a benchmark data generator.
pub trait DynamicalSystem {
    /// Per-sample initial condition.
    type InitCond;

    /// Dimensionality of the latent state.
    fn latent_dim(&self) -> usize;

    /// Dimensionality of the observations.
    fn embed_dim(&self) -> usize;

    /// Draw `n` initial conditions from the in- or out-of-distribution range.
    fn make_init_conds(&mut self, n: usize, in_dist: bool) -> Vec<Self::InitCond>;

    /// Simulate one trajectory per initial condition.
    ///
    /// Returns a `(samples, embed_dim, timesteps)` tensor. `control`, when
    /// given, has shape `(samples, timesteps, embed_dim)`.
    ///
    /// # Errors
    ///
    /// Returns an error on shape mismatches or simulation failure.
    fn make_data(
        &mut self,
        init_conds: &[Self::InitCond],
        control: Option<&Array3<f64>>,
        timesteps: usize,
        noisy: bool,
    ) -> SimResult<Array3<f64>>;

    /// Scalar error between two trajectory tensors.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensors have different shapes.
    fn calc_error(&self, x: &Array3<f64>, y: &Array3<f64>) -> SimResult<f64>;

    /// Cost of each sample's control signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the control tensor is malformed.
    fn calc_control_cost(&self, control: &Array3<f64>) -> SimResult<Vec<f64>>;
}

/// Initial value per node, indexed by node id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InitialCondition(Vec<f64>);

impl InitialCondition {
    /// Wrap per-node values.
    #[must_use]
    pub const fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Number of nodes covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no node is covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(node, value)` pairs in node order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.0.iter().copied().enumerate()
    }

    /// Values as a slice indexed by node.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for InitialCondition {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

/// Epidemic trajectory generator over Erdős–Rényi contact networks.
///
/// Owns its random stream; every method that draws randomness takes
/// `&mut self`, so one instance cannot be shared across concurrent batches.
/// Graphs and models are built per trajectory and never stored.
#[derive(Debug, Clone)]
pub struct SeisSystem {
    config: SystemConfig,
    rng: SimRng,
}

impl SeisSystem {
    /// Create a generator.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, including
    /// `embed_dim != latent_dim`.
    pub fn new(config: SystemConfig) -> SimResult<Self> {
        config.check()?;
        let rng = SimRng::from_seed_or_entropy(config.seed);
        info!(
            population = config.latent_dim,
            p_edge = config.p_edge,
            noise_scale = config.noise_scale,
            seed = rng.master_seed(),
            "created SEIS system"
        );
        Ok(Self { config, rng })
    }

    /// Default generator for `n` nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if `n == 0`.
    pub fn with_population(n: usize) -> SimResult<Self> {
        Self::new(SystemConfig::with_population(n))
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Epidemic rates shared by every model.
    #[must_use]
    pub const fn params(&self) -> &SeisParams {
        &self.config.model
    }

    /// Master random stream.
    pub fn rng_mut(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    /// Build a fresh graph and model seeded from `x0`.
    ///
    /// # Errors
    ///
    /// Returns an error if `x0` does not cover the population.
    pub fn create_model(&self, x0: &InitialCondition, rng: &mut SimRng) -> SimResult<SeisModel> {
        let n = self.config.latent_dim;
        if x0.len() != n {
            return Err(SimError::LengthMismatch {
                what: "initial condition",
                expected: n,
                found: x0.len(),
            });
        }
        let graph = ContactGraph::erdos_renyi(n, self.config.p_edge, rng)?;
        let mut model = SeisModel::new(graph, self.config.model.clone());
        model.set_initial_status(Some(x0.as_slice()), rng)?;
        debug!(
            edges = model.graph().edge_count(),
            infected = model.counts().infected,
            "built SEIS model"
        );
        Ok(model)
    }

    /// Raw `(timesteps, nodes)` trajectory from `x0`, without noise or control.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be built or run.
    pub fn simulate(
        &self,
        x0: &InitialCondition,
        timesteps: usize,
        rng: &mut SimRng,
    ) -> SimResult<Array2<f64>> {
        let mut model = self.create_model(x0, rng)?;
        trajectory::run_trajectory(&mut model, timesteps, x0.as_slice(), rng)
    }

    fn check_control(&self, control: &Array3<f64>, samples: usize, timesteps: usize) -> SimResult<()> {
        let found = control.len_of(Axis(0));
        if found != samples {
            return Err(SimError::LengthMismatch {
                what: "control",
                expected: samples,
                found,
            });
        }
        let expected = [samples, timesteps, self.config.latent_dim];
        if control.shape() != &expected[..] {
            return Err(SimError::shape(&expected, control.shape()));
        }
        Ok(())
    }
}

impl DynamicalSystem for SeisSystem {
    type InitCond = InitialCondition;

    fn latent_dim(&self) -> usize {
        self.config.latent_dim
    }

    fn embed_dim(&self) -> usize {
        self.config.embed_dim
    }

    fn make_init_conds(&mut self, n: usize, in_dist: bool) -> Vec<InitialCondition> {
        let range = self.config.range(in_dist);
        let mut conds = Vec::with_capacity(n);
        for _ in 0..n {
            let mut values = Vec::with_capacity(self.config.latent_dim);
            for _ in 0..self.config.latent_dim {
                values.push(self.rng.gen_range_f64(range.low, range.high));
            }
            conds.push(InitialCondition::new(values));
        }
        conds
    }

    fn make_data(
        &mut self,
        init_conds: &[InitialCondition],
        control: Option<&Array3<f64>>,
        timesteps: usize,
        noisy: bool,
    ) -> SimResult<Array3<f64>> {
        let n = self.config.latent_dim;
        let samples = init_conds.len();
        if let Some(u) = control {
            self.check_control(u, samples, timesteps)?;
        }

        debug!(
            samples,
            timesteps,
            noisy,
            controlled = control.is_some(),
            "generating SEIS batch"
        );

        let mut streams = self.rng.partition(samples);
        let noise = if noisy {
            let scale = self.config.noise_scale;
            let rng = &mut self.rng;
            Some(Array2::from_shape_fn((timesteps, n), |_| rng.gen_normal(0.0, scale)))
        } else {
            None
        };

        let mut data = Array3::<f64>::zeros((samples, timesteps, n));
        for (i, (x0, rng)) in init_conds.iter().zip(streams.iter_mut()).enumerate() {
            let mut sol = self.simulate(x0, timesteps, rng)?;
            if let Some(noise) = &noise {
                sol += noise;
            }
            if let Some(u) = control {
                sol += &u.index_axis(Axis(0), i);
            }
            data.index_axis_mut(Axis(0), i).assign(&sol);
        }

        Ok(data.permuted_axes([0, 2, 1]).as_standard_layout().into_owned())
    }

    fn calc_error(&self, x: &Array3<f64>, y: &Array3<f64>) -> SimResult<f64> {
        metrics::mean_squared_error(x, y, self.config.latent_dim)
    }

    fn calc_control_cost(&self, control: &Array3<f64>) -> SimResult<Vec<f64>> {
        if !control.iter().all(|v| v.is_finite()) {
            return Err(SimError::NonFiniteValue {
                location: "control".to_string(),
            });
        }
        Ok(metrics::control_cost(control))
    }
}
