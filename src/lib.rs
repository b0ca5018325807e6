//! # seisim
//!
//! Synthetic epidemic trajectories for dynamical-systems benchmarks.
//!
//! A SEIS (Susceptible-Exposed-Infected-Susceptible) process runs on a fresh
//! Erdős–Rényi contact network per sample. The generator returns per-node
//! status trajectories, optionally perturbed by Gaussian noise and control
//! signals, and scores them with a normalized squared error and a
//! spectral-norm control cost.
//!
//! - Deterministic: one master seed drives graphs, initial conditions,
//!   engine events and noise
//! - Explicit state: graphs and models are values, never hidden fields
//! - Fallible: shape and length preconditions surface as [`SimError`]
//!
//! ## Example
//!
//! ```rust
//! use seisim::prelude::*;
//!
//! let config = SystemConfig::builder(10).seed(42).build()?;
//! let mut system = SeisSystem::new(config)?;
//!
//! let x0 = system.make_init_conds(2, true);
//! let data = system.make_data(&x0, None, 20, true)?;
//! assert_eq!(data.shape(), &[2, 10, 20]);
//! # Ok::<(), SimError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
    clippy::needless_range_loop,   // Indexed loops mirror node ids
)]

pub mod config;
pub mod engine;
pub mod error;
pub mod scenarios;
pub mod system;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{
        SampleRange, SeisParams, SystemConfig, SystemConfigBuilder, TransmissionMode,
    };
    pub use crate::engine::graph::ContactGraph;
    pub use crate::engine::rng::SimRng;
    pub use crate::error::{SimError, SimResult};
    pub use crate::scenarios::{EpidemicProcess, NodeStatus, SeisModel, StatusReport};
    pub use crate::system::{DynamicalSystem, InitialCondition, SeisSystem};
}

/// Re-export for public API
pub use error::{SimError, SimResult};
