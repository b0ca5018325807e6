//! Error types for seisim.
//!
//! All fallible operations return `Result<T, SimError>` instead of panicking.
//! Shape and length preconditions on tensors are reported as errors rather
//! than surfacing as index panics deep inside a batch.

use thiserror::Error;

/// Result type alias for seisim operations.
pub type SimResult<T> = Result<T, SimError>;

/// Unified error type for all seisim operations.
#[derive(Debug, Error)]
pub enum SimError {
    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Embedding and latent dimensionality differ.
    #[error("Dimension mismatch: embed_dim {embed_dim} != latent_dim {latent_dim}")]
    DimensionMismatch {
        /// Population size.
        latent_dim: usize,
        /// Observed dimensionality.
        embed_dim: usize,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== Tensor Errors =====
    /// Two sequences that must be paired have different lengths.
    #[error("Length mismatch for {what}: expected {expected}, found {found}")]
    LengthMismatch {
        /// What was being paired.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        found: usize,
    },

    /// Array shapes are incompatible.
    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        found: Vec<usize>,
    },

    /// Numerical instability detected (NaN or Inf).
    #[error("non-finite value detected at {location}")]
    NonFiniteValue {
        /// Location where the non-finite value was detected.
        location: String,
    },

    // ===== Domain Errors =====
    /// The epidemic engine produced an inconsistent report.
    #[error("Engine error: {0}")]
    Engine(String),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an engine error.
    #[must_use]
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine(message.into())
    }

    /// Create a shape mismatch error from two array shapes.
    #[must_use]
    pub fn shape(expected: &[usize], found: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }
}
