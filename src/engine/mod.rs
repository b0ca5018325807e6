//! Simulation primitives shared by every trajectory.
//!
//! - Deterministic RNG (PCG with partitioned seeds)
//! - Random contact networks

pub mod graph;
pub mod rng;

pub use graph::ContactGraph;
pub use rng::SimRng;
