//! Epidemic processes driven by the trajectory generator.
//!
//! - SEIS (Susceptible-Exposed-Infected-Susceptible) on a contact network

pub mod seis;

pub use seis::{
    CompartmentCounts, CompartmentDelta, EpidemicProcess, NodeStatus, SeisModel, StatusReport,
};
