//! Discrete-time SEIS process on a contact network.
//!
//! Every node carries one of three statuses. Each step updates all nodes
//! synchronously from the previous snapshot:
//!
//! - Susceptible → Exposed through infected neighbours (rate β)
//! - Exposed → Infected once latent progress, α per step, reaches 1
//! - Infected → Susceptible on recovery without immunity (rate λ)
//!
//! Reports are sparse: iteration 0 lists every node, later iterations list
//! only nodes whose status changed during that step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::{SeisParams, TransmissionMode};
use crate::engine::graph::ContactGraph;
use crate::engine::rng::SimRng;
use crate::error::{SimError, SimResult};

/// Compartment of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeStatus {
    /// Can be exposed by infected neighbours.
    Susceptible,
    /// Infectious.
    Infected,
    /// Carrying the pathogen but not yet infectious.
    Exposed,
}

impl NodeStatus {
    /// Numeric code reported in trajectories: S = 0, I = 1, E = 2.
    #[must_use]
    pub const fn code(self) -> f64 {
        match self {
            Self::Susceptible => 0.0,
            Self::Infected => 1.0,
            Self::Exposed => 2.0,
        }
    }
}

/// Number of nodes per compartment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompartmentCounts {
    /// Susceptible nodes.
    pub susceptible: usize,
    /// Exposed nodes.
    pub exposed: usize,
    /// Infected nodes.
    pub infected: usize,
}

impl CompartmentCounts {
    fn tally(status: &[NodeStatus]) -> Self {
        status.iter().fold(Self::default(), |mut acc, s| {
            match s {
                NodeStatus::Susceptible => acc.susceptible += 1,
                NodeStatus::Exposed => acc.exposed += 1,
                NodeStatus::Infected => acc.infected += 1,
            }
            acc
        })
    }

    /// Total population.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.susceptible + self.exposed + self.infected
    }
}

/// Signed change in compartment sizes over one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompartmentDelta {
    /// Change in susceptible nodes.
    pub susceptible: i64,
    /// Change in exposed nodes.
    pub exposed: i64,
    /// Change in infected nodes.
    pub infected: i64,
}

impl CompartmentDelta {
    #[allow(clippy::cast_possible_wrap)]
    fn between(before: CompartmentCounts, after: CompartmentCounts) -> Self {
        Self {
            susceptible: after.susceptible as i64 - before.susceptible as i64,
            exposed: after.exposed as i64 - before.exposed as i64,
            infected: after.infected as i64 - before.infected as i64,
        }
    }
}

/// Output of one engine iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Iteration index, starting at 0.
    pub iteration: usize,
    /// Node → status code, for reported nodes only.
    pub status: BTreeMap<usize, f64>,
    /// Compartment sizes after the iteration.
    pub node_count: CompartmentCounts,
    /// Change in compartment sizes during the iteration.
    pub status_delta: CompartmentDelta,
}

/// Step-driven epidemic process producing sparse status reports.
pub trait EpidemicProcess {
    /// Number of nodes the process simulates.
    fn node_count(&self) -> usize;

    /// Run `steps` iterations and collect one report per iteration.
    ///
    /// # Errors
    ///
    /// Returns an error if the process reaches an invalid state.
    fn iteration_bunch(&mut self, steps: usize, rng: &mut SimRng) -> SimResult<Vec<StatusReport>>;
}

/// SEIS model bound to one contact graph.
#[derive(Debug, Clone)]
pub struct SeisModel {
    graph: ContactGraph,
    params: SeisParams,
    status: Vec<NodeStatus>,
    /// Latent progress of exposed nodes; starts at 0 and gains α per step.
    progress: BTreeMap<usize, f64>,
    iteration: usize,
}

impl SeisModel {
    /// Bind a model to `graph`. All nodes start susceptible.
    #[must_use]
    pub fn new(graph: ContactGraph, params: SeisParams) -> Self {
        let n = graph.node_count();
        Self {
            graph,
            params,
            status: vec![NodeStatus::Susceptible; n],
            progress: BTreeMap::new(),
            iteration: 0,
        }
    }

    /// Set the starting state and rewind to iteration 0.
    ///
    /// With `Some(x0)`, node `i` starts infected with probability `x0[i]`.
    /// With `None`, exactly `round(fraction_infected * n)` uniformly chosen
    /// nodes start infected.
    ///
    /// # Errors
    ///
    /// Returns an error if `x0` does not cover every node.
    pub fn set_initial_status(&mut self, x0: Option<&[f64]>, rng: &mut SimRng) -> SimResult<()> {
        let n = self.graph.node_count();
        self.status = vec![NodeStatus::Susceptible; n];
        self.progress.clear();
        self.iteration = 0;

        match x0 {
            Some(values) => {
                if values.len() != n {
                    return Err(SimError::LengthMismatch {
                        what: "initial condition",
                        expected: n,
                        found: values.len(),
                    });
                }
                for (status, &p) in self.status.iter_mut().zip(values) {
                    if rng.gen_bool(p) {
                        *status = NodeStatus::Infected;
                    }
                }
            }
            None => {
                let amount = (self.params.fraction_infected * n as f64).round() as usize;
                for node in rng.sample_indices(n, amount) {
                    self.status[node] = NodeStatus::Infected;
                }
            }
        }
        Ok(())
    }

    /// Advance one step and report.
    pub fn iteration(&mut self, rng: &mut SimRng) -> StatusReport {
        let before = CompartmentCounts::tally(&self.status);

        if self.iteration == 0 {
            self.iteration = 1;
            return StatusReport {
                iteration: 0,
                status: self
                    .status
                    .iter()
                    .enumerate()
                    .map(|(node, s)| (node, s.code()))
                    .collect(),
                node_count: before,
                status_delta: CompartmentDelta::default(),
            };
        }

        let next: Vec<NodeStatus> = (0..self.status.len())
            .map(|u| self.transition(u, rng))
            .collect();

        let changed: BTreeMap<usize, f64> = self
            .status
            .iter()
            .zip(&next)
            .enumerate()
            .filter(|(_, (old, new))| old != new)
            .map(|(node, (_, new))| (node, new.code()))
            .collect();

        self.status = next;
        let after = CompartmentCounts::tally(&self.status);
        let iteration = self.iteration;
        self.iteration += 1;

        trace!(
            iteration,
            changed = changed.len(),
            infected = after.infected,
            exposed = after.exposed,
            "SEIS iteration"
        );

        StatusReport {
            iteration,
            status: changed,
            node_count: after,
            status_delta: CompartmentDelta::between(before, after),
        }
    }

    // Next status of `u`, read from the pre-step snapshot.
    fn transition(&mut self, u: usize, rng: &mut SimRng) -> NodeStatus {
        let eventp = rng.gen_f64();
        let beta = self.params.beta;
        let alpha = self.params.alpha;

        match self.status[u] {
            NodeStatus::Susceptible => {
                let infected = self
                    .graph
                    .neighbors(u)
                    .filter(|&v| self.status[v] == NodeStatus::Infected)
                    .count();
                if infected == 0 {
                    return NodeStatus::Susceptible;
                }
                let exposure = match self.params.transmission {
                    TransmissionMode::Independent => {
                        1.0 - (1.0 - beta).powi(i32::try_from(infected).unwrap_or(i32::MAX))
                    }
                    TransmissionMode::Triggered => beta,
                };
                if eventp < exposure {
                    NodeStatus::Exposed
                } else {
                    NodeStatus::Susceptible
                }
            }
            NodeStatus::Exposed => {
                let progress = self.progress.entry(u).or_insert(0.0);
                if *progress < 1.0 {
                    *progress += alpha;
                    NodeStatus::Exposed
                } else {
                    self.progress.remove(&u);
                    NodeStatus::Infected
                }
            }
            NodeStatus::Infected => {
                if eventp < self.params.lambda {
                    NodeStatus::Susceptible
                } else {
                    NodeStatus::Infected
                }
            }
        }
    }

    /// Current status of every node.
    #[must_use]
    pub fn status(&self) -> &[NodeStatus] {
        &self.status
    }

    /// Current compartment sizes.
    #[must_use]
    pub fn counts(&self) -> CompartmentCounts {
        CompartmentCounts::tally(&self.status)
    }

    /// The contact graph.
    #[must_use]
    pub const fn graph(&self) -> &ContactGraph {
        &self.graph
    }

    /// Model parameters.
    #[must_use]
    pub const fn params(&self) -> &SeisParams {
        &self.params
    }

    /// Index of the next iteration.
    #[must_use]
    pub const fn current_iteration(&self) -> usize {
        self.iteration
    }
}

impl EpidemicProcess for SeisModel {
    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn iteration_bunch(&mut self, steps: usize, rng: &mut SimRng) -> SimResult<Vec<StatusReport>> {
        Ok((0..steps).map(|_| self.iteration(rng)).collect())
    }
}
