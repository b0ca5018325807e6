//! Dense trajectories from sparse engine reports.

use ndarray::Array2;
use tracing::trace;

use crate::engine::rng::SimRng;
use crate::error::{SimError, SimResult};
use crate::scenarios::{EpidemicProcess, StatusReport};

/// Expand sparse reports into a `(reports.len(), initial.len())` matrix.
///
/// Row `t` holds every node's value at step `t`. A node missing from report
/// `t` keeps its value from row `t - 1`; before the first row the carried
/// values are `initial`, so a node the engine never reports stays at its
/// initial-condition value.
///
/// # Errors
///
/// Returns an error if a report names a node outside `0..initial.len()`.
pub fn densify(reports: &[StatusReport], initial: &[f64]) -> SimResult<Array2<f64>> {
    let n = initial.len();
    let mut carry = initial.to_vec();
    let mut out = Array2::zeros((reports.len(), n));

    for (t, report) in reports.iter().enumerate() {
        if let Some((&node, _)) = report.status.range(n..).next() {
            return Err(SimError::engine(format!(
                "iteration {} reports node {node} but the population has {n} nodes",
                report.iteration
            )));
        }
        for idx in 0..n {
            if let Some(&value) = report.status.get(&idx) {
                carry[idx] = value;
            }
            out[[t, idx]] = carry[idx];
        }
    }
    Ok(out)
}

/// Drive `process` for `steps` iterations and densify its reports.
///
/// # Errors
///
/// Returns an error if the process fails, returns the wrong number of
/// reports, or reports unknown nodes.
pub fn run_trajectory<P>(
    process: &mut P,
    steps: usize,
    initial: &[f64],
    rng: &mut SimRng,
) -> SimResult<Array2<f64>>
where
    P: EpidemicProcess + ?Sized,
{
    if process.node_count() != initial.len() {
        return Err(SimError::LengthMismatch {
            what: "initial condition",
            expected: process.node_count(),
            found: initial.len(),
        });
    }

    let reports = process.iteration_bunch(steps, rng)?;
    if reports.len() != steps {
        return Err(SimError::engine(format!(
            "requested {steps} iterations, engine returned {}",
            reports.len()
        )));
    }
    trace!(steps, nodes = initial.len(), "densifying trajectory");
    densify(&reports, initial)
}
