//! Inverse kinematics: a stochastic beam search over joint-angle parameters.

mod param;
mod solver;

use thiserror::Error;

use crate::scene::SceneError;

pub use param::{JointParam, collect_parameters};
pub use solver::{IkSolver, SearchOptions, SearchOutcome};

/// Errors surfaced by parameter collection and the search.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IkError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    /// The search was given no joints to optimize.
    #[error("no joint parameters to optimize")]
    NoParameters,
}
