//! Beam-search solver for terminal poses.
//!
//! The search is deliberately simple: no gradients, no trajectory, just a
//! stochastic local search over joint-angle sets scored by effort plus
//! distance-to-target. It clones the scene into disposable scratch state, so
//! repeated forward-kinematics evaluation never touches the live graph until
//! an explicit commit at the end. Convergence is not guaranteed; results are
//! reproducible only for a fixed random sequence.

use std::collections::BTreeSet;

use rand::Rng;

use super::IkError;
use super::param::{JointParam, collect_parameters};
use crate::geom::Point3;
use crate::scene::node::NodeId;
use crate::scene::{Scene, SceneError};

/// Tuning knobs for [`IkSolver::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Candidate parameter sets retained between iterations.
    pub beam_size: usize,
    /// New candidates generated per iteration.
    pub branching: usize,
    /// Hard iteration bound.
    pub max_iterations: usize,
    /// Perturbation step in radians.
    pub step: f64,
    /// Stop once the best candidate's distance to the target drops to this.
    pub early_stop: Option<f64>,
    /// Write the winning angles back onto the live scene.
    pub commit: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            beam_size: 10,
            branching: 10,
            max_iterations: 50,
            step: 0.1,
            early_stop: Some(2.0),
            commit: false,
        }
    }
}

/// Result of a search, with per-iteration diagnostics.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The best-ranked parameter set.
    pub parameters: Vec<JointParam>,
    /// Final combined score (effort-weighted cost plus distance) of the
    /// winner.
    pub score: f64,
    /// Final distance from the effector's connection point to the target.
    pub distance: f64,
    /// Iterations actually run.
    pub iterations: usize,
    /// Best pool score after each iteration; non-increasing because the
    /// previous beam is always part of the next pool.
    pub score_history: Vec<f64>,
}

/// A posing problem: which point of the body should approach which target,
/// moving which joints.
#[derive(Debug, Clone)]
pub struct IkSolver {
    effector_path: String,
    connection_point: String,
    target_path: String,
    joint_paths: Option<Vec<String>>,
}

impl IkSolver {
    /// `effector_path` names the bone whose connection point
    /// `connection_point` should approach the target at `target_path`.
    /// Without [`with_joints`](Self::with_joints), every rotation joint in
    /// the scene is optimized.
    #[must_use]
    pub fn new(
        effector_path: impl Into<String>,
        connection_point: impl Into<String>,
        target_path: impl Into<String>,
    ) -> Self {
        Self {
            effector_path: effector_path.into(),
            connection_point: connection_point.into(),
            target_path: target_path.into(),
            joint_paths: None,
        }
    }

    /// Restrict the search to an explicit set of joints.
    #[must_use]
    pub fn with_joints(mut self, joint_paths: Vec<String>) -> Self {
        self.joint_paths = Some(joint_paths);
        self
    }

    /// Run the beam search against `scene`.
    ///
    /// The scene itself is only written to when `options.commit` is set, and
    /// then only with the winning joint angles. Callers that want
    /// reproducible results seed `rng` themselves.
    pub fn search(
        &self,
        scene: &mut Scene,
        options: &SearchOptions,
        rng: &mut impl Rng,
    ) -> Result<SearchOutcome, IkError> {
        let mut scratch = self.build_scratch(scene)?;
        let target_position = scratch.target_position(&self.target_path)?;
        let effector = scratch.get(&self.effector_path)?;

        let start = collect_parameters(&scratch, self.joint_paths.as_deref())?;
        if start.is_empty() {
            return Err(IkError::NoParameters);
        }

        let mut beam: Vec<Vec<JointParam>> = vec![start; options.beam_size.max(1)];
        let mut gamma = 1.0;
        let mut step_mult = 1.0;
        let mut iterations = 0;
        let mut history = Vec::new();

        loop {
            // grow the pool with perturbed clones of random beam members
            let mut pool = beam;
            let beam_len = pool.len();
            for _ in 0..options.branching {
                let pick = rng.random_range(0..beam_len);
                let mut candidate = pool[pick].clone();
                for param in &mut candidate {
                    param.perturb(options.step * step_mult, rng);
                }
                pool.push(candidate);
            }

            let mut scored = Vec::with_capacity(pool.len());
            for candidate in pool {
                let effort: f64 = candidate.iter().map(JointParam::cost).sum();
                let distance = self.heuristic(&candidate, &mut scratch, effector, target_position)?;
                scored.push((effort, distance, candidate));
            }
            // stable sort keeps ranking deterministic for a fixed random
            // sequence
            scored.sort_by(|a, b| {
                (gamma * a.0 + a.1).total_cmp(&(gamma * b.0 + b.1))
            });
            scored.truncate(options.beam_size.max(1));

            iterations += 1;
            let (best_effort, best_distance) = (scored[0].0, scored[0].1);
            history.push(gamma * best_effort + best_distance);
            log::trace!(
                "ik iteration {iterations}: best score {:.4}, distance {:.4}",
                gamma * best_effort + best_distance,
                best_distance
            );

            let early = options
                .early_stop
                .is_some_and(|threshold| best_distance <= threshold);
            if iterations >= options.max_iterations || early {
                let score = gamma * best_effort + best_distance;
                log::debug!(
                    "ik search finished after {iterations} iterations: \
                     score {score:.4}, distance {best_distance:.4}"
                );

                let parameters = scored.swap_remove(0).2;
                if options.commit {
                    for param in &parameters {
                        param.commit(scene)?;
                    }
                }
                return Ok(SearchOutcome {
                    parameters,
                    score,
                    distance: best_distance,
                    iterations,
                    score_history: history,
                });
            }

            // anneal: switch from a coarse effort/goal trade-off to fine
            // goal-seeking steps for the second half of the budget
            if iterations * 2 >= options.max_iterations {
                gamma = 0.1;
                step_mult = 0.2;
            }

            beam = scored.into_iter().map(|(_, _, candidate)| candidate).collect();
        }
    }

    /// Clone the live scene into scratch state: geometry stripped, then
    /// pruned down to the optimized joints plus the target.
    fn build_scratch(&self, scene: &Scene) -> Result<Scene, IkError> {
        let mut scratch = scene.clone();
        scratch.strip_shapes();

        if let Some(paths) = &self.joint_paths {
            let mut keep: BTreeSet<String> = paths.iter().cloned().collect();
            keep.insert(self.target_path.clone());
            scratch.prune_except(&keep);
        } else {
            let all = collect_parameters(&scratch, None)?;
            let mut keep: BTreeSet<String> = all
                .iter()
                .map(|param| param.joint_path().to_owned())
                .collect();
            keep.insert(self.target_path.clone());
            scratch.prune_except(&keep);
        }
        Ok(scratch)
    }

    /// Goal distance of one candidate: commit it onto the scratch scene,
    /// evaluate forward kinematics and measure how far the effector's
    /// connection point ended up from the target.
    fn heuristic(
        &self,
        candidate: &[JointParam],
        scratch: &mut Scene,
        effector: NodeId,
        target_position: Point3,
    ) -> Result<f64, IkError> {
        for param in candidate {
            param.commit(scratch)?;
        }
        scratch.evaluate();
        let reached = scratch
            .connection_point_position(effector, &self.connection_point)
            .ok_or_else(|| SceneError::UnknownConnectionPoint {
                bone: self.effector_path.clone(),
                name: self.connection_point.clone(),
            })?;
        Ok(target_position.distance_to(reached))
    }
}
