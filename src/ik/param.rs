//! Joint-angle parameters and their cost model.

use rand::Rng;

use super::IkError;
use crate::scene::{Scene, SceneError, node::NodeKind};

/// A tunable joint angle: the joint's qualified path, the rest angle it had
/// when collected, and the current candidate value.
#[derive(Debug, Clone, PartialEq)]
pub struct JointParam {
    joint_path: String,
    rest_angle: f64,
    angle: f64,
}

impl JointParam {
    #[must_use]
    pub fn new(joint_path: impl Into<String>, rest_angle: f64) -> Self {
        Self {
            joint_path: joint_path.into(),
            rest_angle,
            angle: rest_angle,
        }
    }

    #[must_use]
    pub fn joint_path(&self) -> &str {
        &self.joint_path
    }

    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    #[must_use]
    pub fn rest_angle(&self) -> f64 {
        self.rest_angle
    }

    /// Displacement cost: how far the candidate angle has wandered from
    /// rest. Used as the effort term of the search objective.
    #[must_use]
    pub fn cost(&self) -> f64 {
        (self.angle - self.rest_angle).abs()
    }

    /// Three-way symmetric random walk: with probability 1/3 each, leave the
    /// angle unchanged, add `step`, or subtract `step`.
    ///
    /// The explicit no-op arm damps the walk compared to a plain ±step coin
    /// flip and is kept deliberately.
    pub fn perturb(&mut self, step: f64, rng: &mut impl Rng) {
        match rng.random_range(0..3u8) {
            1 => self.angle += step,
            2 => self.angle -= step,
            _ => {}
        }
    }

    /// Write the candidate angle onto the named joint of `scene`.
    pub fn commit(&self, scene: &mut Scene) -> Result<(), SceneError> {
        scene.set_joint_angle(&self.joint_path, self.angle)
    }

    /// Write the rest angle back onto the named joint of `scene`.
    pub fn reset(&self, scene: &mut Scene) -> Result<(), SceneError> {
        scene.set_joint_angle(&self.joint_path, self.rest_angle)
    }
}

/// Build one parameter per rotation joint named in `joint_paths`, taking the
/// joint's current angle as the rest value.
///
/// With `None`, every rotation joint in the scene contributes a parameter.
/// Caller beware: unconstrained collection can pick up joints that do not
/// affect the objective at all, and those will wander randomly during a
/// search.
pub fn collect_parameters(
    scene: &Scene,
    joint_paths: Option<&[String]>,
) -> Result<Vec<JointParam>, IkError> {
    match joint_paths {
        Some(paths) => {
            let mut params = Vec::with_capacity(paths.len());
            for path in paths {
                let angle = scene.joint_angle(path)?;
                params.push(JointParam::new(path.clone(), angle));
            }
            Ok(params)
        }
        None => {
            let mut params = Vec::new();
            scene.for_each_postorder(|id, path| {
                if let Some(node) = scene.node(id)
                    && let NodeKind::RotationJoint { angle } = *node.kind()
                {
                    params.push(JointParam::new(path, angle));
                }
            });
            Ok(params)
        }
    }
}
