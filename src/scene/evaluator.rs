//! Bottom-up forward-kinematics evaluation.
//!
//! `evaluate` resets every working point set to its base set and then walks
//! the tree children-before-self. A node's pose step therefore runs while its
//! own origin/axis/anchor points are still expressed in the local frame, and
//! an ancestor's later step carries the whole already-posed subtree rigidly
//! into place. Because transforms mutate coordinates directly there is no
//! matrix stack to unwind, and this ordering is what makes the result correct
//! world-space forward kinematics.

use super::Scene;
use super::node::{NodeId, NodeKind, SET_AXIS, SET_ORIGIN, connection_key};
use crate::geom::PointTransform;

impl Scene {
    /// Recompute every working point set from the base sets and the current
    /// joint angles. Idempotent until the next mutation.
    pub fn evaluate(&mut self) {
        for node in self.nodes_mut() {
            node.working = node.base.clone();
        }
        self.pose(self.root());
    }

    fn pose(&mut self, id: NodeId) {
        let children = self.nodes()[id.0].children().to_vec();
        for &child in &children {
            self.pose(child);
        }

        match &self.nodes()[id.0].kind {
            NodeKind::RotationJoint { angle } => {
                let node = &self.nodes()[id.0];
                let (Some(origin), Some(axis)) =
                    (node.working_single(SET_ORIGIN), node.working_single(SET_AXIS))
                else {
                    return;
                };
                let transform = PointTransform::Rotate {
                    axis: axis.to_vec3(),
                    angle: *angle,
                    origin,
                };
                for &child in &children {
                    self.transform_subtree(child, &transform);
                }
            }
            NodeKind::Bone { connections } => {
                let connections = connections.clone();
                for (point_name, attached) in connections {
                    let Some(anchor) =
                        self.nodes()[id.0].working_single(&connection_key(&point_name))
                    else {
                        continue;
                    };
                    let transform = PointTransform::Translate(anchor.to_vec3());
                    for name in attached {
                        // attached names may no longer resolve after pruning
                        let child = children
                            .iter()
                            .copied()
                            .find(|&c| self.nodes()[c.0].name() == name);
                        if let Some(child) = child {
                            self.transform_subtree(child, &transform);
                        }
                    }
                }
            }
            NodeKind::Group | NodeKind::Target | NodeKind::Shape { .. } => {}
        }
    }

    /// Apply a transform to every working point set of `id` and all of its
    /// descendants.
    pub fn transform_subtree(&mut self, id: NodeId, transform: &PointTransform) {
        let mut stack = vec![id];
        while let Some(at) = stack.pop() {
            let node = self.node_mut(at);
            for set in node.working.values_mut() {
                transform.apply(set);
            }
            stack.extend(node.children.iter().copied());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::super::Scene;
    use super::super::node::Node;
    use crate::geom::{Point3, Vec3};

    const EPS: f64 = 1e-9;

    fn assert_close(p: Point3, expected: Point3) {
        assert!(
            p.distance_to(expected) < EPS,
            "expected {expected:?}, got {p:?}"
        );
    }

    /// A bone holding one connection point, a joint above it, and a second
    /// bone attached at the joint's anchor.
    fn arm_scene(angle: f64) -> Scene {
        let mut scene = Scene::new();
        let joint = scene
            .add_child(
                scene.root(),
                Node::rotation_joint("shoulder", Point3::ORIGIN, Vec3::Z, angle),
            )
            .unwrap();
        scene
            .add_child(
                joint,
                Node::bone("upper").with_connection_point("tip", Point3::new(0.0, 100.0, 0.0)),
            )
            .unwrap();
        scene
    }

    #[test]
    fn identity_pose_reproduces_base_points() {
        let mut scene = arm_scene(0.0);
        scene.evaluate();
        let upper = scene.get("shoulder.upper").unwrap();
        assert_close(
            scene.connection_point_position(upper, "tip").unwrap(),
            Point3::new(0.0, 100.0, 0.0),
        );
    }

    #[test]
    fn joint_rotates_its_descendants_counter_clockwise() {
        let mut scene = arm_scene(FRAC_PI_2);
        scene.evaluate();
        let upper = scene.get("shoulder.upper").unwrap();
        assert_close(
            scene.connection_point_position(upper, "tip").unwrap(),
            Point3::new(-100.0, 0.0, 0.0),
        );
        // the joint's own origin is not touched by its own step
        let joint = scene.get("shoulder").unwrap();
        assert_close(scene.marker_position(joint).unwrap(), Point3::ORIGIN);
    }

    #[test]
    fn evaluate_is_idempotent() {
        let mut scene = arm_scene(0.7);
        scene.evaluate();
        let upper = scene.get("shoulder.upper").unwrap();
        let first = scene.connection_point_position(upper, "tip").unwrap();
        scene.evaluate();
        assert_close(scene.connection_point_position(upper, "tip").unwrap(), first);
    }

    #[test]
    fn bone_translates_subtrees_attached_at_its_anchor() {
        let mut scene = Scene::new();
        let body = scene
            .add_child(
                scene.root(),
                Node::bone("body").with_connection_point("arm", Point3::new(10.0, 0.0, 0.0)),
            )
            .unwrap();
        scene
            .attach(
                body,
                Node::bone("upper").with_connection_point("tip", Point3::new(0.0, 5.0, 0.0)),
                "arm",
            )
            .unwrap();
        scene.evaluate();

        let upper = scene.get("body.upper").unwrap();
        assert_close(
            scene.connection_point_position(upper, "tip").unwrap(),
            Point3::new(10.0, 5.0, 0.0),
        );
    }

    #[test]
    fn ancestor_bone_carries_an_already_rotated_subtree() {
        let mut scene = Scene::new();
        let body = scene
            .add_child(
                scene.root(),
                Node::bone("body").with_connection_point("arm", Point3::new(10.0, 0.0, 0.0)),
            )
            .unwrap();
        let joint = scene
            .attach(
                body,
                Node::rotation_joint("shoulder", Point3::ORIGIN, Vec3::Z, FRAC_PI_2),
                "arm",
            )
            .unwrap();
        scene
            .add_child(
                joint,
                Node::bone("upper").with_connection_point("tip", Point3::new(0.0, 5.0, 0.0)),
            )
            .unwrap();
        scene.evaluate();

        // rotation first in the local frame: (0,5,0) -> (-5,0,0),
        // then the bone translation by (10,0,0)
        let upper = scene.get("body.shoulder.upper").unwrap();
        assert_close(
            scene.connection_point_position(upper, "tip").unwrap(),
            Point3::new(5.0, 0.0, 0.0),
        );
        // the joint's origin rides along with the translation
        assert_close(
            scene.marker_position(joint).unwrap(),
            Point3::new(10.0, 0.0, 0.0),
        );
    }

    #[test]
    fn directly_chained_joints_compose_like_analytic_rotations() {
        let mut scene = Scene::new();
        let outer = scene
            .add_child(
                scene.root(),
                Node::rotation_joint("outer", Point3::ORIGIN, Vec3::Z, FRAC_PI_2),
            )
            .unwrap();
        let inner = scene
            .add_child(
                outer,
                Node::rotation_joint("inner", Point3::ORIGIN, Vec3::Z, FRAC_PI_2),
            )
            .unwrap();
        scene
            .add_child(
                inner,
                Node::bone("seg").with_connection_point("tip", Point3::new(1.0, 0.0, 0.0)),
            )
            .unwrap();
        scene.evaluate();

        // two quarter turns about the same axis: (1,0,0) -> (-1,0,0)
        let seg = scene.get("outer.inner.seg").unwrap();
        assert_close(
            scene.connection_point_position(seg, "tip").unwrap(),
            Point3::new(-1.0, 0.0, 0.0),
        );
    }
}
