//! Structural reduction of a scene into a cheaper kinematic skeleton.
//!
//! Both operations rebuild the node arena, so they invalidate outstanding
//! [`NodeId`]s. They are meant for disposable scratch clones, not for the
//! live scene.

use std::collections::BTreeSet;

use super::Scene;
use super::node::NodeId;

impl Scene {
    /// Remove every shape subtree, leaving the pure kinematic skeleton.
    pub fn strip_shapes(&mut self) {
        // shapes only have shape children, so marking by kind removes whole
        // subtrees
        let keep: Vec<bool> = self.nodes().iter().map(|node| !node.is_shape()).collect();
        self.rebuild(&keep);
    }

    /// Remove every subtree that contains no node whose qualified name is in
    /// `keep_names`. A node named in the keep-set is retained together with
    /// its entire subtree; ancestors of kept nodes are retained so that every
    /// path from the root stays intact.
    ///
    /// Bone connection lists may afterwards mention children that no longer
    /// exist; evaluation skips those entries.
    pub fn prune_except(&mut self, keep_names: &BTreeSet<String>) {
        let mut keep = vec![false; self.node_count()];
        self.mark(self.root(), String::new(), keep_names, &mut keep);
        keep[self.root().0] = true;
        self.rebuild(&keep);
    }

    fn mark(
        &self,
        id: NodeId,
        path: String,
        keep_names: &BTreeSet<String>,
        keep: &mut [bool],
    ) -> bool {
        if keep_names.contains(&path) {
            self.mark_subtree(id, keep);
            return true;
        }

        let mut any_kept = false;
        for &child in self.nodes()[id.0].children() {
            let name = self.nodes()[child.0].name();
            let child_path = if path.is_empty() {
                name.to_owned()
            } else {
                format!("{path}.{name}")
            };
            if self.mark(child, child_path, keep_names, keep) {
                any_kept = true;
            }
        }
        keep[id.0] = any_kept;
        any_kept
    }

    fn mark_subtree(&self, id: NodeId, keep: &mut [bool]) {
        let mut stack = vec![id];
        while let Some(at) = stack.pop() {
            keep[at.0] = true;
            stack.extend(self.nodes()[at.0].children().iter().copied());
        }
    }

    /// Rebuild the arena retaining only nodes flagged in `keep`, remapping
    /// ids. Callers must ensure that the parent of every kept node is kept.
    fn rebuild(&mut self, keep: &[bool]) {
        let mut remap = vec![usize::MAX; keep.len()];
        let mut retained = Vec::with_capacity(keep.iter().filter(|&&k| k).count());

        for (index, node) in std::mem::take(self.nodes_mut()).into_iter().enumerate() {
            if keep[index] {
                remap[index] = retained.len();
                retained.push(node);
            }
        }

        for node in &mut retained {
            node.parent = node.parent.map(|p| NodeId::new(remap[p.0]));
            node.children = node
                .children
                .iter()
                .filter(|child| keep[child.0])
                .map(|child| NodeId::new(remap[child.0]))
                .collect();
        }

        *self.nodes_mut() = retained;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::super::Scene;
    use super::super::node::Node;
    use crate::geom::{Point3, Vec3};

    fn keep_set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|&n| n.to_owned()).collect()
    }

    fn branching_scene() -> Scene {
        let mut scene = Scene::new();
        let body = scene.add_child(scene.root(), Node::bone("body")).unwrap();
        let left = scene
            .add_child(
                body,
                Node::rotation_joint("left", Point3::ORIGIN, Vec3::Z, 0.0),
            )
            .unwrap();
        scene.add_child(left, Node::bone("hand")).unwrap();
        let right = scene
            .add_child(
                body,
                Node::rotation_joint("right", Point3::ORIGIN, Vec3::X, 0.0),
            )
            .unwrap();
        scene.add_child(right, Node::bone("claw")).unwrap();
        scene
            .add_child(scene.root(), Node::target("goal", Point3::ORIGIN))
            .unwrap();
        scene
    }

    #[test]
    fn prune_keeps_ancestors_and_the_kept_subtree() {
        let mut scene = branching_scene();
        scene.prune_except(&keep_set(&["body.left"]));

        assert!(scene.get("body.left").is_ok());
        // descendants of a kept node survive with it
        assert!(scene.get("body.left.hand").is_ok());
        // sibling subtrees without a kept member are gone
        assert!(scene.get("body.right").is_err());
        assert!(scene.get("goal").is_err());
    }

    #[test]
    fn prune_retains_multiple_branches() {
        let mut scene = branching_scene();
        scene.prune_except(&keep_set(&["body.right", "goal"]));

        assert!(scene.get("body.right.claw").is_ok());
        assert!(scene.get("goal").is_ok());
        assert!(scene.get("body.left").is_err());
    }

    #[test]
    fn prune_with_empty_keep_set_leaves_only_the_root() {
        let mut scene = branching_scene();
        scene.prune_except(&BTreeSet::new());
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn strip_shapes_removes_geometry_but_not_kinematics() {
        let mut scene = Scene::new();
        let bone = scene.add_child(scene.root(), Node::bone("body")).unwrap();
        let hull = scene
            .add_child(
                bone,
                Node::shape("hull", vec![Point3::ORIGIN], Vec::new()),
            )
            .unwrap();
        scene
            .add_child(hull, Node::shape("detail", Vec::new(), Vec::new()))
            .unwrap();
        scene
            .add_child(
                bone,
                Node::rotation_joint("joint", Point3::ORIGIN, Vec3::Z, 0.0),
            )
            .unwrap();

        scene.strip_shapes();
        assert!(scene.get("body.hull").is_err());
        assert!(scene.get("body.joint").is_ok());
        assert_eq!(scene.node_count(), 3);
    }

    #[test]
    fn pruned_scene_still_evaluates() {
        let mut scene = Scene::new();
        let body = scene
            .add_child(
                scene.root(),
                Node::bone("body").with_connection_point("arm", Point3::new(10.0, 0.0, 0.0)),
            )
            .unwrap();
        scene.attach(body, Node::bone("upper"), "arm").unwrap();
        scene.attach(body, Node::bone("lower"), "arm").unwrap();

        scene.prune_except(&keep_set(&["body.upper"]));
        // the bone still lists `lower` on its connection point; evaluation
        // must skip the stale entry
        scene.evaluate();
        assert!(scene.get("body.upper").is_ok());
        assert!(scene.get("body.lower").is_err());
    }
}
