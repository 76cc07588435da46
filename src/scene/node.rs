//! Typed nodes of the skeletal scene graph.

use std::collections::BTreeMap;

use crate::geom::{Point3, Vec3};

/// Identifier for a node within a [`Scene`](super::Scene).
///
/// Ids are dense indices and stay valid under mutation and evaluation, but
/// are invalidated by the structural reducers (`strip_shapes`,
/// `prune_except`), which rebuild the arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd)]
pub struct NodeId(pub usize);

impl NodeId {
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }
}

/// An ordered, named set of points. Every node keeps two maps of these: the
/// immutable *base* sets fixed at construction, and the *working* sets that
/// each evaluation pass recomputes from the base sets.
pub type PointSet = Vec<Point3>;

/// Reserved point-set key holding a joint's rotation origin.
pub const SET_ORIGIN: &str = "origin";
/// Reserved point-set key holding a joint's rotation axis direction.
pub const SET_AXIS: &str = "axis";
/// Reserved point-set key holding a target's position.
pub const SET_POSITION: &str = "position";
/// Reserved point-set key holding a shape's vertices.
pub const SET_VERTICES: &str = "vertices";

/// Point-set key for a named bone connection point.
#[must_use]
pub fn connection_key(name: &str) -> String {
    format!("connection_point:{name}")
}

/// Per-variant payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Plain grouping node without behavior of its own.
    Group,
    /// Rigid segment with named attachment sites. Per connection point, the
    /// ordered names of the children attached there.
    Bone {
        connections: BTreeMap<String, Vec<String>>,
    },
    /// Rotational degree of freedom; `angle` is the tunable pose parameter.
    /// The rest value lives in the IK parameter model, which reads the
    /// current angle when parameters are collected.
    RotationJoint { angle: f64 },
    /// Movable goal position for the IK solver.
    Target,
    /// Wireframe geometry: vertices plus edge index pairs. A shape may only
    /// have other shapes as children.
    Shape { edges: Vec<(usize, usize)> },
}

/// A scene-graph node: a sibling-unique name, named base/working point sets
/// and a [`NodeKind`] payload.
///
/// Nodes are built as free values and handed to
/// [`Scene::add_child`](super::Scene::add_child); an empty name asks the
/// scene to assign one from its own counter.
#[derive(Debug, Clone)]
pub struct Node {
    pub(super) name: String,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    pub(super) base: BTreeMap<String, PointSet>,
    pub(super) working: BTreeMap<String, PointSet>,
    pub(super) kind: NodeKind,
}

impl Node {
    fn with_kind(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            base: BTreeMap::new(),
            working: BTreeMap::new(),
            kind,
        }
    }

    #[must_use]
    pub fn group(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Group)
    }

    #[must_use]
    pub fn bone(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            NodeKind::Bone {
                connections: BTreeMap::new(),
            },
        )
    }

    #[must_use]
    pub fn rotation_joint(
        name: impl Into<String>,
        origin: Point3,
        axis: Vec3,
        angle: f64,
    ) -> Self {
        let mut node = Self::with_kind(name, NodeKind::RotationJoint { angle });
        node.base.insert(SET_ORIGIN.to_owned(), vec![origin]);
        node.base
            .insert(SET_AXIS.to_owned(), vec![Point3::from(axis)]);
        node
    }

    #[must_use]
    pub fn target(name: impl Into<String>, position: Point3) -> Self {
        let mut node = Self::with_kind(name, NodeKind::Target);
        node.base.insert(SET_POSITION.to_owned(), vec![position]);
        node
    }

    #[must_use]
    pub fn shape(
        name: impl Into<String>,
        vertices: Vec<Point3>,
        edges: Vec<(usize, usize)>,
    ) -> Self {
        let mut node = Self::with_kind(name, NodeKind::Shape { edges });
        node.base.insert(SET_VERTICES.to_owned(), vertices);
        node
    }

    /// Register a rigid attachment site on a bone.
    ///
    /// # Panics
    /// Panics when called on a non-bone node; connection points are a
    /// construction-time bone property.
    #[must_use]
    pub fn with_connection_point(mut self, name: &str, at: Point3) -> Self {
        let NodeKind::Bone { connections } = &mut self.kind else {
            panic!("connection points can only be added to bones");
        };
        connections.insert(name.to_owned(), Vec::new());
        self.base.insert(connection_key(name), vec![at]);
        self
    }

    /// Translate every base point set of this (not yet attached) node.
    /// Used to bake a rest offset into construction geometry.
    #[must_use]
    pub fn translated(mut self, offset: Vec3) -> Self {
        for set in self.base.values_mut() {
            for p in set.iter_mut() {
                *p = p.add_vec(offset);
            }
        }
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Informational back-reference; carries no ownership.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[must_use]
    pub fn is_shape(&self) -> bool {
        matches!(self.kind, NodeKind::Shape { .. })
    }

    #[must_use]
    pub fn base_points(&self, set: &str) -> Option<&[Point3]> {
        self.base.get(set).map(Vec::as_slice)
    }

    /// Working points of a named set. Only meaningful after an evaluation
    /// pass.
    #[must_use]
    pub fn working_points(&self, set: &str) -> Option<&[Point3]> {
        self.working.get(set).map(Vec::as_slice)
    }

    pub(super) fn working_single(&self, set: &str) -> Option<Point3> {
        self.working.get(set).and_then(|pts| pts.first().copied())
    }

    pub(super) fn base_single(&self, set: &str) -> Option<Point3> {
        self.base.get(set).and_then(|pts| pts.first().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::{Node, NodeKind, SET_AXIS, SET_ORIGIN, connection_key};
    use crate::geom::{Point3, Vec3};

    #[test]
    fn joint_stores_origin_and_axis_as_base_sets() {
        let joint = Node::rotation_joint(
            "elbow",
            Point3::new(1.0, 2.0, 3.0),
            Vec3::Z,
            0.25,
        );
        assert_eq!(
            joint.base_points(SET_ORIGIN),
            Some(&[Point3::new(1.0, 2.0, 3.0)][..])
        );
        assert_eq!(
            joint.base_points(SET_AXIS),
            Some(&[Point3::new(0.0, 0.0, 1.0)][..])
        );
        assert!(
            matches!(joint.kind(), NodeKind::RotationJoint { angle }
                if (*angle - 0.25).abs() < f64::EPSILON)
        );
    }

    #[test]
    fn connection_points_register_a_reserved_set() {
        let bone = Node::bone("upper").with_connection_point("joint", Point3::new(0.0, 100.0, 0.0));
        assert_eq!(
            bone.base_points(&connection_key("joint")),
            Some(&[Point3::new(0.0, 100.0, 0.0)][..])
        );
        let NodeKind::Bone { connections } = bone.kind() else {
            panic!("expected a bone");
        };
        assert!(connections.contains_key("joint"));
        assert!(connections["joint"].is_empty());
    }

    #[test]
    #[should_panic(expected = "connection points")]
    fn connection_point_on_non_bone_panics() {
        let _ = Node::target("t", Point3::ORIGIN).with_connection_point("x", Point3::ORIGIN);
    }

    #[test]
    fn translated_offsets_all_base_sets() {
        let bone = Node::bone("b")
            .with_connection_point("tip", Point3::new(0.0, 1.0, 0.0))
            .translated(Vec3::new(0.0, 50.0, 0.0));
        assert_eq!(
            bone.base_points(&connection_key("tip")),
            Some(&[Point3::new(0.0, 51.0, 0.0)][..])
        );
    }
}
