//! Skeletal scene graph: an owned tree of typed nodes with named point sets.
//!
//! The container follows an arena layout: the [`Scene`] owns a flat node
//! vector, nodes refer to their children by [`NodeId`] and keep a non-owning
//! parent back-reference. The root is an implicit unnamed group; qualified
//! names are the dot-joined path of names below it.
//!
//! Cloning a [`Scene`] yields a fully independent deep copy, which is how
//! the IK solver obtains disposable scratch state.

pub mod evaluator;
pub mod node;
pub mod reduce;

use thiserror::Error;

use crate::geom::Point3;
use node::{Node, NodeId, NodeKind, SET_POSITION, connection_key};

/// Errors surfaced by the scene construction and mutation surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// A dot-joined path had an unresolved segment.
    #[error("no element at path `{path}`")]
    NotFound { path: String },
    /// A child with the same name already exists under the parent.
    #[error("element `{name}` already exists under `{parent}`")]
    DuplicateName { parent: String, name: String },
    /// Shapes may only have shape children.
    #[error("shape `{parent}` can only have shape children")]
    ShapeChild { parent: String },
    /// The named connection point does not exist on the bone.
    #[error("bone `{bone}` has no connection point `{name}`")]
    UnknownConnectionPoint { bone: String, name: String },
    /// The element at the path is not of the kind the operation requires.
    #[error("element at `{path}` is not a {expected}")]
    WrongKind {
        path: String,
        expected: &'static str,
    },
}

/// The scene graph container.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Node>,
    /// Counter for names of anonymously added nodes. Threaded through the
    /// scene rather than living in process-global state.
    auto_names: usize,
}

impl Scene {
    /// Create a scene holding only the implicit root group.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::group("")],
            auto_names: 0,
        }
    }

    /// The implicit root group.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Attach `node` as a child of `parent`.
    ///
    /// An empty node name is replaced by the next value of the scene's
    /// naming counter. Fails without modifying the scene when the name
    /// collides with a sibling or when a non-shape is attached under a
    /// shape.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, SceneError> {
        let parent_node = self.nodes.get(parent.0).ok_or_else(|| SceneError::NotFound {
            path: format!("#{}", parent.0),
        })?;

        if parent_node.is_shape() && !node.is_shape() {
            return Err(SceneError::ShapeChild {
                parent: self.qualified_name(parent),
            });
        }

        if node.name.is_empty() {
            node.name = self.auto_names.to_string();
            self.auto_names += 1;
        }

        let collides = parent_node
            .children
            .iter()
            .any(|child| self.nodes[child.0].name == node.name);
        if collides {
            return Err(SceneError::DuplicateName {
                parent: self.qualified_name(parent),
                name: node.name,
            });
        }

        let id = NodeId::new(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Attach `node` under a bone and register it on the named connection
    /// point, so that evaluation carries it along with that anchor.
    pub fn attach(
        &mut self,
        bone: NodeId,
        node: Node,
        connection_point: &str,
    ) -> Result<NodeId, SceneError> {
        let bone_node = self.nodes.get(bone.0).ok_or_else(|| SceneError::NotFound {
            path: format!("#{}", bone.0),
        })?;
        let bone_name = self.qualified_name(bone);
        let NodeKind::Bone { connections } = &bone_node.kind else {
            return Err(SceneError::WrongKind {
                path: bone_name,
                expected: "bone",
            });
        };
        if !connections.contains_key(connection_point) {
            return Err(SceneError::UnknownConnectionPoint {
                bone: bone_name,
                name: connection_point.to_owned(),
            });
        }

        let id = self.add_child(bone, node)?;
        let attached_name = self.nodes[id.0].name.clone();
        let NodeKind::Bone { connections } = &mut self.nodes[bone.0].kind else {
            unreachable!("kind checked above");
        };
        connections
            .get_mut(connection_point)
            .expect("checked above")
            .push(attached_name);
        Ok(id)
    }

    /// Resolve a dot-joined qualified name to a node, starting from the
    /// root's children.
    pub fn get(&self, path: &str) -> Result<NodeId, SceneError> {
        let mut current = self.root();
        for segment in path.split('.') {
            let found = self.nodes[current.0]
                .children
                .iter()
                .copied()
                .find(|child| self.nodes[child.0].name == segment);
            match found {
                Some(child) => current = child,
                None => {
                    return Err(SceneError::NotFound {
                        path: path.to_owned(),
                    });
                }
            }
        }
        Ok(current)
    }

    /// Dot-joined path of names from the root down to `id`. The root itself
    /// maps to the empty string.
    #[must_use]
    pub fn qualified_name(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(at) = current {
            let node = &self.nodes[at.0];
            if node.parent.is_some() {
                segments.push(node.name.as_str());
            }
            current = node.parent;
        }

        let mut path = String::new();
        for segment in segments.iter().rev() {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(segment);
        }
        path
    }

    /// Visit every node, children before parents, with its qualified name.
    pub fn for_each_postorder(&self, mut visit: impl FnMut(NodeId, &str)) {
        self.postorder(self.root(), String::new(), &mut visit);
    }

    fn postorder(&self, id: NodeId, path: String, visit: &mut impl FnMut(NodeId, &str)) {
        for child in self.nodes[id.0].children.iter().copied() {
            let name = &self.nodes[child.0].name;
            let child_path = if path.is_empty() {
                name.clone()
            } else {
                format!("{path}.{name}")
            };
            self.postorder(child, child_path, visit);
        }
        visit(id, &path);
    }

    // ────────────────────────────────────────────────────────────────────
    // Mutation surface
    // ────────────────────────────────────────────────────────────────────

    /// Set a rotation joint's angle directly (manual posing).
    pub fn set_joint_angle(&mut self, path: &str, value: f64) -> Result<(), SceneError> {
        let id = self.get(path)?;
        let NodeKind::RotationJoint { angle } = &mut self.nodes[id.0].kind else {
            return Err(SceneError::WrongKind {
                path: path.to_owned(),
                expected: "rotation joint",
            });
        };
        *angle = value;
        Ok(())
    }

    /// Current angle of a rotation joint.
    pub fn joint_angle(&self, path: &str) -> Result<f64, SceneError> {
        let id = self.get(path)?;
        let NodeKind::RotationJoint { angle } = self.nodes[id.0].kind else {
            return Err(SceneError::WrongKind {
                path: path.to_owned(),
                expected: "rotation joint",
            });
        };
        Ok(angle)
    }

    /// Reposition a target (absolute set of its rest position).
    pub fn set_target_position(&mut self, path: &str, position: Point3) -> Result<(), SceneError> {
        let id = self.get(path)?;
        let node = &mut self.nodes[id.0];
        if !matches!(node.kind, NodeKind::Target) {
            return Err(SceneError::WrongKind {
                path: path.to_owned(),
                expected: "target",
            });
        }
        node.base.insert(SET_POSITION.to_owned(), vec![position]);
        Ok(())
    }

    /// A target's rest position.
    pub fn target_position(&self, path: &str) -> Result<Point3, SceneError> {
        let id = self.get(path)?;
        let node = &self.nodes[id.0];
        if !matches!(node.kind, NodeKind::Target) {
            return Err(SceneError::WrongKind {
                path: path.to_owned(),
                expected: "target",
            });
        }
        node.base_single(SET_POSITION)
            .ok_or_else(|| SceneError::NotFound {
                path: path.to_owned(),
            })
    }

    // ────────────────────────────────────────────────────────────────────
    // Pose query surface (valid after `evaluate`)
    // ────────────────────────────────────────────────────────────────────

    /// Posed position of a bone's connection point.
    #[must_use]
    pub fn connection_point_position(&self, id: NodeId, name: &str) -> Option<Point3> {
        self.nodes
            .get(id.0)?
            .working_single(&connection_key(name))
    }

    /// Posed marker position of a joint (its origin) or a target (its
    /// position). `None` for other kinds.
    #[must_use]
    pub fn marker_position(&self, id: NodeId) -> Option<Point3> {
        let node = self.nodes.get(id.0)?;
        match node.kind {
            NodeKind::RotationJoint { .. } => node.working_single(node::SET_ORIGIN),
            NodeKind::Target => node.working_single(SET_POSITION),
            _ => None,
        }
    }

    /// Drawable edges of a posed shape: pairs of posed endpoint positions,
    /// culling any edge that does not have both endpoints in front of the
    /// camera plane (working z > 0).
    #[must_use]
    pub fn visible_edges(&self, id: NodeId) -> Vec<(Point3, Point3)> {
        let Some(node) = self.nodes.get(id.0) else {
            return Vec::new();
        };
        let NodeKind::Shape { edges } = &node.kind else {
            return Vec::new();
        };
        let Some(vertices) = node.working_points(node::SET_VERTICES) else {
            return Vec::new();
        };

        edges
            .iter()
            .filter_map(|&(a, b)| {
                let (pa, pb) = (*vertices.get(a)?, *vertices.get(b)?);
                (pa.z > 0.0 && pb.z > 0.0).then_some((pa, pb))
            })
            .collect()
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
