//! Wireframe shape builders and the demo robot assembly.
//!
//! The robot here is the canonical articulated test body: a hull bone with
//! two four-joint arms and a movable hand target per arm. Tests and demos
//! use it as a realistic scene; nothing in the engine depends on it.

use crate::geom::{Point3, Vec3};
use crate::scene::node::{Node, NodeId};
use crate::scene::{Scene, SceneError};

/// Closed outline: each vertex connects to the next, wrapping around.
fn ring_edges(count: usize) -> Vec<(usize, usize)> {
    (0..count).map(|i| (i, (i + 1) % count)).collect()
}

/// A flat closed polygon as a wireframe shape.
#[must_use]
pub fn flat_polygon(name: impl Into<String>, vertices: &[Point3]) -> Node {
    Node::shape(name, vertices.to_vec(), ring_edges(vertices.len()))
}

/// Two copies of a closed outline offset by ∓`inflate`/2, connected by a rung
/// per vertex.
#[must_use]
pub fn extruded_polygon(name: impl Into<String>, outline: &[Point3], inflate: Vec3) -> Node {
    let count = outline.len();
    let half = inflate.mul_scalar(0.5);

    let mut vertices = Vec::with_capacity(count * 2);
    vertices.extend(outline.iter().map(|p| p.add_vec(-half)));
    vertices.extend(outline.iter().map(|p| p.add_vec(half)));

    let mut edges = ring_edges(count);
    edges.extend(ring_edges(count).into_iter().map(|(a, b)| (a + count, b + count)));
    edges.extend((0..count).map(|i| (i, i + count)));

    Node::shape(name, vertices, edges)
}

/// One arm segment: a bone carrying an extruded triangle and a `joint`
/// connection point at its far end.
pub fn robot_arm_section(
    scene: &mut Scene,
    parent: NodeId,
    name: &str,
    length: f64,
) -> Result<NodeId, SceneError> {
    let bone = scene.add_child(
        parent,
        Node::bone(name).with_connection_point("joint", Point3::new(0.0, length, 0.0)),
    )?;
    scene.add_child(
        bone,
        extruded_polygon(
            "section",
            &[
                Point3::new(-10.0, 0.0, 0.0),
                Point3::new(0.0, length, 0.0),
                Point3::new(10.0, 0.0, 0.0),
            ],
            Vec3::new(0.0, 0.0, 10.0),
        ),
    )?;
    Ok(bone)
}

/// A full arm: three stacked shoulder joints (Z, X, Y axes), an upper
/// section, an elbow joint attached at the upper section's anchor and a
/// lower section. The wrapper bone is attached at the body's named
/// connection point.
pub fn robot_arm(
    scene: &mut Scene,
    body: NodeId,
    name: &str,
    connection_point: &str,
) -> Result<NodeId, SceneError> {
    let wrapper = scene.attach(body, Node::bone(name), connection_point)?;

    let shoulder1 = scene.add_child(
        wrapper,
        Node::rotation_joint("shoulder_joint1", Point3::ORIGIN, Vec3::Z, 0.0),
    )?;
    let shoulder2 = scene.add_child(
        shoulder1,
        Node::rotation_joint("shoulder_joint2", Point3::ORIGIN, Vec3::X, 0.0),
    )?;
    let shoulder3 = scene.add_child(
        shoulder2,
        Node::rotation_joint("shoulder_joint3", Point3::ORIGIN, Vec3::Y, 0.0),
    )?;

    let upper = robot_arm_section(scene, shoulder3, "upper_arm", 100.0)?;
    let elbow = scene.attach(
        upper,
        Node::rotation_joint("elbow_joint", Point3::ORIGIN, Vec3::Z, 0.0),
        "joint",
    )?;
    robot_arm_section(scene, elbow, "lower_arm", 100.0)?;
    Ok(wrapper)
}

/// The robot torso: a hull shape plus connection points for both arms and
/// the head, with a rest offset baked in.
pub fn robot_body(scene: &mut Scene, parent: NodeId, name: &str) -> Result<NodeId, SceneError> {
    let offset = Vec3::new(0.0, 50.0, 0.0);
    let bone = scene.add_child(
        parent,
        Node::bone(name)
            .with_connection_point("right_arm", Point3::new(150.0, -120.0, -55.0))
            .with_connection_point("left_arm", Point3::new(150.0, -120.0, 55.0))
            .with_connection_point("head", Point3::new(175.0, -145.0, 0.0))
            .translated(offset),
    )?;
    scene.add_child(
        bone,
        extruded_polygon(
            "hull",
            &[
                Point3::new(-100.0, 0.0, 0.0),
                Point3::new(-100.0, -40.0, 0.0),
                Point3::new(50.0, -90.0, 0.0),
                Point3::new(150.0, -140.0, 0.0),
                Point3::new(200.0, -140.0, 0.0),
                Point3::new(130.0, -40.0, 0.0),
                Point3::new(150.0, 0.0, 0.0),
            ],
            Vec3::new(0.0, 0.0, 100.0),
        )
        .translated(offset),
    )?;
    Ok(bone)
}

/// The complete demo scene: body, both arms attached at their shoulder
/// anchors and a hand target per arm.
pub fn robot_scene() -> Result<Scene, SceneError> {
    let mut scene = Scene::new();
    let root = scene.root();
    let body = robot_body(&mut scene, root, "body")?;

    robot_arm(&mut scene, body, "right_arm", "right_arm")?;
    robot_arm(&mut scene, body, "left_arm", "left_arm")?;

    scene.add_child(
        scene.root(),
        Node::target("left_hand_target", Point3::new(0.0, 0.0, 100.0)),
    )?;
    scene.add_child(
        scene.root(),
        Node::target("right_hand_target", Point3::new(0.0, 0.0, -100.0)),
    )?;
    Ok(scene)
}

/// Qualified path of an arm's effector bone (the lower section).
#[must_use]
pub fn arm_effector_path(arm: &str) -> String {
    format!("body.{arm}.shoulder_joint1.shoulder_joint2.shoulder_joint3.upper_arm.elbow_joint.lower_arm")
}

/// Qualified paths of the joints a hand search should move.
#[must_use]
pub fn arm_joint_paths(arm: &str) -> Vec<String> {
    vec![
        format!("body.{arm}.shoulder_joint1"),
        format!("body.{arm}.shoulder_joint1.shoulder_joint2"),
        format!("body.{arm}.shoulder_joint1.shoulder_joint2.shoulder_joint3"),
        format!(
            "body.{arm}.shoulder_joint1.shoulder_joint2.shoulder_joint3.upper_arm.elbow_joint"
        ),
    ]
}
