//! Skeletal scene graph with a beam-search inverse-kinematics solver.
//!
//! The engine poses an articulated body — bones, rotational joints,
//! wireframe shapes, movable targets — and searches for joint angles that
//! bring a chosen connection point close to a target while staying near the
//! rest pose.
//!
//! A caller composes a [`scene::Scene`] once, then repeatedly mutates joint
//! angles and target positions, calls [`scene::Scene::evaluate`] to pose it
//! and reads working points back for display. [`ik::IkSolver`] runs the
//! search against disposable cloned scratch state and optionally commits the
//! winning angles onto the live scene.
//!
//! ```
//! use ik_engine::geom::{Point3, Vec3};
//! use ik_engine::ik::{IkSolver, SearchOptions};
//! use ik_engine::scene::{Scene, node::Node};
//! use rand::SeedableRng;
//!
//! let mut scene = Scene::new();
//! let joint = scene
//!     .add_child(
//!         scene.root(),
//!         Node::rotation_joint("hinge", Point3::ORIGIN, Vec3::Z, 0.0),
//!     )
//!     .unwrap();
//! scene
//!     .add_child(
//!         joint,
//!         Node::bone("arm").with_connection_point("tip", Point3::new(0.0, 100.0, 0.0)),
//!     )
//!     .unwrap();
//! scene
//!     .add_child(scene.root(), Node::target("goal", Point3::new(-100.0, 0.0, 0.0)))
//!     .unwrap();
//!
//! let solver = IkSolver::new("hinge.arm", "tip", "goal")
//!     .with_joints(vec!["hinge".to_owned()]);
//! let options = SearchOptions {
//!     commit: true,
//!     ..SearchOptions::default()
//! };
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let outcome = solver.search(&mut scene, &options, &mut rng).unwrap();
//! assert!(outcome.distance <= 2.0);
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod ik;
pub mod scene;
pub mod shapes;

pub use geom::{Point3, PointTransform, Vec3};
pub use ik::{IkError, IkSolver, JointParam, SearchOptions, SearchOutcome};
pub use scene::node::{Node, NodeId, NodeKind};
pub use scene::{Scene, SceneError};
