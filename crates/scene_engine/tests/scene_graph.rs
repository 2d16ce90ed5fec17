//! Scene graph integration tests
//!
//! Transform composition through ancestor chains and subtree lifecycle.

mod common;

use std::f32::consts::FRAC_PI_2;

use approx::assert_relative_eq;
use common::Fixture;
use nalgebra::UnitQuaternion;
use scene_engine::foundation::math::euler_to_quaternion;
use scene_engine::prelude::*;

#[test]
fn test_total_transform_is_ancestor_product() {
    let fixture = Fixture::new();
    let mut scene = fixture.scene("chain");
    let root = scene.root();

    let a = scene.create_node("a", root, NodeType::Empty).unwrap();
    let b = scene.create_node("b", a, NodeType::Empty).unwrap();
    let c = scene.create_node("c", b, NodeType::Empty).unwrap();

    scene.node_mut(a).unwrap().set_position(Vec3::new(1.0, 0.0, 0.0));
    scene
        .node_mut(b)
        .unwrap()
        .set_rotation_euler(Vec3::new(0.0, FRAC_PI_2, 0.0));
    scene.node_mut(c).unwrap().set_scaling(Vec3::new(2.0, 2.0, 2.0));
    scene.node_mut(c).unwrap().set_position(Vec3::new(0.0, 0.0, 3.0));

    let ta = *scene.node(a).unwrap().transform_matrix();
    let tb = *scene.node(b).unwrap().transform_matrix();
    let tc = *scene.node(c).unwrap().transform_matrix();

    let total = scene.total_transform(c).unwrap();
    assert_relative_eq!(total, ta * tb * tc, epsilon = 1e-5);

    // Rotating B a quarter turn about Y sends C's +Z offset to +X.
    assert_relative_eq!(total.translation(), Vec3::new(4.0, 0.0, 0.0), epsilon = 1e-5);
}

#[test]
fn test_trs_composition_order() {
    let fixture = Fixture::new();
    let mut scene = fixture.scene("trs");
    let node = scene.create_node("n", scene.root(), NodeType::Empty).unwrap();

    let position = Vec3::new(1.0, 2.0, 3.0);
    let rotation = euler_to_quaternion(Vec3::new(0.3, -0.2, 0.9));
    let scaling = Vec3::new(2.0, 0.5, 1.5);
    {
        let node = scene.node_mut(node).unwrap();
        node.set_position(position);
        node.set_rotation_quaternion(rotation);
        node.set_scaling(scaling);
    }

    let expected = Mat4::new_translation(&position)
        * UnitQuaternion::from_quaternion(rotation).to_homogeneous()
        * Mat4::new_nonuniform_scaling(&scaling);
    assert_relative_eq!(*scene.node(node).unwrap().transform_matrix(), expected, epsilon = 1e-5);
}

#[test]
fn test_siblings_are_independent() {
    let fixture = Fixture::new();
    let mut scene = fixture.scene("siblings");
    let root = scene.root();
    let parent = scene.create_node("parent", root, NodeType::Empty).unwrap();
    let left = scene.create_node("left", parent, NodeType::Empty).unwrap();
    let right = scene.create_node("right", parent, NodeType::Empty).unwrap();

    scene.node_mut(parent).unwrap().set_position(Vec3::new(0.0, 1.0, 0.0));
    scene.node_mut(left).unwrap().set_position(Vec3::new(-1.0, 0.0, 0.0));
    let before = scene.total_transform(left).unwrap();

    scene.node_mut(right).unwrap().set_position(Vec3::new(5.0, 5.0, 5.0));
    scene.node_mut(right).unwrap().set_scaling(Vec3::new(3.0, 3.0, 3.0));

    assert_relative_eq!(scene.total_transform(left).unwrap(), before);
    assert_relative_eq!(before.translation(), Vec3::new(-1.0, 1.0, 0.0));
}

#[test]
fn test_direct_matrix_bypasses_trs() {
    let fixture = Fixture::new();
    let mut scene = fixture.scene("direct");
    let node = scene.create_node("n", scene.root(), NodeType::Empty).unwrap();

    let matrix = Mat4::rotation_z(0.5) * Mat4::new_translation(&Vec3::new(0.0, 4.0, 0.0));
    scene.node_mut(node).unwrap().set_transform_matrix(matrix);

    assert_relative_eq!(scene.total_transform(node).unwrap(), matrix);
    assert_relative_eq!(scene.node(node).unwrap().position(), Vec3::zeros());
}

#[test]
fn test_removed_subtree_is_gone() {
    let fixture = Fixture::new();
    let mut scene = fixture.scene("removal");
    let root = scene.root();
    let arm = scene.create_node("arm", root, NodeType::Empty).unwrap();
    let hand = scene.create_node("hand", arm, NodeType::Empty).unwrap();
    let eye = scene
        .create_camera_node("eye", hand, fixture.perspective_camera())
        .unwrap();
    scene.set_active_camera(eye).unwrap();

    scene.remove_node(arm).unwrap();

    assert!(!scene.contains(hand));
    assert_eq!(scene.parent(hand), None);
    assert_eq!(scene.active_camera(), None);
    assert_eq!(scene.find_node("eye"), None);
    assert_eq!(scene.total_transform(eye), Err(SceneError::NodeNotFound(eye)));
    assert_eq!(scene.depth_first(root), vec![root]);

    // Names are free again once their nodes are gone.
    assert!(scene.create_node("arm", root, NodeType::Empty).is_ok());
}

#[test]
fn test_depth_first_visits_parents_before_children() {
    let fixture = Fixture::new();
    let mut scene = fixture.scene("order");
    let root = scene.root();
    let a = scene.create_node("a", root, NodeType::Empty).unwrap();
    let a1 = scene.create_node("a1", a, NodeType::Empty).unwrap();
    let b = scene.create_node("b", root, NodeType::Empty).unwrap();
    let a2 = scene.create_node("a2", a, NodeType::Empty).unwrap();

    assert_eq!(scene.depth_first(root), vec![root, a, a1, a2, b]);
    assert_eq!(scene.children(a), &[a1, a2]);
}
