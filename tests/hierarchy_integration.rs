//! Integration tests for the parent-child game object hierarchy.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test hierarchy_integration
//! ```

use bevy_ecs::entity::Entity;

use cogworks::EngineError;
use cogworks::components::rigidbody::Rigidbody2D;
use cogworks::math::Vec2;
use cogworks::scene::Scene;

const EPSILON: f32 = 1e-3;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec(a: Vec2, b: Vec2) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn attach(scene: &mut Scene, parent: Entity, child: Entity) {
    scene.object_mut(parent).unwrap().add_child(child).unwrap();
}

/// Root at (100, 50) with a chain of `depth` children, each at local (10, 5).
fn chain(scene: &mut Scene, depth: usize) -> Vec<Entity> {
    let root = scene.spawn_at("root", 100.0, 50.0);
    let mut chain = vec![root];
    for i in 0..depth {
        let child = scene.spawn_at(format!("child{i}"), 10.0, 5.0);
        attach(scene, *chain.last().unwrap(), child);
        chain.push(child);
    }
    scene.add_game_object(root).unwrap();
    chain
}

// =============================================================================
// WORLD POSITION COMPOSITION
// =============================================================================

#[test]
fn world_position_is_parent_world_plus_local() {
    let mut scene = Scene::new("h");
    let chain = chain(&mut scene, 4);
    for pair in chain.windows(2) {
        let parent = scene.object(pair[0]).unwrap();
        let child = scene.object(pair[1]).unwrap();
        let local = child.transform().unwrap().local_position();
        assert!(approx_vec(
            child.world_position(),
            parent.world_position() + local
        ));
    }
    let leaf = scene.object(*chain.last().unwrap()).unwrap();
    assert!(approx_vec(leaf.world_position(), Vec2::new(140.0, 70.0)));
}

#[test]
fn set_world_position_round_trips_at_any_depth() {
    let mut scene = Scene::new("h");
    let chain = chain(&mut scene, 5);
    for (i, e) in chain.iter().enumerate() {
        let target = (-37.5 + i as f32 * 13.0, 250.25 - i as f32);
        let mut obj = scene.object_mut(*e).unwrap();
        obj.set_world_position(target.0, target.1).unwrap();
        assert!(approx_vec(
            obj.world_position(),
            Vec2::new(target.0, target.1)
        ));
    }
}

#[test]
fn moving_parent_moves_descendants() {
    let mut scene = Scene::new("h");
    let chain = chain(&mut scene, 2);
    let leaf_before = scene.object(chain[2]).unwrap().world_position();
    scene
        .object_mut(chain[0])
        .unwrap()
        .transform_mut()
        .unwrap()
        .set_local_position(0.0, 0.0);
    let leaf_after = scene.object(chain[2]).unwrap().world_position();
    assert!(approx_vec(
        leaf_before - leaf_after,
        Vec2::new(100.0, 50.0)
    ));
}

#[test]
fn rotation_and_scale_compose_down_the_chain() {
    let mut scene = Scene::new("h");
    let parent = scene.spawn("parent");
    let child = scene.spawn("child");
    {
        let mut obj = scene.object_mut(parent).unwrap();
        let t = obj.transform_mut().unwrap();
        t.set_local_rotation(30.0);
        t.set_uniform_scale(2.0);
    }
    {
        let mut obj = scene.object_mut(child).unwrap();
        let t = obj.transform_mut().unwrap();
        t.set_local_rotation(45.0);
        t.set_local_scale(1.5, 0.5);
    }
    attach(&mut scene, parent, child);
    let obj = scene.object(child).unwrap();
    assert!(approx_eq(obj.world_rotation(), 75.0));
    assert!(approx_vec(obj.world_scale(), Vec2::new(3.0, 1.0)));
}

// =============================================================================
// REPARENTING
// =============================================================================

#[test]
fn reparent_keeps_local_position() {
    let mut scene = Scene::new("h");
    let a = scene.spawn_at("A", 100.0, 0.0);
    let b = scene.spawn_at("B", -50.0, 20.0);
    let c = scene.spawn_at("C", 10.0, 0.0);
    scene.add_game_object(a).unwrap();
    scene.add_game_object(b).unwrap();
    attach(&mut scene, a, c);
    assert!(approx_vec(
        scene.object(c).unwrap().world_position(),
        Vec2::new(110.0, 0.0)
    ));

    scene
        .object_mut(c)
        .unwrap()
        .transform_mut()
        .unwrap()
        .set_local_position(0.0, 0.0);
    attach(&mut scene, b, c);

    let obj = scene.object(c).unwrap();
    assert_eq!(obj.parent(), Some(b));
    assert!(approx_vec(
        obj.transform().unwrap().local_position(),
        Vec2::new(0.0, 0.0)
    ));
    assert!(approx_vec(obj.world_position(), Vec2::new(-50.0, 20.0)));
    assert!(scene.object(a).unwrap().children().is_empty());
}

#[test]
fn reparent_without_moving_keeps_local_not_world() {
    let mut scene = Scene::new("h");
    let a = scene.spawn_at("A", 100.0, 0.0);
    let b = scene.spawn_at("B", 0.0, 300.0);
    let c = scene.spawn_at("C", 10.0, 0.0);
    attach(&mut scene, a, c);
    attach(&mut scene, b, c);
    let obj = scene.object(c).unwrap();
    assert!(approx_vec(
        obj.transform().unwrap().local_position(),
        Vec2::new(10.0, 0.0)
    ));
    assert!(approx_vec(obj.world_position(), Vec2::new(10.0, 300.0)));
}

#[test]
fn attaching_a_root_removes_it_from_roots() {
    let mut scene = Scene::new("h");
    let a = scene.spawn("A");
    let b = scene.spawn("B");
    scene.add_game_object(a).unwrap();
    scene.add_game_object(b).unwrap();
    attach(&mut scene, a, b);
    assert!(scene.roots().contains(&a));
    assert!(!scene.roots().contains(&b));
    assert_eq!(scene.game_objects().iter().filter(|e| **e == b).count(), 1);
}

#[test]
fn child_of_registered_parent_joins_the_scene() {
    let mut scene = Scene::new("h");
    let parent = scene.spawn("parent");
    scene.add_game_object(parent).unwrap();
    let child = scene.spawn("child");
    assert!(!scene.object(child).unwrap().in_scene());
    attach(&mut scene, parent, child);
    assert!(scene.object(child).unwrap().in_scene());
    assert!(scene.game_objects().contains(&child));
}

#[test]
fn removed_child_leaves_the_scene() {
    let mut scene = Scene::new("h");
    let parent = scene.spawn("parent");
    let child = scene.spawn("child");
    attach(&mut scene, parent, child);
    scene.add_game_object(parent).unwrap();

    assert!(scene.object_mut(parent).unwrap().remove_child(child));
    assert!(!scene.object(child).unwrap().in_scene());
    assert!(!scene.game_objects().contains(&child));
    assert_eq!(scene.object(child).unwrap().parent(), None);
    // not a child any more
    assert!(!scene.object_mut(parent).unwrap().remove_child(child));
}

// =============================================================================
// STRUCTURAL ERRORS
// =============================================================================

#[test]
fn cycles_are_rejected() {
    let mut scene = Scene::new("h");
    let chain = chain(&mut scene, 2);
    let err = scene
        .object_mut(chain[2])
        .unwrap()
        .add_child(chain[0])
        .unwrap_err();
    assert!(matches!(err, EngineError::HierarchyCycle { .. }));

    let err = scene
        .object_mut(chain[1])
        .unwrap()
        .add_child(chain[1])
        .unwrap_err();
    assert!(matches!(err, EngineError::HierarchyCycle { .. }));
    assert_eq!(scene.object(chain[1]).unwrap().parent(), Some(chain[0]));
}

#[test]
fn rigidbody_needs_a_root_game_object() {
    let mut scene = Scene::new("h");
    let parent = scene.spawn("parent");
    let child = scene.spawn("child");
    attach(&mut scene, parent, child);
    let err = scene
        .object_mut(child)
        .unwrap()
        .add_component(Rigidbody2D::new_box(10.0, 10.0))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAttachment { .. }));
    assert!(!scene.object(child).unwrap().has_component::<Rigidbody2D>());
}

#[test]
fn game_object_with_rigidbody_cannot_become_a_child() {
    let mut scene = Scene::new("h");
    let parent = scene.spawn("parent");
    let body = scene.spawn("body");
    scene
        .object_mut(body)
        .unwrap()
        .add_component(Rigidbody2D::circle(5.0))
        .unwrap();
    scene.add_game_object(body).unwrap();
    let err = scene.object_mut(parent).unwrap().add_child(body).unwrap_err();
    assert!(matches!(err, EngineError::InvalidAttachment { .. }));
    assert!(scene.roots().contains(&body));
}
