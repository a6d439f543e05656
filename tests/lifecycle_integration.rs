//! Integration tests for component lifecycle passes: start, update,
//! fixed update, render, removal and reset.

use std::sync::{Arc, Mutex};

use cogworks::EngineError;
use cogworks::component::{Component, FrameContext};
use cogworks::components::platformermovement::PlatformerMovement;
use cogworks::gameobject::{GameObjectMut, GameObjectRef};
use cogworks::render::{Canvas, Color, RecordingSurface};
use cogworks::resources::input::InputState;
use cogworks::scene::Scene;

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn clear(log: &Log) {
    log.lock().unwrap().clear();
}

/// Records every hook as `"<tag>:<hook>"`.
struct Probe {
    tag: &'static str,
    log: Log,
}

struct OtherProbe {
    tag: &'static str,
    log: Log,
}

impl Probe {
    fn new(tag: &'static str, log: &Log) -> Self {
        Self {
            tag,
            log: log.clone(),
        }
    }

    fn push(&self, hook: &str) {
        self.log.lock().unwrap().push(format!("{}:{}", self.tag, hook));
    }
}

impl OtherProbe {
    fn new(tag: &'static str, log: &Log) -> Self {
        Self {
            tag,
            log: log.clone(),
        }
    }
}

impl Component for Probe {
    fn start(&mut self, _obj: &mut GameObjectMut<'_>) -> cogworks::Result<()> {
        self.push("start");
        Ok(())
    }

    fn update(&mut self, _obj: &mut GameObjectMut<'_>, _frame: &FrameContext<'_>) -> cogworks::Result<()> {
        self.push("update");
        Ok(())
    }

    fn fixed_update(&mut self, _obj: &mut GameObjectMut<'_>, _dt: f32) -> cogworks::Result<()> {
        self.push("fixed");
        Ok(())
    }

    fn render(&self, _obj: &GameObjectRef<'_>, canvas: &mut Canvas<'_>) {
        self.push("render");
        canvas.circle(cogworks::math::Vec2::new(0.0, 0.0), 1.0, Color::WHITE, true);
    }

    fn on_remove(&mut self, _obj: &mut GameObjectMut<'_>) {
        self.push("remove");
    }

    fn reset_to_start(&mut self, _obj: &mut GameObjectMut<'_>) -> cogworks::Result<()> {
        self.push("reset");
        Ok(())
    }
}

impl Component for OtherProbe {
    fn update(&mut self, _obj: &mut GameObjectMut<'_>, _frame: &FrameContext<'_>) -> cogworks::Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:other-update", self.tag));
        Ok(())
    }
}

/// Fails its start hook.
struct Broken;

impl Component for Broken {
    fn start(&mut self, _obj: &mut GameObjectMut<'_>) -> cogworks::Result<()> {
        Err(EngineError::MissingDependency {
            component: "Broken",
            requires: "Nothing",
        })
    }
}

/// Removes itself on its first update.
struct OneShot {
    log: Log,
}

impl Component for OneShot {
    fn update(&mut self, obj: &mut GameObjectMut<'_>, _frame: &FrameContext<'_>) -> cogworks::Result<()> {
        self.log.lock().unwrap().push("oneshot:update".into());
        obj.remove_component::<OneShot>();
        Ok(())
    }

    fn on_remove(&mut self, _obj: &mut GameObjectMut<'_>) {
        self.log.lock().unwrap().push("oneshot:remove".into());
    }
}

fn update(scene: &mut Scene) {
    let input = InputState::default();
    scene.update(&FrameContext::new(0.016, &input)).unwrap();
}

// =============================================================================
// ORDERING
// =============================================================================

#[test]
fn passes_run_depth_first_in_insertion_and_attachment_order() {
    let log = new_log();
    let mut scene = Scene::new("l");
    let a = scene.spawn("A");
    let a1 = scene.spawn("A1");
    let a2 = scene.spawn("A2");
    let b = scene.spawn("B");
    {
        let mut obj = scene.object_mut(a).unwrap();
        obj.add_component(Probe::new("A", &log)).unwrap();
        obj.add_component(OtherProbe::new("A", &log)).unwrap();
        obj.add_child(a1).unwrap();
        obj.add_child(a2).unwrap();
    }
    scene.object_mut(a1).unwrap().add_component(Probe::new("A1", &log)).unwrap();
    scene.object_mut(a2).unwrap().add_component(Probe::new("A2", &log)).unwrap();
    scene.object_mut(b).unwrap().add_component(Probe::new("B", &log)).unwrap();
    scene.add_game_object(a).unwrap();
    scene.add_game_object(b).unwrap();
    assert_eq!(entries(&log), ["A:start", "A1:start", "A2:start", "B:start"]);

    clear(&log);
    update(&mut scene);
    assert_eq!(
        entries(&log),
        ["A:update", "A:other-update", "A1:update", "A2:update", "B:update"]
    );

    clear(&log);
    scene.fixed_update(1.0 / 60.0).unwrap();
    assert_eq!(entries(&log), ["A:fixed", "A1:fixed", "A2:fixed", "B:fixed"]);

    clear(&log);
    let mut surface = RecordingSurface::new(100, 100);
    scene.render(&mut surface);
    assert_eq!(entries(&log), ["A:render", "A1:render", "A2:render", "B:render"]);
    assert_eq!(surface.draw_calls(), 4);
}

// =============================================================================
// START
// =============================================================================

#[test]
fn start_runs_once_per_component() {
    let log = new_log();
    let mut scene = Scene::new("l");
    let e = scene.spawn("obj");
    scene.object_mut(e).unwrap().add_component(Probe::new("P", &log)).unwrap();
    scene.add_game_object(e).unwrap();
    scene.add_game_object(e).unwrap();
    assert_eq!(entries(&log), ["P:start"]);
    assert!(scene.object(e).unwrap().is_component_started::<Probe>());
}

#[test]
fn component_added_to_registered_object_starts_immediately() {
    let log = new_log();
    let mut scene = Scene::new("l");
    let e = scene.spawn("obj");
    scene.add_game_object(e).unwrap();
    let mut obj = scene.object_mut(e).unwrap();
    obj.add_component(Probe::new("late", &log)).unwrap();
    assert_eq!(entries(&log), ["late:start"]);
}

#[test]
fn unregistered_objects_do_not_start() {
    let log = new_log();
    let mut scene = Scene::new("l");
    let e = scene.spawn("obj");
    scene.object_mut(e).unwrap().add_component(Probe::new("P", &log)).unwrap();
    update(&mut scene);
    assert!(entries(&log).is_empty());
    assert!(!scene.object(e).unwrap().is_component_started::<Probe>());
}

#[test]
fn start_error_propagates_to_caller() {
    let mut scene = Scene::new("l");
    let e = scene.spawn("obj");
    scene.object_mut(e).unwrap().add_component(Broken).unwrap();
    let err = scene.add_game_object(e).unwrap_err();
    assert!(matches!(err, EngineError::MissingDependency { component: "Broken", .. }));
}

#[test]
fn component_failing_to_start_is_not_left_attached() {
    let log = new_log();
    let mut scene = Scene::new("l");
    let e = scene.spawn("obj");
    scene.object_mut(e).unwrap().add_component(Probe::new("P", &log)).unwrap();
    scene.add_game_object(e).unwrap();

    let mut obj = scene.object_mut(e).unwrap();
    let err = obj.add_component(PlatformerMovement::default()).unwrap_err();
    assert!(matches!(err, EngineError::MissingDependency { .. }));
    assert!(!obj.as_readonly().has_component::<PlatformerMovement>());
    assert_eq!(obj.as_readonly().component_names(), ["Transform", "Probe"]);

    // later passes are unaffected
    update(&mut scene);
    assert!(entries(&log).contains(&"P:update".to_string()));
}

// =============================================================================
// ACTIVITY
// =============================================================================

#[test]
fn inactive_objects_and_components_are_skipped() {
    let log = new_log();
    let mut scene = Scene::new("l");
    let parent = scene.spawn("parent");
    let child = scene.spawn("child");
    scene.object_mut(parent).unwrap().add_child(child).unwrap();
    scene.object_mut(parent).unwrap().add_component(Probe::new("parent", &log)).unwrap();
    scene.object_mut(child).unwrap().add_component(Probe::new("child", &log)).unwrap();
    scene.add_game_object(parent).unwrap();
    clear(&log);

    scene.object_mut(parent).unwrap().set_active(false);
    update(&mut scene);
    scene.fixed_update(0.016).unwrap();
    assert!(entries(&log).is_empty());

    scene.object_mut(parent).unwrap().set_active(true);
    assert!(scene.object_mut(child).unwrap().set_component_active::<Probe>(false));
    update(&mut scene);
    assert_eq!(entries(&log), ["parent:update"]);
    assert!(!scene.object(child).unwrap().is_component_active::<Probe>());
}

// =============================================================================
// COMPONENT CONTAINER
// =============================================================================

#[test]
fn duplicate_component_keeps_the_first() {
    let log = new_log();
    let mut scene = Scene::new("l");
    let e = scene.spawn("obj");
    let mut obj = scene.object_mut(e).unwrap();
    obj.add_component(Probe::new("first", &log)).unwrap();
    let err = obj.add_component(Probe::new("second", &log)).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateComponent { component: "Probe" }));
    assert_eq!(obj.get_component::<Probe>().unwrap().tag, "first");
}

#[test]
fn missing_component_lookups_are_not_errors() {
    let mut scene = Scene::new("l");
    let e = scene.spawn("obj");
    let mut obj = scene.object_mut(e).unwrap();
    assert!(obj.get_component::<Probe>().is_none());
    assert!(!obj.remove_component::<Probe>());
    assert!(!obj.set_component_active::<Probe>(false));
}

#[test]
fn component_names_list_transform_first() {
    let log = new_log();
    let mut scene = Scene::new("l");
    let e = scene.spawn("obj");
    let mut obj = scene.object_mut(e).unwrap();
    obj.add_component(OtherProbe::new("o", &log)).unwrap();
    obj.add_component(Probe::new("p", &log)).unwrap();
    assert_eq!(
        scene.object(e).unwrap().component_names(),
        ["Transform", "OtherProbe", "Probe"]
    );
}

#[test]
fn scene_queries_recurse_into_children() {
    let log = new_log();
    let mut scene = Scene::new("l");
    let root = scene.spawn("root");
    let child = scene.spawn("child");
    scene.object_mut(root).unwrap().add_child(child).unwrap();
    scene.object_mut(root).unwrap().add_component(Probe::new("root", &log)).unwrap();
    scene.object_mut(child).unwrap().add_component(Probe::new("child", &log)).unwrap();
    scene.add_game_object(root).unwrap();

    let tags: Vec<_> = scene.get_components::<Probe>().iter().map(|p| p.tag).collect();
    assert_eq!(tags, ["root", "child"]);
    assert_eq!(scene.game_objects_with::<Probe>(), [root, child]);
    assert_eq!(scene.find_by_name("child"), Some(child));
    assert_eq!(scene.find_by_name("nobody"), None);
}

// =============================================================================
// REMOVAL
// =============================================================================

#[test]
fn removing_a_parent_tears_down_the_subtree() {
    let log = new_log();
    let mut scene = Scene::new("l");
    let root = scene.spawn("root");
    let child = scene.spawn("child");
    let grandchild = scene.spawn("grandchild");
    scene.object_mut(child).unwrap().add_child(grandchild).unwrap();
    scene.object_mut(root).unwrap().add_child(child).unwrap();
    for (e, tag) in [(root, "root"), (child, "child"), (grandchild, "grandchild")] {
        scene.object_mut(e).unwrap().add_component(Probe::new(tag, &log)).unwrap();
    }
    scene.add_game_object(root).unwrap();
    clear(&log);

    assert!(scene.remove_game_object(root));
    assert_eq!(entries(&log), ["root:remove", "child:remove", "grandchild:remove"]);
    for e in [root, child, grandchild] {
        assert!(scene.object(e).is_none());
    }
    assert!(!scene.remove_game_object(root));
    assert!(scene.get_components::<Probe>().is_empty());
}

#[test]
fn component_can_remove_itself_during_update() {
    let log = new_log();
    let mut scene = Scene::new("l");
    let e = scene.spawn("obj");
    scene
        .object_mut(e)
        .unwrap()
        .add_component(OneShot { log: log.clone() })
        .unwrap();
    scene.add_game_object(e).unwrap();

    update(&mut scene);
    update(&mut scene);
    assert_eq!(entries(&log), ["oneshot:update", "oneshot:remove"]);
    assert!(!scene.object(e).unwrap().has_component::<OneShot>());
}

#[test]
fn remove_component_calls_on_remove() {
    let log = new_log();
    let mut scene = Scene::new("l");
    let e = scene.spawn("obj");
    scene.object_mut(e).unwrap().add_component(Probe::new("P", &log)).unwrap();
    scene.add_game_object(e).unwrap();
    assert!(scene.object_mut(e).unwrap().remove_component::<Probe>());
    assert_eq!(entries(&log), ["P:start", "P:remove"]);
}

// =============================================================================
// RESET
// =============================================================================

#[test]
fn reset_restores_registered_transforms() {
    let log = new_log();
    let mut scene = Scene::new("l");
    let e = scene.spawn_at("obj", 5.0, 6.0);
    scene.object_mut(e).unwrap().add_component(Probe::new("P", &log)).unwrap();
    scene.add_game_object(e).unwrap();
    {
        let mut obj = scene.object_mut(e).unwrap();
        let t = obj.transform_mut().unwrap();
        t.set_local_position(100.0, 100.0);
        t.set_local_rotation(45.0);
    }
    clear(&log);
    scene.reset_to_start().unwrap();

    let t = *scene.object(e).unwrap().transform().unwrap();
    assert_eq!(t.local_position(), cogworks::math::Vec2::new(5.0, 6.0));
    assert_eq!(t.local_rotation(), 0.0);
    assert_eq!(entries(&log), ["P:reset"]);
    assert_eq!(scene.start_transform(e).unwrap().local_position(), t.local_position());
}
