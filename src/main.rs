//! Cogworks demo runner.
//!
//! Builds two demo scenes and drives them through the frame loop:
//!
//! - `platformer`: a player box with run/jump movement, a static floor and
//!   wall, a handful of falling circles and a decoration group parented under
//!   a container object. The camera follows the player.
//! - `topdown`: the same player with eight-way movement and no gravity.
//!
//! Enter switches scenes, Escape quits.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --frames 600 --dump-scene
//! cargo run --release --features raylib -- --window
//! ```

use std::path::PathBuf;

use bevy_ecs::entity::Entity;
use clap::Parser;
use log::{error, info, warn};

use cogworks::component::{Component, FrameContext};
use cogworks::components::cameracontroller::CameraController;
use cogworks::components::collider::Collider2D;
use cogworks::components::platformermovement::PlatformerMovement;
use cogworks::components::rigidbody::Rigidbody2D;
use cogworks::components::shaperenderer::{Primitive, ShapeRenderer};
use cogworks::components::topdownmovement::TopDownMovement;
use cogworks::engine::Engine;
use cogworks::gameobject::GameObjectMut;
use cogworks::math::Vec2;
use cogworks::platform::{HeadlessPlatform, Platform};
use cogworks::render::Color;
use cogworks::resources::engineconfig::EngineConfig;
use cogworks::scene::Scene;
use cogworks::{EngineError, Result};

/// Cogworks 2D scene-graph engine demo
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Number of frames to run headless before exiting.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Print the active scene as JSON when the run ends.
    #[arg(long)]
    dump_scene: bool,

    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Measure real frame times and sleep to the target rate.
    #[arg(long)]
    realtime: bool,

    /// Open a raylib window instead of running headless.
    #[cfg(feature = "raylib")]
    #[arg(long)]
    window: bool,
}

/// Scene switching and quitting from the keyboard.
struct SceneHotkeys {
    next: &'static str,
}

impl Component for SceneHotkeys {
    fn update(&mut self, obj: &mut GameObjectMut<'_>, frame: &FrameContext<'_>) -> Result<()> {
        if frame.input.action_2.just_pressed {
            obj.request_scene(self.next);
        }
        if frame.input.action_back.just_pressed {
            obj.request_quit();
        }
        Ok(())
    }
}

fn spawn_player(scene: &mut Scene, x: f32, y: f32) -> Result<Entity> {
    let player = scene.spawn_at("Player", x, y);
    let mut obj = scene
        .object_mut(player)
        .ok_or(EngineError::NoSuchGameObject(player))?;
    obj.add_component(
        Rigidbody2D::new_box(32.0, 32.0)
            .with_mass(1.0)
            .freeze_rotation(),
    )?;
    obj.add_component(ShapeRenderer::new(
        Primitive::Rect {
            width: 32.0,
            height: 32.0,
        },
        Color::BLUE,
    ))?;
    obj.add_component(Collider2D::new(32.0, 32.0).with_offset(0.0, 16.0))?;
    Ok(player)
}

fn spawn_static_box(scene: &mut Scene, name: &str, center: Vec2, size: Vec2) -> Result<Entity> {
    let e = scene.spawn_at(name, center.x, center.y);
    let mut obj = scene.object_mut(e).ok_or(EngineError::NoSuchGameObject(e))?;
    obj.add_component(Rigidbody2D::new_box(size.x, size.y).static_body())?;
    obj.add_component(ShapeRenderer::new(
        Primitive::Rect {
            width: size.x,
            height: size.y,
        },
        Color::DARKGRAY,
    ))?;
    scene.add_game_object(e)?;
    Ok(e)
}

fn follow(scene: &mut Scene, target: Entity) -> Result<()> {
    let camera = scene.camera_object();
    scene
        .object_mut(camera)
        .ok_or(EngineError::NoSuchGameObject(camera))?
        .add_component(CameraController::new(target))
}

fn build_platformer(engine: &Engine) -> Result<Scene> {
    let mut scene = engine.create_scene("platformer");
    scene.background = Color::rgb(20, 24, 32);

    let player = spawn_player(&mut scene, 200.0, 300.0)?;
    scene
        .object_mut(player)
        .ok_or(EngineError::NoSuchGameObject(player))?
        .add_component(PlatformerMovement::default())?;
    scene.add_game_object(player)?;

    let floor = scene.spawn_at("Floor", 0.0, 500.0);
    scene
        .object_mut(floor)
        .ok_or(EngineError::NoSuchGameObject(floor))?
        .add_component(Rigidbody2D::segment(
            Vec2::new(-400.0, 0.0),
            Vec2::new(1200.0, 0.0),
            4.0,
        ).static_body())?;
    scene.add_game_object(floor)?;
    spawn_static_box(&mut scene, "Wall", Vec2::new(700.0, 400.0), Vec2::new(40.0, 200.0))?;

    for i in 0..6 {
        let x = 250.0 + i as f32 * 60.0 + fastrand::f32() * 20.0;
        let ball = scene.spawn_at(format!("Ball{i}"), x, 50.0 - fastrand::f32() * 100.0);
        let radius = 8.0 + fastrand::f32() * 8.0;
        let mut obj = scene.object_mut(ball).ok_or(EngineError::NoSuchGameObject(ball))?;
        obj.add_component(Rigidbody2D::circle(radius).with_mass(0.5))?;
        obj.add_component(ShapeRenderer::new(Primitive::Circle { radius }, Color::YELLOW))?;
        scene.add_game_object(ball)?;
    }

    // decoration hangs off a container so moving it moves every child
    let decor = scene.spawn_at("Decor", 100.0, 150.0);
    for i in 0..3 {
        let star = scene.spawn_at(format!("Star{i}"), i as f32 * 120.0, 0.0);
        scene
            .object_mut(star)
            .ok_or(EngineError::NoSuchGameObject(star))?
            .add_component(ShapeRenderer::new(Primitive::Circle { radius: 3.0 }, Color::WHITE))?;
        scene
            .object_mut(decor)
            .ok_or(EngineError::NoSuchGameObject(decor))?
            .add_child(star)?;
    }
    scene.add_game_object(decor)?;

    let hud = scene.spawn("Hotkeys");
    scene
        .object_mut(hud)
        .ok_or(EngineError::NoSuchGameObject(hud))?
        .add_component(SceneHotkeys { next: "topdown" })?;
    scene.add_game_object(hud)?;

    follow(&mut scene, player)?;
    Ok(scene)
}

fn build_topdown(engine: &Engine) -> Result<Scene> {
    let mut scene = engine.create_scene("topdown");
    scene.background = Color::rgb(16, 40, 24);
    scene.physics_mut().simulator_mut().set_gravity(Vec2::new(0.0, 0.0));

    let player = spawn_player(&mut scene, 400.0, 300.0)?;
    scene
        .object_mut(player)
        .ok_or(EngineError::NoSuchGameObject(player))?
        .add_component(TopDownMovement::default())?;
    scene.add_game_object(player)?;

    for (name, center, size) in [
        ("WallTop", Vec2::new(400.0, 20.0), Vec2::new(800.0, 40.0)),
        ("WallBottom", Vec2::new(400.0, 580.0), Vec2::new(800.0, 40.0)),
        ("WallLeft", Vec2::new(20.0, 300.0), Vec2::new(40.0, 600.0)),
        ("WallRight", Vec2::new(780.0, 300.0), Vec2::new(40.0, 600.0)),
    ] {
        spawn_static_box(&mut scene, name, center, size)?;
    }

    let hud = scene.spawn("Hotkeys");
    scene
        .object_mut(hud)
        .ok_or(EngineError::NoSuchGameObject(hud))?
        .add_component(SceneHotkeys { next: "platformer" })?;
    scene.add_game_object(hud)?;

    follow(&mut scene, player)?;
    Ok(scene)
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = EngineConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("Using default configuration: {e}");
    }

    let mut engine = Engine::new(config);
    let platformer = build_platformer(&engine)?;
    let topdown = build_topdown(&engine)?;
    engine.add_scene(platformer);
    engine.add_scene(topdown);

    let mut platform: Box<dyn Platform> = make_platform(cli, engine.config());
    engine.run(platform.as_mut())?;

    if cli.dump_scene {
        if let Some(scene) = engine.scenes().active_scene() {
            println!("{}", scene.to_json()?);
        }
    }
    Ok(())
}

#[cfg(feature = "raylib")]
fn make_platform(cli: &Cli, config: &EngineConfig) -> Box<dyn Platform> {
    if cli.window {
        return Box::new(cogworks::platform::raylib::RaylibPlatform::new(config));
    }
    headless(cli, config)
}

#[cfg(not(feature = "raylib"))]
fn make_platform(cli: &Cli, config: &EngineConfig) -> Box<dyn Platform> {
    headless(cli, config)
}

fn headless(cli: &Cli, config: &EngineConfig) -> Box<dyn Platform> {
    let mut platform =
        HeadlessPlatform::new(config.window_width, config.window_height, 1.0 / config.target_fps.max(1) as f32)
            .with_max_frames(cli.frames);
    if cli.realtime {
        platform = platform.realtime(config.target_fps);
    }
    Box::new(platform)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!("Cogworks demo");
    if let Err(e) = run(&cli) {
        error!("{e}");
        std::process::exit(1);
    }
}
