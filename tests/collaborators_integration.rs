//! Mouse input, sprite rendering, animation, camera follow and configuration.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use serde_json::json;

use hex_engine::components::geometry::POSITION;
use hex_engine::components::sprite::{CreateSpriteOptions, SPRITE, SpriteComponent};
use hex_engine::events::mouse::{self, MouseEvents};
use hex_engine::resources::gameconfig::EngineConfig;
use hex_engine::resources::input::MouseButton;
use hex_engine::resources::spritestore::{Sprite, SpriteFrame, SpriteStore};
use hex_engine::systems::animation::update_animated_sprites;
use hex_engine::systems::camera;
use hex_engine::systems::render::{RecordingSurface, SpriteRenderer, render_sprites};
use hex_engine::systems::scheduler::ManualScheduler;
use hex_engine::{Engine, EngineError, Entity, RoomId, Size, Vec2, ViewportProperties};

const EPSILON: f32 = 1e-4;

fn approx_eq(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

fn sprite_store() -> SpriteStore {
    let frame = |x: f32| SpriteFrame {
        file: "hero.png".to_string(),
        origin: Vec2::new(x, 0.0),
        size: Size::new(16.0, 16.0),
    };
    let mut store = SpriteStore::new();
    store.add_sprite(Sprite {
        name: "hero".to_string(),
        frames: vec![frame(0.0), frame(16.0), frame(32.0)],
        offset: Vec2::new(-8.0, -8.0),
    });
    store
}

fn make_engine_with_room() -> Engine {
    let mut engine = Engine::new();
    engine
        .create_room(Some(RoomId::from("main")), Size::new(320.0, 180.0), true)
        .unwrap();
    engine
}

fn spawn_hero(engine: &mut Engine, position: Vec2, sprite: SpriteComponent) -> Entity {
    let entity = engine.create_entity(json!({}), None).unwrap();
    engine.set_component_as(POSITION, &position, entity.id()).unwrap();
    engine.set_component_as(SPRITE, &sprite, entity.id()).unwrap();
    entity
}

fn sprite_of(engine: &Engine, entity: &Entity) -> SpriteComponent {
    engine
        .get_component_as::<SpriteComponent>(SPRITE, entity.id())
        .unwrap()
        .unwrap()
}

// -------------------------------------------------------------------------
// Mouse
// -------------------------------------------------------------------------

#[test]
fn mouse_events_follow_the_input_state() {
    let mut engine = Engine::builder()
        .with_module("mouse", MouseEvents::install)
        .build()
        .unwrap();

    let downs = Rc::new(RefCell::new(Vec::new()));
    let sink = downs.clone();
    engine.add_event_handler(mouse::MOUSE_DOWN, move |_, args| {
        let button = mouse::payload_button(&args[0]);
        let position = mouse::payload_position(&args[0]);
        sink.borrow_mut().push((button, position));
        Ok(())
    });

    engine.input_mut().move_to(Vec2::new(12.0, 34.0));
    engine.input_mut().press(MouseButton::Left);
    engine.step().unwrap();
    engine.step().unwrap();

    assert_eq!(
        *downs.borrow(),
        vec![(Some(MouseButton::Left), Some(Vec2::new(12.0, 34.0)))]
    );
    assert!(engine.input().down().is_empty());
    assert!(engine.input().is_pressed(MouseButton::Left));
}

#[test]
fn input_is_owned_per_engine() {
    let mut a = Engine::new();
    let b = Engine::new();
    a.input_mut().press(MouseButton::Right);
    assert!(a.input().is_pressed(MouseButton::Right));
    assert!(!b.input().is_pressed(MouseButton::Right));
}

// -------------------------------------------------------------------------
// Sprites
// -------------------------------------------------------------------------

#[test]
fn render_without_viewports_uses_room_coordinates() {
    let mut engine = make_engine_with_room();
    spawn_hero(&mut engine, Vec2::new(50.0, 40.0), SpriteComponent::still("hero", 1));

    let mut surface = RecordingSurface::new();
    let issued = render_sprites(&engine, &sprite_store(), &mut surface).unwrap();

    assert_eq!(issued, 1);
    let command = &surface.commands()[0];
    assert_eq!(command.image, "hero.png");
    assert_eq!(command.source.x, 16.0);
    assert_eq!(command.destination, Vec2::new(42.0, 32.0));
}

#[test]
fn render_translates_through_each_active_viewport() {
    let mut engine = make_engine_with_room();
    spawn_hero(&mut engine, Vec2::new(100.0, 60.0), SpriteComponent::still("hero", 0));

    engine
        .create_viewport(
            ViewportProperties::new()
                .at(Vec2::new(10.0, 10.0))
                .with_origin(Vec2::new(80.0, 40.0))
                .with_size(Size::new(100.0, 100.0)),
            None,
        )
        .unwrap();
    engine
        .create_viewport(
            ViewportProperties::new()
                .with_size(Size::new(320.0, 180.0))
                .active(false),
            None,
        )
        .unwrap();

    let mut surface = RecordingSurface::new();
    render_sprites(&engine, &sprite_store(), &mut surface).unwrap();

    assert_eq!(surface.commands().len(), 1);
    // 100 - 8 - 80 + 10, 60 - 8 - 40 + 10
    assert_eq!(surface.commands()[0].destination, Vec2::new(22.0, 22.0));
}

#[test]
fn render_culls_sprites_outside_the_viewport() {
    let mut engine = make_engine_with_room();
    spawn_hero(&mut engine, Vec2::new(300.0, 170.0), SpriteComponent::still("hero", 0));
    engine
        .create_viewport(ViewportProperties::new().with_size(Size::new(100.0, 100.0)), None)
        .unwrap();

    let mut surface = RecordingSurface::new();
    assert_eq!(render_sprites(&engine, &sprite_store(), &mut surface).unwrap(), 0);
}

#[test]
fn render_fails_loudly_on_unknown_sprites() {
    let mut engine = make_engine_with_room();
    spawn_hero(&mut engine, Vec2::ZERO, SpriteComponent::still("ghost", 0));

    let mut surface = RecordingSurface::new();
    assert_eq!(
        render_sprites(&engine, &sprite_store(), &mut surface),
        Err(EngineError::SpriteNotFound("ghost".to_string()))
    );
}

#[test]
fn looping_animation_wraps() {
    let mut engine = make_engine_with_room();
    let options = CreateSpriteOptions {
        frames_per_second: 10.0,
        ..Default::default()
    };
    let hero = spawn_hero(&mut engine, Vec2::ZERO, SpriteComponent::new("hero", options));
    let sprites = sprite_store();

    update_animated_sprites(&mut engine, &sprites, 1_000.0).unwrap();
    let sprite = sprite_of(&engine, &hero);
    assert_eq!(sprite.animation_start_time, Some(1_000.0));
    assert_eq!(sprite.current_frame_index, 0);

    update_animated_sprites(&mut engine, &sprites, 1_250.0).unwrap();
    assert_eq!(sprite_of(&engine, &hero).current_frame_index, 2);

    update_animated_sprites(&mut engine, &sprites, 1_300.0).unwrap();
    assert_eq!(sprite_of(&engine, &hero).current_frame_index, 0);
    assert!(sprite_of(&engine, &hero).is_animating);
}

#[test]
fn non_looping_animation_stops_on_its_last_frame() {
    let mut engine = make_engine_with_room();
    let options = CreateSpriteOptions {
        frames_per_second: 10.0,
        is_looping: false,
        ..Default::default()
    };
    let hero = spawn_hero(&mut engine, Vec2::ZERO, SpriteComponent::new("hero", options));
    let sprites = sprite_store();

    update_animated_sprites(&mut engine, &sprites, 0.0).unwrap();
    update_animated_sprites(&mut engine, &sprites, 500.0).unwrap();

    let sprite = sprite_of(&engine, &hero);
    assert_eq!(sprite.current_frame_index, 2);
    assert!(!sprite.is_animating);

    // no longer advanced
    assert_eq!(update_animated_sprites(&mut engine, &sprites, 900.0).unwrap(), 0);
}

#[test]
fn still_sprites_are_not_animated() {
    let mut engine = make_engine_with_room();
    let hero = spawn_hero(&mut engine, Vec2::ZERO, SpriteComponent::still("hero", 2));
    update_animated_sprites(&mut engine, &sprite_store(), 5_000.0).unwrap();
    assert_eq!(sprite_of(&engine, &hero).current_frame_index, 2);
}

#[test]
fn camel_case_sprite_components_drive_render_and_animation() {
    let mut engine = make_engine_with_room();
    let sprites = sprite_store();
    engine
        .create_entity(
            json!({
                "position": { "x": 50.0, "y": 40.0 },
                "sprite": { "name": "hero", "currentFrameIndex": 2, "isAnimating": false },
            }),
            None,
        )
        .unwrap();
    let runner = engine
        .create_entity(
            json!({
                "position": { "x": 500.0, "y": 500.0 },
                "sprite": { "name": "hero", "framesPerSecond": 4, "isLooping": false },
            }),
            None,
        )
        .unwrap();

    let mut surface = RecordingSurface::new();
    assert_eq!(render_sprites(&engine, &sprites, &mut surface).unwrap(), 2);
    assert_eq!(surface.commands()[0].source.x, 32.0);
    assert_eq!(surface.commands()[1].source.x, 0.0);

    update_animated_sprites(&mut engine, &sprites, 0.0).unwrap();
    update_animated_sprites(&mut engine, &sprites, 250.0).unwrap();
    assert_eq!(sprite_of(&engine, &runner).current_frame_index, 1);

    update_animated_sprites(&mut engine, &sprites, 1_000.0).unwrap();
    let stored = engine
        .get_component_for_entity(SPRITE, runner.id())
        .unwrap()
        .unwrap();
    assert_eq!(stored["currentFrameIndex"], json!(2));
    assert_eq!(stored["isAnimating"], json!(false));
}

#[test]
fn snake_case_sprite_keys_are_rejected() {
    let mut engine = make_engine_with_room();
    let entity = engine
        .create_entity(json!({ "sprite": { "name": "hero", "frames_per_second": 4 } }), None)
        .unwrap();
    assert!(engine.get_component_as::<SpriteComponent>(SPRITE, entity.id()).is_err());
}

#[test]
fn idle_animation_frames_leave_the_store_untouched() {
    let mut engine = make_engine_with_room();
    let options = CreateSpriteOptions {
        frames_per_second: 1.0,
        ..Default::default()
    };
    spawn_hero(&mut engine, Vec2::ZERO, SpriteComponent::new("hero", options));
    let sprites = sprite_store();

    assert_eq!(update_animated_sprites(&mut engine, &sprites, 0.0).unwrap(), 1);
    let before = engine.snapshot();

    assert_eq!(update_animated_sprites(&mut engine, &sprites, 400.0).unwrap(), 0);
    assert!(!engine.snapshot().differs_from(&before));

    assert_eq!(update_animated_sprites(&mut engine, &sprites, 1_000.0).unwrap(), 1);
    assert!(engine.snapshot().differs_from(&before));
}

#[test]
fn sprite_renderer_module_draws_every_frame() {
    let surface = Rc::new(RefCell::new(RecordingSurface::new()));
    let renderer = SpriteRenderer::new(sprite_store(), surface.clone());
    let mut engine = Engine::builder()
        .with_module("renderer", move |engine: &mut Engine| renderer.install(engine))
        .build()
        .unwrap();
    engine
        .create_room(None, Size::new(320.0, 180.0), true)
        .unwrap();
    spawn_hero(&mut engine, Vec2::new(20.0, 20.0), SpriteComponent::new("hero", CreateSpriteOptions::default()));

    engine.start();
    let frames = engine
        .run(&mut ManualScheduler::new(50.0).with_frame_limit(4))
        .unwrap();

    assert_eq!(frames, 4);
    assert_eq!(surface.borrow().commands().len(), 4);
    let renderer = engine.module::<SpriteRenderer>("renderer").unwrap();
    assert_eq!(renderer.borrow().drawn(), 4);

    // 12 fps: frame 1 is reached at 150 ms
    let last = surface.borrow().commands()[3].clone();
    assert_eq!(last.source.x, 16.0);
}

// -------------------------------------------------------------------------
// Camera
// -------------------------------------------------------------------------

#[test]
fn camera_centres_on_the_followed_entity_within_the_room() {
    let mut engine = make_engine_with_room();
    camera::install(&mut engine);

    let hero = engine
        .create_entity(json!({ "position": { "x": 200.0, "y": 100.0 } }), None)
        .unwrap();
    let viewport = engine
        .create_viewport(
            ViewportProperties::new()
                .with_size(Size::new(160.0, 90.0))
                .following(hero.id()),
            None,
        )
        .unwrap();

    engine.update().unwrap();
    let origin = engine.get_viewport(&viewport.id).unwrap().origin;
    assert!(approx_eq(origin, Vec2::new(120.0, 55.0)));

    engine
        .set_component_as(POSITION, &Vec2::new(315.0, 5.0), hero.id())
        .unwrap();
    engine.update().unwrap();
    let origin = engine.get_viewport(&viewport.id).unwrap().origin;
    assert!(approx_eq(origin, Vec2::new(160.0, 0.0)));
}

#[test]
fn camera_ignores_viewports_without_a_target() {
    let mut engine = make_engine_with_room();
    let idle = engine
        .create_viewport(
            ViewportProperties::new()
                .with_origin(Vec2::new(7.0, 7.0))
                .with_size(Size::new(10.0, 10.0)),
            None,
        )
        .unwrap();
    let lost = engine
        .create_viewport(ViewportProperties::new().following("gone"), None)
        .unwrap();

    assert_eq!(camera::follow_entities(&mut engine).unwrap(), 0);
    assert_eq!(engine.get_viewport(&idle.id).unwrap().origin, Vec2::new(7.0, 7.0));
    assert_eq!(engine.get_viewport(&lost.id).unwrap().origin, Vec2::ZERO);
}

// -------------------------------------------------------------------------
// Configuration
// -------------------------------------------------------------------------

#[test]
fn config_round_trips_through_an_ini_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hex.ini");

    let mut config = EngineConfig::with_path(&path);
    config.target_fps = 30;
    config.id_seed = Some(99);
    config.room_width = 640;
    config.room_height = 360;
    config.save_to_file().unwrap();

    let mut loaded = EngineConfig::with_path(&path);
    loaded.load_from_file().unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.room_size(), Size::new(640.0, 360.0));
}

#[test]
fn config_keeps_defaults_for_missing_keys() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[room]\nwidth = 400").unwrap();

    let mut config = EngineConfig::with_path(file.path());
    config.load_from_file().unwrap();
    assert_eq!(config.room_width, 400);
    assert_eq!(config.room_height, 180);
    assert_eq!(config.target_fps, 60);
    assert_eq!(config.id_seed, None);
}

#[test]
fn config_rejects_malformed_numbers() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[engine]\ntarget_fps = fast").unwrap();

    let mut config = EngineConfig::with_path(file.path());
    assert!(matches!(config.load_from_file(), Err(EngineError::Config(_))));
}

#[test]
fn seeded_config_makes_ids_deterministic() {
    let config = EngineConfig {
        id_seed: Some(7),
        ..EngineConfig::new()
    };
    let mut a = Engine::builder().with_config(config.clone()).build().unwrap();
    let mut b = Engine::builder().with_config(config).build().unwrap();

    let ra = a.create_room(None, Size::ZERO, true).unwrap();
    let rb = b.create_room(None, Size::ZERO, true).unwrap();
    assert_eq!(ra, rb);
    let ea = a.create_entity(json!({}), None).unwrap();
    let eb = b.create_entity(json!({}), None).unwrap();
    assert_eq!(ea.id(), eb.id());
    assert_ne!(ea.owner(), eb.owner());
}
