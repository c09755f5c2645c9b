//! Hex engine demo runner.
//!
//! Runs a headless bouncing-ball scene through the whole engine: a room, a
//! viewport following the ball, the sprite renderer painting into a
//! recording surface and the mouse module. Logs a summary at the end.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run -- --frames 120
//! cargo run -- --config hex.ini --realtime
//! ```

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use log::{error, info, warn};
use serde_json::json;

use hex_engine::components::geometry::{POSITION, Size, Vec2};
use hex_engine::components::sprite::{CreateSpriteOptions, SPRITE, SpriteComponent};
use hex_engine::events::mouse::MouseEvents;
use hex_engine::resources::gameconfig::EngineConfig;
use hex_engine::resources::spritestore::{Sprite, SpriteFrame, SpriteStore};
use hex_engine::systems::camera;
use hex_engine::systems::render::{RecordingSurface, SpriteRenderer};
use hex_engine::systems::scheduler::{FixedRateScheduler, FrameScheduler, ManualScheduler};
use hex_engine::{Engine, EngineResult, EntityFilter, ViewportProperties};

const VELOCITY: &str = "velocity";

/// Hex engine headless demo
#[derive(Parser)]
#[command(version, about = "Runs a small bouncing-ball scene through the Hex engine.")]
struct Cli {
    /// INI configuration file ([engine] target_fps, id_seed; [room] width, height).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of frames to run.
    #[arg(long, default_value_t = 300)]
    frames: u64,

    /// Pace frames on the wall clock instead of running as fast as possible.
    #[arg(long)]
    realtime: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> EngineResult<()> {
    let config = match &cli.config {
        Some(path) => {
            let mut config = EngineConfig::with_path(path);
            config.load_from_file()?;
            config
        }
        None => {
            let mut config = EngineConfig::new();
            if let Err(err) = config.load_from_file() {
                warn!("{err}, using defaults");
            }
            config
        }
    };

    let surface = Rc::new(RefCell::new(RecordingSurface::new()));
    let renderer = SpriteRenderer::new(demo_sprites(), surface.clone());

    let mut engine = Engine::builder()
        .with_config(config.clone())
        .with_module("mouse", MouseEvents::install)
        .with_module("renderer", move |engine: &mut Engine| renderer.install(engine))
        .build()?;
    camera::install(&mut engine);

    let room_size = config.room_size();
    engine.create_room(None, room_size, true)?;

    let ball = engine.create_entity(
        json!({
            "position": { "x": 10.0, "y": 10.0 },
            "velocity": { "x": 90.0, "y": 60.0 },
        }),
        None,
    )?;
    engine.set_component_as(SPRITE, &SpriteComponent::new("ball", CreateSpriteOptions::default()), ball.id())?;
    engine.create_viewport(
        ViewportProperties::new()
            .with_size(Size::new(room_size.width / 2.0, room_size.height / 2.0))
            .following(ball.id()),
        None,
    )?;

    engine.add_event_handler_for_entities(
        "update",
        |engine, entity, _| {
            let delta = engine.time().delta_seconds() as f32;
            let bounds = engine.current_room().map(|room| room.size()).unwrap_or(Size::ZERO);
            let (Some(mut position), Some(mut velocity)) = (
                engine.get_component_as::<Vec2>(POSITION, entity.id())?,
                engine.get_component_as::<Vec2>(VELOCITY, entity.id())?,
            ) else {
                return Ok(());
            };

            position = position + Vec2::new(velocity.x * delta, velocity.y * delta);
            if position.x < 0.0 || position.x > bounds.width {
                velocity.x = -velocity.x;
                position.x = position.x.clamp(0.0, bounds.width);
            }
            if position.y < 0.0 || position.y > bounds.height {
                velocity.y = -velocity.y;
                position.y = position.y.clamp(0.0, bounds.height);
            }

            engine.set_component_as(POSITION, &position, entity.id())?;
            engine.set_component_as(VELOCITY, &velocity, entity.id())
        },
        EntityFilter::new().require(POSITION).require(VELOCITY),
    );

    let mut scheduler: Box<dyn FrameScheduler> = if cli.realtime {
        Box::new(FixedRateScheduler::new(config.target_fps).with_frame_limit(cli.frames))
    } else {
        Box::new(ManualScheduler::at_fps(config.target_fps).with_frame_limit(cli.frames))
    };

    engine.start();
    let frames = engine.run(scheduler.as_mut())?;

    let position = engine.get_component_as::<Vec2>(POSITION, ball.id())?.unwrap_or_default();
    let drawn = engine
        .module::<SpriteRenderer>("renderer")
        .map_or(0, |renderer| renderer.borrow().drawn());
    let mouse_events = engine
        .module::<MouseEvents>("mouse")
        .map_or(0, |mouse| mouse.borrow().emitted());
    info!(
        "ran {frames} frames ({:.0} ms simulated): ball at ({:.1}, {:.1}), {drawn} sprites drawn, {} commands recorded, {mouse_events} mouse events",
        engine.time().elapsed_ms,
        position.x,
        position.y,
        surface.borrow().commands().len()
    );
    Ok(())
}

fn demo_sprites() -> SpriteStore {
    let frame = |x: f32| SpriteFrame {
        file: "ball.png".to_string(),
        origin: Vec2::new(x, 0.0),
        size: Size::new(8.0, 8.0),
    };
    let mut sprites = SpriteStore::new();
    sprites.add_sprite(Sprite {
        name: "ball".to_string(),
        frames: vec![frame(0.0), frame(8.0), frame(16.0), frame(24.0)],
        offset: Vec2::new(-4.0, -4.0),
    });
    sprites
}
