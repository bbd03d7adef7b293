//! # engine_app — headless paddle demo
//!
//! Two paddles and a ball running on the entity-component framework. The
//! window, canvas and input devices are in-memory stand-ins; a short input
//! script serves the ball and moves both paddles so a run exercises every
//! system.
//!
//! ## Frame sequence
//!
//! 1. Apply the scripted input for the frame.
//! 2. Update pass: plugins, paddle movement, ball physics, scoring.
//! 3. Cleanup sweep of retired balls.
//! 4. Render pass into the recording canvas.

mod components;
mod frame;
mod game;
mod render;
mod script;
mod systems;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use engine_component::EntityQuery;
use engine_input::{InputBackend, load_mapping};
use engine_window::WindowBackend;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use components::Score;
use frame::{FrameConfig, FrameLoop};
use game::{Game, default_mapping};

#[derive(Debug, Parser)]
#[command(name = "engine_app", about = "Headless paddle demo on the entity-component framework")]
struct Args {
    /// Number of frames to run (0 = unlimited).
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Target frames per second.
    #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// JSON input mapping replacing the built-in one.
    #[arg(long)]
    mapping: Option<PathBuf>,

    /// SDL controller database handed to the input backend.
    #[arg(long, default_value = "gamecontrollerdb.txt")]
    gamepad_db: PathBuf,
}

fn load_gamepad_db(input: &impl InputBackend, path: &Path) {
    match std::fs::read_to_string(path) {
        Ok(db) => {
            input.set_gamepad_mappings(&db);
            info!(path = %path.display(), "loaded gamepad mappings");
        }
        Err(err) => warn!(
            path = %path.display(),
            %err,
            "gamepad mapping database not loaded; continuing without it"
        ),
    }
}

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let args = Args::parse();
    info!(?args, "paddle demo starting");

    let mapping = match &args.mapping {
        Some(path) => load_mapping(path)
            .with_context(|| format!("loading input mapping from {}", path.display()))?,
        None => default_mapping(),
    };

    let target_fps = i32::try_from(args.fps).context("--fps out of range")?;
    let mut game = Game::new(mapping, target_fps);
    load_gamepad_db(game.input(), &args.gamepad_db);

    let mut frame_loop = FrameLoop::new(FrameConfig {
        target_fps: args.fps,
        max_frames: args.frames,
    });
    frame_loop.run(|frame, dt| {
        script::drive(game.input(), script::DEMO_SCRIPT, frame);
        game.frame(dt);
    });

    let score = EntityQuery::new(game.store())
        .where_has_component::<Score>()
        .first_or_none()
        .map(|entity| *entity.get::<Score>())
        .unwrap_or_default();
    info!(
        frames = frame_loop.frame(),
        scheduler_frames = game.frames(),
        entities = game.store().len(),
        resolution = %game.window().current_resolution(),
        left = score.left,
        right = score.right,
        draw_calls = game.canvas().commands().len(),
        "paddle demo finished"
    );
    Ok(())
}
