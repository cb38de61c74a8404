#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Area
//!
//! A voxel chunk-area engine built with Rust and WGPU: a cube of chunks that
//! follows the viewer, regenerates the chunks it slides onto and re-meshes
//! them a few at a time so no single frame pays for a whole boundary crossing.
//!
//! ## Key Modules
//!
//! * `engine_state` - The engine components: chunk area, meshing, rendering,
//!   camera, picking and settings
//!
//! ## Architecture
//!
//! The engine keeps a clear separation between:
//! * Voxel data and the toroidal slot map behind re-centering
//! * Meshing with per-vertex ambient occlusion
//! * A batched renderer behind a draw backend trait (wgpu, or in-memory)
//! * Ray picking and block edits
//!
//! ## Usage
//!
//! ```ignore
//! fn main() {
//!     voxel_area::run();
//! }
//! ```
//!
//! `run()` reads an optional JSON settings file from its first argument and
//! flies a camera across the terrain without opening a window.
//!
//! ## Performance Considerations
//!
//! * Re-centering permutes slot indices instead of moving chunk data
//! * Boundary crossings are spread over several frames
//! * Faces are batched across chunks into few draw calls
//! * Transparent faces are only re-sorted when the view changed

use std::{env, error::Error};

use cgmath::Point3;
use log::{error, info, warn};
use web_time::{Duration, Instant};

pub mod engine_state;

pub use engine_state::{settings::EngineSettings, EngineState};

use engine_state::{
    rendering::{
        texture::generate_checker_atlas,
        wgpu_backend::WgpuChunkBackend,
        DebugRendererStats, DrawBackend, RecordingBackend,
    },
    voxels::{area::AreaUpdate, chunk::chunk_generation::MAX_HEIGHT_AMPLITUDE},
};

/// Simulated time step of the headless run.
const FRAME_TIME: Duration = Duration::from_micros(16_667);

/// Frames between scripted block edits in the headless run.
const EDIT_INTERVAL: u32 = 60;

/// Initializes logging, loads settings and runs the headless fly-over.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let settings = match env::args().nth(1) {
        Some(path) => EngineSettings::load(&path).unwrap_or_else(|err| {
            warn!("{} ({}); using default settings", err, path);
            EngineSettings::default()
        }),
        None => EngineSettings::default(),
    };

    match run_headless(settings) {
        Ok(stats) => info!("Finished: {:?}", stats),
        Err(err) => error!("{}", err),
    }
}

/// Flies a camera along +X for `settings.demo_frames` frames.
///
/// Uses the GPU when an adapter is available and the in-memory backend
/// otherwise.
///
/// # Returns
/// The renderer statistics of the last frame
pub fn run_headless(settings: EngineSettings) -> Result<DebugRendererStats, Box<dyn Error>> {
    let start = Point3::new(0.0, MAX_HEIGHT_AMPLITUDE + 8.0, 0.0);

    match WgpuChunkBackend::new_headless(settings.viewport_width, settings.viewport_height) {
        Ok(backend) => {
            let atlas = match backend.load_atlas(settings.atlas_path.as_deref()) {
                Ok(atlas) => atlas,
                Err(err) => {
                    warn!("{}; using a generated atlas", err);
                    backend.create_atlas(&generate_checker_atlas(16))
                }
            };
            let mut engine = EngineState::new(settings, backend, start)?;
            Ok(fly(&mut engine, &atlas))
        }
        Err(err) => {
            warn!("{}; falling back to the recording backend", err);
            let mut engine = EngineState::new(settings, RecordingBackend::stats_only(), start)?;
            Ok(fly(&mut engine, &()))
        }
    }
}

fn fly<B: DrawBackend>(engine: &mut EngineState<B>, atlas: &B::Atlas) -> DebugRendererStats {
    let frames = engine.settings().demo_frames;
    let place_block_type = engine.settings().place_block_type;
    let started = Instant::now();
    let mut recenters = 0;

    for frame in 0..frames {
        engine.camera_state_mut().camera_controller.move_by(1.0, 0.0, 0.0);
        if let AreaUpdate::Recentered { .. } = engine.frame(FRAME_TIME, atlas) {
            recenters += 1;
        }

        if frame % EDIT_INTERVAL == EDIT_INTERVAL - 1 {
            if frame % (2 * EDIT_INTERVAL) == EDIT_INTERVAL - 1 {
                engine.place_targeted_block(place_block_type);
            } else {
                engine.remove_targeted_block();
            }
        }
    }

    info!(
        "Flew {} frames in {:?}: {} re-centers, now at chunk {:?}",
        frames,
        started.elapsed(),
        recenters,
        engine.area().center_chunk()
    );
    *engine.stats()
}
