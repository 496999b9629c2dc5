//! # Spinning Cube Library
//!
//! This library renders a single colored cube with `wgpu`, rotating it about the z axis at a
//! constant angular speed. It is small on purpose: one static mesh, one shader, one indexed
//! draw per frame, and a transform pipeline that decides which uniforms to upload.
//!
//! ## Modules
//!
//! - [`geometry`]: The cube's positions, colors and triangle indices, and their buffer layouts.
//! - [`transform`]: Pure animation math; advancing the rotation and building the model matrix.
//! - [`camera`]: The fixed view and perspective projection.
//! - [`pipeline`]: The per-frame driver and the [`FrameSink`] trait it renders through.
//! - [`config`]: Startup configuration and its environment overrides.
//! - `app`, `renderer`, `scene`, `gpu`: The `winit` and `wgpu` host that runs the pipeline.
//! - `uniform_buffer`, `uniform_binding`: The uniform block shared with the shader.
//!
//! ## Variants
//!
//! [`PipelineMode::Animated`] rebuilds the model matrix every frame. [`PipelineMode::StaticCamera`]
//! keeps the cube still and uploads every uniform once, before the loop, so frames only clear
//! and draw.
//!
//! ## Usage
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     cube_core::run()
//! }
//! ```
//!
//! ## Dependencies
//!
//! - `wgpu`: Device, buffers, pipeline and presentation.
//! - `winit`: Window and event loop.
//! - `egui`, `egui-wgpu`, `egui-winit`: The overlay window.
//! - `nalgebra-glm`: Matrix and vector math.
//! - `log`, `env_logger` / `console_log`: Logging.
//! - `anyhow`: Startup error reporting.

mod app;
pub mod camera;
mod clock;
pub mod config;
pub mod geometry;
mod gpu;
pub mod pipeline;
mod renderer;
mod scene;
pub mod transform;
mod uniform_binding;
mod uniform_buffer;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub use crate::app::App;
pub use crate::camera::Camera;
pub use crate::clock::FrameClock;
pub use crate::config::Config;
pub use crate::geometry::{COLORS, INDICES, POSITIONS};
pub use crate::pipeline::{FrameSink, FrameStats, PipelineMode, TransformPipeline};
pub use crate::renderer::Renderer;
pub use crate::transform::AnimationState;
pub use crate::uniform_buffer::TransformUniforms;

/// WGSL source for the cube.
///
/// The vertex stage (`vertex_main`) reads `@location(0) position` and `@location(1) color`,
/// outputs `projection * view * model * vec4(position, 1)` and passes the color through.
/// The fragment stage (`fragment_main`) writes the interpolated color with alpha 1.
///
/// The uniform block at `@group(0) @binding(0)` mirrors [`TransformUniforms`].
pub const SHADER_SOURCE: &str = include_str!("shader_source.wgsl");

/// Initializes logging, reads the configuration and runs the event loop until the window
/// closes.
pub fn run() -> anyhow::Result<()> {
    init_logging()?;

    #[cfg(not(target_arch = "wasm32"))]
    let config = Config::from_env()?;
    #[cfg(target_arch = "wasm32")]
    let config = Config::default();
    log::debug!("Starting with {config:?}");

    let event_loop = winit::event_loop::EventLoop::new()?;
    let app = App::new(config);

    #[cfg(not(target_arch = "wasm32"))]
    {
        let mut app = app;
        event_loop.run_app(&mut app)?;
    }

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;
        event_loop.spawn_app(app);
    }

    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn init_logging() -> anyhow::Result<()> {
    use anyhow::Context;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .context("Failed to initialize logger!")
}

#[cfg(target_arch = "wasm32")]
fn init_logging() -> anyhow::Result<()> {
    use anyhow::Context;

    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    console_log::init_with_level(log::Level::Info).context("Failed to initialize logger!")
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    if let Err(error) = run() {
        log::error!("{error:#}");
    }
}
