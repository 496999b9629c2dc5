//! # Application Core (`app.rs`)
//!
//! The `App` struct is the `winit` application handler. It creates the window (or binds the
//! `<canvas id="canvas">` element on the web), builds the [`Renderer`], and drives the frame
//! loop: `resumed` requests the first redraw, and every `RedrawRequested` event renders
//! exactly one frame and requests exactly one more, so frames follow the display refresh for
//! as long as the window is open. Other window events never schedule a frame.
//!
//! ## Frame Timing
//!
//! Frame timestamps come from a [`FrameClock`] started when the `App` is created. The first
//! frame is measured from that origin, so its rotation step covers the whole startup time,
//! the same way a browser animation callback's first timestamp covers the page load.
//!
//! ## Platform-Specific Notes
//!
//! - **Desktop**: the renderer is created synchronously with `pollster`.
//! - **WebAssembly**: the renderer is created in a `spawn_local` task and delivered through a
//!   `futures` oneshot channel. Until it arrives, a redraw request is re-issued instead of
//!   rendering; if the task fails or is dropped, the app exits.
//!
//! ## Overlay
//!
//! An `egui` window shows the active pipeline mode, the current angle, the last frame time
//! and the number of frames drawn, with a checkbox that switches between the animated and static-camera variants.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    window::{Theme, Window},
};

use futures::channel::oneshot;

use crate::clock::FrameClock;
use crate::config::Config;
use crate::pipeline::{FrameStats, PipelineMode};
use crate::renderer::Renderer;

/// State of a renderer being built on another task.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Debug)]
enum RendererPoll<T> {
    Ready(T),
    Pending,
    Failed(anyhow::Error),
    Dropped,
}

/// Receiving end of an asynchronous renderer construction.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
struct PendingRenderer<T> {
    receiver: oneshot::Receiver<anyhow::Result<T>>,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl<T> PendingRenderer<T> {
    fn new(receiver: oneshot::Receiver<anyhow::Result<T>>) -> Self {
        Self { receiver }
    }

    fn poll(&mut self) -> RendererPoll<T> {
        match self.receiver.try_recv() {
            Ok(Some(Ok(renderer))) => RendererPoll::Ready(renderer),
            Ok(Some(Err(error))) => RendererPoll::Failed(error),
            Ok(None) => RendererPoll::Pending,
            Err(oneshot::Canceled) => RendererPoll::Dropped,
        }
    }
}

/// Whether handling `event` must schedule the next frame.
fn requests_next_frame(event: &WindowEvent) -> bool {
    matches!(event, WindowEvent::RedrawRequested)
}

/// Main application structure for the spinning cube.
pub struct App {
    config: Config,
    clock: FrameClock,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    gui_state: Option<egui_winit::State>,
    #[cfg(target_arch = "wasm32")]
    pending_renderer: Option<PendingRenderer<Renderer>>,
    last_size: (u32, u32),
    last_stats: FrameStats,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            clock: FrameClock::new(),
            window: None,
            renderer: None,
            gui_state: None,
            #[cfg(target_arch = "wasm32")]
            pending_renderer: None,
            last_size: (0, 0),
            last_stats: FrameStats::default(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn pending_renderer_is_waiting(&self) -> bool {
        self.pending_renderer.is_some()
    }

    /// Native builds create the renderer synchronously in `resumed`.
    #[cfg(not(target_arch = "wasm32"))]
    fn pending_renderer_is_waiting(&self) -> bool {
        false
    }

    #[cfg(target_arch = "wasm32")]
    fn poll_renderer(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        let Some(pending) = self.pending_renderer.as_mut() else {
            return;
        };
        match pending.poll() {
            RendererPoll::Ready(renderer) => {
                self.renderer = Some(renderer);
                self.pending_renderer = None;
            }
            RendererPoll::Pending => {}
            RendererPoll::Failed(error) => {
                log::error!("Failed to create renderer: {error:#}");
                self.pending_renderer = None;
                event_loop.exit();
            }
            RendererPoll::Dropped => {
                log::error!("Renderer task dropped before finishing!");
                self.pending_renderer = None;
                event_loop.exit();
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn find_canvas() -> Option<wgpu::web_sys::HtmlCanvasElement> {
    wgpu::web_sys::window()?
        .document()?
        .get_element_by_id("canvas")?
        .dyn_into::<wgpu::web_sys::HtmlCanvasElement>()
        .ok()
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let mut attributes = Window::default_attributes();

        #[cfg(not(target_arch = "wasm32"))]
        {
            attributes = attributes
                .with_title("Spinning Cube")
                .with_inner_size(PhysicalSize::new(960, 720));
        }

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;
            let Some(canvas) = find_canvas() else {
                log::error!("No <canvas id=\"canvas\"> element found!");
                event_loop.exit();
                return;
            };
            self.last_size = (canvas.width(), canvas.height());
            log::info!("Canvas dimensions: ({} x {})", canvas.width(), canvas.height());
            attributes = attributes.with_canvas(Some(canvas));
        }

        let window_handle = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(error) => {
                log::error!("Failed to create window: {error}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window_handle.clone());

        let gui_context = egui::Context::default();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let inner_size = window_handle.inner_size();
            self.last_size = (inner_size.width, inner_size.height);
        }

        #[cfg(target_arch = "wasm32")]
        {
            gui_context.set_pixels_per_point(window_handle.scale_factor() as f32);
        }

        let viewport_id = gui_context.viewport_id();
        let gui_state = egui_winit::State::new(
            gui_context,
            viewport_id,
            &window_handle,
            Some(window_handle.scale_factor() as _),
            Some(Theme::Dark),
            None,
        );
        self.gui_state = Some(gui_state);

        let (width, height) = self.last_size;
        let config = self.config.clone();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let window = window_handle.clone();
            match pollster::block_on(Renderer::new(window, width, height, config)) {
                Ok(renderer) => self.renderer = Some(renderer),
                Err(error) => {
                    log::error!("Failed to create renderer: {error:#}");
                    event_loop.exit();
                    return;
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let (sender, receiver) = oneshot::channel();
            self.pending_renderer = Some(PendingRenderer::new(receiver));
            let window = window_handle.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let renderer = Renderer::new(window, width, height, config).await;
                if sender.send(renderer).is_err() {
                    log::error!("Failed to create and send renderer!");
                }
            });
        }

        window_handle.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: winit::event::WindowEvent,
    ) {
        #[cfg(target_arch = "wasm32")]
        self.poll_renderer(event_loop);

        if self.renderer.is_none() {
            if self.pending_renderer_is_waiting() && requests_next_frame(&event) {
                if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
            }
            return;
        }

        let (Some(gui_state), Some(renderer), Some(window)) = (
            self.gui_state.as_mut(),
            self.renderer.as_mut(),
            self.window.as_ref(),
        ) else {
            return;
        };

        if gui_state.on_window_event(window, &event).consumed {
            return;
        }

        let schedule_next_frame = requests_next_frame(&event);
        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: winit::keyboard::PhysicalKey::Code(key_code),
                        ..
                    },
                ..
            } => {
                if matches!(key_code, winit::keyboard::KeyCode::Escape) {
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                log::info!("Resizing renderer surface to: ({width}, {height})");
                renderer.resize(width, height);
                self.last_size = (width, height);
            }
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting...");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let now_ms = self.clock.tick();

                let gui_input = gui_state.take_egui_input(window);
                gui_state.egui_ctx().begin_pass(gui_input);

                let mut static_camera = renderer.mode() == PipelineMode::StaticCamera;
                let stats = self.last_stats;
                egui::Window::new("Spinning Cube").show(gui_state.egui_ctx(), |ui| {
                    ui.label(format!("Mode: {}", renderer.mode().label()));
                    ui.label(format!("Rotation: {:.1}°", stats.rotation));
                    ui.label(format!("Frame time: {:.2} ms", stats.delta_seconds * 1000.0));
                    ui.label(format!("Frames: {}", stats.frames_drawn));
                    ui.checkbox(&mut static_camera, "Static camera");
                });
                let mode = if static_camera {
                    PipelineMode::StaticCamera
                } else {
                    PipelineMode::Animated
                };
                renderer.set_mode(mode);

                let egui_winit::egui::FullOutput {
                    textures_delta,
                    shapes,
                    pixels_per_point,
                    platform_output,
                    ..
                } = gui_state.egui_ctx().end_pass();

                gui_state.handle_platform_output(window, platform_output);

                let paint_jobs = gui_state.egui_ctx().tessellate(shapes, pixels_per_point);

                let screen_descriptor = {
                    let (width, height) = self.last_size;
                    egui_wgpu::ScreenDescriptor {
                        size_in_pixels: [width, height],
                        pixels_per_point: window.scale_factor() as f32,
                    }
                };

                match renderer.render_frame(screen_descriptor, paint_jobs, textures_delta, now_ms) {
                    Ok(Some(stats)) => self.last_stats = stats,
                    Ok(None) => {}
                    Err(error) => {
                        log::error!("{error:#}");
                        event_loop.exit();
                        return;
                    }
                }
            }
            _ => (),
        }

        if schedule_next_frame {
            window.request_redraw();
        }
    }
}
