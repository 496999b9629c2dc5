//! # Renderer
//!
//! Ties the [`Gpu`], the cube [`Scene`], the [`TransformPipeline`] and the `egui` overlay
//! renderer together and turns one frame timestamp into one presented image.
//!
//! ## Frame Flow
//!
//! 1. Apply the egui texture uploads for the frame.
//! 2. Acquire the next surface texture. A lost or outdated surface is reconfigured and the
//!    frame is skipped; a timeout skips the frame.
//! 3. Run the transform pipeline against the scene, which uploads whatever uniforms the
//!    active mode requires and requests the indexed draw.
//! 4. Upload egui buffers.
//! 5. Encode one render pass: clear color and depth, draw the cube, draw the overlay.
//! 6. Submit and present, then free the egui textures released by the frame.
//!
//! egui hands out each [`egui::TexturesDelta`] exactly once, so steps 1 and 6 run whether
//! or not the frame is skipped. Dropping a delta would lose the font atlas and make later
//! partial atlas updates target a texture that was never allocated.

use crate::config::Config;
use crate::gpu::Gpu;
use crate::pipeline::{FrameStats, PipelineMode, TransformPipeline};
use crate::scene::Scene;

/// Receiver of egui texture allocations, updates and frees.
pub trait TextureTarget {
    fn update_texture(&mut self, id: egui::TextureId, image_delta: &egui::epaint::ImageDelta);

    fn free_texture(&mut self, id: egui::TextureId);
}

/// Runs `frame` between the two halves of `textures_delta`.
///
/// Every `set` entry is applied before `frame` and every `free` entry after it, regardless
/// of what `frame` returns.
pub fn with_textures_delta<T: TextureTarget, R>(
    target: &mut T,
    textures_delta: &egui::TexturesDelta,
    frame: impl FnOnce(&mut T) -> R,
) -> R {
    for (id, image_delta) in &textures_delta.set {
        target.update_texture(*id, image_delta);
    }
    let result = frame(target);
    for id in &textures_delta.free {
        target.free_texture(*id);
    }
    result
}

pub struct Renderer {
    gpu: Gpu,
    depth_texture_view: wgpu::TextureView,
    egui_renderer: egui_wgpu::Renderer,
    scene: Scene,
    pipeline: TransformPipeline,
    clear_color: wgpu::Color,
}

impl Renderer {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates the device and every GPU resource, and uploads the initial uniforms.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        config: Config,
    ) -> anyhow::Result<Self> {
        let gpu = Gpu::new_async(window, width, height).await?;
        let depth_texture_view =
            gpu.create_depth_texture(gpu.surface_config.width, gpu.surface_config.height);

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            Some(Self::DEPTH_FORMAT),
            1,
            false,
        );

        let scene = Scene::new(&gpu.device, gpu.surface_format);
        let mut pipeline = TransformPipeline::new(&config, gpu.aspect_ratio());
        pipeline.prime(&mut scene.frame(&gpu.queue));
        log::info!("Transform pipeline ready in {} mode", pipeline.mode().label());

        Ok(Self {
            gpu,
            depth_texture_view,
            egui_renderer,
            scene,
            pipeline,
            clear_color: config.clear_color,
        })
    }

    pub fn mode(&self) -> PipelineMode {
        self.pipeline.mode()
    }

    pub fn set_mode(&mut self, mode: PipelineMode) {
        self.pipeline.set_mode(mode);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        self.depth_texture_view = self.gpu.create_depth_texture(width, height);
        self.pipeline.set_aspect_ratio(self.gpu.aspect_ratio());
    }

    /// Renders the frame stamped `now_ms`.
    ///
    /// Returns `Ok(None)` when the frame was skipped because the surface was not ready, and
    /// an error when the surface cannot be recovered. The texture delta is applied either way.
    pub fn render_frame(
        &mut self,
        screen_descriptor: egui_wgpu::ScreenDescriptor,
        paint_jobs: Vec<egui::epaint::ClippedPrimitive>,
        textures_delta: egui::TexturesDelta,
        now_ms: f64,
    ) -> anyhow::Result<Option<FrameStats>> {
        with_textures_delta(self, &textures_delta, |renderer| {
            renderer.draw_frame(&screen_descriptor, &paint_jobs, now_ms)
        })
    }

    fn draw_frame(
        &mut self,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
        paint_jobs: &[egui::epaint::ClippedPrimitive],
        now_ms: f64,
    ) -> anyhow::Result<Option<FrameStats>> {
        let surface_texture = match self.gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return Ok(None);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring the surface texture, skipping frame");
                return Ok(None);
            }
            Err(error) => {
                return Err(anyhow::Error::new(error).context("Failed to get surface texture!"));
            }
        };

        let mut frame = self.scene.frame(&self.gpu.queue);
        let stats = self.pipeline.frame(now_ms, &mut frame);
        let draw = frame.finish();

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.egui_renderer.update_buffers(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            paint_jobs,
            screen_descriptor,
        );

        let surface_texture_view =
            surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor {
                    label: Some("Surface Texture View"),
                    format: Some(self.gpu.surface_format),
                    ..Default::default()
                });

        encoder.insert_debug_marker("Render cube");
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(index_count) = draw {
                self.scene.render(&mut render_pass, index_count);
            }

            self.egui_renderer.render(
                &mut render_pass.forget_lifetime(),
                paint_jobs,
                screen_descriptor,
            );
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();

        Ok(Some(stats))
    }
}

impl TextureTarget for Renderer {
    fn update_texture(&mut self, id: egui::TextureId, image_delta: &egui::epaint::ImageDelta) {
        self.egui_renderer
            .update_texture(&self.gpu.device, &self.gpu.queue, id, image_delta);
    }

    fn free_texture(&mut self, id: egui::TextureId) {
        self.egui_renderer.free_texture(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Update(egui::TextureId, bool),
        Frame,
        Free(egui::TextureId),
    }

    #[derive(Default)]
    struct RecordingTextures {
        events: Vec<Event>,
    }

    impl TextureTarget for RecordingTextures {
        fn update_texture(&mut self, id: egui::TextureId, image_delta: &egui::epaint::ImageDelta) {
            self.events.push(Event::Update(id, image_delta.is_whole()));
        }

        fn free_texture(&mut self, id: egui::TextureId) {
            self.events.push(Event::Free(id));
        }
    }

    fn atlas_delta() -> egui::TexturesDelta {
        let image = egui::ColorImage::new([2, 2], egui::Color32::WHITE);
        let mut delta = egui::TexturesDelta::default();
        delta.set.push((
            egui::TextureId::Managed(0),
            egui::epaint::ImageDelta::full(image, egui::TextureOptions::default()),
        ));
        delta.free.push(egui::TextureId::Managed(7));
        delta
    }

    #[test]
    fn skipped_frame_still_allocates_and_frees_textures() {
        let mut target = RecordingTextures::default();
        let result: Option<u32> = with_textures_delta(&mut target, &atlas_delta(), |_| None);

        assert_eq!(result, None);
        assert_eq!(
            target.events,
            vec![
                Event::Update(egui::TextureId::Managed(0), true),
                Event::Free(egui::TextureId::Managed(7)),
            ]
        );
    }

    #[test]
    fn uploads_precede_the_frame_and_frees_follow_it() {
        let mut target = RecordingTextures::default();
        let result = with_textures_delta(&mut target, &atlas_delta(), |target| {
            target.events.push(Event::Frame);
            Some(36)
        });

        assert_eq!(result, Some(36));
        assert_eq!(
            target.events,
            vec![
                Event::Update(egui::TextureId::Managed(0), true),
                Event::Frame,
                Event::Free(egui::TextureId::Managed(7)),
            ]
        );
    }

    #[test]
    fn failed_frame_still_frees_textures() {
        let mut target = RecordingTextures::default();
        let result: anyhow::Result<()> =
            with_textures_delta(&mut target, &atlas_delta(), |_| Err(anyhow::anyhow!("lost")));

        assert!(result.is_err());
        assert_eq!(target.events.last(), Some(&Event::Free(egui::TextureId::Managed(7))));
    }
}
