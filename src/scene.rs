//! # Scene
//!
//! The `scene` module owns every GPU resource needed to draw the cube: the position, color
//! and index buffers built from [`crate::geometry`], the transform uniforms, and the render
//! pipeline compiled from [`crate::SHADER_SOURCE`].
//!
//! ## Overview
//!
//! All resources are created once in [`Scene::new`] and never reallocated. Per frame, the
//! [`crate::pipeline::TransformPipeline`] talks to the scene through [`SceneFrame`], a
//! short-lived [`FrameSink`] that forwards uniform writes to the queue and records whether
//! a draw was requested. The renderer then opens the render pass and calls
//! [`Scene::render`].
//!
//! ## Example Usage
//! ```ignore
//! let scene = Scene::new(&device, surface_format);
//!
//! let mut frame = scene.frame(&queue);
//! pipeline.frame(now_ms, &mut frame);
//! let draw = frame.finish();
//!
//! let mut render_pass = encoder.begin_render_pass(&render_pass_descriptor);
//! if let Some(index_count) = draw {
//!     scene.render(&mut render_pass, index_count);
//! }
//! ```

use nalgebra_glm as glm;

use crate::geometry::{self, COLORS, INDICES, POSITIONS};
use crate::pipeline::FrameSink;
use crate::renderer::Renderer;
use crate::uniform_binding::UniformBinding;
use crate::SHADER_SOURCE;

/// GPU resources for the cube.
pub struct Scene {
    pub position_buffer: wgpu::Buffer,
    pub color_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub uniform: UniformBinding,
    pub pipeline: wgpu::RenderPipeline,
}

impl Scene {
    /// Uploads the cube geometry and builds the render pipeline for `surface_format`.
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let position_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Position Buffer"),
                contents: bytemuck::cast_slice(&POSITIONS),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );

        let color_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Color Buffer"),
                contents: bytemuck::cast_slice(&COLORS),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );

        // 36 u16 indices are 72 bytes, already a multiple of the 4 byte copy alignment.
        let index_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&INDICES),
                usage: wgpu::BufferUsages::INDEX,
            },
        );

        let uniform = UniformBinding::new(device);
        let pipeline = Self::create_pipeline(device, surface_format, &uniform);

        Self {
            position_buffer,
            color_buffer,
            index_buffer,
            uniform,
            pipeline,
        }
    }

    /// Starts a frame: returns a sink the transform pipeline can upload into.
    pub fn frame<'a>(&'a self, queue: &'a wgpu::Queue) -> SceneFrame<'a> {
        SceneFrame {
            scene: self,
            queue,
            draw: None,
        }
    }

    /// Records the indexed draw of the cube into `renderpass`.
    pub fn render(&self, renderpass: &mut wgpu::RenderPass<'_>, index_count: u32) {
        renderpass.set_pipeline(&self.pipeline);
        renderpass.set_bind_group(0, &self.uniform.bind_group, &[]);
        renderpass.set_vertex_buffer(0, self.position_buffer.slice(..));
        renderpass.set_vertex_buffer(1, self.color_buffer.slice(..));
        renderpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        renderpass.draw_indexed(0..index_count, 0, 0..1);
    }

    fn create_pipeline(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        uniform: &UniformBinding,
    ) -> wgpu::RenderPipeline {
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cube Shader"),
            source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(SHADER_SOURCE)),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cube Pipeline Layout"),
            bind_group_layouts: &[&uniform.bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cube Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: Some("vertex_main"),
                // Slot 0 holds positions, slot 1 colors.
                buffers: &[geometry::position_layout(), geometry::color_layout()],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Renderer::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: Some("fragment_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        })
    }
}

/// [`FrameSink`] over a [`Scene`] for one frame.
///
/// Uniform writes go straight to the queue. The draw is only recorded, because the render
/// pass that executes it is opened by the renderer after the pipeline has run.
pub struct SceneFrame<'a> {
    scene: &'a Scene,
    queue: &'a wgpu::Queue,
    draw: Option<u32>,
}

impl SceneFrame<'_> {
    /// Index count of the requested draw, if any.
    pub fn finish(self) -> Option<u32> {
        self.draw
    }
}

impl FrameSink for SceneFrame<'_> {
    fn submit_model(&mut self, model: &glm::Mat4) {
        self.scene.uniform.write_model(self.queue, model);
    }

    fn submit_camera(&mut self, view: &glm::Mat4, projection: &glm::Mat4) {
        self.scene.uniform.write_camera(self.queue, view, projection);
    }

    fn draw_indexed(&mut self, index_count: u32) {
        self.draw = Some(index_count);
    }
}
