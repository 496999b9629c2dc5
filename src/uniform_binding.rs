//! # Uniform Binding Module
//!
//! This module defines the `UniformBinding` struct, which owns the GPU side of
//! [`TransformUniforms`]: the uniform buffer, its bind group layout and the bind group that
//! exposes it to the vertex shader at `@group(0) @binding(0)`.
//!
//! ## Partial Updates
//!
//! The model matrix and the camera matrices change at different rates. Rather than
//! re-uploading the full block, the binding writes only the range that changed:
//!
//! - [`UniformBinding::write_model`] writes 64 bytes at [`MODEL_OFFSET`].
//! - [`UniformBinding::write_camera`] writes 128 bytes at [`VIEW_OFFSET`].
//!
//! Writes go through `wgpu::Queue::write_buffer` and become visible to the next submitted
//! command buffer.

use nalgebra_glm as glm;

use crate::uniform_buffer::{CameraUniforms, TransformUniforms, MODEL_OFFSET, VIEW_OFFSET};

/// Uniform buffer plus the bind group objects needed to use it in a render pass.
pub struct UniformBinding {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl UniformBinding {
    /// Allocates the uniform buffer initialized with identity matrices.
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Transform Uniform Buffer"),
                contents: bytemuck::cast_slice(&[TransformUniforms::default()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<TransformUniforms>() as u64,
                    ),
                },
                count: None,
            }],
            label: Some("transform_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("transform_bind_group"),
        });

        Self {
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Writes the model matrix.
    pub fn write_model(&self, queue: &wgpu::Queue, model: &glm::Mat4) {
        queue.write_buffer(&self.buffer, MODEL_OFFSET, bytemuck::bytes_of(model));
    }

    /// Writes the view and projection matrices in one contiguous range.
    pub fn write_camera(&self, queue: &wgpu::Queue, view: &glm::Mat4, projection: &glm::Mat4) {
        let camera = CameraUniforms {
            view: *view,
            projection: *projection,
        };
        queue.write_buffer(&self.buffer, VIEW_OFFSET, bytemuck::bytes_of(&camera));
    }
}
