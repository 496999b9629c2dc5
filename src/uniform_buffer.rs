//! # Uniform Buffer
//!
//! This module defines [`TransformUniforms`], the CPU-side mirror of the uniform block read by
//! the vertex shader. It carries the three matrices of the transform pipeline separately
//! instead of a pre-multiplied MVP, so each one can be uploaded on its own schedule:
//!
//! - **model**: rewritten every frame while the cube is animated.
//! - **view** and **projection**: written once at startup and again on resize.
//!
//! ## Memory Layout
//!
//! The struct is `#[repr(C)]` and derives `bytemuck::Pod`, so it can be copied into a
//! `wgpu::Buffer` verbatim. Three `mat4x4<f32>` fields are 64 bytes each and already satisfy
//! WGSL's 16-byte alignment rules, giving a 192 byte block with no padding. The byte offsets
//! [`MODEL_OFFSET`] and [`VIEW_OFFSET`] let callers write a sub-range of the buffer.

use nalgebra_glm as glm;

/// Uniform block shared by the vertex shader.
///
/// Field order must match the `Transforms` struct in `shader_source.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniforms {
    /// Object-to-world transform.
    pub model: glm::Mat4,
    /// World-to-camera transform.
    pub view: glm::Mat4,
    /// Camera-to-clip transform.
    pub projection: glm::Mat4,
}

impl Default for TransformUniforms {
    fn default() -> Self {
        Self {
            model: glm::Mat4::identity(),
            view: glm::Mat4::identity(),
            projection: glm::Mat4::identity(),
        }
    }
}

/// Byte offset of [`TransformUniforms::model`].
pub const MODEL_OFFSET: wgpu::BufferAddress =
    std::mem::offset_of!(TransformUniforms, model) as wgpu::BufferAddress;

/// Byte offset of [`TransformUniforms::view`]; `projection` follows it directly.
pub const VIEW_OFFSET: wgpu::BufferAddress =
    std::mem::offset_of!(TransformUniforms, view) as wgpu::BufferAddress;

/// The view and projection pair, written together as one contiguous range.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view: glm::Mat4,
    pub projection: glm::Mat4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_shader_block() {
        assert_eq!(std::mem::size_of::<TransformUniforms>(), 192);
        assert_eq!(MODEL_OFFSET, 0);
        assert_eq!(VIEW_OFFSET, 64);
        assert_eq!(std::mem::offset_of!(TransformUniforms, projection), 128);
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 128);
    }

    #[test]
    fn camera_range_lines_up_with_full_block() {
        let uniforms = TransformUniforms {
            model: glm::Mat4::identity() * 2.0,
            view: glm::Mat4::identity() * 3.0,
            projection: glm::Mat4::identity() * 4.0,
        };
        let camera = CameraUniforms {
            view: uniforms.view,
            projection: uniforms.projection,
        };
        let full = bytemuck::bytes_of(&uniforms);
        assert_eq!(&full[VIEW_OFFSET as usize..], bytemuck::bytes_of(&camera));
    }
}
