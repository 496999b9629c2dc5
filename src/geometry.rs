//! # Geometry Module
//!
//! This module holds the static mesh drawn by the application: a cube centered at the origin
//! with an edge length of 2. The data is split the same way it is uploaded to the GPU, as two
//! vertex streams (positions and colors) plus one index list.
//!
//! ## Layout
//!
//! - [`POSITIONS`]: 8 corner positions, 3 floats each.
//! - [`COLORS`]: 8 RGB colors in `[0, 1]`, one per corner.
//! - [`INDICES`]: 36 `u16` indices grouping the corners into 12 triangles (2 per face).
//!
//! Every triangle is wound counter-clockwise when seen from outside the cube, which matches
//! `wgpu::FrontFace::Ccw`.
//!
//! ## GPU Compatibility
//!
//! Positions and colors are kept in separate buffers, each one feeding a single shader
//! attribute. [`position_layout`] and [`color_layout`] describe those buffers to the pipeline.

/// Number of floats per vertex position.
pub const POSITION_COMPONENTS: usize = 3;

/// Number of floats per vertex color.
pub const COLOR_COMPONENTS: usize = 3;

/// Corner positions of the cube.
///
/// Indices 0-3 are the top face (`y = 1`), 4-7 the bottom face (`y = -1`), both listed in the
/// same order around the y axis.
pub const POSITIONS: [[f32; POSITION_COMPONENTS]; 8] = [
    [-1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, -1.0, -1.0],
    [-1.0, -1.0, -1.0],
];

/// Per-corner colors, matched by index with [`POSITIONS`].
pub const COLORS: [[f32; COLOR_COMPONENTS]; 8] = [
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0],
];

/// Triangle list for the six faces, six indices per face.
///
/// Face order: top, bottom, left, right, front, back.
pub const INDICES: [u16; 36] = [
    0, 1, 3, 3, 1, 2, // top
    7, 5, 4, 5, 7, 6, // bottom
    3, 4, 0, 3, 7, 4, // left
    5, 2, 1, 5, 6, 2, // right
    4, 1, 0, 4, 5, 1, // front
    6, 3, 2, 6, 7, 3, // back
];

/// Number of indices submitted by the draw call.
pub const INDEX_COUNT: u32 = INDICES.len() as u32;

/// Returns the index list split per face.
pub fn faces() -> impl Iterator<Item = &'static [u16]> {
    let indices: &'static [u16] = &INDICES;
    indices.chunks_exact(6)
}

/// Returns the un-normalized normal of a triangle given by three indices.
///
/// The direction follows the right-hand rule, so a counter-clockwise triangle seen from
/// outside the cube yields an outward normal.
pub fn triangle_normal(triangle: [u16; 3]) -> nalgebra_glm::Vec3 {
    let [a, b, c] = triangle.map(|index| nalgebra_glm::Vec3::from(POSITIONS[index as usize]));
    (b - a).cross(&(c - a))
}

/// Buffer layout for the position stream, bound to `@location(0)`.
pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride: (POSITION_COMPONENTS * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

/// Buffer layout for the color stream, bound to `@location(1)`.
pub fn color_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride: (COLOR_COMPONENTS * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}
